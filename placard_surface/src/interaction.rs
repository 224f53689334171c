// Copyright 2025 the Placard Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Turning gestures on a layout into values the host can act on.
//!
//! Placard never invokes callbacks. A host recognizes a [`Gesture`], hit
//! tests the point and passes both to [`interpret`], then decides what the
//! resulting [`Interaction`] means.

use placard::{Hit, HitHighlight, HitKind};

/// A gesture recognized by the host.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum Gesture {
    /// A short press and release.
    Tap,
    /// A press held past the host's long press delay.
    LongPress,
}

/// What a gesture landed on.
#[derive(Clone, Debug)]
pub enum Interaction {
    /// A tap on text outside any highlight.
    TextTap {
        /// Byte offset of the hit.
        offset: usize,
        /// Line index of the hit.
        line: usize,
    },
    /// A long press on text outside any highlight.
    TextLongPress {
        /// Byte offset of the hit.
        offset: usize,
        /// Line index of the hit.
        line: usize,
    },
    /// A tap on a highlight.
    HighlightTap {
        /// The highlight that was hit.
        highlight: HitHighlight,
        /// Byte offset of the hit.
        offset: usize,
    },
    /// A long press on a highlight.
    HighlightLongPress {
        /// The highlight that was hit.
        highlight: HitHighlight,
        /// Byte offset of the hit.
        offset: usize,
    },
}

impl Interaction {
    /// Returns the byte offset the gesture landed on.
    pub fn offset(&self) -> usize {
        match self {
            Self::TextTap { offset, .. }
            | Self::TextLongPress { offset, .. }
            | Self::HighlightTap { offset, .. }
            | Self::HighlightLongPress { offset, .. } => *offset,
        }
    }

    /// Returns the highlight the gesture landed on.
    pub fn highlight(&self) -> Option<&HitHighlight> {
        match self {
            Self::HighlightTap { highlight, .. } | Self::HighlightLongPress { highlight, .. } => {
                Some(highlight)
            }
            _ => None,
        }
    }
}

/// Maps a gesture and the hit under it to an interaction.
///
/// Only exact hits reach a highlight; a point beside the text is a text
/// gesture at the nearest line edge.
pub fn interpret(gesture: Gesture, hit: &Hit) -> Interaction {
    let highlight = hit
        .highlight
        .clone()
        .filter(|_| hit.kind == HitKind::Exact);
    let offset = hit.offset;
    match (gesture, highlight) {
        (Gesture::Tap, Some(highlight)) => Interaction::HighlightTap { highlight, offset },
        (Gesture::LongPress, Some(highlight)) => {
            Interaction::HighlightLongPress { highlight, offset }
        }
        (Gesture::Tap, None) => Interaction::TextTap {
            offset,
            line: hit.line,
        },
        (Gesture::LongPress, None) => Interaction::TextLongPress {
            offset,
            line: hit.line,
        },
    }
}
