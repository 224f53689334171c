// Copyright 2025 the Placard Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use core::any::Any;
use core::fmt;
use core::ops::Range;
use std::sync::Arc;

use peniko::Color;

/// Opaque data attached to a highlight, usually identifying what a tap on it
/// should do.
#[derive(Clone)]
pub struct HighlightPayload(Arc<dyn Any + Send + Sync>);

impl HighlightPayload {
    /// Wraps `value` as a payload.
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self(Arc::new(value))
    }

    /// Returns the payload as `T` if that is its type.
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.0.downcast_ref()
    }

    /// Returns `true` if both payloads are the same allocation.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for HighlightPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("HighlightPayload(..)")
    }
}

/// An interactive range of text.
#[derive(Clone, Debug)]
pub struct Highlight {
    /// Byte range of the highlighted text.
    pub range: Range<usize>,
    /// Data handed back when the highlight is hit.
    pub payload: HighlightPayload,
    /// Text color while the highlight is pressed.
    pub active_color: Option<Color>,
    /// Background fill while the highlight is pressed.
    pub active_background: Option<Color>,
}

impl Highlight {
    /// Creates a highlight without active-state colors.
    pub fn new(range: Range<usize>, payload: HighlightPayload) -> Self {
        Self {
            range,
            payload,
            active_color: None,
            active_background: None,
        }
    }

    /// Sets the colors used while the highlight is pressed.
    pub fn with_active_colors(mut self, color: Option<Color>, background: Option<Color>) -> Self {
        self.active_color = color;
        self.active_background = background;
        self
    }
}

/// Inserts `highlight`, trimming or splitting the ranges of earlier
/// highlights it overlaps so that the newest one owns the shared span.
pub(crate) fn insert_highlight(highlights: &mut Vec<Highlight>, highlight: Highlight) {
    if highlight.range.is_empty() {
        return;
    }
    let new = highlight.range.clone();
    let mut kept = Vec::with_capacity(highlights.len() + 2);
    for existing in highlights.drain(..) {
        let old = existing.range.clone();
        if old.end <= new.start || new.end <= old.start {
            kept.push(existing);
            continue;
        }
        if old.start < new.start {
            let mut left = existing.clone();
            left.range = old.start..new.start;
            kept.push(left);
        }
        if new.end < old.end {
            let mut right = existing;
            right.range = new.end..old.end;
            kept.push(right);
        }
    }
    kept.push(highlight);
    kept.sort_by_key(|highlight| highlight.range.start);
    *highlights = kept;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ranges(highlights: &[Highlight]) -> Vec<Range<usize>> {
        highlights.iter().map(|h| h.range.clone()).collect()
    }

    #[test]
    fn later_highlight_splits_earlier() {
        let mut highlights = Vec::new();
        insert_highlight(&mut highlights, Highlight::new(0..10, HighlightPayload::new(1_u32)));
        insert_highlight(&mut highlights, Highlight::new(3..6, HighlightPayload::new(2_u32)));
        assert_eq!(ranges(&highlights), vec![0..3, 3..6, 6..10]);
        assert_eq!(highlights[0].payload.downcast_ref::<u32>(), Some(&1));
        assert_eq!(highlights[1].payload.downcast_ref::<u32>(), Some(&2));
        assert!(highlights[0].payload.ptr_eq(&highlights[2].payload));
    }

    #[test]
    fn later_highlight_trims_edges() {
        let mut highlights = Vec::new();
        insert_highlight(&mut highlights, Highlight::new(0..5, HighlightPayload::new('a')));
        insert_highlight(&mut highlights, Highlight::new(8..12, HighlightPayload::new('b')));
        insert_highlight(&mut highlights, Highlight::new(4..9, HighlightPayload::new('c')));
        assert_eq!(ranges(&highlights), vec![0..4, 4..9, 9..12]);
    }

    #[test]
    fn covered_highlight_is_dropped() {
        let mut highlights = Vec::new();
        insert_highlight(&mut highlights, Highlight::new(2..4, HighlightPayload::new(())));
        insert_highlight(&mut highlights, Highlight::new(0..6, HighlightPayload::new(())));
        insert_highlight(&mut highlights, Highlight::new(5..5, HighlightPayload::new(())));
        assert_eq!(ranges(&highlights), vec![0..6]);
    }
}
