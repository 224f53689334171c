// Copyright 2025 the Placard Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use core::ops::Range;

/// Errors produced while assembling styled text or loading font data.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// The range reaches past the end of the text.
    #[error("range {range:?} out of bounds for len {len}")]
    OutOfBounds {
        /// The range provided by the caller.
        range: Range<usize>,
        /// The length of the text in bytes.
        len: usize,
    },
    /// The range starts after it ends.
    #[error("invalid range {range:?}: start > end")]
    InvalidRange {
        /// The range provided by the caller.
        range: Range<usize>,
    },
    /// One of the range endpoints splits a UTF-8 sequence.
    #[error("range {range:?} is not on a char boundary at byte {index}")]
    NotOnCharBoundary {
        /// The range provided by the caller.
        range: Range<usize>,
        /// The offending endpoint.
        index: usize,
    },
    /// Font data could not be parsed.
    #[error("failed to read font data: {0}")]
    FontParse(String),
}

impl Error {
    /// Checks that `range` is a valid, char aligned range into `text`.
    pub(crate) fn check_range(text: &str, range: &Range<usize>) -> Result<(), Self> {
        if range.start > range.end {
            return Err(Self::InvalidRange {
                range: range.clone(),
            });
        }
        if range.end > text.len() {
            return Err(Self::OutOfBounds {
                range: range.clone(),
                len: text.len(),
            });
        }
        for index in [range.start, range.end] {
            if !text.is_char_boundary(index) {
                return Err(Self::NotOnCharBoundary {
                    range: range.clone(),
                    index,
                });
            }
        }
        Ok(())
    }
}
