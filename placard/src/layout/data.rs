// Copyright 2025 the Placard Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use core::ops::Range;

use peniko::kurbo::Size;

use crate::container::Axis;
use crate::style::Attributes;
use crate::text::StyledText;

use super::{BreakReason, LineMetrics};

/// Storage shared by every handle to one layout.
///
/// Lines, runs and glyphs live in flat vectors and refer to each other by
/// index ranges, so a layout is released in one piece.
#[derive(Clone, Debug)]
pub(crate) struct LayoutData {
    pub(crate) text: StyledText,
    /// Styles of the text followed by the styles of the truncation token.
    pub(crate) styles: Vec<Attributes>,
    pub(crate) axis: Axis,
    pub(crate) lines: Vec<LineData>,
    pub(crate) runs: Vec<RunData>,
    pub(crate) glyphs: Vec<GlyphData>,
    pub(crate) rows: Vec<RowData>,
    pub(crate) bounding_size: Size,
    pub(crate) visible_range: Range<usize>,
    pub(crate) elided_range: Option<Range<usize>>,
    pub(crate) truncated_line: Option<usize>,
    pub(crate) is_truncated: bool,
    pub(crate) base_level: u8,
}

impl LayoutData {
    pub(crate) fn empty(text: StyledText, axis: Axis) -> Self {
        Self {
            styles: text.styles().to_vec(),
            text,
            axis,
            lines: Vec::new(),
            runs: Vec::new(),
            glyphs: Vec::new(),
            rows: Vec::new(),
            bounding_size: Size::ZERO,
            visible_range: 0..0,
            elided_range: None,
            truncated_line: None,
            is_truncated: false,
            base_level: 0,
        }
    }

    /// Returns the index of the row containing block coordinate `block`, or
    /// the closest row when it lies between or beyond rows.
    pub(crate) fn row_for_block(&self, block: f64) -> Option<usize> {
        if self.rows.is_empty() {
            return None;
        }
        let index = self.rows.partition_point(|row| row.block.end <= block);
        if index == self.rows.len() {
            return Some(index - 1);
        }
        if index > 0 && block < self.rows[index].block.start {
            let above = block - self.rows[index - 1].block.end;
            let below = self.rows[index].block.start - block;
            if above <= below {
                return Some(index - 1);
            }
        }
        Some(index)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct LineData {
    pub(crate) row: usize,
    /// Range of the source text, not counting a truncation token.
    pub(crate) text_range: Range<usize>,
    /// Runs in visual order.
    pub(crate) run_range: Range<usize>,
    pub(crate) metrics: LineMetrics,
    pub(crate) break_reason: BreakReason,
    pub(crate) base_level: u8,
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct RunData {
    /// Index into [`LayoutData::styles`].
    pub(crate) style_index: usize,
    /// Source range, or the range within the token for token runs.
    pub(crate) text_range: Range<usize>,
    /// Glyphs in visual order.
    pub(crate) glyph_range: Range<usize>,
    /// Advance axis coordinate of the visual start of the run.
    pub(crate) offset: f64,
    pub(crate) advance: f64,
    pub(crate) bidi_level: u8,
    pub(crate) highlight: Option<usize>,
    pub(crate) token: bool,
    pub(crate) upright: bool,
    pub(crate) attachment: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct GlyphData {
    pub(crate) id: u32,
    /// Advance axis coordinate of the glyph origin.
    pub(crate) offset: f64,
    pub(crate) advance: f64,
    /// Horizontal advance reported by the font.
    pub(crate) width: f64,
    /// Cluster the glyph belongs to.
    pub(crate) cluster: Range<usize>,
}

/// One entry of the row index used for hit testing.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct RowData {
    /// Block axis extent of the row.
    pub(crate) block: Range<f64>,
    /// Lines of the row, ordered along the advance axis.
    pub(crate) lines: Range<usize>,
}
