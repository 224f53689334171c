// Copyright 2025 the Placard Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The region text flows into.

mod region;

use core::fmt;
use std::sync::Arc;

use peniko::kurbo::{BezPath, Insets, Size};

use crate::text::StyledText;

pub(crate) use region::{Axis, Band, Region};

/// Horizontal alignment of lines within the space available to them.
#[derive(Copy, Clone, Default, PartialEq, Eq, Debug)]
pub enum Alignment {
    /// This is [`Alignment::Left`] for LTR text and [`Alignment::Right`] for RTL text.
    #[default]
    Start,
    /// This is [`Alignment::Right`] for LTR text and [`Alignment::Left`] for RTL text.
    End,
    /// Align content to the left edge.
    Left,
    /// Align each line centered within its space.
    Center,
    /// Align content to the right edge.
    Right,
    /// Justify each line by spacing out content, except for the last line.
    Justified,
}

/// Placement of the text along the physical `y` axis when the container is
/// taller than the text.
///
/// Only rectangular containers are aligned. Rows fitted to a boundary or
/// around exclusions stay where they were placed.
#[derive(Copy, Clone, Default, PartialEq, Eq, Debug)]
pub enum VerticalAlignment {
    /// Start at the top inset.
    #[default]
    Top,
    /// Split the free space evenly above and below.
    Center,
    /// End at the bottom inset.
    Bottom,
}

impl VerticalAlignment {
    /// Returns the share of the free space placed before the text.
    pub(crate) fn factor(self) -> f64 {
        match self {
            Self::Top => 0.,
            Self::Center => 0.5,
            Self::Bottom => 1.,
        }
    }
}

/// How text wraps and what happens when it does not fit.
#[derive(Copy, Clone, Default, PartialEq, Eq, Debug)]
pub enum LineBreakMode {
    /// Wrap at word boundaries, cutting off text that does not fit.
    WordWrap,
    /// Wrap at any character, cutting off text that does not fit.
    CharWrap,
    /// Only break at newlines and cut off what does not fit the container.
    Clip,
    /// Wrap at word boundaries and elide the start of the last line.
    TruncateHead,
    /// Wrap at word boundaries and elide the middle of the last line.
    TruncateMiddle,
    /// Wrap at word boundaries and elide the end of the last line.
    #[default]
    TruncateTail,
}

impl LineBreakMode {
    /// Returns `true` if lines may break between any two characters.
    pub fn breaks_anywhere(self) -> bool {
        self == Self::CharWrap
    }

    /// Returns `true` if overflowing text is replaced by a truncation token.
    pub fn inserts_token(self) -> bool {
        matches!(
            self,
            Self::TruncateHead | Self::TruncateMiddle | Self::TruncateTail
        )
    }
}

/// Block-axis metrics of one row, handed to a [`LinePositionModifier`]
/// before the row is placed.
#[derive(Copy, Clone, Default, PartialEq, Debug)]
pub struct RowMetrics {
    /// Index of the row.
    pub index: usize,
    /// Space above the baseline.
    pub ascent: f64,
    /// Space below the baseline.
    pub descent: f64,
    /// Extra space after the row, split evenly above and below.
    pub leading: f64,
}

impl RowMetrics {
    /// Returns the distance from the top of this row to the top of the next.
    pub fn size(&self) -> f64 {
        self.ascent + self.descent + self.leading
    }
}

/// Adjusts row metrics during layout, for example to force a fixed line
/// height regardless of the fonts on a row.
pub trait LinePositionModifier: Send + Sync + fmt::Debug {
    /// Modifies the metrics of a row before it is placed.
    fn modify_row(&self, row: &mut RowMetrics);
}

/// Places every row exactly `height` apart.
#[derive(Copy, Clone, PartialEq, Debug)]
pub struct FixedLineHeight {
    /// Distance from the top of one row to the top of the next.
    pub height: f64,
}

impl LinePositionModifier for FixedLineHeight {
    fn modify_row(&self, row: &mut RowMetrics) {
        row.leading = self.height - row.ascent - row.descent;
    }
}

/// The shape and constraints text is laid out within.
///
/// Either dimension of `size` may be infinite, in which case the layout grows
/// along it. Coordinates of `path` and `exclusion_paths` share the
/// container's coordinate space, with the origin at the top left.
#[derive(Clone, Debug)]
pub struct Container {
    /// Bounding size.
    pub size: Size,
    /// Closed boundary text must stay within. `None` is the rectangle of `size`.
    pub path: Option<BezPath>,
    /// Shapes glyphs must avoid.
    pub exclusion_paths: Vec<BezPath>,
    /// Space reserved along each edge before paths are considered.
    pub insets: Insets,
    /// Maximum number of rows, where 0 means unlimited.
    pub maximum_lines: usize,
    /// Lay text out in vertical columns progressing right to left.
    pub vertical: bool,
    /// Wrapping and truncation policy.
    pub line_break_mode: LineBreakMode,
    /// Replaces the default `…` token when text is truncated.
    pub truncation_token: Option<StyledText>,
    /// Alignment of lines within their space.
    pub alignment: Alignment,
    /// Placement of the whole text within a taller container.
    pub vertical_alignment: VerticalAlignment,
    /// Hook adjusting row metrics before placement.
    pub line_position_modifier: Option<Arc<dyn LinePositionModifier>>,
}

impl Container {
    /// Creates a rectangular container of the given size.
    pub fn new(size: Size) -> Self {
        Self {
            size,
            path: None,
            exclusion_paths: Vec::new(),
            insets: Insets::ZERO,
            maximum_lines: 0,
            vertical: false,
            line_break_mode: LineBreakMode::default(),
            truncation_token: None,
            alignment: Alignment::default(),
            vertical_alignment: VerticalAlignment::default(),
            line_position_modifier: None,
        }
    }

    /// Creates a container bounded by `path`.
    pub fn with_path(path: BezPath) -> Self {
        use peniko::kurbo::Shape;
        let bounds = path.bounding_box();
        let mut container = Self::new(Size::new(bounds.x1.max(0.), bounds.y1.max(0.)));
        container.path = Some(path);
        container
    }

    /// Sets the maximum number of rows.
    pub fn maximum_lines(mut self, lines: usize) -> Self {
        self.maximum_lines = lines;
        self
    }

    /// Sets the insets.
    pub fn insets(mut self, insets: Insets) -> Self {
        self.insets = insets;
        self
    }

    /// Switches to vertical columns.
    pub fn vertical(mut self, vertical: bool) -> Self {
        self.vertical = vertical;
        self
    }

    /// Sets the wrapping and truncation policy.
    pub fn line_break_mode(mut self, mode: LineBreakMode) -> Self {
        self.line_break_mode = mode;
        self
    }

    /// Sets the alignment.
    pub fn alignment(mut self, alignment: Alignment) -> Self {
        self.alignment = alignment;
        self
    }

    /// Sets the vertical alignment.
    pub fn vertical_alignment(mut self, alignment: VerticalAlignment) -> Self {
        self.vertical_alignment = alignment;
        self
    }

    /// Adds an exclusion path.
    pub fn exclude(mut self, path: BezPath) -> Self {
        self.exclusion_paths.push(path);
        self
    }

    /// Sets the truncation token.
    pub fn truncation_token(mut self, token: StyledText) -> Self {
        self.truncation_token = Some(token);
        self
    }

    /// Sets the line position modifier.
    pub fn line_position_modifier(mut self, modifier: impl LinePositionModifier + 'static) -> Self {
        self.line_position_modifier = Some(Arc::new(modifier));
        self
    }
}

impl Default for Container {
    fn default() -> Self {
        Self::new(Size::new(f64::INFINITY, f64::INFINITY))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_line_height_sets_row_size() {
        let mut row = RowMetrics {
            index: 0,
            ascent: 12.,
            descent: 4.,
            leading: 2.,
        };
        FixedLineHeight { height: 24. }.modify_row(&mut row);
        assert_eq!(row.size(), 24.);
    }

    #[test]
    fn path_container_takes_path_bounds() {
        use peniko::kurbo::Shape;
        let path = peniko::kurbo::Rect::new(10., 20., 110., 70.).to_path(0.1);
        let container = Container::with_path(path);
        assert_eq!(container.size, Size::new(110., 70.));
    }
}
