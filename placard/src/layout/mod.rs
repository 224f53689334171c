// Copyright 2025 the Placard Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Layout types.

mod alignment;
mod analysis;
mod engine;
mod line_break;
mod truncate;

pub(crate) mod data;

pub(crate) use analysis::is_newline;

use core::ops::Range;
use std::sync::Arc;

use peniko::kurbo::{self, Point, Rect, Size};

use crate::container::Container;
use crate::style::{Attachment, Attributes};
use crate::text::{Highlight, StyledText};
use data::{LayoutData, LineData, RunData};

/// Why a line ended.
#[derive(Copy, Clone, Default, PartialEq, Eq, Debug)]
pub enum BreakReason {
    /// The text ended.
    #[default]
    None,
    /// The line was full and broke at a line break opportunity.
    Regular,
    /// The text contained a mandatory break.
    Explicit,
    /// The line was full and had no break opportunity, so a word was split.
    Emergency,
}

/// Metrics of a line.
///
/// Values are in logical coordinates: the advance axis runs along the line
/// and the block axis across it. For horizontal text these are `x` and `y`;
/// for vertical text they are `y` and the distance leftwards from the right
/// edge. In vertical text the baseline is the center of the column.
#[derive(Copy, Clone, Default, PartialEq, Debug)]
pub struct LineMetrics {
    /// Space above the baseline, shared by every line of the row.
    pub ascent: f64,
    /// Space below the baseline, shared by every line of the row.
    pub descent: f64,
    /// Extra space of the row, split evenly above and below.
    pub leading: f64,
    /// Block coordinate of the baseline.
    pub baseline: f64,
    /// Advance coordinate where the content of the line starts.
    pub offset: f64,
    /// Full advance of the line, including trailing whitespace.
    pub advance: f64,
    /// Advance of trailing whitespace.
    pub trailing_whitespace: f64,
    /// Advance available to the line.
    pub available: f64,
    /// Block coordinate of the top of the row.
    pub min_coord: f64,
    /// Block coordinate of the bottom of the row.
    pub max_coord: f64,
}

impl LineMetrics {
    /// Returns the size of the row along the block axis.
    pub fn size(&self) -> f64 {
        self.max_coord - self.min_coord
    }
}

/// Immutable result of laying out styled text in a container.
///
/// Cloning is a reference count bump, and a layout may be read from any
/// number of threads.
#[derive(Clone, Debug)]
pub struct Layout {
    pub(crate) data: Arc<LayoutData>,
}

/// Lays out `text` within `container`.
pub fn compute_layout(text: &StyledText, container: &Container) -> Layout {
    Layout::new(text, container)
}

impl Layout {
    /// Lays out `text` within `container`.
    ///
    /// The result depends only on the inputs, so laying out the same text in
    /// the same container always gives the same geometry.
    pub fn new(text: &StyledText, container: &Container) -> Self {
        Self {
            data: Arc::new(engine::compute(text, container)),
        }
    }

    /// Returns the text the layout was computed for.
    pub fn text(&self) -> &StyledText {
        &self.data.text
    }

    /// Returns the styles referenced by runs, including those of the
    /// truncation token.
    pub fn styles(&self) -> &[Attributes] {
        &self.data.styles
    }

    /// Returns the number of lines in the layout.
    pub fn len(&self) -> usize {
        self.data.lines.len()
    }

    /// Returns `true` if the layout has no lines.
    pub fn is_empty(&self) -> bool {
        self.data.lines.is_empty()
    }

    /// Returns the line at the specified index.
    pub fn get(&self, index: usize) -> Option<Line<'_>> {
        Some(Line {
            layout: self,
            index,
            data: self.data.lines.get(index)?,
        })
    }

    /// Returns an iterator over the lines, ordered by row and then along
    /// the advance axis.
    pub fn lines(&self) -> impl Iterator<Item = Line<'_>> + Clone {
        self.data
            .lines
            .iter()
            .enumerate()
            .map(move |(index, data)| Line {
                layout: self,
                index,
                data,
            })
    }

    /// Returns the number of rows. A row holds several lines when exclusion
    /// paths split it.
    pub fn row_count(&self) -> usize {
        self.data.rows.len()
    }

    /// Returns the minimal size containing all rendered content plus the
    /// container insets, rounded up to whole pixels.
    pub fn bounding_size(&self) -> Size {
        self.data.bounding_size
    }

    /// Returns the range of source text covered by the rendered lines.
    pub fn visible_range(&self) -> Range<usize> {
        self.data.visible_range.clone()
    }

    /// Returns the source range replaced by the truncation token.
    pub fn elided_range(&self) -> Option<Range<usize>> {
        self.data.elided_range.clone()
    }

    /// Returns the index of the line holding the truncation token.
    pub fn truncated_line_index(&self) -> Option<usize> {
        self.data.truncated_line
    }

    /// Returns `true` if some of the text is not rendered.
    pub fn is_truncated(&self) -> bool {
        self.data.is_truncated
    }

    /// Returns `true` if the text flows in vertical columns.
    pub fn is_vertical(&self) -> bool {
        self.data.axis.vertical
    }

    /// Returns `true` if the first paragraph is right-to-left.
    pub fn is_rtl(&self) -> bool {
        self.data.base_level & 1 != 0
    }

    /// Returns the placed attachments.
    pub fn attachments(&self) -> impl Iterator<Item = PositionedAttachment> + '_ {
        self.lines().flat_map(|line| line.runs()).filter_map(|run| {
            let attachment = *run.attachment()?;
            Some(PositionedAttachment {
                rect: run.attachment_rect(&attachment),
                attachment,
                text_range: run.text_range(),
            })
        })
    }

    /// Returns the rectangles of the runs belonging to highlight `index`.
    pub fn highlight_rects(&self, index: usize) -> Vec<Rect> {
        self.lines()
            .flat_map(|line| line.runs())
            .filter(|run| run.highlight_index() == Some(index))
            .map(|run| run.rect())
            .collect()
    }

    /// Returns `true` if both handles share the same layout.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.data, &other.data)
    }
}

impl Default for Layout {
    fn default() -> Self {
        Self::new(&StyledText::default(), &Container::default())
    }
}

/// A line fragment of a layout.
#[derive(Copy, Clone)]
pub struct Line<'a> {
    layout: &'a Layout,
    index: usize,
    data: &'a LineData,
}

impl<'a> Line<'a> {
    /// Returns the index of the line.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Returns the row the line sits on.
    pub fn row(&self) -> usize {
        self.data.row
    }

    /// Returns the metrics for the line.
    pub fn metrics(&self) -> &'a LineMetrics {
        &self.data.metrics
    }

    /// Returns why the line ended.
    pub fn break_reason(&self) -> BreakReason {
        self.data.break_reason
    }

    /// Returns the range of source text for the line, not counting a
    /// truncation token.
    pub fn text_range(&self) -> Range<usize> {
        self.data.text_range.clone()
    }

    /// Returns `true` if the line ends with, starts with, or contains the
    /// truncation token.
    pub fn is_truncated(&self) -> bool {
        self.layout.data.truncated_line == Some(self.index)
    }

    /// Returns `true` if the paragraph of the line is right-to-left.
    pub fn is_rtl(&self) -> bool {
        self.data.base_level & 1 != 0
    }

    /// Returns the number of runs in the line.
    pub fn len(&self) -> usize {
        self.data.run_range.len()
    }

    /// Returns `true` if the line has no runs.
    pub fn is_empty(&self) -> bool {
        self.data.run_range.is_empty()
    }

    /// Returns the bounding rectangle of the line content and its row.
    pub fn rect(&self) -> Rect {
        let metrics = &self.data.metrics;
        self.layout.data.axis.rect(
            metrics.offset..metrics.offset + metrics.advance,
            metrics.min_coord..metrics.max_coord,
        )
    }

    /// Returns the point where the baseline of the line starts.
    pub fn baseline_origin(&self) -> Point {
        let metrics = &self.data.metrics;
        self.layout
            .data
            .axis
            .to_physical(metrics.offset, metrics.baseline)
    }

    /// Returns an iterator over the runs of the line in visual order.
    pub fn runs(&self) -> impl Iterator<Item = GlyphRun<'a>> + 'a + Clone {
        let layout = self.layout;
        let line = self.data;
        layout.data.runs[line.run_range.clone()]
            .iter()
            .map(move |data| GlyphRun { layout, line, data })
    }
}

/// A sequence of positioned glyphs sharing one style, highlight and
/// direction.
#[derive(Copy, Clone)]
pub struct GlyphRun<'a> {
    layout: &'a Layout,
    line: &'a LineData,
    data: &'a RunData,
}

impl<'a> GlyphRun<'a> {
    /// Returns the style of the run.
    pub fn style(&self) -> &'a Attributes {
        &self.layout.data.styles[self.data.style_index]
    }

    /// Returns the source range of the run. For the truncation token this
    /// is a range of the token text.
    pub fn text_range(&self) -> Range<usize> {
        self.data.text_range.clone()
    }

    /// Returns the advance coordinate of the visual start of the run.
    pub fn offset(&self) -> f64 {
        self.data.offset
    }

    /// Returns the total advance of the run.
    pub fn advance(&self) -> f64 {
        self.data.advance
    }

    /// Returns the block coordinate of the baseline.
    pub fn baseline(&self) -> f64 {
        self.line.metrics.baseline
    }

    /// Returns the bidi embedding level.
    pub fn bidi_level(&self) -> u8 {
        self.data.bidi_level
    }

    /// Returns `true` if glyphs progress right to left.
    pub fn is_rtl(&self) -> bool {
        self.data.bidi_level & 1 != 0
    }

    /// Returns `true` if the run is the truncation token.
    pub fn is_truncation_token(&self) -> bool {
        self.data.token
    }

    /// Returns `true` if glyphs stand upright in vertical text.
    pub fn is_upright(&self) -> bool {
        self.layout.data.axis.vertical && self.data.upright
    }

    /// Returns `true` if glyphs are rotated clockwise, which is how
    /// non-CJK text is set in vertical form.
    pub fn is_rotated(&self) -> bool {
        self.layout.data.axis.vertical && !self.data.upright
    }

    /// Returns the attachment the run stands for.
    pub fn attachment(&self) -> Option<&'a Attachment> {
        if self.data.attachment {
            self.style().attachment.as_ref()
        } else {
            None
        }
    }

    /// Returns the index of the highlight covering the run.
    pub fn highlight_index(&self) -> Option<usize> {
        self.data.highlight
    }

    /// Returns the highlight covering the run.
    pub fn highlight(&self) -> Option<&'a Highlight> {
        self.layout
            .data
            .text
            .highlights()
            .get(self.data.highlight?)
    }

    /// Returns the rectangle of the run, spanning the full row.
    pub fn rect(&self) -> Rect {
        let metrics = &self.line.metrics;
        self.layout.data.axis.rect(
            self.data.offset..self.data.offset + self.data.advance,
            metrics.min_coord..metrics.max_coord,
        )
    }

    /// Returns the segment running along the run at `offset` below the
    /// baseline, for drawing decorations.
    pub fn decoration_segment(&self, offset: f64) -> kurbo::Line {
        let axis = self.layout.data.axis;
        let block = self.baseline() - f64::from(self.style().baseline_offset) + offset;
        kurbo::Line::new(
            axis.to_physical(self.data.offset, block),
            axis.to_physical(self.data.offset + self.data.advance, block),
        )
    }

    /// Returns the positioned glyphs in visual order.
    ///
    /// Glyph origins are on the baseline. Glyphs of a rotated run are drawn
    /// rotated clockwise by a quarter turn around their origin.
    pub fn glyphs(&self) -> impl Iterator<Item = Glyph> + 'a + Clone {
        let axis = self.layout.data.axis;
        let style = self.style();
        let shift = f64::from(style.baseline_offset);
        let baseline = self.baseline();
        let upright = self.is_upright();
        let font = style.metrics();
        let (ascent, descent) = (f64::from(font.ascent), f64::from(font.descent));
        // Upright glyphs sit in an em box, rotated glyphs are centered on the column.
        let em_ascent = if ascent + descent > 0. {
            f64::from(style.font_size) * ascent / (ascent + descent)
        } else {
            0.
        };
        self.layout.data.glyphs[self.data.glyph_range.clone()]
            .iter()
            .map(move |glyph| {
                let (x, y) = if !axis.vertical {
                    (glyph.offset, baseline - shift)
                } else {
                    let center = axis.right - baseline + shift;
                    if upright {
                        (center - glyph.width * 0.5, glyph.offset + em_ascent)
                    } else {
                        (center - (ascent - descent) * 0.5, glyph.offset)
                    }
                };
                Glyph {
                    id: glyph.id,
                    x,
                    y,
                    advance: glyph.advance,
                    cluster: glyph.cluster.clone(),
                }
            })
    }

    fn attachment_rect(&self, attachment: &Attachment) -> Rect {
        let axis = self.layout.data.axis;
        let baseline = self.baseline();
        let block = if axis.vertical {
            let half = attachment.size.width * 0.5;
            baseline - half..baseline + half
        } else {
            let font = self.style().metrics();
            let (ascent, descent) = attachment.vertical_extent(&font);
            baseline - ascent..baseline + descent
        };
        axis.rect(self.data.offset..self.data.offset + self.data.advance, block)
    }
}

/// A positioned glyph.
#[derive(Clone, Default, PartialEq, Debug)]
pub struct Glyph {
    /// Glyph identifier in the run's font.
    pub id: u32,
    /// Horizontal position of the origin.
    pub x: f64,
    /// Vertical position of the origin.
    pub y: f64,
    /// Advance along the line.
    pub advance: f64,
    /// Source range of the cluster the glyph belongs to.
    pub cluster: Range<usize>,
}

/// An attachment together with where it was placed.
#[derive(Clone, PartialEq, Debug)]
pub struct PositionedAttachment {
    /// The attachment.
    pub attachment: Attachment,
    /// The rectangle the attachment occupies.
    pub rect: Rect,
    /// Source range the attachment replaces.
    pub text_range: Range<usize>,
}
