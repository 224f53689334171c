// Copyright 2025 the Placard Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Mapping points to text offsets and highlights.

use core::ops::Range;

use peniko::kurbo::{Point, Rect};

use crate::layout::data::{LayoutData, LineData};
use crate::layout::{is_newline, Layout};
use crate::text::HighlightPayload;

/// How a point relates to the text it was mapped to.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum HitKind {
    /// The point is over a glyph, attachment or truncation token.
    Exact,
    /// The point is beside the text and was mapped to the closest line edge.
    Nearest,
}

/// The highlight under a point.
#[derive(Clone, Debug)]
pub struct HitHighlight {
    /// Index of the highlight in [`StyledText::highlights`](crate::StyledText::highlights).
    pub index: usize,
    /// Source range of the highlight.
    pub range: Range<usize>,
    /// Data attached to the highlight.
    pub payload: HighlightPayload,
}

/// Result of a hit test.
#[derive(Clone, Debug)]
pub struct Hit {
    /// Byte offset in the source text.
    pub offset: usize,
    /// Index of the line the point was mapped to.
    pub line: usize,
    /// Whether the point was over the text or beside it.
    pub kind: HitKind,
    /// Present only for exact hits on highlighted runs.
    pub highlight: Option<HitHighlight>,
}

impl Layout {
    /// Maps `point` to the text under it.
    ///
    /// Returns `None` outside the bounding box or when there are no lines.
    /// Points inside a row but beside its glyphs map to the nearest line
    /// edge, and points between rows to the closer row.
    pub fn hit_test(&self, point: Point) -> Option<Hit> {
        locate(self, point)
    }
}

/// Maps `point` to the text of `layout` under it.
pub fn locate(layout: &Layout, point: Point) -> Option<Hit> {
    let data = &*layout.data;
    if data.lines.is_empty() {
        return None;
    }
    let bounds = Rect::from_origin_size(Point::ZERO, data.bounding_size);
    if !bounds.contains(point) {
        return None;
    }
    let (advance, block) = data.axis.to_logical(point);
    let row = &data.rows[data.row_for_block(block)?];
    if row.block.contains(&block) {
        for index in row.lines.clone() {
            if let Some(hit) = exact(data, index, advance) {
                return Some(hit);
            }
        }
    }
    nearest(data, row.lines.clone(), advance)
}

fn exact(data: &LayoutData, index: usize, advance: f64) -> Option<Hit> {
    let line = &data.lines[index];
    let runs = &data.runs[line.run_range.clone()];
    let at = runs.partition_point(|run| run.offset + run.advance <= advance);
    let run = runs
        .get(at)
        .filter(|run| run.offset <= advance && run.advance > 0.)?;

    if run.token {
        let offset = data
            .elided_range
            .as_ref()
            .map_or(line.text_range.end, |elided| elided.start);
        return Some(Hit {
            offset,
            line: index,
            kind: HitKind::Exact,
            highlight: None,
        });
    }

    let offset = if run.attachment {
        run.text_range.start
    } else {
        let glyphs = &data.glyphs[run.glyph_range.clone()];
        let at = glyphs.partition_point(|glyph| glyph.offset + glyph.advance <= advance);
        glyphs
            .get(at)
            .or(glyphs.last())
            .map_or(run.text_range.start, |glyph| glyph.cluster.start)
    };
    let highlight = run.highlight.and_then(|index| {
        let highlight = data.text.highlights().get(index)?;
        Some(HitHighlight {
            index,
            range: highlight.range.clone(),
            payload: highlight.payload.clone(),
        })
    });
    Some(Hit {
        offset,
        line: index,
        kind: HitKind::Exact,
        highlight,
    })
}

fn nearest(data: &LayoutData, lines: Range<usize>, advance: f64) -> Option<Hit> {
    let distance = |line: &LineData| {
        let start = line.metrics.offset;
        let end = start + line.metrics.advance;
        if advance < start {
            start - advance
        } else if advance > end {
            advance - end
        } else {
            0.
        }
    };
    let index = lines.min_by(|a, b| {
        distance(&data.lines[*a]).total_cmp(&distance(&data.lines[*b]))
    })?;
    let line = &data.lines[index];

    let start = line.metrics.offset;
    let end = start + line.metrics.advance;
    let near_start = (advance - start).abs() <= (advance - end).abs();
    let is_rtl = !data.axis.vertical && line.base_level & 1 != 0;
    let offset = if near_start != is_rtl {
        line.text_range.start
    } else {
        content_end(data.text.text(), &line.text_range)
    };
    Some(Hit {
        offset,
        line: index,
        kind: HitKind::Nearest,
        highlight: None,
    })
}

/// Returns the end of `range` without the mandatory break ending it.
fn content_end(text: &str, range: &Range<usize>) -> usize {
    let mut end = range.end;
    while let Some(ch) = text[range.start..end].chars().next_back() {
        if !is_newline(ch) {
            break;
        }
        end -= ch.len_utf8();
    }
    end
}
