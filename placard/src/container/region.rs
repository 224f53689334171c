// Copyright 2025 the Placard Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Free space of a container, in logical coordinates.
//!
//! Layout works along two logical axes: the advance axis, which glyphs
//! progress along, and the block axis, which rows stack along. For horizontal
//! text these are `x` and `y`. For vertical text the advance axis is `y` and
//! the block axis runs from the right edge of the container towards the left.

use core::ops::Range;

use peniko::kurbo::{BezPath, Line, ParamCurve, PathEl, Point, Rect, Shape};
use smallvec::SmallVec;

use super::Container;
use crate::util::EPSILON;

/// Fractions of a band at which boundary and exclusion paths are sampled.
const SAMPLES: [f64; 3] = [0.02, 0.5, 0.98];

/// Spans narrower than this are not worth placing text into.
const MIN_SPAN: f64 = 1.0;

pub(crate) type Spans = SmallVec<[Range<f64>; 2]>;

/// Maps between logical and physical coordinates.
#[derive(Copy, Clone, Debug, PartialEq)]
pub(crate) struct Axis {
    pub(crate) vertical: bool,
    /// Physical `x` of block coordinate zero in vertical form.
    pub(crate) right: f64,
}

impl Axis {
    pub(crate) fn horizontal() -> Self {
        Self {
            vertical: false,
            right: 0.,
        }
    }

    pub(crate) fn to_logical(self, point: Point) -> (f64, f64) {
        if self.vertical {
            (point.y, self.right - point.x)
        } else {
            (point.x, point.y)
        }
    }

    pub(crate) fn to_physical(self, advance: f64, block: f64) -> Point {
        if self.vertical {
            Point::new(self.right - block, advance)
        } else {
            Point::new(advance, block)
        }
    }

    /// Converts a logical box to a physical rectangle.
    pub(crate) fn rect(self, advance: Range<f64>, block: Range<f64>) -> Rect {
        Rect::from_points(
            self.to_physical(advance.start, block.start),
            self.to_physical(advance.end, block.end),
        )
    }

    /// Returns a physical line crossing `bounds` at logical block `block`.
    fn scanline(self, block: f64, bounds: Rect) -> Line {
        if self.vertical {
            let x = self.right - block;
            Line::new((x, bounds.y0 - 1.), (x, bounds.y1 + 1.))
        } else {
            Line::new((bounds.x0 - 1., block), (bounds.x1 + 1., block))
        }
    }
}

/// Free spans of one row band.
#[derive(Clone, Debug, Default)]
pub(crate) struct Band {
    /// Spans left for text, ordered along the advance axis.
    pub(crate) spans: Spans,
}

impl Band {
    /// Returns the widest span, preferring the earliest on ties.
    pub(crate) fn widest(&self) -> Option<&Range<f64>> {
        self.spans.iter().reduce(|widest, span| {
            if span.end - span.start > widest.end - widest.start {
                span
            } else {
                widest
            }
        })
    }

    /// Returns the width of the widest span, or zero without spans.
    pub(crate) fn widest_width(&self) -> f64 {
        self.widest().map_or(0., |span| span.end - span.start)
    }
}

/// The usable region of a container.
#[derive(Clone, Debug)]
pub(crate) struct Region {
    axis: Axis,
    advance: Range<f64>,
    block: Range<f64>,
    boundary: Option<(BezPath, Rect)>,
    exclusions: Vec<(BezPath, Rect)>,
}

impl Region {
    pub(crate) fn new(container: &Container) -> Self {
        let size = container.size;
        let insets = container.insets;
        let mut boundary = container.path.clone();
        let mut exclusions = container.exclusion_paths.clone();
        let axis = if container.vertical {
            if !size.width.is_finite() && (boundary.is_some() || !exclusions.is_empty()) {
                log::warn!("ignoring container paths for vertical text of unbounded width");
                boundary = None;
                exclusions.clear();
            }
            Axis {
                vertical: true,
                right: if size.width.is_finite() { size.width } else { 0. },
            }
        } else {
            Axis::horizontal()
        };
        let (mut advance, mut block) = if axis.vertical {
            (
                insets.y0..size.height - insets.y1,
                insets.x1..size.width - insets.x0,
            )
        } else {
            (
                insets.x0..size.width - insets.x1,
                insets.y0..size.height - insets.y1,
            )
        };
        let boundary = boundary.map(|path| {
            let bounds = path.bounding_box();
            let (a0, b0) = axis.to_logical(Point::new(bounds.x0, bounds.y0));
            let (a1, b1) = axis.to_logical(Point::new(bounds.x1, bounds.y1));
            advance.start = advance.start.max(a0.min(a1));
            advance.end = advance.end.min(a0.max(a1));
            block.start = block.start.max(b0.min(b1));
            block.end = block.end.min(b0.max(b1));
            (path, bounds)
        });
        let exclusions = exclusions
            .into_iter()
            .map(|path| {
                let bounds = path.bounding_box();
                (path, bounds)
            })
            .collect();
        Self {
            axis,
            advance,
            block,
            boundary,
            exclusions,
        }
    }

    pub(crate) fn axis(&self) -> Axis {
        self.axis
    }

    /// Returns the block coordinate the first row starts at.
    pub(crate) fn block_start(&self) -> f64 {
        self.block.start
    }

    /// Returns the block coordinate rows must not extend past.
    pub(crate) fn block_limit(&self) -> f64 {
        self.block.end
    }

    /// Returns the advance range of the inset rectangle.
    pub(crate) fn advance_range(&self) -> Range<f64> {
        self.advance.clone()
    }

    /// Returns `true` if no text can be placed at all.
    pub(crate) fn is_empty(&self) -> bool {
        !(self.advance.end - self.advance.start > EPSILON)
            || !(self.block.end - self.block.start > EPSILON)
    }

    /// Returns `true` if a band starting at `block` can only be obstructed
    /// by the inset rectangle.
    pub(crate) fn is_clear_from(&self, block: f64) -> bool {
        self.boundary.is_none()
            && self.exclusions.iter().all(|(_, bounds)| {
                let (_, b0) = self.axis.to_logical(Point::new(bounds.x0, bounds.y0));
                let (_, b1) = self.axis.to_logical(Point::new(bounds.x1, bounds.y1));
                b0.max(b1) <= block
            })
    }

    /// Computes the free spans of the band covering `block` on the block axis.
    pub(crate) fn band(&self, block: Range<f64>) -> Band {
        let mut spans: Spans = SmallVec::new();
        spans.push(self.advance.clone());
        if let Some((path, bounds)) = &self.boundary {
            for fraction in SAMPLES {
                let at = block.start + (block.end - block.start) * fraction;
                let inside = inside_intervals(&self.crossings(path, *bounds, at));
                spans = intersect(&spans, &inside);
            }
        }
        spans.retain(|span| span.end - span.start >= MIN_SPAN);
        for (path, bounds) in &self.exclusions {
            if let Some(blocked) = self.hull(path, *bounds, &block) {
                spans = subtract(&spans, &blocked);
            }
        }
        spans.retain(|span| span.end - span.start >= MIN_SPAN);
        Band { spans }
    }

    fn crossings(&self, path: &BezPath, bounds: Rect, block: f64) -> SmallVec<[f64; 8]> {
        let line = self.axis.scanline(block, bounds);
        let mut crossings: SmallVec<[f64; 8]> = SmallVec::new();
        for segment in path.segments() {
            for hit in segment.intersect_line(line) {
                let (advance, _) = self.axis.to_logical(line.eval(hit.line_t));
                crossings.push(advance);
            }
        }
        crossings.sort_by(f64::total_cmp);
        crossings
    }

    /// Returns the advance range an exclusion path blocks within a band.
    fn hull(&self, path: &BezPath, bounds: Rect, block: &Range<f64>) -> Option<Range<f64>> {
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        for fraction in SAMPLES {
            let at = block.start + (block.end - block.start) * fraction;
            for advance in self.crossings(path, bounds, at) {
                min = min.min(advance);
                max = max.max(advance);
            }
        }
        for element in path.elements() {
            let point = match *element {
                PathEl::MoveTo(p) | PathEl::LineTo(p) | PathEl::QuadTo(_, p) => p,
                PathEl::CurveTo(_, _, p) => p,
                PathEl::ClosePath => continue,
            };
            let (advance, at) = self.axis.to_logical(point);
            if block.contains(&at) {
                min = min.min(advance);
                max = max.max(advance);
            }
        }
        (min <= max).then_some(min..max)
    }
}

/// Pairs up sorted crossings using the even-odd rule.
fn inside_intervals(crossings: &[f64]) -> Spans {
    crossings
        .chunks_exact(2)
        .map(|pair| pair[0]..pair[1])
        .filter(|span| span.end > span.start)
        .collect()
}

fn intersect(a: &[Range<f64>], b: &[Range<f64>]) -> Spans {
    let mut out = SmallVec::new();
    let (mut i, mut j) = (0, 0);
    while i < a.len() && j < b.len() {
        let start = a[i].start.max(b[j].start);
        let end = a[i].end.min(b[j].end);
        if end > start {
            out.push(start..end);
        }
        if a[i].end < b[j].end {
            i += 1;
        } else {
            j += 1;
        }
    }
    out
}

fn subtract(spans: &[Range<f64>], blocked: &Range<f64>) -> Spans {
    let mut out = SmallVec::new();
    for span in spans {
        if blocked.end <= span.start || span.end <= blocked.start {
            out.push(span.clone());
            continue;
        }
        if span.start < blocked.start {
            out.push(span.start..blocked.start);
        }
        if blocked.end < span.end {
            out.push(blocked.end..span.end);
        }
    }
    out
}
