// Copyright 2025 the Placard Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Breaking text into rows of the container region.

use core::ops::Range;

use peniko::kurbo::Size;

use crate::container::{Band, Container, LineBreakMode, Region, RowMetrics, VerticalAlignment};
use crate::style::Attributes;
use crate::text::StyledText;
use crate::util::EPSILON;

use super::alignment::align;
use super::analysis::{analyze, Analysis, AnalysisOptions, Unit, UnitKind};
use super::data::{GlyphData, LayoutData, LineData, RowData, RunData};
use super::line_break::{fill_line, reorder_by_level, Fill};
use super::truncate::truncate;
use super::{BreakReason, LineMetrics};

/// Empty bands skipped in a row before the search for space gives up.
const MAX_SKIPPED_BANDS: usize = 4096;

/// The ellipsis used when the container has no truncation token.
const DEFAULT_TOKEN: &str = "\u{2026}";

/// A line that has been broken but not yet positioned.
#[derive(Clone, Debug)]
pub(crate) struct PendingLine {
    pub(crate) row: usize,
    /// Span of the row band the line occupies.
    pub(crate) span: Range<f64>,
    /// Units in logical order.
    pub(crate) units: Vec<usize>,
    pub(crate) advance: f64,
    pub(crate) trailing_whitespace: f64,
    pub(crate) num_spaces: usize,
    pub(crate) break_reason: BreakReason,
    pub(crate) base_level: u8,
    pub(crate) truncated: bool,
    /// Advance axis position of the visual start, set by alignment.
    pub(crate) offset: f64,
    /// Extra advance for every justified space.
    pub(crate) space_extra: f64,
}

impl PendingLine {
    fn new(row: usize, span: Range<f64>, fill: Fill, base_level: u8) -> Self {
        Self {
            row,
            span,
            units: fill.units.collect(),
            advance: fill.advance,
            trailing_whitespace: fill.trailing_whitespace,
            num_spaces: fill.num_spaces,
            break_reason: fill.break_reason,
            base_level,
            truncated: false,
            offset: 0.,
            space_extra: 0.,
        }
    }
}

#[derive(Clone, Debug)]
struct PendingRow {
    top: f64,
    metrics: RowMetrics,
    lines: Range<usize>,
}

impl PendingRow {
    fn bottom(&self) -> f64 {
        self.top + self.metrics.size()
    }
}

/// Lays out `text` in `container`.
pub(crate) fn compute(text: &StyledText, container: &Container) -> LayoutData {
    let region = Region::new(container);
    let mut data = LayoutData::empty(text.clone(), region.axis());
    let vertical = container.vertical;

    let mut analysis = Analysis::default();
    let mut lines = Vec::new();
    let mut rows = Vec::new();

    if text.is_empty() {
        // An empty text still has one line, so carets and sizing have metrics.
        let mut metrics = RowMetrics::default();
        extend_metrics(&mut metrics, text.root_style(), false, vertical);
        if let Some(modifier) = &container.line_position_modifier {
            modifier.modify_row(&mut metrics);
        }
        let fill = Fill {
            units: 0..0,
            advance: 0.,
            trailing_whitespace: 0.,
            num_spaces: 0,
            break_reason: BreakReason::None,
        };
        lines.push(PendingLine::new(0, region.advance_range(), fill, 0));
        rows.push(PendingRow {
            top: region.block_start(),
            metrics,
            lines: 0..1,
        });
    } else if region.is_empty() {
        log::debug!("container has no room for {} bytes of text", text.len());
        data.is_truncated = true;
        let insets = container.insets;
        data.bounding_size = clamp_size(
            Size::new(insets.x0 + insets.x1, insets.y0 + insets.y1),
            container.size,
        );
        return data;
    } else {
        let options = AnalysisOptions {
            mode: container.line_break_mode,
            vertical,
            style_base: 0,
            token: false,
            level_override: None,
        };
        analyze(text, options, &mut analysis);
        data.base_level = analysis.base_level(0);
        let text_units = analysis.units.len();

        let mut breaker = Breaker {
            analysis: &analysis,
            styles: &data.styles,
            region: &region,
            container,
            lines: Vec::new(),
            rows: Vec::new(),
        };
        let cursor = breaker.break_rows();
        lines = breaker.lines;
        rows = breaker.rows;
        log::trace!(
            "broke {} of {text_units} units into {} lines",
            cursor,
            lines.len()
        );

        if cursor < text_units {
            data.is_truncated = true;
            if container.line_break_mode.inserts_token() {
                if let Some(line) = lines.last_mut() {
                    insert_token(&mut data, &mut analysis, line, container, text_units);
                    data.truncated_line = Some(lines.len() - 1);
                }
            }
        }
    }

    align(&mut lines, container.alignment, vertical);
    if region.is_clear_from(region.block_start()) {
        align_vertically(&mut lines, &mut rows, &region, container.vertical_alignment, vertical);
    }

    if vertical && !container.size.width.is_finite() {
        // Columns of unbounded vertical text grow to the left from the last one.
        let last = rows.iter().map(PendingRow::bottom).fold(0., f64::max);
        data.axis.right = last + container.insets.x0;
    }

    let mut visible: Option<Range<usize>> = None;
    for row in &rows {
        let first = data.lines.len();
        for line in &lines[row.lines.clone()] {
            let line_data = emit_line(&mut data, &analysis, line, row, &mut visible);
            data.lines.push(line_data);
        }
        data.rows.push(RowData {
            block: row.top..row.bottom(),
            lines: first..data.lines.len(),
        });
    }
    data.visible_range = visible.unwrap_or(0..0);

    data.bounding_size = bounding_size(&data, &rows, &region, container);
    data
}

/// Moves the text along the physical `y` axis into the free space of the
/// region. That is the block axis for horizontal text and the advance axis
/// for vertical text.
fn align_vertically(
    lines: &mut [PendingLine],
    rows: &mut [PendingRow],
    region: &Region,
    alignment: VerticalAlignment,
    vertical: bool,
) {
    let factor = alignment.factor();
    if factor == 0. {
        return;
    }
    let free = if vertical {
        let advance = region.advance_range();
        let end = lines
            .iter()
            .map(|line| {
                let stretch = line.space_extra * line.num_spaces as f64;
                line.offset + line.advance + stretch - line.trailing_whitespace
            })
            .fold(advance.start, f64::max);
        advance.end - end
    } else {
        let end = rows
            .iter()
            .map(PendingRow::bottom)
            .fold(region.block_start(), f64::max);
        region.block_limit() - end
    };
    if !free.is_finite() || free <= EPSILON {
        return;
    }
    let shift = free * factor;
    if vertical {
        for line in lines {
            line.offset += shift;
        }
    } else {
        for row in rows {
            row.top += shift;
        }
    }
}

/// Shapes the truncation token and fits it into the last line.
fn insert_token(
    data: &mut LayoutData,
    analysis: &mut Analysis,
    line: &mut PendingLine,
    container: &Container,
    text_units: usize,
) {
    let Some(&line_start) = line.units.first() else {
        return;
    };
    let token_text = match &container.truncation_token {
        Some(token) => token.clone(),
        None => {
            let style = line
                .units
                .iter()
                .rev()
                .map(|&index| &analysis.units[index])
                .find(|unit| !unit.is_newline())
                .map_or_else(
                    || data.text.root_style().clone(),
                    |unit| data.styles[unit.style_index].clone(),
                );
            StyledText::plain(
                DEFAULT_TOKEN,
                Attributes {
                    attachment: None,
                    ..style
                },
            )
        }
    };

    let style_base = data.styles.len();
    data.styles.extend_from_slice(token_text.styles());
    let token_start = analysis.units.len();
    let options = AnalysisOptions {
        mode: container.line_break_mode,
        vertical: container.vertical,
        style_base,
        token: true,
        level_override: Some(line.base_level),
    };
    analyze(&token_text, options, analysis);

    let width = line.span.end - line.span.start;
    let truncated = truncate(
        &analysis.units,
        line_start,
        text_units,
        token_start..analysis.units.len(),
        width,
        container.line_break_mode,
        data.text.len(),
    );
    log::trace!("elided {:?} of the text", truncated.elided);

    line.advance = analysis.advance_of(truncated.units.iter().copied());
    line.units = truncated.units;
    line.trailing_whitespace = 0.;
    line.num_spaces = 0;
    line.truncated = true;
    data.elided_range = Some(truncated.elided);
}

struct Breaker<'a> {
    analysis: &'a Analysis,
    styles: &'a [Attributes],
    region: &'a Region,
    container: &'a Container,
    lines: Vec<PendingLine>,
    rows: Vec<PendingRow>,
}

impl Breaker<'_> {
    /// Places rows until the text or the region runs out, returning the
    /// first unit that was not placed.
    fn break_rows(&mut self) -> usize {
        let units = &self.analysis.units;
        let limit = self.region.block_limit();
        let maximum_lines = self.container.maximum_lines;
        let mut top = self.region.block_start();
        let mut cursor = 0;
        let mut skipped = 0;
        // Widest band passed over since the last row, with its top.
        let mut widest_skipped: Option<(f64, Band)> = None;

        while cursor < units.len() {
            if maximum_lines != 0 && self.rows.len() >= maximum_lines {
                break;
            }
            let estimate = self.row_metrics(core::iter::once(cursor), Some(cursor));
            let thickness = estimate.size().max(EPSILON);

            let mut found = None;
            if top + thickness <= limit + EPSILON {
                let band = self.region.band(top..top + thickness);
                match self.fill_row(cursor, &band) {
                    Some(fills) => found = Some((fills, band)),
                    None => {
                        skipped += 1;
                        let exhausted = skipped > MAX_SKIPPED_BANDS
                            || (band.spans.is_empty() && self.region.is_clear_from(top));
                        let best = widest_skipped
                            .as_ref()
                            .map_or(0., |(_, band)| band.widest_width());
                        if band.widest_width() > best {
                            widest_skipped = Some((top, band));
                        }
                        if !exhausted {
                            top += (thickness * 0.25).max(1.);
                            continue;
                        }
                    }
                }
            }
            let (mut fills, band) = match found {
                Some(found) => found,
                None => {
                    // No band was ever wide enough for the next word, so
                    // break it in the widest one passed over.
                    let forced = widest_skipped.take().and_then(|(at, band)| {
                        let fills = self.force_row(cursor, &band)?;
                        Some((at, fills, band))
                    });
                    let Some((at, fills, band)) = forced else {
                        if skipped > 0 {
                            log::warn!("no room for text below {top}");
                        }
                        break;
                    };
                    log::debug!("breaking an unfitting word at block {at}");
                    top = at;
                    (fills, band)
                }
            };

            let mut metrics = self.metrics_for(&fills);
            if metrics.size() > thickness + EPSILON && !self.region.is_clear_from(top) {
                // The real row is taller than estimated, so the band may be narrower.
                let refined = self.region.band(top..top + metrics.size());
                if refined.spans != band.spans {
                    if let Some(refilled) = self.fill_row(cursor, &refined) {
                        metrics = self.metrics_for(&refilled);
                        fills = refilled;
                    }
                }
            }
            if top + metrics.size() > limit + EPSILON {
                break;
            }

            let row = self.rows.len();
            let first = self.lines.len();
            for (span, fill) in fills {
                cursor = fill.units.end;
                let source = units[fill.units.start].text_range.start;
                let base_level = self.analysis.base_level(source);
                self.lines.push(PendingLine::new(row, span, fill, base_level));
            }
            self.rows.push(PendingRow {
                top,
                metrics,
                lines: first..self.lines.len(),
            });
            top += metrics.size();
            skipped = 0;
            widest_skipped = None;
        }
        cursor
    }

    /// Fills the spans of one band from `cursor`, or returns `None` if the
    /// next word should wait for a wider band.
    fn fill_row(&self, cursor: usize, band: &Band) -> Option<Vec<(Range<f64>, Fill)>> {
        let units = &self.analysis.units;
        let widest = band.widest()?;
        if self.container.line_break_mode == LineBreakMode::Clip {
            let fill = fill_line(units, cursor, f64::INFINITY);
            return Some(vec![(widest.clone(), fill)]);
        }

        let full = self.region.advance_range();
        let full_width = full.end - full.start;
        let mut fills = Vec::new();
        let mut at = cursor;
        for span in &band.spans {
            if at >= units.len() {
                break;
            }
            let width = span.end - span.start;
            let needed = self.word_advance(at);
            if width + EPSILON < needed && needed <= full_width + EPSILON {
                continue;
            }
            let fill = fill_line(units, at, width);
            at = fill.units.end;
            let explicit = fill.break_reason == BreakReason::Explicit;
            fills.push((span.clone(), fill));
            if explicit {
                break;
            }
        }

        if fills.is_empty() {
            if self.word_advance(cursor) <= full_width + EPSILON {
                return None;
            }
            // No row will ever be wide enough, so break the word here.
            return self.force_row(cursor, band);
        }
        Some(fills)
    }

    /// Fills the widest span of `band` from `cursor`, breaking inside a word
    /// if it does not fit.
    fn force_row(&self, cursor: usize, band: &Band) -> Option<Vec<(Range<f64>, Fill)>> {
        let widest = band.widest()?;
        let fill = fill_line(&self.analysis.units, cursor, widest.end - widest.start);
        Some(vec![(widest.clone(), fill)])
    }

    /// Returns the advance from `at` up to the next break opportunity.
    fn word_advance(&self, at: usize) -> f64 {
        let units = &self.analysis.units;
        let Some(first) = units.get(at) else {
            return 0.;
        };
        if first.is_newline() {
            return 0.;
        }
        let mut advance = first.advance;
        for unit in &units[at + 1..] {
            if unit.break_before || unit.is_newline() || unit.is_space() {
                break;
            }
            advance += unit.advance;
        }
        advance
    }

    fn metrics_for(&self, fills: &[(Range<f64>, Fill)]) -> RowMetrics {
        let units = fills.iter().flat_map(|(_, fill)| fill.units.clone());
        let fallback = fills.first().map(|(_, fill)| fill.units.start);
        self.row_metrics(units, fallback)
    }

    /// Combines the extents of `units`, ignoring whitespace unless nothing
    /// else is there, and applies the line position modifier.
    fn row_metrics(
        &self,
        units: impl Iterator<Item = usize>,
        fallback: Option<usize>,
    ) -> RowMetrics {
        let vertical = self.container.vertical;
        let mut metrics = RowMetrics {
            index: self.rows.len(),
            ..RowMetrics::default()
        };
        let mut found = false;
        for unit in units.map(|index| &self.analysis.units[index]) {
            if unit.is_space() || unit.is_newline() {
                continue;
            }
            self.extend_with(&mut metrics, unit, vertical);
            found = true;
        }
        if !found {
            if let Some(unit) = fallback.and_then(|index| self.analysis.units.get(index)) {
                self.extend_with(&mut metrics, unit, vertical);
            }
        }
        if let Some(modifier) = &self.container.line_position_modifier {
            modifier.modify_row(&mut metrics);
        }
        metrics
    }

    fn extend_with(&self, metrics: &mut RowMetrics, unit: &Unit, vertical: bool) {
        let style = &self.styles[unit.style_index];
        extend_metrics(metrics, style, unit.kind == UnitKind::Attachment, vertical);
    }
}

/// Grows `metrics` to hold text or an attachment in `style`.
fn extend_metrics(metrics: &mut RowMetrics, style: &Attributes, attachment: bool, vertical: bool) {
    let font = style.metrics();
    let (ascent, descent, leading) = match style.attachment.as_ref().filter(|_| attachment) {
        Some(attachment) if vertical => {
            let half = attachment.size.width * 0.5;
            (half, half, 0.)
        }
        Some(attachment) => {
            let (ascent, descent) = attachment.vertical_extent(&font);
            (ascent, descent, 0.)
        }
        None => {
            let scale = f64::from(style.line_height);
            let ascent = f64::from(font.ascent) * scale;
            let descent = f64::from(font.descent) * scale;
            let leading = f64::from(font.leading) * scale;
            if vertical {
                let half = (ascent + descent) * 0.5;
                (half, half, leading)
            } else {
                let shift = f64::from(style.baseline_offset);
                (ascent + shift, (descent - shift).max(0.), leading)
            }
        }
    };
    metrics.ascent = metrics.ascent.max(ascent);
    metrics.descent = metrics.descent.max(descent);
    metrics.leading = metrics.leading.max(leading);
}

#[derive(Copy, Clone, PartialEq, Debug)]
struct RunKey {
    style_index: usize,
    highlight: Option<usize>,
    level: u8,
    token: bool,
    upright: bool,
    attachment: bool,
}

struct Segment {
    key: RunKey,
    /// Units with a flag telling whether they hang at the end of the line.
    units: Vec<(usize, bool)>,
}

/// Splits a line into runs, orders them visually and positions their glyphs.
fn emit_line(
    data: &mut LayoutData,
    analysis: &Analysis,
    line: &PendingLine,
    row: &PendingRow,
    visible: &mut Option<Range<usize>>,
) -> LineData {
    let vertical = data.axis.vertical;
    let units = &analysis.units;

    // Highlights stop short of whitespace hanging at the end of the line.
    let hanging_from = line
        .units
        .iter()
        .rposition(|&index| !units[index].is_space() && !units[index].is_newline())
        .map_or(0, |position| position + 1);

    let mut text_range: Option<Range<usize>> = None;
    let mut segments: Vec<Segment> = Vec::new();
    for (position, &index) in line.units.iter().enumerate() {
        let unit = &units[index];
        if !unit.token {
            let range = &unit.text_range;
            text_range = Some(match text_range {
                Some(covered) => covered.start.min(range.start)..covered.end.max(range.end),
                None => range.clone(),
            });
        }
        if unit.is_newline() {
            continue;
        }
        let hanging = position >= hanging_from;
        let key = RunKey {
            style_index: unit.style_index,
            highlight: unit.highlight.filter(|_| !hanging && !unit.token),
            level: unit.level,
            token: unit.token,
            upright: unit.upright,
            attachment: unit.kind == UnitKind::Attachment,
        };
        match segments.last_mut() {
            Some(segment) if segment.key == key && !key.attachment => {
                segment.units.push((index, hanging));
            }
            _ => segments.push(Segment {
                key,
                units: vec![(index, hanging)],
            }),
        }
    }
    if !vertical {
        reorder_by_level(&mut segments, |segment| segment.key.level);
    }

    let run_start = data.runs.len();
    let mut x = line.offset;
    for segment in &mut segments {
        let key = segment.key;
        if !vertical && key.level & 1 != 0 {
            segment.units.reverse();
        }
        let start_x = x;
        let glyph_start = data.glyphs.len();
        let mut covered: Option<Range<usize>> = None;
        for &(index, hanging) in &segment.units {
            let unit = &units[index];
            covered = Some(match covered {
                Some(covered) => {
                    covered.start.min(unit.text_range.start)..covered.end.max(unit.text_range.end)
                }
                None => unit.text_range.clone(),
            });
            let extra = if unit.is_space() && !hanging {
                line.space_extra
            } else {
                0.
            };
            let glyphs = &analysis.glyphs[unit.glyphs.clone()];
            let last_advancing = glyphs.iter().rposition(|glyph| glyph.advance > 0.);
            for (i, glyph) in glyphs.iter().enumerate() {
                let stretch = if Some(i) == last_advancing { extra } else { 0. };
                data.glyphs.push(GlyphData {
                    id: glyph.id,
                    offset: x + glyph.offset,
                    advance: glyph.advance + stretch,
                    width: glyph.width,
                    cluster: unit.text_range.clone(),
                });
            }
            x += unit.advance + extra;
        }
        data.runs.push(RunData {
            style_index: key.style_index,
            text_range: covered.unwrap_or(0..0),
            glyph_range: glyph_start..data.glyphs.len(),
            offset: start_x,
            advance: x - start_x,
            bidi_level: key.level,
            highlight: key.highlight,
            token: key.token,
            upright: key.upright,
            attachment: key.attachment,
        });
    }

    if let Some(range) = &text_range {
        *visible = Some(match visible.take() {
            Some(seen) => seen.start.min(range.start)..seen.end.max(range.end),
            None => range.clone(),
        });
    }
    let text_range = text_range.unwrap_or_else(|| {
        let at = data.elided_range.as_ref().map_or(0, |elided| elided.start);
        at..at
    });

    let metrics = row.metrics;
    LineData {
        row: line.row,
        text_range,
        run_range: run_start..data.runs.len(),
        metrics: LineMetrics {
            ascent: metrics.ascent,
            descent: metrics.descent,
            leading: metrics.leading,
            baseline: row.top + metrics.leading * 0.5 + metrics.ascent,
            offset: line.offset,
            advance: x - line.offset,
            trailing_whitespace: line.trailing_whitespace,
            available: line.span.end - line.span.start,
            min_coord: row.top,
            max_coord: row.bottom(),
        },
        break_reason: line.break_reason,
        base_level: line.base_level,
    }
}

fn bounding_size(data: &LayoutData, rows: &[PendingRow], region: &Region, container: &Container) -> Size {
    let insets = container.insets;
    let block_end = rows
        .iter()
        .map(PendingRow::bottom)
        .fold(region.block_start(), f64::max);
    let advance_end = data
        .lines
        .iter()
        .map(|line| {
            let metrics = &line.metrics;
            let is_rtl = !data.axis.vertical && line.base_level & 1 == 1;
            let hanging = if is_rtl { 0. } else { metrics.trailing_whitespace };
            metrics.offset + metrics.advance - hanging
        })
        .fold(region.advance_range().start, f64::max);

    let size = if data.axis.vertical {
        let width = if container.size.width.is_finite() {
            container.size.width
        } else {
            data.axis.right
        };
        Size::new(width, advance_end + insets.y1)
    } else {
        Size::new(advance_end + insets.x1, block_end + insets.y1)
    };
    clamp_size(size, container.size)
}

/// Clamps to the finite dimensions of `container` and rounds up to whole units.
fn clamp_size(size: Size, container: Size) -> Size {
    let clamp = |value: f64, max: f64| {
        let value = value.max(0.);
        if max.is_finite() { value.min(max) } else { value }
    };
    Size::new(clamp(size.width, container.width), clamp(size.height, container.height)).ceil()
}
