// Copyright 2025 the Placard Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Segmentation of styled text into layout units.
//!
//! A unit is the smallest piece of text line breaking deals with: a grapheme
//! cluster, further split wherever a style run or highlight begins, or a
//! whole attachment.

use core::ops::Range;

use icu_segmenter::options::LineBreakOptions;
use icu_segmenter::{GraphemeClusterSegmenter, LineSegmenter};
use unicode_bidi::BidiInfo;

use crate::container::LineBreakMode;
use crate::font::is_wide;
use crate::style::Attributes;
use crate::text::StyledText;

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub(crate) enum UnitKind {
    Text,
    /// Breaking whitespace, which may hang past the end of a line.
    Space,
    /// A mandatory line break.
    Newline,
    Attachment,
}

#[derive(Clone, Debug)]
pub(crate) struct Unit {
    /// Byte range in the source text, or in the truncation token for token units.
    pub(crate) text_range: Range<usize>,
    pub(crate) glyphs: Range<usize>,
    /// Index into the layout style table.
    pub(crate) style_index: usize,
    pub(crate) highlight: Option<usize>,
    pub(crate) advance: f64,
    pub(crate) kind: UnitKind,
    /// A line may break before this unit.
    pub(crate) break_before: bool,
    pub(crate) level: u8,
    /// Stands upright in vertical text.
    pub(crate) upright: bool,
    /// Belongs to the truncation token.
    pub(crate) token: bool,
}

impl Unit {
    pub(crate) fn is_space(&self) -> bool {
        self.kind == UnitKind::Space
    }

    pub(crate) fn is_newline(&self) -> bool {
        self.kind == UnitKind::Newline
    }
}

/// A glyph before positioning.
#[derive(Copy, Clone, Default, Debug, PartialEq)]
pub(crate) struct UnitGlyph {
    pub(crate) id: u32,
    /// Offset from the start of the unit along the advance axis.
    pub(crate) offset: f64,
    /// Advance along the advance axis.
    pub(crate) advance: f64,
    /// Horizontal advance from the font, used to center upright glyphs.
    pub(crate) width: f64,
}

/// Units and glyphs of the text and, once truncation happened, the token.
#[derive(Clone, Debug, Default)]
pub(crate) struct Analysis {
    pub(crate) units: Vec<Unit>,
    pub(crate) glyphs: Vec<UnitGlyph>,
    /// Paragraph ranges with their base level.
    pub(crate) paragraphs: Vec<(Range<usize>, u8)>,
}

impl Analysis {
    /// Returns the base level of the paragraph containing `offset`.
    pub(crate) fn base_level(&self, offset: usize) -> u8 {
        self.paragraphs
            .iter()
            .find(|(range, _)| range.contains(&offset))
            .or(self.paragraphs.last())
            .map(|(_, level)| *level)
            .unwrap_or(0)
    }

    /// Returns the summed advance of the given units.
    pub(crate) fn advance_of(&self, units: impl IntoIterator<Item = usize>) -> f64 {
        units.into_iter().map(|index| self.units[index].advance).sum()
    }
}

/// Options shared by all units of one analysis pass.
#[derive(Copy, Clone, Debug)]
pub(crate) struct AnalysisOptions {
    pub(crate) mode: LineBreakMode,
    pub(crate) vertical: bool,
    /// Offset added to style indices, so that token styles follow text styles.
    pub(crate) style_base: usize,
    pub(crate) token: bool,
    /// Level for every unit, used for the token which has no paragraph of its own.
    pub(crate) level_override: Option<u8>,
}

/// Appends the units of `text` to `analysis`.
pub(crate) fn analyze(text: &StyledText, options: AnalysisOptions, analysis: &mut Analysis) {
    let source = text.text();
    if source.is_empty() {
        return;
    }

    let mut cuts: Vec<usize> = GraphemeClusterSegmenter::new()
        .segment_str(source)
        .collect();
    cuts.extend(text.runs().iter().map(|run| run.range.start));
    for highlight in text.highlights() {
        cuts.push(highlight.range.start);
        cuts.push(highlight.range.end);
    }
    cuts.push(0);
    cuts.push(source.len());
    cuts.sort_unstable();
    cuts.dedup();

    let breaks: Vec<usize> = if options.mode.breaks_anywhere() {
        Vec::new()
    } else {
        LineSegmenter::new_auto(LineBreakOptions::default())
            .segment_str(source)
            .collect()
    };

    let levels: Vec<u8> = match options.level_override {
        Some(_) => Vec::new(),
        None => {
            let bidi = BidiInfo::new(source, None);
            if !options.token {
                analysis.paragraphs = bidi
                    .paragraphs
                    .iter()
                    .map(|paragraph| (paragraph.range.clone(), paragraph.level.number()))
                    .collect();
            }
            bidi.levels.iter().map(|level| level.number()).collect()
        }
    };

    let first_unit = analysis.units.len();
    for cut in cuts.windows(2) {
        let range = cut[0]..cut[1];
        let style_index = text.runs()[text.run_index_at(range.start)].style_index;
        let style = &text.styles()[style_index];
        let highlight = text.highlight_at(range.start).map(|(index, _)| index);
        let level = options
            .level_override
            .unwrap_or_else(|| levels.get(range.start).copied().unwrap_or(0));

        if let Some(attachment) = &style.attachment {
            // Runs covering one attachment may be split by other properties.
            if let Some(last) = analysis.units[first_unit..].last_mut() {
                let same = last.kind == UnitKind::Attachment
                    && last.text_range.end == range.start
                    && analysis_style(text, options, last.style_index).attachment.as_ref()
                        == Some(attachment);
                if same {
                    last.text_range.end = range.end;
                    continue;
                }
            }
            let advance = if options.vertical {
                attachment.size.height
            } else {
                attachment.size.width
            };
            let glyph_start = analysis.glyphs.len();
            analysis.units.push(Unit {
                text_range: range.clone(),
                glyphs: glyph_start..glyph_start,
                style_index: options.style_base + style_index,
                highlight,
                advance,
                kind: UnitKind::Attachment,
                break_before: range.start != 0,
                level,
                upright: true,
                token: options.token,
            });
            continue;
        }

        let cluster = &source[range.clone()];
        let first = cluster.chars().next().unwrap_or(' ');
        let kind = if is_newline(first) {
            UnitKind::Newline
        } else if first.is_whitespace() && !is_non_breaking(first) {
            UnitKind::Space
        } else {
            UnitKind::Text
        };
        let follows_attachment = analysis.units[first_unit..]
            .last()
            .is_some_and(|unit| unit.kind == UnitKind::Attachment);
        let break_before = range.start != 0
            && kind != UnitKind::Newline
            && (options.mode.breaks_anywhere()
                || follows_attachment
                || breaks.binary_search(&range.start).is_ok());
        let upright = options.vertical && is_wide(first);

        let glyph_start = analysis.glyphs.len();
        let advance = if kind == UnitKind::Newline {
            0.
        } else {
            push_glyphs(cluster, style, upright, &mut analysis.glyphs)
        };
        analysis.units.push(Unit {
            text_range: range,
            glyphs: glyph_start..analysis.glyphs.len(),
            style_index: options.style_base + style_index,
            highlight,
            advance,
            kind,
            break_before,
            level,
            upright,
            token: options.token,
        });
    }
}

fn analysis_style(text: &StyledText, options: AnalysisOptions, style_index: usize) -> &Attributes {
    &text.styles()[style_index - options.style_base]
}

/// Pushes the glyphs of one cluster and returns its advance.
fn push_glyphs(cluster: &str, style: &Attributes, upright: bool, glyphs: &mut Vec<UnitGlyph>) -> f64 {
    let face = style.font.face();
    let size = style.font_size;
    let start = glyphs.len();
    let mut offset = 0.;
    for ch in cluster.chars() {
        let id = face.glyph_id(ch);
        let width = f64::from(face.advance(id, size));
        let advance = if upright {
            if glyphs.len() == start {
                f64::from(size)
            } else {
                0.
            }
        } else {
            width
        };
        glyphs.push(UnitGlyph {
            id: id.to_u32(),
            offset,
            advance,
            width,
        });
        offset += advance;
    }
    let spacing = f64::from(style.letter_spacing);
    if offset > 0. && spacing != 0. {
        if let Some(last) = glyphs[start..].iter_mut().rev().find(|g| g.advance > 0.) {
            last.advance += spacing;
        }
        offset += spacing;
    }
    offset
}

pub(crate) fn is_newline(ch: char) -> bool {
    matches!(ch, '\n' | '\r' | '\u{0B}' | '\u{0C}' | '\u{85}' | '\u{2028}' | '\u{2029}')
}

fn is_non_breaking(ch: char) -> bool {
    matches!(ch, '\u{A0}' | '\u{2007}' | '\u{202F}')
}
