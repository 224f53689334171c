// Copyright 2025 the Placard Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Replacing the overflowing part of the last line with a token.

use core::ops::Range;

use crate::container::LineBreakMode;
use crate::util::EPSILON;

use super::analysis::Unit;

/// The units of a truncated line and the source range they no longer show.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Truncated {
    /// Units in logical order, token included.
    pub(crate) units: Vec<usize>,
    pub(crate) elided: Range<usize>,
}

/// Truncates the line starting at unit `line_start` so that it and `token`
/// fit in `width`.
///
/// The candidates for the line are all text units from `line_start` to
/// `text_units`, so the head and middle modes can show the end of the text.
/// Neither side crosses a mandatory break.
pub(crate) fn truncate(
    units: &[Unit],
    line_start: usize,
    text_units: usize,
    token: Range<usize>,
    width: f64,
    mode: LineBreakMode,
    text_len: usize,
) -> Truncated {
    let token_advance: f64 = units[token.clone()].iter().map(|unit| unit.advance).sum();
    let available = (width - token_advance).max(0.);
    let candidates = line_start..text_units;
    let line_source = units
        .get(line_start)
        .map_or(text_len, |unit| unit.text_range.start);

    let prefix_end = |prefix: &Range<usize>| {
        if prefix.is_empty() {
            line_source
        } else {
            units[prefix.end - 1].text_range.end
        }
    };
    let suffix_start = |suffix: &Range<usize>| {
        if suffix.is_empty() {
            text_len
        } else {
            units[suffix.start].text_range.start
        }
    };

    let (prefix, suffix) = match mode {
        LineBreakMode::TruncateHead => {
            let suffix = take_suffix(units, candidates, available);
            (line_start..line_start, suffix)
        }
        LineBreakMode::TruncateMiddle => {
            let prefix = take_prefix(units, candidates.clone(), available * 0.5);
            let used: f64 = units[prefix.clone()].iter().map(|unit| unit.advance).sum();
            let suffix = take_suffix(units, prefix.end..candidates.end, available - used);
            (prefix, suffix)
        }
        _ => {
            let prefix = take_prefix(units, candidates, available);
            let end = prefix.end;
            (prefix, end..end)
        }
    };

    let elided = if mode == LineBreakMode::TruncateHead {
        line_source..suffix_start(&suffix)
    } else if suffix.is_empty() {
        prefix_end(&prefix)..text_len
    } else {
        prefix_end(&prefix)..suffix_start(&suffix)
    };
    let units = prefix.chain(token).chain(suffix).collect();
    Truncated { units, elided }
}

/// Takes units from the start of `range` while they fit.
fn take_prefix(units: &[Unit], range: Range<usize>, available: f64) -> Range<usize> {
    let mut end = range.start;
    let mut advance = 0.;
    while let Some(unit) = units[..range.end].get(end) {
        if unit.is_newline() || advance + unit.advance > available + EPSILON {
            break;
        }
        advance += unit.advance;
        end += 1;
    }
    while end > range.start && units[end - 1].is_space() {
        end -= 1;
    }
    range.start..end
}

/// Takes units from the end of `range` while they fit.
fn take_suffix(units: &[Unit], range: Range<usize>, available: f64) -> Range<usize> {
    let mut end = range.end;
    while end > range.start && units[end - 1].is_newline() {
        end -= 1;
    }
    let mut start = end;
    let mut advance = 0.;
    while start > range.start {
        let unit = &units[start - 1];
        if unit.is_newline() || advance + unit.advance > available + EPSILON {
            break;
        }
        advance += unit.advance;
        start -= 1;
    }
    while start < end && units[start].is_space() {
        start += 1;
    }
    start..end
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::analysis::{analyze, Analysis, AnalysisOptions};
    use crate::text::StyledText;

    /// Analyzes `text` followed by a one character token. Every character is 10 wide.
    fn setup(text: &str) -> (Analysis, usize) {
        let face = crate::FontFace::new(crate::FixedFace::default());
        let mut style = crate::Attributes::default();
        style.font = face;
        style.font_size = 20.;
        let mut analysis = Analysis::default();
        let mut options = AnalysisOptions {
            mode: LineBreakMode::TruncateTail,
            vertical: false,
            style_base: 0,
            token: false,
            level_override: None,
        };
        analyze(&StyledText::plain(text, style.clone()), options, &mut analysis);
        let text_units = analysis.units.len();
        options.token = true;
        options.level_override = Some(0);
        analyze(&StyledText::plain("~", style), options, &mut analysis);
        (analysis, text_units)
    }

    fn shown(text: &str, truncated: &Truncated, units: &[Unit]) -> String {
        truncated
            .units
            .iter()
            .map(|&index| {
                let unit = &units[index];
                if unit.token {
                    "~"
                } else {
                    &text[unit.text_range.clone()]
                }
            })
            .collect()
    }

    #[test]
    fn modes() {
        let text = "abcdefghij";
        let (analysis, count) = setup(text);
        let token = count..count + 1;
        let run = |mode| truncate(&analysis.units, 0, count, token.clone(), 50., mode, text.len());

        let tail = run(LineBreakMode::TruncateTail);
        assert_eq!(shown(text, &tail, &analysis.units), "abcd~");
        assert_eq!(tail.elided, 4..10);

        let head = run(LineBreakMode::TruncateHead);
        assert_eq!(shown(text, &head, &analysis.units), "~ghij");
        assert_eq!(head.elided, 0..6);

        let middle = run(LineBreakMode::TruncateMiddle);
        assert_eq!(shown(text, &middle, &analysis.units), "ab~ij");
        assert_eq!(middle.elided, 2..8);
    }

    #[test]
    fn tail_stops_at_newline_and_trims_spaces() {
        let text = "ab  \ncdef";
        let (analysis, count) = setup(text);
        let token = count..count + 1;
        let tail = truncate(
            &analysis.units,
            0,
            count,
            token,
            100.,
            LineBreakMode::TruncateTail,
            text.len(),
        );
        assert_eq!(shown(text, &tail, &analysis.units), "ab~");
        assert_eq!(tail.elided, 2..9);
    }

    #[test]
    fn token_wider_than_line_stands_alone() {
        let text = "abc";
        let (analysis, count) = setup(text);
        let tail = truncate(
            &analysis.units,
            0,
            count,
            count..count + 1,
            5.,
            LineBreakMode::TruncateTail,
            text.len(),
        );
        assert_eq!(tail.units, vec![count]);
        assert_eq!(tail.elided, 0..3);
    }
}
