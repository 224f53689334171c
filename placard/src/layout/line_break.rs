// Copyright 2025 the Placard Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Greedy line breaking.

use core::ops::Range;

use crate::util::EPSILON;

use super::analysis::Unit;
use super::BreakReason;

#[derive(Copy, Clone, Default, Debug)]
struct LineState {
    x: f64,
    /// One past the last unit on the line.
    end: usize,
    num_spaces: usize,
}

/// The units one line fragment takes.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Fill {
    pub(crate) units: Range<usize>,
    /// Advance including trailing whitespace.
    pub(crate) advance: f64,
    pub(crate) trailing_whitespace: f64,
    /// Spaces that justification may stretch, not counting trailing ones.
    pub(crate) num_spaces: usize,
    pub(crate) break_reason: BreakReason,
}

/// Fills one line starting at unit `start`, taking as many units as fit in
/// `max_advance`.
///
/// At least one unit is taken whenever any remain, so callers always make
/// progress. A unit that does not fit an empty line overflows it.
pub(crate) fn fill_line(units: &[Unit], start: usize, max_advance: f64) -> Fill {
    let mut state = LineState {
        x: 0.,
        end: start,
        num_spaces: 0,
    };
    let mut prev_boundary: Option<LineState> = None;

    while let Some(unit) = units.get(state.end) {
        if unit.is_newline() {
            state.end += 1;
            return finish(units, start, state, BreakReason::Explicit);
        }
        // A boundary at the very start of the line would produce an empty line.
        if unit.break_before && state.end > start {
            prev_boundary = Some(state);
        }

        let next_x = state.x + unit.advance;
        if next_x <= max_advance + EPSILON {
            state.x = next_x;
            state.end += 1;
            if unit.is_space() {
                state.num_spaces += 1;
            }
            continue;
        }

        // Hang overflowing whitespace.
        if unit.is_space() {
            while let Some(space) = units.get(state.end).filter(|unit| unit.is_space()) {
                state.x += space.advance;
                state.end += 1;
                state.num_spaces += 1;
            }
            if units.get(state.end).is_some_and(Unit::is_newline) {
                state.end += 1;
                return finish(units, start, state, BreakReason::Explicit);
            }
            return finish(units, start, state, BreakReason::Regular);
        }
        if let Some(prev) = prev_boundary {
            return finish(units, start, prev, BreakReason::Regular);
        }
        if state.end == start {
            state.x = next_x;
            state.end += 1;
        }
        return finish(units, start, state, BreakReason::Emergency);
    }
    finish(units, start, state, BreakReason::None)
}

fn finish(units: &[Unit], start: usize, state: LineState, break_reason: BreakReason) -> Fill {
    let mut trailing_whitespace = 0.;
    let mut trailing_spaces = 0;
    for unit in units[start..state.end].iter().rev() {
        if unit.is_newline() {
            continue;
        }
        if !unit.is_space() {
            break;
        }
        trailing_whitespace += unit.advance;
        trailing_spaces += 1;
    }
    Fill {
        units: start..state.end,
        advance: state.x,
        trailing_whitespace,
        num_spaces: state.num_spaces.saturating_sub(trailing_spaces),
        break_reason,
    }
}

/// Reorders items within a line according to their bidi levels.
pub(crate) fn reorder_by_level<T>(items: &mut [T], level: impl Fn(&T) -> u8) {
    let count = items.len();

    // Find the max level and the min *odd* level
    let mut max_level = 0;
    let mut lowest_odd_level = 255;
    for item in items.iter() {
        let level = level(item);
        max_level = max_level.max(level);
        if level & 1 != 0 && level < lowest_odd_level {
            lowest_odd_level = level;
        }
    }

    for current in (lowest_odd_level..=max_level).rev() {
        let mut i = 0;
        while i < count {
            if level(&items[i]) >= current {
                let mut end = i + 1;
                while end < count && level(&items[end]) >= current {
                    end += 1;
                }
                items[i..end].reverse();
                i = end;
            }
            i += 1;
        }
    }
}
