// Copyright 2025 the Placard Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use crate::container::Alignment;

use super::engine::PendingLine;
use super::BreakReason;

/// Positions each line within its span and computes justification.
///
/// Lines with an unbounded span are aligned within the widest line.
pub(crate) fn align(lines: &mut [PendingLine], alignment: Alignment, vertical: bool) {
    let widest = lines
        .iter()
        .map(|line| line.advance - line.trailing_whitespace)
        .fold(0., f64::max);

    for line in lines {
        // Vertical text keeps logical order, so it is always aligned as LTR.
        let is_rtl = !vertical && line.base_level & 1 == 1;
        let width = if line.span.end.is_finite() {
            line.span.end - line.span.start
        } else {
            widest
        };
        line.offset = line.span.start;
        line.space_extra = 0.;

        // Compute free space.
        let free_space = width - line.advance + line.trailing_whitespace;
        if free_space > 0. {
            match (alignment, is_rtl) {
                (Alignment::Left, _) | (Alignment::Start, false) | (Alignment::End, true) => {}
                (Alignment::Right, _) | (Alignment::Start, true) | (Alignment::End, false) => {
                    line.offset += free_space;
                }
                (Alignment::Center, _) => {
                    line.offset += free_space * 0.5;
                }
                (Alignment::Justified, _) => {
                    // The last line of a paragraph and lines without gaps are
                    // start aligned instead.
                    let last = matches!(line.break_reason, BreakReason::None | BreakReason::Explicit);
                    if last || line.truncated || line.num_spaces == 0 {
                        if is_rtl {
                            line.offset += free_space;
                        }
                    } else {
                        line.space_extra = free_space / line.num_spaces as f64;
                    }
                }
            }
        }

        if is_rtl {
            // Trailing whitespace hangs off the left edge of RTL lines.
            line.offset -= line.trailing_whitespace;
        }
    }
}
