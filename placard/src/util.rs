// Copyright 2025 the Placard Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Misc helpers.

/// Tolerance used when comparing advances against available space.
pub(crate) const EPSILON: f64 = 1e-6;

pub(crate) fn nearly_eq(x: f64, y: f64) -> bool {
    (x - y).abs() < EPSILON
}

pub(crate) fn nearly_zero(x: f64) -> bool {
    nearly_eq(x, 0.)
}
