// Copyright 2025 the Placard Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Range based style application.

use core::ops::Range;

use crate::style::{Attributes, StyleProperty};

use super::StyleRun;

/// Builder for constructing an ordered sequence of non-overlapping style runs
/// from a collection of ranged style properties.
#[derive(Clone, Debug, Default)]
pub(crate) struct RangedStyleBuilder {
    properties: Vec<(StyleProperty, Range<usize>)>,
    root_style: Attributes,
    len: usize,
}

impl RangedStyleBuilder {
    /// Prepares the builder for text of the specified length.
    ///
    /// The provided `root_style` is the default style applied to all text unless overridden.
    pub(crate) fn new(root_style: Attributes, len: usize) -> Self {
        Self {
            properties: Vec::new(),
            root_style,
            len,
        }
    }

    /// Change a property of the root style, which covers the full range of text.
    pub(crate) fn push_default(&mut self, property: StyleProperty) {
        self.root_style.apply(property);
    }

    /// Override a property for the specified range of text.
    ///
    /// The range must already be validated against the text.
    pub(crate) fn push(&mut self, property: StyleProperty, range: Range<usize>) {
        debug_assert!(range.end <= self.len, "range validated by the caller");
        if !range.is_empty() {
            self.properties.push((property, range));
        }
    }

    /// Computes the style table and style runs for the ranged properties.
    ///
    /// Every byte of the text is covered by exactly one run. Runs with equal
    /// styles that touch are merged, and equal styles share a table entry.
    pub(crate) fn finish(self) -> (Vec<Attributes>, Vec<StyleRun>) {
        let mut boundaries: Vec<usize> = Vec::with_capacity(self.properties.len() * 2 + 2);
        boundaries.push(0);
        boundaries.push(self.len);
        for (_, range) in &self.properties {
            boundaries.push(range.start);
            boundaries.push(range.end);
        }
        boundaries.sort_unstable();
        boundaries.dedup();

        let mut styles: Vec<Attributes> = Vec::new();
        let mut runs: Vec<StyleRun> = Vec::new();
        if self.len == 0 {
            styles.push(self.root_style);
            runs.push(StyleRun {
                style_index: 0,
                range: 0..0,
            });
            return (styles, runs);
        }

        for segment in boundaries.windows(2) {
            let range = segment[0]..segment[1];
            let mut style = self.root_style.clone();
            // Properties are visited in push order so the last one wins.
            for (property, property_range) in &self.properties {
                if property_range.start <= range.start
                    && range.end <= property_range.end
                    && !style.check(property)
                {
                    style.apply(property.clone());
                }
            }
            let style_index = match styles.iter().position(|existing| *existing == style) {
                Some(index) => index,
                None => {
                    styles.push(style);
                    styles.len() - 1
                }
            };
            match runs.last_mut() {
                Some(last) if last.style_index == style_index => last.range.end = range.end,
                _ => runs.push(StyleRun { style_index, range }),
            }
        }
        (styles, runs)
    }
}
