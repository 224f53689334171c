// Copyright 2025 the Placard Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Styled text: a string, its style runs and its highlights.

mod highlight;
mod range;

use core::any::Any;
use core::ops::Range;
use std::sync::Arc;

pub use highlight::{Highlight, HighlightPayload};

use crate::style::{Attributes, StyleProperty};
use crate::Error;
use highlight::insert_highlight;
use range::RangedStyleBuilder;

/// A contiguous range of text sharing one resolved style.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct StyleRun {
    /// Index into [`StyledText::styles`].
    pub style_index: usize,
    /// Byte range of the run.
    pub range: Range<usize>,
}

/// An immutable string with resolved style runs and highlight ranges.
///
/// Cloning is cheap; the contents are shared. Offsets are byte offsets into
/// [`text`](Self::text) and always lie on `char` boundaries.
#[derive(Clone, Debug)]
pub struct StyledText {
    data: Arc<TextData>,
}

#[derive(Debug)]
struct TextData {
    text: Box<str>,
    styles: Vec<Attributes>,
    runs: Vec<StyleRun>,
    highlights: Vec<Highlight>,
}

impl StyledText {
    /// Starts building styled text over `text`.
    pub fn builder(text: impl Into<String>) -> StyledTextBuilder {
        StyledTextBuilder::new(text.into())
    }

    /// Creates text with a single style and no highlights.
    pub fn plain(text: impl Into<String>, style: Attributes) -> Self {
        StyledTextBuilder::with_root(text.into(), style).build()
    }

    /// Returns the underlying string.
    pub fn text(&self) -> &str {
        &self.data.text
    }

    /// Returns the length of the text in bytes.
    pub fn len(&self) -> usize {
        self.data.text.len()
    }

    /// Returns `true` if the text is empty.
    pub fn is_empty(&self) -> bool {
        self.data.text.is_empty()
    }

    /// Returns the deduplicated style table.
    pub fn styles(&self) -> &[Attributes] {
        &self.data.styles
    }

    /// Returns the style runs in text order. They cover the whole text
    /// without gaps; empty text has a single empty run.
    pub fn runs(&self) -> &[StyleRun] {
        &self.data.runs
    }

    /// Returns the style of the first run, used for empty lines.
    pub fn root_style(&self) -> &Attributes {
        &self.data.styles[self.data.runs[0].style_index]
    }

    /// Returns the index of the run containing `offset`. Offsets at or past
    /// the end map to the last run.
    pub fn run_index_at(&self, offset: usize) -> usize {
        let runs = &self.data.runs;
        runs.partition_point(|run| run.range.end <= offset)
            .min(runs.len() - 1)
    }

    /// Returns the style applied at `offset`.
    pub fn style_at(&self, offset: usize) -> &Attributes {
        let run = &self.data.runs[self.run_index_at(offset)];
        &self.data.styles[run.style_index]
    }

    /// Returns the highlights ordered by position. They never overlap.
    pub fn highlights(&self) -> &[Highlight] {
        &self.data.highlights
    }

    /// Returns the highlight covering `offset` and its index.
    pub fn highlight_at(&self, offset: usize) -> Option<(usize, &Highlight)> {
        let highlights = &self.data.highlights;
        let index = highlights.partition_point(|h| h.range.end <= offset);
        let highlight = highlights.get(index)?;
        highlight
            .range
            .contains(&offset)
            .then_some((index, highlight))
    }

    /// Returns `true` if both values share the same contents.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.data, &other.data)
    }
}

impl Default for StyledText {
    fn default() -> Self {
        Self::plain("", Attributes::default())
    }
}

impl From<&str> for StyledText {
    fn from(text: &str) -> Self {
        Self::plain(text, Attributes::default())
    }
}

/// Builder for [`StyledText`].
///
/// Properties pushed later override earlier ones on the ranges where they
/// overlap, and the same goes for highlights.
#[derive(Debug)]
pub struct StyledTextBuilder {
    text: String,
    styles: RangedStyleBuilder,
    highlights: Vec<Highlight>,
}

impl StyledTextBuilder {
    fn new(text: String) -> Self {
        Self::with_root(text, Attributes::default())
    }

    fn with_root(text: String, root: Attributes) -> Self {
        let len = text.len();
        Self {
            text,
            styles: RangedStyleBuilder::new(root, len),
            highlights: Vec::new(),
        }
    }

    /// Sets a property of the root style, which covers the full text.
    pub fn push_default(&mut self, property: StyleProperty) -> &mut Self {
        self.styles.push_default(property);
        self
    }

    /// Overrides a property for `range`.
    ///
    /// # Panics
    ///
    /// If `range` is reversed, out of bounds, or splits a character.
    pub fn push(&mut self, property: StyleProperty, range: Range<usize>) -> &mut Self {
        if let Err(err) = self.try_push(property, range) {
            panic!("invalid style range: {err}");
        }
        self
    }

    /// Overrides a property for `range`, reporting invalid ranges as errors.
    pub fn try_push(&mut self, property: StyleProperty, range: Range<usize>) -> Result<(), Error> {
        Error::check_range(&self.text, &range)?;
        self.styles.push(property, range);
        Ok(())
    }

    /// Marks `range` as interactive with the given payload.
    ///
    /// # Panics
    ///
    /// If `range` is reversed, out of bounds, or splits a character.
    pub fn push_highlight(
        &mut self,
        range: Range<usize>,
        payload: impl Any + Send + Sync,
    ) -> &mut Self {
        let highlight = Highlight::new(range, HighlightPayload::new(payload));
        if let Err(err) = self.try_push_highlight(highlight) {
            panic!("invalid highlight range: {err}");
        }
        self
    }

    /// Adds a fully specified highlight, reporting invalid ranges as errors.
    pub fn try_push_highlight(&mut self, highlight: Highlight) -> Result<(), Error> {
        Error::check_range(&self.text, &highlight.range)?;
        insert_highlight(&mut self.highlights, highlight);
        Ok(())
    }

    /// Resolves the style runs and freezes the text.
    pub fn build(self) -> StyledText {
        let (styles, runs) = self.styles.finish();
        StyledText {
            data: Arc::new(TextData {
                text: self.text.into_boxed_str(),
                styles,
                runs,
                highlights: self.highlights,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookups() {
        let mut builder = StyledText::builder("Hello World");
        builder
            .push(StyleProperty::FontSize(30.), 6..11)
            .push_highlight(6..11, "link");
        let text = builder.build();

        assert_eq!(text.runs().len(), 2);
        assert_eq!(text.style_at(0).font_size, 17.);
        assert_eq!(text.style_at(6).font_size, 30.);
        assert_eq!(text.style_at(11).font_size, 30.);
        assert!(text.highlight_at(5).is_none());
        assert_eq!(text.highlight_at(6).map(|(index, _)| index), Some(0));
        assert_eq!(text.highlight_at(10).map(|(index, _)| index), Some(0));
        assert!(text.highlight_at(11).is_none());
    }

    #[test]
    #[should_panic(expected = "invalid highlight range")]
    fn highlight_out_of_bounds_panics() {
        let mut builder = StyledText::builder("short");
        builder.push_highlight(2..9, ());
    }

    #[test]
    fn try_push_reports_errors() {
        let mut builder = StyledText::builder("héllo");
        assert!(matches!(
            builder.try_push(StyleProperty::FontSize(3.), 0..2),
            Err(Error::NotOnCharBoundary { index: 2, .. })
        ));
        assert!(builder
            .try_push(StyleProperty::FontSize(3.), 0..3)
            .is_ok());
    }

    #[test]
    fn empty_text_has_root_style() {
        let text = StyledText::from("");
        assert!(text.is_empty());
        assert_eq!(text.root_style(), &Attributes::default());
        assert_eq!(text.run_index_at(0), 0);
    }
}
