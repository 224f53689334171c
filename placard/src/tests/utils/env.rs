// Copyright 2025 the Placard Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use core::fmt::Write;

use crate::kurbo::{Point, Rect};
use crate::{
    Container, FixedFace, FontFace, HitKind, Layout, StyleProperty, StyledText,
    StyledTextBuilder,
};

/// Font size used by every test text. With the default [`FixedFace`] a
/// regular character advances by 10 and a row is 20 tall.
pub(crate) const FONT_SIZE: f32 = 20.;

// Expands to the name of the current function
#[macro_export]
macro_rules! test_name {
    () => {{
        fn f() {}
        fn type_name_of<T>(_: T) -> &'static str {
            std::any::type_name::<T>()
        }
        let name = type_name_of(f);
        let name = &name[..name.len() - 3];
        &name[name.rfind(':').map(|x| x + 1).unwrap_or(0)..]
    }};
}

/// Builds texts and layouts for a test and checks every layout it makes
/// against the properties all layouts share.
///
/// Failed checks are collected and reported together when the environment
/// is dropped.
pub(crate) struct TestEnv {
    test_name: String,
    errors: Vec<String>,
}

impl TestEnv {
    pub(crate) fn new(test_name: &str) -> Self {
        Self {
            test_name: test_name.to_string(),
            errors: Vec::new(),
        }
    }

    pub(crate) fn builder(&self, text: &str) -> StyledTextBuilder {
        let mut builder = StyledText::builder(text);
        builder
            .push_default(StyleProperty::Font(FontFace::new(FixedFace::default())))
            .push_default(StyleProperty::FontSize(FONT_SIZE));
        builder
    }

    pub(crate) fn text(&self, text: &str) -> StyledText {
        self.builder(text).build()
    }

    /// Lays out `text` and checks the result.
    pub(crate) fn layout(&mut self, text: &StyledText, container: &Container) -> Layout {
        let layout = Layout::new(text, container);
        self.check_layout(&layout, container);
        layout
    }

    fn error(&mut self, message: String) {
        self.errors.push(message);
    }

    fn check_layout(&mut self, layout: &Layout, container: &Container) {
        let again = Layout::new(layout.text(), container);
        if dump(layout) != dump(&again) {
            self.error("laying out the same input twice gave different results".into());
        }

        let text = layout.text();
        if !layout.is_truncated() {
            let mut ranges: Vec<_> = layout.lines().map(|line| line.text_range()).collect();
            ranges.sort_by_key(|range| range.start);
            let mut end = 0;
            for range in ranges {
                if range.start != end {
                    self.error(format!("text between {end} and {} is missing", range.start));
                }
                end = range.end;
            }
            if end != text.len() {
                self.error(format!("lines end at {end}, the text at {}", text.len()));
            }
        } else if container.line_break_mode.inserts_token() && !layout.is_empty() {
            let tokens = layout
                .lines()
                .flat_map(|line| line.runs())
                .filter(|run| run.is_truncation_token())
                .count();
            if tokens == 0 {
                self.error("truncated layout has no token".into());
            }
            if layout.truncated_line_index().is_none() || layout.elided_range().is_none() {
                self.error("truncated layout does not say where".into());
            }
        }

        let bounds = Rect::from_origin_size(Point::ZERO, layout.bounding_size());
        for line in layout.lines() {
            for run in line.runs() {
                if let Some(highlight) = run.highlight() {
                    let range = run.text_range();
                    if range.start < highlight.range.start || range.end > highlight.range.end {
                        self.error(format!(
                            "run {range:?} leaves highlight {:?}",
                            highlight.range
                        ));
                    }
                }
                if run.is_truncation_token() || run.advance() <= 0. {
                    continue;
                }
                let center = run.rect().center();
                if !bounds.contains(center) {
                    continue;
                }
                match layout.hit_test(center) {
                    Some(hit) if hit.kind == HitKind::Exact => {
                        if !run.text_range().contains(&hit.offset) {
                            self.error(format!(
                                "hit at {center:?} gave {} outside run {:?}",
                                hit.offset,
                                run.text_range()
                            ));
                        }
                    }
                    other => self.error(format!("hit at {center:?} gave {other:?}")),
                }
            }
        }
    }
}

impl Drop for TestEnv {
    // Errors are reported together so that one test run shows every
    // broken check.
    fn drop(&mut self) {
        if !self.errors.is_empty() && !std::thread::panicking() {
            let mut panic_msg = format!("{} failed:\n", self.test_name);
            for message in &self.errors {
                writeln!(&mut panic_msg, "  {message}").unwrap();
            }
            panic!("{}", &panic_msg);
        }
    }
}

/// Returns the characters of each line in visual order, trailing
/// whitespace removed. Attachments show as U+FFFC.
pub(crate) fn line_texts(layout: &Layout) -> Vec<String> {
    layout
        .lines()
        .map(|line| {
            let mut text = String::new();
            for run in line.runs() {
                if run.attachment().is_some() {
                    text.push('\u{FFFC}');
                    continue;
                }
                text.extend(run.glyphs().filter_map(|glyph| char::from_u32(glyph.id)));
            }
            text.trim_end().to_string()
        })
        .collect()
}

fn dump(layout: &Layout) -> String {
    let mut out = format!(
        "{:?} {:?} {:?} {:?}\n",
        layout.bounding_size(),
        layout.visible_range(),
        layout.elided_range(),
        layout.truncated_line_index()
    );
    for line in layout.lines() {
        writeln!(
            &mut out,
            "{:?} {:?} {:?}",
            line.text_range(),
            line.metrics(),
            line.break_reason()
        )
        .unwrap();
        for run in line.runs() {
            let glyphs: Vec<_> = run.glyphs().collect();
            writeln!(
                &mut out,
                "  {:?} {} {} {:?}",
                run.text_range(),
                run.offset(),
                run.advance(),
                glyphs
            )
            .unwrap();
        }
    }
    out
}
