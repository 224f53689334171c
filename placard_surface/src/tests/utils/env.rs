// Copyright 2025 the Placard Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;

use placard::kurbo::Size;
use placard::{
    Container, Face, FixedFace, FontFace, FontMetrics, Layout, StyleProperty, StyledText,
    StyledTextBuilder,
};
use skrifa::outline::OutlinePen;
use skrifa::GlyphId;
use tiny_skia::Pixmap;

use crate::WorkerPool;

/// Font size of every test text. A regular character advances by 10, a row
/// is 20 tall with the baseline at 16, and each glyph is drawn as a box from
/// 1 to 9 horizontally and 4 to 16 vertically.
const FONT_SIZE: f32 = 20.;

/// A face that stalls the first time it is measured, so that the layout
/// using it finishes after layouts requested later.
#[derive(Debug)]
pub(crate) struct SlowFace {
    inner: FixedFace,
    delay: Duration,
    stalled: AtomicBool,
}

impl Face for SlowFace {
    fn metrics(&self, size: f32) -> FontMetrics {
        if !self.stalled.swap(true, Ordering::AcqRel) {
            thread::sleep(self.delay);
        }
        self.inner.metrics(size)
    }

    fn glyph_id(&self, ch: char) -> GlyphId {
        self.inner.glyph_id(ch)
    }

    fn advance(&self, glyph: GlyphId, size: f32) -> f32 {
        self.inner.advance(glyph, size)
    }

    fn draw_outline(&self, glyph: GlyphId, size: f32, pen: &mut dyn OutlinePen) -> bool {
        self.inner.draw_outline(glyph, size, pen)
    }
}

/// A face that meets `gate` twice when its first glyph is drawn, so a test
/// can hold rasterization after layout has finished.
#[derive(Debug)]
pub(crate) struct GatedFace {
    inner: FixedFace,
    gate: Arc<Barrier>,
    entered: AtomicBool,
}

impl Face for GatedFace {
    fn metrics(&self, size: f32) -> FontMetrics {
        self.inner.metrics(size)
    }

    fn glyph_id(&self, ch: char) -> GlyphId {
        self.inner.glyph_id(ch)
    }

    fn advance(&self, glyph: GlyphId, size: f32) -> f32 {
        self.inner.advance(glyph, size)
    }

    fn draw_outline(&self, glyph: GlyphId, size: f32, pen: &mut dyn OutlinePen) -> bool {
        if !self.entered.swap(true, Ordering::AcqRel) {
            self.gate.wait();
            self.gate.wait();
        }
        self.inner.draw_outline(glyph, size, pen)
    }
}

pub(crate) struct TestEnv {
    face: FontFace,
}

impl TestEnv {
    pub(crate) fn new() -> Self {
        Self {
            face: FontFace::new(FixedFace::default()),
        }
    }

    pub(crate) fn builder(&self, text: &str) -> StyledTextBuilder {
        builder(text, self.face.clone())
    }

    pub(crate) fn text(&self, text: &str) -> StyledText {
        self.builder(text).build()
    }

    /// Returns a text whose layout takes at least `delay`.
    pub(crate) fn slow_text(&self, text: &str, delay: Duration) -> StyledText {
        let face = FontFace::new(SlowFace {
            inner: FixedFace::default(),
            delay,
            stalled: AtomicBool::new(false),
        });
        builder(text, face).build()
    }

    /// Returns a text whose rasterization waits at `gate` until the test
    /// has met it twice.
    pub(crate) fn gated_text(&self, text: &str, gate: Arc<Barrier>) -> StyledText {
        let face = FontFace::new(GatedFace {
            inner: FixedFace::default(),
            gate,
            entered: AtomicBool::new(false),
        });
        builder(text, face).build()
    }

    pub(crate) fn container(&self) -> Container {
        Container::new(Size::new(200., 100.))
    }

    pub(crate) fn layout(&self, text: &StyledText) -> Layout {
        Layout::new(text, &self.container())
    }

    pub(crate) fn pool(&self, threads: usize) -> Arc<WorkerPool> {
        Arc::new(WorkerPool::new(threads).unwrap())
    }
}

fn builder(text: &str, face: FontFace) -> StyledTextBuilder {
    let mut builder = StyledText::builder(text);
    builder
        .push_default(StyleProperty::Font(face))
        .push_default(StyleProperty::FontSize(FONT_SIZE));
    builder
}

/// Returns the premultiplied channels of a pixel.
pub(crate) fn rgba(pixmap: &Pixmap, x: u32, y: u32) -> [u8; 4] {
    let pixel = pixmap.pixel(x, y).unwrap();
    [pixel.red(), pixel.green(), pixel.blue(), pixel.alpha()]
}

/// Returns the source text of a layout.
pub(crate) fn shown_text(layout: &Layout) -> String {
    layout.text().text().to_string()
}
