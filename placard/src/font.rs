// Copyright 2025 the Placard Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Font faces and metrics.
//!
//! Layout only needs a handful of answers from a font: vertical metrics,
//! a glyph for each character, and the advance of that glyph. Those are
//! captured by the [`Face`] trait. [`OpenTypeFace`] answers them from real
//! font data using Skrifa, while [`FixedFace`] uses fixed proportions and is
//! useful for headless measurement and tests.

use core::fmt;
use std::sync::{Arc, OnceLock};

use peniko::Blob;
use skrifa::instance::{LocationRef, Size};
use skrifa::outline::{DrawSettings, OutlinePen};
use skrifa::raw::FontRef;
use skrifa::{GlyphId, MetadataProvider};

use crate::Error;

/// Vertical metrics of a face at a specific size, in pixels.
///
/// All distances are positive; `descent` and the decoration offsets are
/// measured downwards from the baseline.
#[derive(Copy, Clone, Default, Debug, PartialEq)]
pub struct FontMetrics {
    /// Distance from the baseline to the top of the line box.
    pub ascent: f32,
    /// Distance from the baseline to the bottom of the line box.
    pub descent: f32,
    /// Recommended additional space between lines.
    pub leading: f32,
    /// Distance from the baseline to the top of the underline.
    pub underline_offset: f32,
    /// Thickness of the underline.
    pub underline_size: f32,
    /// Distance from the baseline up to the top of the strikethrough.
    pub strikethrough_offset: f32,
    /// Thickness of the strikethrough.
    pub strikethrough_size: f32,
}

impl FontMetrics {
    /// Returns the height of the line box, ignoring leading.
    pub fn height(&self) -> f32 {
        self.ascent + self.descent
    }
}

/// The font queries needed to lay out and draw text.
///
/// Implementations must be deterministic: the same inputs always produce the
/// same answers, which keeps layout reproducible across threads.
pub trait Face: Send + Sync + fmt::Debug {
    /// Returns the vertical metrics of the face at `size` pixels per em.
    fn metrics(&self, size: f32) -> FontMetrics;

    /// Maps a character to a glyph, returning [`GlyphId::NOTDEF`] when the
    /// face has no glyph for it.
    fn glyph_id(&self, ch: char) -> GlyphId;

    /// Returns the horizontal advance of `glyph` at `size` pixels per em.
    fn advance(&self, glyph: GlyphId, size: f32) -> f32;

    /// Draws the outline of `glyph` into `pen` in a y-up coordinate system
    /// with the origin on the baseline.
    ///
    /// Returns `false` if the glyph has no outline.
    fn draw_outline(&self, glyph: GlyphId, size: f32, pen: &mut dyn OutlinePen) -> bool {
        let _ = (glyph, size, pen);
        false
    }
}

/// A shared handle to a [`Face`].
///
/// Handles compare equal when they point to the same face, which is what
/// style deduplication needs.
#[derive(Clone)]
pub struct FontFace(Arc<dyn Face>);

impl FontFace {
    /// Wraps a face in a shareable handle.
    pub fn new(face: impl Face + 'static) -> Self {
        Self(Arc::new(face))
    }

    /// Returns the face behind this handle.
    pub fn face(&self) -> &dyn Face {
        &*self.0
    }
}

impl Default for FontFace {
    fn default() -> Self {
        static DEFAULT: OnceLock<FontFace> = OnceLock::new();
        DEFAULT
            .get_or_init(|| Self::new(FixedFace::default()))
            .clone()
    }
}

impl PartialEq for FontFace {
    fn eq(&self, other: &Self) -> bool {
        core::ptr::addr_eq(Arc::as_ptr(&self.0), Arc::as_ptr(&other.0))
    }
}

impl fmt::Debug for FontFace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("FontFace").field(&self.0).finish()
    }
}

impl From<Arc<dyn Face>> for FontFace {
    fn from(face: Arc<dyn Face>) -> Self {
        Self(face)
    }
}

/// A face with fixed proportions of the em square.
///
/// Every character gets either the regular advance or, for wide characters
/// (CJK, Hangul, Kana and full-width forms), the wide advance. Controls and
/// combining marks have no advance. Glyph ids are the character's code point
/// and every visible glyph is drawn as a filled box.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FixedFace {
    /// Advance of regular characters, as a fraction of the font size.
    pub advance: f32,
    /// Advance of wide characters, as a fraction of the font size.
    pub wide_advance: f32,
    /// Ascent as a fraction of the font size.
    pub ascent: f32,
    /// Descent as a fraction of the font size.
    pub descent: f32,
    /// Leading as a fraction of the font size.
    pub leading: f32,
}

impl Default for FixedFace {
    fn default() -> Self {
        Self {
            advance: 0.5,
            wide_advance: 1.0,
            ascent: 0.8,
            descent: 0.2,
            leading: 0.0,
        }
    }
}

impl FixedFace {
    /// Creates a face where every regular character advances by `advance` em.
    pub fn with_advance(advance: f32) -> Self {
        Self {
            advance,
            ..Self::default()
        }
    }
}

impl Face for FixedFace {
    fn metrics(&self, size: f32) -> FontMetrics {
        FontMetrics {
            ascent: self.ascent * size,
            descent: self.descent * size,
            leading: self.leading * size,
            underline_offset: self.descent * size * 0.5,
            underline_size: (size / 14.).max(1.),
            strikethrough_offset: self.ascent * size * 0.35,
            strikethrough_size: (size / 14.).max(1.),
        }
    }

    fn glyph_id(&self, ch: char) -> GlyphId {
        GlyphId::new(ch as u32)
    }

    fn advance(&self, glyph: GlyphId, size: f32) -> f32 {
        match char::from_u32(glyph.to_u32()) {
            Some(ch) if ch.is_control() || is_combining_mark(ch) => 0.,
            Some(ch) if is_wide(ch) => self.wide_advance * size,
            _ => self.advance * size,
        }
    }

    fn draw_outline(&self, glyph: GlyphId, size: f32, pen: &mut dyn OutlinePen) -> bool {
        let Some(ch) = char::from_u32(glyph.to_u32()) else {
            return false;
        };
        if ch.is_whitespace() || ch.is_control() {
            return false;
        }
        let advance = self.advance(glyph, size);
        let (x0, x1) = (advance * 0.1, advance * 0.9);
        let top = self.ascent * size * 0.75;
        pen.move_to(x0, 0.);
        pen.line_to(x1, 0.);
        pen.line_to(x1, top);
        pen.line_to(x0, top);
        pen.close();
        true
    }
}

/// A face backed by OpenType font data.
#[derive(Clone)]
pub struct OpenTypeFace {
    data: Blob<u8>,
    index: u32,
}

impl OpenTypeFace {
    /// Creates a face from the font at `index` in `data`.
    ///
    /// The data is validated up front so that later queries can assume a
    /// readable font.
    pub fn new(data: impl Into<Blob<u8>>, index: u32) -> Result<Self, Error> {
        let data = data.into();
        FontRef::from_index(data.data(), index).map_err(|err| Error::FontParse(err.to_string()))?;
        Ok(Self { data, index })
    }

    fn font(&self) -> Option<FontRef<'_>> {
        FontRef::from_index(self.data.data(), self.index).ok()
    }
}

impl fmt::Debug for OpenTypeFace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenTypeFace")
            .field("len", &self.data.data().len())
            .field("index", &self.index)
            .finish()
    }
}

impl Face for OpenTypeFace {
    fn metrics(&self, size: f32) -> FontMetrics {
        let Some(font) = self.font() else {
            return FontMetrics::default();
        };
        let metrics = font.metrics(Size::new(size), LocationRef::default());
        let (underline_offset, underline_size) = metrics
            .underline
            .map(|decoration| (decoration.offset, decoration.thickness))
            .unwrap_or_default();
        let (strikethrough_offset, strikethrough_size) = metrics
            .strikeout
            .map(|decoration| (decoration.offset, decoration.thickness))
            .unwrap_or_default();
        FontMetrics {
            ascent: metrics.ascent,
            descent: -metrics.descent,
            leading: metrics.leading,
            underline_offset: -underline_offset,
            underline_size,
            strikethrough_offset,
            strikethrough_size,
        }
    }

    fn glyph_id(&self, ch: char) -> GlyphId {
        self.font()
            .and_then(|font| font.charmap().map(ch))
            .unwrap_or(GlyphId::NOTDEF)
    }

    fn advance(&self, glyph: GlyphId, size: f32) -> f32 {
        self.font()
            .and_then(|font| {
                font.glyph_metrics(Size::new(size), LocationRef::default())
                    .advance_width(glyph)
            })
            .unwrap_or_default()
    }

    fn draw_outline(&self, glyph: GlyphId, size: f32, pen: &mut dyn OutlinePen) -> bool {
        let Some(font) = self.font() else {
            return false;
        };
        let Some(outline) = font.outline_glyphs().get(glyph) else {
            return false;
        };
        let settings = DrawSettings::unhinted(Size::new(size), LocationRef::default());
        outline.draw(settings, &mut DynPen(pen)).is_ok()
    }
}

/// Adapts a `dyn OutlinePen` to Skrifa's sized pen parameter.
struct DynPen<'a>(&'a mut dyn OutlinePen);

impl OutlinePen for DynPen<'_> {
    fn move_to(&mut self, x: f32, y: f32) {
        self.0.move_to(x, y);
    }

    fn line_to(&mut self, x: f32, y: f32) {
        self.0.line_to(x, y);
    }

    fn quad_to(&mut self, cx0: f32, cy0: f32, x: f32, y: f32) {
        self.0.quad_to(cx0, cy0, x, y);
    }

    fn curve_to(&mut self, cx0: f32, cy0: f32, cx1: f32, cy1: f32, x: f32, y: f32) {
        self.0.curve_to(cx0, cy0, cx1, cy1, x, y);
    }

    fn close(&mut self) {
        self.0.close();
    }
}

/// Returns `true` for characters that occupy a full em in East Asian text.
pub(crate) fn is_wide(ch: char) -> bool {
    matches!(ch as u32,
        0x1100..=0x115F
        | 0x2E80..=0x303E
        | 0x3041..=0x33FF
        | 0x3400..=0x4DBF
        | 0x4E00..=0x9FFF
        | 0xA000..=0xA4CF
        | 0xAC00..=0xD7A3
        | 0xF900..=0xFAFF
        | 0xFE30..=0xFE4F
        | 0xFF00..=0xFF60
        | 0xFFE0..=0xFFE6
        | 0x20000..=0x2FFFD
        | 0x30000..=0x3FFFD)
}

fn is_combining_mark(ch: char) -> bool {
    matches!(ch as u32,
        0x0300..=0x036F | 0x1AB0..=0x1AFF | 0x1DC0..=0x1DFF | 0x20D0..=0x20FF | 0xFE20..=0xFE2F)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_face_advances() {
        let face = FixedFace::default();
        let advance = |ch| face.advance(face.glyph_id(ch), 20.);
        assert_eq!(advance('a'), 10.);
        assert_eq!(advance(' '), 10.);
        assert_eq!(advance('\n'), 0.);
        assert_eq!(advance('\u{0301}'), 0.);
        assert_eq!(advance('漢'), 20.);
        assert_eq!(face.metrics(20.).height(), 20.);
    }

    #[test]
    fn default_faces_compare_equal() {
        assert_eq!(FontFace::default(), FontFace::default());
        assert_ne!(FontFace::new(FixedFace::default()), FontFace::default());
    }

    #[test]
    fn invalid_font_data_is_rejected() {
        let result = OpenTypeFace::new(Vec::<u8>::new(), 0);
        assert!(matches!(result, Err(Error::FontParse(_))));
    }
}
