// Copyright 2025 the Placard Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Drawing layouts into [`tiny_skia`] pixmaps.
//!
//! Glyph outlines come from each run's [`Face`] through Skrifa's
//! [`OutlinePen`]. Attachments are drawn only as their placeholder fill; their
//! content belongs to the host.

use placard::kurbo::{self, Size, Vec2};
use placard::{Color, DecorationStyle, Face, GlyphRun, Highlight, Layout};
use skrifa::outline::OutlinePen;
use skrifa::GlyphId;
use tiny_skia::{FillRule, Paint, PathBuilder, Pixmap, PixmapMut, PixmapPaint, Rect, Transform};

use crate::{Error, RenderOptions};

/// Rasterizes `layout` into a pixmap of its bounding size times
/// [`RenderOptions::scale`].
///
/// Runs of the highlight at `active_highlight` use the highlight's active
/// colors. Returns `Ok(None)` when the layout covers less than a pixel.
pub fn rasterize(
    layout: &Layout,
    options: &RenderOptions,
    active_highlight: Option<usize>,
) -> Result<Option<Pixmap>, Error> {
    let Some((width, height)) = pixel_size(layout.bounding_size(), options.scale) else {
        return Ok(None);
    };
    let mut pixmap = Pixmap::new(width, height).ok_or(Error::PixmapAllocation { width, height })?;
    if let Some(background) = options.background {
        pixmap.fill(skia_color(background));
    }
    let transform = Transform::from_scale(to_f32(options.scale), to_f32(options.scale));

    {
        let mut pen = TinySkiaPen::new(pixmap.as_mut(), transform);
        for line in layout.lines() {
            for run in line.runs() {
                let background = active(&run, active_highlight).and_then(|h| h.active_background);
                if let Some(background) = background {
                    pen.set_color(background);
                    pen.fill_rect(run.rect());
                }
            }
        }
        if options.draw_placeholders {
            for positioned in layout.attachments() {
                if let Some(color) = positioned.attachment.placeholder {
                    pen.set_color(color);
                    pen.fill_rect(positioned.rect);
                }
            }
        }
    }

    draw_shadows(&mut pixmap, layout, transform, options.scale)?;

    let mut pen = TinySkiaPen::new(pixmap.as_mut(), transform);
    for line in layout.lines() {
        for run in line.runs() {
            if run.attachment().is_some() {
                continue;
            }
            let color = active(&run, active_highlight)
                .and_then(|h| h.active_color)
                .unwrap_or(run.style().color);
            pen.draw_run(&run, color, Vec2::ZERO);
        }
    }
    Ok(Some(pixmap))
}

fn active<'a>(run: &GlyphRun<'a>, active_highlight: Option<usize>) -> Option<&'a Highlight> {
    if active_highlight.is_some() && run.highlight_index() == active_highlight {
        run.highlight()
    } else {
        None
    }
}

/// Draws every shadowed run into a separate layer, blurs it and composites it
/// under the text.
fn draw_shadows(
    pixmap: &mut Pixmap,
    layout: &Layout,
    transform: Transform,
    scale: f64,
) -> Result<(), Error> {
    let (width, height) = (pixmap.width(), pixmap.height());
    let mut layer: Option<Pixmap> = None;
    let mut blur_radius: f64 = 0.;
    for line in layout.lines() {
        for run in line.runs() {
            let Some(shadow) = run.style().shadow else {
                continue;
            };
            if run.attachment().is_some() {
                continue;
            }
            if layer.is_none() {
                let pixmap = Pixmap::new(width, height);
                layer = Some(pixmap.ok_or(Error::PixmapAllocation { width, height })?);
            }
            let Some(layer) = layer.as_mut() else {
                continue;
            };
            blur_radius = blur_radius.max(shadow.blur_radius);
            let mut pen = TinySkiaPen::new(layer.as_mut(), transform);
            pen.draw_run(&run, shadow.color, shadow.offset);
        }
    }
    if let Some(mut layer) = layer {
        box_blur(&mut layer, to_pixels(blur_radius * scale));
        pixmap.draw_pixmap(
            0,
            0,
            layer.as_ref(),
            &PixmapPaint::default(),
            Transform::identity(),
            None,
        );
    }
    Ok(())
}

/// Blurs the pixmap with a horizontal then a vertical box filter.
///
/// Averaging premultiplied channels keeps every pixel valid.
fn box_blur(pixmap: &mut Pixmap, radius: usize) {
    if radius == 0 {
        return;
    }
    let (width, height) = (pixmap.width() as usize, pixmap.height() as usize);
    let data = pixmap.data_mut();
    let mut scratch = vec![0_u8; data.len()];
    blur_pass(data, &mut scratch, width, height, radius, 4, width * 4);
    blur_pass(&scratch, data, height, width, radius, width * 4, 4);
}

/// Averages `len` pixels `step` bytes apart along each of `lines` lines
/// starting `stride` bytes apart.
fn blur_pass(
    src: &[u8],
    dst: &mut [u8],
    len: usize,
    lines: usize,
    radius: usize,
    step: usize,
    stride: usize,
) {
    for line in 0..lines {
        let base = line * stride;
        for channel in 0..4 {
            let at = |i: usize| base + i * step + channel;
            for i in 0..len {
                let lo = i.saturating_sub(radius);
                let hi = (i + radius).min(len - 1);
                let sum: u32 = (lo..=hi).map(|j| u32::from(src[at(j)])).sum();
                #[expect(
                    clippy::cast_possible_truncation,
                    reason = "the average of bytes fits in a byte"
                )]
                let average = (sum / (hi - lo + 1) as u32) as u8;
                dst[at(i)] = average;
            }
        }
    }
}

fn pixel_size(size: Size, scale: f64) -> Option<(u32, u32)> {
    let (width, height) = ((size.width * scale).ceil(), (size.height * scale).ceil());
    if !(width >= 1. && height >= 1.) {
        return None;
    }
    #[expect(
        clippy::cast_possible_truncation,
        reason = "oversized pixmaps saturate and then fail to allocate"
    )]
    let size = (width as u32, height as u32);
    Some(size)
}

fn to_pixels(distance: f64) -> usize {
    #[expect(
        clippy::cast_possible_truncation,
        reason = "blur radii are small and non-negative"
    )]
    let pixels = distance.max(0.).round() as usize;
    pixels
}

#[expect(
    clippy::cast_possible_truncation,
    reason = "tiny-skia works in f32"
)]
fn to_f32(value: f64) -> f32 {
    value as f32
}

fn skia_color(color: Color) -> tiny_skia::Color {
    let rgba8 = color.to_rgba8();
    tiny_skia::Color::from_rgba8(rgba8.r, rgba8.g, rgba8.b, rgba8.a)
}

struct TinySkiaPen<'a> {
    pixmap: PixmapMut<'a>,
    transform: Transform,
    paint: Paint<'static>,
    open_path: PathBuilder,
}

impl TinySkiaPen<'_> {
    fn new(pixmap: PixmapMut<'_>, transform: Transform) -> TinySkiaPen<'_> {
        TinySkiaPen {
            pixmap,
            transform,
            paint: Paint::default(),
            open_path: PathBuilder::new(),
        }
    }

    fn set_color(&mut self, color: Color) {
        self.paint.set_color(skia_color(color));
    }

    fn fill_rect(&mut self, rect: kurbo::Rect) {
        let rect = rect.abs();
        let Some(rect) = Rect::from_ltrb(
            to_f32(rect.x0),
            to_f32(rect.y0),
            to_f32(rect.x1),
            to_f32(rect.y1),
        ) else {
            return;
        };
        self.pixmap
            .fill_rect(rect, &self.paint, self.transform, None);
    }

    /// Draws the glyphs and decorations of `run`, shifted by `offset`.
    fn draw_run(&mut self, run: &GlyphRun<'_>, color: Color, offset: Vec2) {
        self.set_color(color);
        let style = run.style();
        let face = style.font.face();
        let rotated = run.is_rotated();
        for glyph in run.glyphs() {
            let origin = (glyph.x + offset.x, glyph.y + offset.y);
            self.draw_glyph(face, GlyphId::new(glyph.id), style.font_size, origin, rotated);
        }

        let metrics = style.metrics();
        if let Some(decoration) = &style.underline {
            self.set_color(decoration.color.unwrap_or(color));
            let (offset_y, size) = (metrics.underline_offset, metrics.underline_size);
            self.draw_decoration(run, decoration.style, offset_y.into(), size.into(), offset);
        }
        if let Some(decoration) = &style.strikethrough {
            self.set_color(decoration.color.unwrap_or(color));
            let (offset_y, size) = (metrics.strikethrough_offset, metrics.strikethrough_size);
            self.draw_decoration(run, decoration.style, -f64::from(offset_y), size.into(), offset);
        }
    }

    fn draw_glyph(
        &mut self,
        face: &dyn Face,
        glyph: GlyphId,
        size: f32,
        (x, y): (f64, f64),
        rotated: bool,
    ) {
        let drawn = face.draw_outline(glyph, size, self);
        let builder = core::mem::replace(&mut self.open_path, PathBuilder::new());
        let Some(path) = builder.finish().filter(|_| drawn) else {
            return;
        };
        let mut transform = self.transform.pre_translate(to_f32(x), to_f32(y));
        if rotated {
            transform = transform.pre_concat(Transform::from_rotate(90.));
        }
        self.pixmap
            .fill_path(&path, &self.paint, FillRule::Winding, transform, None);
    }

    /// Fills a decoration `offset` below the baseline, `size` thick.
    fn draw_decoration(
        &mut self,
        run: &GlyphRun<'_>,
        style: DecorationStyle,
        offset: f64,
        size: f64,
        shift: Vec2,
    ) {
        let strokes: &[(f64, f64)] = match style {
            DecorationStyle::Single => &[(0., 1.)],
            DecorationStyle::Thick => &[(0., 2.)],
            DecorationStyle::Double => &[(-1., 1.), (1., 1.)],
        };
        for &(position, thickness) in strokes {
            let segment = run.decoration_segment(offset + position * size);
            let rect = kurbo::Rect::from_points(segment.p0 + shift, segment.p1 + shift);
            let half = size * thickness * 0.5;
            // Horizontal text gives a horizontal segment, vertical text a vertical one.
            let rect = if rect.width() >= rect.height() {
                rect.inflate(0., half)
            } else {
                rect.inflate(half, 0.)
            };
            self.fill_rect(rect);
        }
    }
}

impl OutlinePen for TinySkiaPen<'_> {
    fn move_to(&mut self, x: f32, y: f32) {
        self.open_path.move_to(x, -y);
    }

    fn line_to(&mut self, x: f32, y: f32) {
        self.open_path.line_to(x, -y);
    }

    fn quad_to(&mut self, cx0: f32, cy0: f32, x: f32, y: f32) {
        self.open_path.quad_to(cx0, -cy0, x, -y);
    }

    fn curve_to(&mut self, cx0: f32, cy0: f32, cx1: f32, cy1: f32, x: f32, y: f32) {
        self.open_path.cubic_to(cx0, -cy0, cx1, -cy1, x, -y);
    }

    fn close(&mut self) {
        self.open_path.close();
    }
}
