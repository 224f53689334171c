// Copyright 2025 the Placard Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Cross-fading between successive frames.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tiny_skia::{BlendMode, FilterQuality, Pixmap, PixmapPaint, Transform};

/// A dissolve from the previous frame into a new one.
///
/// The blend is linear: at progress `t` every pixel is
/// `from * (1 - t) + to * t`.
#[derive(Clone, Debug)]
pub struct CrossFade {
    from: Arc<Pixmap>,
    to: Arc<Pixmap>,
    start: Instant,
    duration: Duration,
}

impl CrossFade {
    /// Starts a fade at `start`.
    pub fn new(from: Arc<Pixmap>, to: Arc<Pixmap>, start: Instant, duration: Duration) -> Self {
        Self {
            from,
            to,
            start,
            duration,
        }
    }

    /// Returns how far the fade has progressed at `now`, from 0 to 1.
    pub fn progress(&self, now: Instant) -> f32 {
        if self.duration.is_zero() {
            return 1.;
        }
        let elapsed = now.saturating_duration_since(self.start);
        (elapsed.as_secs_f32() / self.duration.as_secs_f32()).clamp(0., 1.)
    }

    /// Returns `true` once the new frame is fully shown.
    pub fn is_finished(&self, now: Instant) -> bool {
        self.progress(now) >= 1.
    }

    /// Returns the frame being faded in.
    pub fn target(&self) -> &Arc<Pixmap> {
        &self.to
    }

    /// Blends both frames as they appear at `now`.
    ///
    /// The result is as large as the larger of the two frames. Returns `None`
    /// only if that pixmap cannot be allocated.
    pub fn compose(&self, now: Instant) -> Option<Pixmap> {
        let t = self.progress(now);
        let width = self.from.width().max(self.to.width());
        let height = self.from.height().max(self.to.height());
        let mut out = Pixmap::new(width, height)?;
        for (pixmap, opacity) in [(&self.from, 1. - t), (&self.to, t)] {
            if opacity <= 0. {
                continue;
            }
            let paint = PixmapPaint {
                opacity,
                blend_mode: BlendMode::Plus,
                quality: FilterQuality::Nearest,
            };
            out.draw_pixmap(
                0,
                0,
                Pixmap::as_ref(pixmap),
                &paint,
                Transform::identity(),
                None,
            );
        }
        Some(out)
    }
}
