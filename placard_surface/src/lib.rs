// Copyright 2025 the Placard Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Placard Surface renders [`placard`] layouts into pixmaps, off the display
//! thread when asked to.
//!
//! A [`Surface`] owns the content and container of one label. Every change
//! bumps a generation token and schedules a layout and raster job on a
//! shared [`WorkerPool`]. Finished frames are posted back to the surface and
//! picked up by [`Surface::poll`], which applies only the frame for the
//! latest token. Older frames are dropped, so a burst of changes never shows
//! intermediate content.
//!
//! ```
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! use placard::kurbo::Size;
//! use placard::{Container, FixedFace, FontFace, StyleProperty, StyledText};
//! use placard_surface::{Surface, SurfaceConfig, WorkerPool};
//!
//! let pool = Arc::new(WorkerPool::new(2).unwrap());
//! let mut surface = Surface::new(pool, SurfaceConfig::default());
//!
//! let mut builder = StyledText::builder("Hello");
//! builder.push_default(StyleProperty::Font(FontFace::new(FixedFace::default())));
//! surface.set_container(Container::new(Size::new(200.0, 100.0)));
//! surface.set_content(builder.build());
//!
//! assert!(surface.wait(Duration::from_secs(5)));
//! assert_eq!(surface.layout().unwrap().visible_range(), 0..5);
//! ```

// LINEBENDER LINT SET - lib.rs - v3
// See https://linebender.org/wiki/canonical-lints/
// These lints shouldn't apply to examples or tests.
#![cfg_attr(not(test), warn(unused_crate_dependencies))]
// These lints shouldn't apply to examples.
#![warn(clippy::print_stdout, clippy::print_stderr)]
// Targeting e.g. 32-bit means structs containing usize can give false positives for 64-bit.
#![cfg_attr(target_pointer_width = "64", warn(clippy::trivially_copy_pass_by_ref))]
// END LINEBENDER LINT SET
#![cfg_attr(docsrs, feature(doc_cfg))]

mod config;
mod error;
mod pool;
mod surface;

pub mod interaction;
pub mod raster;
pub mod transition;

#[cfg(test)]
mod tests;

pub use tiny_skia;

pub use config::{RenderOptions, SurfaceConfig};
pub use error::Error;
pub use interaction::{interpret, Gesture, Interaction};
pub use pool::WorkerPool;
pub use raster::rasterize;
pub use surface::{Frame, Phase, Surface, SurfaceObserver};
pub use transition::CrossFade;
