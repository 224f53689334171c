// Copyright 2025 the Placard Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Placard lays out rich text inside arbitrarily shaped containers.
//!
//! The crate is split along the path text takes on its way to the screen:
//!
//! - [`StyledText`] is an immutable string with ranged [`Attributes`] and
//!   interactive [`Highlight`] ranges, assembled with a [`StyledTextBuilder`].
//! - [`Container`] describes where text may go: a size, an optional boundary
//!   path, exclusion paths, insets, a line limit and the writing direction.
//! - [`Layout::new`] runs the layout engine and produces an immutable
//!   [`Layout`] that can be shared across threads, drawn, and hit-tested with
//!   [`Layout::hit_test`].
//!
//! ```
//! use placard::{Container, FixedFace, FontFace, Layout, StyleProperty, StyledText};
//! use placard::kurbo::Size;
//!
//! let face = FontFace::new(FixedFace::default());
//! let mut builder = StyledText::builder("Hello World");
//! builder.push_default(StyleProperty::Font(face));
//! builder.push_highlight(6..11, "world");
//! let text = builder.build();
//!
//! let container = Container::new(Size::new(400.0, f64::INFINITY));
//! let layout = Layout::new(&text, &container);
//! assert_eq!(layout.len(), 1);
//! assert_eq!(layout.visible_range(), 0..11);
//!
//! let line = layout.get(0).unwrap();
//! let world = line.runs().find(|run| run.highlight().is_some()).unwrap();
//! let hit = layout.hit_test(world.rect().center()).unwrap();
//! assert_eq!(hit.highlight.unwrap().payload.downcast_ref::<&str>(), Some(&"world"));
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

mod error;
mod util;

pub mod container;
pub mod font;
pub mod hit;
pub mod layout;
pub mod style;
pub mod text;

#[cfg(test)]
mod tests;

pub use peniko::{color, kurbo, Color};
pub use skrifa;

pub use container::{
    Alignment, Container, FixedLineHeight, LineBreakMode, LinePositionModifier, RowMetrics,
    VerticalAlignment,
};
pub use error::Error;
pub use font::{Face, FixedFace, FontFace, FontMetrics, OpenTypeFace};
pub use hit::{locate, Hit, HitHighlight, HitKind};
pub use layout::{
    compute_layout, BreakReason, Glyph, GlyphRun, Layout, Line, LineMetrics, PositionedAttachment,
};
pub use style::{
    Attachment, AttachmentAlign, Attributes, Decoration, DecorationStyle, Shadow, StyleProperty,
};
pub use text::{Highlight, HighlightPayload, StyledText, StyledTextBuilder};
