// Copyright 2025 the Placard Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Rich styling support.

use peniko::kurbo::{Size, Vec2};
use peniko::Color;

use crate::font::{FontFace, FontMetrics};

/// The font size used when none is specified.
pub const DEFAULT_FONT_SIZE: f32 = 17.0;

/// Properties that define a style.
///
/// Each variant overrides exactly one key of [`Attributes`]. When several
/// properties for the same key cover a character, the one pushed last wins.
#[derive(Clone, PartialEq, Debug)]
pub enum StyleProperty {
    /// Font face.
    Font(FontFace),
    /// Font size in pixels per em.
    FontSize(f32),
    /// Glyph fill color.
    Color(Color),
    /// Drop shadow behind glyphs.
    Shadow(Option<Shadow>),
    /// Underline decoration.
    Underline(Option<Decoration>),
    /// Strikethrough decoration.
    Strikethrough(Option<Decoration>),
    /// Extra advance added after every cluster.
    LetterSpacing(f32),
    /// Line height multiplier.
    LineHeight(f32),
    /// Shift of the run away from the baseline, positive is up.
    BaselineOffset(f32),
    /// Inline attachment replacing the covered text.
    Attachment(Option<Attachment>),
}

/// A fully resolved bundle of visual attributes.
#[derive(Clone, PartialEq, Debug)]
pub struct Attributes {
    /// Font face.
    pub font: FontFace,
    /// Font size in pixels per em.
    pub font_size: f32,
    /// Glyph fill color.
    pub color: Color,
    /// Drop shadow behind glyphs.
    pub shadow: Option<Shadow>,
    /// Underline decoration.
    pub underline: Option<Decoration>,
    /// Strikethrough decoration.
    pub strikethrough: Option<Decoration>,
    /// Extra advance added after every cluster.
    pub letter_spacing: f32,
    /// Line height multiplier.
    pub line_height: f32,
    /// Shift of the run away from the baseline, positive is up.
    pub baseline_offset: f32,
    /// Inline attachment replacing the covered text.
    pub attachment: Option<Attachment>,
}

impl Default for Attributes {
    fn default() -> Self {
        Self {
            font: FontFace::default(),
            font_size: DEFAULT_FONT_SIZE,
            color: Color::BLACK,
            shadow: None,
            underline: None,
            strikethrough: None,
            letter_spacing: 0.,
            line_height: 1.,
            baseline_offset: 0.,
            attachment: None,
        }
    }
}

impl Attributes {
    /// Overrides the key named by `property`.
    pub fn apply(&mut self, property: StyleProperty) {
        use StyleProperty as P;
        match property {
            P::Font(value) => self.font = value,
            P::FontSize(value) => self.font_size = value,
            P::Color(value) => self.color = value,
            P::Shadow(value) => self.shadow = value,
            P::Underline(value) => self.underline = value,
            P::Strikethrough(value) => self.strikethrough = value,
            P::LetterSpacing(value) => self.letter_spacing = value,
            P::LineHeight(value) => self.line_height = value,
            P::BaselineOffset(value) => self.baseline_offset = value,
            P::Attachment(value) => self.attachment = value,
        }
    }

    /// Returns `true` if applying `property` would leave the bundle unchanged.
    pub fn check(&self, property: &StyleProperty) -> bool {
        use StyleProperty as P;
        match property {
            P::Font(value) => self.font == *value,
            P::FontSize(value) => self.font_size == *value,
            P::Color(value) => self.color == *value,
            P::Shadow(value) => self.shadow == *value,
            P::Underline(value) => self.underline == *value,
            P::Strikethrough(value) => self.strikethrough == *value,
            P::LetterSpacing(value) => self.letter_spacing == *value,
            P::LineHeight(value) => self.line_height == *value,
            P::BaselineOffset(value) => self.baseline_offset == *value,
            P::Attachment(value) => self.attachment == *value,
        }
    }

    /// Returns the font metrics for this bundle.
    pub fn metrics(&self) -> FontMetrics {
        self.font.face().metrics(self.font_size)
    }
}

/// A drop shadow drawn beneath glyphs.
#[derive(Copy, Clone, PartialEq, Debug)]
pub struct Shadow {
    /// Shadow color.
    pub color: Color,
    /// Offset of the shadow from the glyphs.
    pub offset: Vec2,
    /// Blur radius in pixels.
    pub blur_radius: f64,
}

/// The visual form of a line decoration.
#[derive(Copy, Clone, Default, PartialEq, Eq, Debug)]
pub enum DecorationStyle {
    /// A single line using the font's decoration thickness.
    #[default]
    Single,
    /// A single line twice as thick.
    Thick,
    /// Two lines.
    Double,
}

/// An underline or strikethrough.
#[derive(Copy, Clone, Default, PartialEq, Debug)]
pub struct Decoration {
    /// How the decoration is drawn.
    pub style: DecorationStyle,
    /// Decoration color, falling back to the text color.
    pub color: Option<Color>,
}

/// How an attachment sits relative to the surrounding text.
#[derive(Copy, Clone, Default, PartialEq, Eq, Debug)]
pub enum AttachmentAlign {
    /// The top of the attachment is aligned with the font's ascent.
    Top,
    /// The attachment is centered on the font's line box.
    #[default]
    Center,
    /// The bottom of the attachment sits on the baseline.
    Bottom,
}

/// An object laid out inline with text, such as an image.
///
/// The attachment replaces the characters its range covers (usually a single
/// U+FFFC) and is never split across lines. Its content is drawn by the host;
/// the rasterizer only fills `placeholder` if one is set.
#[derive(Copy, Clone, PartialEq, Debug)]
pub struct Attachment {
    /// Caller-defined identifier used to find the attachment in the layout.
    pub id: u64,
    /// Size of the attachment in pixels.
    pub size: Size,
    /// Alignment relative to the surrounding font.
    pub align: AttachmentAlign,
    /// Optional fill drawn in place of the content.
    pub placeholder: Option<Color>,
}

impl Attachment {
    /// Creates a center-aligned attachment without a placeholder.
    pub fn new(id: u64, size: Size) -> Self {
        Self {
            id,
            size,
            align: AttachmentAlign::Center,
            placeholder: None,
        }
    }

    /// Returns the (ascent, descent) the attachment occupies next to
    /// horizontal text with the given metrics.
    pub(crate) fn vertical_extent(&self, font: &FontMetrics) -> (f64, f64) {
        let extent = self.size.height;
        let (ascent, descent) = (f64::from(font.ascent), f64::from(font.descent));
        match self.align {
            AttachmentAlign::Top => (ascent, extent - ascent),
            AttachmentAlign::Center => {
                let center = (ascent - descent) * 0.5;
                let half = extent * 0.5;
                (center + half, half - center)
            }
            AttachmentAlign::Bottom => (extent, 0.),
        }
    }
}
