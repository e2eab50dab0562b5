//! Span styles as attribute sets.
//!
//! # Overview
//!
//! A style is a set of attributes holding at most one value per attribute *kind*. Only the
//! attributes present in a set override anything: applying `{FontSize(20)}` to a span that already
//! has `{FontSize(14), FontColor(RED)}` yields `{FontSize(20), FontColor(RED)}`.
//!
//! Three concrete sets exist:
//!
//! - [`TextStyle`] for text and symbol spans
//! - [`ImageStyle`] for image spans
//! - [`ParagraphStyle`] for the paragraph a span belongs to
//!
//! # Example
//!
//! ```rust
//! use rich_editor_core::style::{Color, TextAttr, TextAttrKind, TextStyle};
//!
//! let mut base = TextStyle::new();
//! base.insert(TextAttr::FontSize(14.0));
//! base.insert(TextAttr::FontColor(Color::RED));
//!
//! let delta = TextStyle::from_iter([TextAttr::FontSize(20.0)]);
//! base.merge(&delta);
//!
//! assert_eq!(base.font_size(), Some(20.0));
//! assert_eq!(base.get(TextAttrKind::FontColor), Some(&TextAttr::FontColor(Color::RED)));
//! ```

use std::collections::BTreeMap;
use std::fmt;

use serde::de::Deserializer;
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};

/// An attribute value that knows its own kind.
pub trait Attribute: Clone + PartialEq + fmt::Debug {
    /// Discriminant used as the set key.
    type Kind: Copy + Ord + fmt::Debug;

    /// Kind of this attribute value.
    fn kind(&self) -> Self::Kind;
}

/// A set of attributes containing at most one value per kind.
#[derive(Clone, PartialEq)]
pub struct AttributeSet<A: Attribute> {
    entries: BTreeMap<A::Kind, A>,
}

impl<A: Attribute> AttributeSet<A> {
    /// Create an empty set.
    pub fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    /// Add `attr`, returning the value it replaced.
    pub fn insert(&mut self, attr: A) -> Option<A> {
        self.entries.insert(attr.kind(), attr)
    }

    /// Builder form of [`insert`](Self::insert).
    pub fn with(mut self, attr: A) -> Self {
        self.insert(attr);
        self
    }

    /// Look up the value stored for `kind`.
    pub fn get(&self, kind: A::Kind) -> Option<&A> {
        self.entries.get(&kind)
    }

    /// Remove the value stored for `kind`.
    pub fn remove(&mut self, kind: A::Kind) -> Option<A> {
        self.entries.remove(&kind)
    }

    /// Overlay `other` onto this set. Attributes present in `other` win.
    pub fn merge(&mut self, other: &Self) {
        for attr in other.entries.values() {
            self.insert(attr.clone());
        }
    }

    /// Return a copy of this set with `other` merged on top.
    pub fn merged(&self, other: &Self) -> Self {
        let mut out = self.clone();
        out.merge(other);
        out
    }

    /// Remove every attribute.
    pub fn reset(&mut self) {
        self.entries.clear();
    }

    /// Returns `true` if no attribute is set.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of attributes set.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Iterate attributes in kind order.
    pub fn iter(&self) -> impl Iterator<Item = &A> {
        self.entries.values()
    }
}

impl<A: Attribute> Default for AttributeSet<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A: Attribute> fmt::Debug for AttributeSet<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.entries.values()).finish()
    }
}

impl<A: Attribute> FromIterator<A> for AttributeSet<A> {
    fn from_iter<I: IntoIterator<Item = A>>(iter: I) -> Self {
        let mut set = Self::new();
        for attr in iter {
            set.insert(attr);
        }
        set
    }
}

// Serialized as a plain list of attribute values; the kind key is implied by each value.
impl<A: Attribute + Serialize> Serialize for AttributeSet<A> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.entries.values())
    }
}

impl<'de, A: Attribute + Deserialize<'de>> Deserialize<'de> for AttributeSet<A> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let attrs = Vec::<A>::deserialize(deserializer)?;
        Ok(attrs.into_iter().collect())
    }
}

/// ARGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color(pub u32);

impl Color {
    /// Opaque black.
    pub const BLACK: Color = Color(0xFF00_0000);
    /// Opaque white.
    pub const WHITE: Color = Color(0xFFFF_FFFF);
    /// Opaque red.
    pub const RED: Color = Color(0xFFFF_0000);
    /// Opaque green.
    pub const GREEN: Color = Color(0xFF00_FF00);
    /// Opaque blue.
    pub const BLUE: Color = Color(0xFF00_00FF);
    /// Fully transparent.
    pub const TRANSPARENT: Color = Color(0);

    /// Build a color from its components.
    pub const fn from_argb(a: u8, r: u8, g: u8, b: u8) -> Self {
        Color(((a as u32) << 24) | ((r as u32) << 16) | ((g as u32) << 8) | b as u32)
    }
}

/// Font slant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FontStyle {
    /// Upright.
    Normal,
    /// Italic.
    Italic,
}

/// Text decoration line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TextDecoration {
    /// No decoration.
    None,
    /// Line below the text.
    Underline,
    /// Line above the text.
    Overline,
    /// Line through the text.
    LineThrough,
}

/// Text span attributes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TextAttr {
    /// Font size in px.
    FontSize(f32),
    /// Foreground color.
    FontColor(Color),
    /// Numeric weight (100..=900).
    FontWeight(u16),
    /// Slant.
    FontStyle(FontStyle),
    /// Family list, in fallback order.
    FontFamily(Vec<String>),
    /// Decoration line.
    Decoration(TextDecoration),
    /// Decoration line color.
    DecorationColor(Color),
    /// Line height in px.
    LineHeight(f32),
    /// Letter spacing in px.
    LetterSpacing(f32),
    /// OpenType feature settings (`tag`, value).
    FontFeatures(Vec<(String, i32)>),
    /// Background fill behind the glyphs.
    BackgroundColor(Color),
}

/// Key of a [`TextAttr`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[allow(missing_docs)]
pub enum TextAttrKind {
    FontSize,
    FontColor,
    FontWeight,
    FontStyle,
    FontFamily,
    Decoration,
    DecorationColor,
    LineHeight,
    LetterSpacing,
    FontFeatures,
    BackgroundColor,
}

impl Attribute for TextAttr {
    type Kind = TextAttrKind;

    fn kind(&self) -> TextAttrKind {
        match self {
            TextAttr::FontSize(_) => TextAttrKind::FontSize,
            TextAttr::FontColor(_) => TextAttrKind::FontColor,
            TextAttr::FontWeight(_) => TextAttrKind::FontWeight,
            TextAttr::FontStyle(_) => TextAttrKind::FontStyle,
            TextAttr::FontFamily(_) => TextAttrKind::FontFamily,
            TextAttr::Decoration(_) => TextAttrKind::Decoration,
            TextAttr::DecorationColor(_) => TextAttrKind::DecorationColor,
            TextAttr::LineHeight(_) => TextAttrKind::LineHeight,
            TextAttr::LetterSpacing(_) => TextAttrKind::LetterSpacing,
            TextAttr::FontFeatures(_) => TextAttrKind::FontFeatures,
            TextAttr::BackgroundColor(_) => TextAttrKind::BackgroundColor,
        }
    }
}

/// Style overrides for text and symbol spans.
pub type TextStyle = AttributeSet<TextAttr>;

impl AttributeSet<TextAttr> {
    /// Font size, if set.
    pub fn font_size(&self) -> Option<f32> {
        match self.get(TextAttrKind::FontSize) {
            Some(TextAttr::FontSize(size)) => Some(*size),
            _ => None,
        }
    }

    /// Foreground color, if set.
    pub fn font_color(&self) -> Option<Color> {
        match self.get(TextAttrKind::FontColor) {
            Some(TextAttr::FontColor(color)) => Some(*color),
            _ => None,
        }
    }

    /// Font weight, if set.
    pub fn font_weight(&self) -> Option<u16> {
        match self.get(TextAttrKind::FontWeight) {
            Some(TextAttr::FontWeight(weight)) => Some(*weight),
            _ => None,
        }
    }
}

/// Vertical placement of an inline object relative to the line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[allow(missing_docs)]
pub enum VerticalAlign {
    Top,
    Center,
    Bottom,
    Baseline,
}

/// How an image is fitted into its box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[allow(missing_docs)]
pub enum ImageFit {
    Fill,
    Contain,
    Cover,
    Auto,
    None,
    ScaleDown,
}

/// Image span attributes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ImageAttr {
    /// Box width in px.
    Width(f32),
    /// Box height in px.
    Height(f32),
    /// Vertical alignment in the line.
    VerticalAlign(VerticalAlign),
    /// Fit mode.
    ObjectFit(ImageFit),
    /// Corner radius in px.
    BorderRadius(f32),
    /// Uniform outer margin in px.
    Margin(f32),
}

/// Key of an [`ImageAttr`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[allow(missing_docs)]
pub enum ImageAttrKind {
    Width,
    Height,
    VerticalAlign,
    ObjectFit,
    BorderRadius,
    Margin,
}

impl Attribute for ImageAttr {
    type Kind = ImageAttrKind;

    fn kind(&self) -> ImageAttrKind {
        match self {
            ImageAttr::Width(_) => ImageAttrKind::Width,
            ImageAttr::Height(_) => ImageAttrKind::Height,
            ImageAttr::VerticalAlign(_) => ImageAttrKind::VerticalAlign,
            ImageAttr::ObjectFit(_) => ImageAttrKind::ObjectFit,
            ImageAttr::BorderRadius(_) => ImageAttrKind::BorderRadius,
            ImageAttr::Margin(_) => ImageAttrKind::Margin,
        }
    }
}

/// Style overrides for image spans.
pub type ImageStyle = AttributeSet<ImageAttr>;

impl AttributeSet<ImageAttr> {
    /// Box size as `(width, height)`; missing dimensions are `None`.
    pub fn size(&self) -> (Option<f32>, Option<f32>) {
        let width = match self.get(ImageAttrKind::Width) {
            Some(ImageAttr::Width(w)) => Some(*w),
            _ => None,
        };
        let height = match self.get(ImageAttrKind::Height) {
            Some(ImageAttr::Height(h)) => Some(*h),
            _ => None,
        };
        (width, height)
    }

    /// Vertical alignment, if set.
    pub fn vertical_align(&self) -> Option<VerticalAlign> {
        match self.get(ImageAttrKind::VerticalAlign) {
            Some(ImageAttr::VerticalAlign(align)) => Some(*align),
            _ => None,
        }
    }

    /// Fit mode, if set.
    pub fn object_fit(&self) -> Option<ImageFit> {
        match self.get(ImageAttrKind::ObjectFit) {
            Some(ImageAttr::ObjectFit(fit)) => Some(*fit),
            _ => None,
        }
    }
}

/// Horizontal alignment of a paragraph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[allow(missing_docs)]
pub enum TextAlign {
    Start,
    Center,
    End,
    Justify,
}

/// Word breaking rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[allow(missing_docs)]
pub enum WordBreak {
    Normal,
    BreakAll,
    BreakWord,
}

/// Line breaking strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[allow(missing_docs)]
pub enum LineBreakStrategy {
    Greedy,
    HighQuality,
    Balanced,
}

/// Paragraph attributes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ParagraphAttr {
    /// Alignment.
    TextAlign(TextAlign),
    /// Indent of the first line in px.
    LeadingMargin(f32),
    /// Word breaking.
    WordBreak(WordBreak),
    /// Line breaking.
    LineBreakStrategy(LineBreakStrategy),
}

/// Key of a [`ParagraphAttr`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[allow(missing_docs)]
pub enum ParagraphAttrKind {
    TextAlign,
    LeadingMargin,
    WordBreak,
    LineBreakStrategy,
}

impl Attribute for ParagraphAttr {
    type Kind = ParagraphAttrKind;

    fn kind(&self) -> ParagraphAttrKind {
        match self {
            ParagraphAttr::TextAlign(_) => ParagraphAttrKind::TextAlign,
            ParagraphAttr::LeadingMargin(_) => ParagraphAttrKind::LeadingMargin,
            ParagraphAttr::WordBreak(_) => ParagraphAttrKind::WordBreak,
            ParagraphAttr::LineBreakStrategy(_) => ParagraphAttrKind::LineBreakStrategy,
        }
    }
}

/// Paragraph-level overrides; every span of a paragraph carries the same set.
pub type ParagraphStyle = AttributeSet<ParagraphAttr>;
