//! Span records: the typed runs of content that make up a document.
//!
//! A [`Span`] is identity ([`SpanId`]) plus position (`range`) plus transferable [`SpanData`].
//! Only `SpanData` crosses editor boundaries (drag payloads, clipboard); identity and position
//! belong to the owning [`SpanDocument`](crate::SpanDocument).

use std::borrow::Cow;
use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::style::{ImageStyle, ParagraphStyle, TextStyle};

/// Character standing in for a non-text span in the plain-text view.
pub const OBJECT_REPLACEMENT_CHAR: char = '\u{FFFC}';

/// Stable handle for a span, unique within one editor.
///
/// Indices shift as siblings are inserted and removed; a `SpanId` does not. Resolve it back to an
/// index with [`SpanDocument::resolve`](crate::SpanDocument::resolve).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SpanId(pub u64);

/// Kind of a span.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SpanKind {
    /// Run of text.
    Text,
    /// Inline image.
    Image,
    /// Inline symbol glyph.
    Symbol,
    /// Host-drawn placeholder box.
    Placeholder,
}

/// Where an image span's pixels come from.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ImageSource {
    /// Resource URI or path.
    pub uri: String,
    /// Owning bundle, for packaged resources.
    pub bundle_name: Option<String>,
    /// Owning module, for packaged resources.
    pub module_name: Option<String>,
}

impl ImageSource {
    /// Image loaded from `uri`.
    pub fn new(uri: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            bundle_name: None,
            module_name: None,
        }
    }
}

/// Glyph reference of a symbol span.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SymbolSource {
    /// Resource id of the symbol glyph.
    pub glyph_id: u32,
}

/// Box reserved for a host-drawn placeholder.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PlaceholderOptions {
    /// Width in px.
    pub width: f32,
    /// Height in px.
    pub height: f32,
}

/// Content of a span.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SpanContent {
    /// Text; may end with, but never otherwise contain, `'\n'`.
    Text(String),
    /// Image, length 1.
    Image(ImageSource),
    /// Symbol glyph, length 1.
    Symbol(SymbolSource),
    /// Placeholder, length 1.
    Placeholder(PlaceholderOptions),
}

/// The transferable part of a span: content and styles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpanData {
    /// Content.
    pub content: SpanContent,
    /// Text overrides (text and symbol spans).
    #[serde(default)]
    pub text_style: TextStyle,
    /// Image overrides (image spans).
    #[serde(default)]
    pub image_style: ImageStyle,
    /// Paragraph overrides.
    #[serde(default)]
    pub paragraph_style: ParagraphStyle,
}

impl SpanData {
    /// Text span data.
    pub fn text(value: impl Into<String>, style: TextStyle) -> Self {
        Self {
            content: SpanContent::Text(value.into()),
            text_style: style,
            image_style: ImageStyle::new(),
            paragraph_style: ParagraphStyle::new(),
        }
    }

    /// Image span data.
    pub fn image(source: ImageSource, style: ImageStyle) -> Self {
        Self {
            content: SpanContent::Image(source),
            text_style: TextStyle::new(),
            image_style: style,
            paragraph_style: ParagraphStyle::new(),
        }
    }

    /// Symbol span data.
    pub fn symbol(source: SymbolSource, style: TextStyle) -> Self {
        Self {
            content: SpanContent::Symbol(source),
            text_style: style,
            image_style: ImageStyle::new(),
            paragraph_style: ParagraphStyle::new(),
        }
    }

    /// Placeholder span data.
    pub fn placeholder(options: PlaceholderOptions) -> Self {
        Self {
            content: SpanContent::Placeholder(options),
            text_style: TextStyle::new(),
            image_style: ImageStyle::new(),
            paragraph_style: ParagraphStyle::new(),
        }
    }

    /// Kind of the content.
    pub fn kind(&self) -> SpanKind {
        match self.content {
            SpanContent::Text(_) => SpanKind::Text,
            SpanContent::Image(_) => SpanKind::Image,
            SpanContent::Symbol(_) => SpanKind::Symbol,
            SpanContent::Placeholder(_) => SpanKind::Placeholder,
        }
    }

    /// Length in document offsets.
    pub fn char_len(&self) -> usize {
        match &self.content {
            SpanContent::Text(text) => text.chars().count(),
            _ => 1,
        }
    }

    /// Content as it appears in the plain-text view.
    pub fn plain_text(&self) -> Cow<'_, str> {
        match &self.content {
            SpanContent::Text(text) => Cow::Borrowed(text.as_str()),
            _ => Cow::Owned(OBJECT_REPLACEMENT_CHAR.to_string()),
        }
    }

    pub(crate) fn with_paragraph_style(mut self, style: ParagraphStyle) -> Self {
        self.paragraph_style = style;
        self
    }
}

/// A span owned by a document.
#[derive(Debug, Clone)]
pub struct Span {
    pub(crate) id: SpanId,
    pub(crate) range: Range<usize>,
    pub(crate) data: SpanData,
}

impl Span {
    /// Stable handle.
    pub fn id(&self) -> SpanId {
        self.id
    }

    /// Half-open document range `[start, end)`.
    pub fn range(&self) -> Range<usize> {
        self.range.clone()
    }

    /// Length in document offsets.
    pub fn len(&self) -> usize {
        self.range.len()
    }

    /// Spans are never empty once committed; kept for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.range.is_empty()
    }

    /// Kind of the span.
    pub fn kind(&self) -> SpanKind {
        self.data.kind()
    }

    /// Content and styles.
    pub fn data(&self) -> &SpanData {
        &self.data
    }

    /// Content.
    pub fn content(&self) -> &SpanContent {
        &self.data.content
    }

    /// Text content for text spans.
    pub fn text(&self) -> Option<&str> {
        match &self.data.content {
            SpanContent::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Text style overrides.
    pub fn text_style(&self) -> &TextStyle {
        &self.data.text_style
    }

    /// Image style overrides.
    pub fn image_style(&self) -> &ImageStyle {
        &self.data.image_style
    }

    /// Paragraph style overrides.
    pub fn paragraph_style(&self) -> &ParagraphStyle {
        &self.data.paragraph_style
    }

    /// Whether the span is a text span whose last character is `'\n'`.
    pub fn ends_paragraph(&self) -> bool {
        self.text().is_some_and(|t| t.ends_with('\n'))
    }

    /// Identity and content equality; the position is ignored.
    pub(crate) fn same_as(&self, other: &Span) -> bool {
        self.id == other.id && self.data == other.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::TextAttr;

    #[test]
    fn test_object_spans_have_length_one() {
        let image = SpanData::image(ImageSource::new("a.png"), ImageStyle::new());
        let symbol = SpanData::symbol(SymbolSource { glyph_id: 7 }, TextStyle::new());
        assert_eq!(image.char_len(), 1);
        assert_eq!(symbol.char_len(), 1);
        assert_eq!(image.plain_text(), "\u{FFFC}");
        assert_eq!(image.kind(), SpanKind::Image);
    }

    #[test]
    fn test_text_len_counts_chars() {
        let data = SpanData::text("h\u{e9}llo", TextStyle::new().with(TextAttr::FontSize(12.0)));
        assert_eq!(data.char_len(), 5);
        assert_eq!(data.plain_text(), "h\u{e9}llo");
    }

    #[test]
    fn test_same_as_ignores_range() {
        let a = Span {
            id: SpanId(1),
            range: 0..2,
            data: SpanData::text("ab", TextStyle::new()),
        };
        let mut b = a.clone();
        b.range = 5..7;
        assert!(a.same_as(&b));
        b.id = SpanId(2);
        assert!(!a.same_as(&b));
    }
}
