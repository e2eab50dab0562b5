//! Value snapshots of spans handed to callers and event handlers.
//!
//! Results never borrow from the document. They refer back to their span through
//! [`SpanPosition`]: the sibling index at snapshot time plus the span's stable [`SpanId`].

use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::selector::TextRange;
use crate::span::{ImageSource, PlaceholderOptions, Span, SpanContent, SpanId, SpanKind, SymbolSource};
use crate::style::{ImageStyle, ParagraphStyle, TextStyle};

/// Where a result came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpanPosition {
    /// Sibling index at snapshot time.
    pub span_index: usize,
    /// Document range of the whole span at snapshot time.
    pub span_range: Range<usize>,
    /// Stable handle of the span.
    pub span_id: SpanId,
}

/// Snapshot of a text span.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextSpanResult {
    /// Origin.
    pub position: SpanPosition,
    /// Whole span content.
    pub value: String,
    /// Text overrides.
    pub text_style: TextStyle,
    /// Paragraph overrides.
    pub paragraph_style: ParagraphStyle,
    /// Start of the overlap inside the span.
    pub offset_in_span: usize,
    /// Length of the overlap.
    pub erase_length: usize,
}

/// Snapshot of an image span.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageSpanResult {
    /// Origin.
    pub position: SpanPosition,
    /// Image resource.
    pub source: ImageSource,
    /// Image overrides.
    pub image_style: ImageStyle,
    /// Always 0.
    pub offset_in_span: usize,
    /// Always 1.
    pub erase_length: usize,
}

/// Snapshot of a symbol span.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SymbolSpanResult {
    /// Origin.
    pub position: SpanPosition,
    /// Symbol glyph.
    pub source: SymbolSource,
    /// Text overrides applied to the glyph.
    pub text_style: TextStyle,
    /// Always 0.
    pub offset_in_span: usize,
    /// Always 1.
    pub erase_length: usize,
}

/// Snapshot of a placeholder span.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaceholderSpanResult {
    /// Origin.
    pub position: SpanPosition,
    /// Reserved box.
    pub options: PlaceholderOptions,
    /// Always 0.
    pub offset_in_span: usize,
    /// Always 1.
    pub erase_length: usize,
}

/// Snapshot of any span.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SpanResult {
    /// Text span.
    Text(TextSpanResult),
    /// Image span.
    Image(ImageSpanResult),
    /// Symbol span.
    Symbol(SymbolSpanResult),
    /// Placeholder span.
    Placeholder(PlaceholderSpanResult),
}

impl SpanResult {
    /// Snapshot `span` at `index`, restricted to its overlap with `[start, end)`.
    ///
    /// The caller guarantees the span intersects the range.
    pub(crate) fn of(span: &Span, index: usize, start: usize, end: usize) -> Self {
        let position = SpanPosition {
            span_index: index,
            span_range: span.range(),
            span_id: span.id(),
        };
        let overlap_start = start.max(span.range.start);
        let overlap_end = end.min(span.range.end);
        let offset_in_span = overlap_start - span.range.start;
        let erase_length = overlap_end.saturating_sub(overlap_start);
        let data = span.data();
        match &data.content {
            SpanContent::Text(value) => SpanResult::Text(TextSpanResult {
                position,
                value: value.clone(),
                text_style: data.text_style.clone(),
                paragraph_style: data.paragraph_style.clone(),
                offset_in_span,
                erase_length,
            }),
            SpanContent::Image(source) => SpanResult::Image(ImageSpanResult {
                position,
                source: source.clone(),
                image_style: data.image_style.clone(),
                offset_in_span,
                erase_length,
            }),
            SpanContent::Symbol(source) => SpanResult::Symbol(SymbolSpanResult {
                position,
                source: *source,
                text_style: data.text_style.clone(),
                offset_in_span,
                erase_length,
            }),
            SpanContent::Placeholder(options) => SpanResult::Placeholder(PlaceholderSpanResult {
                position,
                options: *options,
                offset_in_span,
                erase_length,
            }),
        }
    }

    /// Origin of the snapshot.
    pub fn position(&self) -> &SpanPosition {
        match self {
            SpanResult::Text(r) => &r.position,
            SpanResult::Image(r) => &r.position,
            SpanResult::Symbol(r) => &r.position,
            SpanResult::Placeholder(r) => &r.position,
        }
    }

    /// Kind of the snapshotted span.
    pub fn kind(&self) -> SpanKind {
        match self {
            SpanResult::Text(_) => SpanKind::Text,
            SpanResult::Image(_) => SpanKind::Image,
            SpanResult::Symbol(_) => SpanKind::Symbol,
            SpanResult::Placeholder(_) => SpanKind::Placeholder,
        }
    }

    /// Start of the overlap inside the span.
    pub fn offset_in_span(&self) -> usize {
        match self {
            SpanResult::Text(r) => r.offset_in_span,
            SpanResult::Image(r) => r.offset_in_span,
            SpanResult::Symbol(r) => r.offset_in_span,
            SpanResult::Placeholder(r) => r.offset_in_span,
        }
    }

    /// Length of the overlap.
    pub fn erase_length(&self) -> usize {
        match self {
            SpanResult::Text(r) => r.erase_length,
            SpanResult::Image(r) => r.erase_length,
            SpanResult::Symbol(r) => r.erase_length,
            SpanResult::Placeholder(r) => r.erase_length,
        }
    }

    /// Text span snapshot, if this is one.
    pub fn as_text(&self) -> Option<&TextSpanResult> {
        match self {
            SpanResult::Text(r) => Some(r),
            _ => None,
        }
    }

    /// Image span snapshot, if this is one.
    pub fn as_image(&self) -> Option<&ImageSpanResult> {
        match self {
            SpanResult::Image(r) => Some(r),
            _ => None,
        }
    }

    /// The overlapped part of the span as plain text.
    pub fn overlap_text(&self) -> String {
        match self {
            SpanResult::Text(r) => r
                .value
                .chars()
                .skip(r.offset_in_span)
                .take(r.erase_length)
                .collect(),
            _ => crate::span::OBJECT_REPLACEMENT_CHAR.to_string(),
        }
    }
}

/// The current selection and the spans it covers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectionInfo {
    /// Selected range.
    pub selection: TextRange,
    /// Snapshots of every span intersecting the selection.
    pub spans: Vec<SpanResult>,
}

/// A paragraph and its style.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParagraphResult {
    /// Paragraph range, including its trailing `'\n'` if any.
    pub range: Range<usize>,
    /// Paragraph overrides.
    pub style: ParagraphStyle,
}
