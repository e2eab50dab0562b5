//! Span document: the ordered span sequence plus a rope mirror of its plain text.
//!
//! # Overview
//!
//! [`SpanDocument`] owns the spans. Each span covers a contiguous half-open range of document
//! offsets, siblings do not overlap, and the ranges tile `[0, len)` in order. Non-text spans
//! contribute one offset each.
//!
//! Alongside the spans the document keeps a [`Rope`] of the plain text, with U+FFFC standing in
//! for every non-text span. The rope answers paragraph, grapheme and word questions without
//! re-walking the spans.
//!
//! Queries clamp their inputs: a range outside the document is pulled back into
//! `[0, len]`, and an inverted range is swapped.
//!
//! The mutation primitives are crate-private. Content changes go through
//! [`RichEditor`](crate::RichEditor), which wraps every edit in the change pipeline.
//!
//! # Example
//!
//! ```rust
//! use rich_editor_core::{SpanData, SpanDocument, TextStyle};
//!
//! let doc = SpanDocument::from_data(vec![
//!     SpanData::text("hello ", TextStyle::new()),
//!     SpanData::text("world", TextStyle::new()),
//! ]);
//! assert_eq!(doc.len(), 11);
//! assert_eq!(doc.span_count(), 2);
//! assert_eq!(doc.spans()[1].range(), 6..11);
//!
//! let results = doc.spans_info(4, 8);
//! assert_eq!(results.len(), 2);
//! assert_eq!(results[0].offset_in_span(), 4);
//! assert_eq!(results[1].erase_length(), 2);
//! ```

use std::ops::Range;

use ropey::Rope;

use crate::error::EditorError;
use crate::results::{ParagraphResult, SpanResult};
use crate::selector::TextRange;
use crate::span::{OBJECT_REPLACEMENT_CHAR, Span, SpanContent, SpanData, SpanId};
use crate::style::{ImageStyle, ParagraphStyle, TextStyle};

/// Ordered span sequence with a plain-text mirror.
#[derive(Debug, Clone, Default)]
pub struct SpanDocument {
    spans: Vec<Span>,
    text: Rope,
    next_id: u64,
}

impl SpanDocument {
    /// Empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Document made of `data`, in order.
    pub fn from_data(data: Vec<SpanData>) -> Self {
        let mut doc = Self::new();
        for item in data {
            let end = doc.len();
            doc.insert_span_at(end, item);
        }
        doc
    }

    /// Total length in document offsets.
    pub fn len(&self) -> usize {
        self.text.len_chars()
    }

    /// Returns `true` if the document has no content.
    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }

    /// Number of spans.
    pub fn span_count(&self) -> usize {
        self.spans.len()
    }

    /// All spans in order.
    pub fn spans(&self) -> &[Span] {
        &self.spans
    }

    /// Span at sibling `index`.
    pub fn span(&self, index: usize) -> Option<&Span> {
        self.spans.get(index)
    }

    /// Current sibling index of the span with handle `id`.
    pub fn resolve(&self, id: SpanId) -> Option<usize> {
        self.spans.iter().position(|s| s.id == id)
    }

    /// Plain-text mirror.
    pub fn rope(&self) -> &Rope {
        &self.text
    }

    /// Whole plain text, with U+FFFC for non-text spans.
    pub fn text(&self) -> String {
        self.text.to_string()
    }

    /// Plain text of `range` (clamped), with U+FFFC for non-text spans.
    pub fn text_in(&self, range: Range<usize>) -> String {
        let len = self.len();
        let start = range.start.min(len);
        let end = range.end.min(len).max(start);
        self.text.slice(start..end).to_string()
    }

    /// Plain text of `range` with non-text spans dropped.
    pub fn plain_text_in(&self, range: Range<usize>) -> String {
        self.text_in(range)
            .chars()
            .filter(|&c| c != OBJECT_REPLACEMENT_CHAR)
            .collect()
    }

    /// Clamp a raw offset into `[0, len]`.
    pub fn clamp(&self, offset: i64) -> usize {
        offset.clamp(0, self.len() as i64) as usize
    }

    /// Normalize a raw range: a negative start means 0, a negative end means `len`, both are
    /// clamped and the result is ordered.
    pub fn normalize_range(&self, start: i64, end: i64) -> TextRange {
        let start = if start < 0 { 0 } else { self.clamp(start) };
        let end = if end < 0 { self.len() } else { self.clamp(end) };
        TextRange::new(start, end)
    }

    /// Index of the span with `start <= offset < end`.
    pub fn span_index_at(&self, offset: usize) -> Option<usize> {
        if offset >= self.len() {
            return None;
        }
        let idx = self.spans.partition_point(|s| s.range.end <= offset);
        (idx < self.spans.len()).then_some(idx)
    }

    /// Snapshot of the whole span at sibling `index`.
    pub fn span_info(&self, index: usize) -> Result<SpanResult, EditorError> {
        let span = self.spans.get(index).ok_or(EditorError::InvalidSpanIndex {
            index,
            len: self.spans.len(),
        })?;
        Ok(SpanResult::of(span, index, span.range.start, span.range.end))
    }

    /// Snapshots of every span intersecting `[start, end)` after normalization.
    pub fn spans_info(&self, start: i64, end: i64) -> Vec<SpanResult> {
        self.results_in(self.normalize_range(start, end))
    }

    /// Snapshots of every span intersecting `range`.
    pub fn results_in(&self, range: TextRange) -> Vec<SpanResult> {
        if range.is_empty() {
            return Vec::new();
        }
        let first = self.spans.partition_point(|s| s.range.end <= range.start);
        self.spans[first..]
            .iter()
            .enumerate()
            .take_while(|(_, s)| s.range.start < range.end)
            .map(|(i, s)| SpanResult::of(s, first + i, range.start, range.end))
            .collect()
    }

    /// Paragraph containing `offset`, including its trailing `'\n'`.
    pub fn paragraph_range(&self, offset: usize) -> Range<usize> {
        let line = self.text.char_to_line(offset.min(self.len()));
        self.line_range(line)
    }

    fn line_range(&self, line: usize) -> Range<usize> {
        let start = self.text.line_to_char(line);
        let end = self.text.line_to_char((line + 1).min(self.text.len_lines()));
        start..end.max(start)
    }

    /// Every paragraph intersecting `[start, end]` after normalization, with its style.
    pub fn paragraphs_info(&self, start: i64, end: i64) -> Vec<ParagraphResult> {
        let range = self.normalize_range(start, end);
        let first = self.text.char_to_line(range.start);
        let last = self.text.char_to_line(range.end);
        (first..=last)
            .map(|line| {
                let range = self.line_range(line);
                let style = self
                    .span_index_at(range.start)
                    .filter(|_| !range.is_empty())
                    .map(|i| self.spans[i].data.paragraph_style.clone())
                    .unwrap_or_default();
                ParagraphResult { range, style }
            })
            .collect()
    }

    /// Transferable copies of the content in `range`, text cut to the overlap.
    pub fn slice_data(&self, range: TextRange) -> Vec<SpanData> {
        self.results_in(range)
            .into_iter()
            .filter_map(|result| {
                let index = result.position().span_index;
                let mut data = self.spans.get(index)?.data.clone();
                if let SpanContent::Text(text) = &mut data.content {
                    *text = result.overlap_text();
                }
                Some(data)
            })
            .collect()
    }

    /// Check the structural invariants: contiguous ranges tiling `[0, len)`, no empty span,
    /// `'\n'` only as the last char of a text span, and the mirror matching the spans.
    pub fn is_consistent(&self) -> bool {
        let mut pos = 0;
        let mut mirror = String::with_capacity(self.text.len_bytes());
        for span in &self.spans {
            if span.range.start != pos || span.range.len() != span.data.char_len() {
                return false;
            }
            if span.range.is_empty() {
                return false;
            }
            if let Some(text) = span.text() {
                let body = text.strip_suffix('\n').unwrap_or(text);
                if body.contains('\n') {
                    return false;
                }
            }
            mirror.push_str(&span.data.plain_text());
            pos = span.range.end;
        }
        pos == self.len() && self.text == mirror.as_str()
    }

    fn alloc_id(&mut self) -> SpanId {
        let id = SpanId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Recompute every span's start by walking the sequence. Lengths are trusted.
    fn update_span_position(&mut self) {
        let mut pos = 0;
        for span in &mut self.spans {
            let len = span.range.len();
            span.range = pos..pos + len;
            pos += len;
        }
    }

    /// Make sure a span boundary exists at `offset`; returns the index of the span starting there
    /// (or the span count when `offset` is the end).
    pub(crate) fn split_at(&mut self, offset: usize) -> usize {
        let Some(idx) = self.span_index_at(offset) else {
            return self.spans.len();
        };
        let start = self.spans[idx].range.start;
        if start == offset {
            return idx;
        }
        let id = self.alloc_id();
        let span = &mut self.spans[idx];
        let SpanContent::Text(text) = &mut span.data.content else {
            return idx;
        };
        let byte = char_to_byte(text, offset - start);
        let right_text = text.split_off(byte);
        let end = span.range.end;
        span.range.end = offset;
        let right = Span {
            id,
            range: offset..end,
            data: SpanData {
                content: SpanContent::Text(right_text),
                ..span.data.clone()
            },
        };
        self.spans.insert(idx + 1, right);
        idx + 1
    }

    /// Insert `data` as new span(s) at `offset`, splitting a text span when `offset` is inside it.
    /// Returns the index of the first created span.
    pub(crate) fn insert_span_at(&mut self, offset: usize, data: SpanData) -> usize {
        let offset = offset.min(self.len());
        let idx = self.split_at(offset);
        let len = data.char_len();
        self.text.insert(offset, &data.plain_text());
        let id = self.alloc_id();
        self.spans.insert(
            idx,
            Span {
                id,
                range: offset..offset + len,
                data,
            },
        );
        self.split_paragraph_breaks(idx);
        self.update_span_position();
        idx
    }

    /// Insert a run of span data at `offset`, keeping each item's style. Returns the index of the
    /// first created span, or `None` if `data` is empty.
    pub(crate) fn insert_data_at(&mut self, offset: usize, data: Vec<SpanData>) -> Option<usize> {
        let mut pos = offset.min(self.len());
        let mut first = None;
        for item in data {
            let len = item.char_len();
            if len == 0 {
                continue;
            }
            let idx = self.insert_span_at(pos, item);
            first.get_or_insert(idx);
            pos += len;
        }
        first
    }

    /// Insert typed text at `offset`.
    ///
    /// The text joins the text span at `offset` when that span accepts it (left neighbour first,
    /// never past a trailing `'\n'`) and its style equals `typing_style` (any style when `None`).
    /// Otherwise a new span is created. Returns the index of the span receiving the first char.
    pub(crate) fn insert_text(
        &mut self,
        offset: usize,
        text: &str,
        typing_style: Option<&TextStyle>,
    ) -> usize {
        let offset = offset.min(self.len());
        if let Some(idx) = self.text_target(offset, typing_style) {
            let span = &mut self.spans[idx];
            let rel = offset - span.range.start;
            if let SpanContent::Text(content) = &mut span.data.content {
                let byte = char_to_byte(content, rel);
                content.insert_str(byte, text);
            }
            let added = text.chars().count();
            span.range.end += added;
            self.text.insert(offset, text);
            self.split_paragraph_breaks(idx);
            self.update_span_position();
            return idx;
        }

        let style = match typing_style {
            Some(style) => style.clone(),
            None => self.inherited_text_style(offset),
        };
        let paragraph = self.paragraph_style_at(offset);
        self.insert_span_at(
            offset,
            SpanData::text(text, style).with_paragraph_style(paragraph),
        )
    }

    fn text_target(&self, offset: usize, typing_style: Option<&TextStyle>) -> Option<usize> {
        let accepts = |span: &Span| {
            span.text().is_some() && typing_style.is_none_or(|style| span.data.text_style == *style)
        };
        let left = self
            .spans
            .iter()
            .position(|s| s.range.start < offset && offset <= s.range.end)
            .filter(|&i| !(self.spans[i].range.end == offset && self.spans[i].ends_paragraph()));
        if let Some(i) = left
            && accepts(&self.spans[i])
        {
            return Some(i);
        }
        let right = self.spans.iter().position(|s| s.range.start == offset)?;
        accepts(&self.spans[right]).then_some(right)
    }

    fn inherited_text_style(&self, offset: usize) -> TextStyle {
        self.spans
            .iter()
            .rev()
            .find(|s| s.range.start < offset && s.text().is_some())
            .or_else(|| self.spans.iter().find(|s| s.text().is_some()))
            .map(|s| s.data.text_style.clone())
            .unwrap_or_default()
    }

    /// Paragraph style of the paragraph containing `offset`.
    pub(crate) fn paragraph_style_at(&self, offset: usize) -> ParagraphStyle {
        let range = self.paragraph_range(offset);
        self.spans
            .iter()
            .find(|s| s.range.start >= range.start && s.range.start < range.end.max(range.start + 1))
            .map(|s| s.data.paragraph_style.clone())
            .unwrap_or_default()
    }

    /// Split the text span at `index` after every `'\n'` that is not its last char.
    fn split_paragraph_breaks(&mut self, mut index: usize) {
        loop {
            let Some(span) = self.spans.get_mut(index) else {
                return;
            };
            let SpanContent::Text(text) = &mut span.data.content else {
                return;
            };
            let Some(pos) = text.find('\n') else {
                return;
            };
            if pos + 1 == text.len() {
                return;
            }
            let rest = text.split_off(pos + 1);
            let left_len = text.chars().count();
            let start = span.range.start;
            let end = span.range.end;
            span.range.end = start + left_len;
            let data = SpanData {
                content: SpanContent::Text(rest),
                ..span.data.clone()
            };
            let id = self.alloc_id();
            self.spans.insert(
                index + 1,
                Span {
                    id,
                    range: start + left_len..end,
                    data,
                },
            );
            index += 1;
        }
    }

    /// Remove `range`: spans fully inside are dropped, spans crossing a boundary are truncated.
    pub(crate) fn remove_range(&mut self, range: TextRange) {
        let len = self.len();
        let start = range.start.min(len);
        let end = range.end.min(len);
        if start >= end {
            return;
        }
        let joins_paragraphs = self.text.slice(start..end).chars().any(|c| c == '\n');
        self.text.remove(start..end);

        let mut kept = Vec::with_capacity(self.spans.len());
        for mut span in self.spans.drain(..) {
            let (s, e) = (span.range.start, span.range.end);
            if e <= start || s >= end {
                kept.push(span);
                continue;
            }
            if s >= start && e <= end {
                continue;
            }
            if let SpanContent::Text(text) = &mut span.data.content {
                let cut_from = start.saturating_sub(s);
                let cut_to = end.min(e) - s;
                let from = char_to_byte(text, cut_from);
                let to = char_to_byte(text, cut_to);
                text.replace_range(from..to, "");
                span.range = s..s + (e - s) - (cut_to - cut_from);
                kept.push(span);
            }
        }
        self.spans = kept;
        self.update_span_position();

        if joins_paragraphs {
            self.unify_paragraph_style(start);
        }
    }

    /// Give every span of the paragraph at `offset` the style of its first span.
    fn unify_paragraph_style(&mut self, offset: usize) {
        let range = self.paragraph_range(offset);
        let mut first_style = None;
        for span in self
            .spans
            .iter_mut()
            .filter(|s| s.range.start >= range.start && s.range.start < range.end)
        {
            match &first_style {
                None => first_style = Some(span.data.paragraph_style.clone()),
                Some(style) => span.data.paragraph_style = style.clone(),
            }
        }
    }

    /// Merge the two text spans meeting at `offset` when their styles are equal and the left one
    /// does not end its paragraph.
    pub(crate) fn merge_around(&mut self, offset: usize) {
        let Some(i) = self
            .spans
            .iter()
            .position(|s| s.range.end == offset && !s.range.is_empty())
        else {
            return;
        };
        if i + 1 >= self.spans.len() {
            return;
        }
        let (left, right) = (&self.spans[i], &self.spans[i + 1]);
        let compatible = left.text().is_some()
            && right.text().is_some()
            && !left.ends_paragraph()
            && left.data.text_style == right.data.text_style
            && left.data.paragraph_style == right.data.paragraph_style;
        if !compatible {
            return;
        }
        let right = self.spans.remove(i + 1);
        let left = &mut self.spans[i];
        if let (SpanContent::Text(a), SpanContent::Text(b)) = (&mut left.data.content, right.data.content) {
            a.push_str(&b);
        }
        left.range.end += right.range.len();
    }

    /// Replace `count` spans starting at `index` with `spans`, keeping the mirror in sync.
    pub(crate) fn replace_spans(&mut self, index: usize, count: usize, spans: Vec<Span>) {
        let index = index.min(self.spans.len());
        let count = count.min(self.spans.len() - index);
        let start = self
            .spans
            .get(index)
            .map_or(self.len(), |s| s.range.start);
        let removed: usize = self.spans[index..index + count]
            .iter()
            .map(|s| s.range.len())
            .sum();
        self.text.remove(start..start + removed);
        let mut inserted = String::new();
        let mut spans = spans;
        for span in &mut spans {
            let len = span.data.char_len();
            span.range = 0..len;
            inserted.push_str(&span.data.plain_text());
            self.next_id = self.next_id.max(span.id.0 + 1);
        }
        self.text.insert(start, &inserted);
        self.spans.splice(index..index + count, spans);
        self.update_span_position();
    }

    /// Apply style deltas to the content of `range`, splitting text spans at its bounds.
    /// Returns how many spans were restyled.
    pub(crate) fn update_span_style(
        &mut self,
        range: TextRange,
        text_style: Option<&TextStyle>,
        image_style: Option<&ImageStyle>,
    ) -> usize {
        if range.is_empty() {
            return 0;
        }
        let first = self.split_at(range.start);
        let last = self.split_at(range.end);
        let mut count = 0;
        for span in &mut self.spans[first..last] {
            match span.data.content {
                SpanContent::Text(_) | SpanContent::Symbol(_) => {
                    if let Some(style) = text_style {
                        span.data.text_style.merge(style);
                        count += 1;
                    }
                }
                SpanContent::Image(_) => {
                    if let Some(style) = image_style {
                        span.data.image_style.merge(style);
                        count += 1;
                    }
                }
                SpanContent::Placeholder(_) => {}
            }
        }
        self.update_span_position();
        count
    }

    /// Merge `style` into every paragraph intersecting `range` (the paragraph at `range.start`
    /// for a collapsed range). Returns how many paragraphs were touched.
    pub(crate) fn update_paragraph_style(&mut self, range: TextRange, style: &ParagraphStyle) -> usize {
        let first = self.text.char_to_line(range.start);
        let last = self
            .text
            .char_to_line(if range.is_empty() { range.start } else { range.end - 1 });
        let start = self.line_range(first).start;
        let end = self.line_range(last).end;
        for span in self
            .spans
            .iter_mut()
            .filter(|s| s.range.start >= start && s.range.start < end)
        {
            span.data.paragraph_style.merge(style);
        }
        last - first + 1
    }
}

/// Byte index of the `chars`-th char of `text` (or its length).
fn char_to_byte(text: &str, chars: usize) -> usize {
    text.char_indices().nth(chars).map_or(text.len(), |(b, _)| b)
}
