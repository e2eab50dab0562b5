//! Content mutation and the change pipeline.
//!
//! # Overview
//!
//! Every content change runs through the same steps:
//!
//! 1. Plan the change on a scratch clone of the document and describe it as a set of
//!    simultaneous [`TextEdit`]s.
//! 2. If a Will or Did handler is registered, build a [`ChangeValue`] by diffing the live
//!    document against the scratch one, and offer it to the Will handler.
//! 3. On veto, drop the scratch document. Nothing else has been touched.
//! 4. Otherwise swap the scratch document in, place the selection, record the undo step,
//!    store the [`TextDelta`] and fire the Did handler.
//!
//! One user action is always one plan, so replacing a selection fires a single Will/Did pair
//! and records a single undo step.
//!
//! # Example
//!
//! ```rust
//! use rich_editor_core::{EditOutcome, RichEditor, TextSpanOptions};
//!
//! let mut editor = RichEditor::new();
//! editor.add_text_span(TextSpanOptions::new("hello"));
//! editor.set_caret_offset(5);
//! assert_eq!(editor.insert_value("!"), EditOutcome::Applied);
//! assert_eq!(editor.delete_backward(2), EditOutcome::Applied);
//! assert_eq!(editor.text_content(), "hell");
//!
//! editor.undo().unwrap();
//! assert_eq!(editor.text_content(), "hello!");
//! ```

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};
use unicode_segmentation::UnicodeSegmentation;

use crate::change::{ChangeValue, TextChangeReason};
use crate::delta::TextDelta;
use crate::document::SpanDocument;
use crate::editor::{EditOutcome, RichEditor};
use crate::error::EditorError;
use crate::events::{DeleteDirection, DeleteValueInfo, InsertValueInfo};
use crate::results::SpanResult;
use crate::selector::{Selector, TextRange};
use crate::span::{ImageSource, PlaceholderOptions, SpanData, SymbolSource};
use crate::style::{ImageStyle, ParagraphStyle, TextStyle};
use crate::text;
use crate::undo::{RecordType, SpanEdit, TextEdit, UndoStep};

/// Options for [`RichEditor::add_text_span`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TextSpanOptions {
    /// Insertion offset; `None` appends.
    pub offset: Option<usize>,
    /// Text to insert. `'\n'` splits it into one span per paragraph piece.
    pub value: String,
    /// Text style of the new span(s).
    pub style: TextStyle,
    /// Paragraph style merged into the paragraphs the text lands in.
    pub paragraph_style: Option<ParagraphStyle>,
}

impl TextSpanOptions {
    /// Append `value` with an empty style.
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            ..Self::default()
        }
    }

    /// Insert at `offset` instead of appending.
    pub fn at(mut self, offset: usize) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Use `style` for the new span.
    pub fn with_style(mut self, style: TextStyle) -> Self {
        self.style = style;
        self
    }

    /// Merge `style` into the paragraphs the new text lands in.
    pub fn with_paragraph_style(mut self, style: ParagraphStyle) -> Self {
        self.paragraph_style = Some(style);
        self
    }
}

/// Options for [`RichEditor::add_image_span`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageSpanOptions {
    /// Insertion offset; `None` appends.
    pub offset: Option<usize>,
    /// Image resource.
    pub source: ImageSource,
    /// Image style.
    pub style: ImageStyle,
}

impl ImageSpanOptions {
    /// Append `source` with an empty style.
    pub fn new(source: ImageSource) -> Self {
        Self {
            offset: None,
            source,
            style: ImageStyle::new(),
        }
    }

    /// Insert at `offset` instead of appending.
    pub fn at(mut self, offset: usize) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Use `style` for the image.
    pub fn with_style(mut self, style: ImageStyle) -> Self {
        self.style = style;
        self
    }
}

/// Options for [`RichEditor::add_symbol_span`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SymbolSpanOptions {
    /// Insertion offset; `None` appends.
    pub offset: Option<usize>,
    /// Symbol glyph.
    pub source: SymbolSource,
    /// Text style of the symbol.
    pub style: TextStyle,
}

impl SymbolSpanOptions {
    /// Append `source` with an empty style.
    pub fn new(source: SymbolSource) -> Self {
        Self {
            offset: None,
            source,
            style: TextStyle::new(),
        }
    }

    /// Insert at `offset` instead of appending.
    pub fn at(mut self, offset: usize) -> Self {
        self.offset = Some(offset);
        self
    }
}

/// Options for [`RichEditor::add_placeholder_span`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaceholderSpanOptions {
    /// Insertion offset; `None` appends.
    pub offset: Option<usize>,
    /// Reserved box.
    pub options: PlaceholderOptions,
}

impl PlaceholderSpanOptions {
    /// Append a placeholder reserving `options`.
    pub fn new(options: PlaceholderOptions) -> Self {
        Self {
            offset: None,
            options,
        }
    }

    /// Insert at `offset` instead of appending.
    pub fn at(mut self, offset: usize) -> Self {
        self.offset = Some(offset);
        self
    }
}

/// Where the selection goes once a plan commits.
#[derive(Debug, Clone)]
pub(crate) enum SelectionAfter {
    /// Collapse to this post-edit offset.
    Caret(usize),
    /// Carry the current selection through the edits.
    Map,
    /// Restore a recorded selector.
    Exact(Selector),
}

/// A content change computed on a scratch document, not yet committed.
#[derive(Debug)]
pub(crate) struct Plan {
    pub(crate) doc: SpanDocument,
    pub(crate) edits: Vec<TextEdit>,
    pub(crate) range_before: TextRange,
    pub(crate) reason: TextChangeReason,
    pub(crate) selection_after: SelectionAfter,
}

/// How a committed plan enters the history.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Recording {
    /// Not recorded (preview display).
    None,
    /// New undo step.
    Step {
        record_type: RecordType,
        coalescible: bool,
    },
    /// Replay of an existing step by undo or redo.
    History {
        record_type: RecordType,
        group_id: usize,
    },
}

impl RichEditor {
    /// Run `plan` through the Will/commit/Did pipeline.
    pub(crate) fn apply_plan(&mut self, plan: Plan, recording: Recording) -> EditOutcome {
        let Plan {
            doc,
            edits,
            range_before,
            reason,
            selection_after,
        } = plan;
        if edits.is_empty() {
            return EditOutcome::Unchanged;
        }

        let value = (self.events.has_on_will_change() || self.events.has_on_did_change())
            .then(|| ChangeValue::describe(&self.doc, &doc, &edits, range_before, reason));
        if let Some(value) = &value
            && !self.events.fire_will_change(value)
        {
            debug!(
                target: "rich_editor.change",
                start = range_before.start,
                end = range_before.end,
                reason = ?reason,
                "change_vetoed"
            );
            return EditOutcome::Vetoed;
        }

        let span_edit = SpanEdit::diff(self.doc.spans(), doc.spans());
        let before_len = self.doc.len();
        let before_selection = self.selector.clone();
        self.doc = doc;

        match selection_after {
            SelectionAfter::Caret(offset) => self.selector.set_caret(offset),
            SelectionAfter::Map => {
                let triples: Vec<_> = edits
                    .iter()
                    .map(|e| (e.start_before, e.deleted_len(), e.inserted_len()))
                    .collect();
                self.selector.map_through(&triples);
            }
            SelectionAfter::Exact(selector) => self.selector = selector,
        }
        self.selector.clamp_to(self.doc.len());

        let group_id = match recording {
            Recording::None => None,
            Recording::Step {
                record_type,
                coalescible,
            } => {
                let step = UndoStep {
                    group_id: 0,
                    record_type,
                    reason,
                    span_edits: span_edit.into_iter().collect(),
                    text_edits: edits.clone(),
                    before_selection,
                    after_selection: self.selector.clone(),
                };
                self.last_record = Some(record_type);
                Some(
                    self.undo
                        .push_step(step, coalescible && self.config.coalesce_typing),
                )
            }
            Recording::History {
                record_type,
                group_id,
            } => {
                self.last_record = Some(record_type);
                Some(group_id)
            }
        };

        trace!(
            target: "rich_editor.mutation",
            edits = edits.len(),
            before_len,
            after_len = self.doc.len(),
            spans = self.doc.span_count(),
            reason = ?reason,
            "change_committed"
        );

        self.last_text_delta = Some(TextDelta::from_edits(before_len, &edits, group_id));
        if let Some(value) = value {
            self.events.fire_did_change(&value.completed());
        }
        self.notify_selection_change();
        EditOutcome::Applied
    }

    /// Insert `value` at the caret, replacing the selection.
    ///
    /// This is the IME commit path: `about_to_ime_input` can veto it, `on_ime_input_complete`
    /// reports the result. With an active preview the preview range is replaced and committed.
    pub fn insert_value(&mut self, value: &str) -> EditOutcome {
        if value.is_empty() {
            return EditOutcome::Unchanged;
        }
        if self.preview.is_active() {
            return self.commit_preview_with(value);
        }
        let range = self.selector.range_or_caret();
        let info = InsertValueInfo {
            insert_offset: range.start,
            insert_value: value.to_string(),
        };
        if !self.events.fire_about_to_ime_input(&info) {
            debug!(target: "rich_editor.mutation", offset = range.start, "ime_input_vetoed");
            return EditOutcome::Vetoed;
        }
        let outcome = self.replace_text(range, value, TextChangeReason::Input);
        if outcome.is_applied()
            && let Some(range) = self.last_inserted_range()
        {
            self.fire_ime_input_complete(range);
        }
        outcome
    }

    /// Replace `range` with typed `value` (clipped to `max_length`) in one step.
    pub(crate) fn replace_text(
        &mut self,
        range: TextRange,
        value: &str,
        reason: TextChangeReason,
    ) -> EditOutcome {
        let value = self.clip_to_capacity(value, range.len());
        if value.is_empty() {
            return EditOutcome::Unchanged;
        }
        let typing = self.typing_style.clone();
        let mut doc = self.doc.clone();
        doc.remove_range(range);
        doc.insert_text(range.start, value, typing.as_ref());

        let inserted = value.chars().count();
        let coalescible =
            range.is_empty() && !value.contains('\n') && value.graphemes(true).count() == 1;
        let plan = Plan {
            doc,
            edits: vec![TextEdit {
                start_before: range.start,
                start_after: range.start,
                deleted_text: self.doc.text_in(range.to_range()),
                inserted_text: value.to_string(),
            }],
            range_before: range,
            reason,
            selection_after: SelectionAfter::Caret(range.start + inserted),
        };
        self.apply_plan(
            plan,
            Recording::Step {
                record_type: RecordType::Insert,
                coalescible,
            },
        )
    }

    /// The part of `value` that fits under `max_length` once `removed` offsets are gone.
    pub(crate) fn clip_to_capacity<'a>(&self, value: &'a str, removed: usize) -> &'a str {
        match self.config.max_length {
            None => value,
            Some(max) => {
                let kept = self.doc.len().saturating_sub(removed);
                text::clip_to_graphemes(value, max.saturating_sub(kept))
            }
        }
    }

    /// Range inserted by the last committed change.
    pub(crate) fn last_inserted_range(&self) -> Option<TextRange> {
        let edit = self
            .last_text_delta
            .as_ref()?
            .edits
            .iter()
            .rev()
            .find(|e| !e.inserted_text.is_empty())?;
        Some(TextRange::new(edit.start, edit.start + edit.inserted_len()))
    }

    pub(crate) fn fire_ime_input_complete(&mut self, range: TextRange) {
        let result = self
            .doc
            .results_in(range)
            .into_iter()
            .find_map(|r| match r {
                SpanResult::Text(text) => Some(text),
                _ => None,
            });
        if let Some(result) = result {
            self.events.fire_ime_input_complete(&result);
        }
    }

    /// Delete `length` offsets before the caret, or the selection.
    ///
    /// Both ends widen to whole grapheme clusters, so a caret inside a combining sequence
    /// still removes the full cluster. A non-text span is always removed whole.
    pub fn delete_backward(&mut self, length: usize) -> EditOutcome {
        if self.preview.is_active() {
            return EditOutcome::Unchanged;
        }
        if let Some(range) = self.selector.range() {
            return self.delete_range(range, DeleteDirection::Backward, TextChangeReason::Input);
        }
        let caret = self.selector.caret().min(self.doc.len());
        if caret == 0 || length == 0 {
            return EditOutcome::Unchanged;
        }
        let end = text::snap_grapheme_ceil(self.doc.rope(), caret);
        let start = text::snap_grapheme_floor(self.doc.rope(), caret.saturating_sub(length));
        self.delete_range(
            TextRange::new(start, end),
            DeleteDirection::Backward,
            TextChangeReason::Input,
        )
    }

    /// Delete `length` offsets after the caret, or the selection.
    pub fn delete_forward(&mut self, length: usize) -> EditOutcome {
        if self.preview.is_active() {
            return EditOutcome::Unchanged;
        }
        if let Some(range) = self.selector.range() {
            return self.delete_range(range, DeleteDirection::Forward, TextChangeReason::Input);
        }
        let len = self.doc.len();
        let caret = self.selector.caret().min(len);
        if caret == len || length == 0 {
            return EditOutcome::Unchanged;
        }
        let start = text::snap_grapheme_floor(self.doc.rope(), caret);
        let end = text::snap_grapheme_ceil(self.doc.rope(), caret.saturating_add(length).min(len));
        self.delete_range(
            TextRange::new(start, end),
            DeleteDirection::Forward,
            TextChangeReason::Input,
        )
    }

    /// Delete back to the previous word boundary, or the selection.
    pub fn delete_backward_word(&mut self) -> EditOutcome {
        if self.preview.is_active() {
            return EditOutcome::Unchanged;
        }
        if let Some(range) = self.selector.range() {
            return self.delete_range(range, DeleteDirection::Backward, TextChangeReason::Input);
        }
        let end = text::snap_grapheme_ceil(self.doc.rope(), self.selector.caret().min(self.doc.len()));
        let start = text::prev_word_boundary(self.doc.rope(), end);
        self.delete_range(
            TextRange::new(start, end),
            DeleteDirection::Backward,
            TextChangeReason::Input,
        )
    }

    /// Delete forward to the next word boundary, or the selection.
    pub fn delete_forward_word(&mut self) -> EditOutcome {
        if self.preview.is_active() {
            return EditOutcome::Unchanged;
        }
        if let Some(range) = self.selector.range() {
            return self.delete_range(range, DeleteDirection::Forward, TextChangeReason::Input);
        }
        let start = text::snap_grapheme_floor(self.doc.rope(), self.selector.caret().min(self.doc.len()));
        let end = text::next_word_boundary(self.doc.rope(), start);
        self.delete_range(
            TextRange::new(start, end),
            DeleteDirection::Forward,
            TextChangeReason::Input,
        )
    }

    /// Delete `range` as one step: `about_to_delete`, pipeline, `on_delete_complete`.
    ///
    /// Compatible text spans meeting at the deletion point merge.
    pub(crate) fn delete_range(
        &mut self,
        range: TextRange,
        direction: DeleteDirection,
        reason: TextChangeReason,
    ) -> EditOutcome {
        let range = TextRange::new(range.start.min(self.doc.len()), range.end.min(self.doc.len()));
        if range.is_empty() {
            return EditOutcome::Unchanged;
        }
        let info = DeleteValueInfo {
            offset: range.start,
            direction,
            length: range.len(),
            spans: self.doc.results_in(range),
        };
        if !self.events.fire_about_to_delete(&info) {
            debug!(target: "rich_editor.mutation", start = range.start, end = range.end, "delete_vetoed");
            return EditOutcome::Vetoed;
        }

        let mut doc = self.doc.clone();
        doc.remove_range(range);
        doc.merge_around(range.start);
        let record_type = match direction {
            DeleteDirection::Backward => RecordType::DelBackward,
            DeleteDirection::Forward => RecordType::DelForward,
        };
        let plan = Plan {
            doc,
            edits: vec![TextEdit {
                start_before: range.start,
                start_after: range.start,
                deleted_text: self.doc.text_in(range.to_range()),
                inserted_text: String::new(),
            }],
            range_before: range,
            reason,
            selection_after: SelectionAfter::Caret(range.start),
        };
        let outcome = self.apply_plan(
            plan,
            Recording::Step {
                record_type,
                coalescible: false,
            },
        );
        if outcome.is_applied() {
            self.events.fire_delete_complete();
        }
        outcome
    }

    /// Insert a text span. Returns the index of the first created span, or `None` when nothing
    /// was inserted (empty value, veto, `max_length`, active preview).
    pub fn add_text_span(&mut self, options: TextSpanOptions) -> Option<usize> {
        if options.value.is_empty() {
            return None;
        }
        let offset = self.span_offset(options.offset);
        let paragraph = self.doc.paragraph_style_at(offset);
        let data = SpanData::text(options.value, options.style).with_paragraph_style(paragraph);
        self.add_span(offset, data, options.paragraph_style.as_ref())
    }

    /// Insert an image span.
    pub fn add_image_span(&mut self, options: ImageSpanOptions) -> Option<usize> {
        let offset = self.span_offset(options.offset);
        let paragraph = self.doc.paragraph_style_at(offset);
        let data = SpanData::image(options.source, options.style).with_paragraph_style(paragraph);
        self.add_span(offset, data, None)
    }

    /// Insert a symbol span.
    pub fn add_symbol_span(&mut self, options: SymbolSpanOptions) -> Option<usize> {
        let offset = self.span_offset(options.offset);
        let paragraph = self.doc.paragraph_style_at(offset);
        let data = SpanData::symbol(options.source, options.style).with_paragraph_style(paragraph);
        self.add_span(offset, data, None)
    }

    /// Insert a placeholder span.
    pub fn add_placeholder_span(&mut self, options: PlaceholderSpanOptions) -> Option<usize> {
        let offset = self.span_offset(options.offset);
        let paragraph = self.doc.paragraph_style_at(offset);
        let data = SpanData::placeholder(options.options).with_paragraph_style(paragraph);
        self.add_span(offset, data, None)
    }

    fn span_offset(&self, offset: Option<usize>) -> usize {
        offset.map_or(self.doc.len(), |o| o.min(self.doc.len()))
    }

    fn add_span(
        &mut self,
        offset: usize,
        data: SpanData,
        paragraph_style: Option<&ParagraphStyle>,
    ) -> Option<usize> {
        if self.preview.is_active() {
            return None;
        }
        let len = data.char_len();
        if let Some(max) = self.config.max_length
            && self.doc.len() + len > max
        {
            debug!(target: "rich_editor.mutation", offset, len, max, "span_exceeds_max_length");
            return None;
        }

        let mut doc = self.doc.clone();
        let index = doc.insert_span_at(offset, data);
        if let Some(style) = paragraph_style {
            doc.update_paragraph_style(TextRange::new(offset, offset + len), style);
        }
        let plan = Plan {
            edits: vec![TextEdit {
                start_before: offset,
                start_after: offset,
                deleted_text: String::new(),
                inserted_text: doc.text_in(offset..offset + len),
            }],
            doc,
            range_before: TextRange::caret(offset),
            reason: TextChangeReason::Unknown,
            selection_after: SelectionAfter::Map,
        };
        let outcome = self.apply_plan(
            plan,
            Recording::Step {
                record_type: RecordType::Insert,
                coalescible: false,
            },
        );
        outcome.is_applied().then_some(index)
    }

    /// Remove the content of `[start, end)`, or of the whole document for `None`.
    ///
    /// Spans inside the range are dropped and spans crossing its bounds are truncated. The
    /// remaining neighbours keep their identity; nothing merges.
    pub fn delete_spans(&mut self, range: Option<(i64, i64)>) -> EditOutcome {
        if self.preview.is_active() {
            return EditOutcome::Unchanged;
        }
        let range = match range {
            Some((start, end)) => self.doc.normalize_range(start, end),
            None => TextRange::new(0, self.doc.len()),
        };
        if range.is_empty() {
            return EditOutcome::Unchanged;
        }
        let mut doc = self.doc.clone();
        doc.remove_range(range);
        let plan = Plan {
            doc,
            edits: vec![TextEdit {
                start_before: range.start,
                start_after: range.start,
                deleted_text: self.doc.text_in(range.to_range()),
                inserted_text: String::new(),
            }],
            range_before: range,
            reason: TextChangeReason::Unknown,
            selection_after: SelectionAfter::Map,
        };
        self.apply_plan(
            plan,
            Recording::Step {
                record_type: RecordType::DelForward,
                coalescible: false,
            },
        )
    }

    /// Swap in a restyled document and record it as one undo step.
    pub(crate) fn commit_restyle(&mut self, doc: SpanDocument) {
        let Some(edit) = SpanEdit::diff(self.doc.spans(), doc.spans()) else {
            self.undo.end_group();
            return;
        };
        self.doc = doc;
        let step = UndoStep {
            group_id: 0,
            record_type: RecordType::Style,
            reason: TextChangeReason::Unknown,
            span_edits: vec![edit],
            text_edits: Vec::new(),
            before_selection: self.selector.clone(),
            after_selection: self.selector.clone(),
        };
        self.undo.push_step(step, false);
        self.last_record = Some(RecordType::Style);
    }

    /// Revert the last recorded step.
    ///
    /// Fires one Will/Did pair with the step's reason; a veto leaves both stacks untouched.
    pub fn undo(&mut self) -> Result<EditOutcome, EditorError> {
        if self.preview.is_active() {
            return Err(EditorError::PreviewActive);
        }
        let step = self.undo.peek_undo().cloned().ok_or(EditorError::NothingToUndo)?;
        let mut doc = self.doc.clone();
        for edit in step.span_edits.iter().rev() {
            doc.replace_spans(edit.index, edit.inserted.len(), edit.removed.clone());
        }
        let edits: Vec<TextEdit> = step.text_edits.iter().map(TextEdit::inverted).collect();
        let outcome = self.replay(
            doc,
            edits,
            step.before_selection,
            step.reason,
            RecordType::Undo,
            step.group_id,
        );
        if outcome.is_applied() {
            self.undo.commit_undo();
        }
        debug!(target: "rich_editor.undo", outcome = ?outcome, group = step.group_id, "undo");
        Ok(outcome)
    }

    /// Re-apply the last undone step.
    pub fn redo(&mut self) -> Result<EditOutcome, EditorError> {
        if self.preview.is_active() {
            return Err(EditorError::PreviewActive);
        }
        let step = self.undo.peek_redo().cloned().ok_or(EditorError::NothingToRedo)?;
        let mut doc = self.doc.clone();
        for edit in &step.span_edits {
            doc.replace_spans(edit.index, edit.removed.len(), edit.inserted.clone());
        }
        let outcome = self.replay(
            doc,
            step.text_edits,
            step.after_selection,
            step.reason,
            RecordType::Redo,
            step.group_id,
        );
        if outcome.is_applied() {
            self.undo.commit_redo();
        }
        debug!(target: "rich_editor.undo", outcome = ?outcome, group = step.group_id, "redo");
        Ok(outcome)
    }

    fn replay(
        &mut self,
        doc: SpanDocument,
        edits: Vec<TextEdit>,
        selection: Selector,
        reason: TextChangeReason,
        record_type: RecordType,
        group_id: usize,
    ) -> EditOutcome {
        if edits.is_empty() {
            // Restyle steps carry no text; swap without change events.
            self.doc = doc;
            self.selector = selection;
            self.selector.clamp_to(self.doc.len());
            self.last_record = Some(record_type);
            self.notify_selection_change();
            return EditOutcome::Applied;
        }
        let range_before = edits_extent(&edits);
        let plan = Plan {
            doc,
            edits,
            range_before,
            reason,
            selection_after: SelectionAfter::Exact(selection),
        };
        self.apply_plan(
            plan,
            Recording::History {
                record_type,
                group_id,
            },
        )
    }
}

/// Smallest pre-edit range covering every deleted range of `edits`.
fn edits_extent(edits: &[TextEdit]) -> TextRange {
    let start = edits.first().map_or(0, |e| e.start_before);
    let end = edits
        .iter()
        .map(|e| e.start_before + e.deleted_len())
        .max()
        .unwrap_or(start);
    TextRange::new(start, end)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EditorConfig;
    use crate::style::TextAttr;
    use std::sync::{Arc, Mutex};

    fn editor_with(text: &str) -> RichEditor {
        let mut editor = RichEditor::new();
        editor.add_text_span(TextSpanOptions::new(text));
        editor
    }

    #[test]
    fn test_insert_replaces_selection_in_one_step() {
        let mut editor = editor_with("hello1");
        editor.set_selection(1, 5, true);
        let depth = editor.undo_depth();
        assert_eq!(editor.insert_value("hello1"), EditOutcome::Applied);
        assert_eq!(editor.text_content(), "hhello11");
        assert_eq!(editor.caret_offset(), 7);
        assert_eq!(editor.undo_depth(), depth + 1);
        assert_eq!(editor.span_count(), 1);
    }

    #[test]
    fn test_will_change_veto_leaves_everything() {
        let mut editor = editor_with("abc");
        editor.set_caret_offset(1);
        assert!(editor.take_last_text_delta().is_some());
        let depth = editor.undo_depth();
        let dids = Arc::new(Mutex::new(0));
        let d = dids.clone();
        editor.events_mut().set_on_will_change(|_| false);
        editor.events_mut().set_on_did_change(move |_| *d.lock().unwrap() += 1);
        assert_eq!(editor.insert_value("xyz"), EditOutcome::Vetoed);
        assert_eq!(editor.text_content(), "abc");
        assert_eq!(editor.caret_offset(), 1);
        assert_eq!(*dids.lock().unwrap(), 0);
        assert!(editor.last_text_delta().is_none());
        assert_eq!(editor.undo_depth(), depth);
    }

    #[test]
    fn test_delete_backward_removes_whole_grapheme() {
        let mut editor = editor_with("ae\u{301}");
        editor.set_caret_offset(3);
        editor.delete_backward(1);
        assert_eq!(editor.text_content(), "a");
    }

    #[test]
    fn test_delete_at_start_is_noop() {
        let mut editor = editor_with("abc");
        editor.set_caret_offset(0);
        assert_eq!(editor.delete_backward(1), EditOutcome::Unchanged);
        editor.set_caret_offset(3);
        assert_eq!(editor.delete_forward(1), EditOutcome::Unchanged);
    }

    #[test]
    fn test_delete_merges_compatible_neighbours() {
        let mut editor = editor_with("ab");
        editor.add_text_span(TextSpanOptions::new("X").with_style(TextStyle::new().with(TextAttr::FontSize(30.0))));
        editor.add_text_span(TextSpanOptions::new("cd"));
        assert_eq!(editor.span_count(), 3);
        editor.set_caret_offset(3);
        editor.delete_backward(1);
        assert_eq!(editor.span_count(), 1);
        assert_eq!(editor.text_content(), "abcd");
    }

    #[test]
    fn test_word_deletes() {
        let mut editor = editor_with("hello brave world");
        editor.set_caret_offset(11);
        editor.delete_backward_word();
        assert_eq!(editor.text_content(), "hello  world");
        editor.set_caret_offset(0);
        editor.delete_forward_word();
        assert_eq!(editor.text_content(), "  world");
    }

    #[test]
    fn test_max_length_clips_insert() {
        let mut editor = RichEditor::with_config(EditorConfig {
            max_length: Some(5),
            ..EditorConfig::default()
        });
        editor.insert_value("abc");
        assert_eq!(editor.insert_value("defg"), EditOutcome::Applied);
        assert_eq!(editor.text_content(), "abcde");
        assert_eq!(editor.insert_value("z"), EditOutcome::Unchanged);
        assert!(editor.add_text_span(TextSpanOptions::new("q")).is_none());
    }

    #[test]
    fn test_typing_coalesces_until_group_ends() {
        let mut editor = RichEditor::new();
        editor.insert_value("a");
        editor.insert_value("b");
        editor.insert_value("c");
        assert_eq!(editor.undo_depth(), 1);
        editor.end_undo_group();
        editor.insert_value("d");
        assert_eq!(editor.undo_depth(), 2);
        editor.undo().unwrap();
        assert_eq!(editor.text_content(), "abc");
        editor.undo().unwrap();
        assert_eq!(editor.text_content(), "");
        assert!(matches!(editor.undo(), Err(EditorError::NothingToUndo)));
    }

    #[test]
    fn test_undo_restores_styles_and_selection() {
        let mut editor = editor_with("hello");
        editor.set_selection(1, 4, true);
        let big = TextStyle::new().with(TextAttr::FontSize(40.0));
        editor.update_span_style(1, 4, Some(&big), None);
        assert_eq!(editor.span_count(), 3);
        editor.delete_backward(1);
        assert_eq!(editor.text_content(), "ho");
        editor.undo().unwrap();
        assert_eq!(editor.text_content(), "hello");
        assert_eq!(editor.selection(), TextRange::new(1, 4));
        assert_eq!(editor.document().spans()[1].text_style(), &big);
        editor.undo().unwrap();
        assert_eq!(editor.span_count(), 1);
        editor.redo().unwrap();
        assert_eq!(editor.span_count(), 3);
    }

    #[test]
    fn test_delete_spans_does_not_merge() {
        let mut editor = editor_with("ab");
        editor.add_placeholder_span(PlaceholderSpanOptions::new(PlaceholderOptions {
            width: 10.0,
            height: 10.0,
        }));
        editor.add_text_span(TextSpanOptions::new("cd"));
        assert_eq!(editor.delete_spans(Some((2, 3))), EditOutcome::Applied);
        assert_eq!(editor.span_count(), 2);
        assert_eq!(editor.document().spans()[1].range(), 2..4);
        assert_eq!(editor.delete_spans(Some((3, 3))), EditOutcome::Unchanged);
        assert_eq!(editor.delete_spans(None), EditOutcome::Applied);
        assert!(editor.is_empty());
    }

    #[test]
    fn test_edits_extent() {
        let edits = vec![
            TextEdit {
                start_before: 2,
                start_after: 2,
                deleted_text: "ab".into(),
                inserted_text: String::new(),
            },
            TextEdit {
                start_before: 7,
                start_after: 5,
                deleted_text: String::new(),
                inserted_text: "x".into(),
            },
        ];
        assert_eq!(edits_extent(&edits), TextRange::new(2, 7));
    }
}
