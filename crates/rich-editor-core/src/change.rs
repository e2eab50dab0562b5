//! Change values: the before/after description handed to Will/Did change handlers.
//!
//! # Overview
//!
//! A content change is a set of simultaneous [`TextEdit`]s. The change value describes them by
//! snapshotting spans on both sides of the edit:
//!
//! - `original_spans`: results of the document *before* the edit over every deleted range.
//! - `replaced_*`: results of the document *after* the edit over every inserted range, split by
//!   span kind. `offset_in_span` is where the inserted content starts inside the resulting span
//!   and `erase_length` is how much of it lands in that span, so typing into an existing span
//!   reports the whole resulting span with the insertion window inside it.
//!
//! The Will variant carries no `range_after`; the Did variant carries the final range.
//!
//! # Example
//!
//! ```rust
//! use rich_editor_core::{RichEditor, TextSpanOptions};
//! use std::sync::{Arc, Mutex};
//!
//! let mut editor = RichEditor::new();
//! editor.add_text_span(TextSpanOptions::new("hello1"));
//! editor.set_selection(1, 5, true);
//!
//! let seen = Arc::new(Mutex::new(Vec::new()));
//! let sink = seen.clone();
//! editor.events_mut().set_on_will_change(move |value| {
//!     sink.lock().unwrap().push(value.clone());
//!     true
//! });
//! editor.insert_value("hello1");
//!
//! let values = seen.lock().unwrap();
//! let replaced = &values[0].replaced_spans[0];
//! assert_eq!(replaced.value, "hhello11");
//! assert_eq!((replaced.offset_in_span, replaced.erase_length), (1, 6));
//! ```

use serde::{Deserialize, Serialize};

use crate::document::SpanDocument;
use crate::results::{
    ImageSpanResult, PlaceholderSpanResult, SpanResult, SymbolSpanResult, TextSpanResult,
};
use crate::selector::TextRange;
use crate::undo::TextEdit;

/// Why the content changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TextChangeReason {
    /// Typing, IME commit, deletion keys, cut.
    Input,
    /// Drag and drop.
    Drag,
    /// Paste.
    Paste,
    /// Accessibility services.
    Accessibility,
    /// Text written by an assistant.
    AiWrite,
    /// Handwriting input.
    Stylus,
    /// Programmatic or unspecified.
    #[default]
    Unknown,
}

/// Description of one content change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeValue {
    /// Selection or edit range before the change (the source range for a drag move).
    pub range_before: TextRange,
    /// Range after the change; `None` while the change is pending.
    pub range_after: Option<TextRange>,
    /// Spans over the deleted ranges, before the change.
    pub original_spans: Vec<SpanResult>,
    /// Text spans over the inserted ranges, after the change.
    pub replaced_spans: Vec<TextSpanResult>,
    /// Image spans over the inserted ranges, after the change.
    pub replaced_image_spans: Vec<ImageSpanResult>,
    /// Symbol spans over the inserted ranges, after the change.
    pub replaced_symbol_spans: Vec<SymbolSpanResult>,
    /// Placeholder spans over the inserted ranges, after the change.
    pub replaced_placeholder_spans: Vec<PlaceholderSpanResult>,
    /// Why the change happened.
    pub change_reason: TextChangeReason,
    replacement: String,
    final_range: TextRange,
}

impl ChangeValue {
    /// Describe `edits` (sorted by `start_before`) turning `old` into `new`.
    pub(crate) fn describe(
        old: &SpanDocument,
        new: &SpanDocument,
        edits: &[TextEdit],
        range_before: TextRange,
        change_reason: TextChangeReason,
    ) -> Self {
        let mut value = ChangeValue {
            range_before,
            range_after: None,
            original_spans: Vec::new(),
            replaced_spans: Vec::new(),
            replaced_image_spans: Vec::new(),
            replaced_symbol_spans: Vec::new(),
            replaced_placeholder_spans: Vec::new(),
            change_reason,
            replacement: String::new(),
            final_range: final_range(edits),
        };
        for edit in edits {
            let deleted = edit.deleted_len();
            if deleted > 0 {
                let range = TextRange::new(edit.start_before, edit.start_before + deleted);
                value.original_spans.extend(old.results_in(range));
            }
            let inserted = edit.inserted_len();
            if inserted == 0 {
                continue;
            }
            value.replacement.push_str(&edit.inserted_text);
            let range = TextRange::new(edit.start_after, edit.start_after + inserted);
            for result in new.results_in(range) {
                match result {
                    SpanResult::Text(r) => value.replaced_spans.push(r),
                    SpanResult::Image(r) => value.replaced_image_spans.push(r),
                    SpanResult::Symbol(r) => value.replaced_symbol_spans.push(r),
                    SpanResult::Placeholder(r) => value.replaced_placeholder_spans.push(r),
                }
            }
        }
        value
    }

    /// The Did variant of this value.
    pub(crate) fn completed(mut self) -> Self {
        self.range_after = Some(self.final_range);
        self
    }

    /// Plain text of everything inserted, U+FFFC for non-text content.
    ///
    /// Together with `range_before` this is the styled-string view of the change.
    pub fn replacement_text(&self) -> &str {
        &self.replacement
    }

    /// Total number of replacement span results of every kind.
    pub fn replaced_count(&self) -> usize {
        self.replaced_spans.len()
            + self.replaced_image_spans.len()
            + self.replaced_symbol_spans.len()
            + self.replaced_placeholder_spans.len()
    }
}

/// Last inserted range in post-edit coordinates, or the collapsed caret of a pure deletion.
fn final_range(edits: &[TextEdit]) -> TextRange {
    if let Some(edit) = edits.iter().rev().find(|e| !e.inserted_text.is_empty()) {
        return TextRange::new(edit.start_after, edit.start_after + edit.inserted_len());
    }
    edits
        .first()
        .map_or(TextRange::default(), |e| TextRange::caret(e.start_after))
}
