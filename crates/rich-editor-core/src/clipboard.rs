//! Copy, cut and paste.
//!
//! The platform clipboard sits behind the [`Clipboard`] trait. [`InMemoryClipboard`] is the
//! default backend; its clones share one buffer, so two editors can exchange content in tests
//! and headless hosts.
//!
//! Rich content travels as the JSON encoding of the span list next to its plain text. Paste
//! prefers the span list and falls back to plain text.
//!
//! # Example
//!
//! ```rust
//! use rich_editor_core::{InMemoryClipboard, RichEditor, TextSpanOptions};
//!
//! let shared = InMemoryClipboard::new();
//! let mut source = RichEditor::new();
//! source.set_clipboard(Box::new(shared.clone()));
//! source.add_text_span(TextSpanOptions::new("hello"));
//! source.select_all();
//! assert!(source.copy().unwrap());
//!
//! let mut target = RichEditor::new();
//! target.set_clipboard(Box::new(shared));
//! target.paste().unwrap();
//! assert_eq!(target.text_content(), "hello");
//! ```

use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::change::TextChangeReason;
use crate::editor::{EditOutcome, RichEditor};
use crate::error::EditorError;
use crate::events::{DeleteDirection, EventKind};
use crate::mutation::{Plan, Recording, SelectionAfter};
use crate::selector::TextRange;
use crate::span::{OBJECT_REPLACEMENT_CHAR, SpanContent, SpanData};
use crate::text;
use crate::undo::{RecordType, TextEdit};

/// Clipboard content.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClipboardData {
    /// Plain text, non-text spans omitted.
    pub plain_text: String,
    /// JSON span list, when the content came from a rich editor.
    pub spans_json: Option<String>,
}

impl ClipboardData {
    /// Plain-text content.
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            plain_text: text.into(),
            spans_json: None,
        }
    }

    /// Rich content carrying `spans`.
    pub fn from_spans(spans: &[SpanData]) -> Result<Self, EditorError> {
        let plain_text = spans
            .iter()
            .map(|s| s.plain_text())
            .collect::<String>()
            .chars()
            .filter(|&c| c != OBJECT_REPLACEMENT_CHAR)
            .collect();
        Ok(Self {
            plain_text,
            spans_json: Some(serde_json::to_string(spans)?),
        })
    }

    /// Decoded span list, if any.
    pub fn spans(&self) -> Result<Option<Vec<SpanData>>, EditorError> {
        match &self.spans_json {
            Some(json) => Ok(Some(serde_json::from_str(json)?)),
            None => Ok(None),
        }
    }
}

/// Platform clipboard access.
pub trait Clipboard: Send {
    /// Current content, if any.
    fn read(&self) -> Option<ClipboardData>;

    /// Replace the content.
    fn write(&mut self, data: ClipboardData);
}

/// Process-local clipboard. Clones share the same buffer.
#[derive(Debug, Clone, Default)]
pub struct InMemoryClipboard {
    inner: Arc<Mutex<Option<ClipboardData>>>,
}

impl InMemoryClipboard {
    /// Empty clipboard.
    pub fn new() -> Self {
        Self::default()
    }
}

impl Clipboard for InMemoryClipboard {
    fn read(&self) -> Option<ClipboardData> {
        match self.inner.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    fn write(&mut self, data: ClipboardData) {
        match self.inner.lock() {
            Ok(mut guard) => *guard = Some(data),
            Err(poisoned) => *poisoned.into_inner() = Some(data),
        }
    }
}

impl RichEditor {
    /// Copy the selection. Returns `false` when nothing was copied (no selection, or the copy
    /// handler prevented it).
    pub fn copy(&mut self) -> Result<bool, EditorError> {
        let Some(range) = self.selector.range() else {
            return Ok(false);
        };
        if !self.events.fire_clipboard(EventKind::Copy) {
            debug!(target: "rich_editor.clipboard", "copy_prevented");
            return Ok(false);
        }
        let data = ClipboardData::from_spans(&self.doc.slice_data(range))?;
        self.clipboard.write(data);
        debug!(target: "rich_editor.clipboard", start = range.start, end = range.end, "copy");
        Ok(true)
    }

    /// Copy the selection, then delete it.
    pub fn cut(&mut self) -> Result<EditOutcome, EditorError> {
        if self.preview.is_active() {
            return Ok(EditOutcome::Unchanged);
        }
        let Some(range) = self.selector.range() else {
            return Ok(EditOutcome::Unchanged);
        };
        if !self.events.fire_clipboard(EventKind::Cut) {
            debug!(target: "rich_editor.clipboard", "cut_prevented");
            return Ok(EditOutcome::Unchanged);
        }
        let data = ClipboardData::from_spans(&self.doc.slice_data(range))?;
        let outcome = self.delete_range(range, DeleteDirection::Backward, TextChangeReason::Input);
        if outcome.is_applied() {
            self.clipboard.write(data);
        }
        debug!(target: "rich_editor.clipboard", start = range.start, end = range.end, outcome = ?outcome, "cut");
        Ok(outcome)
    }

    /// Insert the clipboard content over the selection.
    pub fn paste(&mut self) -> Result<EditOutcome, EditorError> {
        if self.preview.is_active() {
            return Ok(EditOutcome::Unchanged);
        }
        if !self.events.fire_clipboard(EventKind::Paste) {
            debug!(target: "rich_editor.clipboard", "paste_prevented");
            return Ok(EditOutcome::Unchanged);
        }
        let Some(data) = self.clipboard.read() else {
            return Ok(EditOutcome::Unchanged);
        };
        let range = self.selector.range_or_caret();
        let outcome = match data.spans()? {
            Some(spans) if !spans.is_empty() => self.paste_spans(range, spans),
            _ => self.replace_text(range, &data.plain_text, TextChangeReason::Paste),
        };
        debug!(target: "rich_editor.clipboard", start = range.start, end = range.end, outcome = ?outcome, "paste");
        Ok(outcome)
    }

    fn paste_spans(&mut self, range: TextRange, spans: Vec<SpanData>) -> EditOutcome {
        let spans = self.clip_data(spans, range.len());
        let inserted: usize = spans.iter().map(SpanData::char_len).sum();
        if inserted == 0 {
            return EditOutcome::Unchanged;
        }
        let mut doc = self.doc.clone();
        doc.remove_range(range);
        doc.insert_data_at(range.start, spans);
        let plan = Plan {
            edits: vec![TextEdit {
                start_before: range.start,
                start_after: range.start,
                deleted_text: self.doc.text_in(range.to_range()),
                inserted_text: doc.text_in(range.start..range.start + inserted),
            }],
            doc,
            range_before: range,
            reason: TextChangeReason::Paste,
            selection_after: SelectionAfter::Caret(range.start + inserted),
        };
        self.apply_plan(
            plan,
            Recording::Step {
                record_type: RecordType::Insert,
                coalescible: false,
            },
        )
    }

    /// Cut `spans` down to what fits under `max_length` once `removed` offsets are gone.
    fn clip_data(&self, spans: Vec<SpanData>, removed: usize) -> Vec<SpanData> {
        let Some(max) = self.config.max_length else {
            return spans;
        };
        let mut room = max.saturating_sub(self.doc.len().saturating_sub(removed));
        let mut out = Vec::with_capacity(spans.len());
        for mut data in spans {
            if room == 0 {
                break;
            }
            if let SpanContent::Text(text) = &mut data.content {
                let kept = text::clip_to_graphemes(text, room).to_string();
                *text = kept;
            }
            let len = data.char_len();
            if len == 0 || len > room {
                break;
            }
            room -= len;
            out.push(data);
        }
        out
    }
}
