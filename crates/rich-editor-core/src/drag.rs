//! Drag and drop of selected content.
//!
//! The editor that starts a drag is the *sponsor*. It remembers the dragged range and span data,
//! so dropping back into itself moves the content in one step. Any other editor is a
//! *receiver* and inserts the dropped text at its caret.
//!
//! The drop point is the caret. Hosts move the caret to the hit-tested offset while the pointer
//! moves, then call [`RichEditor::handle_on_drag_drop_text_operation`].
//!
//! # Example
//!
//! ```rust
//! use rich_editor_core::{RichEditor, TextSpanOptions};
//!
//! let mut editor = RichEditor::new();
//! editor.add_text_span(TextSpanOptions::new("abc def"));
//! editor.set_selection(0, 3, true);
//!
//! let payload = editor.on_drag_start().unwrap();
//! assert_eq!(payload.plain_text, "abc");
//!
//! editor.set_caret_offset(7);
//! editor.handle_on_drag_drop_text_operation(&payload.plain_text, true).unwrap();
//! editor.on_drag_end();
//! assert_eq!(editor.text_content(), " defabc");
//! ```

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::change::TextChangeReason;
use crate::editor::{EditOutcome, RichEditor};
use crate::error::EditorError;
use crate::events::DragStartInfo;
use crate::mutation::{Plan, Recording, SelectionAfter};
use crate::selector::TextRange;
use crate::span::{OBJECT_REPLACEMENT_CHAR, SpanData};
use crate::undo::{RecordType, TextEdit};

/// Whether a drag session is in progress.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DragStatus {
    /// No drag.
    #[default]
    None,
    /// Content is being dragged.
    Dragging,
}

/// Transferable content of a drag.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DragPayload {
    /// Plain text, non-text spans omitted.
    pub plain_text: String,
    /// JSON encoding of `spans`, for transfer between editors.
    pub extra_info: String,
    /// Dragged span data.
    pub spans: Vec<SpanData>,
}

impl DragPayload {
    /// Payload carrying `spans`.
    pub fn from_spans(spans: Vec<SpanData>) -> Result<Self, EditorError> {
        let plain_text = spans
            .iter()
            .flat_map(|s| s.plain_text().chars().collect::<Vec<_>>())
            .filter(|&c| c != OBJECT_REPLACEMENT_CHAR)
            .collect();
        let extra_info = serde_json::to_string(&spans)?;
        Ok(Self {
            plain_text,
            extra_info,
            spans,
        })
    }

    /// Decode the span list from `extra_info`; empty when there is none.
    pub fn decode_spans(&self) -> Result<Vec<SpanData>, EditorError> {
        if self.extra_info.is_empty() {
            return Ok(Vec::new());
        }
        Ok(serde_json::from_str(&self.extra_info)?)
    }
}

/// Sponsor-side drag state.
#[derive(Debug, Clone, Default)]
pub(crate) struct DragSession {
    pub(crate) status: DragStatus,
    pub(crate) range: Option<TextRange>,
    pub(crate) is_sponsor: bool,
    pub(crate) spans: Vec<SpanData>,
}

impl RichEditor {
    /// Start dragging the selection.
    ///
    /// A registered drag-start handler supplies the payload and the selection is kept.
    /// Otherwise the selected spans are packed into the payload and the selection is cleared;
    /// with nothing selected the payload is empty.
    pub fn on_drag_start(&mut self) -> Result<DragPayload, EditorError> {
        let range = self.selector.range();
        let info = DragStartInfo {
            range: range.unwrap_or_else(|| self.selector.range_or_caret()),
            plain_text: range.map(|r| self.doc.plain_text_in(r.to_range())).unwrap_or_default(),
        };
        if let Some(payload) = self.events.fire_drag_start(&info) {
            self.drag = DragSession {
                status: DragStatus::Dragging,
                range,
                is_sponsor: range.is_some(),
                spans: payload.spans.clone(),
            };
            trace!(target: "rich_editor.drag", custom = true, "drag_start");
            return Ok(payload);
        }

        let Some(range) = range else {
            self.clear_selection();
            self.drag = DragSession::default();
            return Ok(DragPayload::default());
        };
        let spans = self.doc.slice_data(range);
        let payload = DragPayload::from_spans(spans.clone())?;
        self.clear_selection();
        self.drag = DragSession {
            status: DragStatus::Dragging,
            range: Some(range),
            is_sponsor: true,
            spans,
        };
        debug!(target: "rich_editor.drag", start = range.start, end = range.end, "drag_start");
        Ok(payload)
    }

    /// Current drag status.
    pub fn drag_status(&self) -> DragStatus {
        self.drag.status
    }

    /// Range being dragged out of this editor.
    pub fn drag_range(&self) -> Option<TextRange> {
        self.drag.range
    }

    /// Whether this editor started the current drag.
    pub fn is_drag_sponsor(&self) -> bool {
        self.drag.is_sponsor
    }

    /// Drop `text` at the caret.
    ///
    /// As sponsor, a drop inside the dragged range only moves the caret. Any other sponsor drop
    /// moves the dragged spans in one step. As receiver, `text` is inserted.
    pub fn handle_on_drag_drop_text_operation(
        &mut self,
        text: &str,
        is_sponsor: bool,
    ) -> Result<EditOutcome, EditorError> {
        if self.preview.is_active() {
            return Ok(EditOutcome::Unchanged);
        }
        let len = self.doc.len();
        let drop = self.selector.caret().min(len);
        if !is_sponsor {
            return Ok(self.drop_text(drop, text));
        }

        let range = self.drag.range.ok_or(EditorError::NoDragSession)?;
        let range = TextRange::new(range.start.min(len), range.end.min(len));
        if range.start <= drop && drop <= range.end {
            trace!(target: "rich_editor.drag", drop, "drop_inside_source");
            self.set_caret_offset(drop as i64);
            return Ok(EditOutcome::Unchanged);
        }
        Ok(self.move_dragged(range, drop, text))
    }

    /// End the drag session and stop any drag auto-scroll.
    pub fn on_drag_end(&mut self) {
        self.drag = DragSession::default();
        self.scroller.stop_auto_scroll();
    }

    fn move_dragged(&mut self, range: TextRange, drop: usize, text: &str) -> EditOutcome {
        let at = if drop > range.end { drop - range.len() } else { drop };
        let mut doc = self.doc.clone();
        doc.remove_range(range);

        let inserted = if self.drag.spans.is_empty() {
            if text.is_empty() {
                return EditOutcome::Unchanged;
            }
            let typing = self.typing_style.clone();
            doc.insert_text(at, text, typing.as_ref());
            text.chars().count()
        } else {
            let spans = self.drag.spans.clone();
            let inserted = spans.iter().map(SpanData::char_len).sum();
            doc.insert_data_at(at, spans);
            inserted
        };
        let junction = if drop > range.end {
            range.start
        } else {
            range.start + inserted
        };
        doc.merge_around(at + inserted);
        doc.merge_around(at);
        doc.merge_around(junction);

        let deletion = TextEdit {
            start_before: range.start,
            start_after: if drop > range.end {
                range.start
            } else {
                range.start + inserted
            },
            deleted_text: self.doc.text_in(range.to_range()),
            inserted_text: String::new(),
        };
        let insertion = TextEdit {
            start_before: drop,
            start_after: at,
            deleted_text: String::new(),
            inserted_text: doc.text_in(at..at + inserted),
        };
        let edits = if drop < range.start {
            vec![insertion, deletion]
        } else {
            vec![deletion, insertion]
        };
        let plan = Plan {
            doc,
            edits,
            range_before: range,
            reason: TextChangeReason::Drag,
            selection_after: SelectionAfter::Caret(at + inserted),
        };
        let outcome = self.apply_plan(
            plan,
            Recording::Step {
                record_type: RecordType::Drag,
                coalescible: false,
            },
        );
        if outcome.is_applied() {
            self.drag.range = None;
        }
        debug!(target: "rich_editor.drag", from = range.start, to = at, len = inserted, outcome = ?outcome, "drop_move");
        outcome
    }

    fn drop_text(&mut self, drop: usize, text: &str) -> EditOutcome {
        let text = self.clip_to_capacity(text, 0);
        if text.is_empty() {
            return EditOutcome::Unchanged;
        }
        let typing = self.typing_style.clone();
        let mut doc = self.doc.clone();
        doc.insert_text(drop, text, typing.as_ref());
        let inserted = text.chars().count();
        let plan = Plan {
            doc,
            edits: vec![TextEdit {
                start_before: drop,
                start_after: drop,
                deleted_text: String::new(),
                inserted_text: text.to_string(),
            }],
            range_before: TextRange::caret(drop),
            reason: TextChangeReason::Drag,
            selection_after: SelectionAfter::Caret(drop + inserted),
        };
        let outcome = self.apply_plan(
            plan,
            Recording::Step {
                record_type: RecordType::Drag,
                coalescible: false,
            },
        );
        debug!(target: "rich_editor.drag", drop, len = inserted, outcome = ?outcome, "drop_receive");
        outcome
    }
}
