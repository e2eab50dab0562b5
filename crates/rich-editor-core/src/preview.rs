//! IME preview (composition) text.
//!
//! A preview is real document content owned by the input method until it is finished or
//! cancelled. Each display replaces the previous preview text and fires its own Will/Did pair,
//! but nothing enters the undo history until [`RichEditor::finish_text_preview`], which records
//! a single step for the net change since the preview started.
//!
//! While a preview is active the caret and selection setters, deletions and undo/redo are
//! refused.
//!
//! # Example
//!
//! ```rust
//! use rich_editor_core::{RichEditor, TextRange};
//!
//! let mut editor = RichEditor::new();
//! editor.set_preview_text("n", -1, -1);
//! editor.set_preview_text("ni", -1, -1);
//! assert_eq!(editor.preview_decoration(), Some(TextRange::new(0, 2)));
//!
//! editor.finish_text_preview().unwrap();
//! assert_eq!(editor.text_content(), "ni");
//! assert_eq!(editor.undo_depth(), 1);
//! ```

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::change::TextChangeReason;
use crate::delta::TextDelta;
use crate::document::SpanDocument;
use crate::editor::{EditOutcome, RichEditor};
use crate::error::EditorError;
use crate::events::InsertValueInfo;
use crate::mutation::{Plan, Recording, SelectionAfter};
use crate::selector::{Selector, TextRange};
use crate::text;
use crate::undo::{RecordType, SpanEdit, TextEdit, UndoStep};

/// Range and content of the active preview; both offsets are `None` when inactive.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreviewTextRecord {
    /// First offset of the preview text.
    pub start_offset: Option<usize>,
    /// End of the preview text (exclusive).
    pub end_offset: Option<usize>,
    /// Uncommitted candidate text.
    pub preview_content: String,
}

impl PreviewTextRecord {
    /// Whether a preview is active.
    pub fn is_active(&self) -> bool {
        self.start_offset.is_some() && self.end_offset.is_some()
    }

    /// Preview range, if active.
    pub fn range(&self) -> Option<TextRange> {
        match (self.start_offset, self.end_offset) {
            (Some(start), Some(end)) => Some(TextRange::new(start, end)),
            _ => None,
        }
    }
}

/// Document and selection as they were before the first display.
#[derive(Debug, Clone)]
pub(crate) struct PreviewOrigin {
    doc: SpanDocument,
    selector: Selector,
}

impl RichEditor {
    /// The preview record.
    pub fn preview_record(&self) -> &PreviewTextRecord {
        &self.preview
    }

    /// Whether an IME preview is active.
    pub fn is_previewing(&self) -> bool {
        self.preview.is_active()
    }

    /// Range to draw the preview decoration (underline box) over.
    pub fn preview_decoration(&self) -> Option<TextRange> {
        self.preview.range()
    }

    /// Show `value` as preview text.
    ///
    /// `(-1, -1)` targets the active preview, or the selection/caret when inactive. An explicit
    /// range is unioned with the active preview. An empty `value` cancels an active preview.
    /// A veto leaves the previous preview in place.
    pub fn set_preview_text(&mut self, value: &str, start: i64, end: i64) -> EditOutcome {
        let current = self.preview.range();
        if value.is_empty() {
            return match current {
                Some(_) => self.cancel_preview(),
                None => EditOutcome::Unchanged,
            };
        }
        let explicit = (start != -1 || end != -1).then(|| self.doc.normalize_range(start, end));
        let target = match (current, explicit) {
            (Some(preview), Some(range)) => preview.union(&range),
            (Some(preview), None) => preview,
            (None, Some(range)) => range,
            (None, None) => self.selector.range_or_caret(),
        };

        let origin = current.is_none().then(|| PreviewOrigin {
            doc: self.doc.clone(),
            selector: self.selector.clone(),
        });
        let typing = self.typing_style.clone();
        let mut doc = self.doc.clone();
        doc.remove_range(target);
        doc.insert_text(target.start, value, typing.as_ref());

        let inserted = value.chars().count();
        let plan = Plan {
            doc,
            edits: vec![TextEdit {
                start_before: target.start,
                start_after: target.start,
                deleted_text: self.doc.text_in(target.to_range()),
                inserted_text: value.to_string(),
            }],
            range_before: target,
            reason: TextChangeReason::Input,
            selection_after: SelectionAfter::Caret(target.start + inserted),
        };
        let outcome = self.apply_plan(plan, Recording::None);
        if outcome.is_applied() {
            if let Some(origin) = origin {
                self.preview_origin = Some(origin);
            }
            self.preview = PreviewTextRecord {
                start_offset: Some(target.start),
                end_offset: Some(target.start + inserted),
                preview_content: value.to_string(),
            };
            self.undo.end_group();
            trace!(target: "rich_editor.preview", start = target.start, len = inserted, "preview_shown");
        }
        outcome
    }

    /// Commit the active preview.
    ///
    /// Records one undo step for the net change since the preview started, trims to
    /// `max_length`, and fires `on_ime_input_complete`. The display already fired its Will/Did
    /// pair, so no new pair fires; a trim only shows up in the recorded step and the delta.
    pub fn finish_text_preview(&mut self) -> Result<EditOutcome, EditorError> {
        let range = self.preview.range().ok_or(EditorError::NoPreview)?;
        self.finalize_preview(range);
        Ok(EditOutcome::Applied)
    }

    /// Remove the active preview and restore the document and selection from before it.
    pub fn cancel_preview(&mut self) -> EditOutcome {
        if !self.preview.is_active() {
            return EditOutcome::Unchanged;
        }
        let Some(origin) = self.preview_origin.clone() else {
            self.preview = PreviewTextRecord::default();
            return EditOutcome::Unchanged;
        };
        let record = std::mem::take(&mut self.preview);

        let Some(edit) = net_text_edit(&self.doc, &origin.doc) else {
            self.doc = origin.doc;
            self.selector = origin.selector;
            self.preview_origin = None;
            self.notify_selection_change();
            return EditOutcome::Applied;
        };
        let range_before = TextRange::new(edit.start_before, edit.start_before + edit.deleted_len());
        let plan = Plan {
            doc: origin.doc,
            edits: vec![edit],
            range_before,
            reason: TextChangeReason::Input,
            selection_after: SelectionAfter::Exact(origin.selector),
        };
        let outcome = self.apply_plan(plan, Recording::None);
        if outcome.is_applied() {
            self.preview_origin = None;
            debug!(target: "rich_editor.preview", "preview_cancelled");
        } else {
            self.preview = record;
        }
        outcome
    }

    /// Replace the preview text with `value` and commit it, firing one Will/Did pair.
    pub(crate) fn commit_preview_with(&mut self, value: &str) -> EditOutcome {
        let Some(range) = self.preview.range() else {
            return EditOutcome::Unchanged;
        };
        let value = self.clip_to_capacity(value, range.len());
        let info = InsertValueInfo {
            insert_offset: range.start,
            insert_value: value.to_string(),
        };
        if !self.events.fire_about_to_ime_input(&info) {
            debug!(target: "rich_editor.preview", offset = range.start, "ime_input_vetoed");
            return EditOutcome::Vetoed;
        }
        let typing = self.typing_style.clone();
        let mut doc = self.doc.clone();
        doc.remove_range(range);
        doc.insert_text(range.start, value, typing.as_ref());

        let inserted = value.chars().count();
        if inserted == 0 && range.is_empty() {
            self.finalize_preview(range);
            return EditOutcome::Unchanged;
        }
        let plan = Plan {
            doc,
            edits: vec![TextEdit {
                start_before: range.start,
                start_after: range.start,
                deleted_text: self.doc.text_in(range.to_range()),
                inserted_text: value.to_string(),
            }],
            range_before: range,
            reason: TextChangeReason::Input,
            selection_after: SelectionAfter::Caret(range.start + inserted),
        };
        let outcome = self.apply_plan(plan, Recording::None);
        if outcome.is_applied() {
            self.finalize_preview(TextRange::new(range.start, range.start + inserted));
        }
        outcome
    }

    fn finalize_preview(&mut self, range: TextRange) {
        self.preview = PreviewTextRecord::default();
        let trim = self.trim_to_max_length(range);
        let committed = match &trim {
            Some(edit) => TextRange::new(range.start, edit.start_before.max(range.start)),
            None => range,
        };
        let origin = self.preview_origin.take();
        let group_id = match origin {
            Some(origin) => self.record_preview_commit(origin),
            None => None,
        };
        if let Some(edit) = trim {
            let before_len = self.doc.len() + edit.deleted_len();
            self.last_text_delta = Some(TextDelta::from_edits(before_len, &[edit], group_id));
            self.notify_selection_change();
        }
        debug!(target: "rich_editor.preview", start = committed.start, len = committed.len(), "preview_committed");
        self.fire_ime_input_complete(committed);
    }

    /// Push one undo step taking the document from `origin` to its current state.
    fn record_preview_commit(&mut self, origin: PreviewOrigin) -> Option<usize> {
        let span_edit = SpanEdit::diff(origin.doc.spans(), self.doc.spans());
        let text_edit = net_text_edit(&origin.doc, &self.doc);
        if span_edit.is_none() && text_edit.is_none() {
            return None;
        }
        let step = UndoStep {
            group_id: 0,
            record_type: RecordType::Insert,
            reason: TextChangeReason::Input,
            span_edits: span_edit.into_iter().collect(),
            text_edits: text_edit.into_iter().collect(),
            before_selection: origin.selector,
            after_selection: self.selector.clone(),
        };
        self.last_record = Some(RecordType::Insert);
        Some(self.undo.push_step(step, false))
    }

    /// Cut the tail of `committed` that exceeds `max_length` straight out of the document.
    ///
    /// Runs inside the commit, so it has no Will/Did pair and cannot be vetoed.
    fn trim_to_max_length(&mut self, committed: TextRange) -> Option<TextEdit> {
        let max = self.config.max_length?;
        let len = self.doc.len();
        let excess = len.saturating_sub(max);
        if excess == 0 {
            return None;
        }
        let end = committed.end.min(len);
        let start = end.saturating_sub(excess).max(committed.start);
        let start = text::snap_grapheme_floor(self.doc.rope(), start);
        if start >= end {
            return None;
        }
        let deleted_text = self.doc.text_in(start..end);
        self.doc.remove_range(TextRange::new(start, end));
        self.selector.map_through(&[(start, end - start, 0)]);
        self.selector.clamp_to(self.doc.len());
        debug!(target: "rich_editor.preview", start, removed = end - start, max, "preview_trimmed");
        Some(TextEdit {
            start_before: start,
            start_after: start,
            deleted_text,
            inserted_text: String::new(),
        })
    }
}

/// Net plain-text change from `old` to `new`, found by trimming the common prefix and suffix.
fn net_text_edit(old: &SpanDocument, new: &SpanDocument) -> Option<TextEdit> {
    let a: Vec<char> = old.rope().chars().collect();
    let b: Vec<char> = new.rope().chars().collect();
    let prefix = a.iter().zip(&b).take_while(|(x, y)| x == y).count();
    let max_suffix = a.len().min(b.len()) - prefix;
    let suffix = a
        .iter()
        .rev()
        .zip(b.iter().rev())
        .take(max_suffix)
        .take_while(|(x, y)| x == y)
        .count();
    if prefix + suffix == a.len() && prefix + suffix == b.len() {
        return None;
    }
    Some(TextEdit {
        start_before: prefix,
        start_after: prefix,
        deleted_text: a[prefix..a.len() - suffix].iter().collect(),
        inserted_text: b[prefix..b.len() - suffix].iter().collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EditorConfig;
    use crate::mutation::TextSpanOptions;
    use std::sync::{Arc, Mutex};

    fn editor_with(text: &str) -> RichEditor {
        let mut editor = RichEditor::new();
        editor.add_text_span(TextSpanOptions::new(text));
        editor
    }

    #[test]
    fn test_second_preview_replaces_first() {
        let mut editor = editor_with("ab");
        editor.set_caret_offset(1);
        editor.set_preview_text("x", -1, -1);
        editor.set_preview_text("xyz", -1, -1);
        assert_eq!(editor.text_content(), "axyzb");
        assert_eq!(editor.preview_record().preview_content, "xyz");
        assert_eq!(editor.preview_decoration(), Some(TextRange::new(1, 4)));
        assert_eq!(editor.caret_offset(), 4);
    }

    #[test]
    fn test_preview_blocks_selection_and_undo() {
        let mut editor = editor_with("ab");
        editor.set_preview_text("x", -1, -1);
        assert!(!editor.set_selection(0, 1, true));
        assert!(!editor.set_caret_offset(0));
        assert!(matches!(editor.undo(), Err(EditorError::PreviewActive)));
        assert_eq!(editor.delete_backward(1), EditOutcome::Unchanged);
    }

    #[test]
    fn test_finish_records_single_step() {
        let mut editor = editor_with("ab");
        editor.set_caret_offset(2);
        let depth = editor.undo_depth();
        editor.set_preview_text("c", -1, -1);
        editor.set_preview_text("cd", -1, -1);
        editor.finish_text_preview().unwrap();
        assert!(!editor.is_previewing());
        assert_eq!(editor.undo_depth(), depth + 1);
        editor.undo().unwrap();
        assert_eq!(editor.text_content(), "ab");
        assert!(matches!(editor.finish_text_preview(), Err(EditorError::NoPreview)));
    }

    #[test]
    fn test_cancel_restores_selection_text() {
        let mut editor = editor_with("hello");
        editor.set_selection(1, 4, true);
        editor.set_preview_text("X", -1, -1);
        assert_eq!(editor.text_content(), "hXo");
        assert_eq!(editor.cancel_preview(), EditOutcome::Applied);
        assert_eq!(editor.text_content(), "hello");
        assert_eq!(editor.selection(), TextRange::new(1, 4));
        assert!(!editor.is_previewing());
    }

    #[test]
    fn test_empty_value_cancels() {
        let mut editor = editor_with("ab");
        editor.set_preview_text("zz", -1, -1);
        editor.set_preview_text("", -1, -1);
        assert_eq!(editor.text_content(), "ab");
        assert!(!editor.is_previewing());
    }

    #[test]
    fn test_vetoed_display_keeps_previous_preview() {
        let mut editor = editor_with("ab");
        editor.set_caret_offset(2);
        editor.set_preview_text("c", -1, -1);
        editor.events_mut().set_on_will_change(|_| false);
        assert_eq!(editor.set_preview_text("cd", -1, -1), EditOutcome::Vetoed);
        assert_eq!(editor.text_content(), "abc");
        assert_eq!(editor.preview_decoration(), Some(TextRange::new(2, 3)));
    }

    #[test]
    fn test_finish_trims_to_max_length() {
        let mut editor = RichEditor::with_config(EditorConfig {
            max_length: Some(4),
            ..EditorConfig::default()
        });
        editor.insert_value("ab");
        editor.set_preview_text("cdef", -1, -1);
        assert_eq!(editor.text_content(), "abcdef");
        let depth = editor.undo_depth();
        let dids = Arc::new(Mutex::new(0));
        let d = dids.clone();
        editor.events_mut().set_on_did_change(move |_| *d.lock().unwrap() += 1);
        editor.events_mut().set_about_to_delete(|_| false);
        editor.events_mut().set_on_will_change(|_| false);

        editor.finish_text_preview().unwrap();
        assert_eq!(editor.text_content(), "abcd");
        assert_eq!(editor.caret_offset(), 4);
        assert_eq!(editor.undo_depth(), depth + 1);
        assert_eq!(*dids.lock().unwrap(), 0);

        let delta = editor.take_last_text_delta().unwrap();
        assert_eq!(delta.apply_to("abcdef"), "abcd");
        assert_eq!(delta.after_char_count, 4);
    }

    #[test]
    fn test_trimmed_commit_undoes_in_one_step() {
        let mut editor = RichEditor::with_config(EditorConfig {
            max_length: Some(3),
            ..EditorConfig::default()
        });
        editor.insert_value("a");
        editor.set_preview_text("xyz", -1, -1);
        editor.finish_text_preview().unwrap();
        assert_eq!(editor.text_content(), "axy");

        editor.undo().unwrap();
        assert_eq!(editor.text_content(), "a");
        editor.redo().unwrap();
        assert_eq!(editor.text_content(), "axy");
    }

    #[test]
    fn test_insert_value_over_preview_clipped_to_max_length() {
        let mut editor = RichEditor::with_config(EditorConfig {
            max_length: Some(4),
            ..EditorConfig::default()
        });
        editor.insert_value("ab");
        editor.set_preview_text("c", -1, -1);
        let dids = Arc::new(Mutex::new(Vec::new()));
        let d = dids.clone();
        editor
            .events_mut()
            .set_on_did_change(move |v| d.lock().unwrap().push(v.replacement_text().to_string()));

        assert_eq!(editor.insert_value("cdef"), EditOutcome::Applied);
        assert_eq!(editor.text_content(), "abcd");
        assert_eq!(*dids.lock().unwrap(), vec!["cd".to_string()]);
        assert_eq!(editor.undo_depth(), 2);
    }

    #[test]
    fn test_insert_value_commits_preview_with_one_pair() {
        let mut editor = editor_with("ab");
        editor.set_caret_offset(2);
        editor.set_preview_text("n", -1, -1);
        let pairs = Arc::new(Mutex::new(Vec::new()));
        let p = pairs.clone();
        editor
            .events_mut()
            .set_on_did_change(move |v| p.lock().unwrap().push(v.replacement_text().to_string()));
        let completed = Arc::new(Mutex::new(Vec::new()));
        let c = completed.clone();
        editor
            .events_mut()
            .set_on_ime_input_complete(move |r| c.lock().unwrap().push(r.value.clone()));

        assert_eq!(editor.insert_value("你"), EditOutcome::Applied);
        assert_eq!(editor.text_content(), "ab你");
        assert!(!editor.is_previewing());
        assert_eq!(*pairs.lock().unwrap(), vec!["你".to_string()]);
        assert_eq!(*completed.lock().unwrap(), vec!["ab你".to_string()]);
    }

    #[test]
    fn test_net_text_edit_trims_common_parts() {
        let old = SpanDocument::from_data(vec![crate::span::SpanData::text("abcd", Default::default())]);
        let new = SpanDocument::from_data(vec![crate::span::SpanData::text("abXd", Default::default())]);
        let edit = net_text_edit(&old, &new).unwrap();
        assert_eq!(edit.start_before, 2);
        assert_eq!(edit.deleted_text, "c");
        assert_eq!(edit.inserted_text, "X");
        assert!(net_text_edit(&old, &old).is_none());
    }
}
