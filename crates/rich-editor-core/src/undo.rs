//! Undo/redo history.
//!
//! Each committed content change is recorded as one [`UndoStep`]. A step stores enough to move
//! the document both ways:
//!
//! - [`SpanEdit`]s: the window of sibling spans that changed, before and after. Replaying them
//!   restores styles, span identity and non-text spans exactly.
//! - [`TextEdit`]s: the net plain-text change, used for change events and deltas.
//! - The selection before and after the change.
//!
//! Consecutive typed characters coalesce into one step while the group stays open. Any other
//! command closes the group.

use serde::{Deserialize, Serialize};

use crate::change::TextChangeReason;
use crate::selector::Selector;
use crate::span::Span;

/// Kind of operation a step records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RecordType {
    /// Forward deletion.
    DelForward,
    /// Backward deletion.
    DelBackward,
    /// Insertion or replacement.
    Insert,
    /// Undo of a recorded step.
    Undo,
    /// Redo of a recorded step.
    Redo,
    /// Drag and drop.
    Drag,
    /// Span or paragraph restyle; content is unchanged.
    Style,
}

/// One plain-text edit of a change.
///
/// Edits of one change are simultaneous: `start_before` is in pre-change coordinates,
/// `start_after` in post-change coordinates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextEdit {
    /// Start in the document before the change.
    pub start_before: usize,
    /// Start in the document after the change.
    pub start_after: usize,
    /// Removed text, U+FFFC for non-text spans.
    pub deleted_text: String,
    /// Inserted text, U+FFFC for non-text spans.
    pub inserted_text: String,
}

impl TextEdit {
    /// Removed length in offsets.
    pub fn deleted_len(&self) -> usize {
        self.deleted_text.chars().count()
    }

    /// Added length in offsets.
    pub fn inserted_len(&self) -> usize {
        self.inserted_text.chars().count()
    }

    /// The edit that undoes this one.
    pub(crate) fn inverted(&self) -> TextEdit {
        TextEdit {
            start_before: self.start_after,
            start_after: self.start_before,
            deleted_text: self.inserted_text.clone(),
            inserted_text: self.deleted_text.clone(),
        }
    }

    pub(crate) fn is_pure_insert(&self) -> bool {
        self.deleted_text.is_empty() && !self.inserted_text.is_empty()
    }
}

/// Replacement of a window of sibling spans.
#[derive(Debug, Clone)]
pub struct SpanEdit {
    /// Index of the first replaced sibling.
    pub index: usize,
    /// Spans in the window before the change.
    pub removed: Vec<Span>,
    /// Spans in the window after the change.
    pub inserted: Vec<Span>,
}

impl SpanEdit {
    /// Smallest window covering every difference between `old` and `new`.
    ///
    /// Returns `None` when both sequences are identical.
    pub(crate) fn diff(old: &[Span], new: &[Span]) -> Option<SpanEdit> {
        let prefix = old
            .iter()
            .zip(new)
            .take_while(|(a, b)| a.same_as(b))
            .count();
        let max_suffix = old.len().min(new.len()) - prefix;
        let suffix = old
            .iter()
            .rev()
            .zip(new.iter().rev())
            .take(max_suffix)
            .take_while(|(a, b)| a.same_as(b))
            .count();
        if prefix + suffix == old.len() && prefix + suffix == new.len() {
            return None;
        }
        Some(SpanEdit {
            index: prefix,
            removed: old[prefix..old.len() - suffix].to_vec(),
            inserted: new[prefix..new.len() - suffix].to_vec(),
        })
    }
}

/// One recorded change.
#[derive(Debug, Clone)]
pub struct UndoStep {
    /// Group the step belongs to.
    pub group_id: usize,
    /// Operation recorded.
    pub record_type: RecordType,
    /// Reason reported when the step is undone or redone.
    pub reason: TextChangeReason,
    /// Span windows to replay, in application order.
    pub span_edits: Vec<SpanEdit>,
    /// Net plain-text change, sorted by start.
    pub text_edits: Vec<TextEdit>,
    /// Selection before the change.
    pub before_selection: Selector,
    /// Selection after the change.
    pub after_selection: Selector,
}

impl UndoStep {
    /// A single pure insertion, the only shape that coalesces.
    fn single_insert(&self) -> Option<&TextEdit> {
        match self.text_edits.as_slice() {
            [edit] if edit.is_pure_insert() => Some(edit),
            _ => None,
        }
    }

    /// Whether `next` types right after this step's insertion.
    fn continues_with(&self, next: &UndoStep) -> bool {
        match (self.single_insert(), next.single_insert()) {
            (Some(prev), Some(next)) => next.start_before == prev.start_after + prev.inserted_len(),
            _ => false,
        }
    }

    fn absorb(&mut self, next: UndoStep) {
        if let (Some(edit), Some(more)) = (self.text_edits.first_mut(), next.text_edits.first()) {
            edit.inserted_text.push_str(&more.inserted_text);
        }
        self.span_edits.extend(next.span_edits);
        self.after_selection = next.after_selection;
    }
}

/// Linear undo/redo history with coalescing and a clean point.
#[derive(Debug)]
pub struct UndoRedoManager {
    undo_stack: Vec<UndoStep>,
    redo_stack: Vec<UndoStep>,
    max_undo: usize,
    /// Undo depth at the last save. Sits above the current depth while the save is redoable and
    /// becomes `None` once it can no longer be reached.
    clean_index: Option<usize>,
    next_group_id: usize,
    open_group_id: Option<usize>,
}

impl UndoRedoManager {
    /// Empty history keeping at most `max_undo` steps.
    pub fn new(max_undo: usize) -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            max_undo: max_undo.max(1),
            clean_index: Some(0),
            next_group_id: 0,
            open_group_id: None,
        }
    }

    /// Whether a step can be undone.
    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    /// Whether a step can be redone.
    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Number of undoable steps.
    pub fn undo_depth(&self) -> usize {
        self.undo_stack.len()
    }

    /// Number of redoable steps.
    pub fn redo_depth(&self) -> usize {
        self.redo_stack.len()
    }

    /// Group still accepting typed input, if any.
    pub fn current_group_id(&self) -> Option<usize> {
        self.open_group_id
    }

    /// Whether the history sits at the clean point.
    pub fn is_clean(&self) -> bool {
        self.clean_index == Some(self.undo_stack.len())
    }

    /// Mark the current position as clean (e.g. after saving).
    pub fn mark_clean(&mut self) {
        self.clean_index = Some(self.undo_stack.len());
        self.end_group();
    }

    /// Close the open typing group.
    pub fn end_group(&mut self) {
        self.open_group_id = None;
    }

    /// Drop all history.
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
        self.clean_index = Some(0);
        self.open_group_id = None;
    }

    fn clear_redo_and_adjust_clean(&mut self) {
        if self.redo_stack.is_empty() {
            return;
        }

        // A clean point in the redo area is unreachable once redo is gone.
        if let Some(clean_index) = self.clean_index
            && clean_index > self.undo_stack.len()
        {
            self.clean_index = None;
        }

        self.redo_stack.clear();
    }

    /// Record a new step, returning its group id.
    ///
    /// A `coalescible` step that continues the open group's insertion is folded into it.
    pub(crate) fn push_step(&mut self, mut step: UndoStep, coalescible: bool) -> usize {
        self.clear_redo_and_adjust_clean();

        let at_clean_point = self.clean_index == Some(self.undo_stack.len());
        if coalescible
            && !at_clean_point
            && let Some(open) = self.open_group_id
            && let Some(last) = self.undo_stack.last_mut()
            && last.group_id == open
            && last.continues_with(&step)
        {
            last.absorb(step);
            return open;
        }

        if self.undo_stack.len() >= self.max_undo {
            self.undo_stack.remove(0);
            if let Some(clean_index) = self.clean_index {
                self.clean_index = clean_index.checked_sub(1);
            }
        }

        step.group_id = self.next_group_id;
        self.next_group_id = self.next_group_id.wrapping_add(1);
        self.open_group_id = coalescible.then_some(step.group_id);

        let group_id = step.group_id;
        self.undo_stack.push(step);
        group_id
    }

    pub(crate) fn peek_undo(&self) -> Option<&UndoStep> {
        self.undo_stack.last()
    }

    pub(crate) fn peek_redo(&self) -> Option<&UndoStep> {
        self.redo_stack.last()
    }

    /// Move the top undo step to the redo stack.
    pub(crate) fn commit_undo(&mut self) {
        self.end_group();
        if let Some(step) = self.undo_stack.pop() {
            self.redo_stack.push(step);
        }
    }

    /// Move the top redo step back to the undo stack.
    pub(crate) fn commit_redo(&mut self) {
        self.end_group();
        if let Some(step) = self.redo_stack.pop() {
            self.undo_stack.push(step);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn insert_step(start: usize, text: &str) -> UndoStep {
        UndoStep {
            group_id: 0,
            record_type: RecordType::Insert,
            reason: TextChangeReason::Input,
            span_edits: Vec::new(),
            text_edits: vec![TextEdit {
                start_before: start,
                start_after: start,
                deleted_text: String::new(),
                inserted_text: text.to_string(),
            }],
            before_selection: Selector::with_caret(start),
            after_selection: Selector::with_caret(start + text.chars().count()),
        }
    }

    #[test]
    fn test_contiguous_typing_coalesces() {
        let mut undo = UndoRedoManager::new(100);
        let g0 = undo.push_step(insert_step(0, "a"), true);
        let g1 = undo.push_step(insert_step(1, "b"), true);
        assert_eq!(g0, g1);
        assert_eq!(undo.undo_depth(), 1);
        let step = undo.peek_undo().unwrap();
        assert_eq!(step.text_edits[0].inserted_text, "ab");
        assert_eq!(step.after_selection.caret(), 2);
    }

    #[test]
    fn test_non_contiguous_typing_starts_new_step() {
        let mut undo = UndoRedoManager::new(100);
        undo.push_step(insert_step(0, "a"), true);
        undo.push_step(insert_step(5, "b"), true);
        assert_eq!(undo.undo_depth(), 2);
    }

    #[test]
    fn test_end_group_stops_coalescing() {
        let mut undo = UndoRedoManager::new(100);
        undo.push_step(insert_step(0, "a"), true);
        undo.end_group();
        undo.push_step(insert_step(1, "b"), true);
        assert_eq!(undo.undo_depth(), 2);
    }

    #[test]
    fn test_max_undo_drops_oldest() {
        let mut undo = UndoRedoManager::new(2);
        undo.push_step(insert_step(0, "a"), false);
        undo.push_step(insert_step(1, "b"), false);
        undo.push_step(insert_step(2, "c"), false);
        assert_eq!(undo.undo_depth(), 2);
        assert!(!undo.is_clean());
    }

    #[test]
    fn test_clean_point_follows_undo_and_redo() {
        let mut undo = UndoRedoManager::new(10);
        undo.push_step(insert_step(0, "a"), false);
        undo.mark_clean();
        undo.push_step(insert_step(1, "b"), false);
        assert!(!undo.is_clean());
        undo.commit_undo();
        assert!(undo.is_clean());
        undo.commit_redo();
        assert!(!undo.is_clean());
    }

    #[test]
    fn test_new_step_clears_redo() {
        let mut undo = UndoRedoManager::new(10);
        undo.push_step(insert_step(0, "a"), false);
        undo.commit_undo();
        assert!(undo.can_redo());
        undo.push_step(insert_step(0, "z"), false);
        assert!(!undo.can_redo());
    }

    #[test]
    fn test_span_edit_diff_finds_window() {
        use crate::span::{SpanData, SpanId};
        use crate::style::TextStyle;
        let span = |id: u64, text: &str| Span {
            id: SpanId(id),
            range: 0..text.chars().count(),
            data: SpanData::text(text, TextStyle::new()),
        };
        let old = vec![span(0, "a"), span(1, "b"), span(2, "c")];
        let new = vec![span(0, "a"), span(1, "bx"), span(2, "c")];
        let edit = SpanEdit::diff(&old, &new).unwrap();
        assert_eq!(edit.index, 1);
        assert_eq!(edit.removed.len(), 1);
        assert_eq!(edit.inserted[0].text(), Some("bx"));
        assert!(SpanEdit::diff(&old, &old).is_none());
    }
}
