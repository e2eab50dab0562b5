//! Structured text change deltas.
//!
//! Every committed content change is also published as a [`TextDelta`]: the plain-text edits that
//! turn the document's text before the change into the text after it, in **character offsets**.
//! Non-text spans appear as U+FFFC.
//!
//! Consumers that mirror the text (search indexes, spell checkers, accessibility text) can apply
//! the delta instead of re-reading the whole document.

use serde::{Deserialize, Serialize};

use crate::undo::TextEdit;

/// One replacement in the plain text.
///
/// `start` is measured in the text as it stands when this edit is applied, after every earlier
/// edit of the same delta. The replaced run is `deleted_text.chars().count()` long.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextDeltaEdit {
    /// Offset where the replacement begins.
    pub start: usize,
    /// Text removed, empty for a pure insertion.
    pub deleted_text: String,
    /// Text added, empty for a pure deletion.
    pub inserted_text: String,
}

impl TextDeltaEdit {
    /// Removed length in offsets.
    pub fn deleted_len(&self) -> usize {
        self.deleted_text.chars().count()
    }

    /// Added length in offsets.
    pub fn inserted_len(&self) -> usize {
        self.inserted_text.chars().count()
    }

    /// End of the removed run.
    pub fn end(&self) -> usize {
        self.start.saturating_add(self.deleted_len())
    }
}

/// Plain-text view of one committed change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextDelta {
    /// Document length before the change.
    pub before_char_count: usize,
    /// Document length after the change.
    pub after_char_count: usize,
    /// Replacements, applied first to last.
    pub edits: Vec<TextDeltaEdit>,
    /// Undo group the change was recorded in, if it was recorded.
    pub undo_group_id: Option<usize>,
}

impl TextDelta {
    /// Build a delta from simultaneous edits sorted by `start_before`.
    ///
    /// Applying them one after another in ascending order puts each edit at its post-edit start.
    pub(crate) fn from_edits(before_char_count: usize, edits: &[TextEdit], undo_group_id: Option<usize>) -> Self {
        let mut after_char_count = before_char_count;
        let edits = edits
            .iter()
            .map(|edit| {
                after_char_count = after_char_count + edit.inserted_len() - edit.deleted_len();
                TextDeltaEdit {
                    start: edit.start_after,
                    deleted_text: edit.deleted_text.clone(),
                    inserted_text: edit.inserted_text.clone(),
                }
            })
            .collect();
        Self {
            before_char_count,
            after_char_count,
            edits,
            undo_group_id,
        }
    }

    /// Whether the delta carries no replacement.
    pub fn is_empty(&self) -> bool {
        self.edits.is_empty()
    }

    /// Apply the delta to `text`, returning the new text.
    pub fn apply_to(&self, text: &str) -> String {
        let mut chars: Vec<char> = text.chars().collect();
        for edit in &self.edits {
            let start = edit.start.min(chars.len());
            let end = edit.end().min(chars.len());
            chars.splice(start..end, edit.inserted_text.chars());
        }
        chars.into_iter().collect()
    }
}
