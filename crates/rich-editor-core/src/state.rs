//! Versioned editor state for hosts
//!
//! Structured, immutable snapshots of the editor for rendering and host synchronization.
//!
//! # Overview
//!
//! [`EditorStateManager`] wraps a [`CommandExecutor`] and adds:
//!
//! - **State Queries**: document, selection, undo/redo, preview and scroll snapshots
//! - **Version Tracking**: a version number bumped on every observable change
//! - **Change Notifications**: subscribers receive a [`StateChange`] per bump
//!
//! # Example
//!
//! ```rust
//! use rich_editor_core::{
//!     Command, EditCommand, EditorStateManager, StateChangeType, TextSpanOptions,
//! };
//! use std::sync::{Arc, Mutex};
//!
//! let mut manager = EditorStateManager::new();
//! let seen = Arc::new(Mutex::new(Vec::new()));
//! let sink = seen.clone();
//! manager.subscribe(move |change| sink.lock().unwrap().push(change.change_type));
//!
//! manager
//!     .execute(Command::Edit(EditCommand::AddTextSpan(TextSpanOptions::new("hi"))))
//!     .unwrap();
//!
//! let doc = manager.get_document_state();
//! assert_eq!(doc.char_count, 2);
//! assert!(doc.is_modified);
//! assert_eq!(doc.version, 1);
//! assert_eq!(*seen.lock().unwrap(), vec![StateChangeType::DocumentModified]);
//! ```

use std::ops::Range;
use std::sync::Arc;

use tracing::trace;

use crate::autoscroll::{ScrollSource, ScrollState};
use crate::commands::{
    ClipboardCommand, Command, CommandExecutor, CommandResult, CursorCommand, EditCommand,
    ImeCommand,
};
use crate::config::EditorConfig;
use crate::delta::TextDelta;
use crate::editor::RichEditor;
use crate::error::EditorError;
use crate::selector::TextRange;

/// Document state
#[derive(Debug, Clone)]
pub struct DocumentState {
    /// Total character count (non-text spans count one each)
    pub char_count: usize,
    /// Number of sibling spans
    pub span_count: usize,
    /// Number of lines in the text mirror, including an empty last line after a trailing newline
    pub paragraph_count: usize,
    /// Whether document has been modified since the last save
    pub is_modified: bool,
    /// Version the snapshot was taken at
    pub version: u64,
}

/// Selection state
#[derive(Debug, Clone)]
pub struct SelectionState {
    /// Caret offset
    pub caret: usize,
    /// Selected range, empty at the caret when nothing is selected
    pub selection: TextRange,
    /// Whether a non-empty range is selected
    pub has_selection: bool,
    /// Anchor of the selection, `-1` without one
    pub base_offset: i64,
    /// Moving end of the selection, `-1` without one
    pub destination_offset: i64,
    /// Whether the caret is at the end of the range
    pub forward: bool,
}

/// Undo/redo stack state
#[derive(Debug, Clone)]
pub struct UndoRedoState {
    /// Can undo
    pub can_undo: bool,
    /// Can redo
    pub can_redo: bool,
    /// Undo stack depth
    pub undo_depth: usize,
    /// Redo stack depth
    pub redo_depth: usize,
    /// Current open change group ID (for typing coalescing)
    pub current_change_group: Option<usize>,
    /// Whether the document is at the saved point
    pub is_clean: bool,
}

/// IME preview state
#[derive(Debug, Clone)]
pub struct PreviewState {
    /// Whether a preview is shown
    pub active: bool,
    /// Range the preview occupies
    pub range: Option<TextRange>,
    /// Preview text
    pub content: String,
}

/// Every snapshot at one version
#[derive(Debug, Clone)]
pub struct EditorState {
    /// Document state
    pub document: DocumentState,
    /// Selection state
    pub selection: SelectionState,
    /// Undo/redo state
    pub undo_redo: UndoRedoState,
    /// Preview state
    pub preview: PreviewState,
    /// Scroll state
    pub scroll: ScrollState,
}

/// State change type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StateChangeType {
    /// Content changed
    DocumentModified,
    /// Caret or selection changed
    SelectionChanged,
    /// Span or paragraph style changed
    StyleChanged,
    /// IME preview shown, changed or removed
    PreviewChanged,
    /// Scroll offset changed
    ScrollChanged,
}

/// State change record
#[derive(Debug, Clone)]
pub struct StateChange {
    /// Change type
    pub change_type: StateChangeType,
    /// Version before the change
    pub old_version: u64,
    /// Version after the change
    pub new_version: u64,
    /// Affected region (character offset range, after the change)
    pub affected_region: Option<Range<usize>>,
    /// Structured text delta for content changes (if available).
    pub text_delta: Option<Arc<TextDelta>>,
}

impl StateChange {
    /// Change record with no region or delta attached.
    pub fn new(change_type: StateChangeType, old_version: u64, new_version: u64) -> Self {
        Self {
            change_type,
            old_version,
            new_version,
            affected_region: None,
            text_delta: None,
        }
    }

    /// Attach the range of offsets the change touched.
    pub fn with_region(mut self, region: Range<usize>) -> Self {
        self.affected_region = Some(region);
        self
    }

    /// Attach the plain-text delta of the change.
    pub fn with_text_delta(mut self, delta: Arc<TextDelta>) -> Self {
        self.text_delta = Some(delta);
        self
    }
}

/// Subscriber invoked once per version bump
pub type StateChangeCallback = Box<dyn FnMut(&StateChange) + Send>;

/// Editor state manager
///
/// Commands go through [`execute()`](EditorStateManager::execute), which detects whether the
/// command had an observable effect, bumps the version and notifies subscribers. Hosts that
/// change the editor through [`editor_mut()`](EditorStateManager::editor_mut) call
/// [`mark_modified()`](EditorStateManager::mark_modified) afterwards.
pub struct EditorStateManager {
    /// Command executor
    executor: CommandExecutor,
    /// Bumped on every published change
    state_version: u64,
    /// Unsaved changes flag
    is_modified: bool,
    /// Subscribers
    callbacks: Vec<StateChangeCallback>,
    /// Structured text delta produced by the last content change.
    last_text_delta: Option<Arc<TextDelta>>,
}

impl std::fmt::Debug for EditorStateManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EditorStateManager")
            .field("executor", &self.executor)
            .field("state_version", &self.state_version)
            .field("is_modified", &self.is_modified)
            .field("callbacks", &self.callbacks.len())
            .finish_non_exhaustive()
    }
}

impl Default for EditorStateManager {
    fn default() -> Self {
        Self::new()
    }
}

impl EditorStateManager {
    /// Create a new state manager over an empty editor
    pub fn new() -> Self {
        Self::from_executor(CommandExecutor::new())
    }

    /// Create a state manager over an empty editor with `config`
    pub fn with_config(config: EditorConfig) -> Self {
        Self::from_executor(CommandExecutor::with_config(config))
    }

    /// Wrap an existing executor
    pub fn from_executor(executor: CommandExecutor) -> Self {
        Self {
            executor,
            state_version: 0,
            is_modified: false,
            callbacks: Vec::new(),
            last_text_delta: None,
        }
    }

    /// The editor
    pub fn editor(&self) -> &RichEditor {
        self.executor.editor()
    }

    /// Mutable editor access; call [`mark_modified`](Self::mark_modified) after changing it.
    pub fn editor_mut(&mut self) -> &mut RichEditor {
        self.executor.editor_mut()
    }

    /// The wrapped executor
    pub fn executor(&self) -> &CommandExecutor {
        &self.executor
    }

    /// Execute a command and publish its effect.
    pub fn execute(&mut self, command: Command) -> Result<CommandResult, EditorError> {
        let change_type = Self::change_type_for_command(&command);

        // No-op commands must not bump the version.
        let selector_before = self.executor.editor().selector().clone();
        let preview_before = self.executor.editor().preview_record().clone();

        let result = self.executor.execute(command)?;
        let delta_present = self.executor.last_text_delta().is_some();

        let Some(change_type) = change_type else {
            return Ok(result);
        };
        let changed = match change_type {
            StateChangeType::DocumentModified => delta_present,
            StateChangeType::SelectionChanged => *self.executor.editor().selector() != selector_before,
            StateChangeType::StyleChanged => {
                matches!(result, CommandResult::Success | CommandResult::Bool(true))
            }
            StateChangeType::PreviewChanged => {
                delta_present || *self.executor.editor().preview_record() != preview_before
            }
            StateChangeType::ScrollChanged => false,
        };
        if !changed {
            trace!(target: "rich_editor.state", ?change_type, "no_op");
            return Ok(result);
        }

        if delta_present {
            let is_modified = !self.executor.is_clean();
            let delta = self.executor.take_last_text_delta().map(Arc::new);
            self.last_text_delta = delta.clone();
            if change_type == StateChangeType::DocumentModified {
                self.mark_modified_internal(change_type, Some(is_modified), delta);
            } else {
                // Preview text is unrecorded content.
                self.is_modified = is_modified || self.executor.editor().is_previewing();
                self.mark_modified_internal(change_type, None, delta);
            }
        } else {
            self.mark_modified_internal(change_type, None, None);
        }
        Ok(result)
    }

    fn change_type_for_command(command: &Command) -> Option<StateChangeType> {
        match command {
            Command::Edit(EditCommand::InsertValue { text }) if text.is_empty() => None,
            Command::Edit(EditCommand::DeleteBackward { length: 0 })
            | Command::Edit(EditCommand::DeleteForward { length: 0 }) => None,
            Command::Edit(_) => Some(StateChangeType::DocumentModified),
            Command::Cursor(_) => Some(StateChangeType::SelectionChanged),
            Command::Style(_) => Some(StateChangeType::StyleChanged),
            Command::Ime(_) => Some(StateChangeType::PreviewChanged),
            Command::Clipboard(ClipboardCommand::Copy) => None,
            Command::Clipboard(ClipboardCommand::Cut | ClipboardCommand::Paste) => {
                Some(StateChangeType::DocumentModified)
            }
        }
    }

    /// Current version.
    pub fn version(&self) -> u64 {
        self.state_version
    }

    /// Every snapshot at once.
    pub fn get_full_state(&self) -> EditorState {
        EditorState {
            document: self.get_document_state(),
            selection: self.get_selection_state(),
            undo_redo: self.get_undo_redo_state(),
            preview: self.get_preview_state(),
            scroll: self.get_scroll_state(),
        }
    }

    /// Content counters and the modified flag.
    pub fn get_document_state(&self) -> DocumentState {
        let editor = self.executor.editor();
        DocumentState {
            char_count: editor.len(),
            span_count: editor.span_count(),
            paragraph_count: editor.document().rope().len_lines(),
            is_modified: self.is_modified,
            version: self.state_version,
        }
    }

    /// Caret and selection.
    pub fn get_selection_state(&self) -> SelectionState {
        let editor = self.executor.editor();
        let selector = editor.selector();
        SelectionState {
            caret: editor.caret_offset(),
            selection: editor.selection(),
            has_selection: selector.range().is_some(),
            base_offset: selector.base_offset(),
            destination_offset: selector.destination_offset(),
            forward: selector.is_forward(),
        }
    }

    /// History depths and the clean point.
    pub fn get_undo_redo_state(&self) -> UndoRedoState {
        UndoRedoState {
            can_undo: self.executor.can_undo(),
            can_redo: self.executor.can_redo(),
            undo_depth: self.executor.undo_depth(),
            redo_depth: self.executor.redo_depth(),
            current_change_group: self.executor.current_change_group(),
            is_clean: self.executor.is_clean(),
        }
    }

    /// Active IME composition, if any.
    pub fn get_preview_state(&self) -> PreviewState {
        let record = self.executor.editor().preview_record();
        PreviewState {
            active: record.is_active(),
            range: record.range(),
            content: record.preview_content.clone(),
        }
    }

    /// Auto-scroll position and status.
    pub fn get_scroll_state(&self) -> ScrollState {
        self.executor.editor().scroller().state()
    }

    /// Forward a scroll callback to the auto-scroller; publishes `ScrollChanged` when the text
    /// moved.
    pub fn scroll_by(&mut self, offset: f32, source: ScrollSource) -> bool {
        let before = self.get_scroll_state().scroll_offset;
        let accepted = self
            .executor
            .editor_mut()
            .scroller_mut()
            .on_scroll_callback(offset, source);
        if self.get_scroll_state().scroll_offset != before {
            self.mark_modified(StateChangeType::ScrollChanged);
        }
        accepted
    }

    /// Run one auto-scroll step; publishes `ScrollChanged` when the text moved.
    pub fn auto_scroll_tick(&mut self) -> f32 {
        let moved = self.executor.editor_mut().scroller_mut().on_auto_scroll_tick();
        if moved != 0.0 {
            self.mark_modified(StateChangeType::ScrollChanged);
        }
        moved
    }

    /// Register a subscriber for [`StateChange`] records.
    pub fn subscribe<F>(&mut self, callback: F)
    where
        F: FnMut(&StateChange) + Send + 'static,
    {
        self.callbacks.push(Box::new(callback));
    }

    /// Whether anything was published after `version`.
    pub fn has_changed_since(&self, version: u64) -> bool {
        self.state_version > version
    }

    /// Mark a change made outside `execute` and increment the version number
    pub fn mark_modified(&mut self, change_type: StateChangeType) {
        self.mark_modified_internal(change_type, None, None);
    }

    fn mark_modified_internal(
        &mut self,
        change_type: StateChangeType,
        is_modified_override: Option<bool>,
        delta: Option<Arc<TextDelta>>,
    ) {
        let old_version = self.state_version;
        self.state_version += 1;

        if change_type == StateChangeType::DocumentModified {
            self.is_modified = is_modified_override.unwrap_or(true);
        }

        let mut change = StateChange::new(change_type, old_version, self.state_version);
        if let Some(region) = delta.as_deref().and_then(affected_region) {
            change = change.with_region(region);
        }
        if let Some(delta) = delta {
            change = change.with_text_delta(delta);
        }
        trace!(
            target: "rich_editor.state",
            ?change_type,
            version = self.state_version,
            "state_changed"
        );
        self.notify_callbacks(&change);
    }

    /// Record a save: the current history position becomes the clean point.
    pub fn mark_saved(&mut self) {
        self.executor.mark_clean();
        self.is_modified = false;
    }

    /// Get the structured text delta produced by the last content change, if any.
    pub fn last_text_delta(&self) -> Option<&TextDelta> {
        self.last_text_delta.as_deref()
    }

    /// Take the structured text delta produced by the last content change, if any.
    pub fn take_last_text_delta(&mut self) -> Option<Arc<TextDelta>> {
        self.last_text_delta.take()
    }

    /// Fan a change out to every subscriber.
    fn notify_callbacks(&mut self, change: &StateChange) {
        for callback in &mut self.callbacks {
            callback(change);
        }
    }
}

/// Post-change span covering every edit of `delta`.
fn affected_region(delta: &TextDelta) -> Option<Range<usize>> {
    let start = delta.edits.iter().map(|e| e.start).min()?;
    let end = delta
        .edits
        .iter()
        .map(|e| e.start + e.inserted_len())
        .max()?;
    Some(start..end)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::StyleCommand;
    use crate::mutation::TextSpanOptions;
    use crate::style::{TextAttr, TextStyle};
    use std::sync::Mutex;

    fn manager_with(text: &str) -> EditorStateManager {
        let mut manager = EditorStateManager::new();
        manager
            .execute(Command::Edit(EditCommand::AddTextSpan(TextSpanOptions::new(
                text,
            ))))
            .unwrap();
        manager
    }

    fn record(manager: &mut EditorStateManager) -> Arc<Mutex<Vec<StateChange>>> {
        let changes = Arc::new(Mutex::new(Vec::new()));
        let sink = changes.clone();
        manager.subscribe(move |c| sink.lock().unwrap().push(c.clone()));
        changes
    }

    #[test]
    fn test_document_state() {
        let manager = manager_with("Hello\nWorld");
        let doc = manager.get_document_state();
        assert_eq!(doc.char_count, 11);
        assert_eq!(doc.paragraph_count, 2);
        assert!(doc.is_modified);
        assert_eq!(doc.version, 1);
    }

    #[test]
    fn test_noop_cursor_command_keeps_version() {
        let mut manager = manager_with("abc");
        let version = manager.version();
        manager
            .execute(Command::Cursor(CursorCommand::SetCaret { offset: 3 }))
            .unwrap();
        assert!(!manager.has_changed_since(version));
        manager
            .execute(Command::Cursor(CursorCommand::SetCaret { offset: 1 }))
            .unwrap();
        assert!(manager.has_changed_since(version));
        assert_eq!(manager.get_selection_state().caret, 1);
    }

    #[test]
    fn test_insert_reports_region_and_delta() {
        let mut manager = manager_with("abc");
        let changes = record(&mut manager);
        manager
            .execute(Command::Edit(EditCommand::InsertValue { text: "XY".into() }))
            .unwrap();

        let changes = changes.lock().unwrap();
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].change_type, StateChangeType::DocumentModified);
        assert_eq!(changes[0].affected_region, Some(3..5));
        assert!(changes[0].text_delta.is_some());
        assert_eq!(manager.last_text_delta().map(|d| d.after_char_count), Some(5));
    }

    #[test]
    fn test_vetoed_edit_publishes_nothing() {
        let mut manager = manager_with("abc");
        manager.editor_mut().events_mut().set_on_will_change(|_| false);
        let version = manager.version();
        manager
            .execute(Command::Edit(EditCommand::DeleteBackward { length: 1 }))
            .unwrap();
        assert_eq!(manager.version(), version);
    }

    #[test]
    fn test_mark_saved_then_undo_is_modified() {
        let mut manager = manager_with("abc");
        manager.mark_saved();
        assert!(!manager.get_document_state().is_modified);
        assert!(manager.get_undo_redo_state().is_clean);

        manager.execute(Command::Edit(EditCommand::Undo)).unwrap();
        assert!(manager.get_document_state().is_modified);
        manager.execute(Command::Edit(EditCommand::Redo)).unwrap();
        assert!(!manager.get_document_state().is_modified);
    }

    #[test]
    fn test_style_change() {
        let mut manager = manager_with("abc");
        let changes = record(&mut manager);
        manager
            .execute(Command::Style(StyleCommand::UpdateSpanStyle {
                start: 0,
                end: 2,
                text_style: Some(TextStyle::new().with(TextAttr::FontWeight(700))),
                image_style: None,
            }))
            .unwrap();
        let changes = changes.lock().unwrap();
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].change_type, StateChangeType::StyleChanged);
        assert!(changes[0].text_delta.is_none());
    }

    #[test]
    fn test_preview_changes() {
        let mut manager = manager_with("ab");
        let changes = record(&mut manager);
        manager
            .execute(Command::Ime(ImeCommand::SetPreviewText {
                value: "ni".into(),
                start: -1,
                end: -1,
            }))
            .unwrap();
        let preview = manager.get_preview_state();
        assert!(preview.active);
        assert_eq!(preview.range, Some(TextRange::new(2, 4)));

        manager
            .execute(Command::Ime(ImeCommand::FinishTextPreview))
            .unwrap();
        assert!(!manager.get_preview_state().active);
        let kinds: Vec<_> = changes.lock().unwrap().iter().map(|c| c.change_type).collect();
        assert_eq!(
            kinds,
            vec![StateChangeType::PreviewChanged, StateChangeType::PreviewChanged]
        );
    }

    #[test]
    fn test_scroll_without_overflow_is_silent() {
        let mut manager = manager_with("abc");
        let version = manager.version();
        manager.scroll_by(-10.0, ScrollSource::Update);
        assert_eq!(manager.auto_scroll_tick(), 0.0);
        assert_eq!(manager.version(), version);
    }
}
