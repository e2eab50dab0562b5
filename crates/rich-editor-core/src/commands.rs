//! Command interface.
//!
//! Every editor operation can be expressed as a [`Command`] value and run through a
//! [`CommandExecutor`]. Hosts that drive the editor from a message loop or a script use this
//! layer; hosts that hold a [`RichEditor`] directly can call its methods instead.
//!
//! Command families:
//!
//! - [`EditCommand`]: content changes and undo/redo
//! - [`CursorCommand`]: caret and selection
//! - [`StyleCommand`]: span and paragraph styles
//! - [`ImeCommand`]: composition preview
//! - [`ClipboardCommand`]: copy, cut and paste
//!
//! # Example
//!
//! ```rust
//! use rich_editor_core::{
//!     Command, CommandExecutor, CommandResult, CursorCommand, EditCommand, TextSpanOptions,
//! };
//!
//! let mut executor = CommandExecutor::new();
//! executor
//!     .execute(Command::Edit(EditCommand::AddTextSpan(TextSpanOptions::new("hello"))))
//!     .unwrap();
//! executor
//!     .execute(Command::Cursor(CursorCommand::SetCaret { offset: 5 }))
//!     .unwrap();
//! let result = executor
//!     .execute(Command::Edit(EditCommand::InsertValue { text: "!".into() }))
//!     .unwrap();
//!
//! assert!(matches!(result, CommandResult::Success));
//! assert_eq!(executor.editor().text_content(), "hello!");
//! assert_eq!(executor.last_text_delta().map(|d| d.edits.len()), Some(1));
//! ```

use tracing::debug;

use crate::config::EditorConfig;
use crate::delta::TextDelta;
use crate::editor::{CaretMoveIntent, EditOutcome, RichEditor};
use crate::error::EditorError;
use crate::mutation::{
    ImageSpanOptions, PlaceholderSpanOptions, SymbolSpanOptions, TextSpanOptions,
};
use crate::style::{ImageStyle, ParagraphStyle, TextStyle};

/// Content editing commands.
#[derive(Debug, Clone, PartialEq)]
pub enum EditCommand {
    /// Insert text over the selection, or at the caret.
    InsertValue {
        /// Text to insert.
        text: String,
    },
    /// Delete before the caret, or the selection.
    DeleteBackward {
        /// Number of characters.
        length: usize,
    },
    /// Delete after the caret, or the selection.
    DeleteForward {
        /// Number of characters.
        length: usize,
    },
    /// Delete back to the previous word boundary.
    DeleteBackwardWord,
    /// Delete forward to the next word boundary.
    DeleteForwardWord,
    /// Insert a text span.
    AddTextSpan(TextSpanOptions),
    /// Insert an image span.
    AddImageSpan(ImageSpanOptions),
    /// Insert a symbol span.
    AddSymbolSpan(SymbolSpanOptions),
    /// Insert a builder placeholder span.
    AddPlaceholderSpan(PlaceholderSpanOptions),
    /// Delete a range of content, or the whole document when `range` is `None`.
    DeleteSpans {
        /// `(start, end)` offsets; negative or out-of-range values are normalized.
        range: Option<(i64, i64)>,
    },
    /// Undo the last step.
    Undo,
    /// Redo the last undone step.
    Redo,
}

/// Caret and selection commands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CursorCommand {
    /// Collapse the selection to a caret.
    SetCaret {
        /// Target offset; clamped to the document.
        offset: i64,
    },
    /// Select a range.
    SetSelection {
        /// Start offset.
        start: i64,
        /// End offset.
        end: i64,
        /// `true` keeps the caret at `end`, `false` at `start`.
        forward: bool,
    },
    /// Select the whole document.
    SelectAll,
    /// Collapse the selection at its destination.
    ClearSelection,
    /// Move the caret.
    Move(CaretMoveIntent),
    /// Extend the selection.
    Select(CaretMoveIntent),
}

/// Style commands.
#[derive(Debug, Clone, PartialEq)]
pub enum StyleCommand {
    /// Restyle text and image spans over a range.
    UpdateSpanStyle {
        /// Start offset.
        start: i64,
        /// End offset.
        end: i64,
        /// Attributes applied to text spans.
        text_style: Option<TextStyle>,
        /// Attributes applied to image spans.
        image_style: Option<ImageStyle>,
    },
    /// Restyle every paragraph touching a range.
    UpdateParagraphStyle {
        /// Start offset.
        start: i64,
        /// End offset.
        end: i64,
        /// Attributes to apply.
        style: ParagraphStyle,
    },
    /// Style applied to subsequently typed text.
    SetTypingStyle(Option<TextStyle>),
}

/// IME composition commands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImeCommand {
    /// Show or replace the preview text.
    SetPreviewText {
        /// Composition text; empty cancels the preview.
        value: String,
        /// Range the composition replaces; `-1` means the current selection.
        start: i64,
        /// End of that range.
        end: i64,
    },
    /// Commit the preview as ordinary input.
    FinishTextPreview,
    /// Drop the preview and restore the content it replaced.
    CancelPreview,
}

/// Clipboard commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClipboardCommand {
    /// Copy the selection.
    Copy,
    /// Copy the selection, then delete it.
    Cut,
    /// Insert the clipboard content.
    Paste,
}

/// Unified command enum.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Content editing commands.
    Edit(EditCommand),
    /// Caret and selection commands.
    Cursor(CursorCommand),
    /// Style commands.
    Style(StyleCommand),
    /// IME composition commands.
    Ime(ImeCommand),
    /// Clipboard commands.
    Clipboard(ClipboardCommand),
}

/// Command execution result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandResult {
    /// The command ran and changed something.
    Success,
    /// Sibling index of a newly inserted span.
    Index(usize),
    /// A host handler refused the change.
    Vetoed,
    /// Returned text, for copy.
    Text(String),
    /// Whether anything changed, for commands with nothing else to report.
    Bool(bool),
}

impl From<EditOutcome> for CommandResult {
    fn from(outcome: EditOutcome) -> Self {
        match outcome {
            EditOutcome::Applied => CommandResult::Success,
            EditOutcome::Vetoed => CommandResult::Vetoed,
            EditOutcome::Unchanged => CommandResult::Bool(false),
        }
    }
}

/// Runs [`Command`]s against an owned [`RichEditor`].
pub struct CommandExecutor {
    /// The editor.
    editor: RichEditor,
    /// Every command passed to `execute`, in order.
    command_history: Vec<Command>,
    /// Delta of the last executed command (cleared on each `execute()` call).
    last_text_delta: Option<TextDelta>,
}

impl std::fmt::Debug for CommandExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandExecutor")
            .field("editor", &self.editor)
            .field("commands", &self.command_history.len())
            .finish_non_exhaustive()
    }
}

impl Default for CommandExecutor {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandExecutor {
    /// Executor over an empty editor with the default configuration.
    pub fn new() -> Self {
        Self::from_editor(RichEditor::new())
    }

    /// Executor over an empty editor with `config`.
    pub fn with_config(config: EditorConfig) -> Self {
        Self::from_editor(RichEditor::with_config(config))
    }

    /// Executor over an existing editor.
    pub fn from_editor(editor: RichEditor) -> Self {
        Self {
            editor,
            command_history: Vec::new(),
            last_text_delta: None,
        }
    }

    /// Execute a command.
    pub fn execute(&mut self, command: Command) -> Result<CommandResult, EditorError> {
        self.last_text_delta = None;
        // Only the delta of this command may surface.
        self.editor.take_last_text_delta();

        self.command_history.push(command.clone());

        // Any non-edit command ends the current typing group.
        if !matches!(command, Command::Edit(_)) {
            self.editor.end_undo_group();
        }

        let result = match command {
            Command::Edit(cmd) => self.execute_edit(cmd),
            Command::Cursor(cmd) => Ok(self.execute_cursor(cmd)),
            Command::Style(cmd) => Ok(self.execute_style(cmd)),
            Command::Ime(cmd) => self.execute_ime(cmd),
            Command::Clipboard(cmd) => self.execute_clipboard(cmd),
        };
        self.last_text_delta = self.editor.take_last_text_delta();
        if let Err(err) = &result {
            debug!(target: "rich_editor.command", error = %err, "command_failed");
        }
        result
    }

    /// Execute commands in order, stopping at the first error.
    pub fn execute_batch(
        &mut self,
        commands: Vec<Command>,
    ) -> Result<Vec<CommandResult>, EditorError> {
        let mut results = Vec::with_capacity(commands.len());
        for command in commands {
            results.push(self.execute(command)?);
        }
        Ok(results)
    }

    /// Delta produced by the last `execute()` call, if it changed text.
    pub fn last_text_delta(&self) -> Option<&TextDelta> {
        self.last_text_delta.as_ref()
    }

    /// Take the delta produced by the last `execute()` call.
    pub fn take_last_text_delta(&mut self) -> Option<TextDelta> {
        self.last_text_delta.take()
    }

    /// Every command executed so far, in order.
    pub fn get_command_history(&self) -> &[Command] {
        &self.command_history
    }

    /// Can undo
    pub fn can_undo(&self) -> bool {
        self.editor.can_undo()
    }

    /// Can redo
    pub fn can_redo(&self) -> bool {
        self.editor.can_redo()
    }

    /// Undo stack depth (number of steps).
    pub fn undo_depth(&self) -> usize {
        self.editor.undo_depth()
    }

    /// Redo stack depth (number of steps).
    pub fn redo_depth(&self) -> usize {
        self.editor.redo_depth()
    }

    /// Currently open undo group ID (for typing coalescing), if any.
    pub fn current_change_group(&self) -> Option<usize> {
        self.editor.current_change_group()
    }

    /// Whether the document is at the last saved point.
    pub fn is_clean(&self) -> bool {
        self.editor.is_clean()
    }

    /// Mark the current state as saved.
    pub fn mark_clean(&mut self) {
        self.editor.mark_clean();
    }

    /// The editor.
    pub fn editor(&self) -> &RichEditor {
        &self.editor
    }

    /// Mutable access to the editor, for registering handlers and direct calls.
    pub fn editor_mut(&mut self) -> &mut RichEditor {
        &mut self.editor
    }

    fn execute_edit(&mut self, command: EditCommand) -> Result<CommandResult, EditorError> {
        let editor = &mut self.editor;
        let result = match command {
            EditCommand::InsertValue { text } => editor.insert_value(&text).into(),
            EditCommand::DeleteBackward { length } => editor.delete_backward(length).into(),
            EditCommand::DeleteForward { length } => editor.delete_forward(length).into(),
            EditCommand::DeleteBackwardWord => editor.delete_backward_word().into(),
            EditCommand::DeleteForwardWord => editor.delete_forward_word().into(),
            EditCommand::AddTextSpan(options) => index_result(editor.add_text_span(options)),
            EditCommand::AddImageSpan(options) => index_result(editor.add_image_span(options)),
            EditCommand::AddSymbolSpan(options) => index_result(editor.add_symbol_span(options)),
            EditCommand::AddPlaceholderSpan(options) => {
                index_result(editor.add_placeholder_span(options))
            }
            EditCommand::DeleteSpans { range } => editor.delete_spans(range).into(),
            EditCommand::Undo => editor.undo()?.into(),
            EditCommand::Redo => editor.redo()?.into(),
        };
        Ok(result)
    }

    fn execute_cursor(&mut self, command: CursorCommand) -> CommandResult {
        let editor = &mut self.editor;
        let changed = match command {
            CursorCommand::SetCaret { offset } => editor.set_caret_offset(offset),
            CursorCommand::SetSelection {
                start,
                end,
                forward,
            } => editor.set_selection(start, end, forward),
            CursorCommand::SelectAll => editor.select_all(),
            CursorCommand::ClearSelection => editor.clear_selection(),
            CursorCommand::Move(intent) => editor.move_caret(intent),
            CursorCommand::Select(intent) => editor.handle_select(intent),
        };
        CommandResult::Bool(changed)
    }

    fn execute_style(&mut self, command: StyleCommand) -> CommandResult {
        let editor = &mut self.editor;
        match command {
            StyleCommand::UpdateSpanStyle {
                start,
                end,
                text_style,
                image_style,
            } => {
                let count =
                    editor.update_span_style(start, end, text_style.as_ref(), image_style.as_ref());
                CommandResult::Bool(count > 0)
            }
            StyleCommand::UpdateParagraphStyle { start, end, style } => {
                let count = editor.update_paragraph_style(start, end, &style);
                CommandResult::Bool(count > 0)
            }
            StyleCommand::SetTypingStyle(style) => {
                editor.set_typing_style(style);
                CommandResult::Success
            }
        }
    }

    fn execute_ime(&mut self, command: ImeCommand) -> Result<CommandResult, EditorError> {
        let editor = &mut self.editor;
        let result = match command {
            ImeCommand::SetPreviewText { value, start, end } => {
                editor.set_preview_text(&value, start, end).into()
            }
            ImeCommand::FinishTextPreview => editor.finish_text_preview()?.into(),
            ImeCommand::CancelPreview => editor.cancel_preview().into(),
        };
        Ok(result)
    }

    fn execute_clipboard(&mut self, command: ClipboardCommand) -> Result<CommandResult, EditorError> {
        let editor = &mut self.editor;
        let result = match command {
            ClipboardCommand::Copy => {
                if editor.copy()? {
                    CommandResult::Text(editor.text_in(editor.selection()))
                } else {
                    CommandResult::Bool(false)
                }
            }
            ClipboardCommand::Cut => editor.cut()?.into(),
            ClipboardCommand::Paste => editor.paste()?.into(),
        };
        Ok(result)
    }
}

fn index_result(index: Option<usize>) -> CommandResult {
    match index {
        Some(index) => CommandResult::Index(index),
        None => CommandResult::Bool(false),
    }
}
