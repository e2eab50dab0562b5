#![warn(missing_docs)]
//! Rich Editor Core - Headless Rich Text Editing Engine
//!
//! # Overview
//!
//! `rich-editor-core` models the editing state of a rich text component without rendering or
//! measuring anything. A layout layer consumes its span list; a host wires its callbacks to the
//! platform's input, clipboard and drag sources.
//!
//! # Core Features
//!
//! - **Span Document**: ordered sibling spans (text, image, symbol, builder placeholder) with a
//!   rope mirror for O(log n) offset queries
//! - **Selection**: anchor/destination selector with grapheme- and word-aware caret movement
//! - **Change Notifications**: cancelable Will handlers and Did handlers around every content change
//! - **IME Preview**: composition text shown in place and committed or cancelled as one unit
//! - **Drag/Drop and Clipboard**: span-preserving transfer inside and between editors
//! - **Undo/Redo**: span-exact steps with typing coalescing and a clean point
//! - **Auto-Scroll**: edge detection while dragging, plus scroll callbacks
//! - **State Tracking**: version number mechanism and change notifications
//!
//! # Architecture Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │  Command Interface & State Management       │  ← Public API
//! ├─────────────────────────────────────────────┤
//! │  IME Preview · Drag/Drop · Clipboard        │  ← Input Sources
//! ├─────────────────────────────────────────────┤
//! │  Mutation Engine + Will/Did Pipeline + Undo │  ← Transactions
//! ├─────────────────────────────────────────────┤
//! │  Selector (caret, selection)                │  ← Cursor State
//! ├─────────────────────────────────────────────┤
//! │  Span Document (spans + rope mirror)        │  ← Content Storage
//! └─────────────────────────────────────────────┘
//!          Auto-Scroll (geometry only) ─┘
//! ```
//!
//! # Quick Start
//!
//! ## Using the Editor Directly
//!
//! ```rust
//! use rich_editor_core::{RichEditor, TextSpanOptions};
//!
//! let mut editor = RichEditor::new();
//! editor.add_text_span(TextSpanOptions::new("Hello"));
//! editor.events_mut().set_on_will_change(|change| !change.replacement_text().contains('#'));
//!
//! editor.insert_value(", World");
//! editor.insert_value("#");
//! assert_eq!(editor.text_content(), "Hello, World");
//! ```
//!
//! ## Using the Command Interface
//!
//! ```rust
//! use rich_editor_core::{Command, CommandExecutor, CursorCommand, EditCommand};
//!
//! let mut executor = CommandExecutor::new();
//! executor.execute_batch(vec![
//!     Command::Edit(EditCommand::InsertValue { text: "abc".into() }),
//!     Command::Cursor(CursorCommand::SetCaret { offset: 1 }),
//!     Command::Edit(EditCommand::DeleteBackward { length: 1 }),
//! ]).unwrap();
//!
//! assert_eq!(executor.editor().text_content(), "bc");
//! ```
//!
//! # Module Description
//!
//! - [`span`] / [`style`] - span model and style attribute sets
//! - [`document`] - sibling span storage and range queries
//! - [`selector`] - caret and selection
//! - [`editor`] - the [`RichEditor`] aggregate, queries and caret API
//! - [`mutation`] - content operations, the change pipeline and undo/redo replay
//! - [`preview`], [`drag`], [`clipboard`] - input sources built on the mutation engine
//! - [`autoscroll`] - drag auto-scroll and scroll callbacks
//! - [`commands`] - Unified command interface
//! - [`state`] - State management and query interface
//!
//! # Offsets
//!
//! Offsets count `char`s. Every non-text span occupies one offset and appears as U+FFFC in text
//! queries. Grapheme clusters are never split by caret movement or deletion.

pub mod autoscroll;
pub mod change;
pub mod clipboard;
pub mod commands;
pub mod config;
pub mod delta;
pub mod document;
pub mod drag;
pub mod editor;
pub mod error;
pub mod events;
pub mod mutation;
pub mod preview;
pub mod results;
pub mod selector;
pub mod span;
pub mod state;
pub mod style;
mod text;
pub mod undo;

pub use autoscroll::{AutoScroller, ScrollSource, ScrollState};
pub use change::{ChangeValue, TextChangeReason};
pub use clipboard::{Clipboard, ClipboardData, InMemoryClipboard};
pub use commands::{
    ClipboardCommand, Command, CommandExecutor, CommandResult, CursorCommand, EditCommand,
    ImeCommand, StyleCommand,
};
pub use config::{AutoScrollConfig, EditorConfig};
pub use delta::{TextDelta, TextDeltaEdit};
pub use document::SpanDocument;
pub use drag::{DragPayload, DragStatus};
pub use editor::{CaretMoveIntent, EditOutcome, RichEditor};
pub use error::EditorError;
pub use events::{
    ClipboardEvent, DeleteDirection, DeleteValueInfo, DragStartInfo, EventHub, EventKind,
    InsertValueInfo,
};
pub use mutation::{ImageSpanOptions, PlaceholderSpanOptions, SymbolSpanOptions, TextSpanOptions};
pub use preview::PreviewTextRecord;
pub use results::{
    ImageSpanResult, ParagraphResult, PlaceholderSpanResult, SelectionInfo, SpanPosition,
    SpanResult, SymbolSpanResult, TextSpanResult,
};
pub use selector::{Selector, TextRange};
pub use span::{
    ImageSource, OBJECT_REPLACEMENT_CHAR, PlaceholderOptions, Span, SpanContent, SpanData, SpanId,
    SpanKind, SymbolSource,
};
pub use state::{
    DocumentState, EditorState, EditorStateManager, PreviewState, SelectionState, StateChange,
    StateChangeCallback, StateChangeType, UndoRedoState,
};
pub use style::{ImageStyle, ParagraphStyle, TextAttr, TextStyle};
pub use undo::{RecordType, TextEdit, UndoRedoManager};
