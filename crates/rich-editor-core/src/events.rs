//! Event hub: the typed dispatch table for editor callbacks.
//!
//! # Overview
//!
//! Hosts register at most one handler per [`EventKind`]. Handlers receive value snapshots and have
//! no access to the editor while they run.
//!
//! Vetoing events (`WillChange`, `AboutToImeInput`, `AboutToDelete`) return `bool`. A missing
//! handler always lets the operation proceed.
//!
//! # Example
//!
//! ```rust
//! use rich_editor_core::{EventHub, EventKind};
//!
//! let mut hub = EventHub::new();
//! assert!(!hub.has(EventKind::WillChange));
//! hub.set_on_will_change(|value| value.replacement_text() != "forbidden");
//! assert!(hub.has_on_will_change());
//! hub.clear(EventKind::WillChange);
//! assert!(!hub.has_on_will_change());
//! ```

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::change::ChangeValue;
use crate::drag::DragPayload;
use crate::results::{SpanResult, TextSpanResult};
use crate::selector::TextRange;

/// Kinds of events a host can subscribe to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EventKind {
    /// Before a content change; may veto.
    WillChange,
    /// After a content change.
    DidChange,
    /// Before IME text is inserted; may veto.
    AboutToImeInput,
    /// After IME text was inserted.
    ImeInputComplete,
    /// Before a deletion; may veto.
    AboutToDelete,
    /// After a deletion.
    DeleteComplete,
    /// A non-empty selection was made.
    Select,
    /// The selection or caret range changed.
    SelectionChange,
    /// Cut requested.
    Cut,
    /// Copy requested.
    Copy,
    /// Paste requested.
    Paste,
    /// A drag starts; the handler builds the payload.
    DragStart,
}

/// Payload of [`EventKind::AboutToImeInput`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InsertValueInfo {
    /// Where the text goes.
    pub insert_offset: usize,
    /// The text.
    pub insert_value: String,
}

/// Direction of a deletion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeleteDirection {
    /// Toward the document start.
    Backward,
    /// Toward the document end.
    Forward,
}

/// Payload of [`EventKind::AboutToDelete`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeleteValueInfo {
    /// Start of the deleted range.
    pub offset: usize,
    /// Direction of the key that caused it.
    pub direction: DeleteDirection,
    /// Number of offsets deleted.
    pub length: usize,
    /// Spans covered by the deletion.
    pub spans: Vec<SpanResult>,
}

/// Payload of clipboard events. Calling [`prevent_default`](Self::prevent_default) cancels the
/// built-in behavior.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClipboardEvent {
    prevented: bool,
}

impl ClipboardEvent {
    /// Fresh event.
    pub fn new() -> Self {
        Self::default()
    }

    /// Skip the built-in clipboard behavior.
    pub fn prevent_default(&mut self) {
        self.prevented = true;
    }

    /// Whether [`prevent_default`](Self::prevent_default) was called.
    pub fn is_default_prevented(&self) -> bool {
        self.prevented
    }
}

/// Payload of [`EventKind::DragStart`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DragStartInfo {
    /// Range being dragged (collapsed when nothing is selected).
    pub range: TextRange,
    /// Plain text of that range.
    pub plain_text: String,
}

type VetoFn<T> = Box<dyn FnMut(&T) -> bool + Send>;
type NotifyFn<T> = Box<dyn FnMut(&T) + Send>;

enum Handler {
    WillChange(VetoFn<ChangeValue>),
    DidChange(NotifyFn<ChangeValue>),
    AboutToImeInput(VetoFn<InsertValueInfo>),
    ImeInputComplete(NotifyFn<TextSpanResult>),
    AboutToDelete(VetoFn<DeleteValueInfo>),
    DeleteComplete(Box<dyn FnMut() + Send>),
    Range(Box<dyn FnMut(TextRange) + Send>),
    Clipboard(Box<dyn FnMut(&mut ClipboardEvent) + Send>),
    DragStart(Box<dyn FnMut(&DragStartInfo) -> DragPayload + Send>),
}

/// Enum-keyed table of event handlers.
#[derive(Default)]
pub struct EventHub {
    handlers: HashMap<EventKind, Handler>,
}

impl fmt::Debug for EventHub {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut kinds: Vec<_> = self.handlers.keys().copied().collect();
        kinds.sort();
        f.debug_struct("EventHub").field("registered", &kinds).finish()
    }
}

impl EventHub {
    /// Hub with no handlers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a handler is registered for `kind`.
    pub fn has(&self, kind: EventKind) -> bool {
        self.handlers.contains_key(&kind)
    }

    /// Remove the handler for `kind`.
    pub fn clear(&mut self, kind: EventKind) {
        self.handlers.remove(&kind);
    }

    /// Whether a Will change handler is registered.
    pub fn has_on_will_change(&self) -> bool {
        self.has(EventKind::WillChange)
    }

    /// Whether a Did change handler is registered.
    pub fn has_on_did_change(&self) -> bool {
        self.has(EventKind::DidChange)
    }

    /// Handler run before each content change. Returning `false` cancels the change.
    pub fn set_on_will_change(&mut self, f: impl FnMut(&ChangeValue) -> bool + Send + 'static) {
        self.handlers
            .insert(EventKind::WillChange, Handler::WillChange(Box::new(f)));
    }

    /// Handler run after each committed content change.
    pub fn set_on_did_change(&mut self, f: impl FnMut(&ChangeValue) + Send + 'static) {
        self.handlers
            .insert(EventKind::DidChange, Handler::DidChange(Box::new(f)));
    }

    /// Handler run before IME input is inserted. Returning `false` drops the input.
    pub fn set_about_to_ime_input(&mut self, f: impl FnMut(&InsertValueInfo) -> bool + Send + 'static) {
        self.handlers
            .insert(EventKind::AboutToImeInput, Handler::AboutToImeInput(Box::new(f)));
    }

    /// Handler run after IME input was inserted.
    pub fn set_on_ime_input_complete(&mut self, f: impl FnMut(&TextSpanResult) + Send + 'static) {
        self.handlers
            .insert(EventKind::ImeInputComplete, Handler::ImeInputComplete(Box::new(f)));
    }

    /// Handler run before a deletion. Returning `false` cancels it.
    pub fn set_about_to_delete(&mut self, f: impl FnMut(&DeleteValueInfo) -> bool + Send + 'static) {
        self.handlers
            .insert(EventKind::AboutToDelete, Handler::AboutToDelete(Box::new(f)));
    }

    /// Handler run after a deletion.
    pub fn set_on_delete_complete(&mut self, f: impl FnMut() + Send + 'static) {
        self.handlers
            .insert(EventKind::DeleteComplete, Handler::DeleteComplete(Box::new(f)));
    }

    /// Handler run when a non-empty selection is made.
    pub fn set_on_select(&mut self, f: impl FnMut(TextRange) + Send + 'static) {
        self.handlers
            .insert(EventKind::Select, Handler::Range(Box::new(f)));
    }

    /// Handler run when the selection (or caret) range changes.
    pub fn set_on_selection_change(&mut self, f: impl FnMut(TextRange) + Send + 'static) {
        self.handlers
            .insert(EventKind::SelectionChange, Handler::Range(Box::new(f)));
    }

    /// Handler run on cut.
    pub fn set_on_cut(&mut self, f: impl FnMut(&mut ClipboardEvent) + Send + 'static) {
        self.handlers
            .insert(EventKind::Cut, Handler::Clipboard(Box::new(f)));
    }

    /// Handler run on copy.
    pub fn set_on_copy(&mut self, f: impl FnMut(&mut ClipboardEvent) + Send + 'static) {
        self.handlers
            .insert(EventKind::Copy, Handler::Clipboard(Box::new(f)));
    }

    /// Handler run on paste.
    pub fn set_on_paste(&mut self, f: impl FnMut(&mut ClipboardEvent) + Send + 'static) {
        self.handlers
            .insert(EventKind::Paste, Handler::Clipboard(Box::new(f)));
    }

    /// Custom drag start: the handler builds the payload and the selection is left alone.
    pub fn set_on_drag_start(&mut self, f: impl FnMut(&DragStartInfo) -> DragPayload + Send + 'static) {
        self.handlers
            .insert(EventKind::DragStart, Handler::DragStart(Box::new(f)));
    }

    pub(crate) fn fire_will_change(&mut self, value: &ChangeValue) -> bool {
        match self.handlers.get_mut(&EventKind::WillChange) {
            Some(Handler::WillChange(f)) => f(value),
            _ => true,
        }
    }

    pub(crate) fn fire_did_change(&mut self, value: &ChangeValue) {
        if let Some(Handler::DidChange(f)) = self.handlers.get_mut(&EventKind::DidChange) {
            f(value);
        }
    }

    pub(crate) fn fire_about_to_ime_input(&mut self, info: &InsertValueInfo) -> bool {
        match self.handlers.get_mut(&EventKind::AboutToImeInput) {
            Some(Handler::AboutToImeInput(f)) => f(info),
            _ => true,
        }
    }

    pub(crate) fn fire_ime_input_complete(&mut self, result: &TextSpanResult) {
        if let Some(Handler::ImeInputComplete(f)) = self.handlers.get_mut(&EventKind::ImeInputComplete) {
            f(result);
        }
    }

    pub(crate) fn fire_about_to_delete(&mut self, info: &DeleteValueInfo) -> bool {
        match self.handlers.get_mut(&EventKind::AboutToDelete) {
            Some(Handler::AboutToDelete(f)) => f(info),
            _ => true,
        }
    }

    pub(crate) fn fire_delete_complete(&mut self) {
        if let Some(Handler::DeleteComplete(f)) = self.handlers.get_mut(&EventKind::DeleteComplete) {
            f();
        }
    }

    pub(crate) fn fire_range(&mut self, kind: EventKind, range: TextRange) {
        if let Some(Handler::Range(f)) = self.handlers.get_mut(&kind) {
            f(range);
        }
    }

    /// Fire a clipboard event; returns `true` if the built-in behavior should run.
    pub(crate) fn fire_clipboard(&mut self, kind: EventKind) -> bool {
        let mut event = ClipboardEvent::new();
        if let Some(Handler::Clipboard(f)) = self.handlers.get_mut(&kind) {
            f(&mut event);
        }
        !event.is_default_prevented()
    }

    pub(crate) fn fire_drag_start(&mut self, info: &DragStartInfo) -> Option<DragPayload> {
        match self.handlers.get_mut(&EventKind::DragStart) {
            Some(Handler::DragStart(f)) => Some(f(info)),
            _ => None,
        }
    }
}
