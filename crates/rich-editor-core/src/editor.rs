//! The rich editor: document, selection, events and history behind one API.
//!
//! # Overview
//!
//! [`RichEditor`] owns every piece of editing state:
//!
//! - the [`SpanDocument`]
//! - the [`Selector`]
//! - the [`EventHub`] of host callbacks
//! - the undo history
//! - the IME preview record and the drag session
//! - the [`AutoScroller`]
//!
//! This module holds construction, queries and the selection/caret API. Content mutation lives in
//! `mutation`, with IME preview, drag/drop and clipboard in their own modules. All of them are
//! `impl RichEditor` blocks.
//!
//! # Example
//!
//! ```rust
//! use rich_editor_core::{CaretMoveIntent, RichEditor, TextSpanOptions};
//!
//! let mut editor = RichEditor::new();
//! editor.add_text_span(TextSpanOptions::new("hello world"));
//! editor.set_caret_offset(0);
//! editor.move_caret(CaretMoveIntent::RightWord);
//! assert_eq!(editor.caret_offset(), 5);
//!
//! editor.handle_select(CaretMoveIntent::End);
//! assert_eq!(editor.selection().start, 5);
//! assert_eq!(editor.selection().end, 11);
//! assert_eq!(editor.left_text_of_cursor(2), "lo");
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::autoscroll::AutoScroller;
use crate::clipboard::{Clipboard, InMemoryClipboard};
use crate::config::EditorConfig;
use crate::delta::TextDelta;
use crate::document::SpanDocument;
use crate::error::EditorError;
use crate::drag::DragSession;
use crate::events::{EventHub, EventKind};
use crate::preview::{PreviewOrigin, PreviewTextRecord};
use crate::results::{ParagraphResult, SelectionInfo, SpanResult};
use crate::selector::{Selector, TextRange};
use crate::style::{ImageStyle, ParagraphStyle, TextStyle};
use crate::text;
use crate::undo::{RecordType, UndoRedoManager};

/// Result of a content operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EditOutcome {
    /// The change was committed and Did handlers ran.
    Applied,
    /// A Will (or about-to) handler refused the change; nothing moved.
    Vetoed,
    /// Nothing to do (empty input, empty range, blocked by an active preview).
    Unchanged,
}

impl EditOutcome {
    /// Whether the document changed.
    pub fn is_applied(self) -> bool {
        self == EditOutcome::Applied
    }
}

/// Caret movement targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CaretMoveIntent {
    /// One grapheme back.
    Left,
    /// One grapheme forward.
    Right,
    /// Start of the previous word.
    LeftWord,
    /// End of the next word.
    RightWord,
    /// Start of the current paragraph.
    ParagraphBegin,
    /// End of the current paragraph, before its `'\n'`.
    ParagraphEnd,
    /// Document start.
    Home,
    /// Document end.
    End,
}

/// Headless rich text editor.
pub struct RichEditor {
    pub(crate) doc: SpanDocument,
    pub(crate) selector: Selector,
    pub(crate) events: EventHub,
    pub(crate) undo: UndoRedoManager,
    pub(crate) config: EditorConfig,
    pub(crate) typing_style: Option<TextStyle>,
    pub(crate) preview: PreviewTextRecord,
    pub(crate) preview_origin: Option<PreviewOrigin>,
    pub(crate) drag: DragSession,
    pub(crate) scroller: AutoScroller,
    pub(crate) clipboard: Box<dyn Clipboard>,
    pub(crate) last_text_delta: Option<TextDelta>,
    pub(crate) last_record: Option<RecordType>,
    reported_selection: TextRange,
}

impl fmt::Debug for RichEditor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RichEditor")
            .field("len", &self.doc.len())
            .field("spans", &self.doc.span_count())
            .field("selector", &self.selector)
            .field("preview", &self.preview)
            .field("events", &self.events)
            .finish_non_exhaustive()
    }
}

impl Default for RichEditor {
    fn default() -> Self {
        Self::new()
    }
}

impl RichEditor {
    /// Empty editor with the default configuration.
    pub fn new() -> Self {
        Self::with_config(EditorConfig::default())
    }

    /// Empty editor with `config`.
    pub fn with_config(config: EditorConfig) -> Self {
        Self {
            doc: SpanDocument::new(),
            selector: Selector::new(),
            events: EventHub::new(),
            undo: UndoRedoManager::new(config.max_undo),
            typing_style: config.typing_style.clone(),
            preview: PreviewTextRecord::default(),
            preview_origin: None,
            drag: DragSession::default(),
            scroller: AutoScroller::new(config.auto_scroll.clone()),
            clipboard: Box::new(InMemoryClipboard::new()),
            last_text_delta: None,
            last_record: None,
            reported_selection: TextRange::default(),
            config,
        }
    }

    /// Configuration in use.
    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    /// Registered handlers.
    pub fn events(&self) -> &EventHub {
        &self.events
    }

    /// Register or clear handlers.
    pub fn events_mut(&mut self) -> &mut EventHub {
        &mut self.events
    }

    /// Replace the clipboard backend.
    pub fn set_clipboard(&mut self, clipboard: Box<dyn Clipboard>) {
        self.clipboard = clipboard;
    }

    // ---- document queries ----

    /// The span document.
    pub fn document(&self) -> &SpanDocument {
        &self.doc
    }

    /// Content length in offsets.
    pub fn len(&self) -> usize {
        self.doc.len()
    }

    /// Whether the document is empty.
    pub fn is_empty(&self) -> bool {
        self.doc.is_empty()
    }

    /// Number of spans.
    pub fn span_count(&self) -> usize {
        self.doc.span_count()
    }

    /// Whole plain text, U+FFFC for non-text spans.
    pub fn text_content(&self) -> String {
        self.doc.text()
    }

    /// Plain text of `range`.
    pub fn text_in(&self, range: TextRange) -> String {
        self.doc.text_in(range.to_range())
    }

    /// Snapshots of the spans intersecting `[start, end)`; see [`SpanDocument::spans_info`].
    pub fn spans_info(&self, start: i64, end: i64) -> Vec<SpanResult> {
        self.doc.spans_info(start, end)
    }

    /// The selection and the spans it covers.
    pub fn selection_spans(&self) -> SelectionInfo {
        let selection = self.selector.range_or_caret();
        SelectionInfo {
            selection,
            spans: self.doc.results_in(selection),
        }
    }

    /// Snapshot of the span at sibling `index`.
    pub fn span_info(&self, index: usize) -> Result<SpanResult, EditorError> {
        self.doc.span_info(index)
    }

    /// Paragraphs intersecting `[start, end]`.
    pub fn paragraphs_info(&self, start: i64, end: i64) -> Vec<ParagraphResult> {
        self.doc.paragraphs_info(start, end)
    }

    /// Delta of the last committed content change.
    pub fn last_text_delta(&self) -> Option<&TextDelta> {
        self.last_text_delta.as_ref()
    }

    /// Take the delta of the last committed content change.
    pub fn take_last_text_delta(&mut self) -> Option<TextDelta> {
        self.last_text_delta.take()
    }

    /// Kind of the last committed operation.
    pub fn last_record_type(&self) -> Option<RecordType> {
        self.last_record
    }

    // ---- styles ----

    /// Style applied to typed text; `None` merges typed text into the span at the caret.
    pub fn typing_style(&self) -> Option<&TextStyle> {
        self.typing_style.as_ref()
    }

    /// Set or clear the typing style.
    pub fn set_typing_style(&mut self, style: Option<TextStyle>) {
        self.typing_style = style;
        self.undo.end_group();
    }

    /// Merge style deltas into every span intersecting `[start, end)`. Returns how many spans
    /// were restyled.
    ///
    /// Content and document ranges do not change, but text spans crossing `start` or `end` are
    /// split there. The restyle is one undo step and fires no change events.
    pub fn update_span_style(
        &mut self,
        start: i64,
        end: i64,
        text_style: Option<&TextStyle>,
        image_style: Option<&ImageStyle>,
    ) -> usize {
        if self.preview.is_active() {
            return 0;
        }
        let range = self.doc.normalize_range(start, end);
        let mut doc = self.doc.clone();
        let count = doc.update_span_style(range, text_style, image_style);
        trace!(target: "rich_editor.mutation", start = range.start, end = range.end, count, "update_span_style");
        self.commit_restyle(doc);
        count
    }

    /// Merge `style` into every paragraph intersecting `[start, end]`. Returns how many
    /// paragraphs were touched.
    pub fn update_paragraph_style(&mut self, start: i64, end: i64, style: &ParagraphStyle) -> usize {
        if self.doc.is_empty() || self.preview.is_active() {
            return 0;
        }
        let range = self.doc.normalize_range(start, end);
        let mut doc = self.doc.clone();
        let count = doc.update_paragraph_style(range, style);
        trace!(target: "rich_editor.mutation", start = range.start, end = range.end, count, "update_paragraph_style");
        self.commit_restyle(doc);
        count
    }

    // ---- selection ----

    /// Selected range, or the collapsed caret.
    pub fn selection(&self) -> TextRange {
        self.selector.range_or_caret()
    }

    /// The selector.
    pub fn selector(&self) -> &Selector {
        &self.selector
    }

    /// Caret offset.
    pub fn caret_offset(&self) -> usize {
        self.selector.caret()
    }

    /// Same as [`caret_offset`](Self::caret_offset).
    pub fn text_index_at_cursor(&self) -> usize {
        self.selector.caret()
    }

    /// Select `[start, end)`.
    ///
    /// Offsets are clamped and swapped. `(-1, -1)` clears the selection. Equal offsets move the
    /// caret. The caret lands on `end` when `forward`, else on `start`. Returns `false` while a
    /// preview is active.
    pub fn set_selection(&mut self, start: i64, end: i64, forward: bool) -> bool {
        if self.preview.is_active() {
            return false;
        }
        if start == -1 && end == -1 {
            self.clear_selection();
            return true;
        }
        let range = TextRange::new(self.doc.clamp(start), self.doc.clamp(end));
        if range.is_empty() {
            self.selector.set_caret(range.start);
        } else if forward {
            self.selector.update(range.start, range.end);
        } else {
            self.selector.update(range.end, range.start);
        }
        trace!(target: "rich_editor.selection", start = range.start, end = range.end, forward, "set_selection");
        self.after_selection_update(true);
        true
    }

    /// Move the caret to `offset` (clamped), dropping the selection. Returns `false` while a
    /// preview is active.
    pub fn set_caret_offset(&mut self, offset: i64) -> bool {
        if self.preview.is_active() {
            return false;
        }
        let offset = self.doc.clamp(offset);
        self.selector.set_caret(offset);
        self.after_selection_update(false);
        true
    }

    /// Select the whole document.
    pub fn select_all(&mut self) -> bool {
        if self.preview.is_active() {
            return false;
        }
        let len = self.doc.len();
        if len == 0 {
            self.selector.set_caret(0);
        } else {
            self.selector.update(0, len);
        }
        self.after_selection_update(true);
        true
    }

    /// Drop the selection, keeping the caret. Returns whether a selection was dropped, and
    /// `false` while a preview is active.
    pub fn clear_selection(&mut self) -> bool {
        if self.preview.is_active() {
            return false;
        }
        let had = self.selector.range().is_some();
        self.selector.clear();
        self.after_selection_update(false);
        had
    }

    /// Move the caret. A selection collapses: `Left`/`Right` land on its near edge, other
    /// intents move from the caret. Returns `false` while a preview is active.
    pub fn move_caret(&mut self, intent: CaretMoveIntent) -> bool {
        if self.preview.is_active() {
            return false;
        }
        let target = match (self.selector.range(), intent) {
            (Some(range), CaretMoveIntent::Left) => range.start,
            (Some(range), CaretMoveIntent::Right) => range.end,
            _ => self.caret_target(self.selector.caret(), intent),
        };
        self.selector.set_caret(target);
        self.after_selection_update(false);
        true
    }

    /// Extend the selection from its anchor to the target of `intent`.
    pub fn handle_select(&mut self, intent: CaretMoveIntent) -> bool {
        if self.preview.is_active() {
            return false;
        }
        let anchor = self.selector.anchor();
        let target = self.caret_target(self.selector.caret(), intent);
        self.selector.update(anchor, target);
        self.after_selection_update(true);
        true
    }

    fn caret_target(&self, from: usize, intent: CaretMoveIntent) -> usize {
        let rope = self.doc.rope();
        let from = from.min(self.doc.len());
        match intent {
            CaretMoveIntent::Left => text::prev_grapheme_boundary(rope, from),
            CaretMoveIntent::Right => text::next_grapheme_boundary(rope, from),
            CaretMoveIntent::LeftWord => text::prev_word_boundary(rope, from),
            CaretMoveIntent::RightWord => text::next_word_boundary(rope, from),
            CaretMoveIntent::ParagraphBegin => text::paragraph_bounds(rope, from).0,
            CaretMoveIntent::ParagraphEnd => text::paragraph_bounds(rope, from).1,
            CaretMoveIntent::Home => 0,
            CaretMoveIntent::End => self.doc.len(),
        }
    }

    /// Up to `length` offsets of text before the selection start (or caret).
    pub fn left_text_of_cursor(&self, length: usize) -> String {
        let start = self.selector.text_start();
        self.doc.text_in(start.saturating_sub(length)..start)
    }

    /// Up to `length` offsets of text after the selection end (or caret).
    pub fn right_text_of_cursor(&self, length: usize) -> String {
        let end = self.selector.text_end();
        self.doc.text_in(end..end.saturating_add(length))
    }

    fn after_selection_update(&mut self, fire_select: bool) {
        self.undo.end_group();
        if fire_select && let Some(range) = self.selector.range() {
            self.events.fire_range(EventKind::Select, range);
        }
        self.notify_selection_change();
    }

    /// Fire `SelectionChange` if the range differs from the last one reported.
    pub(crate) fn notify_selection_change(&mut self) {
        let range = self.selector.range_or_caret();
        if range == self.reported_selection {
            return;
        }
        self.reported_selection = range;
        trace!(target: "rich_editor.selection", start = range.start, end = range.end, "selection_change");
        self.events.fire_range(EventKind::SelectionChange, range);
    }

    // ---- history ----

    /// Whether a step can be undone.
    pub fn can_undo(&self) -> bool {
        self.undo.can_undo()
    }

    /// Whether a step can be redone.
    pub fn can_redo(&self) -> bool {
        self.undo.can_redo()
    }

    /// Number of undoable steps.
    pub fn undo_depth(&self) -> usize {
        self.undo.undo_depth()
    }

    /// Number of redoable steps.
    pub fn redo_depth(&self) -> usize {
        self.undo.redo_depth()
    }

    /// Group still accepting typed input.
    pub fn current_change_group(&self) -> Option<usize> {
        self.undo.current_group_id()
    }

    /// Close the open typing group so the next keystroke starts a new undo step.
    pub fn end_undo_group(&mut self) {
        self.undo.end_group();
    }

    /// Whether the document is at the clean point.
    pub fn is_clean(&self) -> bool {
        self.undo.is_clean()
    }

    /// Whether the document changed since the clean point.
    pub fn is_modified(&self) -> bool {
        !self.undo.is_clean()
    }

    /// Mark the current state as clean.
    pub fn mark_clean(&mut self) {
        self.undo.mark_clean();
    }

    /// Drop the whole undo history.
    pub fn clear_history(&mut self) {
        self.undo.clear();
    }

    // ---- scrolling ----

    /// The auto-scroller.
    pub fn scroller(&self) -> &AutoScroller {
        &self.scroller
    }

    /// The auto-scroller, for geometry updates, pointer events and timer ticks.
    pub fn scroller_mut(&mut self) -> &mut AutoScroller {
        &mut self.scroller
    }

    /// Whether the content can scroll: it is non-empty and taller than the visible area.
    pub fn check_scrollable(&self) -> bool {
        !self.doc.is_empty() && self.scroller.is_overflowing()
    }
}
