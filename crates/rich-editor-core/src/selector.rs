//! Caret and selection state.
//!
//! # Overview
//!
//! The [`Selector`] holds a caret offset and an optional selection given by two offsets,
//! `base` (anchor) and `destination` (active end). The two may appear in either order. Both are
//! absent when nothing is selected; the public accessors report that as `-1`.
//!
//! Offsets are document offsets and are independent of span boundaries.
//!
//! # Example
//!
//! ```rust
//! use rich_editor_core::{Selector, TextRange};
//!
//! let mut selector = Selector::new();
//! selector.update(5, 1);
//! assert_eq!(selector.range(), Some(TextRange::new(1, 5)));
//! assert_eq!(selector.caret(), 1);
//! assert!(!selector.is_forward());
//!
//! selector.clear();
//! assert_eq!(selector.base_offset(), -1);
//! ```

use std::ops::Range;

use serde::{Deserialize, Serialize};

/// Half-open `[start, end)` range of document offsets with `start <= end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct TextRange {
    /// Inclusive start.
    pub start: usize,
    /// Exclusive end.
    pub end: usize,
}

impl TextRange {
    /// Build a range, swapping the bounds when needed.
    pub fn new(a: usize, b: usize) -> Self {
        Self {
            start: a.min(b),
            end: a.max(b),
        }
    }

    /// Empty range at `offset`.
    pub fn caret(offset: usize) -> Self {
        Self {
            start: offset,
            end: offset,
        }
    }

    /// Number of offsets covered.
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// Returns `true` for a collapsed range.
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Inclusive containment: `start <= offset <= end`.
    pub fn touches(&self, offset: usize) -> bool {
        self.start <= offset && offset <= self.end
    }

    /// Smallest range covering both.
    pub fn union(&self, other: &TextRange) -> TextRange {
        TextRange {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }

    /// As a std range.
    pub fn to_range(self) -> Range<usize> {
        self.start..self.end
    }
}

impl From<Range<usize>> for TextRange {
    fn from(range: Range<usize>) -> Self {
        TextRange::new(range.start, range.end)
    }
}

/// Caret and selection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selector {
    base: Option<usize>,
    destination: Option<usize>,
    caret: usize,
}

impl Selector {
    /// No selection, caret at 0.
    pub fn new() -> Self {
        Self::default()
    }

    /// Caret at `offset`, nothing selected.
    pub fn with_caret(offset: usize) -> Self {
        Self {
            base: None,
            destination: None,
            caret: offset,
        }
    }

    /// Select `[min, max)` of the two offsets; the caret follows `destination`.
    ///
    /// Equal offsets collapse into a caret move.
    pub fn update(&mut self, base: usize, destination: usize) {
        if base == destination {
            self.set_caret(base);
            return;
        }
        self.base = Some(base);
        self.destination = Some(destination);
        self.caret = destination;
    }

    /// Move the caret and drop the selection.
    pub fn set_caret(&mut self, offset: usize) {
        self.base = None;
        self.destination = None;
        self.caret = offset;
    }

    /// Drop the selection; the caret stays where it is.
    pub fn clear(&mut self) {
        self.base = None;
        self.destination = None;
    }

    /// Whether a non-empty selection exists.
    pub fn has_selection(&self) -> bool {
        matches!((self.base, self.destination), (Some(b), Some(d)) if b != d)
    }

    /// Normalized selection, if any.
    pub fn range(&self) -> Option<TextRange> {
        match (self.base, self.destination) {
            (Some(b), Some(d)) if b != d => Some(TextRange::new(b, d)),
            _ => None,
        }
    }

    /// Selection, or the collapsed caret when nothing is selected.
    pub fn range_or_caret(&self) -> TextRange {
        self.range().unwrap_or(TextRange::caret(self.caret))
    }

    /// Caret offset.
    pub fn caret(&self) -> usize {
        self.caret
    }

    /// Anchor offset, `-1` when nothing is selected.
    pub fn base_offset(&self) -> i64 {
        self.base.map_or(-1, |o| o as i64)
    }

    /// Active-end offset, `-1` when nothing is selected.
    pub fn destination_offset(&self) -> i64 {
        self.destination.map_or(-1, |o| o as i64)
    }

    /// Anchor of the current selection, or the caret.
    pub fn anchor(&self) -> usize {
        self.base.unwrap_or(self.caret)
    }

    /// `true` when the active end is after the anchor (or nothing is selected).
    pub fn is_forward(&self) -> bool {
        match (self.base, self.destination) {
            (Some(b), Some(d)) => d >= b,
            _ => true,
        }
    }

    /// Selection start, or the caret.
    pub fn text_start(&self) -> usize {
        self.range_or_caret().start
    }

    /// Selection end, or the caret.
    pub fn text_end(&self) -> usize {
        self.range_or_caret().end
    }

    /// Clamp every offset into `[0, len]`.
    pub fn clamp_to(&mut self, len: usize) {
        self.caret = self.caret.min(len);
        if let (Some(b), Some(d)) = (self.base, self.destination) {
            self.update(b.min(len), d.min(len));
            self.caret = self.caret.min(len);
        }
    }

    /// Carry every offset through a set of simultaneous edits.
    ///
    /// `edits` are `(start, deleted_len, inserted_len)` in pre-edit coordinates, sorted by start.
    pub(crate) fn map_through(&mut self, edits: &[(usize, usize, usize)]) {
        self.caret = map_offset(self.caret, edits);
        if let (Some(b), Some(d)) = (self.base, self.destination) {
            let b = map_offset(b, edits);
            let d = map_offset(d, edits);
            let caret = self.caret;
            self.update(b, d);
            if self.has_selection() {
                self.caret = caret;
            }
        }
    }
}

/// Map a pre-edit offset to post-edit coordinates.
///
/// Offsets inside a deleted range collapse to its start. Offsets exactly at an insertion point
/// move past the inserted text.
pub(crate) fn map_offset(offset: usize, edits: &[(usize, usize, usize)]) -> usize {
    let mut shift: isize = 0;
    for &(start, deleted, inserted) in edits {
        let end = start + deleted;
        if offset < start {
            break;
        }
        if offset < end {
            return (start as isize + shift) as usize;
        }
        shift += inserted as isize - deleted as isize;
    }
    (offset as isize + shift).max(0) as usize
}
