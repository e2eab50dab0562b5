//! Error type shared by every fallible editor operation.
//!
//! Out-of-range offsets are clamped rather than reported, and a vetoed edit is an ordinary
//! outcome ([`crate::EditOutcome::Vetoed`]), so this enum only covers the cases where the caller
//! asked for something the editor cannot do in its current state.

use std::path::PathBuf;

use thiserror::Error;

/// Errors reported by [`crate::RichEditor`], [`crate::CommandExecutor`] and configuration loading.
#[derive(Debug, Error)]
pub enum EditorError {
    /// The undo stack is empty.
    #[error("nothing to undo")]
    NothingToUndo,

    /// The redo stack is empty.
    #[error("nothing to redo")]
    NothingToRedo,

    /// A sibling index does not name a span.
    #[error("span index {index} out of bounds (span count {len})")]
    InvalidSpanIndex {
        /// Requested index.
        index: usize,
        /// Number of spans in the document.
        len: usize,
    },

    /// The operation is not allowed while an IME preview owns part of the document.
    #[error("operation not allowed while a text preview is active")]
    PreviewActive,

    /// A preview operation was requested but no preview is active.
    #[error("no active text preview")]
    NoPreview,

    /// A drop was delivered without a matching drag session.
    #[error("no drag session in progress")]
    NoDragSession,

    /// A drag or clipboard span payload could not be decoded.
    #[error("malformed span payload: {0}")]
    Payload(#[from] serde_json::Error),

    /// Configuration text is not valid TOML for [`crate::EditorConfig`].
    #[error("invalid editor configuration: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// Configuration file could not be read.
    #[error("failed to read configuration {}: {source}", path.display())]
    ConfigIo {
        /// File that was being read.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },
}
