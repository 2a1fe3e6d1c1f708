//! Errors surfaced to callers of the editor's outer operations.
//!
//! Structural failures never show up here: they are checked away by
//! `Job::is_executable` before anything is pushed.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EditorError {
    #[error("no document is being edited")]
    NoDocument,

    #[error("action unavailable: {0}")]
    ActionUnavailable(String),

    #[error("document I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("clipboard payload could not be decoded: {0}")]
    Clipboard(#[from] rmp_serde::decode::Error),

    #[error("selection could not be encoded for the clipboard: {0}")]
    ClipboardEncode(#[from] rmp_serde::encode::Error),

    #[error("selection could not be rendered as clipboard text: {0}")]
    ClipboardText(serde_json::Error),

    #[error("invalid editor config: {0}")]
    Config(#[from] serde_json::Error),
}

impl EditorError {
    pub(crate) fn unavailable(what: impl Into<String>) -> Self {
        Self::ActionUnavailable(what.into())
    }
}
