//! The reversible unit of document mutation.
//!
//! A job is checked with `is_executable` (pure) before it is pushed; once
//! pushed, `execute`/`undo`/`redo` must not fail. Anything going wrong past
//! the check is a programming error and panics.

use crate::selection::Selection;
use std::fmt;
use trellis_core::{Document, NodeIndex, TreeError};

/// Mutable editing state a job operates on.
pub struct EditContext<'a> {
    pub document: &'a mut Document,
    pub selection: &'a mut Selection,
}

impl<'a> EditContext<'a> {
    pub fn new(document: &'a mut Document, selection: &'a mut Selection) -> Self {
        Self {
            document,
            selection,
        }
    }
}

/// Where a job stands when it leaves the history.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobState {
    Unexecuted,
    Applied,
    Undone,
}

pub trait Job: fmt::Debug {
    /// Whether `execute` would succeed on `document` right now.
    fn is_executable(&self, document: &Document) -> bool;

    fn execute(&mut self, cx: &mut EditContext<'_>);

    /// Restore the document and selection to their state before `execute`.
    fn undo(&mut self, cx: &mut EditContext<'_>);

    fn redo(&mut self, cx: &mut EditContext<'_>) {
        self.execute(cx);
    }

    /// Short label for undo/redo menu items.
    fn description(&self) -> String;

    /// Called once when the job leaves the history for good. Jobs holding
    /// detached subtrees free them here.
    fn dispose(&mut self, _document: &mut Document, _state: JobState) {}
}

/// Unwrap a primitive's result inside an already-checked job.
#[track_caller]
pub(crate) fn applied<T>(result: Result<T, TreeError>, what: &str) -> T {
    match result {
        Ok(value) => value,
        Err(err) => panic!("{what} failed after a successful check: {err}"),
    }
}

/// Free a detached subtree a disposed job still owns. Subtrees already
/// freed, or put back into the tree, are left alone.
pub(crate) fn release(document: &mut Document, node: NodeIndex) {
    let tree = &mut document.tree;
    if tree.node(node).is_none() || tree.parent(node).is_some() || tree.root() == Some(node) {
        return;
    }
    if let Err(err) = tree.destroy(node) {
        log::trace!("kept {node:?}: {err}");
    }
}
