//! Observers of document changes.

use std::cell::RefCell;
use std::rc::Rc;
use trellis_core::{Document, InvariantViolation, NodeIndex, PropertyValue, Symbol};

/// Told that the document changed; recomputes whatever it shows later.
pub trait ReportSink {
    fn request_update(&mut self);
}

impl<T: ReportSink + ?Sized> ReportSink for Rc<RefCell<T>> {
    fn request_update(&mut self) {
        self.borrow_mut().request_update();
    }
}

/// A problem found in the edited document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportEntry {
    Invariant(InvariantViolation),
    /// A localized property whose key the resource bundle lacks.
    MissingResource {
        node: NodeIndex,
        property: Symbol,
        key: String,
    },
}

/// Lazily rechecked list of document problems.
#[derive(Debug)]
pub struct ErrorReport {
    entries: Vec<ReportEntry>,
    dirty: bool,
}

impl ErrorReport {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            dirty: true,
        }
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Current entries, rechecking `document` if an update was requested.
    pub fn entries(&mut self, document: &Document) -> &[ReportEntry] {
        if self.dirty {
            self.entries = check(document);
            self.dirty = false;
            log::trace!("error report: {} entries", self.entries.len());
        }
        &self.entries
    }
}

impl Default for ErrorReport {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportSink for ErrorReport {
    fn request_update(&mut self) {
        self.dirty = true;
    }
}

fn check(document: &Document) -> Vec<ReportEntry> {
    let tree = &document.tree;
    let mut entries: Vec<ReportEntry> = tree
        .check_invariants()
        .into_iter()
        .map(ReportEntry::Invariant)
        .collect();
    for idx in tree.document_order() {
        let Some(node) = tree.node(idx) else { continue };
        for (name, value) in node.properties() {
            if let PropertyValue::Localized(key) = value
                && document.resources.get(key).is_none()
            {
                entries.push(ReportEntry::MissingResource {
                    node: idx,
                    property: *name,
                    key: key.clone(),
                });
            }
        }
    }
    entries
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use trellis_core::{Fragment, ResourceBundle, TypeRegistry};

    #[test]
    fn reports_missing_resources_lazily() {
        let root = Fragment::new("root", "VBox")
            .with_child("children", Fragment::new("t", "Label").with_property("text", PropertyValue::Localized("title".into())));
        let mut doc = Document::from_fragment(Arc::new(TypeRegistry::builtin()), &root).unwrap();
        let mut report = ErrorReport::new();
        assert_eq!(report.entries(&doc).len(), 1);

        doc.resources = [("title", "Welcome")].into_iter().collect::<ResourceBundle>();
        // Still the cached answer until an update is requested.
        assert_eq!(report.entries(&doc).len(), 1);
        report.request_update();
        assert!(report.entries(&doc).is_empty());
    }

    #[test]
    fn shared_sink_forwards_requests() {
        let report = Rc::new(RefCell::new(ErrorReport::new()));
        report.borrow_mut().entries(&Document::new(Arc::new(TypeRegistry::builtin())));
        let mut sink: Box<dyn ReportSink> = Box::new(report.clone());
        sink.request_update();
        assert!(report.borrow().is_dirty());
    }
}
