//! Paste and duplicate: inserting fresh copies of fragments.

use crate::job::{EditContext, Job, JobState};
use crate::jobs::{InsertJob, Placement};
use std::collections::HashMap;
use trellis_core::{Cell, Document, DocumentTree, Fragment, NodeIndex, Symbol};

#[derive(Debug)]
pub struct PasteJob {
    description: &'static str,
    inserts: Vec<InsertJob>,
    /// `(parent, slot, type)` of each insert, for the combined capacity check.
    targets: Vec<(NodeIndex, Option<Symbol>, Symbol)>,
    select: bool,
    complete: bool,
}

impl PasteJob {
    /// Paste `fragments` at the end of `parent`'s default slot. Cells that
    /// do not fit a target grid fall back to `(0, 0)`.
    pub fn new(tree: &DocumentTree, fragments: Vec<Fragment>, parent: NodeIndex) -> Self {
        let slot = tree.default_slot(parent);
        let dims = slot
            .filter(|&s| tree.is_grid_slot(parent, s))
            .and_then(|_| tree.grid_dims(parent).ok());
        let mut job = Self::empty("Paste");
        for fragment in fragments {
            let type_name = fragment.type_name;
            let cell = fragment.cell.unwrap_or_default();
            let mut insert = InsertJob::from_fragment(fragment, parent).selecting(false);
            if dims.is_some_and(|d| !d.contains(cell)) {
                insert = insert.with_cell(Cell::default());
            }
            job.inserts.push(insert);
            job.targets.push((parent, slot, type_name));
        }
        job
    }

    /// Put a copy of each node right after the original.
    pub fn duplicate(tree: &DocumentTree, nodes: &[NodeIndex]) -> Self {
        let mut job = Self::empty("Duplicate");
        for &node in nodes {
            if tree.ancestors(node).any(|a| nodes.contains(&a)) {
                continue;
            }
            let (Some(pos), Some(fragment)) = (tree.position(node), tree.export(node)) else {
                job.complete = false;
                continue;
            };
            job.targets.push((pos.parent, Some(pos.slot), fragment.type_name));
            job.inserts.push(
                InsertJob::from_fragment(fragment, pos.parent)
                    .in_slot(pos.slot)
                    .at(Placement::After(node))
                    .selecting(false),
            );
        }
        job
    }

    fn empty(description: &'static str) -> Self {
        Self {
            description,
            inserts: Vec::new(),
            targets: Vec::new(),
            select: true,
            complete: true,
        }
    }

    pub fn labelled(mut self, description: &'static str) -> Self {
        self.description = description;
        self
    }

    /// Whether executing selects the copies (default: yes).
    pub fn selecting(mut self, select: bool) -> Self {
        self.select = select;
        self
    }

    pub fn inserted(&self) -> Vec<NodeIndex> {
        self.inserts.iter().filter_map(InsertJob::inserted).collect()
    }
}

impl Job for PasteJob {
    fn is_executable(&self, document: &Document) -> bool {
        let tree = &document.tree;
        if !self.complete || self.inserts.is_empty() {
            return false;
        }
        let mut counts: HashMap<(NodeIndex, Option<Symbol>), usize> = HashMap::new();
        for (parent, slot, _) in &self.targets {
            *counts.entry((*parent, *slot)).or_default() += 1;
        }
        let fits = self.targets.iter().all(|&(parent, slot, type_name)| {
            let count = counts[&(parent, slot)];
            slot.or_else(|| tree.default_slot(parent))
                .is_some_and(|s| tree.check_accepts(parent, s, type_name, count).is_ok())
        });
        fits && self.inserts.iter().all(|job| job.is_executable(document))
    }

    fn execute(&mut self, cx: &mut EditContext<'_>) {
        for insert in &mut self.inserts {
            insert.execute(cx);
        }
        if self.select {
            cx.selection.select_all(self.inserted());
        }
    }

    fn undo(&mut self, cx: &mut EditContext<'_>) {
        for insert in self.inserts.iter_mut().rev() {
            insert.undo(cx);
        }
    }

    fn description(&self) -> String {
        self.description.to_string()
    }

    fn dispose(&mut self, document: &mut Document, state: JobState) {
        for insert in &mut self.inserts {
            insert.dispose(document, state);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jobs::testing::{assert_reversible, document, node};
    use crate::selection::Selection;
    use pretty_assertions::assert_eq;
    use trellis_core::GridDims;

    #[test]
    fn paste_copies_with_fresh_ids() {
        let mut doc = document(
            Fragment::new("root", "VBox").with_child("children", Fragment::new("ok", "Button")),
        );
        let root = doc.tree.root().unwrap();
        let copied = doc.tree.export(node(&doc, "ok")).unwrap();
        let mut sel = Selection::new();
        let mut job = PasteJob::new(&doc.tree, vec![copied.clone(), copied], root);
        assert_reversible(&mut job, &mut doc, &mut sel);
        let pasted = job.inserted();
        assert_eq!(pasted.len(), 2);
        assert_eq!(sel.items(), pasted);
        for n in pasted {
            assert_ne!(doc.tree.node(n).unwrap().id.as_str(), "ok");
        }
    }

    #[test]
    fn paste_respects_combined_capacity() {
        let doc = document(Fragment::new("root", "ScrollPane"));
        let root = doc.tree.root().unwrap();
        let one = Fragment::new("x", "Label");
        assert!(PasteJob::new(&doc.tree, vec![one.clone()], root).is_executable(&doc));
        assert!(!PasteJob::new(&doc.tree, vec![one.clone(), one], root).is_executable(&doc));
    }

    #[test]
    fn paste_into_grid_resets_stray_cells() {
        let mut doc = document(Fragment::new("grid", "GridPane").with_grid(GridDims::new(1, 1)));
        let grid = doc.tree.root().unwrap();
        let stray = Fragment::new("x", "Label").with_cell(Cell::new(4, 4));
        let mut job = PasteJob::new(&doc.tree, vec![stray], grid);
        assert_reversible(&mut job, &mut doc, &mut Selection::new());
        assert_eq!(doc.tree.cell_of(job.inserted()[0]), Cell::new(0, 0));
    }

    #[test]
    fn duplicate_lands_after_each_original() {
        let mut doc = document(
            Fragment::new("root", "HBox")
                .with_child("children", Fragment::new("a", "Button"))
                .with_child("children", Fragment::new("b", "Button")),
        );
        let (a, b) = (node(&doc, "a"), node(&doc, "b"));
        let mut job = PasteJob::duplicate(&doc.tree, &[a, b]);
        assert_eq!(job.description(), "Duplicate");
        assert_reversible(&mut job, &mut doc, &mut Selection::new());
        let copies = job.inserted();
        let root = doc.tree.root().unwrap();
        assert_eq!(doc.tree.sub_components(root), &[a, copies[0], b, copies[1]]);
    }

    #[test]
    fn duplicating_the_root_is_unavailable() {
        let doc = document(Fragment::new("root", "HBox"));
        let root = doc.tree.root().unwrap();
        assert!(!PasteJob::duplicate(&doc.tree, &[root]).is_executable(&doc));
    }
}
