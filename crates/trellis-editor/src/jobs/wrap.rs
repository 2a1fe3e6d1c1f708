//! Wrap, unwrap and trim: jobs that change which node owns a subtree.

use crate::job::{EditContext, Job, JobState, applied, release};
use trellis_core::{Cell, ChildPosition, Document, DocumentTree, GridDims, NodeIndex, Symbol};

// ─── Wrap ────────────────────────────────────────────────────────────────

/// Move sibling nodes into a new container that takes the place of the
/// first one. With a holder type, the nodes go into a holder created as
/// the container's first child (a `Tab` inside a `TabPane`).
#[derive(Debug)]
pub struct WrapJob {
    container_type: Symbol,
    holder_type: Option<Symbol>,
    nodes: Vec<NodeIndex>,
    container: Option<NodeIndex>,
    holder: Option<NodeIndex>,
    moves: Vec<(NodeIndex, ChildPosition, Option<Cell>)>,
}

impl WrapJob {
    pub fn new(tree: &DocumentTree, nodes: &[NodeIndex], container_type: impl Into<Symbol>) -> Self {
        let mut nodes = nodes.to_vec();
        nodes.sort_by_key(|&n| tree.position(n).map(|p| p.index));
        Self {
            container_type: container_type.into(),
            holder_type: None,
            nodes,
            container: None,
            holder: None,
            moves: Vec::new(),
        }
    }

    /// Wrap in a new `TabPane` whose single `Tab` holds the nodes.
    pub fn in_tab_pane(tree: &DocumentTree, nodes: &[NodeIndex]) -> Self {
        Self::new(tree, nodes, "TabPane").with_holder("Tab")
    }

    pub fn with_holder(mut self, holder_type: impl Into<Symbol>) -> Self {
        self.holder_type = Some(holder_type.into());
        self
    }
}

impl Job for WrapJob {
    fn is_executable(&self, document: &Document) -> bool {
        let tree = &document.tree;
        let types = tree.types();
        let Some(outer_slot) = types
            .get(self.container_type)
            .and_then(|def| def.default_slot())
        else {
            return false;
        };
        let slot_def = match self.holder_type {
            Some(holder_type) => {
                let Some(inner_slot) = types.get(holder_type).and_then(|def| def.default_slot())
                else {
                    return false;
                };
                if !outer_slot.accepts.admits(holder_type) {
                    return false;
                }
                inner_slot
            }
            None => outer_slot,
        };
        let Some(first) = self.nodes.first().and_then(|&n| tree.position(n)) else {
            return false;
        };
        let siblings = self.nodes.iter().all(|&n| {
            tree.position(n)
                .is_some_and(|p| p.parent == first.parent && p.slot == first.slot)
        });
        let admitted = self.nodes.iter().all(|&n| {
            tree.node(n)
                .is_some_and(|node| slot_def.accepts.admits(node.type_name))
        });
        tree.is_attached(first.parent)
            && siblings
            && admitted
            && slot_def.capacity.is_none_or(|cap| self.nodes.len() <= cap)
            && tree
                .check_accepts(first.parent, first.slot, self.container_type, 0)
                .is_ok()
            && (self.nodes.len() == 1 || !tree.is_grid_slot(first.parent, first.slot))
    }

    fn execute(&mut self, cx: &mut EditContext<'_>) {
        let tree = &mut cx.document.tree;
        let Some(target) = self.nodes.first().and_then(|&n| tree.position(n)) else {
            panic!("wrapped nodes lost their parent");
        };
        let container = match self.container {
            Some(container) => container,
            None => applied(tree.create(self.container_type), "create container"),
        };
        self.container = Some(container);
        // The holder stays inside the container across undo/redo.
        let holder = match (self.holder, self.holder_type) {
            (Some(holder), _) => holder,
            (None, Some(holder_type)) => {
                let holder = applied(tree.create(holder_type), "create holder");
                let Some(outer) = tree.default_slot(container) else {
                    panic!("container `{}` has no slot", self.container_type);
                };
                applied(tree.insert_as_child(holder, container, outer, 0), "insert holder");
                self.holder = Some(holder);
                holder
            }
            (None, None) => container,
        };
        let Some(slot) = tree.default_slot(holder) else {
            panic!("`{}` has no slot to wrap into", self.container_type);
        };
        let grid = tree.is_grid_slot(holder, slot);
        if grid {
            let dims = GridDims::new(1, self.nodes.len() as u32);
            applied(tree.set_grid_dims(holder, dims), "size container grid");
        }
        if tree.is_grid_slot(target.parent, target.slot) {
            let cell = tree.cell_of(self.nodes[0]);
            applied(tree.set_cell(container, Some(cell)), "container cell");
        }

        self.moves.clear();
        for (i, &node) in self.nodes.iter().enumerate() {
            let cell = tree.node(node).and_then(|n| n.cell());
            let pos = applied(tree.remove(node), "detach wrapped node");
            self.moves.push((node, pos, cell));
            if grid {
                applied(tree.set_cell(node, Some(Cell::new(0, i as u32))), "wrapped cell");
            }
            applied(tree.insert_as_child(node, holder, slot, i), "fill container");
        }
        applied(
            tree.insert_as_child(container, target.parent, target.slot, target.index),
            "insert container",
        );
        cx.selection.select(container);
    }

    fn undo(&mut self, cx: &mut EditContext<'_>) {
        let Some(container) = self.container else {
            panic!("undo of a wrap that never ran");
        };
        let tree = &mut cx.document.tree;
        applied(tree.remove(container), "detach container");
        for &(node, pos, cell) in self.moves.iter().rev() {
            applied(tree.remove(node), "empty container");
            applied(tree.set_cell(node, cell), "restore cell");
            applied(tree.insert_as_child(node, pos.parent, pos.slot, pos.index), "unwrap node");
        }
    }

    fn description(&self) -> String {
        format!("Wrap in {}", self.container_type)
    }

    fn dispose(&mut self, document: &mut Document, state: JobState) {
        if state != JobState::Applied
            && let Some(container) = self.container
        {
            release(document, container);
        }
    }
}

// ─── Unwrap ──────────────────────────────────────────────────────────────

/// Replace a container by the content of its default slot.
#[derive(Debug)]
pub struct UnwrapJob {
    container: NodeIndex,
    position: Option<(ChildPosition, Symbol)>,
    moved: Vec<(NodeIndex, Option<Cell>)>,
}

impl UnwrapJob {
    pub fn new(container: NodeIndex) -> Self {
        Self {
            container,
            position: None,
            moved: Vec::new(),
        }
    }
}

impl Job for UnwrapJob {
    fn is_executable(&self, document: &Document) -> bool {
        let tree = &document.tree;
        let (Some(pos), Some(slot), Some(node)) = (
            tree.position(self.container),
            tree.default_slot(self.container),
            tree.node(self.container),
        ) else {
            return false;
        };
        let children = tree.children(self.container, slot);
        if !tree.is_attached(self.container) || children.is_empty() {
            return false;
        }
        // Content of other slots would be lost with the container.
        if node.components().any(|(s, kids)| s != slot && !kids.is_empty()) {
            return false;
        }
        if children.len() > 1 && tree.is_grid_slot(pos.parent, pos.slot) {
            return false;
        }
        children.iter().all(|&child| {
            tree.node(child).is_some_and(|c| {
                tree.check_accepts(pos.parent, pos.slot, c.type_name, children.len() - 1)
                    .is_ok()
            })
        })
    }

    fn execute(&mut self, cx: &mut EditContext<'_>) {
        let tree = &mut cx.document.tree;
        let Some(slot) = tree.default_slot(self.container) else {
            panic!("unwrapped node has no slot");
        };
        let container_cell = tree.node(self.container).and_then(|n| n.cell());
        let pos = applied(tree.remove(self.container), "detach container");
        let into_grid = tree.is_grid_slot(pos.parent, pos.slot);
        let children = tree.children(self.container, slot).to_vec();

        self.moved.clear();
        for (i, &child) in children.iter().enumerate() {
            let cell = tree.node(child).and_then(|n| n.cell());
            applied(tree.remove(child), "take content");
            self.moved.push((child, cell));
            if into_grid {
                applied(tree.set_cell(child, Some(container_cell.unwrap_or_default())), "content cell");
            }
            applied(
                tree.insert_as_child(child, pos.parent, pos.slot, pos.index + i),
                "place content",
            );
        }
        self.position = Some((pos, slot));
        cx.selection.select_all(children);
    }

    fn undo(&mut self, cx: &mut EditContext<'_>) {
        let Some((pos, slot)) = self.position else {
            panic!("undo of an unwrap that never ran");
        };
        let tree = &mut cx.document.tree;
        for &(child, cell) in self.moved.iter().rev() {
            applied(tree.remove(child), "take content back");
            applied(tree.set_cell(child, cell), "restore cell");
            applied(tree.insert_as_child(child, self.container, slot, 0), "refill container");
        }
        applied(
            tree.insert_as_child(self.container, pos.parent, pos.slot, pos.index),
            "reinsert container",
        );
    }

    fn description(&self) -> String {
        "Unwrap".to_string()
    }

    fn dispose(&mut self, document: &mut Document, state: JobState) {
        if state == JobState::Applied {
            release(document, self.container);
        }
    }
}

// ─── Trim ────────────────────────────────────────────────────────────────

/// Make a node the document root, dropping everything around it.
#[derive(Debug)]
pub struct TrimJob {
    node: NodeIndex,
    position: Option<ChildPosition>,
    old_root: Option<NodeIndex>,
}

impl TrimJob {
    pub fn new(node: NodeIndex) -> Self {
        Self {
            node,
            position: None,
            old_root: None,
        }
    }
}

impl Job for TrimJob {
    fn is_executable(&self, document: &Document) -> bool {
        let tree = &document.tree;
        tree.is_attached(self.node) && tree.parent(self.node).is_some()
    }

    fn execute(&mut self, cx: &mut EditContext<'_>) {
        let tree = &mut cx.document.tree;
        self.position = Some(applied(tree.remove(self.node), "detach new root"));
        self.old_root = applied(tree.set_root(Some(self.node)), "install root");
        cx.selection.select(self.node);
    }

    fn undo(&mut self, cx: &mut EditContext<'_>) {
        let Some(pos) = self.position else {
            panic!("undo of a trim that never ran");
        };
        let tree = &mut cx.document.tree;
        applied(tree.set_root(self.old_root), "restore root");
        applied(
            tree.insert_as_child(self.node, pos.parent, pos.slot, pos.index),
            "reinsert trimmed node",
        );
    }

    fn description(&self) -> String {
        "Trim".to_string()
    }

    fn dispose(&mut self, document: &mut Document, state: JobState) {
        if state == JobState::Applied
            && let Some(old_root) = self.old_root
        {
            release(document, old_root);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jobs::testing::{assert_reversible, document, node};
    use crate::selection::Selection;
    use pretty_assertions::assert_eq;
    use trellis_core::Fragment;

    fn doc() -> Document {
        document(
            Fragment::new("root", "VBox")
                .with_child("children", Fragment::new("title", "Label"))
                .with_child("children", Fragment::new("ok", "Button"))
                .with_child("children", Fragment::new("cancel", "Button")),
        )
    }

    #[test]
    fn wrap_siblings_in_hbox() {
        let mut doc = doc();
        let (ok, cancel) = (node(&doc, "ok"), node(&doc, "cancel"));
        let mut sel = Selection::new();
        let mut job = WrapJob::new(&doc.tree, &[cancel, ok], "HBox");
        assert_reversible(&mut job, &mut doc, &mut sel);
        let root = doc.tree.root().unwrap();
        let wrapper = doc.tree.sub_components(root)[1];
        assert_eq!(doc.tree.node(wrapper).unwrap().type_name.as_str(), "HBox");
        assert_eq!(doc.tree.sub_components(wrapper), &[ok, cancel]);
        assert_eq!(sel.items(), vec![wrapper]);
    }

    #[test]
    fn wrap_in_tab_pane_nests_a_tab() {
        let mut doc = doc();
        let ok = node(&doc, "ok");
        let mut sel = Selection::new();
        let mut job = WrapJob::in_tab_pane(&doc.tree, &[ok]);
        assert_reversible(&mut job, &mut doc, &mut sel);
        let tab = doc.tree.parent(ok).unwrap();
        let pane = doc.tree.parent(tab).unwrap();
        assert_eq!(doc.tree.node(tab).unwrap().type_name.as_str(), "Tab");
        assert_eq!(doc.tree.node(pane).unwrap().type_name.as_str(), "TabPane");
        assert_eq!(doc.tree.position(pane).unwrap().index, 1);
        assert_eq!(sel.items(), vec![pane]);
        assert_eq!(job.description(), "Wrap in TabPane");
    }

    #[test]
    fn wrap_in_grid_lays_nodes_out_in_a_row() {
        let mut doc = doc();
        let (ok, cancel) = (node(&doc, "ok"), node(&doc, "cancel"));
        let mut job = WrapJob::new(&doc.tree, &[ok, cancel], "GridPane");
        assert_reversible(&mut job, &mut doc, &mut Selection::new());
        let grid = doc.tree.parent(ok).unwrap();
        assert_eq!(doc.tree.grid_dims(grid).unwrap(), GridDims::new(1, 2));
        assert_eq!(doc.tree.cell_of(cancel), Cell::new(0, 1));
    }

    #[test]
    fn wrap_availability() {
        let doc = doc();
        let (root, ok) = (doc.tree.root().unwrap(), node(&doc, "ok"));
        let title = node(&doc, "title");
        assert!(!WrapJob::new(&doc.tree, &[root], "HBox").is_executable(&doc));
        // Tab panes only take tabs directly, and a tab holds a single node.
        assert!(!WrapJob::new(&doc.tree, &[ok], "TabPane").is_executable(&doc));
        assert!(WrapJob::in_tab_pane(&doc.tree, &[ok]).is_executable(&doc));
        assert!(!WrapJob::in_tab_pane(&doc.tree, &[ok, title]).is_executable(&doc));
        assert!(!WrapJob::new(&doc.tree, &[ok, title], "ScrollPane").is_executable(&doc));
        assert!(WrapJob::new(&doc.tree, &[ok], "ScrollPane").is_executable(&doc));
    }

    #[test]
    fn unwrap_splices_content_into_parent() {
        let mut doc = document(
            Fragment::new("root", "VBox")
                .with_child("children", Fragment::new("first", "Label"))
                .with_child(
                    "children",
                    Fragment::new("row", "HBox")
                        .with_child("children", Fragment::new("a", "Button"))
                        .with_child("children", Fragment::new("b", "Button")),
                ),
        );
        let (row, a, b) = (node(&doc, "row"), node(&doc, "a"), node(&doc, "b"));
        let mut sel = Selection::new();
        let mut job = UnwrapJob::new(row);
        assert_reversible(&mut job, &mut doc, &mut sel);
        let root = doc.tree.root().unwrap();
        assert_eq!(doc.tree.sub_components(root), &[node(&doc, "first"), a, b]);
        assert_eq!(sel.items(), vec![a, b]);
        assert!(!UnwrapJob::new(root).is_executable(&doc));
        assert!(!UnwrapJob::new(a).is_executable(&doc));
    }

    #[test]
    fn trim_makes_node_the_root() {
        let mut doc = doc();
        let ok = node(&doc, "ok");
        let mut job = TrimJob::new(ok);
        assert_reversible(&mut job, &mut doc, &mut Selection::new());
        assert_eq!(doc.tree.root(), Some(ok));
        assert_eq!(doc.tree.find("title"), None);
        assert!(!TrimJob::new(ok).is_executable(&doc));
    }
}
