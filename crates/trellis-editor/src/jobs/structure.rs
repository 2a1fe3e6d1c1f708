//! Insert, remove, move and restack single nodes.

use crate::job::{EditContext, Job, JobState, applied, release};
use std::collections::HashMap;
use trellis_core::{
    Cell, ChildPosition, Document, DocumentTree, Fragment, IdPolicy, NodeIndex, Symbol,
};

/// Where an inserted node lands in its slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    End,
    At(usize),
    /// Right after a sibling, resolved when the job runs.
    After(NodeIndex),
}

impl Placement {
    fn resolve(self, tree: &DocumentTree, parent: NodeIndex, slot: Symbol) -> Option<usize> {
        match self {
            Placement::End => Some(tree.children(parent, slot).len()),
            Placement::At(index) => Some(index),
            Placement::After(sibling) => {
                let pos = tree.position(sibling)?;
                (pos.parent == parent && pos.slot == slot).then_some(pos.index + 1)
            }
        }
    }
}

/// The cell a node gets in a grid slot, and whether it fits.
fn cell_fits(tree: &DocumentTree, parent: NodeIndex, slot: Symbol, cell: Option<Cell>) -> bool {
    if !tree.is_grid_slot(parent, slot) {
        return true;
    }
    tree.grid_dims(parent)
        .is_ok_and(|dims| dims.contains(cell.unwrap_or_default()))
}

// ─── Insert ──────────────────────────────────────────────────────────────

#[derive(Debug)]
enum Source {
    Node(NodeIndex),
    /// Built into the arena on first execute, then reused by redo.
    Fragment(Box<Fragment>),
}

/// Insert a node, or a copy of a fragment, as a sub-component of `parent`.
#[derive(Debug)]
pub struct InsertJob {
    source: Source,
    parent: NodeIndex,
    slot: Option<Symbol>,
    placement: Placement,
    cell: Option<Cell>,
    select: bool,
    inserted: Option<NodeIndex>,
    previous_cell: Option<Cell>,
}

impl InsertJob {
    /// Insert the detached `node` at the end of `parent`'s default slot.
    pub fn new(node: NodeIndex, parent: NodeIndex) -> Self {
        Self::with_source(Source::Node(node), parent)
    }

    /// Insert a fresh-id copy of `fragment`.
    pub fn from_fragment(fragment: Fragment, parent: NodeIndex) -> Self {
        Self::with_source(Source::Fragment(Box::new(fragment)), parent)
    }

    fn with_source(source: Source, parent: NodeIndex) -> Self {
        Self {
            source,
            parent,
            slot: None,
            placement: Placement::End,
            cell: None,
            select: true,
            inserted: None,
            previous_cell: None,
        }
    }

    pub fn in_slot(mut self, slot: Symbol) -> Self {
        self.slot = Some(slot);
        self
    }

    pub fn at(mut self, placement: Placement) -> Self {
        self.placement = placement;
        self
    }

    /// Override the grid cell of the inserted node.
    pub fn with_cell(mut self, cell: Cell) -> Self {
        self.cell = Some(cell);
        self
    }

    /// Whether executing selects the inserted node (default: yes).
    pub fn selecting(mut self, select: bool) -> Self {
        self.select = select;
        self
    }

    /// The node this job put into the tree, once it ran.
    pub fn inserted(&self) -> Option<NodeIndex> {
        self.inserted
    }

    fn target(&self, tree: &DocumentTree) -> Option<(Symbol, usize)> {
        let slot = self.slot.or_else(|| tree.default_slot(self.parent))?;
        let index = self.placement.resolve(tree, self.parent, slot)?;
        Some((slot, index))
    }
}

impl Job for InsertJob {
    fn is_executable(&self, document: &Document) -> bool {
        let tree = &document.tree;
        if !tree.is_attached(self.parent) {
            return false;
        }
        let Some((slot, index)) = self.target(tree) else {
            return false;
        };
        match &self.source {
            Source::Node(node) => {
                let cell = self.cell.or_else(|| tree.node(*node).and_then(|n| n.cell()));
                tree.check_insert(*node, self.parent, slot, index).is_ok()
                    && cell_fits(tree, self.parent, slot, cell)
            }
            Source::Fragment(fragment) => {
                index <= tree.children(self.parent, slot).len()
                    && tree.check_fragment(fragment).is_ok()
                    && tree
                        .check_accepts(self.parent, slot, fragment.type_name, 1)
                        .is_ok()
                    && cell_fits(tree, self.parent, slot, self.cell.or(fragment.cell))
            }
        }
    }

    fn execute(&mut self, cx: &mut EditContext<'_>) {
        let tree = &mut cx.document.tree;
        let (slot, index) = self
            .target(tree)
            .unwrap_or_else(|| panic!("insertion target of {:?} vanished", self.parent));
        let node = match (self.inserted, &self.source) {
            (Some(node), _) => node,
            (None, Source::Node(node)) => *node,
            (None, Source::Fragment(fragment)) => {
                applied(tree.import(fragment, IdPolicy::Fresh), "fragment import")
            }
        };
        self.previous_cell = tree.node(node).and_then(|n| n.cell());
        if let Some(cell) = self.cell {
            applied(tree.set_cell(node, Some(cell)), "cell override");
        }
        applied(tree.insert_as_child(node, self.parent, slot, index), "insert");
        self.inserted = Some(node);
        if self.select {
            cx.selection.select(node);
        }
    }

    fn undo(&mut self, cx: &mut EditContext<'_>) {
        let Some(node) = self.inserted else {
            panic!("undo of an insert that never ran");
        };
        let tree = &mut cx.document.tree;
        applied(tree.remove(node), "remove inserted node");
        applied(tree.set_cell(node, self.previous_cell), "cell restore");
    }

    fn description(&self) -> String {
        match &self.source {
            Source::Fragment(fragment) => format!("Insert {}", fragment.type_name),
            Source::Node(_) => "Insert".to_string(),
        }
    }

    fn dispose(&mut self, document: &mut Document, state: JobState) {
        if state != JobState::Applied
            && let Some(node) = self.inserted
        {
            release(document, node);
        }
    }
}

// ─── Remove ──────────────────────────────────────────────────────────────

#[derive(Debug)]
pub struct RemoveJob {
    node: NodeIndex,
    removed_from: Option<ChildPosition>,
}

impl RemoveJob {
    pub fn new(node: NodeIndex) -> Self {
        Self {
            node,
            removed_from: None,
        }
    }
}

impl Job for RemoveJob {
    fn is_executable(&self, document: &Document) -> bool {
        let tree = &document.tree;
        tree.is_attached(self.node) && tree.parent(self.node).is_some()
    }

    fn execute(&mut self, cx: &mut EditContext<'_>) {
        self.removed_from = Some(applied(cx.document.tree.remove(self.node), "remove"));
        cx.selection.retain_attached(&cx.document.tree);
    }

    fn undo(&mut self, cx: &mut EditContext<'_>) {
        let Some(pos) = self.removed_from else {
            panic!("undo of a remove that never ran");
        };
        applied(
            cx.document
                .tree
                .insert_as_child(self.node, pos.parent, pos.slot, pos.index),
            "reinsert",
        );
    }

    fn description(&self) -> String {
        "Remove".to_string()
    }

    fn dispose(&mut self, document: &mut Document, state: JobState) {
        if state == JobState::Applied {
            release(document, self.node);
        }
    }
}

// ─── Reparent ────────────────────────────────────────────────────────────

/// Move an attached node under another parent and select it.
#[derive(Debug)]
pub struct ReparentJob {
    node: NodeIndex,
    parent: NodeIndex,
    slot: Option<Symbol>,
    index: Option<usize>,
    old: Option<(ChildPosition, Option<Cell>)>,
}

impl ReparentJob {
    /// Move `node` to the end of `parent`'s default slot.
    pub fn new(node: NodeIndex, parent: NodeIndex) -> Self {
        Self {
            node,
            parent,
            slot: None,
            index: None,
            old: None,
        }
    }

    pub fn in_slot(mut self, slot: Symbol) -> Self {
        self.slot = Some(slot);
        self
    }

    /// Target index, counted after the node left its old place.
    pub fn at(mut self, index: usize) -> Self {
        self.index = Some(index);
        self
    }

    fn target(&self, tree: &DocumentTree) -> Option<(Symbol, usize)> {
        let slot = self.slot.or_else(|| tree.default_slot(self.parent))?;
        let pos = tree.position(self.node)?;
        let mut len = tree.children(self.parent, slot).len();
        if pos.parent == self.parent && pos.slot == slot {
            len -= 1;
        }
        Some((slot, self.index.unwrap_or(len)))
    }
}

impl Job for ReparentJob {
    fn is_executable(&self, document: &Document) -> bool {
        let tree = &document.tree;
        if !tree.is_attached(self.node) || !tree.is_attached(self.parent) {
            return false;
        }
        if self.node == self.parent || tree.is_ancestor_of(self.node, self.parent) {
            return false;
        }
        let (Some((slot, index)), Some(pos), Some(node)) =
            (self.target(tree), tree.position(self.node), tree.node(self.node))
        else {
            return false;
        };
        let same_slot = pos.parent == self.parent && pos.slot == slot;
        let mut len = tree.children(self.parent, slot).len();
        if same_slot {
            len -= 1;
        }
        index <= len
            && tree
                .check_accepts(self.parent, slot, node.type_name, usize::from(!same_slot))
                .is_ok()
            && cell_fits(tree, self.parent, slot, node.cell())
    }

    fn execute(&mut self, cx: &mut EditContext<'_>) {
        let tree = &mut cx.document.tree;
        let Some((slot, index)) = self.target(tree) else {
            panic!("reparent target of {:?} vanished", self.node);
        };
        let cell = tree.node(self.node).and_then(|n| n.cell());
        let old = applied(tree.reparent(self.node, self.parent, slot, index), "reparent");
        self.old = Some((old, cell));
        cx.selection.select(self.node);
    }

    fn undo(&mut self, cx: &mut EditContext<'_>) {
        let Some((old, cell)) = self.old else {
            panic!("undo of a reparent that never ran");
        };
        let tree = &mut cx.document.tree;
        applied(tree.remove(self.node), "detach moved node");
        applied(tree.set_cell(self.node, cell), "cell restore");
        applied(
            tree.insert_as_child(self.node, old.parent, old.slot, old.index),
            "reinsert",
        );
    }

    fn description(&self) -> String {
        "Move".to_string()
    }
}

// ─── Z-order ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZOrder {
    BringToFront,
    SendToBack,
    BringForward,
    SendBackward,
}

impl ZOrder {
    pub fn label(self) -> &'static str {
        match self {
            ZOrder::BringToFront => "Bring to Front",
            ZOrder::SendToBack => "Send to Back",
            ZOrder::BringForward => "Bring Forward",
            ZOrder::SendBackward => "Send Backward",
        }
    }
}

/// Restack nodes among their siblings. Selected siblings keep their
/// relative order and never jump over each other.
#[derive(Debug)]
pub struct ReorderJob {
    nodes: Vec<NodeIndex>,
    order: ZOrder,
    moves: Vec<(NodeIndex, usize)>,
}

impl ReorderJob {
    pub fn new(nodes: Vec<NodeIndex>, order: ZOrder) -> Self {
        Self {
            nodes,
            order,
            moves: Vec::new(),
        }
    }

    /// The sequence of `(node, new index)` moves, simulated on copies of
    /// the sibling lists. `None` when some node has no parent.
    fn plan(&self, tree: &DocumentTree) -> Option<Vec<(NodeIndex, usize)>> {
        type Key = (NodeIndex, Symbol);
        let mut lists: HashMap<Key, Vec<NodeIndex>> = HashMap::new();
        let mut queue = Vec::with_capacity(self.nodes.len());
        for &node in &self.nodes {
            let pos = tree.position(node)?;
            let key = (pos.parent, pos.slot);
            lists
                .entry(key)
                .or_insert_with(|| tree.children(pos.parent, pos.slot).to_vec());
            queue.push((pos.index, key, node));
        }
        queue.sort_by_key(|(index, ..)| *index);
        if matches!(self.order, ZOrder::SendToBack | ZOrder::BringForward) {
            queue.reverse();
        }

        let mut bounds: HashMap<Key, usize> = HashMap::new();
        let mut moves = Vec::new();
        for (_, key, node) in queue {
            let list = lists.get_mut(&key)?;
            let current = list.iter().position(|&n| n == node)?;
            let last = list.len() - 1;
            let target = match self.order {
                ZOrder::BringToFront => last,
                ZOrder::SendToBack => 0,
                ZOrder::BringForward => {
                    let bound = bounds.get(&key).copied().unwrap_or(last);
                    let target = (current + 1).min(bound).max(current);
                    bounds.insert(key, target.saturating_sub(1));
                    target
                }
                ZOrder::SendBackward => {
                    let bound = bounds.get(&key).copied().unwrap_or(0);
                    let target = current.saturating_sub(1).max(bound).min(current);
                    bounds.insert(key, target + 1);
                    target
                }
            };
            if target != current {
                list.remove(current);
                list.insert(target, node);
                moves.push((node, target));
            }
        }
        Some(moves)
    }
}

impl Job for ReorderJob {
    fn is_executable(&self, document: &Document) -> bool {
        !self.nodes.is_empty()
            && self
                .plan(&document.tree)
                .is_some_and(|moves| !moves.is_empty())
    }

    fn execute(&mut self, cx: &mut EditContext<'_>) {
        let tree = &mut cx.document.tree;
        let Some(plan) = self.plan(tree) else {
            panic!("restacked node lost its parent");
        };
        self.moves = plan
            .into_iter()
            .map(|(node, target)| {
                let old = applied(tree.move_within_siblings(node, target), "restack");
                (node, old)
            })
            .collect();
    }

    fn undo(&mut self, cx: &mut EditContext<'_>) {
        let tree = &mut cx.document.tree;
        for &(node, old) in self.moves.iter().rev() {
            applied(tree.move_within_siblings(node, old), "restack undo");
        }
    }

    fn description(&self) -> String {
        self.order.label().to_string()
    }
}
