//! The mutable document tree and its structural primitives.
//!
//! Nodes are stored in a `StableDiGraph` arena. Containment edges go from
//! parent → child and carry the slot name, so the parent back-reference of a
//! node is simply its single incoming edge. The ordered child lists live on
//! the parent node; both views are updated together by the primitives below
//! and nowhere else.
//!
//! A node detached from its parent stays in the arena as an independent
//! subtree root until it is re-inserted or explicitly `destroy`ed.
//!
//! Every mutating primitive runs inside an `UpdateGuard`. Starting a second
//! update while one is active is a programming error and panics.

use crate::error::TreeError;
use crate::id::Symbol;
use crate::model::{Cell, ChildPosition, Fragment, Node, PropertyValue};
use crate::schema::{TypeDef, TypeRegistry};
use petgraph::Direction;
use petgraph::graph::NodeIndex;
use petgraph::stable_graph::StableDiGraph;
use petgraph::visit::EdgeRef;
use std::collections::HashSet;
use std::ops::{Deref, DerefMut};
use std::sync::Arc;

/// How `import` names the nodes it creates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdPolicy {
    /// Keep the ids stored in the fragment.
    Keep,
    /// Generate new ids (paste, duplicate, library instantiation).
    Fresh,
}

/// A broken structural invariant, as reported by `check_invariants`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvariantViolation {
    pub node: NodeIndex,
    pub message: String,
}

#[derive(Debug, Clone)]
pub struct DocumentTree {
    graph: StableDiGraph<Node, Symbol>,
    root: Option<NodeIndex>,
    types: Arc<TypeRegistry>,
    updating: bool,
}

/// Scoped "update in progress" flag. Cleared on drop, including unwinding.
pub struct UpdateGuard<'a> {
    tree: &'a mut DocumentTree,
}

impl Deref for UpdateGuard<'_> {
    type Target = DocumentTree;

    fn deref(&self) -> &DocumentTree {
        self.tree
    }
}

impl DerefMut for UpdateGuard<'_> {
    fn deref_mut(&mut self) -> &mut DocumentTree {
        self.tree
    }
}

impl Drop for UpdateGuard<'_> {
    fn drop(&mut self) {
        self.tree.updating = false;
    }
}

impl DocumentTree {
    /// An empty tree (no root) resolving types through `types`.
    pub fn new(types: Arc<TypeRegistry>) -> Self {
        Self {
            graph: StableDiGraph::new(),
            root: None,
            types,
            updating: false,
        }
    }

    /// Enter the update scope.
    ///
    /// # Panics
    /// When an update is already in progress on this tree.
    pub fn begin_update(&mut self) -> UpdateGuard<'_> {
        assert!(
            !self.updating,
            "nested structural mutation: an update is already in progress"
        );
        self.updating = true;
        UpdateGuard { tree: self }
    }

    pub fn is_update_in_progress(&self) -> bool {
        self.updating
    }

    // ─── Queries ─────────────────────────────────────────────────────────

    pub fn types(&self) -> &Arc<TypeRegistry> {
        &self.types
    }

    pub fn root(&self) -> Option<NodeIndex> {
        self.root
    }

    pub fn node(&self, idx: NodeIndex) -> Option<&Node> {
        self.graph.node_weight(idx)
    }

    /// Number of nodes in the arena, detached subtrees included.
    pub fn arena_len(&self) -> usize {
        self.graph.node_count()
    }

    pub fn type_def(&self, idx: NodeIndex) -> Option<&TypeDef> {
        self.node(idx).and_then(|n| self.types.get(n.type_name))
    }

    pub fn parent(&self, idx: NodeIndex) -> Option<NodeIndex> {
        self.graph.neighbors_directed(idx, Direction::Incoming).next()
    }

    /// Parent, slot and index of `idx`, or `None` for roots and detached nodes.
    pub fn position(&self, idx: NodeIndex) -> Option<ChildPosition> {
        let edge = self.graph.edges_directed(idx, Direction::Incoming).next()?;
        let parent = edge.source();
        let slot = *edge.weight();
        let index = self.graph[parent]
            .children(slot)
            .iter()
            .position(|&c| c == idx)?;
        Some(ChildPosition {
            parent,
            slot,
            index,
        })
    }

    pub fn children(&self, idx: NodeIndex, slot: Symbol) -> &[NodeIndex] {
        self.node(idx).map_or(&[], |n| n.children(slot))
    }

    /// Name of the default sub-component slot of `idx`, if its type has one.
    pub fn default_slot(&self, idx: NodeIndex) -> Option<Symbol> {
        self.type_def(idx)
            .and_then(TypeDef::default_slot)
            .map(|s| s.name)
    }

    /// Children held in the default sub-component slot.
    pub fn sub_components(&self, idx: NodeIndex) -> &[NodeIndex] {
        match self.default_slot(idx) {
            Some(slot) => self.children(idx, slot),
            None => &[],
        }
    }

    /// Strict ancestors of `idx`, nearest first.
    pub fn ancestors(&self, idx: NodeIndex) -> impl Iterator<Item = NodeIndex> + '_ {
        std::iter::successors(self.parent(idx), move |&p| self.parent(p))
    }

    /// True when `ancestor` is a strict ancestor of `descendant`.
    pub fn is_ancestor_of(&self, ancestor: NodeIndex, descendant: NodeIndex) -> bool {
        self.ancestors(descendant).any(|a| a == ancestor)
    }

    /// True when `idx` is reachable from the root.
    pub fn is_attached(&self, idx: NodeIndex) -> bool {
        match self.root {
            Some(root) => idx == root || self.is_ancestor_of(root, idx),
            None => false,
        }
    }

    /// `idx` and its descendants, depth-first in document order.
    pub fn subtree(&self, idx: NodeIndex) -> Vec<NodeIndex> {
        let mut out = Vec::new();
        let mut stack = vec![idx];
        while let Some(current) = stack.pop() {
            let Some(node) = self.node(current) else {
                continue;
            };
            out.push(current);
            for children in node.components.values().rev() {
                stack.extend(children.iter().rev());
            }
        }
        out
    }

    /// Every attached node in document order.
    pub fn document_order(&self) -> Vec<NodeIndex> {
        self.root.map(|r| self.subtree(r)).unwrap_or_default()
    }

    /// Find an attached node by id.
    pub fn find(&self, id: impl Into<Symbol>) -> Option<NodeIndex> {
        let id = id.into();
        self.document_order()
            .into_iter()
            .find(|&idx| self.graph[idx].id == id)
    }

    // ─── Probes ──────────────────────────────────────────────────────────

    /// Check that `parent` accepts `added` more children of `child_type` in
    /// `slot`. Pure; used by job checks before any node exists.
    pub fn check_accepts(
        &self,
        parent: NodeIndex,
        slot: Symbol,
        child_type: Symbol,
        added: usize,
    ) -> Result<(), TreeError> {
        let pnode = self.node(parent).ok_or(TreeError::MissingNode)?;
        let def = self
            .types
            .get(pnode.type_name)
            .ok_or(TreeError::UnknownType(pnode.type_name))?;
        let slot_def = def.slot(slot).ok_or_else(|| {
            TreeError::invalid(format!("`{}` has no slot `{slot}`", pnode.type_name))
        })?;
        if !slot_def.accepts.admits(child_type) {
            return Err(TreeError::invalid(format!(
                "`{}`.{slot} does not accept `{child_type}`",
                pnode.type_name
            )));
        }
        if let Some(cap) = slot_def.capacity
            && pnode.children(slot).len() + added > cap
        {
            return Err(TreeError::invalid(format!(
                "`{}`.{slot} holds at most {cap} children",
                pnode.type_name
            )));
        }
        if slot_def.grid && pnode.grid.is_none_or(|d| d.rows == 0 || d.columns == 0) {
            return Err(TreeError::invalid(format!(
                "grid `{}` has no cells",
                pnode.id
            )));
        }
        Ok(())
    }

    /// Check that `insert_as_child(node, parent, slot, index)` would succeed.
    pub fn check_insert(
        &self,
        node: NodeIndex,
        parent: NodeIndex,
        slot: Symbol,
        index: usize,
    ) -> Result<(), TreeError> {
        let child = self.node(node).ok_or(TreeError::MissingNode)?;
        if self.parent(node).is_some() || self.root == Some(node) {
            return Err(TreeError::invalid("node is already in the tree"));
        }
        if node == parent || self.is_ancestor_of(node, parent) {
            return Err(TreeError::invalid("insertion would create a cycle"));
        }
        self.check_accepts(parent, slot, child.type_name, 1)?;
        let len = self.graph[parent].children(slot).len();
        if index > len {
            return Err(TreeError::IndexOutOfRange { index, len });
        }
        if self.is_grid_slot(parent, slot)
            && let Some(cell) = child.cell
            && let Some(dims) = self.graph[parent].grid
            && !dims.contains(cell)
        {
            return Err(TreeError::invalid(format!(
                "cell ({}, {}) is outside the grid",
                cell.row, cell.column
            )));
        }
        Ok(())
    }

    pub fn is_grid_slot(&self, parent: NodeIndex, slot: Symbol) -> bool {
        self.type_def(parent)
            .and_then(|d| d.slot(slot))
            .is_some_and(|s| s.grid)
    }

    // ─── Creation & destruction ──────────────────────────────────────────

    /// Create a detached node of `type_name` with a fresh id.
    pub fn create(&mut self, type_name: impl Into<Symbol>) -> Result<NodeIndex, TreeError> {
        let type_name = type_name.into();
        let def = self
            .types
            .get(type_name)
            .ok_or(TreeError::UnknownType(type_name))?;
        let mut node = Node::new(Symbol::fresh(type_name), type_name);
        node.grid = def.grid;
        let mut tx = self.begin_update();
        Ok(tx.graph.add_node(node))
    }

    /// Build a detached copy of `fragment` in this arena.
    ///
    /// The whole fragment is validated against the type schema before any
    /// node is created.
    pub fn import(&mut self, fragment: &Fragment, ids: IdPolicy) -> Result<NodeIndex, TreeError> {
        self.check_fragment(fragment)?;
        let mut tx = self.begin_update();
        Ok(tx.raw_import(fragment, ids))
    }

    /// Check that `frag` would import cleanly: known types, well-typed
    /// properties, and children the slots admit.
    pub fn check_fragment(&self, frag: &Fragment) -> Result<(), TreeError> {
        let def = self
            .types
            .get(frag.type_name)
            .ok_or(TreeError::UnknownType(frag.type_name))?;
        for (name, value) in &frag.properties {
            self.check_property(frag.type_name, *name, value)?;
        }
        for (slot, children) in &frag.components {
            let slot_def = def.slot(*slot).ok_or_else(|| {
                TreeError::invalid(format!("`{}` has no slot `{slot}`", frag.type_name))
            })?;
            if slot_def.capacity.is_some_and(|cap| children.len() > cap) {
                return Err(TreeError::invalid(format!(
                    "too many children in `{}`.{slot}",
                    frag.type_name
                )));
            }
            for child in children {
                if !slot_def.accepts.admits(child.type_name) {
                    return Err(TreeError::invalid(format!(
                        "`{}`.{slot} does not accept `{}`",
                        frag.type_name, child.type_name
                    )));
                }
                if slot_def.grid {
                    let dims = frag.grid.or(def.grid).unwrap_or_default();
                    if !dims.contains(child.cell.unwrap_or_default()) {
                        return Err(TreeError::invalid(format!(
                            "`{}` lies outside grid `{}`",
                            child.id, frag.id
                        )));
                    }
                }
                self.check_fragment(child)?;
            }
        }
        Ok(())
    }

    fn raw_import(&mut self, frag: &Fragment, ids: IdPolicy) -> NodeIndex {
        let id = match ids {
            IdPolicy::Keep => frag.id,
            IdPolicy::Fresh => Symbol::fresh(frag.type_name),
        };
        let mut node = Node::new(id, frag.type_name);
        node.properties = frag.properties.clone();
        node.cell = frag.cell;
        node.grid = frag.grid.or_else(|| self.types.get(frag.type_name).and_then(|d| d.grid));
        let idx = self.graph.add_node(node);
        for (slot, children) in &frag.components {
            for child in children {
                let cidx = self.raw_import(child, ids);
                self.raw_attach(cidx, idx, *slot, usize::MAX);
            }
        }
        idx
    }

    /// Owned copy of the subtree rooted at `idx`.
    pub fn export(&self, idx: NodeIndex) -> Option<Fragment> {
        let node = self.node(idx)?;
        let mut frag = Fragment::new(node.id, node.type_name);
        frag.properties = node.properties.clone();
        frag.cell = node.cell;
        frag.grid = node.grid;
        for (slot, children) in &node.components {
            let copies = children.iter().filter_map(|&c| self.export(c)).collect();
            frag.components.insert(*slot, copies);
        }
        Some(frag)
    }

    /// Snapshot of the whole attached tree, for structural comparison.
    pub fn snapshot(&self) -> Option<Fragment> {
        self.root.and_then(|r| self.export(r))
    }

    /// Free a detached subtree.
    pub fn destroy(&mut self, idx: NodeIndex) -> Result<(), TreeError> {
        if self.node(idx).is_none() {
            return Err(TreeError::MissingNode);
        }
        if self.parent(idx).is_some() || self.root == Some(idx) {
            return Err(TreeError::invalid("only detached subtrees can be destroyed"));
        }
        let doomed = self.subtree(idx);
        let mut tx = self.begin_update();
        for n in doomed {
            tx.graph.remove_node(n);
        }
        log::trace!("destroyed detached subtree {idx:?}");
        Ok(())
    }

    /// Install a detached node as the root. The previous root, if any,
    /// becomes a detached subtree and is returned.
    pub fn set_root(&mut self, idx: Option<NodeIndex>) -> Result<Option<NodeIndex>, TreeError> {
        if let Some(n) = idx {
            if self.node(n).is_none() {
                return Err(TreeError::MissingNode);
            }
            if self.parent(n).is_some() {
                return Err(TreeError::invalid("new root must be detached"));
            }
        }
        let mut tx = self.begin_update();
        Ok(std::mem::replace(&mut tx.root, idx))
    }

    // ─── Structural primitives ───────────────────────────────────────────

    /// Insert the detached `node` at `index` of `parent`'s `slot`.
    ///
    /// Grid slots give a cell-less node the cell `(0, 0)`.
    pub fn insert_as_child(
        &mut self,
        node: NodeIndex,
        parent: NodeIndex,
        slot: Symbol,
        index: usize,
    ) -> Result<(), TreeError> {
        self.check_insert(node, parent, slot, index)?;
        let grid = self.is_grid_slot(parent, slot);
        let mut tx = self.begin_update();
        if grid && tx.graph[node].cell.is_none() {
            tx.graph[node].cell = Some(Cell::default());
        }
        tx.raw_attach(node, parent, slot, index);
        log::trace!("inserted {node:?} into {parent:?}.{slot}[{index}]");
        Ok(())
    }

    /// Detach `node` (and its subtree) from its parent.
    pub fn remove(&mut self, node: NodeIndex) -> Result<ChildPosition, TreeError> {
        if self.node(node).is_none() {
            return Err(TreeError::MissingNode);
        }
        let pos = self
            .position(node)
            .ok_or_else(|| TreeError::invalid("node has no parent"))?;
        let mut tx = self.begin_update();
        tx.raw_detach(node, pos);
        log::trace!("removed {node:?} from {:?}.{}[{}]", pos.parent, pos.slot, pos.index);
        Ok(pos)
    }

    /// Move `node` under `new_parent`. All-or-nothing: on failure the node is
    /// back at its original position. `index` is interpreted after removal.
    pub fn reparent(
        &mut self,
        node: NodeIndex,
        new_parent: NodeIndex,
        slot: Symbol,
        index: usize,
    ) -> Result<ChildPosition, TreeError> {
        let old = self.remove(node)?;
        match self.insert_as_child(node, new_parent, slot, index) {
            Ok(()) => Ok(old),
            Err(err) => {
                let mut tx = self.begin_update();
                tx.raw_attach(node, old.parent, old.slot, old.index);
                Err(err)
            }
        }
    }

    /// Move `node` to `new_index` among its siblings; returns the old index.
    pub fn move_within_siblings(
        &mut self,
        node: NodeIndex,
        new_index: usize,
    ) -> Result<usize, TreeError> {
        let pos = self
            .position(node)
            .ok_or_else(|| TreeError::invalid("node has no parent"))?;
        let len = self.graph[pos.parent].children(pos.slot).len();
        if new_index >= len {
            return Err(TreeError::IndexOutOfRange {
                index: new_index,
                len,
            });
        }
        let mut tx = self.begin_update();
        if let Some(siblings) = tx.graph[pos.parent].components.get_mut(&pos.slot) {
            let moved = siblings.remove(pos.index);
            siblings.insert(new_index, moved);
        }
        Ok(pos.index)
    }

    /// Check that `node` may hold `value` under `name`.
    pub fn check_property_value(
        &self,
        node: NodeIndex,
        name: Symbol,
        value: &PropertyValue,
    ) -> Result<(), TreeError> {
        let type_name = self.node(node).ok_or(TreeError::MissingNode)?.type_name;
        self.check_property(type_name, name, value)
    }

    fn check_property(
        &self,
        type_name: Symbol,
        name: Symbol,
        value: &PropertyValue,
    ) -> Result<(), TreeError> {
        let kind = self
            .types
            .property_kind(type_name, name)
            .ok_or(TreeError::UnknownProperty {
                type_name,
                property: name,
            })?;
        if !kind.admits(value) {
            return Err(TreeError::PropertyTypeMismatch {
                type_name,
                property: name,
                expected: kind.name(),
            });
        }
        Ok(())
    }

    /// Set a property, type-checked against the node's schema. Returns the
    /// previous value.
    pub fn set_property(
        &mut self,
        node: NodeIndex,
        name: impl Into<Symbol>,
        value: PropertyValue,
    ) -> Result<Option<PropertyValue>, TreeError> {
        let name = name.into();
        let type_name = self.node(node).ok_or(TreeError::MissingNode)?.type_name;
        self.check_property(type_name, name, &value)?;
        let mut tx = self.begin_update();
        Ok(tx.graph[node].properties.insert(name, value))
    }

    /// Remove a property. Returns its former position and value.
    pub fn unset_property(
        &mut self,
        node: NodeIndex,
        name: impl Into<Symbol>,
    ) -> Result<Option<(usize, PropertyValue)>, TreeError> {
        let name = name.into();
        if self.node(node).is_none() {
            return Err(TreeError::MissingNode);
        }
        let mut tx = self.begin_update();
        Ok(tx.graph[node]
            .properties
            .shift_remove_full(&name)
            .map(|(i, _, v)| (i, v)))
    }

    /// Put a property back exactly as it was: at `index` with `value`, or
    /// absent when `previous` is `None`.
    pub fn restore_property(
        &mut self,
        node: NodeIndex,
        name: impl Into<Symbol>,
        previous: Option<(usize, PropertyValue)>,
    ) -> Result<(), TreeError> {
        let name = name.into();
        if self.node(node).is_none() {
            return Err(TreeError::MissingNode);
        }
        let mut tx = self.begin_update();
        let props = &mut tx.graph[node].properties;
        props.shift_remove(&name);
        if let Some((index, value)) = previous {
            let index = index.min(props.len());
            props.shift_insert(index, name, value);
        }
        Ok(())
    }

    /// Change the grid cell of a node. Bounds are checked when the node sits
    /// in a grid slot. Returns the previous cell.
    pub fn set_cell(&mut self, node: NodeIndex, cell: Option<Cell>) -> Result<Option<Cell>, TreeError> {
        if self.node(node).is_none() {
            return Err(TreeError::MissingNode);
        }
        if let Some(pos) = self.position(node)
            && self.is_grid_slot(pos.parent, pos.slot)
        {
            let dims = self.graph[pos.parent].grid.unwrap_or_default();
            if !cell.is_some_and(|c| dims.contains(c)) {
                return Err(TreeError::invalid("grid children need a cell inside the grid"));
            }
        }
        let mut tx = self.begin_update();
        Ok(std::mem::replace(&mut tx.graph[node].cell, cell))
    }

    // ─── Raw helpers (caller holds the guard) ────────────────────────────

    pub(crate) fn graph_mut(&mut self) -> &mut StableDiGraph<Node, Symbol> {
        &mut self.graph
    }

    pub(crate) fn raw_attach(&mut self, node: NodeIndex, parent: NodeIndex, slot: Symbol, index: usize) {
        let list = self.graph[parent].components.entry(slot).or_default();
        let index = index.min(list.len());
        list.insert(index, node);
        self.graph.add_edge(parent, node, slot);
    }

    fn raw_detach(&mut self, node: NodeIndex, pos: ChildPosition) {
        if let Some(list) = self.graph[pos.parent].components.get_mut(&pos.slot) {
            list.remove(pos.index);
            if list.is_empty() {
                self.graph[pos.parent].components.shift_remove(&pos.slot);
            }
        }
        if let Some(edge) = self.graph.find_edge(pos.parent, node) {
            self.graph.remove_edge(edge);
        }
    }

    // ─── Invariants ──────────────────────────────────────────────────────

    /// Check the structural invariants of the attached tree.
    pub fn check_invariants(&self) -> Vec<InvariantViolation> {
        let mut out = Vec::new();
        let Some(root) = self.root else {
            return out;
        };
        let mut report = |node, message: String| out.push(InvariantViolation { node, message });
        if self.parent(root).is_some() {
            report(root, "root has a parent".into());
        }
        let mut seen = HashSet::new();
        let mut stack = vec![root];
        while let Some(idx) = stack.pop() {
            if !seen.insert(idx) {
                report(idx, "node appears twice in the tree".into());
                continue;
            }
            let node = &self.graph[idx];
            let Some(def) = self.types.get(node.type_name) else {
                report(idx, format!("unknown type `{}`", node.type_name));
                continue;
            };
            for (slot, children) in &node.components {
                let Some(slot_def) = def.slot(*slot) else {
                    report(idx, format!("`{}` has no slot `{slot}`", node.type_name));
                    continue;
                };
                if slot_def.capacity.is_some_and(|cap| children.len() > cap) {
                    report(idx, format!("slot `{slot}` over capacity"));
                }
                for &child in children {
                    if self.parent(child) != Some(idx) {
                        report(child, "child list and parent edge disagree".into());
                    }
                    let cnode = &self.graph[child];
                    if !slot_def.accepts.admits(cnode.type_name) {
                        report(child, format!("`{slot}` does not accept `{}`", cnode.type_name));
                    }
                    if slot_def.grid {
                        let dims = node.grid.unwrap_or_default();
                        if !cnode.cell.is_some_and(|c| dims.contains(c)) {
                            report(child, "grid child outside the grid".into());
                        }
                    }
                    stack.push(child);
                }
            }
            for (name, value) in &node.properties {
                if let Err(err) = self.check_property(node.type_name, *name, value) {
                    report(idx, err.to_string());
                }
            }
        }
        out
    }
}
