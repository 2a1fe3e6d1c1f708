//! The live selection.
//!
//! A selection holds at most one group: either a set of objects (nodes) or a
//! set of row/column indices of one grid container. Selecting one kind
//! replaces the other.

use indexmap::IndexSet;
use std::collections::{BTreeSet, HashMap};
use trellis_core::{DocumentTree, GridAxis, NodeIndex};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionGroup {
    /// Selected nodes in selection order. `anchor` is the last one touched.
    Objects {
        items: IndexSet<NodeIndex>,
        anchor: NodeIndex,
    },
    /// Selected rows or columns of `grid`.
    Grid {
        grid: NodeIndex,
        axis: GridAxis,
        indices: BTreeSet<u32>,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    group: Option<SelectionGroup>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn group(&self) -> Option<&SelectionGroup> {
        self.group.as_ref()
    }

    pub fn is_empty(&self) -> bool {
        self.group.is_none()
    }

    pub fn clear(&mut self) {
        self.group = None;
    }

    // ─── Objects ─────────────────────────────────────────────────────────

    pub fn select(&mut self, node: NodeIndex) {
        self.select_all([node]);
    }

    /// Select `nodes`; the last one becomes the anchor. An empty iterator
    /// clears the selection.
    pub fn select_all(&mut self, nodes: impl IntoIterator<Item = NodeIndex>) {
        let items: IndexSet<NodeIndex> = nodes.into_iter().collect();
        self.group = items.last().copied().map(|anchor| SelectionGroup::Objects { items, anchor });
    }

    /// Add `node` to an object selection, or remove it when already there.
    pub fn toggle(&mut self, node: NodeIndex) {
        match &mut self.group {
            Some(SelectionGroup::Objects { items, anchor }) => {
                if items.shift_remove(&node) {
                    match items.last() {
                        Some(&last) => {
                            if *anchor == node {
                                *anchor = last;
                            }
                        }
                        None => self.group = None,
                    }
                } else {
                    items.insert(node);
                    *anchor = node;
                }
            }
            _ => self.select(node),
        }
    }

    pub fn is_selected(&self, node: NodeIndex) -> bool {
        matches!(&self.group, Some(SelectionGroup::Objects { items, .. }) if items.contains(&node))
    }

    pub fn anchor(&self) -> Option<NodeIndex> {
        match &self.group {
            Some(SelectionGroup::Objects { anchor, .. }) => Some(*anchor),
            _ => None,
        }
    }

    /// Selected nodes in selection order; empty for grid groups.
    pub fn items(&self) -> Vec<NodeIndex> {
        match &self.group {
            Some(SelectionGroup::Objects { items, .. }) => items.iter().copied().collect(),
            _ => Vec::new(),
        }
    }

    /// Selected nodes in document order.
    pub fn sorted_items(&self, tree: &DocumentTree) -> Vec<NodeIndex> {
        let Some(SelectionGroup::Objects { items, .. }) = &self.group else {
            return Vec::new();
        };
        tree.document_order()
            .into_iter()
            .filter(|n| items.contains(n))
            .collect()
    }

    // ─── Grid tracks ─────────────────────────────────────────────────────

    pub fn select_grid(&mut self, grid: NodeIndex, axis: GridAxis, index: u32) {
        self.group = Some(SelectionGroup::Grid {
            grid,
            axis,
            indices: BTreeSet::from([index]),
        });
    }

    /// Select several tracks of one grid; an empty set clears the selection.
    pub fn select_grid_tracks(
        &mut self,
        grid: NodeIndex,
        axis: GridAxis,
        indices: impl IntoIterator<Item = u32>,
    ) {
        let indices: BTreeSet<u32> = indices.into_iter().collect();
        self.group = (!indices.is_empty()).then_some(SelectionGroup::Grid {
            grid,
            axis,
            indices,
        });
    }

    /// Add or remove a track. A different grid or axis starts a new group;
    /// removing the last index empties the selection.
    pub fn toggle_grid(&mut self, grid: NodeIndex, axis: GridAxis, index: u32) {
        match &mut self.group {
            Some(SelectionGroup::Grid {
                grid: g,
                axis: a,
                indices,
            }) if *g == grid && *a == axis => {
                if !indices.remove(&index) {
                    indices.insert(index);
                } else if indices.is_empty() {
                    self.group = None;
                }
            }
            _ => self.select_grid(grid, axis, index),
        }
    }

    // ─── Ancestry ────────────────────────────────────────────────────────

    /// Common ancestor of the selection.
    ///
    /// * one node: its parent;
    /// * several nodes: the nearest node that is, or contains, every member;
    /// * the root among the members, or no selection: `None`;
    /// * grid group: the grid.
    pub fn ancestor(&self, tree: &DocumentTree) -> Option<NodeIndex> {
        match self.group.as_ref()? {
            SelectionGroup::Grid { grid, .. } => Some(*grid),
            SelectionGroup::Objects { items, .. } => {
                if tree.root().is_some_and(|r| items.contains(&r)) {
                    return None;
                }
                let mut members = items.iter().copied();
                let first = members.next()?;
                if items.len() == 1 {
                    return tree.parent(first);
                }
                // Inclusive ancestor chain of the first node, nearest first.
                let chain: Vec<NodeIndex> = std::iter::once(first).chain(tree.ancestors(first)).collect();
                let depth: HashMap<NodeIndex, usize> =
                    chain.iter().enumerate().map(|(i, n)| (*n, i)).collect();
                let mut highest = 0;
                for node in members {
                    let hit = std::iter::once(node)
                        .chain(tree.ancestors(node))
                        .find_map(|a| depth.get(&a).copied())?;
                    highest = highest.max(hit);
                }
                Some(chain[highest])
            }
        }
    }

    /// Drop selected nodes that are no longer reachable from the root.
    pub fn retain_attached(&mut self, tree: &DocumentTree) {
        match &mut self.group {
            Some(SelectionGroup::Objects { items, anchor }) => {
                items.retain(|n| tree.is_attached(*n));
                match items.last() {
                    Some(&last) if !items.contains(anchor) => *anchor = last,
                    Some(_) => {}
                    None => self.group = None,
                }
            }
            Some(SelectionGroup::Grid { grid, axis, indices }) => {
                let len = tree.grid_dims(*grid).map_or(0, |d| d.len(*axis));
                indices.retain(|i| *i < len);
                if !tree.is_attached(*grid) || indices.is_empty() {
                    self.group = None;
                }
            }
            None => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::sync::Arc;
    use trellis_core::{Symbol, TypeRegistry};

    /// root(VBox) ─ a(HBox) ─ a1(Button), a2(Button)
    ///           └ b(Label)
    struct Fixture {
        tree: DocumentTree,
        root: NodeIndex,
        a: NodeIndex,
        a1: NodeIndex,
        a2: NodeIndex,
        b: NodeIndex,
    }

    fn fixture() -> Fixture {
        let children = Symbol::intern("children");
        let mut tree = DocumentTree::new(Arc::new(TypeRegistry::builtin()));
        let root = tree.create("VBox").unwrap();
        tree.set_root(Some(root)).unwrap();
        let a = tree.create("HBox").unwrap();
        let b = tree.create("Label").unwrap();
        let a1 = tree.create("Button").unwrap();
        let a2 = tree.create("Button").unwrap();
        tree.insert_as_child(a, root, children, 0).unwrap();
        tree.insert_as_child(b, root, children, 1).unwrap();
        tree.insert_as_child(a1, a, children, 0).unwrap();
        tree.insert_as_child(a2, a, children, 1).unwrap();
        Fixture {
            tree,
            root,
            a,
            a1,
            a2,
            b,
        }
    }

    #[test]
    fn select_replaces_and_sets_anchor() {
        let f = fixture();
        let mut sel = Selection::new();
        sel.select_all([f.a1, f.b]);
        assert_eq!(sel.anchor(), Some(f.b));
        sel.select(f.a2);
        assert_eq!(sel.items(), vec![f.a2]);
        assert!(sel.is_selected(f.a2));
        assert!(!sel.is_selected(f.a1));
    }

    #[test]
    fn toggle_object_removes_and_empties() {
        let f = fixture();
        let mut sel = Selection::new();
        sel.select(f.a1);
        sel.toggle(f.a2);
        assert_eq!(sel.anchor(), Some(f.a2));
        sel.toggle(f.a2);
        assert_eq!(sel.anchor(), Some(f.a1));
        sel.toggle(f.a1);
        assert!(sel.is_empty());
    }

    #[test]
    fn single_node_ancestor_is_parent() {
        let f = fixture();
        let mut sel = Selection::new();
        sel.select(f.a1);
        assert_eq!(sel.ancestor(&f.tree), Some(f.a));
        sel.select(f.b);
        assert_eq!(sel.ancestor(&f.tree), Some(f.root));
    }

    #[test]
    fn ancestor_of_nested_pair_is_outer_node() {
        let f = fixture();
        let mut sel = Selection::new();
        sel.select_all([f.a, f.a1]);
        assert_eq!(sel.ancestor(&f.tree), Some(f.a));
        sel.select_all([f.a2, f.a]);
        assert_eq!(sel.ancestor(&f.tree), Some(f.a));
    }

    #[test]
    fn ancestor_of_cousins_is_root() {
        let f = fixture();
        let mut sel = Selection::new();
        sel.select_all([f.a1, f.b]);
        assert_eq!(sel.ancestor(&f.tree), Some(f.root));
        sel.select_all([f.a1, f.a2]);
        assert_eq!(sel.ancestor(&f.tree), Some(f.a));
    }

    #[test]
    fn ancestor_is_none_with_root_or_empty() {
        let f = fixture();
        let mut sel = Selection::new();
        assert_eq!(sel.ancestor(&f.tree), None);
        sel.select_all([f.root, f.b]);
        assert_eq!(sel.ancestor(&f.tree), None);
    }

    #[test]
    fn grid_toggle_and_switch_kind() {
        let f = fixture();
        let mut sel = Selection::new();
        sel.select(f.a1);
        sel.select_grid(f.a, GridAxis::Column, 0);
        assert!(!sel.is_selected(f.a1));
        sel.toggle_grid(f.a, GridAxis::Column, 2);
        assert_eq!(
            sel.group(),
            Some(&SelectionGroup::Grid {
                grid: f.a,
                axis: GridAxis::Column,
                indices: BTreeSet::from([0, 2]),
            })
        );
        sel.toggle_grid(f.a, GridAxis::Column, 0);
        sel.toggle_grid(f.a, GridAxis::Column, 2);
        assert!(sel.is_empty());
        sel.select_grid(f.a, GridAxis::Row, 1);
        assert_eq!(sel.ancestor(&f.tree), Some(f.a));
    }

    #[test]
    fn sorted_items_follow_document_order() {
        let f = fixture();
        let mut sel = Selection::new();
        sel.select_all([f.b, f.a2, f.a]);
        assert_eq!(sel.sorted_items(&f.tree), vec![f.a, f.a2, f.b]);
    }

    #[test]
    fn retain_attached_drops_detached_nodes() {
        let mut f = fixture();
        let mut sel = Selection::new();
        sel.select_all([f.a1, f.b]);
        f.tree.remove(f.b).unwrap();
        sel.retain_attached(&f.tree);
        assert_eq!(sel.items(), vec![f.a1]);
        assert_eq!(sel.anchor(), Some(f.a1));
    }
}
