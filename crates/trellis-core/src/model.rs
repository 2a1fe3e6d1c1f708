//! Node data model for Trellis documents.
//!
//! A document is a tree of typed component nodes. Each node carries an
//! ordered property map and a set of named component slots holding its
//! children. Children of grid slots additionally carry a `Cell`.
//!
//! Nodes live in the arena of a `DocumentTree`; a `Fragment` is the owned,
//! arena-independent copy of a subtree used to move content between
//! documents (clipboard, library items, text format).

use crate::id::Symbol;
use indexmap::IndexMap;
use petgraph::graph::NodeIndex;
use serde::{Deserialize, Serialize};

// ─── Property values ─────────────────────────────────────────────────────

/// A scalar or nested-object property value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PropertyValue {
    Bool(bool),
    Integer(i64),
    Float(f64),
    Text(String),
    /// Key into the document's resource bundle (`%key` in the source format).
    Localized(String),
    Object(IndexMap<Symbol, PropertyValue>),
}

impl PropertyValue {
    /// Short name of the value's kind, used in diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            PropertyValue::Bool(_) => "bool",
            PropertyValue::Integer(_) => "integer",
            PropertyValue::Float(_) => "float",
            PropertyValue::Text(_) => "text",
            PropertyValue::Localized(_) => "localized text",
            PropertyValue::Object(_) => "object",
        }
    }
}

impl From<bool> for PropertyValue {
    fn from(v: bool) -> Self {
        PropertyValue::Bool(v)
    }
}

impl From<i64> for PropertyValue {
    fn from(v: i64) -> Self {
        PropertyValue::Integer(v)
    }
}

impl From<f64> for PropertyValue {
    fn from(v: f64) -> Self {
        PropertyValue::Float(v)
    }
}

impl From<&str> for PropertyValue {
    fn from(v: &str) -> Self {
        PropertyValue::Text(v.to_string())
    }
}

// ─── Grid coordinates ────────────────────────────────────────────────────

/// Discriminates rows from columns wherever grid tracks are addressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GridAxis {
    Row,
    Column,
}

/// Where a new track goes relative to a reference track.
/// `Before` is "above" for rows, `After` is "below".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GridPosition {
    Before,
    After,
}

impl GridPosition {
    /// Insertion index for a new track placed next to `reference`.
    pub fn insertion_index(self, reference: u32) -> u32 {
        match self {
            GridPosition::Before => reference,
            GridPosition::After => reference + 1,
        }
    }
}

/// Row/column coordinates of a grid child.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Cell {
    pub row: u32,
    pub column: u32,
}

impl Cell {
    pub const fn new(row: u32, column: u32) -> Self {
        Self { row, column }
    }

    pub fn get(&self, axis: GridAxis) -> u32 {
        match axis {
            GridAxis::Row => self.row,
            GridAxis::Column => self.column,
        }
    }

    pub fn get_mut(&mut self, axis: GridAxis) -> &mut u32 {
        match axis {
            GridAxis::Row => &mut self.row,
            GridAxis::Column => &mut self.column,
        }
    }
}

/// Declared track counts of a grid container.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridDims {
    pub rows: u32,
    pub columns: u32,
}

impl GridDims {
    pub const fn new(rows: u32, columns: u32) -> Self {
        Self { rows, columns }
    }

    pub fn len(&self, axis: GridAxis) -> u32 {
        match axis {
            GridAxis::Row => self.rows,
            GridAxis::Column => self.columns,
        }
    }

    pub fn len_mut(&mut self, axis: GridAxis) -> &mut u32 {
        match axis {
            GridAxis::Row => &mut self.rows,
            GridAxis::Column => &mut self.columns,
        }
    }

    pub fn contains(&self, cell: Cell) -> bool {
        cell.row < self.rows && cell.column < self.columns
    }
}

// ─── Nodes ───────────────────────────────────────────────────────────────

/// A single component in the document tree.
///
/// Children are only reachable through the owning `DocumentTree`; the
/// component slot lists are read-only from the outside so every structural
/// change goes through the tree primitives.
#[derive(Debug, Clone)]
pub struct Node {
    /// Document-unique id (`fx:id`-like); generated when not given.
    pub id: Symbol,
    /// Component type, resolved against the document's `TypeRegistry`.
    pub type_name: Symbol,
    pub(crate) properties: IndexMap<Symbol, PropertyValue>,
    pub(crate) components: IndexMap<Symbol, Vec<NodeIndex>>,
    /// Coordinates inside a grid slot. Ignored when the parent is not a grid.
    pub(crate) cell: Option<Cell>,
    /// Track counts, present on grid containers only.
    pub(crate) grid: Option<GridDims>,
}

impl Node {
    pub(crate) fn new(id: Symbol, type_name: Symbol) -> Self {
        Self {
            id,
            type_name,
            properties: IndexMap::new(),
            components: IndexMap::new(),
            cell: None,
            grid: None,
        }
    }

    pub fn properties(&self) -> &IndexMap<Symbol, PropertyValue> {
        &self.properties
    }

    pub fn property(&self, name: impl Into<Symbol>) -> Option<&PropertyValue> {
        self.properties.get(&name.into())
    }

    /// Children held in `slot`, in order. Empty when the slot is unused.
    pub fn children(&self, slot: Symbol) -> &[NodeIndex] {
        self.components.get(&slot).map_or(&[], Vec::as_slice)
    }

    /// All non-empty slots with their children.
    pub fn components(&self) -> impl Iterator<Item = (Symbol, &[NodeIndex])> {
        self.components.iter().map(|(k, v)| (*k, v.as_slice()))
    }

    pub fn cell(&self) -> Option<Cell> {
        self.cell
    }

    pub fn grid(&self) -> Option<GridDims> {
        self.grid
    }
}

/// Where a child sits inside its parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChildPosition {
    pub parent: NodeIndex,
    pub slot: Symbol,
    pub index: usize,
}

// ─── Fragments ───────────────────────────────────────────────────────────

/// An owned, arena-independent copy of a subtree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fragment {
    pub id: Symbol,
    #[serde(rename = "type")]
    pub type_name: Symbol,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub properties: IndexMap<Symbol, PropertyValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cell: Option<Cell>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grid: Option<GridDims>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub components: IndexMap<Symbol, Vec<Fragment>>,
}

impl Fragment {
    /// A childless fragment of the given type.
    pub fn new(id: impl Into<Symbol>, type_name: impl Into<Symbol>) -> Self {
        Self {
            id: id.into(),
            type_name: type_name.into(),
            properties: IndexMap::new(),
            cell: None,
            grid: None,
            components: IndexMap::new(),
        }
    }

    pub fn with_property(mut self, name: impl Into<Symbol>, value: impl Into<PropertyValue>) -> Self {
        self.properties.insert(name.into(), value.into());
        self
    }

    pub fn with_child(mut self, slot: impl Into<Symbol>, child: Fragment) -> Self {
        self.components.entry(slot.into()).or_default().push(child);
        self
    }

    pub fn with_cell(mut self, cell: Cell) -> Self {
        self.cell = Some(cell);
        self
    }

    pub fn with_grid(mut self, dims: GridDims) -> Self {
        self.grid = Some(dims);
        self
    }

    /// Number of nodes in this fragment, itself included.
    pub fn node_count(&self) -> usize {
        1 + self
            .components
            .values()
            .flatten()
            .map(Fragment::node_count)
            .sum::<usize>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grid_position_insertion_index() {
        assert_eq!(GridPosition::Before.insertion_index(2), 2);
        assert_eq!(GridPosition::After.insertion_index(2), 3);
    }

    #[test]
    fn dims_contains_cell() {
        let dims = GridDims::new(2, 3);
        assert!(dims.contains(Cell::new(1, 2)));
        assert!(!dims.contains(Cell::new(2, 0)));
        assert!(!dims.contains(Cell::new(0, 3)));
    }

    #[test]
    fn fragment_builder_counts_nodes() {
        let frag = Fragment::new("box", "VBox")
            .with_child("children", Fragment::new("a", "Button"))
            .with_child(
                "children",
                Fragment::new("b", "HBox").with_child("children", Fragment::new("c", "Label")),
            );
        assert_eq!(frag.node_count(), 4);
        assert_eq!(frag.components[&Symbol::intern("children")].len(), 2);
    }
}
