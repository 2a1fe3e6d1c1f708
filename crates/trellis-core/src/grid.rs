//! Row/column primitives for grid containers.
//!
//! A grid container declares its track counts in `GridDims`; every child
//! of its grid slot carries a `Cell` inside those counts. Inserting a track
//! shifts the children at or after the insertion index; removing an (empty)
//! track shifts the children after it back so no gap remains.

use crate::error::TreeError;
use crate::model::{Cell, GridAxis, GridDims};
use crate::tree::DocumentTree;
use petgraph::graph::NodeIndex;

impl DocumentTree {
    /// Track counts of `grid`, or `InvalidTarget` when it is not a grid.
    pub fn grid_dims(&self, grid: NodeIndex) -> Result<GridDims, TreeError> {
        self.node(grid)
            .ok_or(TreeError::MissingNode)?
            .grid
            .ok_or_else(|| TreeError::invalid("node is not a grid container"))
    }

    /// Children of `grid` that live in its grid slots.
    pub fn grid_children(&self, grid: NodeIndex) -> Vec<NodeIndex> {
        let Some(node) = self.node(grid) else {
            return Vec::new();
        };
        node.components
            .iter()
            .filter(|(slot, _)| self.is_grid_slot(grid, **slot))
            .flat_map(|(_, children)| children.iter().copied())
            .collect()
    }

    /// Grid children whose `axis` coordinate equals `index`.
    pub fn children_in_track(&self, grid: NodeIndex, axis: GridAxis, index: u32) -> Vec<NodeIndex> {
        self.grid_children(grid)
            .into_iter()
            .filter(|&c| self.node(c).and_then(|n| n.cell).is_some_and(|cell| cell.get(axis) == index))
            .collect()
    }

    /// Insert an empty track at `index`, shifting later children by one.
    pub fn insert_track(&mut self, grid: NodeIndex, axis: GridAxis, index: u32) -> Result<(), TreeError> {
        let dims = self.grid_dims(grid)?;
        let len = dims.len(axis);
        if index > len {
            return Err(TreeError::IndexOutOfRange {
                index: index as usize,
                len: len as usize,
            });
        }
        let children = self.grid_children(grid);
        let mut tx = self.begin_update();
        let graph = tx.graph_mut();
        for child in children {
            if let Some(cell) = graph[child].cell.as_mut()
                && cell.get(axis) >= index
            {
                *cell.get_mut(axis) += 1;
            }
        }
        if let Some(d) = graph[grid].grid.as_mut() {
            *d.len_mut(axis) += 1;
        }
        log::trace!("inserted {axis:?} {index} in grid {grid:?}");
        Ok(())
    }

    /// Remove the empty track at `index`, re-packing later children.
    pub fn remove_track(&mut self, grid: NodeIndex, axis: GridAxis, index: u32) -> Result<(), TreeError> {
        let dims = self.grid_dims(grid)?;
        let len = dims.len(axis);
        if index >= len {
            return Err(TreeError::IndexOutOfRange {
                index: index as usize,
                len: len as usize,
            });
        }
        if !self.children_in_track(grid, axis, index).is_empty() {
            return Err(TreeError::invalid(format!("{axis:?} {index} is not empty")));
        }
        let children = self.grid_children(grid);
        let mut tx = self.begin_update();
        let graph = tx.graph_mut();
        for child in children {
            if let Some(cell) = graph[child].cell.as_mut()
                && cell.get(axis) > index
            {
                *cell.get_mut(axis) -= 1;
            }
        }
        if let Some(d) = graph[grid].grid.as_mut() {
            *d.len_mut(axis) -= 1;
        }
        log::trace!("removed {axis:?} {index} from grid {grid:?}");
        Ok(())
    }

    /// Exchange the contents of tracks `a` and `b`.
    pub fn swap_tracks(&mut self, grid: NodeIndex, axis: GridAxis, a: u32, b: u32) -> Result<(), TreeError> {
        let len = self.grid_dims(grid)?.len(axis);
        for index in [a, b] {
            if index >= len {
                return Err(TreeError::IndexOutOfRange {
                    index: index as usize,
                    len: len as usize,
                });
            }
        }
        let children = self.grid_children(grid);
        let mut tx = self.begin_update();
        let graph = tx.graph_mut();
        for child in children {
            if let Some(cell) = graph[child].cell.as_mut() {
                let coord = cell.get_mut(axis);
                if *coord == a {
                    *coord = b;
                } else if *coord == b {
                    *coord = a;
                }
            }
        }
        Ok(())
    }

    /// Redeclare the track counts; every grid child must still fit.
    /// Returns the previous dims.
    pub fn set_grid_dims(&mut self, grid: NodeIndex, dims: GridDims) -> Result<GridDims, TreeError> {
        let old = self.grid_dims(grid)?;
        let outside = self
            .grid_children(grid)
            .into_iter()
            .any(|c| !dims.contains(self.node(c).and_then(|n| n.cell).unwrap_or_default()));
        if outside {
            return Err(TreeError::invalid("grid children would fall outside the grid"));
        }
        let mut tx = self.begin_update();
        tx.graph_mut()[grid].grid = Some(dims);
        Ok(old)
    }

    pub fn insert_row(&mut self, grid: NodeIndex, index: u32) -> Result<(), TreeError> {
        self.insert_track(grid, GridAxis::Row, index)
    }

    pub fn insert_column(&mut self, grid: NodeIndex, index: u32) -> Result<(), TreeError> {
        self.insert_track(grid, GridAxis::Column, index)
    }

    pub fn remove_row(&mut self, grid: NodeIndex, index: u32) -> Result<(), TreeError> {
        self.remove_track(grid, GridAxis::Row, index)
    }

    pub fn remove_column(&mut self, grid: NodeIndex, index: u32) -> Result<(), TreeError> {
        self.remove_track(grid, GridAxis::Column, index)
    }

    pub fn swap_rows(&mut self, grid: NodeIndex, a: u32, b: u32) -> Result<(), TreeError> {
        self.swap_tracks(grid, GridAxis::Row, a, b)
    }

    pub fn swap_columns(&mut self, grid: NodeIndex, a: u32, b: u32) -> Result<(), TreeError> {
        self.swap_tracks(grid, GridAxis::Column, a, b)
    }

    /// Cell of a grid child, `(0, 0)` when it has none.
    pub fn cell_of(&self, node: NodeIndex) -> Cell {
        self.node(node).and_then(|n| n.cell).unwrap_or_default()
    }
}
