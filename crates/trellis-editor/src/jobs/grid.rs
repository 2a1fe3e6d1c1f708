//! Adding and moving grid rows/columns.

use crate::job::{EditContext, Job, applied};
use std::collections::BTreeSet;
use trellis_core::{Document, GridAxis, GridPosition, NodeIndex};

fn tracks_in_range(document: &Document, grid: NodeIndex, axis: GridAxis, indices: &BTreeSet<u32>) -> bool {
    let tree = &document.tree;
    tree.is_attached(grid)
        && !indices.is_empty()
        && tree
            .grid_dims(grid)
            .is_ok_and(|d| indices.iter().all(|&i| i < d.len(axis)))
}

fn track_word(axis: GridAxis, count: usize) -> &'static str {
    match (axis, count) {
        (GridAxis::Row, 1) => "Row",
        (GridAxis::Row, _) => "Rows",
        (GridAxis::Column, 1) => "Column",
        (GridAxis::Column, _) => "Columns",
    }
}

/// Insert one empty track before or after each reference track.
#[derive(Debug)]
pub struct AddTracksJob {
    grid: NodeIndex,
    axis: GridAxis,
    position: GridPosition,
    references: BTreeSet<u32>,
    /// Insertion indices in the order they were applied.
    inserted: Vec<u32>,
}

impl AddTracksJob {
    pub fn new(
        grid: NodeIndex,
        axis: GridAxis,
        position: GridPosition,
        references: impl IntoIterator<Item = u32>,
    ) -> Self {
        Self {
            grid,
            axis,
            position,
            references: references.into_iter().collect(),
            inserted: Vec::new(),
        }
    }

    /// Where the new tracks end up once all are inserted.
    fn final_indices(&self) -> impl Iterator<Item = u32> + '_ {
        self.references
            .iter()
            .enumerate()
            .map(|(k, &r)| self.position.insertion_index(r) + k as u32)
    }
}

impl Job for AddTracksJob {
    fn is_executable(&self, document: &Document) -> bool {
        tracks_in_range(document, self.grid, self.axis, &self.references)
    }

    fn execute(&mut self, cx: &mut EditContext<'_>) {
        let tree = &mut cx.document.tree;
        // Highest first, so earlier insertions never shift a later reference.
        self.inserted = self
            .references
            .iter()
            .rev()
            .map(|&r| {
                let index = self.position.insertion_index(r);
                applied(tree.insert_track(self.grid, self.axis, index), "insert track");
                index
            })
            .collect();
        let added: Vec<u32> = self.final_indices().collect();
        cx.selection.select_grid_tracks(self.grid, self.axis, added);
    }

    fn undo(&mut self, cx: &mut EditContext<'_>) {
        let tree = &mut cx.document.tree;
        for &index in self.inserted.iter().rev() {
            applied(tree.remove_track(self.grid, self.axis, index), "remove added track");
        }
    }

    fn description(&self) -> String {
        format!("Add {}", track_word(self.axis, self.references.len()))
    }
}

/// Shift tracks one step towards lower (`-1`) or higher (`+1`) indices,
/// carrying their content.
#[derive(Debug)]
pub struct MoveTracksJob {
    grid: NodeIndex,
    axis: GridAxis,
    indices: BTreeSet<u32>,
    forward: bool,
}

impl MoveTracksJob {
    pub fn backward(grid: NodeIndex, axis: GridAxis, indices: impl IntoIterator<Item = u32>) -> Self {
        Self::new(grid, axis, indices, false)
    }

    pub fn forward(grid: NodeIndex, axis: GridAxis, indices: impl IntoIterator<Item = u32>) -> Self {
        Self::new(grid, axis, indices, true)
    }

    fn new(grid: NodeIndex, axis: GridAxis, indices: impl IntoIterator<Item = u32>, forward: bool) -> Self {
        Self {
            grid,
            axis,
            indices: indices.into_iter().collect(),
            forward,
        }
    }

    /// `(from, to)` swaps in application order.
    fn swaps(&self) -> Vec<(u32, u32)> {
        if self.forward {
            self.indices.iter().rev().map(|&i| (i, i + 1)).collect()
        } else {
            self.indices.iter().map(|&i| (i, i - 1)).collect()
        }
    }
}

impl Job for MoveTracksJob {
    fn is_executable(&self, document: &Document) -> bool {
        if !tracks_in_range(document, self.grid, self.axis, &self.indices) {
            return false;
        }
        let Ok(dims) = document.tree.grid_dims(self.grid) else {
            return false;
        };
        match (self.forward, self.indices.first(), self.indices.last()) {
            (true, _, Some(&last)) => last + 1 < dims.len(self.axis),
            (false, Some(&first), _) => first > 0,
            _ => false,
        }
    }

    fn execute(&mut self, cx: &mut EditContext<'_>) {
        let tree = &mut cx.document.tree;
        for (a, b) in self.swaps() {
            applied(tree.swap_tracks(self.grid, self.axis, a, b), "move track");
        }
        let moved = self.swaps().into_iter().map(|(_, to)| to);
        cx.selection.select_grid_tracks(self.grid, self.axis, moved);
    }

    fn undo(&mut self, cx: &mut EditContext<'_>) {
        let tree = &mut cx.document.tree;
        for (a, b) in self.swaps().into_iter().rev() {
            applied(tree.swap_tracks(self.grid, self.axis, a, b), "move track back");
        }
    }

    fn description(&self) -> String {
        format!("Move {}", track_word(self.axis, self.indices.len()))
    }
}
