//! Deleting selected nodes, or whole rows/columns of a grid.

use crate::job::{EditContext, Job, JobState, applied, release};
use crate::jobs::{BatchJob, RemoveJob};
use trellis_core::{ChildPosition, Document, DocumentTree, GridAxis, NodeIndex};

#[derive(Debug)]
pub struct DeleteJob {
    description: &'static str,
    target: Target,
}

#[derive(Debug)]
enum Target {
    Objects {
        removals: BatchJob,
        includes_root: bool,
    },
    Tracks(TrackDeletion),
}

impl DeleteJob {
    /// Delete `nodes`. Nodes below another deleted node go with it.
    pub fn objects(tree: &DocumentTree, nodes: &[NodeIndex]) -> Self {
        let mut removals = BatchJob::new("Delete");
        for &node in nodes {
            if !tree.ancestors(node).any(|a| nodes.contains(&a)) {
                removals.push(RemoveJob::new(node));
            }
        }
        let includes_root = tree.root().is_some_and(|r| nodes.contains(&r));
        Self {
            description: "Delete",
            target: Target::Objects {
                removals,
                includes_root,
            },
        }
    }

    /// Delete rows or columns of `grid` along with everything in them.
    pub fn tracks(grid: NodeIndex, axis: GridAxis, indices: impl IntoIterator<Item = u32>) -> Self {
        let mut indices: Vec<u32> = indices.into_iter().collect();
        indices.sort_unstable_by(|a, b| b.cmp(a));
        indices.dedup();
        Self {
            description: "Delete",
            target: Target::Tracks(TrackDeletion {
                grid,
                axis,
                indices,
                removed: Vec::new(),
            }),
        }
    }

    /// Relabel for the undo menu, e.g. "Cut".
    pub fn labelled(mut self, description: &'static str) -> Self {
        self.description = description;
        self
    }
}

impl Job for DeleteJob {
    fn is_executable(&self, document: &Document) -> bool {
        match &self.target {
            Target::Objects {
                removals,
                includes_root,
            } => !includes_root && removals.is_executable(document),
            Target::Tracks(tracks) => tracks.is_executable(&document.tree),
        }
    }

    fn execute(&mut self, cx: &mut EditContext<'_>) {
        match &mut self.target {
            Target::Objects { removals, .. } => removals.execute(cx),
            Target::Tracks(tracks) => tracks.execute(&mut cx.document.tree),
        }
        cx.selection.clear();
    }

    fn undo(&mut self, cx: &mut EditContext<'_>) {
        match &mut self.target {
            Target::Objects { removals, .. } => removals.undo(cx),
            Target::Tracks(tracks) => tracks.undo(&mut cx.document.tree),
        }
    }

    fn description(&self) -> String {
        self.description.to_string()
    }

    fn dispose(&mut self, document: &mut Document, state: JobState) {
        match &mut self.target {
            Target::Objects { removals, .. } => removals.dispose(document, state),
            Target::Tracks(tracks) if state == JobState::Applied => {
                for &(node, _) in &tracks.removed {
                    release(document, node);
                }
            }
            Target::Tracks(_) => {}
        }
    }
}

#[derive(Debug)]
struct TrackDeletion {
    grid: NodeIndex,
    axis: GridAxis,
    /// Descending, so removing one track never shifts a later one.
    indices: Vec<u32>,
    removed: Vec<(NodeIndex, ChildPosition)>,
}

impl TrackDeletion {
    /// At least one track has to survive.
    fn is_executable(&self, tree: &DocumentTree) -> bool {
        let Ok(dims) = tree.grid_dims(self.grid) else {
            return false;
        };
        let len = dims.len(self.axis);
        tree.is_attached(self.grid)
            && !self.indices.is_empty()
            && self.indices.len() < len as usize
            && self.indices.iter().all(|&i| i < len)
    }

    fn execute(&mut self, tree: &mut DocumentTree) {
        self.removed.clear();
        for &index in &self.indices {
            for child in tree.children_in_track(self.grid, self.axis, index) {
                let pos = applied(tree.remove(child), "clear track");
                self.removed.push((child, pos));
            }
        }
        for &index in &self.indices {
            applied(tree.remove_track(self.grid, self.axis, index), "remove track");
        }
    }

    fn undo(&mut self, tree: &mut DocumentTree) {
        for &index in self.indices.iter().rev() {
            applied(tree.insert_track(self.grid, self.axis, index), "restore track");
        }
        for &(child, pos) in self.removed.iter().rev() {
            applied(
                tree.insert_as_child(child, pos.parent, pos.slot, pos.index),
                "restore track content",
            );
        }
    }
}
