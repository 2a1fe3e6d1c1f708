//! Named editor actions and the table that turns edit actions into jobs.
//!
//! `perform` and `can_perform` both go through `make_job`, so the check and
//! the real edit can never disagree about which job an action means.

use crate::clipboard::{self, ClipboardPayload};
use crate::config::EditorConfig;
use crate::job::Job;
use crate::jobs::{
    AddTracksJob, BatchJob, DeleteJob, ModifyPropertyJob, MoveTracksJob, PasteJob, ReorderJob,
    TrimJob, UnwrapJob, WrapJob, ZOrder,
};
use crate::selection::{Selection, SelectionGroup};
use std::collections::BTreeSet;
use trellis_core::schema::{ANCHOR_PROPERTIES, SIZE_PROPERTIES};
use trellis_core::{Document, GridAxis, GridPosition, NodeIndex, PropertyValue};

/// Actions that change the document and go through the undo history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EditAction {
    Cut,
    Paste,
    PasteInto,
    Duplicate,
    Delete,
    Trim,
    FitToParent,
    UseComputedSizes,
    MoveRowAbove,
    MoveRowBelow,
    MoveColumnBefore,
    MoveColumnAfter,
    AddRowAbove,
    AddRowBelow,
    AddColumnBefore,
    AddColumnAfter,
    BringToFront,
    SendToBack,
    BringForward,
    SendBackward,
    Unwrap,
    WrapIn(ContainerKind),
}

/// Actions that only read the document or adjust the selection/clipboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ControlAction {
    Copy,
    SelectAll,
    SelectNone,
    SelectParent,
    SelectNext,
    SelectPrevious,
}

/// Containers offered by "Wrap in".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContainerKind {
    AnchorPane,
    GridPane,
    Group,
    HBox,
    Pane,
    ScrollPane,
    SplitPane,
    StackPane,
    TabPane,
    TitledPane,
    ToolBar,
    VBox,
}

impl ContainerKind {
    pub const ALL: [ContainerKind; 12] = [
        ContainerKind::AnchorPane,
        ContainerKind::GridPane,
        ContainerKind::Group,
        ContainerKind::HBox,
        ContainerKind::Pane,
        ContainerKind::ScrollPane,
        ContainerKind::SplitPane,
        ContainerKind::StackPane,
        ContainerKind::TabPane,
        ContainerKind::TitledPane,
        ContainerKind::ToolBar,
        ContainerKind::VBox,
    ];

    pub fn type_name(self) -> &'static str {
        match self {
            ContainerKind::AnchorPane => "AnchorPane",
            ContainerKind::GridPane => "GridPane",
            ContainerKind::Group => "Group",
            ContainerKind::HBox => "HBox",
            ContainerKind::Pane => "Pane",
            ContainerKind::ScrollPane => "ScrollPane",
            ContainerKind::SplitPane => "SplitPane",
            ContainerKind::StackPane => "StackPane",
            ContainerKind::TabPane => "TabPane",
            ContainerKind::TitledPane => "TitledPane",
            ContainerKind::ToolBar => "ToolBar",
            ContainerKind::VBox => "VBox",
        }
    }
}

/// Everything a job factory may look at.
pub struct JobSource<'a> {
    pub document: &'a Document,
    pub selection: &'a Selection,
    pub clipboard: Option<&'a ClipboardPayload>,
    pub config: &'a EditorConfig,
}

type JobFactory = fn(EditAction, &JobSource<'_>) -> Option<Box<dyn Job>>;

fn factory(action: EditAction) -> JobFactory {
    use EditAction::*;
    match action {
        Cut | Delete => delete,
        Paste => paste,
        PasteInto => paste_into,
        Duplicate => duplicate,
        Trim => trim,
        FitToParent => fit_to_parent,
        UseComputedSizes => use_computed_sizes,
        MoveRowAbove | MoveRowBelow | MoveColumnBefore | MoveColumnAfter => move_tracks,
        AddRowAbove | AddRowBelow | AddColumnBefore | AddColumnAfter => add_tracks,
        BringToFront | SendToBack | BringForward | SendBackward => reorder,
        Unwrap => unwrap,
        WrapIn(_) => wrap,
    }
}

/// The job `action` stands for in the current state, if any. The caller
/// still has to check it with `is_executable`.
pub fn make_job(action: EditAction, source: &JobSource<'_>) -> Option<Box<dyn Job>> {
    factory(action)(action, source)
}

/// Where new content goes: the selection's common ancestor, or the root
/// when nothing (or the root itself) is selected.
pub fn insertion_target(document: &Document, selection: &Selection) -> Option<NodeIndex> {
    selection
        .ancestor(&document.tree)
        .or_else(|| document.tree.root())
}

// ─── Factories ───────────────────────────────────────────────────────────

fn objects(source: &JobSource<'_>) -> Option<Vec<NodeIndex>> {
    let nodes = source.selection.sorted_items(&source.document.tree);
    (!nodes.is_empty()).then_some(nodes)
}

fn single(source: &JobSource<'_>) -> Option<NodeIndex> {
    match source.selection.items().as_slice() {
        [node] => Some(*node),
        _ => None,
    }
}

fn delete(action: EditAction, source: &JobSource<'_>) -> Option<Box<dyn Job>> {
    let tree = &source.document.tree;
    let job = match source.selection.group()? {
        SelectionGroup::Objects { .. } => DeleteJob::objects(tree, &objects(source)?),
        SelectionGroup::Grid { .. } if action == EditAction::Cut => return None,
        SelectionGroup::Grid {
            grid,
            axis,
            indices,
        } => DeleteJob::tracks(*grid, *axis, indices.iter().copied()),
    };
    Some(Box::new(match action {
        EditAction::Cut => job.labelled("Cut"),
        _ => job,
    }))
}

fn paste(_: EditAction, source: &JobSource<'_>) -> Option<Box<dyn Job>> {
    let fragments = clipboard::decode(source.clipboard?).ok()?;
    let tree = &source.document.tree;
    let into_selection = single(source).filter(|&node| {
        source.config.paste_into_selection
            && tree.default_slot(node).is_some_and(|slot| {
                fragments
                    .iter()
                    .all(|f| tree.check_accepts(node, slot, f.type_name, fragments.len()).is_ok())
            })
    });
    let parent = match into_selection {
        Some(node) => node,
        None => insertion_target(source.document, source.selection)?,
    };
    Some(Box::new(PasteJob::new(tree, fragments, parent)))
}

fn paste_into(_: EditAction, source: &JobSource<'_>) -> Option<Box<dyn Job>> {
    let fragments = clipboard::decode(source.clipboard?).ok()?;
    let parent = single(source)?;
    Some(Box::new(
        PasteJob::new(&source.document.tree, fragments, parent).labelled("Paste Into"),
    ))
}

fn duplicate(_: EditAction, source: &JobSource<'_>) -> Option<Box<dyn Job>> {
    let nodes = objects(source)?;
    Some(Box::new(
        PasteJob::duplicate(&source.document.tree, &nodes)
            .selecting(source.config.duplicate_selects_copies),
    ))
}

fn trim(_: EditAction, source: &JobSource<'_>) -> Option<Box<dyn Job>> {
    Some(Box::new(TrimJob::new(single(source)?)))
}

/// Pin every edge of nodes laid out by an `AnchorPane` to the parent.
fn fit_to_parent(_: EditAction, source: &JobSource<'_>) -> Option<Box<dyn Job>> {
    let tree = &source.document.tree;
    let mut batch = BatchJob::new("Fit to Parent");
    for node in objects(source)? {
        let anchored = tree
            .parent(node)
            .and_then(|p| tree.node(p))
            .is_some_and(|p| p.type_name.as_str() == "AnchorPane");
        if !anchored {
            return None;
        }
        for anchor in ANCHOR_PROPERTIES {
            let job = ModifyPropertyJob::set(node, anchor, PropertyValue::Float(0.0));
            if job.is_executable(source.document) {
                batch.push(job);
            }
        }
    }
    Some(Box::new(batch))
}

/// Clear explicit sizes so the layout computes them.
fn use_computed_sizes(_: EditAction, source: &JobSource<'_>) -> Option<Box<dyn Job>> {
    let mut batch = BatchJob::new("Use Computed Sizes");
    for node in objects(source)? {
        for property in SIZE_PROPERTIES {
            let job = ModifyPropertyJob::unset(node, property);
            if job.is_executable(source.document) {
                batch.push(job);
            }
        }
    }
    Some(Box::new(batch))
}

/// The grid and tracks an action along `axis` applies to: the selected
/// tracks, or the tracks holding the selected grid children.
fn grid_target(source: &JobSource<'_>, axis: GridAxis) -> Option<(NodeIndex, BTreeSet<u32>)> {
    let tree = &source.document.tree;
    match source.selection.group()? {
        SelectionGroup::Grid {
            grid,
            axis: selected,
            indices,
        } => (*selected == axis).then(|| (*grid, indices.clone())),
        SelectionGroup::Objects { items, .. } => {
            let mut grid = None;
            let mut tracks = BTreeSet::new();
            for &node in items {
                let pos = tree.position(node)?;
                if !tree.is_grid_slot(pos.parent, pos.slot) || *grid.get_or_insert(pos.parent) != pos.parent {
                    return None;
                }
                tracks.insert(tree.cell_of(node).get(axis));
            }
            Some((grid?, tracks))
        }
    }
}

fn move_tracks(action: EditAction, source: &JobSource<'_>) -> Option<Box<dyn Job>> {
    let (axis, forward) = match action {
        EditAction::MoveRowAbove => (GridAxis::Row, false),
        EditAction::MoveRowBelow => (GridAxis::Row, true),
        EditAction::MoveColumnBefore => (GridAxis::Column, false),
        _ => (GridAxis::Column, true),
    };
    let (grid, indices) = grid_target(source, axis)?;
    Some(Box::new(if forward {
        MoveTracksJob::forward(grid, axis, indices)
    } else {
        MoveTracksJob::backward(grid, axis, indices)
    }))
}

fn add_tracks(action: EditAction, source: &JobSource<'_>) -> Option<Box<dyn Job>> {
    let (axis, position) = match action {
        EditAction::AddRowAbove => (GridAxis::Row, GridPosition::Before),
        EditAction::AddRowBelow => (GridAxis::Row, GridPosition::After),
        EditAction::AddColumnBefore => (GridAxis::Column, GridPosition::Before),
        _ => (GridAxis::Column, GridPosition::After),
    };
    let (grid, indices) = grid_target(source, axis)?;
    Some(Box::new(AddTracksJob::new(grid, axis, position, indices)))
}

fn reorder(action: EditAction, source: &JobSource<'_>) -> Option<Box<dyn Job>> {
    let order = match action {
        EditAction::BringToFront => ZOrder::BringToFront,
        EditAction::SendToBack => ZOrder::SendToBack,
        EditAction::BringForward => ZOrder::BringForward,
        _ => ZOrder::SendBackward,
    };
    Some(Box::new(ReorderJob::new(objects(source)?, order)))
}

fn unwrap(_: EditAction, source: &JobSource<'_>) -> Option<Box<dyn Job>> {
    Some(Box::new(UnwrapJob::new(single(source)?)))
}

fn wrap(action: EditAction, source: &JobSource<'_>) -> Option<Box<dyn Job>> {
    let EditAction::WrapIn(kind) = action else {
        return None;
    };
    let tree = &source.document.tree;
    let nodes = objects(source)?;
    Some(Box::new(match kind {
        ContainerKind::TabPane => WrapJob::in_tab_pane(tree, &nodes),
        _ => WrapJob::new(tree, &nodes, kind.type_name()),
    }))
}
