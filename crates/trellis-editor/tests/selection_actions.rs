//! Integration tests: selection-driven control and edit actions.

use pretty_assertions::assert_eq;
use std::collections::BTreeSet;
use std::sync::Arc;
use trellis_core::{Cell, Document, Fragment, GridAxis, GridDims, NodeIndex, TypeRegistry};
use trellis_editor::{
    BuiltinLibrary, ControlAction, EditAction, EditorCommand, EditorController, SelectionGroup,
    ShortcutMap,
};

fn editor_with(root: Fragment) -> EditorController {
    let _ = env_logger::builder().is_test(true).try_init();
    let types = Arc::new(TypeRegistry::builtin());
    let mut editor = EditorController::new(types.clone());
    editor.set_document(Document::from_fragment(types, &root).unwrap());
    editor
}

fn row_of_five() -> Fragment {
    (0..5).fold(Fragment::new("root", "HBox"), |root, i| {
        root.with_child("children", Fragment::new(format!("n{i}").as_str(), "Button"))
    })
}

fn find(editor: &EditorController, id: &str) -> NodeIndex {
    editor.document().tree.find(id).unwrap()
}

fn index_of(editor: &EditorController, node: NodeIndex) -> usize {
    editor.document().tree.position(node).unwrap().index
}

fn selected_tracks(editor: &EditorController) -> BTreeSet<u32> {
    match editor.selection().group() {
        Some(SelectionGroup::Grid { indices, .. }) => indices.clone(),
        other => panic!("expected a grid selection, got {other:?}"),
    }
}

// ─── Control actions ────────────────────────────────────────────────────

#[test]
fn select_all_on_empty_selection_selects_root() {
    let mut editor = editor_with(row_of_five());
    assert!(editor.selection().is_empty());
    editor.perform_control_action(ControlAction::SelectAll);
    assert_eq!(editor.selection().items(), vec![find(&editor, "root")]);
}

#[test]
fn select_all_widens_to_siblings() {
    let mut editor = editor_with(row_of_five());
    let n2 = find(&editor, "n2");
    editor.selection_mut().select(n2);
    editor.perform_control_action(ControlAction::SelectAll);
    assert_eq!(editor.selection().items().len(), 5);
}

#[test]
fn select_all_is_disabled_when_it_would_change_nothing() {
    let mut editor = editor_with(row_of_five());
    editor.perform_control_action(ControlAction::SelectAll);
    // The root is selected now.
    assert!(!editor.can_perform_control_action(ControlAction::SelectAll));

    let n2 = find(&editor, "n2");
    editor.selection_mut().select(n2);
    assert!(editor.can_perform_control_action(ControlAction::SelectAll));
    editor.perform_control_action(ControlAction::SelectAll);
    // Every sibling is selected already.
    assert!(!editor.can_perform_control_action(ControlAction::SelectAll));

    editor.selection_mut().clear();
    assert!(editor.can_perform_control_action(ControlAction::SelectAll));
}

#[test]
fn select_parent_stops_at_root() {
    let mut editor = editor_with(row_of_five());
    let leaf = find(&editor, "n3");
    editor.selection_mut().select(leaf);
    assert!(editor.can_perform_control_action(ControlAction::SelectParent));
    editor.perform_control_action(ControlAction::SelectParent);
    assert_eq!(editor.selection().items(), vec![find(&editor, "root")]);
    assert!(!editor.can_perform_control_action(ControlAction::SelectParent));
}

#[test]
fn select_none_requires_a_selection() {
    let mut editor = editor_with(row_of_five());
    assert!(!editor.can_perform_control_action(ControlAction::SelectNone));
    let n0 = find(&editor, "n0");
    editor.selection_mut().select(n0);
    editor.perform_control_action(ControlAction::SelectNone);
    assert!(editor.selection().is_empty());
}

#[test]
fn select_all_on_grid_columns_selects_every_column() {
    let grid = Fragment::new("grid", "GridPane")
        .with_grid(GridDims::new(2, 4))
        .with_child("children", Fragment::new("x", "Label").with_cell(Cell::new(1, 3)));
    let mut editor = editor_with(grid);
    let grid = find(&editor, "grid");
    editor
        .selection_mut()
        .select_grid_tracks(grid, GridAxis::Column, [0, 2]);
    editor.perform_control_action(ControlAction::SelectAll);
    assert_eq!(selected_tracks(&editor), BTreeSet::from([0, 1, 2, 3]));
}

// ─── Z-order ────────────────────────────────────────────────────────────

#[test]
fn bring_to_front_and_send_to_back_are_undoable() {
    let mut editor = editor_with(row_of_five());
    let n2 = find(&editor, "n2");
    editor.selection_mut().select(n2);

    editor.perform_edit_action(EditAction::BringToFront);
    assert_eq!(index_of(&editor, n2), 4);
    assert!(!editor.can_perform_edit_action(EditAction::BringForward));
    editor.undo();
    assert_eq!(index_of(&editor, n2), 2);

    editor.perform_edit_action(EditAction::SendToBack);
    assert_eq!(index_of(&editor, n2), 0);
    assert!(!editor.can_perform_edit_action(EditAction::SendBackward));
    editor.undo();
    assert_eq!(index_of(&editor, n2), 2);
}

// ─── Grid tracks ────────────────────────────────────────────────────────

#[test]
fn add_then_delete_row_restores_cells() {
    let mut grid = Fragment::new("grid", "GridPane").with_grid(GridDims::new(3, 2));
    for (id, row) in [("r0", 0), ("r1", 1), ("r2", 2)] {
        grid = grid.with_child("children", Fragment::new(id, "Label").with_cell(Cell::new(row, 0)));
    }
    let mut editor = editor_with(grid);
    let before = editor.document().tree.snapshot();
    let grid = find(&editor, "grid");

    editor.selection_mut().select_grid(grid, GridAxis::Row, 1);
    editor.perform_edit_action(EditAction::AddRowAbove);
    assert_eq!(selected_tracks(&editor), BTreeSet::from([1]));
    assert_eq!(editor.document().tree.cell_of(find(&editor, "r1")).row, 2);

    // The new row is selected and empty, so deleting it removes nothing else.
    editor.perform_edit_action(EditAction::Delete);
    assert_eq!(editor.document().tree.snapshot(), before);
}

#[test]
fn deleting_every_row_is_unavailable() {
    let grid = Fragment::new("grid", "GridPane").with_grid(GridDims::new(2, 2));
    let mut editor = editor_with(grid);
    let grid = find(&editor, "grid");
    editor
        .selection_mut()
        .select_grid_tracks(grid, GridAxis::Row, [0, 1]);
    assert!(!editor.can_perform_edit_action(EditAction::Delete));
    editor.selection_mut().select_grid(grid, GridAxis::Row, 1);
    assert!(editor.can_perform_edit_action(EditAction::Delete));
}

// ─── Insert and commands ────────────────────────────────────────────────

#[test]
fn insert_goes_under_the_selection_ancestor() {
    let root = Fragment::new("root", "VBox")
        .with_child("children", Fragment::new("box", "HBox").with_child("children", Fragment::new("a", "Label")));
    let mut editor = editor_with(root);
    let types = editor.document().types().clone();
    let item = BuiltinLibrary::new(types).item("Button").unwrap();
    let a = find(&editor, "a");
    editor.selection_mut().select(a);

    editor.perform_insert(&item).unwrap();
    let tree = &editor.document().tree;
    let selected = editor.selection().items();
    let [button] = selected[..] else {
        panic!("expected the inserted button to be selected");
    };
    assert_eq!(tree.parent(button), Some(find(&editor, "box")));
    assert_eq!(editor.undo_description().as_deref(), Some("Insert Button"));
}

#[test]
fn shortcuts_drive_the_controller() {
    let mut editor = editor_with(row_of_five());
    let n1 = find(&editor, "n1");
    editor.selection_mut().select(n1);

    let delete = ShortcutMap::resolve("Delete", false, false, false, false).unwrap();
    assert!(editor.perform_command(delete));
    assert_eq!(editor.document().tree.sub_components(find(&editor, "root")).len(), 4);

    let undo = ShortcutMap::resolve("z", true, false, false, false).unwrap();
    assert!(editor.perform_command(undo));
    assert_eq!(index_of(&editor, n1), 1);

    // Redo runs once, then there is nothing left to redo.
    assert!(editor.perform_command(EditorCommand::Redo));
    assert!(!editor.perform_command(EditorCommand::Redo));
}
