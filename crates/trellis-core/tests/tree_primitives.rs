//! Integration tests: structural primitives keep the tree consistent.

use pretty_assertions::assert_eq;
use std::sync::Arc;
use trellis_core::{
    Cell, Document, Fragment, GridAxis, GridDims, IdPolicy, NodeIndex, PropertyValue, Symbol,
    TreeError, TypeRegistry,
};

fn children() -> Symbol {
    Symbol::intern("children")
}

fn form() -> Document {
    let _ = env_logger::builder().is_test(true).try_init();
    let grid = Fragment::new("grid", "GridPane")
        .with_grid(GridDims::new(3, 2))
        .with_child("children", Fragment::new("name", "Label").with_cell(Cell::new(0, 0)))
        .with_child("children", Fragment::new("field", "TextField").with_cell(Cell::new(0, 1)))
        .with_child("children", Fragment::new("ok", "Button").with_cell(Cell::new(2, 1)));
    let root = Fragment::new("root", "VBox")
        .with_child("children", Fragment::new("title", "Label").with_property("text", "Form"))
        .with_child("children", grid);
    Document::from_fragment(Arc::new(TypeRegistry::builtin()), &root).unwrap()
}

fn find(doc: &Document, id: &str) -> NodeIndex {
    doc.tree.find(id).unwrap()
}

fn cells(doc: &Document) -> Vec<Cell> {
    let grid = find(doc, "grid");
    doc.tree
        .grid_children(grid)
        .into_iter()
        .map(|child| doc.tree.cell_of(child))
        .collect()
}

// ─── Grid tracks ────────────────────────────────────────────────────────

#[test]
fn insert_then_remove_row_keeps_every_cell() {
    let mut doc = form();
    let grid = find(&doc, "grid");
    let before = cells(&doc);
    for index in 0..=3 {
        doc.tree.insert_row(grid, index).unwrap();
        doc.tree.remove_row(grid, index).unwrap();
        assert_eq!(cells(&doc), before, "row {index}");
    }
    assert_eq!(doc.tree.grid_dims(grid).unwrap(), GridDims::new(3, 2));
}

#[test]
fn removing_an_occupied_track_fails_without_change() {
    let mut doc = form();
    let grid = find(&doc, "grid");
    assert!(matches!(
        doc.tree.remove_track(grid, GridAxis::Column, 1),
        Err(TreeError::InvalidTarget(_))
    ));
    doc.tree.remove_row(grid, 1).unwrap();
    assert_eq!(doc.tree.cell_of(find(&doc, "ok")), Cell::new(1, 1));
}

#[test]
fn swapping_columns_carries_content() {
    let mut doc = form();
    let grid = find(&doc, "grid");
    doc.tree.swap_columns(grid, 0, 1).unwrap();
    assert_eq!(doc.tree.cell_of(find(&doc, "name")).column, 1);
    assert_eq!(doc.tree.cell_of(find(&doc, "field")).column, 0);
    assert!(doc.tree.check_invariants().is_empty());
}

// ─── Structure ──────────────────────────────────────────────────────────

#[test]
fn remove_and_reinsert_restores_snapshot() {
    let mut doc = form();
    let before = doc.tree.snapshot();
    let title = find(&doc, "title");
    let pos = doc.tree.remove(title).unwrap();
    assert!(!doc.tree.is_attached(title));
    // Detached nodes keep their properties.
    assert_eq!(
        doc.tree.node(title).unwrap().property("text"),
        Some(&PropertyValue::from("Form"))
    );
    doc.tree
        .insert_as_child(title, pos.parent, pos.slot, pos.index)
        .unwrap();
    assert_eq!(doc.tree.snapshot(), before);
}

#[test]
fn reparent_into_own_subtree_is_rejected() {
    let mut doc = form();
    let root = doc.tree.root().unwrap();
    let grid = find(&doc, "grid");
    let before = doc.tree.snapshot();
    let moved = doc.tree.create("VBox").unwrap();
    doc.tree.insert_as_child(moved, root, children(), 0).unwrap();
    assert!(doc.tree.reparent(moved, moved, children(), 0).is_err());
    assert!(doc.tree.reparent(root, grid, children(), 0).is_err());
    doc.tree.remove(moved).unwrap();
    doc.tree.destroy(moved).unwrap();
    assert_eq!(doc.tree.snapshot(), before);
}

#[test]
fn leaves_accept_no_children() {
    let mut doc = form();
    let title = find(&doc, "title");
    let extra = doc.tree.create("Button").unwrap();
    assert!(doc.tree.insert_as_child(extra, title, children(), 0).is_err());
    assert!(!doc.tree.is_attached(extra));
}

#[test]
fn fresh_import_renames_colliding_ids() {
    let mut doc = form();
    let root = doc.tree.root().unwrap();
    let copy = doc
        .tree
        .import(&Fragment::new("title", "Label"), IdPolicy::Fresh)
        .unwrap();
    doc.tree.insert_as_child(copy, root, children(), 2).unwrap();
    assert_ne!(doc.tree.node(copy).unwrap().id, Symbol::intern("title"));
    assert!(doc.tree.check_invariants().is_empty());
}

#[test]
fn property_values_are_type_checked() {
    let mut doc = form();
    let title = find(&doc, "title");
    assert!(doc.tree.set_property(title, "text", PropertyValue::from(true)).is_err());
    assert!(doc.tree.set_property(title, "spacing", PropertyValue::from(4.0)).is_err());
    doc.tree
        .set_property(title, "prefWidth", PropertyValue::from(120.0))
        .unwrap();
    let (_, old) = doc.tree.unset_property(title, "prefWidth").unwrap().unwrap();
    assert_eq!(old, PropertyValue::from(120.0));
}
