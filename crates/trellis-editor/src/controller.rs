//! The editing session: one document, its selection and its history,
//! driven through named actions.
//!
//! Every `perform_*` has a matching `can_perform_*`; performing an action
//! that is not available is a programming error and panics. UI code checks
//! first (or goes through `perform_command`, which does).

use crate::actions::{self, ControlAction, EditAction, JobSource};
use crate::clipboard::{Clipboard, ClipboardEncoder, MemoryClipboard};
use crate::config::EditorConfig;
use crate::error::EditorError;
use crate::format::{DocumentFormat, JsonFormat};
use crate::job::{EditContext, Job};
use crate::jobs::{InsertJob, ModifyPropertyJob, ReparentJob};
use crate::library::{BuiltinLibrary, Library, LibraryItem};
use crate::manager::JobManager;
use crate::report::{ErrorReport, ReportEntry, ReportSink};
use crate::selection::{Selection, SelectionGroup};
use crate::shortcuts::EditorCommand;
use std::sync::Arc;
use trellis_core::{Document, NodeIndex, PropertyValue, ResourceBundle, Symbol, TypeRegistry};

pub struct EditorController {
    document: Document,
    selection: Selection,
    jobs: JobManager,
    config: EditorConfig,
    library: Box<dyn Library>,
    format: Box<dyn DocumentFormat>,
    clipboard: Box<dyn Clipboard>,
    observers: Vec<Box<dyn ReportSink>>,
    error_report: ErrorReport,
}

impl EditorController {
    /// A controller over an empty document, with the built-in library,
    /// the JSON format and an in-memory clipboard.
    pub fn new(types: Arc<TypeRegistry>) -> Self {
        let config = EditorConfig::default();
        Self {
            document: Document::new(types.clone()),
            selection: Selection::new(),
            jobs: JobManager::new(config.history_depth),
            config,
            library: Box::new(BuiltinLibrary::new(types)),
            format: Box::new(JsonFormat),
            clipboard: Box::new(MemoryClipboard::new()),
            observers: Vec::new(),
            error_report: ErrorReport::new(),
        }
    }

    /// Replace the settings. Resets the history, whose depth depends on it.
    pub fn with_config(mut self, config: EditorConfig) -> Self {
        self.jobs = JobManager::new(config.history_depth);
        self.config = config;
        self
    }

    pub fn with_library(mut self, library: impl Library + 'static) -> Self {
        self.library = Box::new(library);
        self
    }

    pub fn with_format(mut self, format: impl DocumentFormat + 'static) -> Self {
        self.format = Box::new(format);
        self
    }

    pub fn with_clipboard(mut self, clipboard: impl Clipboard + 'static) -> Self {
        self.clipboard = Box::new(clipboard);
        self
    }

    pub fn add_observer(&mut self, observer: impl ReportSink + 'static) {
        self.observers.push(Box::new(observer));
    }

    // ─── State ───────────────────────────────────────────────────────────

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    /// Direct selection changes (picking, rubber-banding). Not undoable.
    pub fn selection_mut(&mut self) -> &mut Selection {
        &mut self.selection
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn clipboard(&self) -> &dyn Clipboard {
        self.clipboard.as_ref()
    }

    pub fn library(&self) -> &dyn Library {
        self.library.as_ref()
    }

    /// Changes on every push, undo and redo; reset by document replacement.
    pub fn revision(&self) -> u64 {
        self.jobs.revision()
    }

    /// Problems in the current document, rechecked only after changes.
    pub fn error_report(&mut self) -> &[ReportEntry] {
        self.error_report.entries(&self.document)
    }

    // ─── Document replacement ────────────────────────────────────────────

    /// Start editing `document`. Selection and history are reset.
    pub fn set_document(&mut self, document: Document) {
        assert!(
            !self.document.is_update_in_progress(),
            "document replaced during a structural update"
        );
        log::debug!(
            "editing {}",
            document.location.as_deref().unwrap_or("an unsaved document")
        );
        self.document = document;
        self.selection.clear();
        self.jobs.clear();
        self.notify();
    }

    /// Parse `text` into a new document, keeping location and resources.
    /// On failure the current document stays untouched.
    pub fn set_text(&mut self, text: &str) -> Result<(), EditorError> {
        let document = self.format.parse(
            text,
            self.document.location.as_deref(),
            &self.document.resources,
            self.document.types(),
        )?;
        self.set_document(document);
        Ok(())
    }

    pub fn text(&self) -> Result<String, EditorError> {
        Ok(self.format.serialize(&self.document)?)
    }

    pub fn set_location(&mut self, location: Option<String>) {
        self.document.location = location;
    }

    pub fn set_resources(&mut self, resources: ResourceBundle) {
        self.document.resources = resources;
        self.notify();
    }

    // ─── Edit actions ────────────────────────────────────────────────────

    fn make_job(&self, action: EditAction) -> Option<Box<dyn Job>> {
        let source = JobSource {
            document: &self.document,
            selection: &self.selection,
            clipboard: self.clipboard.content(),
            config: &self.config,
        };
        actions::make_job(action, &source)
    }

    pub fn can_perform_edit_action(&self, action: EditAction) -> bool {
        if action == EditAction::Cut && !self.can_perform_control_action(ControlAction::Copy) {
            return false;
        }
        self.make_job(action)
            .is_some_and(|job| job.is_executable(&self.document))
    }

    pub fn perform_edit_action(&mut self, action: EditAction) {
        assert!(
            self.can_perform_edit_action(action),
            "edit action {action:?} is not available"
        );
        if action == EditAction::Cut {
            self.perform_control_action(ControlAction::Copy);
        }
        if let Some(job) = self.make_job(action) {
            self.push(job);
        }
    }

    /// Set one property of one node as an undoable edit.
    pub fn set_property(
        &mut self,
        node: NodeIndex,
        name: impl Into<Symbol>,
        value: PropertyValue,
    ) -> Result<(), EditorError> {
        let name = name.into();
        let job = ModifyPropertyJob::set(node, name, value);
        if !job.is_executable(&self.document) {
            return Err(EditorError::unavailable(format!("cannot set `{name}`")));
        }
        self.push(Box::new(job));
        Ok(())
    }

    // ─── Moving nodes ────────────────────────────────────────────────────

    fn move_job(
        node: NodeIndex,
        parent: NodeIndex,
        slot: Option<Symbol>,
        index: Option<usize>,
    ) -> ReparentJob {
        let job = ReparentJob::new(node, parent);
        let job = match slot {
            Some(slot) => job.in_slot(slot),
            None => job,
        };
        match index {
            Some(index) => job.at(index),
            None => job,
        }
    }

    /// Whether dropping `node` into `parent` would be accepted. `None`
    /// picks the default slot, or the end of it.
    pub fn can_move_node(
        &self,
        node: NodeIndex,
        parent: NodeIndex,
        slot: Option<Symbol>,
        index: Option<usize>,
    ) -> bool {
        Self::move_job(node, parent, slot, index).is_executable(&self.document)
    }

    /// Move an attached node under another parent as one undoable edit and
    /// select it. This is what a drag and drop ends with.
    pub fn move_node(
        &mut self,
        node: NodeIndex,
        parent: NodeIndex,
        slot: Option<Symbol>,
        index: Option<usize>,
    ) -> Result<(), EditorError> {
        let job = Self::move_job(node, parent, slot, index);
        if !job.is_executable(&self.document) {
            return Err(EditorError::unavailable(format!("cannot move {node:?} there")));
        }
        self.push(Box::new(job));
        Ok(())
    }

    fn push(&mut self, job: Box<dyn Job>) {
        let mut cx = EditContext::new(&mut self.document, &mut self.selection);
        self.jobs.push(job, &mut cx);
        self.notify();
    }

    // ─── Insert from the library ─────────────────────────────────────────

    fn insert_job(&self, item: &LibraryItem) -> Result<InsertJob, EditorError> {
        if self.document.is_empty() {
            return Err(EditorError::NoDocument);
        }
        let instance = self
            .library
            .instantiate(item)
            .ok_or_else(|| EditorError::unavailable(format!("`{}` cannot be instantiated", item.name)))?;
        let fragment = instance
            .tree
            .snapshot()
            .ok_or_else(|| EditorError::unavailable(format!("`{}` is empty", item.name)))?;
        let target = actions::insertion_target(&self.document, &self.selection)
            .ok_or(EditorError::NoDocument)?;
        let job = InsertJob::from_fragment(fragment, target);
        if !job.is_executable(&self.document) {
            return Err(EditorError::unavailable(format!(
                "`{}` does not fit here",
                item.name
            )));
        }
        Ok(job)
    }

    pub fn can_perform_insert(&self, item: &LibraryItem) -> bool {
        self.insert_job(item).is_ok()
    }

    /// Insert a new instance of `item` under the insertion target and
    /// select it.
    pub fn perform_insert(&mut self, item: &LibraryItem) -> Result<(), EditorError> {
        let job = self.insert_job(item)?;
        self.push(Box::new(job));
        Ok(())
    }

    // ─── Control actions ─────────────────────────────────────────────────

    pub fn can_perform_control_action(&self, action: ControlAction) -> bool {
        let tree = &self.document.tree;
        match action {
            ControlAction::Copy => {
                let nodes = self.selection.items();
                !nodes.is_empty() && ClipboardEncoder::new(tree, &nodes).is_encodable()
            }
            ControlAction::SelectAll => self.can_select_all(),
            ControlAction::SelectNone => !self.selection.is_empty(),
            ControlAction::SelectParent => {
                !self.selection.is_empty() && self.selection.ancestor(tree).is_some()
            }
            ControlAction::SelectNext => self.sibling(1).is_some(),
            ControlAction::SelectPrevious => self.sibling(-1).is_some(),
        }
    }

    pub fn perform_control_action(&mut self, action: ControlAction) {
        assert!(
            self.can_perform_control_action(action),
            "control action {action:?} is not available"
        );
        match action {
            ControlAction::Copy => self.copy(),
            ControlAction::SelectAll => self.select_all(),
            ControlAction::SelectNone => self.selection.clear(),
            ControlAction::SelectParent => {
                if let Some(parent) = self.selection.ancestor(&self.document.tree) {
                    self.selection.select(parent);
                }
            }
            ControlAction::SelectNext | ControlAction::SelectPrevious => {
                let step = if action == ControlAction::SelectNext { 1 } else { -1 };
                if let Some(sibling) = self.sibling(step) {
                    self.selection.select(sibling);
                }
            }
        }
    }

    /// False once `SelectAll` would not change an object selection: the root
    /// is selected, or every sibling under the common ancestor already is.
    fn can_select_all(&self) -> bool {
        let tree = &self.document.tree;
        if self.document.is_empty() {
            return false;
        }
        match self.selection.group() {
            None | Some(SelectionGroup::Grid { .. }) => true,
            Some(SelectionGroup::Objects { .. }) => {
                if tree.root().is_some_and(|root| self.selection.is_selected(root)) {
                    return false;
                }
                self.selection.ancestor(tree).is_some_and(|ancestor| {
                    !tree
                        .sub_components(ancestor)
                        .iter()
                        .all(|&child| self.selection.is_selected(child))
                })
            }
        }
    }

    fn copy(&mut self) {
        let nodes = self.selection.items();
        match ClipboardEncoder::new(&self.document.tree, &nodes).make_encoding() {
            Ok(payload) => self.clipboard.set_content(payload),
            Err(err) => log::warn!("copy failed: {err}"),
        }
    }

    fn select_all(&mut self) {
        let tree = &self.document.tree;
        match self.selection.group().cloned() {
            Some(SelectionGroup::Grid { grid, axis, .. }) => {
                let len = tree.grid_dims(grid).map_or(0, |d| d.len(axis));
                if len > 0 {
                    self.selection.select_grid_tracks(grid, axis, 0..len);
                }
            }
            Some(SelectionGroup::Objects { .. }) => match self.selection.ancestor(tree) {
                Some(ancestor) => {
                    let children = tree.sub_components(ancestor).to_vec();
                    self.selection.select_all(children);
                }
                None => self.selection.select_all(tree.root()),
            },
            None => self.selection.select_all(tree.root()),
        }
    }

    /// The sibling `step` places away from the single selected node.
    fn sibling(&self, step: isize) -> Option<NodeIndex> {
        let tree = &self.document.tree;
        let items = self.selection.items();
        let [node] = items[..] else {
            return None;
        };
        let pos = tree.position(node)?;
        let index = pos.index.checked_add_signed(step)?;
        tree.children(pos.parent, pos.slot).get(index).copied()
    }

    // ─── History ─────────────────────────────────────────────────────────

    pub fn can_undo(&self) -> bool {
        self.jobs.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.jobs.can_redo()
    }

    pub fn undo_description(&self) -> Option<String> {
        self.jobs.undo_description()
    }

    pub fn redo_description(&self) -> Option<String> {
        self.jobs.redo_description()
    }

    pub fn undo(&mut self) -> Option<String> {
        let mut cx = EditContext::new(&mut self.document, &mut self.selection);
        let desc = self.jobs.undo(&mut cx)?;
        self.notify();
        Some(desc)
    }

    pub fn redo(&mut self) -> Option<String> {
        let mut cx = EditContext::new(&mut self.document, &mut self.selection);
        let desc = self.jobs.redo(&mut cx)?;
        self.notify();
        Some(desc)
    }

    // ─── Commands ────────────────────────────────────────────────────────

    pub fn can_perform_command(&self, command: EditorCommand) -> bool {
        match command {
            EditorCommand::Edit(action) => self.can_perform_edit_action(action),
            EditorCommand::Control(action) => self.can_perform_control_action(action),
            EditorCommand::Undo => self.can_undo(),
            EditorCommand::Redo => self.can_redo(),
        }
    }

    /// Run `command` if it is available. Returns whether it ran.
    pub fn perform_command(&mut self, command: EditorCommand) -> bool {
        if !self.can_perform_command(command) {
            log::trace!("{command:?} is not available");
            return false;
        }
        match command {
            EditorCommand::Edit(action) => self.perform_edit_action(action),
            EditorCommand::Control(action) => self.perform_control_action(action),
            EditorCommand::Undo => {
                self.undo();
            }
            EditorCommand::Redo => {
                self.redo();
            }
        }
        true
    }

    fn notify(&mut self) {
        self.error_report.request_update();
        for observer in &mut self.observers {
            observer.request_update();
        }
    }
}
