//! Editing on top of `trellis-core`: selection, undoable jobs and the
//! action layer that turns user intents into jobs.

pub mod actions;
pub mod clipboard;
pub mod config;
pub mod controller;
pub mod error;
pub mod format;
pub mod job;
pub mod jobs;
pub mod library;
pub mod manager;
pub mod report;
pub mod selection;
pub mod shortcuts;

pub use actions::{ContainerKind, ControlAction, EditAction};
pub use clipboard::{Clipboard, ClipboardPayload, MemoryClipboard};
pub use config::EditorConfig;
pub use controller::EditorController;
pub use error::EditorError;
pub use format::{DocumentFormat, JsonFormat};
pub use job::{EditContext, Job, JobState};
pub use library::{BuiltinLibrary, Library, LibraryItem};
pub use manager::JobManager;
pub use report::{ErrorReport, ReportEntry, ReportSink};
pub use selection::{Selection, SelectionGroup};
pub use shortcuts::{EditorCommand, ShortcutMap};
