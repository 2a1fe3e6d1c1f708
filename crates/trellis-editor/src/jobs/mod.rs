//! The job catalogue.

mod batch;
mod clipboard;
mod delete;
mod grid;
mod property;
mod structure;
mod wrap;

pub use batch::BatchJob;
pub use clipboard::PasteJob;
pub use delete::DeleteJob;
pub use grid::{AddTracksJob, MoveTracksJob};
pub use property::ModifyPropertyJob;
pub use structure::{InsertJob, Placement, RemoveJob, ReorderJob, ReparentJob, ZOrder};
pub use wrap::{TrimJob, UnwrapJob, WrapJob};

#[cfg(test)]
pub(crate) mod testing {
    use crate::job::{EditContext, Job};
    use crate::selection::Selection;
    use pretty_assertions::assert_eq;
    use std::sync::Arc;
    use trellis_core::{Document, Fragment, NodeIndex, TypeRegistry};

    pub fn document(root: Fragment) -> Document {
        Document::from_fragment(Arc::new(TypeRegistry::builtin()), &root).unwrap()
    }

    pub fn node(doc: &Document, id: &str) -> NodeIndex {
        doc.tree
            .find(id)
            .unwrap_or_else(|| panic!("no node `{id}`"))
    }

    /// Execute `job`, check `undo` restores the exact prior state and
    /// `redo` the executed one. Leaves the job applied.
    pub fn assert_reversible(job: &mut dyn Job, doc: &mut Document, sel: &mut Selection) {
        assert!(job.is_executable(doc), "{} is not executable", job.description());
        let before = (doc.tree.snapshot(), sel.clone());
        job.execute(&mut EditContext::new(doc, sel));
        let after = (doc.tree.snapshot(), sel.clone());
        assert!(doc.tree.check_invariants().is_empty());

        *sel = before.1.clone();
        job.undo(&mut EditContext::new(doc, sel));
        assert_eq!(doc.tree.snapshot(), before.0);
        assert!(doc.tree.check_invariants().is_empty());

        *sel = before.1.clone();
        job.redo(&mut EditContext::new(doc, sel));
        assert_eq!(doc.tree.snapshot(), after.0);
        *sel = after.1;
    }
}
