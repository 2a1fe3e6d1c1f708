//! Linear undo/redo history over jobs.
//!
//! Every pushed job is executed right away and recorded together with the
//! selection before and after it, so undo/redo restore the selection too.
//! The history is one vector with a cursor: records below the cursor are
//! applied, records at or above it are undone and form the redo tail.

use crate::job::{EditContext, Job, JobState};
use crate::selection::Selection;
use trellis_core::Document;

struct Record {
    job: Box<dyn Job>,
    selection_before: Selection,
    selection_after: Selection,
}

pub struct JobManager {
    history: Vec<Record>,
    cursor: usize,
    /// Bumped on every push, undo and redo.
    revision: u64,
    /// Maximum undo depth.
    max_depth: usize,
}

impl JobManager {
    pub fn new(max_depth: usize) -> Self {
        Self {
            history: Vec::new(),
            cursor: 0,
            revision: 0,
            max_depth,
        }
    }

    /// Execute `job` and record it. Any redo tail is discarded.
    ///
    /// Panics when the job is not executable: callers check first.
    pub fn push(&mut self, mut job: Box<dyn Job>, cx: &mut EditContext<'_>) {
        assert!(
            job.is_executable(cx.document),
            "pushed a job that is not executable: {}",
            job.description()
        );
        self.truncate_redo(cx.document);

        let selection_before = cx.selection.clone();
        job.execute(cx);
        let selection_after = cx.selection.clone();
        log::debug!("push: {}", job.description());
        self.history.push(Record {
            job,
            selection_before,
            selection_after,
        });
        self.cursor += 1;
        self.revision += 1;

        while self.history.len() > self.max_depth {
            let mut oldest = self.history.remove(0);
            self.cursor -= 1;
            log::trace!("history full, dropping {}", oldest.job.description());
            oldest.job.dispose(cx.document, JobState::Applied);
        }
    }

    /// Undo the last applied job. Returns its description.
    pub fn undo(&mut self, cx: &mut EditContext<'_>) -> Option<String> {
        if self.cursor == 0 {
            return None;
        }
        self.cursor -= 1;
        let record = &mut self.history[self.cursor];
        record.job.undo(cx);
        *cx.selection = record.selection_before.clone();
        self.revision += 1;
        let desc = record.job.description();
        log::debug!("undo: {desc}");
        Some(desc)
    }

    /// Redo the last undone job. Returns its description.
    pub fn redo(&mut self, cx: &mut EditContext<'_>) -> Option<String> {
        let record = self.history.get_mut(self.cursor)?;
        record.job.redo(cx);
        *cx.selection = record.selection_after.clone();
        self.cursor += 1;
        self.revision += 1;
        let desc = record.job.description();
        log::debug!("redo: {desc}");
        Some(desc)
    }

    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_redo(&self) -> bool {
        self.cursor < self.history.len()
    }

    pub fn undo_description(&self) -> Option<String> {
        self.cursor
            .checked_sub(1)
            .map(|i| self.history[i].job.description())
    }

    pub fn redo_description(&self) -> Option<String> {
        self.history.get(self.cursor).map(|r| r.job.description())
    }

    /// Forget the history without touching the document. Used when the
    /// document is replaced, so jobs are dropped without disposal.
    pub fn clear(&mut self) {
        self.history.clear();
        self.cursor = 0;
        self.revision = 0;
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn len(&self) -> usize {
        self.history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    fn truncate_redo(&mut self, document: &mut Document) {
        if self.cursor == self.history.len() {
            return;
        }
        log::trace!("discarding {} redoable jobs", self.history.len() - self.cursor);
        for mut record in self.history.drain(self.cursor..).rev() {
            record.job.dispose(document, JobState::Undone);
        }
    }
}

impl Default for JobManager {
    fn default() -> Self {
        Self::new(200)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jobs::testing::{document, node};
    use crate::jobs::{ModifyPropertyJob, RemoveJob};
    use pretty_assertions::assert_eq;
    use trellis_core::{Fragment, PropertyValue};

    fn doc() -> Document {
        document(
            Fragment::new("root", "VBox")
                .with_child("children", Fragment::new("a", "Label"))
                .with_child("children", Fragment::new("b", "Label")),
        )
    }

    fn set_text(doc: &Document, id: &str, text: &str) -> Box<dyn Job> {
        Box::new(ModifyPropertyJob::set(node(doc, id), "text", PropertyValue::from(text)))
    }

    #[test]
    fn push_undo_redo_restore_selection() {
        let mut doc = doc();
        let mut sel = Selection::new();
        let mut jobs = JobManager::default();
        let a = node(&doc, "a");
        sel.select(a);

        let job = Box::new(RemoveJob::new(a));
        jobs.push(job, &mut EditContext::new(&mut doc, &mut sel));
        assert!(sel.is_empty());
        assert_eq!(jobs.revision(), 1);
        assert_eq!(jobs.undo_description().as_deref(), Some("Remove"));

        assert_eq!(jobs.undo(&mut EditContext::new(&mut doc, &mut sel)).as_deref(), Some("Remove"));
        assert_eq!(sel.items(), vec![a]);
        assert!(doc.tree.is_attached(a));
        assert!(jobs.can_redo());

        jobs.redo(&mut EditContext::new(&mut doc, &mut sel));
        assert!(sel.is_empty());
        assert_eq!(jobs.revision(), 3);
    }

    #[test]
    fn undo_and_redo_at_boundaries_are_no_ops() {
        let mut doc = doc();
        let mut sel = Selection::new();
        let mut jobs = JobManager::default();
        assert_eq!(jobs.undo(&mut EditContext::new(&mut doc, &mut sel)), None);
        assert_eq!(jobs.redo(&mut EditContext::new(&mut doc, &mut sel)), None);
        assert_eq!(jobs.revision(), 0);
    }

    #[test]
    fn push_after_undo_discards_redo_tail() {
        let mut doc = doc();
        let mut sel = Selection::new();
        let mut jobs = JobManager::default();
        for text in ["one", "two", "three"] {
            let job = set_text(&doc, "a", text);
            jobs.push(job, &mut EditContext::new(&mut doc, &mut sel));
        }
        jobs.undo(&mut EditContext::new(&mut doc, &mut sel));
        jobs.undo(&mut EditContext::new(&mut doc, &mut sel));
        let job = set_text(&doc, "b", "other");
        jobs.push(job, &mut EditContext::new(&mut doc, &mut sel));
        assert_eq!(jobs.len(), 2);
        assert!(!jobs.can_redo());
        assert_eq!(jobs.redo(&mut EditContext::new(&mut doc, &mut sel)), None);
    }

    #[test]
    fn depth_limit_drops_oldest() {
        let mut doc = doc();
        let mut sel = Selection::new();
        let mut jobs = JobManager::new(2);
        for text in ["one", "two", "three"] {
            let job = set_text(&doc, "a", text);
            jobs.push(job, &mut EditContext::new(&mut doc, &mut sel));
        }
        assert_eq!(jobs.len(), 2);
        while jobs.undo(&mut EditContext::new(&mut doc, &mut sel)).is_some() {}
        let a = node(&doc, "a");
        assert_eq!(
            doc.tree.node(a).unwrap().property("text"),
            Some(&PropertyValue::from("one"))
        );
    }

    #[test]
    fn clear_forgets_history() {
        let mut doc = doc();
        let mut sel = Selection::new();
        let mut jobs = JobManager::default();
        let job = set_text(&doc, "a", "x");
        jobs.push(job, &mut EditContext::new(&mut doc, &mut sel));
        jobs.clear();
        assert!(!jobs.can_undo());
        assert_eq!(jobs.revision(), 0);
        assert!(jobs.is_empty());
    }

    #[test]
    #[should_panic(expected = "not executable")]
    fn pushing_unexecutable_job_panics() {
        let mut doc = doc();
        let mut sel = Selection::new();
        let root = doc.tree.root().unwrap();
        JobManager::default().push(
            Box::new(RemoveJob::new(root)),
            &mut EditContext::new(&mut doc, &mut sel),
        );
    }
}
