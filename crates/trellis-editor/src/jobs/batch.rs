//! Several jobs acting as one undo step.

use crate::job::{EditContext, Job, JobState};
use trellis_core::Document;

#[derive(Debug)]
pub struct BatchJob {
    description: String,
    jobs: Vec<Box<dyn Job>>,
}

impl BatchJob {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            jobs: Vec::new(),
        }
    }

    pub fn push(&mut self, job: impl Job + 'static) {
        self.jobs.push(Box::new(job));
    }

    pub fn with(mut self, job: impl Job + 'static) -> Self {
        self.push(job);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }
}

impl Job for BatchJob {
    /// Every sub-job is checked against the current document, so only
    /// batches of independent jobs give an exact answer.
    fn is_executable(&self, document: &Document) -> bool {
        !self.jobs.is_empty() && self.jobs.iter().all(|job| job.is_executable(document))
    }

    fn execute(&mut self, cx: &mut EditContext<'_>) {
        for job in &mut self.jobs {
            job.execute(cx);
        }
    }

    fn undo(&mut self, cx: &mut EditContext<'_>) {
        for job in self.jobs.iter_mut().rev() {
            job.undo(cx);
        }
    }

    fn redo(&mut self, cx: &mut EditContext<'_>) {
        for job in &mut self.jobs {
            job.redo(cx);
        }
    }

    fn description(&self) -> String {
        self.description.clone()
    }

    fn dispose(&mut self, document: &mut Document, state: JobState) {
        for job in self.jobs.iter_mut().rev() {
            job.dispose(document, state);
        }
    }
}
