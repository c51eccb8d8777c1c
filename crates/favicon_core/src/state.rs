use std::collections::BTreeSet;

use crate::{BatchResult, DownloadOutcome, FailureKind, JobId};

/// Coordinator-owned tally for one batch. Only `update` mutates it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BatchState {
    total: usize,
    reported: BTreeSet<JobId>,
    succeeded: usize,
    failure_count: usize,
    skipped: usize,
    last_failure: Option<String>,
    cancelled: bool,
    finished: bool,
}

impl BatchState {
    pub fn new(total: usize) -> Self {
        Self {
            total,
            ..Self::default()
        }
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn completed(&self) -> usize {
        self.reported.len()
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn progress_percent(&self) -> u8 {
        if self.total == 0 {
            return 100;
        }
        let percent = self.completed().min(self.total) * 100 / self.total;
        percent as u8
    }

    pub fn result(&self) -> BatchResult {
        BatchResult {
            total: self.total,
            succeeded: self.succeeded,
            failure_count: self.failure_count,
            skipped: self.skipped,
            last_failure: self.last_failure.clone(),
            cancelled: self.cancelled,
        }
    }

    /// Returns false when the job already reported; the outcome is then ignored.
    pub(crate) fn record(&mut self, job_id: JobId, outcome: &DownloadOutcome) -> bool {
        if !self.reported.insert(job_id) {
            return false;
        }
        match outcome {
            DownloadOutcome::Success { .. } => self.succeeded += 1,
            DownloadOutcome::Failure(failure) if failure.kind == FailureKind::Cancelled => {
                self.skipped += 1;
            }
            DownloadOutcome::Failure(failure) => {
                self.failure_count += 1;
                self.last_failure = Some(failure.message.clone());
            }
        }
        true
    }

    pub(crate) fn mark_cancelled(&mut self) -> bool {
        let first = !self.cancelled;
        self.cancelled = true;
        first
    }

    pub(crate) fn mark_finished(&mut self) -> bool {
        let first = !self.finished;
        self.finished = true;
        first
    }
}

/// User-facing text shown once at the end of a batch, or `None` when nothing failed.
pub fn summary_message(result: &BatchResult) -> Option<String> {
    let last = result.last_failure.as_deref()?;
    match result.failure_count {
        0 => None,
        1 => Some(last.to_string()),
        count => Some(format!(
            "{count} errors occurred. The last error message is shown here. \
             To see the other messages, retry with a smaller set of entries. {last}"
        )),
    }
}
