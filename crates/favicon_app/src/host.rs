use std::io::Write;

use engine_logging::{engine_debug, engine_error, engine_info};
use favicon_core::{DownloadOutcome, Effect, JobId};
use favicon_engine::BatchSink;

use crate::store::{Attachment, IconStore};

/// Applies batch effects to the icon store and reports to a terminal-like writer.
pub struct HostSink<'a, W: Write> {
    store: &'a mut IconStore,
    keys: Vec<String>,
    out: W,
    summary: Option<String>,
    created: usize,
    reused: usize,
    store_errors: usize,
}

impl<'a, W: Write> HostSink<'a, W> {
    /// `keys[job_id]` is the manifest key of the entry submitted as that job.
    pub fn new(store: &'a mut IconStore, keys: Vec<String>, out: W) -> Self {
        Self {
            store,
            keys,
            out,
            summary: None,
            created: 0,
            reused: 0,
            store_errors: 0,
        }
    }

    pub fn summary(&self) -> Option<&str> {
        self.summary.as_deref()
    }

    pub fn created(&self) -> usize {
        self.created
    }

    pub fn reused(&self) -> usize {
        self.reused
    }

    pub fn store_errors(&self) -> usize {
        self.store_errors
    }

    pub fn into_writer(self) -> W {
        self.out
    }

    fn record(&mut self, job_id: JobId, outcome: DownloadOutcome) {
        let Some(key) = usize::try_from(job_id)
            .ok()
            .and_then(|index| self.keys.get(index))
        else {
            engine_error!("Outcome for unknown job {} dropped", job_id);
            return;
        };

        match outcome {
            DownloadOutcome::Success { icon, .. } => match self.store.attach(key, &icon) {
                Ok(Attachment::Created(_)) => self.created += 1,
                Ok(Attachment::Reused(_)) => self.reused += 1,
                Err(err) => {
                    engine_error!("Could not store icon for {}: {}", key, err);
                    self.store_errors += 1;
                }
            },
            DownloadOutcome::Failure(failure) => {
                engine_debug!("{}: {} ({})", key, failure, failure.kind);
            }
        }
    }

    fn refresh(&mut self) {
        if let Err(err) = self.store.save() {
            engine_error!("Could not save icon manifest: {}", err);
            self.store_errors += 1;
        }
    }
}

impl<W: Write> BatchSink for HostSink<'_, W> {
    fn apply(&mut self, effect: Effect) {
        match effect {
            Effect::ReportProgress { percent } => {
                let _ = writeln!(self.out, "progress: {percent}%");
            }
            Effect::RecordOutcome { job_id, outcome } => self.record(job_id, outcome),
            Effect::StopDispatch => {
                engine_info!("Cancel requested, waiting for running downloads");
                let _ = writeln!(self.out, "cancelling...");
            }
            Effect::ShowSummary { message } => {
                let _ = writeln!(self.out, "{message}");
                self.summary = Some(message);
            }
            Effect::RefreshHost => self.refresh(),
        }
    }
}
