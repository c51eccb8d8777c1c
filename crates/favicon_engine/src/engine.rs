use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use engine_logging::{engine_debug, engine_error, engine_info, engine_warn};
use favicon_core::{
    derive_candidate, normalize_url, update, BatchResult, BatchState, CancelSignal,
    DownloadFailure, DownloadOutcome, Effect, EntryRecord, FailureKind, InputRecord, JobId, Msg,
};
use futures_util::FutureExt;
use tokio::sync::{mpsc, Semaphore};
use tokio::time::MissedTickBehavior;

use crate::pipeline::FaviconPipeline;
use crate::{EngineConfig, Fetcher, ReqwestFetcher};

/// Receives the coordinator's effects. Always called from the coordinating
/// task, never from a worker.
pub trait BatchSink {
    fn apply(&mut self, effect: Effect);
}

impl<F: FnMut(Effect)> BatchSink for F {
    fn apply(&mut self, effect: Effect) {
        self(effect)
    }
}

pub struct FaviconDownloader {
    pipeline: Arc<FaviconPipeline>,
    config: EngineConfig,
}

impl FaviconDownloader {
    pub fn new(config: EngineConfig) -> Self {
        let fetcher = Arc::new(ReqwestFetcher::new(config.fetch.clone()));
        Self::with_fetcher(fetcher, config)
    }

    pub fn with_fetcher(fetcher: Arc<dyn Fetcher>, config: EngineConfig) -> Self {
        let pipeline = Arc::new(FaviconPipeline::new(fetcher, &config));
        Self { pipeline, config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub async fn resolve_one<R: InputRecord + ?Sized>(&self, record: &R) -> DownloadOutcome {
        resolve_record(&self.pipeline, record).await
    }

    /// Resolve every record concurrently and fold the outcomes on the calling task.
    ///
    /// Must run inside a Tokio runtime. Item failures are reported through the
    /// sink and the returned tally, never as an error.
    pub async fn resolve_batch<R: InputRecord>(
        &self,
        records: &[R],
        cancel: &CancelSignal,
        sink: &mut dyn BatchSink,
    ) -> BatchResult {
        let total = records.len();
        engine_info!("starting favicon batch of {} entries", total);

        let (done_tx, mut done_rx) = mpsc::unbounded_channel::<(JobId, DownloadOutcome)>();
        let permits = Arc::new(Semaphore::new(self.config.max_concurrent_jobs.max(1)));

        for (index, record) in records.iter().enumerate() {
            let job_id = index as JobId;
            let entry = EntryRecord::from_record(record);
            let pipeline = Arc::clone(&self.pipeline);
            let permits = Arc::clone(&permits);
            let cancel = cancel.clone();
            let done_tx = done_tx.clone();
            tokio::spawn(async move {
                let job = async {
                    match permits.acquire_owned().await {
                        Ok(_permit) if !cancel.is_cancelled() => {
                            resolve_record(&pipeline, &entry).await
                        }
                        _ => DownloadOutcome::Failure(DownloadFailure::cancelled()),
                    }
                };
                // Panics become failures; every job reports exactly once.
                let outcome = AssertUnwindSafe(job)
                    .catch_unwind()
                    .await
                    .unwrap_or_else(|payload| panicked(&entry, payload.as_ref()));
                let _ = done_tx.send((job_id, outcome));
            });
        }
        drop(done_tx);

        let mut state = BatchState::new(total);
        let mut ticker = tokio::time::interval(
            self.config
                .cancel_poll_interval
                .max(Duration::from_millis(1)),
        );
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        while state.completed() < total {
            let msg = tokio::select! {
                done = done_rx.recv() => match done {
                    Some((job_id, outcome)) => Msg::JobDone { job_id, outcome },
                    None => {
                        engine_warn!(
                            "{} jobs ended without reporting an outcome",
                            total - state.completed()
                        );
                        break;
                    }
                },
                _ = ticker.tick() => Msg::Tick,
            };
            state = dispatch(state, msg, sink);

            if cancel.is_cancelled() && !state.is_cancelled() {
                engine_info!(
                    "cancel requested after {}/{} entries",
                    state.completed(),
                    total
                );
                state = dispatch(state, Msg::CancelObserved, sink);
            }
        }

        let state = dispatch(state, Msg::AllJobsFinished, sink);
        let result = state.result();
        engine_info!(
            "favicon batch done: {} ok, {} failed, {} skipped{}",
            result.succeeded,
            result.failure_count,
            result.skipped,
            if result.cancelled { " (cancelled)" } else { "" }
        );
        result
    }

    /// Synchronous [`Self::resolve_one`] on a private runtime.
    ///
    /// Panics if called from within an async context.
    pub fn resolve_one_blocking<R: InputRecord + ?Sized>(
        &self,
        record: &R,
    ) -> std::io::Result<DownloadOutcome> {
        let runtime = build_runtime()?;
        Ok(runtime.block_on(self.resolve_one(record)))
    }

    /// Synchronous [`Self::resolve_batch`] on a private runtime.
    ///
    /// Panics if called from within an async context.
    pub fn resolve_batch_blocking<R: InputRecord>(
        &self,
        records: &[R],
        cancel: &CancelSignal,
        sink: &mut dyn BatchSink,
    ) -> std::io::Result<BatchResult> {
        let runtime = build_runtime()?;
        Ok(runtime.block_on(self.resolve_batch(records, cancel, sink)))
    }
}

async fn resolve_record<R: InputRecord + ?Sized>(
    pipeline: &FaviconPipeline,
    record: &R,
) -> DownloadOutcome {
    let candidate = match derive_candidate(record).and_then(|host| normalize_url(&host)) {
        Ok(url) => url,
        Err(failure) => {
            engine_debug!(
                "entry '{}' / '{}' rejected: {}",
                record.url(),
                record.title(),
                failure
            );
            return failure.into();
        }
    };
    engine_debug!("resolving icon for {}", candidate);
    pipeline.resolve(&candidate).await
}

fn panicked(entry: &EntryRecord, payload: &(dyn Any + Send)) -> DownloadOutcome {
    let detail = payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("unknown panic");
    engine_error!(
        "favicon job for '{}' / '{}' panicked: {}",
        entry.url,
        entry.title,
        detail
    );
    DownloadOutcome::Failure(DownloadFailure::new(
        FailureKind::Panicked,
        format!("Internal error while resolving favicon: {detail}"),
    ))
}

fn dispatch(state: BatchState, msg: Msg, sink: &mut dyn BatchSink) -> BatchState {
    let (state, effects) = update(state, msg);
    for effect in effects {
        sink.apply(effect);
    }
    state
}

fn build_runtime() -> std::io::Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
}
