#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// A worker finished resolving one record.
    JobDone {
        job_id: crate::JobId,
        outcome: crate::DownloadOutcome,
    },
    /// The coordinator saw the cancel signal set.
    CancelObserved,
    /// Every dispatched job has reported back.
    AllJobsFinished,
    /// Periodic wake-up so cancellation is noticed between completions.
    Tick,
}
