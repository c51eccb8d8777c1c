#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    ReportProgress { percent: u8 },
    /// Hand a finished job to the host, which dedups and stores successful icons.
    RecordOutcome {
        job_id: crate::JobId,
        outcome: crate::DownloadOutcome,
    },
    StopDispatch,
    ShowSummary { message: String },
    /// Host should mark its entries dirty and redraw.
    RefreshHost,
}
