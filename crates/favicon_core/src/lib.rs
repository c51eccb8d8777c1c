//! Favicon core: data model, URL shaping, dedup and the pure batch state machine.
mod cancel;
mod dedup;
mod effect;
mod msg;
mod record;
mod state;
mod types;
mod update;
mod uri;

pub use cancel::CancelSignal;
pub use dedup::{find_existing_icon, IconMatch};
pub use effect::Effect;
pub use msg::Msg;
pub use record::{derive_candidate, EntryRecord, InputRecord};
pub use state::{summary_message, BatchState};
pub use types::{
    BatchResult, DownloadFailure, DownloadOutcome, FailureKind, JobId, ProcessedIcon,
};
pub use update::update;
pub use uri::{normalize_url, reconcile_uri};
