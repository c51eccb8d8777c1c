use std::fmt;

pub type JobId = u64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    MalformedUrl,
    EmptyUrl,
    InvalidScheme,
    NoDomainSeparator,
    Network,
    HttpStatus(u16),
    Timeout,
    TooLarge { max_bytes: u64, actual: Option<u64> },
    RedirectLoop,
    ParseError,
    DecodeError,
    ProcessingError,
    NotFound,
    Cancelled,
    /// The job's task panicked; the payload text is kept in the message.
    Panicked,
}

impl FailureKind {
    /// Transport-level failures: DNS, refused connections, timeouts, bad status, oversized bodies.
    pub fn is_network(&self) -> bool {
        matches!(
            self,
            FailureKind::Network
                | FailureKind::HttpStatus(_)
                | FailureKind::Timeout
                | FailureKind::TooLarge { .. }
        )
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::MalformedUrl => write!(f, "malformed url"),
            FailureKind::EmptyUrl => write!(f, "empty url"),
            FailureKind::InvalidScheme => write!(f, "invalid scheme"),
            FailureKind::NoDomainSeparator => write!(f, "no domain separator"),
            FailureKind::Network => write!(f, "network error"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::TooLarge { max_bytes, actual } => {
                write!(f, "response too large (max {max_bytes}, actual {actual:?})")
            }
            FailureKind::RedirectLoop => write!(f, "redirect loop"),
            FailureKind::ParseError => write!(f, "parse error"),
            FailureKind::DecodeError => write!(f, "decode error"),
            FailureKind::ProcessingError => write!(f, "processing error"),
            FailureKind::NotFound => write!(f, "not found"),
            FailureKind::Cancelled => write!(f, "cancelled"),
            FailureKind::Panicked => write!(f, "internal error"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct DownloadFailure {
    pub kind: FailureKind,
    pub message: String,
}

impl DownloadFailure {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn cancelled() -> Self {
        Self::new(FailureKind::Cancelled, "Cancelled")
    }
}

/// Canonical icon: PNG bytes of a `size`x`size` image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessedIcon {
    pub bytes: Vec<u8>,
    pub size: u32,
    pub source_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadOutcome {
    Success { icon: ProcessedIcon, note: String },
    Failure(DownloadFailure),
}

impl DownloadOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, DownloadOutcome::Success { .. })
    }

    pub fn failure(&self) -> Option<&DownloadFailure> {
        match self {
            DownloadOutcome::Failure(failure) => Some(failure),
            DownloadOutcome::Success { .. } => None,
        }
    }

    pub fn icon(&self) -> Option<&ProcessedIcon> {
        match self {
            DownloadOutcome::Success { icon, .. } => Some(icon),
            DownloadOutcome::Failure(_) => None,
        }
    }
}

impl From<DownloadFailure> for DownloadOutcome {
    fn from(failure: DownloadFailure) -> Self {
        DownloadOutcome::Failure(failure)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BatchResult {
    pub total: usize,
    pub succeeded: usize,
    pub failure_count: usize,
    /// Jobs that saw the cancel signal before starting and never hit the network.
    pub skipped: usize,
    /// Only the most recent failure message survives; earlier ones are dropped.
    pub last_failure: Option<String>,
    pub cancelled: bool,
}
