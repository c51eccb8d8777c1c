use crate::{DownloadFailure, FailureKind};

/// Read-only view of a host entry that may carry a web address.
pub trait InputRecord {
    fn url(&self) -> &str;
    fn title(&self) -> &str;
}

/// Owned snapshot of an [`InputRecord`], safe to move into worker tasks.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EntryRecord {
    pub url: String,
    pub title: String,
}

impl EntryRecord {
    pub fn new(url: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            title: title.into(),
        }
    }

    pub fn from_record<R: InputRecord + ?Sized>(record: &R) -> Self {
        Self::new(record.url(), record.title())
    }
}

impl InputRecord for EntryRecord {
    fn url(&self) -> &str {
        &self.url
    }

    fn title(&self) -> &str {
        &self.title
    }
}

/// Turn an entry into the bare host string handed to the resolution pipeline.
///
/// Uses the URL field, falling back to the title. Explicit non-HTTP(S) schemes
/// are rejected without touching the network. Everything after the first `/`
/// that follows the first `.` is dropped, then anything up to the last
/// remaining `/` (a scheme such as `https://`) is stripped.
pub fn derive_candidate<R: InputRecord + ?Sized>(record: &R) -> Result<String, DownloadFailure> {
    let mut url = record.url().trim();
    if url.is_empty() {
        url = record.title().trim();
    }
    if url.is_empty() {
        return Err(DownloadFailure::new(FailureKind::EmptyUrl, "Empty Url"));
    }

    if !url.starts_with("http://") && !url.starts_with("https://") && url.contains("://") {
        return Err(DownloadFailure::new(FailureKind::InvalidScheme, "Invalid Url"));
    }

    let Some(dot) = url.find('.') else {
        return Err(DownloadFailure::new(
            FailureKind::NoDomainSeparator,
            "No dots in url",
        ));
    };

    if let Some(offset) = url[dot..].find('/') {
        url = &url[..dot + offset];
    }
    if let Some(scheme_end) = url.rfind('/') {
        url = &url[scheme_end + 1..];
    }

    Ok(url.to_string())
}
