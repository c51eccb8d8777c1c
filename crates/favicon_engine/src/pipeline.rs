use std::sync::Arc;

use engine_logging::{engine_debug, engine_info};
use favicon_core::{DownloadFailure, DownloadOutcome, FailureKind, ProcessedIcon};
use url::Url;

use crate::icon::IconFetcher;
use crate::locate::locate_favicon;
use crate::process::process_icon;
use crate::redirect::RedirectResolver;
use crate::{EngineConfig, Fetcher};

pub const STANDARD_FAVICON_PATH: &str = "/favicon.ico";

/// Explicit `<link rel=icon>` discovery with a fallback to `/favicon.ico`.
pub struct FaviconPipeline {
    resolver: RedirectResolver,
    icons: IconFetcher,
    icon_size: u32,
}

impl FaviconPipeline {
    pub fn new(fetcher: Arc<dyn Fetcher>, config: &EngineConfig) -> Self {
        Self {
            resolver: RedirectResolver::new(fetcher.clone(), config.max_redirect_hops),
            icons: IconFetcher::new(fetcher, config.max_redirect_hops),
            icon_size: config.icon_size,
        }
    }

    pub async fn resolve(&self, candidate: &Url) -> DownloadOutcome {
        let explicit_failure = match self.from_explicit_location(candidate).await {
            Ok(icon) => return success(icon),
            Err(failure) => failure,
        };
        engine_debug!(
            "explicit icon lookup for {} failed ({}), trying {}",
            candidate,
            explicit_failure,
            STANDARD_FAVICON_PATH
        );

        match self.from_standard_location(candidate).await {
            Ok(icon) => success(icon),
            Err(standard_failure) => {
                engine_info!(
                    "no icon for {}: explicit: {}; standard: {}",
                    candidate,
                    explicit_failure,
                    standard_failure
                );
                DownloadOutcome::Failure(DownloadFailure::new(
                    FailureKind::NotFound,
                    "Couldn't find icon",
                ))
            }
        }
    }

    pub async fn from_explicit_location(
        &self,
        candidate: &Url,
    ) -> Result<ProcessedIcon, DownloadFailure> {
        let document = self.resolver.resolve(candidate).await?;
        let icon_url = locate_favicon(&document)?;
        engine_debug!("{} declares icon {}", document.effective_url, icon_url);
        self.fetch_and_process(&icon_url).await
    }

    pub async fn from_standard_location(
        &self,
        candidate: &Url,
    ) -> Result<ProcessedIcon, DownloadFailure> {
        let icon_url = standard_location(candidate)?;
        self.fetch_and_process(&icon_url).await
    }

    async fn fetch_and_process(&self, icon_url: &Url) -> Result<ProcessedIcon, DownloadFailure> {
        let raw = self.icons.fetch_icon(icon_url).await?;
        process_icon(&raw, self.icon_size)
    }
}

/// `{scheme}://{host}[:{port}]/favicon.ico` for the candidate's origin.
pub fn standard_location(candidate: &Url) -> Result<Url, DownloadFailure> {
    if candidate.host_str().is_none() {
        return Err(DownloadFailure::new(
            FailureKind::MalformedUrl,
            format!("{candidate} has no host"),
        ));
    }
    candidate.join(STANDARD_FAVICON_PATH).map_err(|err| {
        DownloadFailure::new(
            FailureKind::MalformedUrl,
            format!("Cannot build favicon location for {candidate}: {err}"),
        )
    })
}

fn success(icon: ProcessedIcon) -> DownloadOutcome {
    DownloadOutcome::Success {
        icon,
        note: "Success".to_string(),
    }
}
