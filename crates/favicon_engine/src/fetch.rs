use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};
use std::time::Duration;

use engine_logging::engine_trace;
use favicon_core::{DownloadFailure, FailureKind};
use futures_util::StreamExt;
use reqwest::header::CONTENT_TYPE;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::{FetchMetadata, FetchOutput};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchSettings {
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    /// HTTP 3xx hops the client follows on a single request.
    pub redirect_limit: usize,
    pub max_bytes: u64,
    pub user_agent: String,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(10),
            redirect_limit: 10,
            max_bytes: 5 * 1024 * 1024,
            user_agent: concat!("favicon-fetcher/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

#[async_trait::async_trait]
pub trait Fetcher: Send + Sync {
    /// GET `url`, following HTTP redirects, and buffer the whole body.
    async fn fetch(&self, url: &Url) -> Result<FetchOutput, DownloadFailure>;
}

#[derive(Debug, Clone)]
pub struct ReqwestFetcher {
    settings: FetchSettings,
}

impl ReqwestFetcher {
    pub fn new(settings: FetchSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &FetchSettings {
        &self.settings
    }

    fn build_client(
        &self,
        redirect_counter: Arc<AtomicUsize>,
    ) -> Result<reqwest::Client, DownloadFailure> {
        let redirect_limit = self.settings.redirect_limit;
        let policy = reqwest::redirect::Policy::custom(move |attempt| {
            let count = attempt.previous().len();
            redirect_counter.store(count, Ordering::Relaxed);
            if count > redirect_limit {
                attempt.error("redirect limit exceeded")
            } else {
                attempt.follow()
            }
        });

        reqwest::Client::builder()
            .connect_timeout(self.settings.connect_timeout)
            .timeout(self.settings.request_timeout)
            .user_agent(self.settings.user_agent.clone())
            .redirect(policy)
            .build()
            .map_err(|err| DownloadFailure::new(FailureKind::Network, err.to_string()))
    }

    fn too_large(&self, actual: u64) -> DownloadFailure {
        DownloadFailure::new(
            FailureKind::TooLarge {
                max_bytes: self.settings.max_bytes,
                actual: Some(actual),
            },
            format!(
                "response of {actual} bytes exceeds the {} byte limit",
                self.settings.max_bytes
            ),
        )
    }

    /// Buffer the body, failing as soon as it is known to exceed `max_bytes`.
    async fn read_capped(&self, response: reqwest::Response) -> Result<Vec<u8>, DownloadFailure> {
        let declared = response.content_length();
        if let Some(len) = declared.filter(|len| *len > self.settings.max_bytes) {
            return Err(self.too_large(len));
        }

        let capacity = declared.unwrap_or(0).min(self.settings.max_bytes) as usize;
        let mut bytes = Vec::with_capacity(capacity);
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(map_reqwest_error)?;
            let next_len = (bytes.len() + chunk.len()) as u64;
            if next_len > self.settings.max_bytes {
                return Err(self.too_large(next_len));
            }
            bytes.extend_from_slice(&chunk);
        }
        Ok(bytes)
    }
}

#[async_trait::async_trait]
impl Fetcher for ReqwestFetcher {
    async fn fetch(&self, url: &Url) -> Result<FetchOutput, DownloadFailure> {
        let redirect_counter = Arc::new(AtomicUsize::new(0));
        let client = self.build_client(redirect_counter.clone())?;

        let response = client
            .get(url.clone())
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(DownloadFailure::new(
                FailureKind::HttpStatus(status.as_u16()),
                format!("{} answered {status}", response.url()),
            ));
        }

        let final_url = response.url().clone();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        let bytes = self.read_capped(response).await?;

        let redirect_count = redirect_counter.load(Ordering::Relaxed);
        engine_trace!(
            "fetched {} -> {} ({} bytes, {} redirects, {})",
            url,
            final_url,
            bytes.len(),
            redirect_count,
            content_type.as_deref().unwrap_or("no content type")
        );

        Ok(FetchOutput {
            metadata: FetchMetadata {
                original_url: url.clone(),
                final_url,
                redirect_count,
                content_type,
                byte_len: bytes.len() as u64,
            },
            bytes,
        })
    }
}

fn map_reqwest_error(err: reqwest::Error) -> DownloadFailure {
    if err.is_timeout() {
        return DownloadFailure::new(FailureKind::Timeout, err.to_string());
    }
    if err.is_redirect() {
        return DownloadFailure::new(FailureKind::RedirectLoop, err.to_string());
    }
    DownloadFailure::new(FailureKind::Network, err.to_string())
}
