use std::sync::Arc;

use engine_logging::{engine_debug, engine_warn};
use favicon_core::{DownloadFailure, FailureKind};
use image::{DynamicImage, ImageFormat};
use url::Url;

use crate::{Fetcher, RawIconAsset};

/// Downloads icon bytes and decodes them into an image.
pub struct IconFetcher {
    fetcher: Arc<dyn Fetcher>,
    max_hops: usize,
}

impl IconFetcher {
    pub fn new(fetcher: Arc<dyn Fetcher>, max_hops: usize) -> Self {
        Self { fetcher, max_hops }
    }

    /// Fetch `url`, re-requesting whenever the response landed on a different URL.
    pub async fn fetch_icon(&self, url: &Url) -> Result<RawIconAsset, DownloadFailure> {
        let mut current = url.clone();

        for _ in 0..=self.max_hops {
            let output = self
                .fetcher
                .fetch(&current)
                .await
                .map_err(|failure| user_facing_failure(&current, failure))?;

            let final_url = output.metadata.final_url;
            if !final_url.as_str().eq_ignore_ascii_case(current.as_str()) {
                engine_debug!("icon {} redirected to {}", current, final_url);
                current = final_url;
                continue;
            }

            let image = decode_icon(&output.bytes).map_err(|failure| {
                DownloadFailure::new(
                    failure.kind,
                    format!("Could not decode icon from {current}: {}", failure.message),
                )
            })?;
            return Ok(RawIconAsset {
                image,
                source_url: current,
            });
        }

        Err(DownloadFailure::new(
            FailureKind::RedirectLoop,
            format!("Gave up on icon {url} after {} redirects", self.max_hops),
        ))
    }
}

/// Decode as an ICO container first, then let the generic decoder sniff the
/// format for icons served under a misleading name.
pub fn decode_icon(bytes: &[u8]) -> Result<DynamicImage, DownloadFailure> {
    let image = match image::load_from_memory_with_format(bytes, ImageFormat::Ico) {
        Ok(image) => image,
        Err(ico_err) => match image::load_from_memory(bytes) {
            Ok(image) => {
                engine_debug!("not an ico container ({}), decoded as raster image", ico_err);
                image
            }
            Err(raster_err) => {
                engine_warn!("icon decode failed: ico: {}; raster: {}", ico_err, raster_err);
                return Err(DownloadFailure::new(
                    FailureKind::DecodeError,
                    format!("ico: {ico_err}; raster: {raster_err}"),
                ));
            }
        },
    };

    if image.width() == 0 || image.height() == 0 {
        return Err(DownloadFailure::new(
            FailureKind::DecodeError,
            "decoded image is empty",
        ));
    }
    Ok(image)
}

fn user_facing_failure(url: &Url, failure: DownloadFailure) -> DownloadFailure {
    if !failure.kind.is_network() {
        return failure;
    }
    engine_debug!("icon download from {} failed: {}", url, failure);
    let message = format!(
        "Could not download favicon from {url}. This may be a temporary problem, so you may \
         want to try again later. Technical details: {}: {}",
        failure.kind, failure.message
    );
    DownloadFailure::new(failure.kind, message)
}
