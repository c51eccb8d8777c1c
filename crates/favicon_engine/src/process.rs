use std::io::Cursor;

use favicon_core::{DownloadFailure, FailureKind, ProcessedIcon};
use image::imageops::FilterType;
use image::ImageFormat;

use crate::RawIconAsset;

pub const DEFAULT_ICON_SIZE: u32 = 16;

/// Resize to `size`x`size` and encode as PNG.
pub fn process_icon(raw: &RawIconAsset, size: u32) -> Result<ProcessedIcon, DownloadFailure> {
    if size == 0 {
        return Err(processing_failure(raw, "icon size must be positive"));
    }
    let resized = raw.image.resize_exact(size, size, FilterType::Triangle);

    let mut bytes = Vec::new();
    resized
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .map_err(|err| processing_failure(raw, &err.to_string()))?;

    Ok(ProcessedIcon {
        bytes,
        size,
        source_url: raw.source_url.to_string(),
    })
}

fn processing_failure(raw: &RawIconAsset, detail: &str) -> DownloadFailure {
    DownloadFailure::new(
        FailureKind::ProcessingError,
        format!(
            "Could not process downloaded favicon from {}. Technical details: {detail}",
            raw.source_url
        ),
    )
}
