use image::DynamicImage;
use url::Url;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchOutput {
    pub bytes: Vec<u8>,
    pub metadata: FetchMetadata,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchMetadata {
    pub original_url: Url,
    pub final_url: Url,
    pub redirect_count: usize,
    pub content_type: Option<String>,
    pub byte_len: u64,
}

/// HTML source of the page reached after every HTTP and meta-refresh redirect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedDocument {
    pub html: String,
    pub effective_url: Url,
    /// Meta-refresh hops taken to reach `effective_url`.
    pub hops: usize,
}

/// Decoded icon image, not yet normalized.
#[derive(Debug, Clone)]
pub struct RawIconAsset {
    pub image: DynamicImage,
    pub source_url: Url,
}
