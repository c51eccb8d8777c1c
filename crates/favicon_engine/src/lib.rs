//! Favicon engine: HTTP fetching, redirect following, icon decoding and batch orchestration.
mod config;
mod decode;
mod engine;
mod fetch;
mod icon;
mod locate;
mod pipeline;
mod process;
mod redirect;
mod types;

pub use config::EngineConfig;
pub use decode::{decode_html, DecodeError, DecodedHtml};
pub use engine::{BatchSink, FaviconDownloader};
pub use fetch::{FetchSettings, Fetcher, ReqwestFetcher};
pub use icon::{decode_icon, IconFetcher};
pub use locate::{find_icon_href, locate_favicon};
pub use pipeline::{standard_location, FaviconPipeline, STANDARD_FAVICON_PATH};
pub use process::{process_icon, DEFAULT_ICON_SIZE};
pub use redirect::{meta_refresh_target, RedirectResolver};
pub use types::{FetchMetadata, FetchOutput, FetchedDocument, RawIconAsset};
