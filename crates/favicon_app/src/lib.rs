//! Command-line host: entry parsing, the on-disk icon store and the batch sink.
mod cli;
mod config;
mod filename;
mod host;
mod records;
mod store;

pub use cli::{run, Cli};
pub use config::{AppConfig, ConfigError, DEFAULT_OUTPUT_DIR};
pub use filename::icon_filename;
pub use host::HostSink;
pub use records::{entry_key, parse_entries};
pub use store::{Attachment, IconStore, StoreError};
