use std::fs;
use std::io;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use engine_logging::{
    engine_info, engine_warn, level_for_verbosity, LogDestination, DEFAULT_LOG_FILE,
};
use favicon_core::{CancelSignal, EntryRecord};
use favicon_engine::FaviconDownloader;

use crate::config::AppConfig;
use crate::host::HostSink;
use crate::records::{entry_key, parse_entries};
use crate::store::IconStore;

/// Download favicons for a list of web addresses into a deduplicated icon directory.
#[derive(Debug, Parser)]
#[command(name = "favicon-fetcher", version, about)]
pub struct Cli {
    /// Web addresses to resolve.
    pub urls: Vec<String>,

    /// File with one entry per line: `url<TAB>title`.
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// Directory holding the icon store. Overrides the config file.
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// RON configuration file.
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Log debug output.
    #[arg(short, long)]
    pub verbose: bool,

    /// Also write the log to a file (`./favicon.log` when no path is given).
    #[arg(long, num_args = 0..=1, default_missing_value = DEFAULT_LOG_FILE)]
    pub log_file: Option<PathBuf>,
}

impl Cli {
    pub fn log_destination(&self) -> LogDestination {
        match &self.log_file {
            Some(path) => LogDestination::Both(path.clone()),
            None => LogDestination::Terminal,
        }
    }

    /// Positional URLs first, then entries from `--input`.
    pub fn entries(&self) -> Result<Vec<EntryRecord>> {
        let mut entries: Vec<EntryRecord> = self
            .urls
            .iter()
            .map(|url| EntryRecord::new(url.as_str(), ""))
            .collect();
        if let Some(path) = &self.input {
            let text = fs::read_to_string(path)
                .with_context(|| format!("reading entries from {}", path.display()))?;
            entries.extend(parse_entries(&text));
        }
        Ok(entries)
    }

    pub fn app_config(&self) -> Result<AppConfig> {
        let mut config = match &self.config {
            Some(path) => AppConfig::load(path)?,
            None => AppConfig::default(),
        };
        if let Some(dir) = &self.output_dir {
            config.output_dir = dir.clone();
        }
        Ok(config)
    }
}

pub async fn run(cli: Cli) -> Result<()> {
    engine_logging::initialize(cli.log_destination(), level_for_verbosity(cli.verbose));

    let config = cli.app_config()?;
    let entries = cli.entries()?;
    if entries.is_empty() {
        bail!("no entries given; pass URLs or --input FILE");
    }

    let mut store = IconStore::open(&config.output_dir)
        .with_context(|| format!("opening icon store {}", config.output_dir.display()))?;
    let keys = entries.iter().map(entry_key).collect();

    let cancel = CancelSignal::new();
    let on_ctrl_c = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            engine_warn!("Ctrl-C received, cancelling batch");
            on_ctrl_c.cancel();
        }
    });

    let downloader = FaviconDownloader::new(config.engine.clone());
    let mut sink = HostSink::new(&mut store, keys, io::stdout());
    let result = downloader.resolve_batch(&entries, &cancel, &mut sink).await;
    let (created, reused) = (sink.created(), sink.reused());
    let store_errors = sink.store_errors();
    drop(sink);

    // Completed work is kept even when the batch was cancelled.
    store.save().context("saving icon manifest")?;

    engine_info!(
        "{} of {} entries resolved ({} new icons, {} reused), {} failed, {} skipped{}",
        result.succeeded,
        result.total,
        created,
        reused,
        result.failure_count,
        result.skipped,
        if result.cancelled { ", cancelled" } else { "" }
    );
    if store_errors > 0 {
        bail!("{store_errors} icons could not be stored");
    }
    Ok(())
}
