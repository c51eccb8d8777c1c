use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::process::DEFAULT_ICON_SIZE;
use crate::FetchSettings;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub fetch: FetchSettings,
    /// Cap on meta-refresh hops and on icon re-requests after a redirect.
    pub max_redirect_hops: usize,
    pub icon_size: u32,
    pub max_concurrent_jobs: usize,
    /// How often the batch coordinator looks at the cancel signal while idle.
    pub cancel_poll_interval: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            fetch: FetchSettings::default(),
            max_redirect_hops: 20,
            icon_size: DEFAULT_ICON_SIZE,
            max_concurrent_jobs: 40,
            cancel_poll_interval: Duration::from_millis(100),
        }
    }
}
