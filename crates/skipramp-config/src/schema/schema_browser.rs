//! Browser connection configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Where the debugging endpoint lives and how often tabs are rescanned.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrowserConfig {
    /// Chrome remote debugging endpoint.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// How often the page list is rescanned for new or closed tabs.
    #[serde(default = "default_scan_interval_ms")]
    pub scan_interval_ms: u64,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            scan_interval_ms: default_scan_interval_ms(),
        }
    }
}

impl BrowserConfig {
    pub fn scan_interval(&self) -> Duration {
        Duration::from_millis(self.scan_interval_ms)
    }
}

fn default_endpoint() -> String {
    "http://localhost:9222".to_string()
}

fn default_scan_interval_ms() -> u64 {
    2000
}
