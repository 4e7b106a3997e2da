//! Configuration schema definitions.

use serde::{Deserialize, Serialize};

mod schema_browser;
mod schema_settings;

pub use schema_browser::*;
pub use schema_settings::*;

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub settings: Settings,

    #[serde(default)]
    pub keys: KeyBindings,

    #[serde(default)]
    pub browser: BrowserConfig,
}

#[cfg(test)]
#[path = "schema_tests.rs"]
mod tests;
