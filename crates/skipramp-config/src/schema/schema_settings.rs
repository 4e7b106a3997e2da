//! User settings: site allow-list, speeds, ad delay, skip method and key map.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use skipramp_protocols::SkipMethod;

use crate::sites;

/// Settings read once at startup and treated as immutable afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Hostname suffixes on which speed control and key commands are enabled.
    #[serde(default = "default_allowed_sites")]
    pub allowed_sites: Vec<String>,

    /// Rate the "target speed" command jumps to.
    #[serde(default = "default_target_speed")]
    pub target_speed: f64,

    /// Pause after an ad starts before the rate ramp begins.
    #[serde(default = "default_ad_grace_delay_seconds")]
    pub ad_grace_delay_seconds: f64,

    /// How synthesized skip clicks are delivered.
    #[serde(default)]
    pub skip_method: SkipMethod,

    /// Flash a cursor marker where synthesized skip clicks land.
    #[serde(default = "default_cursor_cue")]
    pub cursor_cue: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            allowed_sites: default_allowed_sites(),
            target_speed: default_target_speed(),
            ad_grace_delay_seconds: default_ad_grace_delay_seconds(),
            skip_method: SkipMethod::default(),
            cursor_cue: default_cursor_cue(),
        }
    }
}

impl Settings {
    /// Grace delay as a duration. Negative or non-finite values collapse to zero.
    pub fn ad_grace_delay(&self) -> Duration {
        Duration::try_from_secs_f64(self.ad_grace_delay_seconds).unwrap_or(Duration::ZERO)
    }

    /// Whether speed control and key commands are enabled for `hostname`.
    pub fn is_site_allowed(&self, hostname: &str) -> bool {
        sites::is_allowed(hostname, &self.allowed_sites)
    }
}

fn default_allowed_sites() -> Vec<String> {
    vec![sites::KNOWN_VIDEO_SITE.to_string()]
}

fn default_target_speed() -> f64 {
    4.0
}

fn default_ad_grace_delay_seconds() -> f64 {
    2.0
}

fn default_cursor_cue() -> bool {
    true
}

/// Single-key shortcuts for the user-command layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeyBindings {
    #[serde(default = "default_decrease_key")]
    pub decrease: String,

    #[serde(default = "default_increase_key")]
    pub increase: String,

    #[serde(default = "default_reset_key")]
    pub reset: String,

    #[serde(default = "default_target_key")]
    pub target: String,

    #[serde(default = "default_skip_key")]
    pub skip: String,
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            decrease: default_decrease_key(),
            increase: default_increase_key(),
            reset: default_reset_key(),
            target: default_target_key(),
            skip: default_skip_key(),
        }
    }
}

impl KeyBindings {
    /// All bound keys, in a fixed order.
    pub fn all(&self) -> [&str; 5] {
        [
            self.decrease.as_str(),
            self.increase.as_str(),
            self.reset.as_str(),
            self.target.as_str(),
            self.skip.as_str(),
        ]
    }
}

fn default_decrease_key() -> String {
    "a".to_string()
}

fn default_increase_key() -> String {
    "s".to_string()
}

fn default_reset_key() -> String {
    "q".to_string()
}

fn default_target_key() -> String {
    "w".to_string()
}

fn default_skip_key() -> String {
    "e".to_string()
}
