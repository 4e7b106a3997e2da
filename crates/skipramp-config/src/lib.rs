//! # SkipRamp Config
//!
//! Settings store for the SkipRamp engine: schema, TOML loader, validation
//! and the site allow-list check.

mod error;
mod loader;
mod schema;
pub mod sites;
mod validator;

pub use error::ConfigError;
pub use loader::ConfigLoader;
pub use schema::*;
pub use sites::{is_allowed, is_known_video_host, KNOWN_VIDEO_SITE};
pub use validator::{ConfigValidator, ValidationError, ValidationResult, ValidationWarning};
