//! # SkipRamp Core
//!
//! Ad detection, skip emulation and playback-rate ramp engine.
//!
//! ## Architecture
//!
//! ```text
//!  mutation notices ──┐
//!                     ├──► AdStateObserver ──edge──► SpeedRamp ──► rate writes
//!  1s fallback poll ──┘          │
//!                                └──────────────► SkipControlFinder ──► InteractionEmulator
//! ```
//!
//! Every component works on one [`PlaybackTarget`] resolved by the
//! [`TargetLocator`]. A [`PlayerController`] owns all of them for one target
//! lifetime and drives them from a single task, so no two ticks interleave.
//!
//! ## Key Components
//!
//! - [`TargetLocator`]: resolves the player container and media element
//! - [`SkipControlFinder`]: ordered selector strategies with visibility filtering
//! - [`InteractionEmulator`]: hover, press, release and click sequence at the control's center
//! - [`AdStateObserver`]: recompute-and-diff reducer producing [`AdEdge`]s
//! - [`SpeedRamp`]: grace delay followed by stepped acceleration to a ceiling
//! - [`Command`]: manual rate and skip commands

pub mod ad_state;
pub mod command;
pub mod controller;
pub mod emulator;
pub mod error;
pub mod locator;
pub mod ramp;
pub mod skip_finder;

#[cfg(test)]
pub(crate) mod testing;

pub use ad_state::{read_ad_state, AdEdge, AdState, AdStateObserver, AD_ACTIVE_CLASS};
pub use command::{Command, CommandOutcome, RejectReason};
pub use controller::{FeatureStatus, PlayerController, WiringSnapshot, POLL_PERIOD};
pub use emulator::{InteractionEmulator, InteractionOutcome};
pub use error::EngineError;
pub use locator::{PlaybackTarget, TargetLocator};
pub use ramp::{round_rate, RampSession, RampStage, RampTick, SpeedRamp};
pub use skip_finder::{SkipControlFinder, SkipStrategy};

// Re-export CancellationToken for convenience
pub use tokio_util::sync::CancellationToken;
