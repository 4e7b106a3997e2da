//! Manual user commands.

use std::fmt;

use skipramp_config::KeyBindings;

use crate::emulator::InteractionOutcome;
use crate::ramp::{round_rate, BASELINE_RATE};

/// Rate change per manual step.
pub const MANUAL_STEP: f64 = 0.25;

/// Lowest rate reachable by manual decrease.
pub const MANUAL_FLOOR: f64 = 0.25;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    Decrease,
    Increase,
    Reset,
    TargetSpeed,
    Skip,
}

impl Command {
    /// Map a pressed key to a command. Matching ignores ASCII case.
    pub fn from_key(key: &str, bindings: &KeyBindings) -> Option<Self> {
        let table = [
            (&bindings.decrease, Command::Decrease),
            (&bindings.increase, Command::Increase),
            (&bindings.reset, Command::Reset),
            (&bindings.target, Command::TargetSpeed),
            (&bindings.skip, Command::Skip),
        ];
        table
            .into_iter()
            .find(|(bound, _)| !bound.is_empty() && bound.eq_ignore_ascii_case(key))
            .map(|(_, command)| command)
    }

    /// The rate this command produces from `current`, or `None` for `Skip`.
    ///
    /// Decrease stops at the floor; increase has no ceiling.
    pub fn next_rate(&self, current: f64, target_speed: f64) -> Option<f64> {
        match self {
            Command::Decrease => Some(round_rate(current - MANUAL_STEP).max(MANUAL_FLOOR)),
            Command::Increase => Some(round_rate(current + MANUAL_STEP)),
            Command::Reset => Some(BASELINE_RATE),
            Command::TargetSpeed => Some(target_speed),
            Command::Skip => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Command::Decrease => "decrease",
            Command::Increase => "increase",
            Command::Reset => "reset",
            Command::TargetSpeed => "target",
            Command::Skip => "skip",
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a command was not applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// Keyboard focus is in a text-entry field.
    TextEntryFocused,
    /// The page's host is not on the allow-list.
    SiteNotAllowed,
    /// No playback target could be resolved.
    NoTarget,
}

/// Result of handling one command.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CommandOutcome {
    /// Rate written; the value the media element reported back.
    RateApplied(f64),
    Skip(InteractionOutcome),
    Rejected(RejectReason),
}
