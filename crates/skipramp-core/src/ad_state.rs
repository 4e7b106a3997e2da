//! Ad-state observation.
//!
//! Change notices and poll ticks both funnel into [`AdStateObserver::observe`],
//! which recomputes the state and reports a transition only when it differs
//! from the last one reported. Redundant signals are therefore harmless.

use std::fmt;

use skipramp_protocols::{PageError, PlayerPage};

use crate::locator::PlaybackTarget;

/// Container class present while an ad plays.
pub const AD_ACTIVE_CLASS: &str = "ad-showing";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AdState {
    #[default]
    Inactive,
    Active,
}

impl AdState {
    pub fn is_active(&self) -> bool {
        matches!(self, AdState::Active)
    }
}

impl From<bool> for AdState {
    fn from(active: bool) -> Self {
        if active {
            AdState::Active
        } else {
            AdState::Inactive
        }
    }
}

impl fmt::Display for AdState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AdState::Inactive => f.write_str("inactive"),
            AdState::Active => f.write_str("active"),
        }
    }
}

/// A transition of the ad state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdEdge {
    Started,
    Ended,
}

/// Read the ad state from the container's class list.
pub async fn read_ad_state<P>(page: &P, target: &PlaybackTarget) -> Result<AdState, PageError>
where
    P: PlayerPage + ?Sized,
{
    let classes = page.class_list(target.container).await?;
    Ok(AdState::from(classes.iter().any(|c| c == AD_ACTIVE_CLASS)))
}

/// Edge detector over successive ad-state readings.
///
/// Starts `Inactive`, so an ad already playing when observation begins
/// produces a `Started` edge on the first reading.
#[derive(Debug, Default)]
pub struct AdStateObserver {
    last: AdState,
}

impl AdStateObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> AdState {
        self.last
    }

    /// Record a fresh reading, returning the edge if it differs from the last.
    pub fn observe(&mut self, current: AdState) -> Option<AdEdge> {
        if current == self.last {
            return None;
        }
        self.last = current;
        Some(match current {
            AdState::Active => AdEdge::Started,
            AdState::Inactive => AdEdge::Ended,
        })
    }

    /// Forget the last reading.
    pub fn reset(&mut self) {
        self.last = AdState::Inactive;
    }
}
