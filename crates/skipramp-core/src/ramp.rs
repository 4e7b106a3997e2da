//! Ad playback-rate ramp.
//!
//! A pure, deadline-driven state machine. The owner asks for
//! [`SpeedRamp::deadline`], sleeps until it, then calls [`SpeedRamp::poll`].
//! Starting or ending an ad replaces the whole session, so a step can never
//! land after the session that scheduled it is gone.

use std::time::Duration;

use tokio::time::Instant;

/// Time between rate increments.
pub const STEP_PERIOD: Duration = Duration::from_millis(250);

/// Rate added per step.
pub const STEP_INCREMENT: f64 = 0.25;

/// Rate at which the ramp stops.
pub const RAMP_CEILING: f64 = 2.0;

/// Rate applied on both ad edges.
pub const BASELINE_RATE: f64 = 1.0;

/// Round to two decimals, halves away from zero.
pub fn round_rate(rate: f64) -> f64 {
    (rate * 100.0).round() / 100.0
}

/// Next rate of a stepping ramp.
pub fn step_rate(rate: f64) -> f64 {
    round_rate((rate + STEP_INCREMENT).min(RAMP_CEILING))
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RampStage {
    /// Waiting out the grace delay.
    Grace { fires_at: Instant },
    /// Incrementing from `rate` once per period.
    Stepping { next_step_at: Instant, rate: f64 },
}

/// The live ramp of the current ad.
#[derive(Debug, Clone, PartialEq)]
pub struct RampSession {
    pub id: u64,
    pub stage: RampStage,
}

/// What a due deadline asks of the owner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RampTick {
    /// Nothing is due.
    Idle,
    /// Grace is over. Read the current rate and call
    /// [`SpeedRamp::begin_stepping`], or [`SpeedRamp::defer_grace`] if the
    /// read failed.
    GraceElapsed,
    /// Write this rate. `finished` is set on the step that reached the ceiling.
    Step { rate: f64, finished: bool },
}

#[derive(Debug)]
pub struct SpeedRamp {
    grace: Duration,
    step_period: Duration,
    sessions_started: u64,
    session: Option<RampSession>,
}

impl SpeedRamp {
    pub fn new(grace: Duration) -> Self {
        Self {
            grace,
            step_period: STEP_PERIOD,
            sessions_started: 0,
            session: None,
        }
    }

    pub fn grace(&self) -> Duration {
        self.grace
    }

    pub fn session(&self) -> Option<&RampSession> {
        self.session.as_ref()
    }

    pub fn is_active(&self) -> bool {
        self.session.is_some()
    }

    /// Number of sessions started so far.
    pub fn sessions_started(&self) -> u64 {
        self.sessions_started
    }

    /// Start a new session, replacing any live one. Returns the rate to apply now.
    pub fn on_ad_start(&mut self, now: Instant) -> f64 {
        self.sessions_started += 1;
        self.session = Some(RampSession {
            id: self.sessions_started,
            stage: RampStage::Grace {
                fires_at: now + self.grace,
            },
        });
        BASELINE_RATE
    }

    /// Cancel any live session. Returns the rate to apply now.
    pub fn on_ad_end(&mut self) -> f64 {
        self.cancel();
        BASELINE_RATE
    }

    /// Drop the live session without producing a rate.
    pub fn cancel(&mut self) -> Option<RampSession> {
        self.session.take()
    }

    /// When the owner should next call [`poll`](Self::poll).
    pub fn deadline(&self) -> Option<Instant> {
        self.session.as_ref().map(|session| match session.stage {
            RampStage::Grace { fires_at } => fires_at,
            RampStage::Stepping { next_step_at, .. } => next_step_at,
        })
    }

    /// Advance the session if its deadline has passed.
    pub fn poll(&mut self, now: Instant) -> RampTick {
        let Some(session) = self.session.as_mut() else {
            return RampTick::Idle;
        };

        match session.stage {
            RampStage::Grace { fires_at } if now >= fires_at => RampTick::GraceElapsed,
            RampStage::Stepping { next_step_at, rate } if now >= next_step_at => {
                let next = step_rate(rate);
                if next >= RAMP_CEILING {
                    self.session = None;
                    RampTick::Step {
                        rate: next,
                        finished: true,
                    }
                } else {
                    session.stage = RampStage::Stepping {
                        next_step_at: next_step_at + self.step_period,
                        rate: next,
                    };
                    RampTick::Step {
                        rate: next,
                        finished: false,
                    }
                }
            }
            _ => RampTick::Idle,
        }
    }

    /// Leave grace and step from `current_rate`, first step one period from now.
    ///
    /// A rate already at or above the ceiling still gets one step, which
    /// clamps it down to the ceiling. A non-finite rate ends the session.
    pub fn begin_stepping(&mut self, now: Instant, current_rate: f64) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        if !matches!(session.stage, RampStage::Grace { .. }) {
            return;
        }
        if !current_rate.is_finite() {
            self.session = None;
            return;
        }
        session.stage = RampStage::Stepping {
            next_step_at: now + self.step_period,
            rate: current_rate,
        };
    }

    /// Retry the end of grace one period from now.
    pub fn defer_grace(&mut self, now: Instant) {
        if let Some(session) = self.session.as_mut() {
            if matches!(session.stage, RampStage::Grace { .. }) {
                session.stage = RampStage::Grace {
                    fires_at: now + self.step_period,
                };
            }
        }
    }
}

#[cfg(test)]
#[path = "ramp_tests.rs"]
mod tests;
