//! Per-target controller.
//!
//! One [`PlayerController`] exists per page lifetime. It owns the wiring
//! state of both features, the observer, the ramp and the skip pipeline, and
//! runs every handler to completion on a single task. Cancelling the ramp is
//! therefore a plain field write: no step can be in flight when it happens.

use std::future::pending;
use std::sync::Arc;
use std::time::Duration;

use skipramp_config::{is_known_video_host, Settings};
use skipramp_protocols::{MutationScope, MutationStream, PageError, PlayerPage, SpeedIndicator};
use tokio::sync::mpsc;
use tokio::time::{interval, sleep_until, Instant, Interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};

use crate::ad_state::{read_ad_state, AdEdge, AdState, AdStateObserver};
use crate::command::{Command, CommandOutcome, RejectReason};
use crate::emulator::{InteractionEmulator, InteractionOutcome};
use crate::error::EngineError;
use crate::locator::{PlaybackTarget, TargetLocator};
use crate::ramp::{RampTick, SpeedRamp};
use crate::skip_finder::SkipControlFinder;

/// Fallback poll period for both features.
pub const POLL_PERIOD: Duration = Duration::from_secs(1);

/// Wiring state of one feature.
#[derive(Default)]
struct Wiring {
    started: bool,
    mutations: Option<MutationStream>,
    poll: Option<Interval>,
}

impl Wiring {
    fn status(&self) -> FeatureStatus {
        FeatureStatus {
            started: self.started,
            subscribed: self.mutations.is_some(),
            polling: self.poll.is_some(),
        }
    }
}

/// Observable wiring state of one feature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FeatureStatus {
    pub started: bool,
    pub subscribed: bool,
    pub polling: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WiringSnapshot {
    pub ad_skip: FeatureStatus,
    pub ad_speed: FeatureStatus,
}

fn poll_interval() -> Interval {
    let mut poll = interval(POLL_PERIOD);
    poll.set_missed_tick_behavior(MissedTickBehavior::Delay);
    poll
}

async fn next_notice(stream: &mut Option<MutationStream>) -> Option<()> {
    match stream {
        Some(rx) => {
            rx.recv().await?;
            // Collapse a burst into one recompute.
            while rx.try_recv().is_ok() {}
            Some(())
        }
        None => pending().await,
    }
}

async fn next_tick(poll: &mut Option<Interval>) {
    match poll {
        Some(poll) => {
            poll.tick().await;
        }
        None => pending().await,
    }
}

async fn deadline_reached(deadline: Option<Instant>) {
    match deadline {
        Some(at) => sleep_until(at).await,
        None => pending().await,
    }
}

/// Drives ad skip, ad speed and manual commands for one page.
pub struct PlayerController<P: ?Sized, I: ?Sized> {
    page: Arc<P>,
    indicator: Arc<I>,
    settings: Arc<Settings>,
    locator: TargetLocator,
    finder: SkipControlFinder,
    emulator: InteractionEmulator,
    observer: AdStateObserver,
    ramp: SpeedRamp,
    target: Option<PlaybackTarget>,
    ad_skip: Wiring,
    ad_speed: Wiring,
    skip_enabled: bool,
    speed_enabled: bool,
    commands_enabled: bool,
}

impl<P, I> PlayerController<P, I>
where
    P: PlayerPage + ?Sized,
    I: SpeedIndicator + ?Sized,
{
    /// Create a controller for `page`. Feature gates are decided from its hostname.
    pub fn new(page: Arc<P>, indicator: Arc<I>, settings: Arc<Settings>) -> Self {
        let host = page.hostname().to_string();
        let known_host = is_known_video_host(&host);
        let allowed = settings.is_site_allowed(&host);

        let emulator =
            InteractionEmulator::new(settings.skip_method).with_cursor_cue(settings.cursor_cue);
        let ramp = SpeedRamp::new(settings.ad_grace_delay());

        debug!(
            host = %host,
            skip = known_host,
            speed = known_host && allowed,
            commands = allowed,
            "Controller created"
        );

        Self {
            page,
            indicator,
            settings,
            locator: TargetLocator::default(),
            finder: SkipControlFinder::default(),
            emulator,
            observer: AdStateObserver::new(),
            ramp,
            target: None,
            ad_skip: Wiring::default(),
            ad_speed: Wiring::default(),
            skip_enabled: known_host,
            speed_enabled: known_host && allowed,
            commands_enabled: allowed,
        }
    }

    pub fn wiring(&self) -> WiringSnapshot {
        WiringSnapshot {
            ad_skip: self.ad_skip.status(),
            ad_speed: self.ad_speed.status(),
        }
    }

    pub fn ad_state(&self) -> AdState {
        self.observer.state()
    }

    pub fn ramp(&self) -> &SpeedRamp {
        &self.ramp
    }

    /// Install the skip subscription and fallback poll.
    ///
    /// Returns `false` if already started or the host is not the known video
    /// site. Subscription failure leaves the poll as the only trigger.
    pub async fn start_ad_skip(&mut self) -> bool {
        if !self.skip_enabled || self.ad_skip.started {
            return false;
        }
        self.ad_skip.started = true;

        match self.page.watch_mutations(MutationScope::Document).await {
            Ok(stream) => self.ad_skip.mutations = Some(stream),
            Err(e) => warn!("Ad skip: mutation subscription failed, polling only: {}", e),
        }
        self.ad_skip.poll = Some(poll_interval());

        info!(host = %self.page.hostname(), "Ad skip started");
        true
    }

    /// Install ad-state observation and the speed ramp.
    ///
    /// Observation is pending until the playback target resolves; the poll
    /// retries resolution every second until then. Returns `false` if already
    /// started or the host is not allowed.
    pub async fn start_ad_speed(&mut self) -> bool {
        if !self.speed_enabled || self.ad_speed.started {
            return false;
        }
        self.ad_speed.started = true;
        self.ad_speed.poll = Some(poll_interval());

        info!(host = %self.page.hostname(), "Ad speed started");
        self.speed_tick().await;
        true
    }

    /// Run until `shutdown` fires, serving commands from `commands`.
    pub async fn run(
        mut self,
        mut commands: mpsc::UnboundedReceiver<Command>,
        shutdown: CancellationToken,
    ) {
        self.start_ad_skip().await;
        self.start_ad_speed().await;

        let mut commands_open = true;

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => {
                    debug!(host = %self.page.hostname(), "Controller shutting down");
                    break;
                }
                command = commands.recv(), if commands_open => {
                    match command {
                        Some(command) => {
                            let outcome = self.handle_command(command).await;
                            debug!(%command, ?outcome, "Command handled");
                        }
                        None => commands_open = false,
                    }
                }
                notice = next_notice(&mut self.ad_skip.mutations) => {
                    match notice {
                        Some(()) => self.skip_tick().await,
                        None => {
                            debug!("Ad skip: mutation stream closed");
                            self.ad_skip.mutations = None;
                        }
                    }
                }
                _ = next_tick(&mut self.ad_skip.poll) => {
                    self.skip_tick().await;
                }
                notice = next_notice(&mut self.ad_speed.mutations) => {
                    match notice {
                        Some(()) => self.speed_tick().await,
                        None => {
                            debug!("Ad speed: mutation stream closed");
                            self.ad_speed.mutations = None;
                        }
                    }
                }
                _ = next_tick(&mut self.ad_speed.poll) => {
                    self.speed_tick().await;
                }
                _ = deadline_reached(self.ramp.deadline()) => {
                    self.ramp_tick().await;
                }
            }
        }

        self.ramp.cancel();
    }

    /// Apply one manual command.
    pub async fn handle_command(&mut self, command: Command) -> CommandOutcome {
        if !self.commands_enabled {
            return CommandOutcome::Rejected(RejectReason::SiteNotAllowed);
        }
        match self.page.focus_is_text_entry().await {
            Ok(false) => {}
            Ok(true) => return CommandOutcome::Rejected(RejectReason::TextEntryFocused),
            Err(e) => {
                debug!("Focus check failed, rejecting {}: {}", command, e);
                return CommandOutcome::Rejected(RejectReason::TextEntryFocused);
            }
        }

        if command == Command::Skip {
            return match self.attempt_skip().await {
                Ok(outcome) => CommandOutcome::Skip(outcome),
                Err(e) => {
                    debug!("Manual skip found nothing to do: {}", e);
                    CommandOutcome::Skip(InteractionOutcome::NoOp)
                }
            };
        }

        let target = match self.resolve_target().await {
            Ok(target) => target,
            Err(e) => {
                debug!("Command {} has no target: {}", command, e);
                return CommandOutcome::Rejected(RejectReason::NoTarget);
            }
        };
        let current = match self.page.playback_rate(target.media).await {
            Ok(rate) => rate,
            Err(e) => {
                self.forget_target_on(&e);
                return CommandOutcome::Rejected(RejectReason::NoTarget);
            }
        };
        let Some(rate) = command.next_rate(current, self.settings.target_speed) else {
            return CommandOutcome::Rejected(RejectReason::NoTarget);
        };

        match self.apply_rate(rate).await {
            Ok(applied) => {
                info!(%command, from = current, to = applied, "Playback rate changed");
                CommandOutcome::RateApplied(applied)
            }
            Err(e) => {
                debug!("Command {} failed: {}", command, e);
                CommandOutcome::Rejected(RejectReason::NoTarget)
            }
        }
    }

    /// One skip trigger.
    async fn skip_tick(&mut self) {
        let result = self.skip_if_ad_showing().await;
        self.log_skip_result(result);
    }

    /// Automatic attempts wait for `ad-showing` on the container, so a page
    /// with no resolvable player never gets synthesized clicks.
    async fn skip_if_ad_showing(&mut self) -> Result<InteractionOutcome, EngineError> {
        let target = self.resolve_target().await?;
        let state = read_ad_state(self.page.as_ref(), &target).await?;
        if !state.is_active() {
            return Ok(InteractionOutcome::NoOp);
        }
        self.attempt_skip().await
    }

    /// Find and invoke the skip control, regardless of ad state.
    async fn attempt_skip(&mut self) -> Result<InteractionOutcome, EngineError> {
        let control = self
            .finder
            .find(self.page.as_ref())
            .await?
            .ok_or(EngineError::ControlNotFound)?;
        let outcome = self
            .emulator
            .invoke(self.page.as_ref(), self.indicator.as_ref(), control)
            .await?;
        if let InteractionOutcome::Dismissed { at } = outcome {
            info!(%control, x = at.x, y = at.y, "Skip control invoked");
        }
        Ok(outcome)
    }

    fn log_skip_result(&mut self, result: Result<InteractionOutcome, EngineError>) {
        match result {
            Ok(_) => {}
            Err(e) if e.is_expected() => {
                trace!("Skip tick: {}", e);
                if let EngineError::Page(page_error) = &e {
                    self.forget_target_on(page_error);
                }
            }
            Err(EngineError::Page(e)) => {
                warn!("Skip tick failed: {}", e);
                self.forget_target_on(&e);
            }
            Err(e) => warn!("Skip tick failed: {}", e),
        }
    }

    /// One speed trigger: finish installation if pending, then recompute the ad state.
    async fn speed_tick(&mut self) {
        let target = match self.resolve_target().await {
            Ok(target) => target,
            Err(e) => {
                trace!("Ad speed: {}", e);
                return;
            }
        };

        if self.ad_speed.mutations.is_none() {
            match self
                .page
                .watch_mutations(MutationScope::Element(target.container))
                .await
            {
                Ok(stream) => {
                    debug!(container = %target.container, "Ad speed: observing player");
                    self.ad_speed.mutations = Some(stream);
                }
                Err(e) => debug!("Ad speed: subscription failed, will retry: {}", e),
            }
        }

        let state = match read_ad_state(self.page.as_ref(), &target).await {
            Ok(state) => state,
            Err(e) => {
                self.forget_target_on(&e);
                trace!("Ad speed: reading ad state failed: {}", e);
                return;
            }
        };

        if let Some(edge) = self.observer.observe(state) {
            self.on_edge(edge).await;
        }
    }

    async fn on_edge(&mut self, edge: AdEdge) {
        info!(?edge, host = %self.page.hostname(), "Ad state changed");
        let rate = match edge {
            AdEdge::Started => self.ramp.on_ad_start(Instant::now()),
            AdEdge::Ended => self.ramp.on_ad_end(),
        };
        if let Err(e) = self.apply_rate(rate).await {
            debug!("Resetting rate on {:?} failed: {}", edge, e);
        }

        if edge == AdEdge::Started && self.ad_skip.started {
            let result = self.attempt_skip().await;
            self.log_skip_result(result);
        }
    }

    async fn ramp_tick(&mut self) {
        let now = Instant::now();
        match self.ramp.poll(now) {
            RampTick::Idle => {}
            RampTick::GraceElapsed => match self.current_rate().await {
                Ok(rate) => {
                    debug!(rate, "Grace elapsed, ramping");
                    self.ramp.begin_stepping(now, rate);
                }
                Err(e) => {
                    trace!("Grace elapsed but rate unreadable, retrying: {}", e);
                    self.ramp.defer_grace(now);
                }
            },
            RampTick::Step { rate, finished } => {
                if let Err(e) = self.apply_rate(rate).await {
                    trace!("Ramp step to {} not applied: {}", rate, e);
                }
                if finished {
                    debug!(rate, "Ramp reached ceiling");
                }
            }
        }
    }

    async fn current_rate(&mut self) -> Result<f64, EngineError> {
        let target = self.resolve_target().await?;
        self.page.playback_rate(target.media).await.map_err(|e| {
            self.forget_target_on(&e);
            EngineError::from(e)
        })
    }

    /// Write a rate to the media element and show it.
    async fn apply_rate(&mut self, rate: f64) -> Result<f64, EngineError> {
        let target = self.resolve_target().await?;
        let applied = match self.page.set_playback_rate(target.media, rate).await {
            Ok(applied) => applied,
            Err(e) => {
                self.forget_target_on(&e);
                return Err(e.into());
            }
        };
        if let Err(e) = self.indicator.show_rate(applied).await {
            debug!("Indicator update failed: {}", e);
        }
        Ok(applied)
    }

    /// The cached target, resolving it first if needed.
    async fn resolve_target(&mut self) -> Result<PlaybackTarget, EngineError> {
        if let Some(target) = self.target {
            return Ok(target);
        }
        let target = self
            .locator
            .locate(self.page.as_ref())
            .await?
            .ok_or(EngineError::TargetNotFound)?;
        debug!(container = %target.container, media = %target.media, "Playback target resolved");
        self.target = Some(target);
        Ok(target)
    }

    fn forget_target_on(&mut self, error: &PageError) {
        let PageError::StaleNode(node) = error else {
            return;
        };
        if let Some(target) = self.target.take() {
            debug!(node = %node, "Playback target went stale");
            // The class watch dies with its container.
            if target.container == *node {
                self.ad_speed.mutations = None;
            }
        }
    }
}

#[cfg(test)]
#[path = "controller_tests.rs"]
mod tests;
