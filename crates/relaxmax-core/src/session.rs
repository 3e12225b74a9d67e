//! Session controller.
//!
//! Owns one breathing session: the preparation countdown, the session
//! countdown, the animated value and the phase chain. Like the phase driver
//! it has no internal thread; the host calls [`SessionController::advance_to`]
//! with the current time and gets back the events that fired.
//!
//! ## State Transitions
//!
//! ```text
//! Idle -> Preparing -> Active -> Idle
//!           |                     ^
//!           +---- (cancel) -------+
//! ```
//!
//! Three timer mechanisms coexist while active: the value's tween sequence
//! (sampled, never fires), the phase chain, and the one-second countdown.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::animation::{AnimatedValue, ProgressTracker};
use crate::driver::{PhaseChain, PhaseChange, PhaseDriver};
use crate::events::{Event, StopReason};
use crate::haptics::{HapticPalette, HapticSink};
use crate::pattern::{Pattern, Phase};
use crate::scheduler::{Scheduler, TimerId};
use crate::storage::{Config, SessionConfig};

const TICK_MS: u64 = 1_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionMode {
    Idle,
    Preparing,
    Active,
}

/// Everything the presentation layer needs to know about the session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionState {
    pub mode: SessionMode,
    pub pattern: Pattern,
    /// `None` until the first phase change of an active session.
    pub current_phase: Option<Phase>,
    pub current_phase_index: Option<usize>,
    pub countdown_remaining_secs: u32,
    pub preparation_remaining_secs: u32,
}

impl SessionState {
    pub fn idle(pattern: Pattern, config: &SessionConfig) -> Self {
        Self {
            mode: SessionMode::Idle,
            pattern,
            current_phase: None,
            current_phase_index: None,
            countdown_remaining_secs: config.duration_secs,
            preparation_remaining_secs: 0,
        }
    }
}

/// One rendered sample of the breathing value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    pub value: f64,
    pub progress: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SessionTask {
    PreparationTick,
    CountdownTick,
    /// Second haptic cancel issued shortly after a stop.
    HapticRecancel,
}

pub struct SessionController<H> {
    config: SessionConfig,
    driver: PhaseDriver,
    palette: HapticPalette,
    recancel_delay_ms: u64,
    haptics: H,
    state: SessionState,
    value: AnimatedValue,
    progress: ProgressTracker,
    chain: Option<PhaseChain>,
    timers: Scheduler<SessionTask>,
    preparation_timer: Option<TimerId>,
    countdown_timer: Option<TimerId>,
    recancel_timer: Option<TimerId>,
}

impl<H: HapticSink> SessionController<H> {
    pub fn new(config: &Config, pattern: Pattern, haptics: H) -> Self {
        let driver = PhaseDriver::new(config.animation.clone());
        let rest = driver.config().rest_value;
        let peak = driver.config().peak_value;
        Self {
            config: config.session.clone(),
            driver,
            palette: HapticPalette::new(&config.haptics),
            recancel_delay_ms: config.haptics.recancel_delay_ms,
            haptics,
            state: SessionState::idle(pattern, &config.session),
            value: AnimatedValue::new(rest),
            progress: ProgressTracker::with_range(rest, peak),
            chain: None,
            timers: Scheduler::new(),
            preparation_timer: None,
            countdown_timer: None,
            recancel_timer: None,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn mode(&self) -> SessionMode {
        self.state.mode
    }

    pub fn haptics(&self) -> &H {
        &self.haptics
    }

    pub fn haptics_mut(&mut self) -> &mut H {
        &mut self.haptics
    }

    pub fn value_at(&self, now_ms: u64) -> f64 {
        self.value.value_at(now_ms)
    }

    pub fn progress(&self) -> u8 {
        self.progress.progress()
    }

    /// Timers still waiting to fire, the phase chain included.
    pub fn pending_timers(&self) -> usize {
        let chain = self.chain.as_ref().map_or(0, |c| usize::from(!c.is_cancelled()));
        self.timers.len() + chain
    }

    /// Earliest deadline the host should wake up for.
    pub fn next_deadline(&self) -> Option<u64> {
        let chain = self.chain.as_ref().and_then(PhaseChain::next_boundary_ms);
        match (self.timers.next_due(), chain) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    /// Sample the value for rendering and update the progress readout.
    pub fn sample(&mut self, now_ms: u64) -> Frame {
        let value = self.value.value_at(now_ms);
        let progress = self.progress.observe(value);
        Frame { value, progress }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Begin the preparation countdown. Only valid from idle.
    pub fn start_session(&mut self, now_ms: u64) -> Vec<Event> {
        let mut events = Vec::new();
        if self.state.mode != SessionMode::Idle {
            debug!(mode = ?self.state.mode, "start ignored, session already running");
            return events;
        }
        // A re-cancel still pending from the last stop fires now, before
        // this session's first pulse.
        if self.timers.cancel_slot(&mut self.recancel_timer) {
            self.haptics.cancel_all();
        }

        self.state.countdown_remaining_secs = self.config.duration_secs;
        self.state.preparation_remaining_secs = self.config.preparation_secs;
        self.state.current_phase = None;
        self.state.current_phase_index = None;
        self.progress.reset();

        if self.config.preparation_secs == 0 {
            self.activate(now_ms, &mut events);
            return events;
        }

        info!(pattern_id = %self.state.pattern.id, "preparing session");
        self.state.mode = SessionMode::Preparing;
        events.push(Event::PreparationStarted {
            pattern_id: self.state.pattern.id.clone(),
            remaining_secs: self.state.preparation_remaining_secs,
            at_ms: now_ms,
        });
        self.preparation_pulse();
        self.preparation_timer = Some(
            self.timers
                .schedule_at(now_ms + TICK_MS, SessionTask::PreparationTick),
        );
        events
    }

    /// Stop the session from whichever running state it is in.
    pub fn stop_session(&mut self, now_ms: u64) -> Vec<Event> {
        let mut events = Vec::new();
        let reason = match self.state.mode {
            SessionMode::Idle => {
                debug!("stop ignored, no session running");
                return events;
            }
            SessionMode::Preparing => StopReason::Cancelled,
            SessionMode::Active => StopReason::UserStopped,
        };
        self.stop_with(reason, now_ms, &mut events);
        events
    }

    /// Change the pattern. While active this restarts the animation and the
    /// phase chain on the new pattern and leaves the countdown alone.
    pub fn select_pattern(&mut self, pattern: Pattern, now_ms: u64) -> Vec<Event> {
        let mut events = Vec::new();
        let from = std::mem::replace(&mut self.state.pattern, pattern);
        if self.state.mode != SessionMode::Active {
            return events;
        }

        info!(from = %from.id, to = %self.state.pattern.id, "switching pattern mid-session");
        if let Some(chain) = self.chain.as_mut() {
            chain.cancel();
        }
        self.chain = None;
        self.state.current_phase = None;
        self.state.current_phase_index = None;
        self.driver.stop(&mut self.value, now_ms);
        events.push(Event::PatternSwitched {
            from: from.id,
            to: self.state.pattern.id.clone(),
            at_ms: now_ms,
        });
        self.start_driver(now_ms, &mut events);
        events
    }

    /// Fire every timer due at or before `now_ms`, in deadline order.
    ///
    /// On a tie the countdown timers go before the phase chain.
    pub fn advance_to(&mut self, now_ms: u64) -> Vec<Event> {
        let mut events = Vec::new();
        loop {
            let timer_due = self.timers.next_due().filter(|due| *due <= now_ms);
            let chain_due = self
                .chain
                .as_ref()
                .and_then(PhaseChain::next_boundary_ms)
                .filter(|due| *due <= now_ms);

            match (timer_due, chain_due) {
                (Some(t), Some(c)) if c < t => self.fire_phase_boundary(now_ms, &mut events),
                (Some(_), _) => {
                    if let Some((id, due, task)) = self.timers.pop_due(now_ms) {
                        self.run_task(id, due, task, &mut events);
                    }
                }
                (None, Some(_)) => self.fire_phase_boundary(now_ms, &mut events),
                (None, None) => break,
            }
        }
        events
    }

    /// Cancel everything, leaving no pending timer behind.
    pub fn teardown(&mut self, now_ms: u64) -> Vec<Event> {
        let mut events = Vec::new();
        if self.state.mode != SessionMode::Idle {
            self.stop_with(StopReason::Teardown, now_ms, &mut events);
        }
        self.timers.clear();
        self.preparation_timer = None;
        self.countdown_timer = None;
        self.recancel_timer = None;
        self.chain = None;
        self.haptics.cancel_all();
        self.value.cancel(now_ms);
        events
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn run_task(&mut self, id: TimerId, due: u64, task: SessionTask, events: &mut Vec<Event>) {
        match task {
            SessionTask::PreparationTick => {
                if self.preparation_timer == Some(id) {
                    self.preparation_timer = None;
                    self.preparation_tick(due, events);
                }
            }
            SessionTask::CountdownTick => {
                if self.countdown_timer == Some(id) {
                    self.countdown_timer = None;
                    self.countdown_tick(due, events);
                }
            }
            SessionTask::HapticRecancel => {
                if self.recancel_timer == Some(id) {
                    self.recancel_timer = None;
                    self.haptics.cancel_all();
                }
            }
        }
    }

    fn preparation_tick(&mut self, now_ms: u64, events: &mut Vec<Event>) {
        self.state.preparation_remaining_secs = self.state.preparation_remaining_secs.saturating_sub(1);
        if self.state.preparation_remaining_secs == 0 {
            self.activate(now_ms, events);
            return;
        }
        events.push(Event::PreparationTick {
            remaining_secs: self.state.preparation_remaining_secs,
            at_ms: now_ms,
        });
        self.preparation_pulse();
        self.preparation_timer = Some(
            self.timers
                .schedule_at(now_ms + TICK_MS, SessionTask::PreparationTick),
        );
    }

    fn countdown_tick(&mut self, now_ms: u64, events: &mut Vec<Event>) {
        if self.state.countdown_remaining_secs <= 1 {
            self.state.countdown_remaining_secs = 0;
            events.push(Event::CountdownTick {
                remaining_secs: 0,
                at_ms: now_ms,
            });
            info!("session complete");
            self.stop_with(StopReason::Completed, now_ms, events);
            return;
        }
        self.state.countdown_remaining_secs -= 1;
        events.push(Event::CountdownTick {
            remaining_secs: self.state.countdown_remaining_secs,
            at_ms: now_ms,
        });
        self.countdown_timer = Some(
            self.timers
                .schedule_at(now_ms + TICK_MS, SessionTask::CountdownTick),
        );
    }

    fn activate(&mut self, now_ms: u64, events: &mut Vec<Event>) {
        info!(
            pattern_id = %self.state.pattern.id,
            duration_secs = self.config.duration_secs,
            "session started"
        );
        self.state.mode = SessionMode::Active;
        self.state.preparation_remaining_secs = 0;
        events.push(Event::SessionStarted {
            pattern_id: self.state.pattern.id.clone(),
            duration_secs: self.state.countdown_remaining_secs,
            at_ms: now_ms,
        });
        self.countdown_timer = Some(
            self.timers
                .schedule_at(now_ms + TICK_MS, SessionTask::CountdownTick),
        );
        self.start_driver(now_ms, events);
    }

    fn start_driver(&mut self, now_ms: u64, events: &mut Vec<Event>) {
        let mut first = None;
        self.chain = self.driver.start(
            &mut self.value,
            &self.state.pattern,
            now_ms,
            Some(&mut |change: &PhaseChange| first = Some(change.clone())),
        );
        if let Some(change) = first {
            self.apply_phase_change(change, events);
        }
    }

    fn fire_phase_boundary(&mut self, now_ms: u64, events: &mut Vec<Event>) {
        let change = self.chain.as_mut().and_then(|chain| chain.fire_due(now_ms));
        if let Some(change) = change {
            self.apply_phase_change(change, events);
        }
    }

    fn apply_phase_change(&mut self, change: PhaseChange, events: &mut Vec<Event>) {
        debug!(index = change.index, phase = %change.phase.name, "phase changed");
        self.haptics.cancel_all();
        if let Some(pattern) = self.palette.for_phase(change.phase.kind) {
            self.haptics.pulse(pattern);
        }
        events.push(Event::PhaseChanged {
            phase_index: change.index,
            phase_name: change.phase.name.clone(),
            kind: change.phase.kind,
            at_ms: change.at_ms,
        });
        self.state.current_phase_index = Some(change.index);
        self.state.current_phase = Some(change.phase);
    }

    fn preparation_pulse(&mut self) {
        if let Some(pattern) = self.palette.preparation_tick() {
            self.haptics.pulse(pattern);
        }
    }

    /// Ordered stop sequence; the order avoids a stray pulse after stopping.
    fn stop_with(&mut self, reason: StopReason, now_ms: u64, events: &mut Vec<Event>) {
        // 1. preparation timer and its pending pulse
        if self.state.mode == SessionMode::Preparing {
            self.timers.cancel_slot(&mut self.preparation_timer);
            self.haptics.cancel_all();
        }
        // 2. in-flight pulse
        self.haptics.cancel_all();
        // 3. phase chain
        if let Some(chain) = self.chain.as_mut() {
            chain.cancel();
        }
        self.chain = None;
        // 4. ease back to rest
        self.driver.stop(&mut self.value, now_ms);
        // 5. session countdown
        self.timers.cancel_slot(&mut self.countdown_timer);
        // 6. catch a pulse issued concurrently with step 2
        self.timers.cancel_slot(&mut self.recancel_timer);
        self.recancel_timer = Some(
            self.timers
                .schedule_at(now_ms + self.recancel_delay_ms, SessionTask::HapticRecancel),
        );

        info!(?reason, "session stopped");
        self.state = SessionState::idle(self.state.pattern.clone(), &self.config);
        events.push(Event::SessionStopped {
            reason,
            at_ms: now_ms,
        });
    }
}
