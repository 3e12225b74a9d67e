use serde::{Deserialize, Serialize};

use crate::pattern::PhaseKind;

/// Why a session went back to idle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// Stopped during the preparation countdown.
    Cancelled,
    UserStopped,
    /// Session countdown reached zero.
    Completed,
    /// Host tore the controller down.
    Teardown,
}

/// Every state change in the core produces an Event.
/// The presentation layer polls for them; `at_ms` is the virtual clock.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    PreparationStarted {
        pattern_id: String,
        remaining_secs: u32,
        at_ms: u64,
    },
    PreparationTick {
        remaining_secs: u32,
        at_ms: u64,
    },
    SessionStarted {
        pattern_id: String,
        duration_secs: u32,
        at_ms: u64,
    },
    PhaseChanged {
        phase_index: usize,
        phase_name: String,
        kind: PhaseKind,
        at_ms: u64,
    },
    CountdownTick {
        remaining_secs: u32,
        at_ms: u64,
    },
    PatternSwitched {
        from: String,
        to: String,
        at_ms: u64,
    },
    SessionStopped {
        reason: StopReason,
        at_ms: u64,
    },
    PatternSaved {
        pattern_id: String,
        at_ms: u64,
    },
    PatternDeleted {
        pattern_id: String,
        /// Set when the deleted pattern was selected and selection fell back.
        fallback_to: Option<String>,
        at_ms: u64,
    },
}

impl Event {
    pub fn at_ms(&self) -> u64 {
        match self {
            Event::PreparationStarted { at_ms, .. }
            | Event::PreparationTick { at_ms, .. }
            | Event::SessionStarted { at_ms, .. }
            | Event::PhaseChanged { at_ms, .. }
            | Event::CountdownTick { at_ms, .. }
            | Event::PatternSwitched { at_ms, .. }
            | Event::SessionStopped { at_ms, .. }
            | Event::PatternSaved { at_ms, .. }
            | Event::PatternDeleted { at_ms, .. } => *at_ms,
        }
    }
}
