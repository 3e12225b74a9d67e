//! Haptic feedback.
//!
//! The sink is fire-and-forget: the core never waits for or reads back
//! anything from the device.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::pattern::PhaseKind;
use crate::storage::HapticsConfig;

/// Vibration shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum HapticPattern {
    /// A single vibration of `duration_ms`.
    Pulse { duration_ms: u64 },
    /// Alternating wait/vibrate durations, starting with a wait.
    Sequence { timings_ms: Vec<u64> },
}

impl HapticPattern {
    /// Total time the pattern occupies the motor.
    pub fn total_ms(&self) -> u64 {
        match self {
            HapticPattern::Pulse { duration_ms } => *duration_ms,
            HapticPattern::Sequence { timings_ms } => timings_ms.iter().sum(),
        }
    }
}

pub trait HapticSink {
    fn pulse(&mut self, pattern: &HapticPattern);
    fn cancel_all(&mut self);
}

/// Pulse shapes keyed by phase semantics.
#[derive(Debug, Clone)]
pub struct HapticPalette {
    enabled: bool,
    inhale: HapticPattern,
    exhale: HapticPattern,
    preparation: HapticPattern,
}

impl HapticPalette {
    pub fn new(config: &HapticsConfig) -> Self {
        Self {
            enabled: config.enabled,
            inhale: HapticPattern::Pulse {
                duration_ms: config.inhale_pulse_ms,
            },
            exhale: HapticPattern::Sequence {
                timings_ms: config.exhale_pattern.clone(),
            },
            preparation: HapticPattern::Pulse {
                duration_ms: config.preparation_pulse_ms,
            },
        }
    }

    /// Pattern for a phase that just began. Holds and other phases are silent.
    pub fn for_phase(&self, kind: PhaseKind) -> Option<&HapticPattern> {
        if !self.enabled {
            return None;
        }
        match kind {
            PhaseKind::Inhale => Some(&self.inhale),
            PhaseKind::Exhale => Some(&self.exhale),
            PhaseKind::Hold | PhaseKind::Other => None,
        }
    }

    /// Pattern for one preparation countdown tick.
    pub fn preparation_tick(&self) -> Option<&HapticPattern> {
        self.enabled.then_some(&self.preparation)
    }
}

impl Default for HapticPalette {
    fn default() -> Self {
        Self::new(&HapticsConfig::default())
    }
}

/// Sink that only traces, for hosts without a vibration motor.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogHaptics;

impl HapticSink for LogHaptics {
    fn pulse(&mut self, pattern: &HapticPattern) {
        debug!(?pattern, "haptic pulse");
    }

    fn cancel_all(&mut self) {
        debug!("haptics cancelled");
    }
}

/// Records every call, newest last.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HapticCall {
    Pulse(HapticPattern),
    CancelAll,
}

#[derive(Debug, Clone, Default)]
pub struct RecordingHaptics {
    pub calls: Vec<HapticCall>,
}

impl RecordingHaptics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pulses(&self) -> Vec<&HapticPattern> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                HapticCall::Pulse(p) => Some(p),
                HapticCall::CancelAll => None,
            })
            .collect()
    }

    pub fn clear(&mut self) {
        self.calls.clear();
    }
}

impl HapticSink for RecordingHaptics {
    fn pulse(&mut self, pattern: &HapticPattern) {
        self.calls.push(HapticCall::Pulse(pattern.clone()));
    }

    fn cancel_all(&mut self) {
        self.calls.push(HapticCall::CancelAll);
    }
}
