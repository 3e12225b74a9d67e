//! Phase animation driver.
//!
//! Turns a [`Pattern`] into two independent mechanisms derived from the same
//! phase durations:
//!
//! - a repeating tween sequence on an [`AnimatedValue`] that moves between
//!   the rest and peak values, one eased transition per phase;
//! - a [`PhaseChain`], a self-rescheduling timer that reports each phase
//!   boundary.
//!
//! The driver keeps no state between calls. Every `start` cancels whatever
//! the value was doing first.
//!
//! ```text
//! t=0        4s          10s         14s
//! |--inhale--|---exhale---|--inhale--| ...
//! 0.5 -----> 1.0 -------> 0.5 -----> 1.0
//! ^ change   ^ change     ^ change
//! ```

use serde::{Deserialize, Serialize};
use tracing::{debug, error, warn};

use crate::animation::{AnimatedValue, Transition};
use crate::pattern::{Pattern, Phase, PhaseKind};
use crate::storage::AnimationConfig;

/// A phase that has just become active.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhaseChange {
    pub index: usize,
    pub phase: Phase,
    pub at_ms: u64,
}

/// Sum of all phase durations, in seconds.
pub fn total_cycle_duration(pattern: &Pattern) -> u64 {
    pattern.cycle_secs()
}

#[derive(Debug, Clone, Default)]
pub struct PhaseDriver {
    config: AnimationConfig,
}

impl PhaseDriver {
    pub fn new(config: AnimationConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AnimationConfig {
        &self.config
    }

    /// Target value for every phase, in order.
    ///
    /// Inhale goes to the peak, exhale and unknown phases to rest. A hold
    /// keeps whatever the nearest preceding non-hold phase resolved to,
    /// wrapping around to the end of the pattern.
    pub fn phase_targets(&self, pattern: &Pattern) -> Vec<f64> {
        let phases = &pattern.phases;
        let n = phases.len();
        let resolve = |kind: PhaseKind| match kind {
            PhaseKind::Inhale => Some(self.config.peak_value),
            PhaseKind::Exhale | PhaseKind::Other => Some(self.config.rest_value),
            PhaseKind::Hold => None,
        };
        (0..n)
            .map(|i| {
                (0..n)
                    .map(|back| &phases[(i + n - back) % n])
                    .find_map(|p| resolve(p.kind))
                    .unwrap_or(self.config.rest_value)
            })
            .collect()
    }

    /// One eased transition per phase.
    pub fn transitions(&self, pattern: &Pattern) -> Vec<Transition> {
        self.phase_targets(pattern)
            .into_iter()
            .zip(&pattern.phases)
            .map(|(target, phase)| Transition::eased(target, phase.duration_ms()))
            .collect()
    }

    /// Start animating `value` through `pattern` and, when a callback is
    /// given, start the phase-boundary chain.
    ///
    /// The callback is invoked with phase 0 before this returns; later
    /// boundaries fire from [`PhaseChain::poll`]. Returns `None` when no
    /// callback is given or the pattern has no phases.
    pub fn start(
        &self,
        value: &mut AnimatedValue,
        pattern: &Pattern,
        now_ms: u64,
        on_phase_change: Option<&mut dyn FnMut(&PhaseChange)>,
    ) -> Option<PhaseChain> {
        value.cancel(now_ms);

        if pattern.phases.is_empty() {
            error!(pattern_id = %pattern.id, "invalid breathing pattern: no phases");
            return None;
        }

        debug!(
            pattern_id = %pattern.id,
            phases = pattern.phases.len(),
            cycle_secs = total_cycle_duration(pattern),
            "starting breathing animation"
        );
        value.repeat(now_ms, self.transitions(pattern));

        let on_phase_change = on_phase_change?;
        let (chain, first) = PhaseChain::start(pattern, now_ms);
        on_phase_change(&first);
        Some(chain)
    }

    /// Cancel the value's motion and ease it back to rest.
    ///
    /// Leaves any phase chain alone; callers cancel that separately.
    pub fn stop(&self, value: &mut AnimatedValue, now_ms: u64) {
        value.animate_to(
            now_ms,
            Transition::eased(self.config.rest_value, self.config.stop_duration_ms),
        );
    }
}

/// Cancellable, self-rescheduling phase-boundary timer.
///
/// Holds exactly one pending boundary at a time. After firing it reschedules
/// itself for the duration of the phase it just announced.
#[derive(Debug, Clone)]
pub struct PhaseChain {
    phases: Vec<Phase>,
    index: usize,
    next_boundary_ms: Option<u64>,
}

impl PhaseChain {
    fn start(pattern: &Pattern, now_ms: u64) -> (Self, PhaseChange) {
        let phases = pattern.phases.clone();
        let first = PhaseChange {
            index: 0,
            phase: phases[0].clone(),
            at_ms: now_ms,
        };
        let next_boundary_ms = if pattern.cycle_secs() == 0 {
            warn!(pattern_id = %pattern.id, "zero-length cycle, phase changes will not repeat");
            None
        } else {
            Some(now_ms + phases[0].duration_ms())
        };
        let chain = Self {
            phases,
            index: 0,
            next_boundary_ms,
        };
        (chain, first)
    }

    /// Deadline of the pending boundary, `None` once cancelled.
    pub fn next_boundary_ms(&self) -> Option<u64> {
        self.next_boundary_ms
    }

    pub fn current_index(&self) -> usize {
        self.index
    }

    pub fn is_cancelled(&self) -> bool {
        self.next_boundary_ms.is_none()
    }

    /// Drop the pending boundary. Idempotent.
    pub fn cancel(&mut self) {
        self.next_boundary_ms = None;
    }

    /// Fire the pending boundary if it is due at `now_ms`.
    pub fn fire_due(&mut self, now_ms: u64) -> Option<PhaseChange> {
        let due = self.next_boundary_ms.filter(|due| *due <= now_ms)?;
        self.index = (self.index + 1) % self.phases.len();
        let phase = self.phases[self.index].clone();
        self.next_boundary_ms = Some(due + phase.duration_ms());
        Some(PhaseChange {
            index: self.index,
            phase,
            at_ms: due,
        })
    }

    /// Fire every boundary due at or before `now_ms`, returning how many fired.
    pub fn poll(&mut self, now_ms: u64, on_phase_change: &mut dyn FnMut(&PhaseChange)) -> usize {
        let mut fired = 0;
        while let Some(change) = self.fire_due(now_ms) {
            on_phase_change(&change);
            fired += 1;
        }
        fired
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pattern(phases: &[(PhaseKind, u32)]) -> Pattern {
        Pattern::new(
            "test",
            "Test",
            phases.iter().map(|&(kind, secs)| Phase::of(kind, secs)).collect(),
        )
    }

    #[test]
    fn box_holds_follow_preceding_phase() {
        let driver = PhaseDriver::default();
        let p = pattern(&[
            (PhaseKind::Inhale, 4),
            (PhaseKind::Hold, 4),
            (PhaseKind::Exhale, 4),
            (PhaseKind::Hold, 4),
        ]);
        assert_eq!(driver.phase_targets(&p), vec![1.0, 1.0, 0.5, 0.5]);
    }

    #[test]
    fn leading_hold_wraps_to_last_phase() {
        let driver = PhaseDriver::default();
        let p = pattern(&[(PhaseKind::Hold, 2), (PhaseKind::Exhale, 4), (PhaseKind::Inhale, 4)]);
        assert_eq!(driver.phase_targets(&p), vec![1.0, 0.5, 1.0]);
    }

    #[test]
    fn consecutive_holds_and_all_hold() {
        let driver = PhaseDriver::default();
        let p = pattern(&[(PhaseKind::Inhale, 2), (PhaseKind::Hold, 2), (PhaseKind::Hold, 2)]);
        assert_eq!(driver.phase_targets(&p), vec![1.0, 1.0, 1.0]);

        let all_hold = pattern(&[(PhaseKind::Hold, 2), (PhaseKind::Hold, 2)]);
        assert_eq!(driver.phase_targets(&all_hold), vec![0.5, 0.5]);
    }

    #[test]
    fn other_phases_rest_and_hold_after_other_rests() {
        let driver = PhaseDriver::default();
        let p = pattern(&[(PhaseKind::Other, 3), (PhaseKind::Hold, 3), (PhaseKind::Inhale, 3)]);
        assert_eq!(driver.phase_targets(&p), vec![0.5, 0.5, 1.0]);
    }

    #[test]
    fn transitions_use_phase_durations() {
        let driver = PhaseDriver::default();
        let p = pattern(&[(PhaseKind::Inhale, 4), (PhaseKind::Exhale, 6)]);
        let ts = driver.transitions(&p);
        assert_eq!(ts.len(), 2);
        assert_eq!(ts[0].duration_ms, 4_000);
        assert_eq!(ts[1].duration_ms, 6_000);
    }

    #[test]
    fn start_without_callback_returns_none_but_animates() {
        let driver = PhaseDriver::default();
        let mut value = AnimatedValue::new(0.5);
        let p = pattern(&[(PhaseKind::Inhale, 4), (PhaseKind::Exhale, 6)]);
        assert!(driver.start(&mut value, &p, 0, None).is_none());
        assert!((value.value_at(4_000) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn empty_pattern_schedules_nothing() {
        let driver = PhaseDriver::default();
        let mut value = AnimatedValue::new(0.5);
        let mut calls = 0;
        let chain = driver.start(
            &mut value,
            &pattern(&[]),
            0,
            Some(&mut |_: &PhaseChange| calls += 1),
        );
        assert!(chain.is_none());
        assert_eq!(calls, 0);
        assert!(!value.is_animating(100));
    }

    #[test]
    fn chain_cycles_through_phases() {
        let driver = PhaseDriver::default();
        let mut value = AnimatedValue::new(0.5);
        let p = pattern(&[(PhaseKind::Inhale, 4), (PhaseKind::Exhale, 6)]);
        let mut seen = Vec::new();
        let mut chain = driver
            .start(&mut value, &p, 0, Some(&mut |c: &PhaseChange| seen.push(c.index)))
            .unwrap();
        assert_eq!(seen, vec![0]);

        let mut record = |c: &PhaseChange| seen.push(c.index);
        assert_eq!(chain.poll(3_999, &mut record), 0);
        assert_eq!(chain.poll(4_000, &mut record), 1);
        assert_eq!(chain.poll(10_000, &mut record), 1);
        assert_eq!(chain.poll(20_000, &mut record), 2);
        assert_eq!(seen, vec![0, 1, 0, 1, 0]);
    }

    #[test]
    fn cancelled_chain_never_fires() {
        let driver = PhaseDriver::default();
        let mut value = AnimatedValue::new(0.5);
        let p = pattern(&[(PhaseKind::Inhale, 4), (PhaseKind::Exhale, 6)]);
        let mut chain = driver
            .start(&mut value, &p, 0, Some(&mut |_: &PhaseChange| {}))
            .unwrap();
        chain.cancel();
        assert!(chain.is_cancelled());
        assert_eq!(chain.poll(1_000_000, &mut |_: &PhaseChange| {}), 0);
        // The value keeps moving until stopped separately.
        assert!(value.is_animating(1_000_000));
    }

    #[test]
    fn stop_eases_back_to_rest() {
        let driver = PhaseDriver::default();
        let mut value = AnimatedValue::new(0.5);
        let p = pattern(&[(PhaseKind::Inhale, 4), (PhaseKind::Exhale, 6)]);
        driver.start(&mut value, &p, 0, None);
        driver.stop(&mut value, 4_000);
        assert!((value.value_at(4_000) - 1.0).abs() < 1e-9);
        assert!((value.value_at(4_500) - 0.5).abs() < 1e-9);
        assert!(!value.is_animating(4_500));
    }
}
