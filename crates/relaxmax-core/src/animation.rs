//! Continuous animated scalar.
//!
//! An [`AnimatedValue`] is a tween sequence evaluated lazily: it stores where
//! a motion started and what it looks like, and the render loop samples it
//! with [`AnimatedValue::value_at`]. There is no internal timer; cancelling
//! freezes the value wherever it currently is.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Easing {
    Linear,
    /// Quadratic acceleration for the first half, deceleration for the second.
    EaseInOutQuad,
}

impl Easing {
    /// Map linear progress `t` in `[0, 1]` to eased progress.
    pub fn apply(self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::Linear => t,
            Easing::EaseInOutQuad => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    1.0 - (2.0 - 2.0 * t).powi(2) / 2.0
                }
            }
        }
    }
}

/// One timed move of the scalar towards `target`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transition {
    pub target: f64,
    pub duration_ms: u64,
    pub easing: Easing,
}

impl Transition {
    pub fn eased(target: f64, duration_ms: u64) -> Self {
        Self {
            target,
            duration_ms,
            easing: Easing::EaseInOutQuad,
        }
    }

    fn interpolate(&self, from: f64, elapsed_ms: u64) -> f64 {
        if self.duration_ms == 0 {
            return self.target;
        }
        let t = elapsed_ms as f64 / self.duration_ms as f64;
        from + (self.target - from) * self.easing.apply(t)
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Motion {
    Still,
    Once {
        from: f64,
        transition: Transition,
        started_at_ms: u64,
    },
    /// Gapless sequence played forward forever, never reversed.
    Repeat {
        from: f64,
        transitions: Vec<Transition>,
        started_at_ms: u64,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnimatedValue {
    base: f64,
    motion: Motion,
}

impl AnimatedValue {
    pub fn new(initial: f64) -> Self {
        Self {
            base: initial,
            motion: Motion::Still,
        }
    }

    /// Sample the value at `now_ms`.
    pub fn value_at(&self, now_ms: u64) -> f64 {
        match &self.motion {
            Motion::Still => self.base,
            Motion::Once {
                from,
                transition,
                started_at_ms,
            } => {
                let elapsed = now_ms.saturating_sub(*started_at_ms);
                if elapsed >= transition.duration_ms {
                    transition.target
                } else {
                    transition.interpolate(*from, elapsed)
                }
            }
            Motion::Repeat {
                from,
                transitions,
                started_at_ms,
            } => sample_sequence(*from, transitions, now_ms.saturating_sub(*started_at_ms)),
        }
    }

    /// True while a motion is still changing the value at `now_ms`.
    pub fn is_animating(&self, now_ms: u64) -> bool {
        match &self.motion {
            Motion::Still => false,
            Motion::Once {
                transition,
                started_at_ms,
                ..
            } => now_ms.saturating_sub(*started_at_ms) < transition.duration_ms,
            Motion::Repeat { .. } => true,
        }
    }

    /// Stop any motion, keeping the value reached at `now_ms`.
    pub fn cancel(&mut self, now_ms: u64) {
        self.base = self.value_at(now_ms);
        self.motion = Motion::Still;
    }

    /// Jump to `value` without animating.
    pub fn set(&mut self, value: f64) {
        self.base = value;
        self.motion = Motion::Still;
    }

    /// Cancel the current motion and run a single transition from where the
    /// value is now.
    pub fn animate_to(&mut self, now_ms: u64, transition: Transition) {
        self.cancel(now_ms);
        self.motion = Motion::Once {
            from: self.base,
            transition,
            started_at_ms: now_ms,
        };
    }

    /// Cancel the current motion and loop `transitions` forever.
    ///
    /// An empty sequence leaves the value still.
    pub fn repeat(&mut self, now_ms: u64, transitions: Vec<Transition>) {
        self.cancel(now_ms);
        if transitions.is_empty() {
            return;
        }
        self.motion = Motion::Repeat {
            from: self.base,
            transitions,
            started_at_ms: now_ms,
        };
    }
}

fn sample_sequence(from: f64, transitions: &[Transition], elapsed_ms: u64) -> f64 {
    let Some(last) = transitions.last() else {
        return from;
    };
    let cycle_ms: u64 = transitions.iter().map(|t| t.duration_ms).sum();
    if cycle_ms == 0 {
        return last.target;
    }
    // The first pass starts from wherever the value was; later passes start
    // from the end of the previous one.
    let (mut start, mut within) = if elapsed_ms < cycle_ms {
        (from, elapsed_ms)
    } else {
        (last.target, elapsed_ms % cycle_ms)
    };
    for transition in transitions {
        if within < transition.duration_ms {
            return transition.interpolate(start, within);
        }
        within -= transition.duration_ms;
        start = transition.target;
    }
    last.target
}

/// Coarse 0-100 progress inferred from consecutive samples of the value.
///
/// Direction comes from the sign of the change between samples, not from the
/// active phase, so holds (no change) keep the last reading. The rest and
/// peak ends of the range read 0 and 100 even without a previous sample.
#[derive(Debug, Clone)]
pub struct ProgressTracker {
    rest: f64,
    peak: f64,
    previous: Option<f64>,
    progress: u8,
}

impl Default for ProgressTracker {
    fn default() -> Self {
        Self::with_range(0.5, 1.0)
    }
}

impl ProgressTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tracker for a value moving between `rest` and `peak`.
    pub fn with_range(rest: f64, peak: f64) -> Self {
        Self {
            rest,
            peak,
            previous: None,
            progress: 0,
        }
    }

    /// Feed a new sample and return the current progress.
    pub fn observe(&mut self, value: f64) -> u8 {
        if let Some(progress) = progress_between(self.previous, value, self.rest, self.peak) {
            self.progress = progress;
        }
        self.previous = Some(value);
        self.progress
    }

    pub fn progress(&self) -> u8 {
        self.progress
    }

    /// Forget past samples, keeping the range.
    pub fn reset(&mut self) {
        *self = Self::with_range(self.rest, self.peak);
    }
}

/// Progress for `value` on the `rest..peak` range given the sample before it.
///
/// `None` when the value sits strictly inside the range and its direction is
/// unknown, either because there is no previous sample or it did not move.
pub fn progress_between(previous: Option<f64>, value: f64, rest: f64, peak: f64) -> Option<u8> {
    if value <= rest {
        return Some(0);
    }
    if value >= peak {
        return Some(100);
    }
    let span = peak - rest;
    let previous = previous?;
    if value > previous {
        Some((((value - rest) / span) * 100.0).floor() as u8)
    } else if value < previous {
        let exhaled = (((peak - value) / span) * 100.0).floor() as u8;
        Some(100 - exhaled)
    } else {
        None
    }
}
