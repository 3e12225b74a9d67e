//! Pattern authoring.
//!
//! [`PatternDraft`] is the editable form behind "create" and "edit". Every
//! mutation validates locally; a rejected edit leaves the draft untouched.

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::error::ValidationError;
use crate::pattern::{Pattern, Phase, PhaseKind};

pub const MIN_PHASE_SECS: u32 = 1;
pub const MAX_PHASE_SECS: u32 = 15;
pub const NEW_PHASE_SECS: u32 = 4;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternDraft {
    id: Option<String>,
    pub name: String,
    pub description: String,
    phases: Vec<Phase>,
}

impl Default for PatternDraft {
    fn default() -> Self {
        Self::new()
    }
}

impl PatternDraft {
    /// A fresh draft: inhale 4 s, exhale 6 s.
    pub fn new() -> Self {
        Self {
            id: None,
            name: "My breathing exercise".to_string(),
            description: String::new(),
            phases: vec![Phase::of(PhaseKind::Inhale, 4), Phase::of(PhaseKind::Exhale, 6)],
        }
    }

    /// A draft editing an existing pattern; saving keeps its id.
    pub fn from_pattern(pattern: &Pattern) -> Self {
        Self {
            id: Some(pattern.id.clone()),
            name: pattern.name.clone(),
            description: pattern.description.clone(),
            phases: pattern.phases.clone(),
        }
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn phases(&self) -> &[Phase] {
        &self.phases
    }

    pub fn add_phase(&mut self, kind: PhaseKind) {
        self.phases.push(Phase::of(kind, NEW_PHASE_SECS));
    }

    /// Set a phase duration from raw form input.
    ///
    /// Non-numeric or sub-second input is rejected; anything above the
    /// maximum is clamped to it.
    pub fn set_duration(&mut self, index: usize, input: &str) -> Result<u32, ValidationError> {
        let len = self.phases.len();
        let secs = input
            .trim()
            .parse::<i64>()
            .ok()
            .filter(|secs| *secs >= i64::from(MIN_PHASE_SECS))
            .ok_or_else(|| ValidationError::InvalidDuration(input.to_string()))?;
        let secs = secs.min(i64::from(MAX_PHASE_SECS)) as u32;
        let phase = self
            .phases
            .get_mut(index)
            .ok_or(ValidationError::OutOfBounds { index, len })?;
        phase.duration_seconds = secs;
        Ok(secs)
    }

    /// Remove a phase. The last remaining phase cannot be removed.
    pub fn remove_phase(&mut self, index: usize) -> Result<Phase, ValidationError> {
        let len = self.phases.len();
        if index >= len {
            return Err(ValidationError::OutOfBounds { index, len });
        }
        if len <= 1 {
            debug!("refusing to remove the last phase");
            return Err(ValidationError::LastPhase);
        }
        Ok(self.phases.remove(index))
    }

    /// Swap with the previous phase. No-op for the first one.
    pub fn move_up(&mut self, index: usize) {
        if index > 0 && index < self.phases.len() {
            self.phases.swap(index - 1, index);
        }
    }

    /// Swap with the next phase. No-op for the last one.
    pub fn move_down(&mut self, index: usize) {
        if index + 1 < self.phases.len() {
            self.phases.swap(index, index + 1);
        }
    }

    /// Produce the pattern to save.
    ///
    /// New patterns get an id derived from `now`.
    pub fn build(&self, now: DateTime<Utc>) -> Result<Pattern, ValidationError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(ValidationError::EmptyName);
        }
        if self.phases.is_empty() {
            return Err(ValidationError::LastPhase);
        }
        let description = match self.description.trim() {
            "" => format!("Custom pattern with {} phases", self.phases.len()),
            d => d.to_string(),
        };
        let id = self
            .id
            .clone()
            .unwrap_or_else(|| format!("custom_{}", now.timestamp_millis()));
        Ok(Pattern::new(id, name, self.phases.clone()).with_description(description))
    }
}
