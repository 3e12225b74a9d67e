//! Breathing pattern data model.
//!
//! A [`Pattern`] is an ordered, non-empty list of timed [`Phase`]s. Each phase
//! carries an explicit [`PhaseKind`]; the free-text name is for display only.
//! Records persisted without a `kind` (older data) get one inferred from the
//! name when they are loaded.

use serde::{Deserialize, Serialize};

/// Semantic role of a phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PhaseKind {
    Inhale,
    Hold,
    Exhale,
    Other,
}

impl PhaseKind {
    /// Infer a kind from a display label by case-insensitive substring.
    ///
    /// Recognises the English and French labels used by the catalogue.
    pub fn infer(name: &str) -> Self {
        let lower = name.to_lowercase();
        if lower.contains("inhale") || lower.contains("inspir") {
            PhaseKind::Inhale
        } else if lower.contains("exhale") || lower.contains("expir") {
            PhaseKind::Exhale
        } else if lower.contains("hold") || lower.contains("reten") {
            PhaseKind::Hold
        } else {
            PhaseKind::Other
        }
    }

    pub fn default_label(self) -> &'static str {
        match self {
            PhaseKind::Inhale => "Inhale",
            PhaseKind::Hold => "Hold",
            PhaseKind::Exhale => "Exhale",
            PhaseKind::Other => "Pause",
        }
    }

    pub fn default_color(self) -> &'static str {
        match self {
            PhaseKind::Inhale => "#6ECBF5",
            PhaseKind::Exhale => "#94D8B9",
            PhaseKind::Hold | PhaseKind::Other => "#F5DD90",
        }
    }
}

/// One timed step of a pattern.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "RawPhase")]
pub struct Phase {
    pub name: String,
    pub kind: PhaseKind,
    pub duration_seconds: u32,
    /// Display colour token, e.g. `#6ECBF5`.
    pub color: String,
}

/// Wire shape accepted on load; `kind` is optional for older records.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawPhase {
    name: String,
    #[serde(default)]
    kind: Option<PhaseKind>,
    duration_seconds: u32,
    #[serde(default)]
    color: String,
}

impl From<RawPhase> for Phase {
    fn from(raw: RawPhase) -> Self {
        let kind = raw.kind.unwrap_or_else(|| PhaseKind::infer(&raw.name));
        Self {
            name: raw.name,
            kind,
            duration_seconds: raw.duration_seconds,
            color: raw.color,
        }
    }
}

impl Phase {
    pub fn new(name: impl Into<String>, kind: PhaseKind, duration_seconds: u32) -> Self {
        Self {
            name: name.into(),
            kind,
            duration_seconds,
            color: kind.default_color().to_string(),
        }
    }

    /// Shorthand for a phase labelled with the kind's default label.
    pub fn of(kind: PhaseKind, duration_seconds: u32) -> Self {
        Self::new(kind.default_label(), kind, duration_seconds)
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = color.into();
        self
    }

    /// Get phase duration in milliseconds.
    pub fn duration_ms(&self) -> u64 {
        u64::from(self.duration_seconds).saturating_mul(1000)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pattern {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub phases: Vec<Phase>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_default: Option<bool>,
}

impl Pattern {
    pub fn new(id: impl Into<String>, name: impl Into<String>, phases: Vec<Phase>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            phases,
            is_default: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn is_default(&self) -> bool {
        self.is_default.unwrap_or(false)
    }

    pub fn phase(&self, index: usize) -> Option<&Phase> {
        self.phases.get(index)
    }

    /// Sum of all phase durations in seconds.
    pub fn cycle_secs(&self) -> u64 {
        self.phases.iter().map(|p| u64::from(p.duration_seconds)).sum()
    }

    /// Approximate breaths per minute, `None` for a zero-length cycle.
    pub fn cycles_per_minute(&self) -> Option<f64> {
        match self.cycle_secs() {
            0 => None,
            total => Some(60.0 / total as f64),
        }
    }
}
