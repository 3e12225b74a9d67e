//! Built-in breathing patterns.
//!
//! Built-ins are created at process start, are immutable and cannot be
//! deleted. Exactly one of them is marked as the default.

use crate::pattern::{Pattern, Phase, PhaseKind};

pub const DEFAULT_PATTERN_ID: &str = "default";

fn inhale(secs: u32) -> Phase {
    Phase::of(PhaseKind::Inhale, secs)
}

fn hold(secs: u32) -> Phase {
    Phase::of(PhaseKind::Hold, secs)
}

fn exhale(secs: u32) -> Phase {
    Phase::of(PhaseKind::Exhale, secs)
}

/// The built-in catalogue, in display order.
pub fn builtin_patterns() -> Vec<Pattern> {
    vec![
        Pattern {
            is_default: Some(true),
            ..Pattern::new(DEFAULT_PATTERN_ID, "Classic", vec![inhale(4), exhale(6)])
                .with_description("4 s of fresh air, 6 s of letting go: instant calm.")
        },
        Pattern::new("box", "Box", vec![inhale(4), hold(4), exhale(4), hold(4)])
            .with_description("4-4-4-4: a square rhythm for a clear mind."),
        Pattern::new("478", "4-7-8", vec![inhale(4), hold(7), exhale(8)])
            .with_description("The express formula for falling asleep."),
        Pattern::new("coherence55", "Coherence 5-5", vec![inhale(5), exhale(5)])
            .with_description("6 cycles per minute to align heart and mind."),
        Pattern::new(
            "cyclicSigh",
            "Cyclic sigh",
            vec![
                Phase::new("Inhale 1", PhaseKind::Inhale, 2),
                Phase::new("Inhale 2", PhaseKind::Inhale, 1),
                exhale(6),
            ],
        )
        .with_description("Double inhale, long exhale: immediate calm."),
        Pattern::new("triangle", "Triangle 4-4-4", vec![inhale(4), hold(4), exhale(4)])
            .with_description("Quick focus: inhale, hold, exhale in balance."),
        Pattern::new("relax46", "4-6 Relax", vec![inhale(4), exhale(6)])
            .with_description("A longer exhale to switch on the parasympathetic system."),
        Pattern::new(
            "nadiShodhana",
            "Nadi Shodhana",
            vec![inhale(4), hold(4), exhale(4), hold(4)],
        )
        .with_description("Alternate nostrils for clarity and serenity."),
        Pattern::new("oneMinuteBreath", "1-Minute Breath", vec![inhale(20), hold(20), exhale(20)])
            .with_description("20-20-20 challenge: one breath per minute."),
    ]
}

/// The pattern marked as default, or the first built-in.
pub fn default_pattern() -> Pattern {
    let mut patterns = builtin_patterns();
    let index = patterns.iter().position(Pattern::is_default).unwrap_or(0);
    patterns.swap_remove(index)
}

pub fn is_builtin(id: &str) -> bool {
    builtin_patterns().iter().any(|p| p.id == id)
}
