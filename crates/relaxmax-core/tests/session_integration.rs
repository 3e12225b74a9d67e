//! End-to-end tests through the application facade.
//!
//! Time is virtual: every call passes the current millisecond explicitly.

use chrono::{TimeZone, Utc};
use relaxmax_core::catalogue::DEFAULT_PATTERN_ID;
use relaxmax_core::haptics::HapticCall;
use relaxmax_core::{
    BreathingApp, Config, Event, MemoryStore, PatternDraft, PatternStore, PhaseKind,
    RecordingHaptics, SessionMode, StopReason,
};

const PREP_MS: u64 = 5_000;

fn app() -> BreathingApp<MemoryStore, RecordingHaptics> {
    relaxmax_core::logging::init();
    BreathingApp::new(
        &Config::default(),
        PatternStore::new(MemoryStore::new()),
        RecordingHaptics::new(),
    )
}

fn phase_changes(events: &[Event]) -> Vec<(usize, u64)> {
    events
        .iter()
        .filter_map(|e| match e {
            Event::PhaseChanged {
                phase_index, at_ms, ..
            } => Some((*phase_index, *at_ms)),
            _ => None,
        })
        .collect()
}

#[test]
fn full_session_runs_to_completion() {
    let mut app = app();
    app.start_session(0);
    assert_eq!(app.display_state(0).session_mode, SessionMode::Preparing);

    app.tick(PREP_MS);
    let display = app.display_state(PREP_MS);
    assert_eq!(display.session_mode, SessionMode::Active);
    assert_eq!(display.countdown_remaining_secs, 300);
    assert_eq!(display.current_phase.map(|p| p.kind), Some(PhaseKind::Inhale));

    let events = app.tick(PREP_MS + 300_000);
    assert!(events.iter().any(|e| matches!(
        e,
        Event::SessionStopped {
            reason: StopReason::Completed,
            ..
        }
    )));
    // Classic 4/6: 30 cycles of two phases, the boundary at 300 s loses the
    // tie to the countdown.
    assert_eq!(phase_changes(&events).len(), 59);

    app.tick(PREP_MS + 400_000);
    assert_eq!(app.session().pending_timers(), 0);
    assert_eq!(app.display_state(PREP_MS + 400_000).session_mode, SessionMode::Idle);
}

#[test]
fn phase_chain_follows_classic_timing() {
    let mut app = app();
    app.start_session(0);
    let events = app.tick(PREP_MS);
    assert_eq!(phase_changes(&events), vec![(0, PREP_MS)]);

    let events = app.tick(PREP_MS + 3_999);
    assert!(phase_changes(&events).is_empty());
    let events = app.tick(PREP_MS + 4_000);
    assert_eq!(phase_changes(&events), vec![(1, PREP_MS + 4_000)]);
    let events = app.tick(PREP_MS + 10_000);
    assert_eq!(phase_changes(&events), vec![(0, PREP_MS + 10_000)]);
}

#[test]
fn switching_pattern_mid_session_keeps_countdown() {
    let mut app = app();
    app.start_session(0);
    app.tick(PREP_MS + 7_500);
    let before = app.display_state(PREP_MS + 7_500);
    assert_eq!(before.countdown_remaining_secs, 293);
    assert_eq!(before.current_phase.as_ref().map(|p| p.kind), Some(PhaseKind::Exhale));

    let events = app.select_pattern("box", PREP_MS + 7_500).unwrap();
    assert!(matches!(events[0], Event::PatternSwitched { .. }));
    assert_eq!(phase_changes(&events), vec![(0, PREP_MS + 7_500)]);

    let after = app.display_state(PREP_MS + 7_500);
    assert_eq!(after.session_mode, SessionMode::Active);
    assert_eq!(after.countdown_remaining_secs, 293);
    assert_eq!(after.current_phase.map(|p| p.kind), Some(PhaseKind::Inhale));
    assert_eq!(after.selected_pattern_id, "box");

    // Countdown keeps its one-second grid from the original start.
    let events = app.tick(PREP_MS + 8_000);
    assert!(events
        .iter()
        .any(|e| matches!(e, Event::CountdownTick { remaining_secs: 292, .. })));

    // New chain: box phases are 4 s each, measured from the switch.
    let events = app.tick(PREP_MS + 11_500);
    assert_eq!(phase_changes(&events), vec![(1, PREP_MS + 11_500)]);
}

#[test]
fn selecting_while_idle_just_changes_selection() {
    let mut app = app();
    let events = app.select_pattern("478", 0).unwrap();
    assert!(events.is_empty());
    assert_eq!(app.session().state().pattern.id, "478");
    assert!(app.select_pattern("does-not-exist", 0).is_err());
    assert_eq!(app.library().selected().id, "478");
}

#[test]
fn deleting_selected_custom_pattern_falls_back_to_default() {
    let mut app = app();
    let created_at = Utc.timestamp_millis_opt(1_000).unwrap();
    let (pattern, _) = app.create_pattern(&PatternDraft::new(), created_at, 0).unwrap();
    assert_eq!(app.library().selected().id, pattern.id);

    let events = app.delete_pattern(&pattern.id, 10).unwrap();
    assert!(matches!(
        &events[0],
        Event::PatternDeleted { fallback_to: Some(id), .. } if id == DEFAULT_PATTERN_ID
    ));
    assert_eq!(app.library().selected().id, DEFAULT_PATTERN_ID);
    assert_eq!(app.session().state().pattern.id, DEFAULT_PATTERN_ID);
}

#[test]
fn deleting_other_pattern_keeps_selection() {
    let mut app = app();
    let created_at = Utc.timestamp_millis_opt(1_000).unwrap();
    let (first, _) = app.create_pattern(&PatternDraft::new(), created_at, 0).unwrap();
    let (second, _) = app.create_pattern(&PatternDraft::new(), created_at, 0).unwrap();
    assert_ne!(first.id, second.id);

    let events = app.delete_pattern(&first.id, 10).unwrap();
    assert!(matches!(&events[0], Event::PatternDeleted { fallback_to: None, .. }));
    assert_eq!(app.library().selected().id, second.id);
}

#[test]
fn editing_selected_pattern_hot_swaps_running_session() {
    let mut app = app();
    let created_at = Utc.timestamp_millis_opt(1_000).unwrap();
    let (pattern, _) = app.create_pattern(&PatternDraft::new(), created_at, 0).unwrap();
    app.start_session(0);
    app.tick(PREP_MS + 1_000);

    let mut draft = PatternDraft::from_pattern(&pattern);
    draft.set_duration(0, "2").unwrap();
    let (edited, events) = app.edit_pattern(&draft, created_at, PREP_MS + 1_000).unwrap();
    assert_eq!(edited.id, pattern.id);
    assert!(events.iter().any(|e| matches!(e, Event::PatternSwitched { .. })));

    let events = app.tick(PREP_MS + 3_000);
    assert_eq!(phase_changes(&events), vec![(1, PREP_MS + 3_000)]);
}

#[test]
fn builtin_patterns_cannot_be_deleted() {
    let mut app = app();
    assert!(app.delete_pattern("box", 0).is_err());
    assert!(app.library().find("box").is_some());
}

#[test]
fn stop_then_wait_fires_nothing() {
    let mut app = app();
    app.start_session(0);
    app.tick(PREP_MS + 2_000);
    app.session_mut().haptics_mut().clear();

    let events = app.stop_session(PREP_MS + 2_000);
    assert!(matches!(
        events[0],
        Event::SessionStopped {
            reason: StopReason::UserStopped,
            ..
        }
    ));
    let events = app.tick(PREP_MS + 600_000);
    assert!(events.is_empty());
    assert!(app
        .session()
        .haptics()
        .calls
        .iter()
        .all(|c| *c == HapticCall::CancelAll));
    assert_eq!(app.session().pending_timers(), 0);
}

#[test]
fn progress_readout_follows_value() {
    let mut app = app();
    app.start_session(0);
    app.tick(PREP_MS);
    assert_eq!(app.display_state(PREP_MS).progress, 0);
    assert_eq!(app.display_state(PREP_MS + 2_000).progress, 50);
    assert_eq!(app.display_state(PREP_MS + 4_000).progress, 100);
    // Exhale midpoint, value falling.
    assert_eq!(app.display_state(PREP_MS + 7_000).progress, 50);
}

#[test]
fn teardown_mid_session_cancels_everything() {
    let mut app = app();
    app.start_session(0);
    app.tick(PREP_MS + 1_000);
    app.teardown(PREP_MS + 1_000);
    assert_eq!(app.session().pending_timers(), 0);
    assert!(app.tick(PREP_MS + 60_000).is_empty());
}

#[test]
fn first_display_at_inhale_peak_reads_full() {
    let mut app = app();
    app.start_session(0);
    app.tick(PREP_MS + 4_000);
    let display = app.display_state(PREP_MS + 4_000);
    assert!((display.continuous_value - 1.0).abs() < 1e-9);
    assert_eq!(display.progress, 100);
}

#[test]
fn quick_restart_keeps_preparation_pulse() {
    let mut app = app();
    app.start_session(0);
    app.tick(2_000);
    app.stop_session(2_000);
    app.session_mut().haptics_mut().clear();

    app.start_session(2_010);
    app.tick(2_060);
    let calls = &app.session().haptics().calls;
    assert!(matches!(calls.last(), Some(HapticCall::Pulse(_))));
}
