//! Application facade.
//!
//! The presentation layer talks to the core only through [`BreathingApp`]:
//! six mutating entry points, a `tick` to let time pass, and a read-only
//! [`DisplayState`] to render from.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::authoring::PatternDraft;
use crate::error::Result;
use crate::events::Event;
use crate::haptics::HapticSink;
use crate::library::PatternLibrary;
use crate::pattern::{Pattern, Phase};
use crate::session::{SessionController, SessionMode};
use crate::storage::{Config, KeyValueStore, PatternStore};

/// Read-only state for rendering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplayState {
    pub current_phase: Option<Phase>,
    pub continuous_value: f64,
    pub progress: u8,
    pub session_mode: SessionMode,
    pub countdown_remaining_secs: u32,
    pub preparation_remaining_secs: u32,
    pub selected_pattern_id: String,
}

pub struct BreathingApp<S, H> {
    library: PatternLibrary<S>,
    session: SessionController<H>,
}

impl<S: KeyValueStore, H: HapticSink> BreathingApp<S, H> {
    pub fn new(config: &Config, store: PatternStore<S>, haptics: H) -> Self {
        let library = PatternLibrary::open(store);
        let session = SessionController::new(config, library.selected().clone(), haptics);
        Self { library, session }
    }

    pub fn library(&self) -> &PatternLibrary<S> {
        &self.library
    }

    pub fn session(&self) -> &SessionController<H> {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut SessionController<H> {
        &mut self.session
    }

    /// Sample the current frame and build the display state.
    pub fn display_state(&mut self, now_ms: u64) -> DisplayState {
        let frame = self.session.sample(now_ms);
        let state = self.session.state();
        DisplayState {
            current_phase: state.current_phase.clone(),
            continuous_value: frame.value,
            progress: frame.progress,
            session_mode: state.mode,
            countdown_remaining_secs: state.countdown_remaining_secs,
            preparation_remaining_secs: state.preparation_remaining_secs,
            selected_pattern_id: self.library.selected().id.clone(),
        }
    }

    /// Let time pass up to `now_ms`.
    pub fn tick(&mut self, now_ms: u64) -> Vec<Event> {
        self.session.advance_to(now_ms)
    }

    pub fn start_session(&mut self, now_ms: u64) -> Vec<Event> {
        self.session.start_session(now_ms)
    }

    pub fn stop_session(&mut self, now_ms: u64) -> Vec<Event> {
        self.session.stop_session(now_ms)
    }

    pub fn select_pattern(&mut self, id: &str, now_ms: u64) -> Result<Vec<Event>> {
        let pattern = self.library.select(id)?.clone();
        Ok(self.session.select_pattern(pattern, now_ms))
    }

    /// Save a new pattern from `draft` and select it.
    pub fn create_pattern(
        &mut self,
        draft: &PatternDraft,
        created_at: DateTime<Utc>,
        now_ms: u64,
    ) -> Result<(Pattern, Vec<Event>)> {
        let mut created_at = created_at;
        let mut pattern = draft.build(created_at)?;
        // Two patterns created within the same millisecond would share an id.
        while draft.id().is_none() && self.library.find(&pattern.id).is_some() {
            created_at += Duration::milliseconds(1);
            pattern = draft.build(created_at)?;
        }
        self.library.save(&pattern)?;
        let mut events = vec![Event::PatternSaved {
            pattern_id: pattern.id.clone(),
            at_ms: now_ms,
        }];
        events.extend(self.select_pattern(&pattern.id, now_ms)?);
        Ok((pattern, events))
    }

    /// Save changes to an existing pattern.
    ///
    /// If the edited pattern is the selected one, a running session picks up
    /// the new phases straight away.
    pub fn edit_pattern(
        &mut self,
        draft: &PatternDraft,
        edited_at: DateTime<Utc>,
        now_ms: u64,
    ) -> Result<(Pattern, Vec<Event>)> {
        let pattern = draft.build(edited_at)?;
        self.library.save(&pattern)?;
        let mut events = vec![Event::PatternSaved {
            pattern_id: pattern.id.clone(),
            at_ms: now_ms,
        }];
        if self.library.selected().id == pattern.id {
            events.extend(self.session.select_pattern(pattern.clone(), now_ms));
        }
        Ok((pattern, events))
    }

    /// Delete a custom pattern, falling back to the default selection if it
    /// was selected.
    pub fn delete_pattern(&mut self, id: &str, now_ms: u64) -> Result<Vec<Event>> {
        let fallback_to = self.library.delete(id)?;
        let mut events = vec![Event::PatternDeleted {
            pattern_id: id.to_string(),
            fallback_to: fallback_to.clone(),
            at_ms: now_ms,
        }];
        if fallback_to.is_some() {
            let pattern = self.library.selected().clone();
            events.extend(self.session.select_pattern(pattern, now_ms));
        }
        Ok(events)
    }

    /// Unmount: cancel every timer and pulse.
    pub fn teardown(&mut self, now_ms: u64) -> Vec<Event> {
        self.session.teardown(now_ms)
    }
}
