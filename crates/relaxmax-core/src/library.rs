//! Pattern library: built-ins merged with stored custom patterns, plus the
//! current selection.

use tracing::{info, warn};

use crate::catalogue;
use crate::error::{CoreError, Result, ValidationError};
use crate::pattern::Pattern;
use crate::storage::{KeyValueStore, PatternStore};

#[derive(Debug)]
pub struct PatternLibrary<S> {
    store: PatternStore<S>,
    patterns: Vec<Pattern>,
    selected: Pattern,
}

impl<S: KeyValueStore> PatternLibrary<S> {
    /// Load every pattern and select the default one.
    pub fn open(store: PatternStore<S>) -> Self {
        let patterns = store.load_all();
        Self {
            store,
            patterns,
            selected: catalogue::default_pattern(),
        }
    }

    pub fn patterns(&self) -> &[Pattern] {
        &self.patterns
    }

    pub fn custom_patterns(&self) -> impl Iterator<Item = &Pattern> {
        self.patterns.iter().filter(|p| !catalogue::is_builtin(&p.id))
    }

    pub fn find(&self, id: &str) -> Option<&Pattern> {
        self.patterns.iter().find(|p| p.id == id)
    }

    pub fn selected(&self) -> &Pattern {
        &self.selected
    }

    pub fn select(&mut self, id: &str) -> Result<&Pattern> {
        let pattern = self
            .find(id)
            .cloned()
            .ok_or_else(|| CoreError::PatternNotFound(id.to_string()))?;
        self.selected = pattern;
        Ok(&self.selected)
    }

    /// Persist a custom pattern, replacing any with the same id.
    pub fn save(&mut self, pattern: &Pattern) -> Result<()> {
        if catalogue::is_builtin(&pattern.id) {
            return Err(CoreError::BuiltInPattern(pattern.id.clone()));
        }
        if pattern.phases.is_empty() {
            return Err(ValidationError::LastPhase.into());
        }
        if !self.store.save(pattern) {
            return Err(CoreError::PersistFailed(pattern.id.clone()));
        }
        info!(pattern_id = %pattern.id, "pattern saved");
        self.reload();
        Ok(())
    }

    /// Delete a custom pattern.
    ///
    /// Returns the id selection fell back to when the deleted pattern was
    /// selected, `None` when selection is untouched.
    pub fn delete(&mut self, id: &str) -> Result<Option<String>> {
        if catalogue::is_builtin(id) {
            return Err(CoreError::BuiltInPattern(id.to_string()));
        }
        if self.find(id).is_none() {
            return Err(CoreError::PatternNotFound(id.to_string()));
        }
        if !self.store.delete(id) {
            return Err(CoreError::PersistFailed(id.to_string()));
        }
        info!(pattern_id = %id, "pattern deleted");
        let was_selected = self.selected.id == id;
        self.reload();
        if was_selected {
            return Ok(Some(self.selected.id.clone()));
        }
        Ok(None)
    }

    /// Re-read the store and refresh the selection from it, falling back to
    /// the default pattern if the selected one vanished.
    pub fn reload(&mut self) {
        self.patterns = self.store.load_all();
        self.selected = match self.find(&self.selected.id) {
            Some(pattern) => pattern.clone(),
            None => {
                warn!(pattern_id = %self.selected.id, "selected pattern disappeared, using default");
                catalogue::default_pattern()
            }
        };
    }
}
