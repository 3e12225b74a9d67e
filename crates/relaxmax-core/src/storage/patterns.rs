//! Custom pattern persistence.
//!
//! User-authored patterns are kept as one JSON array under a fixed key.
//! Nothing here propagates errors to the caller: missing or malformed data
//! reads as an empty list, and failed writes are logged and reported as
//! `false` with the stored list left as it was.

use tracing::{debug, error, warn};

use super::kv::KeyValueStore;
use crate::catalogue;
use crate::error::StorageError;
use crate::pattern::Pattern;

pub const CUSTOM_PATTERNS_KEY: &str = "relaxmax_custom_breathing_patterns";

#[derive(Debug, Clone)]
pub struct PatternStore<S> {
    backend: S,
}

impl<S: KeyValueStore> PatternStore<S> {
    pub fn new(backend: S) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &S {
        &self.backend
    }

    /// Built-ins followed by custom patterns.
    ///
    /// A stored pattern reusing a built-in id is skipped.
    pub fn load_all(&self) -> Vec<Pattern> {
        let mut patterns = catalogue::builtin_patterns();
        for pattern in self.load_custom() {
            if catalogue::is_builtin(&pattern.id) {
                warn!(pattern_id = %pattern.id, "stored pattern shadows a built-in, skipping");
                continue;
            }
            patterns.push(pattern);
        }
        patterns
    }

    /// Custom patterns only. Missing or malformed data yields an empty list.
    pub fn load_custom(&self) -> Vec<Pattern> {
        match self.read() {
            Ok(patterns) => patterns,
            Err(e) => {
                error!(error = %e, "failed to read custom patterns");
                Vec::new()
            }
        }
    }

    /// Insert or replace a pattern by id.
    pub fn save(&mut self, pattern: &Pattern) -> bool {
        let result = self.read().and_then(|mut patterns| {
            match patterns.iter_mut().find(|p| p.id == pattern.id) {
                Some(existing) => *existing = pattern.clone(),
                None => patterns.push(pattern.clone()),
            }
            self.write(&patterns)
        });
        match result {
            Ok(()) => {
                debug!(pattern_id = %pattern.id, "saved custom pattern");
                true
            }
            Err(e) => {
                error!(pattern_id = %pattern.id, error = %e, "failed to save custom pattern");
                false
            }
        }
    }

    /// Remove a pattern by id. Removing an unknown id still succeeds.
    pub fn delete(&mut self, id: &str) -> bool {
        let result = self.read().and_then(|mut patterns| {
            patterns.retain(|p| p.id != id);
            self.write(&patterns)
        });
        match result {
            Ok(()) => {
                debug!(pattern_id = %id, "deleted custom pattern");
                true
            }
            Err(e) => {
                error!(pattern_id = %id, error = %e, "failed to delete custom pattern");
                false
            }
        }
    }

    /// Read the stored list. I/O failures are errors; malformed JSON is not.
    fn read(&self) -> Result<Vec<Pattern>, StorageError> {
        let Some(json) = self.backend.get_item(CUSTOM_PATTERNS_KEY)? else {
            return Ok(Vec::new());
        };
        match serde_json::from_str::<Vec<Pattern>>(&json) {
            Ok(patterns) => Ok(patterns),
            Err(e) => {
                warn!(error = %e, "stored custom patterns are malformed, treating as empty");
                Ok(Vec::new())
            }
        }
    }

    fn write(&mut self, patterns: &[Pattern]) -> Result<(), StorageError> {
        let json = serde_json::to_string(patterns).map_err(|source| StorageError::Encode {
            key: CUSTOM_PATTERNS_KEY.to_string(),
            source,
        })?;
        self.backend.set_item(CUSTOM_PATTERNS_KEY, &json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pattern::{Phase, PhaseKind};
    use crate::storage::MemoryStore;

    fn custom(id: &str, name: &str) -> Pattern {
        Pattern::new(id, name, vec![Phase::of(PhaseKind::Inhale, 3)])
    }

    /// Backend whose reads always fail.
    struct BrokenStore;

    impl KeyValueStore for BrokenStore {
        fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
            Err(StorageError::ReadFailed {
                key: key.to_string(),
                source: std::io::Error::other("disk on fire"),
            })
        }

        fn set_item(&mut self, key: &str, _value: &str) -> Result<(), StorageError> {
            Err(StorageError::WriteFailed {
                key: key.to_string(),
                source: std::io::Error::other("disk on fire"),
            })
        }
    }

    #[test]
    fn empty_store_loads_builtins_only() {
        let store = PatternStore::new(MemoryStore::new());
        assert!(store.load_custom().is_empty());
        assert_eq!(store.load_all().len(), catalogue::builtin_patterns().len());
    }

    #[test]
    fn save_upserts_by_id() {
        let mut store = PatternStore::new(MemoryStore::new());
        assert!(store.save(&custom("custom_1", "First")));
        assert!(store.save(&custom("custom_2", "Second")));
        assert!(store.save(&custom("custom_1", "Renamed")));

        let stored = store.load_custom();
        assert_eq!(stored.len(), 2);
        assert_eq!(stored[0].name, "Renamed");
        assert_eq!(stored[1].id, "custom_2");
    }

    #[test]
    fn delete_removes_by_id() {
        let mut store = PatternStore::new(MemoryStore::new());
        store.save(&custom("custom_1", "First"));
        store.save(&custom("custom_2", "Second"));
        assert!(store.delete("custom_1"));
        assert!(store.delete("missing"));
        let ids: Vec<_> = store.load_custom().into_iter().map(|p| p.id).collect();
        assert_eq!(ids, vec!["custom_2"]);
    }

    #[test]
    fn malformed_payload_reads_as_empty() {
        let mut backend = MemoryStore::new();
        backend.set_item(CUSTOM_PATTERNS_KEY, "{not json").unwrap();
        let store = PatternStore::new(backend);
        assert!(store.load_custom().is_empty());
    }

    #[test]
    fn legacy_payload_without_kinds_loads() {
        let mut backend = MemoryStore::new();
        let json = r##"[{"id":"custom_9","name":"Mine","description":"","phases":[
            {"name":"Inspirez","durationSeconds":4,"color":"#6ECBF5"},
            {"name":"Retenez","durationSeconds":2,"color":"#F5DD90"}]}]"##;
        backend.set_item(CUSTOM_PATTERNS_KEY, json).unwrap();
        let store = PatternStore::new(backend);
        let loaded = store.load_custom();
        assert_eq!(loaded[0].phases[0].kind, PhaseKind::Inhale);
        assert_eq!(loaded[0].phases[1].kind, PhaseKind::Hold);
    }

    #[test]
    fn builtin_ids_in_store_are_skipped() {
        let mut store = PatternStore::new(MemoryStore::new());
        store.save(&custom("box", "Impostor"));
        let all = store.load_all();
        assert_eq!(all.iter().filter(|p| p.id == "box").count(), 1);
        assert_ne!(all.iter().find(|p| p.id == "box").unwrap().name, "Impostor");
    }

    #[test]
    fn failures_degrade_without_panicking() {
        let mut store = PatternStore::new(BrokenStore);
        assert!(store.load_custom().is_empty());
        assert_eq!(store.load_all().len(), catalogue::builtin_patterns().len());
        assert!(!store.save(&custom("custom_1", "First")));
        assert!(!store.delete("custom_1"));
    }
}
