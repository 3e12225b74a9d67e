//! Cooperative timer queue.
//!
//! Single-threaded and driven by the caller: nothing fires until the owner
//! pops due entries with [`Scheduler::pop_due`]. Every scheduled entry gets a
//! [`TimerId`] that acts as its cancellation token.

use std::collections::BTreeMap;

/// Cancellation token for a scheduled entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimerId(u64);

#[derive(Debug, Clone)]
pub struct Scheduler<T> {
    next_id: u64,
    /// Keyed by (due time, id) so equal deadlines fire in scheduling order.
    pending: BTreeMap<(u64, TimerId), T>,
}

impl<T> Default for Scheduler<T> {
    fn default() -> Self {
        Self {
            next_id: 0,
            pending: BTreeMap::new(),
        }
    }
}

impl<T> Scheduler<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule `task` to fire at `due_ms`.
    pub fn schedule_at(&mut self, due_ms: u64, task: T) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        self.pending.insert((due_ms, id), task);
        id
    }

    /// Cancel a pending entry. Returns false if it already fired or was
    /// cancelled before.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        let key = self.pending.keys().find(|(_, pending)| *pending == id).copied();
        match key {
            Some(key) => self.pending.remove(&key).is_some(),
            None => false,
        }
    }

    /// Cancel through an optional handle slot, clearing it.
    pub fn cancel_slot(&mut self, slot: &mut Option<TimerId>) -> bool {
        match slot.take() {
            Some(id) => self.cancel(id),
            None => false,
        }
    }

    pub fn is_pending(&self, id: TimerId) -> bool {
        self.pending.keys().any(|(_, pending)| *pending == id)
    }

    /// Deadline of the earliest pending entry.
    pub fn next_due(&self) -> Option<u64> {
        self.pending.keys().next().map(|(due, _)| *due)
    }

    /// Remove and return the earliest entry due at or before `now_ms`.
    pub fn pop_due(&mut self, now_ms: u64) -> Option<(TimerId, u64, T)> {
        let (due, id) = *self.pending.keys().next()?;
        if due > now_ms {
            return None;
        }
        let task = self.pending.remove(&(due, id))?;
        Some((id, due, task))
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }
}
