//! Ordered collection of timers keyed by id.
//!
//! Insertion order is display order; positional default titles
//! (`Timer #N`) are derived from it.

use chrono::{DateTime, Utc};
use indexmap::IndexMap;

use crate::clock::epoch_ms;
use crate::timer::{Timer, TimerId, TimerView};

#[derive(Debug, Clone, Default)]
pub struct Registry {
    timers: IndexMap<TimerId, Timer>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.timers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timers.is_empty()
    }

    pub fn get(&self, id: TimerId) -> Option<&Timer> {
        self.timers.get(&id)
    }

    pub fn get_mut(&mut self, id: TimerId) -> Option<&mut Timer> {
        self.timers.get_mut(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Timer> {
        self.timers.values()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Timer> {
        self.timers.values_mut()
    }

    pub fn ids(&self) -> Vec<TimerId> {
        self.timers.keys().copied().collect()
    }

    /// An unused id derived from `now`, bumped past any collision.
    pub fn next_id(&self, now: DateTime<Utc>) -> TimerId {
        let mut candidate = epoch_ms(now);
        while self.timers.contains_key(&TimerId(candidate)) {
            candidate += 1;
        }
        TimerId(candidate)
    }

    /// Append a timer. Returns `false` and drops it if the id is taken.
    pub fn insert(&mut self, timer: Timer) -> bool {
        if self.timers.contains_key(&timer.id()) {
            return false;
        }
        self.timers.insert(timer.id(), timer);
        true
    }

    /// Remove a timer, keeping the order of the rest.
    pub fn remove(&mut self, id: TimerId) -> Option<Timer> {
        self.timers.shift_remove(&id)
    }

    pub fn view(&self, id: TimerId, now: DateTime<Utc>) -> Option<TimerView> {
        let (position, _, timer) = self.timers.get_full(&id)?;
        Some(timer.view(position, now))
    }

    pub fn views(&self, now: DateTime<Utc>) -> Vec<TimerView> {
        self.timers
            .values()
            .enumerate()
            .map(|(position, timer)| timer.view(position, now))
            .collect()
    }
}
