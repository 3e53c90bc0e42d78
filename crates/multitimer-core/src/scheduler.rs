//! Per-timer tick cadence.
//!
//! Each running timer owns one cadence. The scheduler does not tick
//! anything itself: a driver polls [`TickScheduler::due`] and applies the
//! owed ticks. Cancelling a cadence removes it synchronously, so no tick is
//! handed out for it afterwards.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use tracing::debug;

use crate::timer::TimerId;

#[derive(Debug, Clone)]
pub struct TickScheduler {
    period: Duration,
    next_due: HashMap<TimerId, DateTime<Utc>>,
}

impl Default for TickScheduler {
    fn default() -> Self {
        Self::new(Duration::seconds(1))
    }
}

impl TickScheduler {
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            next_due: HashMap::new(),
        }
    }

    /// Begin (or restart) the cadence for `id`; first tick is one period out.
    pub fn schedule(&mut self, id: TimerId, now: DateTime<Utc>) {
        self.resume(id, now);
    }

    /// Begin the cadence as if the last tick happened at `last_tick`.
    pub fn resume(&mut self, id: TimerId, last_tick: DateTime<Utc>) {
        debug!(timer = %id, "cadence started");
        self.next_due.insert(id, last_tick + self.period);
    }

    /// When the counter of `id` last moved (or its cadence began).
    pub fn last_tick_at(&self, id: TimerId) -> Option<DateTime<Utc>> {
        self.next_due.get(&id).map(|next| *next - self.period)
    }

    /// Stop the cadence for `id`. Returns `false` if none was active.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        let removed = self.next_due.remove(&id).is_some();
        if removed {
            debug!(timer = %id, "cadence cancelled");
        }
        removed
    }

    pub fn is_scheduled(&self, id: TimerId) -> bool {
        self.next_due.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.next_due.len()
    }

    pub fn is_empty(&self) -> bool {
        self.next_due.is_empty()
    }

    pub fn clear(&mut self) {
        self.next_due.clear();
    }

    /// Cadences that are due at `now`, with how many ticks each is owed.
    ///
    /// A late poll owes one tick per whole period missed. Returned in id
    /// order; entities are independent so the order carries no meaning.
    pub fn due(&mut self, now: DateTime<Utc>) -> Vec<(TimerId, u32)> {
        let period_ms = self.period.num_milliseconds().max(1);
        let mut owed = Vec::new();
        for (id, next) in self.next_due.iter_mut() {
            if now < *next {
                continue;
            }
            let late_ms = (now - *next).num_milliseconds();
            let count = 1 + late_ms / period_ms;
            *next += Duration::milliseconds(count * period_ms);
            owed.push((*id, u32::try_from(count).unwrap_or(u32::MAX)));
        }
        owed.sort_by_key(|(id, _)| *id);
        owed
    }
}
