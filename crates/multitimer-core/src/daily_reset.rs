//! Local-midnight rollover.
//!
//! One instant is kept: the next local midnight. Whenever the current time
//! reaches it, every timer gets a full reset (sessions included) and the
//! instant moves to the following midnight. No stored instant means the
//! reset is due, which also covers the very first run.
//!
//! Midnight is a wall-clock boundary. Days around DST changes are 23 or 25
//! hours long, and a zone that skips 00:00 resets at the first local time
//! that exists after it.

use chrono::{
    DateTime, Duration, FixedOffset, Local, LocalResult, NaiveDateTime, NaiveTime, Offset,
    TimeZone, Utc,
};
use tracing::info;

use crate::registry::Registry;

/// The zone whose midnight ends the day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResetZone {
    /// The system's local zone, DST rules included.
    Local,
    Fixed(FixedOffset),
}

impl ResetZone {
    /// `None` selects the system zone. Out-of-range offsets fall back to it too.
    pub fn from_offset_minutes(minutes: Option<i32>) -> Self {
        minutes
            .and_then(|m| FixedOffset::east_opt(m.saturating_mul(60)))
            .map_or(ResetZone::Local, ResetZone::Fixed)
    }

    /// The first local midnight strictly after `now`.
    pub fn next_midnight(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        match self {
            ResetZone::Local => next_midnight_in(&Local, now),
            ResetZone::Fixed(offset) => next_midnight_in(offset, now),
        }
    }

    /// `UTC+09:00`-style label for the offset in force at `now`.
    pub fn label(&self, now: DateTime<Utc>) -> String {
        let offset = match self {
            ResetZone::Local => now.with_timezone(&Local).offset().fix(),
            ResetZone::Fixed(offset) => *offset,
        };
        let secs = offset.local_minus_utc();
        let sign = if secs < 0 { '-' } else { '+' };
        let secs = secs.abs();
        format!("UTC{sign}{:02}:{:02}", secs / 3600, (secs % 3600) / 60)
    }
}

/// First midnight in `tz` strictly after `now`, as a UTC instant.
pub fn next_midnight_in<Tz: TimeZone>(tz: &Tz, now: DateTime<Utc>) -> DateTime<Utc> {
    let today = now.with_timezone(tz).date_naive();
    let Some(tomorrow) = today.succ_opt() else {
        return DateTime::<Utc>::MAX_UTC;
    };
    resolve_local(tz, tomorrow.and_time(NaiveTime::MIN))
}

/// Map a local wall time to an instant. A repeated time takes its first
/// occurrence; a skipped one moves forward to the first time that exists.
fn resolve_local<Tz: TimeZone>(tz: &Tz, local: NaiveDateTime) -> DateTime<Utc> {
    let mut candidate = local;
    // DST gaps are at most a few hours; a day of minutes bounds the search.
    for _ in 0..(24 * 60) {
        match tz.from_local_datetime(&candidate) {
            LocalResult::Single(dt) => return dt.with_timezone(&Utc),
            LocalResult::Ambiguous(earliest, _) => return earliest.with_timezone(&Utc),
            LocalResult::None => candidate += Duration::minutes(1),
        }
    }
    Utc.from_utc_datetime(&local)
}

/// Tracks the next reset instant and applies the rollover.
#[derive(Debug, Clone)]
pub struct DailyReset {
    zone: ResetZone,
    next_reset_at: Option<DateTime<Utc>>,
}

impl DailyReset {
    pub fn new(zone: ResetZone, next_reset_at: Option<DateTime<Utc>>) -> Self {
        Self {
            zone,
            next_reset_at,
        }
    }

    pub fn zone(&self) -> ResetZone {
        self.zone
    }

    pub fn next_reset_at(&self) -> Option<DateTime<Utc>> {
        self.next_reset_at
    }

    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.next_reset_at.map_or(true, |at| now >= at)
    }

    /// Reset every timer if midnight has been reached. Returns whether it did.
    pub fn check_and_reset(&mut self, registry: &mut Registry, now: DateTime<Utc>) -> bool {
        if !self.is_due(now) {
            return false;
        }
        self.reset_now(registry, now);
        true
    }

    /// Unconditional rollover: full reset of every timer, next midnight recomputed.
    pub fn reset_now(&mut self, registry: &mut Registry, now: DateTime<Utc>) {
        for timer in registry.iter_mut() {
            timer.full_reset();
        }
        let next = self.zone.next_midnight(now);
        info!(timers = registry.len(), next_reset_at = %next, "daily reset");
        self.next_reset_at = Some(next);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timer::{Phase, Timer, TimerId};

    fn tokyo() -> ResetZone {
        ResetZone::from_offset_minutes(Some(9 * 60))
    }

    #[test]
    fn next_midnight_in_fixed_zone() {
        // 2024-05-01 20:30 UTC is 05:30 on May 2 in Tokyo.
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 20, 30, 0).unwrap();
        let next = tokyo().next_midnight(now);
        assert_eq!(next, Utc.with_ymd_and_hms(2024, 5, 2, 15, 0, 0).unwrap());
    }

    #[test]
    fn exactly_midnight_moves_to_the_next_day() {
        let now = Utc.with_ymd_and_hms(2024, 5, 2, 15, 0, 0).unwrap();
        let next = tokyo().next_midnight(now);
        assert_eq!(next, Utc.with_ymd_and_hms(2024, 5, 3, 15, 0, 0).unwrap());
    }

    #[test]
    fn negative_offset_label() {
        let zone = ResetZone::from_offset_minutes(Some(-(3 * 60 + 30)));
        assert_eq!(zone.label(Utc::now()), "UTC-03:30");
        assert_eq!(tokyo().label(Utc::now()), "UTC+09:00");
    }

    #[test]
    fn invalid_offset_falls_back_to_local() {
        assert_eq!(ResetZone::from_offset_minutes(Some(100 * 60)), ResetZone::Local);
        assert_eq!(ResetZone::from_offset_minutes(None), ResetZone::Local);
    }

    #[test]
    fn local_next_midnight_is_within_a_day_and_a_bit() {
        let now = Utc::now();
        let next = ResetZone::Local.next_midnight(now);
        assert!(next > now);
        assert!(next - now <= Duration::hours(26));
    }

    #[test]
    fn missing_instant_is_due_and_gets_established() {
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let mut reg = Registry::new();
        let mut t = Timer::new(TimerId(1), now);
        t.sessions_completed = 3;
        t.phase = Phase::ShortBreak;
        t.running = true;
        reg.insert(t);

        let mut daily = DailyReset::new(tokyo(), None);
        assert!(daily.check_and_reset(&mut reg, now));
        let t = reg.get(TimerId(1)).unwrap();
        assert_eq!(t.sessions_completed(), 0);
        assert_eq!(t.phase(), Phase::Work);
        assert!(!t.is_running());
        assert_eq!(
            daily.next_reset_at(),
            Some(Utc.with_ymd_and_hms(2024, 5, 1, 15, 0, 0).unwrap())
        );

        // Not due again until that midnight.
        assert!(!daily.check_and_reset(&mut reg, now + Duration::hours(2)));
        assert!(daily.check_and_reset(&mut reg, now + Duration::hours(3)));
        assert_eq!(
            daily.next_reset_at(),
            Some(Utc.with_ymd_and_hms(2024, 5, 2, 15, 0, 0).unwrap())
        );
    }

    /// A zone that springs forward across midnight (00:00 -> 01:00 on one date).
    #[derive(Debug, Clone, Copy)]
    struct SkipsMidnight;

    impl TimeZone for SkipsMidnight {
        type Offset = FixedOffset;

        fn from_offset(_: &FixedOffset) -> Self {
            SkipsMidnight
        }

        fn offset_from_local_date(&self, local: &chrono::NaiveDate) -> LocalResult<FixedOffset> {
            self.offset_from_local_datetime(&local.and_time(NaiveTime::MIN))
        }

        fn offset_from_local_datetime(&self, local: &NaiveDateTime) -> LocalResult<FixedOffset> {
            let switch = chrono::NaiveDate::from_ymd_opt(2024, 3, 10).unwrap();
            let before = FixedOffset::east_opt(0).unwrap();
            let after = FixedOffset::east_opt(3600).unwrap();
            if local.date() < switch {
                LocalResult::Single(before)
            } else if local.date() == switch && local.time() < NaiveTime::from_hms_opt(1, 0, 0).unwrap() {
                LocalResult::None
            } else {
                LocalResult::Single(after)
            }
        }

        fn offset_from_utc_date(&self, utc: &chrono::NaiveDate) -> FixedOffset {
            self.offset_from_utc_datetime(&utc.and_time(NaiveTime::MIN))
        }

        fn offset_from_utc_datetime(&self, utc: &NaiveDateTime) -> FixedOffset {
            let switch = chrono::NaiveDate::from_ymd_opt(2024, 3, 10)
                .unwrap()
                .and_time(NaiveTime::MIN);
            if *utc < switch {
                FixedOffset::east_opt(0).unwrap()
            } else {
                FixedOffset::east_opt(3600).unwrap()
            }
        }
    }

    #[test]
    fn skipped_midnight_resolves_to_first_existing_time() {
        let now = Utc.with_ymd_and_hms(2024, 3, 9, 18, 0, 0).unwrap();
        let next = next_midnight_in(&SkipsMidnight, now);
        // Local 01:00 at +01:00 is 00:00 UTC.
        assert_eq!(next, Utc.with_ymd_and_hms(2024, 3, 10, 0, 0, 0).unwrap());
    }
}
