//! Snapshot of the registry to and from a [`Store`].
//!
//! Every save stamps each record with `lastPersistedAt`; for a running timer
//! that is the instant of its last applied tick, so part-seconds carry over
//! from one load to the next. On load, a record
//! that was running is caught up by the whole seconds elapsed since that
//! stamp, applied as one delta:
//!
//! - CountUp adds the delta and keeps running.
//! - Countdown subtracts it, clamping at zero. Reaching zero completes the
//!   phase once and stops, however many phases the gap actually spanned.
//!
//! A snapshot that cannot be parsed is treated as no snapshot at all.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::CoreError;
use crate::registry::Registry;
use crate::storage::{Store, TIMERS_KEY};
use crate::timer::{
    Completion, Phase, Timer, TimerId, TimerMode, DEFAULT_WORK_MIN, MAX_TITLE_CHARS, MAX_WORK_MIN,
    MIN_WORK_MIN,
};

/// One persisted timer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimerRecord {
    pub id: TimerId,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default = "default_duration")]
    pub custom_duration_minutes: i64,
    /// Missing means a full load of the current phase.
    #[serde(default)]
    pub time_remaining_seconds: Option<u64>,
    #[serde(default)]
    pub running: bool,
    #[serde(default = "default_phase")]
    pub phase: Phase,
    #[serde(default)]
    pub sessions_completed: u32,
    #[serde(default, with = "chrono::serde::ts_milliseconds_option")]
    pub last_persisted_at: Option<DateTime<Utc>>,
    #[serde(default, with = "chrono::serde::ts_milliseconds_option")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub mode: TimerMode,
    #[serde(default)]
    pub elapsed_seconds: u64,
}

fn default_duration() -> i64 {
    i64::from(DEFAULT_WORK_MIN)
}

fn default_phase() -> Phase {
    Phase::Work
}

impl TimerRecord {
    /// Snapshot `timer`, stamped as persisted at `at`.
    pub fn capture(timer: &Timer, at: DateTime<Utc>) -> Self {
        Self {
            id: timer.id,
            title: timer.title.clone(),
            custom_duration_minutes: i64::from(timer.custom_duration_min),
            time_remaining_seconds: Some(timer.remaining_secs),
            running: timer.running,
            phase: timer.phase,
            sessions_completed: timer.sessions_completed,
            last_persisted_at: Some(at),
            created_at: Some(timer.created_at),
            mode: timer.mode,
            elapsed_seconds: timer.elapsed_secs,
        }
    }
}

/// A timer rebuilt from its record, with any catch-up applied.
#[derive(Debug, Clone)]
pub struct Restored {
    pub timer: Timer,
    /// Whole seconds applied as catch-up; zero for paused records.
    pub caught_up_secs: u64,
    pub completion: Option<Completion>,
    /// For a timer still running: the instant its counter now stands at.
    /// The sub-second rest of the gap lies between this and the load time.
    pub anchor: Option<DateTime<Utc>>,
}

/// Result of reading the whole snapshot.
#[derive(Debug, Default)]
pub struct Loaded {
    pub registry: Registry,
    /// Timers that finished a phase while nobody was watching, in order.
    pub completions: Vec<Completion>,
    /// `(id, seconds)` for every running timer that was caught up.
    pub caught_up: Vec<(TimerId, u64)>,
    /// `(id, anchor)` for every timer that is still running after catch-up.
    pub anchors: Vec<(TimerId, DateTime<Utc>)>,
}

/// Rebuild a timer from a record as of `now`.
pub fn restore(record: TimerRecord, now: DateTime<Utc>) -> Restored {
    let work_min = u32::try_from(record.custom_duration_minutes)
        .ok()
        .filter(|m| (MIN_WORK_MIN..=MAX_WORK_MIN).contains(m))
        .unwrap_or(DEFAULT_WORK_MIN);
    let title = record
        .title
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(|t| t.chars().take(MAX_TITLE_CHARS).collect::<String>());

    let mut timer = Timer {
        id: record.id,
        title,
        mode: record.mode,
        custom_duration_min: work_min,
        remaining_secs: 0,
        elapsed_secs: record.elapsed_seconds,
        phase: record.phase,
        sessions_completed: record.sessions_completed,
        running: false,
        created_at: record.created_at.unwrap_or(now),
    };
    let capacity = timer.phase_capacity_secs();
    timer.remaining_secs = record
        .time_remaining_seconds
        .map_or(capacity, |secs| secs.min(capacity));

    let saved_at = match (record.running, record.last_persisted_at) {
        (true, Some(at)) => at,
        _ => {
            return Restored {
                timer,
                caught_up_secs: 0,
                completion: None,
                anchor: None,
            }
        }
    };

    // A clock that moved backwards yields no catch-up rather than a negative one.
    let gap_ms = (now - saved_at).num_milliseconds();
    let caught_up_secs = u64::try_from(gap_ms.max(0) / 1000).unwrap_or(0);
    let anchor = if gap_ms < 0 {
        now
    } else {
        saved_at + Duration::seconds(gap_ms / 1000)
    };
    timer.running = true;

    let completion = match timer.mode {
        TimerMode::CountUp => {
            timer.elapsed_secs = timer.elapsed_secs.saturating_add(caught_up_secs);
            None
        }
        TimerMode::Countdown => timer.advance_countdown_by(caught_up_secs),
    };

    let anchor = timer.running.then_some(anchor);
    Restored {
        timer,
        caught_up_secs,
        completion,
        anchor,
    }
}

/// Write every timer in `registry`, stamped with `now`, over the prior snapshot.
pub fn save<S: Store + ?Sized>(
    store: &mut S,
    registry: &Registry,
    now: DateTime<Utc>,
) -> Result<(), CoreError> {
    save_stamped(store, registry, |_| now)
}

/// Like [`save`], with a per-timer persisted instant. Running timers should
/// be stamped with the instant of their last applied tick so the part of a
/// second already elapsed is not lost on the next load.
pub fn save_stamped<S, F>(store: &mut S, registry: &Registry, stamp: F) -> Result<(), CoreError>
where
    S: Store + ?Sized,
    F: Fn(&Timer) -> DateTime<Utc>,
{
    let records: Vec<TimerRecord> = registry
        .iter()
        .map(|t| TimerRecord::capture(t, stamp(t)))
        .collect();
    let json = serde_json::to_string(&records)?;
    store.set(TIMERS_KEY, &json)?;
    Ok(())
}

/// Read the snapshot as of `now`.
///
/// Only a failing store is an error. Missing or unparseable data yields an
/// empty registry; individual bad records and duplicate ids are skipped.
pub fn load<S: Store + ?Sized>(store: &S, now: DateTime<Utc>) -> Result<Loaded, CoreError> {
    let mut loaded = Loaded::default();
    let Some(raw) = store.get(TIMERS_KEY)? else {
        return Ok(loaded);
    };

    let entries: Vec<serde_json::Value> = match serde_json::from_str(&raw) {
        Ok(entries) => entries,
        Err(e) => {
            warn!(error = %e, "discarding unreadable timer snapshot");
            return Ok(loaded);
        }
    };

    for entry in entries {
        let record: TimerRecord = match serde_json::from_value(entry) {
            Ok(record) => record,
            Err(e) => {
                warn!(error = %e, "skipping unreadable timer record");
                continue;
            }
        };
        let restored = restore(record, now);
        let id = restored.timer.id();
        if !loaded.registry.insert(restored.timer) {
            warn!(timer = %id, "skipping duplicate timer id");
            continue;
        }
        if restored.caught_up_secs > 0 {
            info!(timer = %id, secs = restored.caught_up_secs, "caught up running timer");
            loaded.caught_up.push((id, restored.caught_up_secs));
        }
        if let Some(anchor) = restored.anchor {
            loaded.anchors.push((id, anchor));
        }
        if let Some(completion) = restored.completion {
            loaded.completions.push(completion);
        }
    }

    Ok(loaded)
}
