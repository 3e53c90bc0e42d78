//! Per-timer state machine.
//!
//! A [`Timer`] has no internal thread. Something outside (the tick
//! scheduler) calls [`Timer::tick`] once per second while it runs.
//!
//! ## State Transitions
//!
//! ```text
//! Countdown:  Work -> (ShortBreak | LongBreak) -> Work   each x {Running, Paused}
//! CountUp:    Running <-> Paused
//! ```
//!
//! A countdown that reaches zero stops itself and moves to the next phase
//! with that phase's full length loaded; the user starts it again.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::phase::{Phase, TimerMode, DEFAULT_WORK_MIN, MAX_WORK_MIN, MIN_WORK_MIN};
use crate::error::ValidationError;

/// Longest title a timer keeps, in characters.
pub const MAX_TITLE_CHARS: usize = 20;

/// Stable timer identifier: the creation instant in epoch milliseconds,
/// bumped forward on collision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TimerId(pub i64);

impl fmt::Display for TimerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for TimerId {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<i64>()
            .map(TimerId)
            .map_err(|_| ValidationError::InvalidValue {
                field: "id".into(),
                message: format!("'{s}' is not a timer id"),
            })
    }
}

/// What happened when a countdown ran out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Completion {
    pub id: TimerId,
    pub finished: Phase,
    pub next: Phase,
    pub sessions_completed: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Timer {
    pub(crate) id: TimerId,
    pub(crate) title: Option<String>,
    pub(crate) mode: TimerMode,
    pub(crate) custom_duration_min: u32,
    pub(crate) remaining_secs: u64,
    pub(crate) elapsed_secs: u64,
    pub(crate) phase: Phase,
    pub(crate) sessions_completed: u32,
    pub(crate) running: bool,
    pub(crate) created_at: DateTime<Utc>,
}

impl Timer {
    /// New countdown timer in Work/Paused with the default 25 minutes loaded.
    pub fn new(id: TimerId, created_at: DateTime<Utc>) -> Self {
        Self::with_duration(id, created_at, DEFAULT_WORK_MIN)
    }

    /// New countdown timer with a given work length.
    ///
    /// Out-of-range lengths fall back to the default.
    pub fn with_duration(id: TimerId, created_at: DateTime<Utc>, work_min: u32) -> Self {
        let work_min = if (MIN_WORK_MIN..=MAX_WORK_MIN).contains(&work_min) {
            work_min
        } else {
            DEFAULT_WORK_MIN
        };
        Self {
            id,
            title: None,
            mode: TimerMode::Countdown,
            custom_duration_min: work_min,
            remaining_secs: Phase::Work.duration_secs(work_min),
            elapsed_secs: 0,
            phase: Phase::Work,
            sessions_completed: 0,
            running: false,
            created_at,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn id(&self) -> TimerId {
        self.id
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    /// The stored title, or `Timer #N` for the given zero-based position.
    pub fn display_title(&self, position: usize) -> String {
        match &self.title {
            Some(t) => t.clone(),
            None => format!("Timer #{}", position + 1),
        }
    }

    pub fn mode(&self) -> TimerMode {
        self.mode
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn custom_duration_min(&self) -> u32 {
        self.custom_duration_min
    }

    pub fn remaining_secs(&self) -> u64 {
        self.remaining_secs
    }

    pub fn elapsed_secs(&self) -> u64 {
        self.elapsed_secs
    }

    pub fn sessions_completed(&self) -> u32 {
        self.sessions_completed
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Fresh length of the current phase in seconds.
    pub fn phase_capacity_secs(&self) -> u64 {
        self.phase.duration_secs(self.custom_duration_min)
    }

    /// The active counter: remaining time in Countdown, elapsed in CountUp.
    pub fn display_secs(&self) -> u64 {
        match self.mode {
            TimerMode::Countdown => self.remaining_secs,
            TimerMode::CountUp => self.elapsed_secs,
        }
    }

    /// Active counter as `MM:SS`. Minutes are not wrapped at 60.
    pub fn format_display(&self) -> String {
        format_mmss(self.display_secs())
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Returns `true` if the timer was paused before.
    pub fn start(&mut self) -> bool {
        if self.running {
            return false;
        }
        self.running = true;
        true
    }

    /// Returns `true` if the timer was running before.
    pub fn pause(&mut self) -> bool {
        if !self.running {
            return false;
        }
        self.running = false;
        true
    }

    /// Stop and reload the active counter. Session count is kept.
    pub fn reset(&mut self) {
        self.running = false;
        self.phase = Phase::Work;
        match self.mode {
            TimerMode::Countdown => self.remaining_secs = self.phase_capacity_secs(),
            TimerMode::CountUp => self.elapsed_secs = 0,
        }
    }

    /// Day rollover: [`reset`](Self::reset) plus zeroing the session count.
    pub fn full_reset(&mut self) {
        self.reset();
        self.sessions_completed = 0;
    }

    /// Advance by one second if running.
    ///
    /// Returns the completion when a countdown reaches zero on this tick.
    pub fn tick(&mut self) -> Option<Completion> {
        if !self.running {
            return None;
        }
        match self.mode {
            TimerMode::CountUp => {
                self.elapsed_secs = self.elapsed_secs.saturating_add(1);
                None
            }
            TimerMode::Countdown => {
                if self.remaining_secs == 0 {
                    return None;
                }
                self.remaining_secs -= 1;
                if self.remaining_secs == 0 {
                    Some(self.complete())
                } else {
                    None
                }
            }
        }
    }

    /// Apply `secs` seconds of countdown in one step, without replaying
    /// intermediate phases. Completes at most once.
    pub(crate) fn advance_countdown_by(&mut self, secs: u64) -> Option<Completion> {
        if secs >= self.remaining_secs {
            self.remaining_secs = 0;
            Some(self.complete())
        } else {
            self.remaining_secs -= secs;
            None
        }
    }

    /// The countdown ran out: stop, count the session, load the next phase.
    pub(crate) fn complete(&mut self) -> Completion {
        self.running = false;
        let finished = self.phase;
        if finished == Phase::Work {
            self.sessions_completed = self.sessions_completed.saturating_add(1);
        }
        self.phase = finished.next(self.sessions_completed);
        // Returning to Work loads this timer's own work length, not the 25 min default.
        self.remaining_secs = self.phase_capacity_secs();
        Completion {
            id: self.id,
            finished,
            next: self.phase,
            sessions_completed: self.sessions_completed,
        }
    }

    /// Change the work length.
    ///
    /// A paused timer in Work reloads the new length immediately. A running
    /// Work countdown keeps counting but is capped to the new length.
    pub fn set_custom_duration(&mut self, minutes: i64) -> Result<(), ValidationError> {
        let minutes = validate_minutes(minutes)?;
        self.custom_duration_min = minutes;
        if self.phase == Phase::Work && self.mode == TimerMode::Countdown {
            let capacity = self.phase_capacity_secs();
            if !self.running {
                self.remaining_secs = capacity;
            } else {
                self.remaining_secs = self.remaining_secs.min(capacity);
            }
        }
        Ok(())
    }

    /// Switch between countdown and stopwatch.
    ///
    /// Pauses first. Returns `false` when already in `mode` (nothing changes).
    pub fn set_mode(&mut self, mode: TimerMode) -> bool {
        if self.mode == mode {
            return false;
        }
        self.running = false;
        self.mode = mode;
        match mode {
            TimerMode::CountUp => self.elapsed_secs = 0,
            TimerMode::Countdown => {
                self.phase = Phase::Work;
                self.remaining_secs = self.phase_capacity_secs();
            }
        }
        true
    }

    /// Set the title. Input is trimmed and cut to 20 characters; blank input
    /// keeps the current title. Returns `true` if the title changed.
    pub fn rename(&mut self, text: &str) -> bool {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return false;
        }
        let title: String = trimmed.chars().take(MAX_TITLE_CHARS).collect();
        if self.title.as_deref() == Some(title.as_str()) {
            return false;
        }
        self.title = Some(title);
        true
    }
}

/// Render seconds as zero-padded `MM:SS`.
pub fn format_mmss(secs: u64) -> String {
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

/// Parse a duration as typed by a user: a whole number of minutes.
pub fn parse_minutes(input: &str) -> Result<i64, ValidationError> {
    input
        .trim()
        .parse::<i64>()
        .map_err(|_| ValidationError::NotAnInteger {
            input: input.to_string(),
        })
}

fn validate_minutes(minutes: i64) -> Result<u32, ValidationError> {
    if minutes < i64::from(MIN_WORK_MIN) || minutes > i64::from(MAX_WORK_MIN) {
        return Err(ValidationError::DurationOutOfRange {
            minutes,
            min: MIN_WORK_MIN,
            max: MAX_WORK_MIN,
        });
    }
    // In range, so the cast is lossless.
    Ok(minutes as u32)
}
