use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};

use super::engine::{Timer, TimerId};
use super::phase::{Phase, TimerMode};

/// Everything a presentation layer needs to draw one timer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimerView {
    pub id: TimerId,
    pub title: String,
    pub mode: TimerMode,
    pub mode_label: String,
    /// `None` in stopwatch mode.
    pub phase: Option<Phase>,
    pub phase_label: String,
    pub session_label: String,
    pub time: String,
    pub running: bool,
    pub sessions_completed: u32,
    pub custom_duration_minutes: u32,
    pub created_at: DateTime<Utc>,
    pub created_ago: String,
}

impl Timer {
    /// Build a display snapshot. `position` is the zero-based registry slot.
    pub fn view(&self, position: usize, now: DateTime<Utc>) -> TimerView {
        let (phase, phase_label, session_label) = match self.mode {
            TimerMode::Countdown => (
                Some(self.phase),
                self.phase.label().to_string(),
                format!("Session {}", self.sessions_completed.saturating_add(1)),
            ),
            TimerMode::CountUp => (None, "Stopwatch".to_string(), "Count Up Mode".to_string()),
        };
        TimerView {
            id: self.id,
            title: self.display_title(position),
            mode: self.mode,
            mode_label: self.mode.label().to_string(),
            phase,
            phase_label,
            session_label,
            time: self.format_display(),
            running: self.running,
            sessions_completed: self.sessions_completed,
            custom_duration_minutes: self.custom_duration_min,
            created_at: self.created_at,
            created_ago: created_ago(self.created_at, now),
        }
    }
}

/// Coarse age of a timer: `Just now`, `5m ago`, `3h ago`, `2d ago`, or a
/// short local date after a week.
pub fn created_ago(created_at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let mins = (now - created_at).num_minutes();
    if mins < 1 {
        return "Just now".to_string();
    }
    if mins < 60 {
        return format!("{mins}m ago");
    }
    let hours = mins / 60;
    if hours < 24 {
        return format!("{hours}h ago");
    }
    let days = hours / 24;
    if days < 7 {
        return format!("{days}d ago");
    }
    created_at.with_timezone(&Local).format("%b %-d").to_string()
}
