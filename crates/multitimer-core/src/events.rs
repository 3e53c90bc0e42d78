use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::theme::Theme;
use crate::timer::{Completion, TimerId, TimerView};

/// Why a timer's state changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Change {
    Created,
    Started,
    Paused,
    Reset,
    Renamed,
    DurationChanged,
    ModeChanged,
    Ticked,
    /// Loaded from storage with elapsed time applied.
    CaughtUp,
    DailyReset,
}

/// Every state change in the engine produces an Event.
/// The presentation layer drains them after each command or pump.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    TimerChanged {
        change: Change,
        timer: TimerView,
        at: DateTime<Utc>,
    },
    /// A countdown ran out. `timer` already shows the next phase.
    TimerCompleted {
        completion: Completion,
        timer: TimerView,
        at: DateTime<Utc>,
    },
    TimerDeleted {
        id: TimerId,
        title: String,
        at: DateTime<Utc>,
    },
    DailyReset {
        timers: usize,
        next_reset_at: DateTime<Utc>,
        at: DateTime<Utc>,
    },
    ThemeChanged {
        theme: Theme,
        at: DateTime<Utc>,
    },
}

impl Event {
    /// The timer view carried by this event, if any.
    pub fn timer(&self) -> Option<&TimerView> {
        match self {
            Event::TimerChanged { timer, .. } | Event::TimerCompleted { timer, .. } => Some(timer),
            _ => None,
        }
    }
}
