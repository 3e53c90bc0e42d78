use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Work length for a freshly created timer, in minutes.
pub const DEFAULT_WORK_MIN: u32 = 25;
pub const MIN_WORK_MIN: u32 = 1;
pub const MAX_WORK_MIN: u32 = 60;

/// Fixed break lengths, in seconds. Not user-configurable.
pub const SHORT_BREAK_SECS: u64 = 5 * 60;
pub const LONG_BREAK_SECS: u64 = 15 * 60;

/// Every this-many completed sessions earns a long break.
pub const SESSIONS_UNTIL_LONG_BREAK: u32 = 4;

/// Countdown phase. Meaningless while a timer is in [`TimerMode::CountUp`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Phase {
    Work,
    ShortBreak,
    LongBreak,
}

impl Phase {
    /// Fresh length of this phase in seconds, given the timer's work length.
    ///
    /// Uses saturating arithmetic so a corrupt work length cannot overflow.
    pub fn duration_secs(self, work_min: u32) -> u64 {
        match self {
            Phase::Work => u64::from(work_min).saturating_mul(60),
            Phase::ShortBreak => SHORT_BREAK_SECS,
            Phase::LongBreak => LONG_BREAK_SECS,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Phase::Work => "Focus Time",
            Phase::ShortBreak => "Short Break",
            Phase::LongBreak => "Long Break",
        }
    }

    /// The phase that follows this one once it runs out.
    ///
    /// `sessions_after` is the session count *after* any increment for the
    /// phase just finished.
    pub fn next(self, sessions_after: u32) -> Phase {
        match self {
            Phase::Work => {
                if sessions_after > 0 && sessions_after % SESSIONS_UNTIL_LONG_BREAK == 0 {
                    Phase::LongBreak
                } else {
                    Phase::ShortBreak
                }
            }
            Phase::ShortBreak | Phase::LongBreak => Phase::Work,
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerMode {
    #[default]
    Countdown,
    /// Stopwatch: counts elapsed time with no terminal condition.
    CountUp,
}

impl TimerMode {
    pub fn label(self) -> &'static str {
        match self {
            TimerMode::Countdown => "Countdown",
            TimerMode::CountUp => "Stopwatch",
        }
    }
}

impl FromStr for TimerMode {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "countdown" | "pomodoro" => Ok(TimerMode::Countdown),
            "countup" | "count-up" | "stopwatch" => Ok(TimerMode::CountUp),
            other => Err(ValidationError::UnknownMode(other.to_string())),
        }
    }
}

impl fmt::Display for TimerMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimerMode::Countdown => f.write_str("countdown"),
            TimerMode::CountUp => f.write_str("countup"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn break_lengths_are_fixed() {
        assert_eq!(Phase::ShortBreak.duration_secs(60), 300);
        assert_eq!(Phase::LongBreak.duration_secs(1), 900);
        assert_eq!(Phase::Work.duration_secs(25), 1500);
    }

    #[test]
    fn long_break_every_fourth_session() {
        assert_eq!(Phase::Work.next(1), Phase::ShortBreak);
        assert_eq!(Phase::Work.next(3), Phase::ShortBreak);
        assert_eq!(Phase::Work.next(4), Phase::LongBreak);
        assert_eq!(Phase::Work.next(8), Phase::LongBreak);
        assert_eq!(Phase::ShortBreak.next(4), Phase::Work);
        assert_eq!(Phase::LongBreak.next(4), Phase::Work);
    }

    #[test]
    fn mode_parses_aliases() {
        assert_eq!("countdown".parse::<TimerMode>().unwrap(), TimerMode::Countdown);
        assert_eq!("Stopwatch".parse::<TimerMode>().unwrap(), TimerMode::CountUp);
        assert_eq!(" countup ".parse::<TimerMode>().unwrap(), TimerMode::CountUp);
        assert!(matches!(
            "lap".parse::<TimerMode>(),
            Err(ValidationError::UnknownMode(_))
        ));
    }

    #[test]
    fn phase_serializes_camel_case() {
        assert_eq!(serde_json::to_string(&Phase::ShortBreak).unwrap(), "\"shortBreak\"");
        assert_eq!(serde_json::to_string(&TimerMode::CountUp).unwrap(), "\"countup\"");
    }
}
