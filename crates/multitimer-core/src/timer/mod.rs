mod engine;
mod phase;
mod view;

pub use engine::{format_mmss, parse_minutes, Completion, Timer, TimerId, MAX_TITLE_CHARS};
pub use phase::{
    Phase, TimerMode, DEFAULT_WORK_MIN, LONG_BREAK_SECS, MAX_WORK_MIN, MIN_WORK_MIN,
    SESSIONS_UNTIL_LONG_BREAK, SHORT_BREAK_SECS,
};
pub use view::{created_ago, TimerView};
