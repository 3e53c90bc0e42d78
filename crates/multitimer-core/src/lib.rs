//! # multitimer Core Library
//!
//! Engine behind a multi-timer Pomodoro utility: any number of independent
//! countdown (work/break) or stopwatch timers, persisted across restarts
//! and reset at local midnight. Presentation (CLI, GUI) is a thin layer that
//! sends commands and draws the events that come back.
//!
//! ## Architecture
//!
//! - **Timer**: per-timer phase state machine advanced one second per `tick()`
//! - **Registry**: ordered timers keyed by id
//! - **Tick Scheduler**: one cadence per running timer, polled by a driver
//! - **Persistence**: snapshot to a key-value [`Store`], with catch-up on load
//! - **Daily Reset**: local-midnight rollover, DST-aware
//!
//! ## Key Components
//!
//! - [`TimerService`]: command surface tying the pieces together
//! - [`Timer`]: the state machine
//! - [`Database`]: SQLite-backed store
//! - [`Config`]: application configuration

pub mod clock;
pub mod daily_reset;
pub mod driver;
pub mod error;
pub mod events;
pub mod notify;
pub mod persistence;
pub mod registry;
pub mod scheduler;
pub mod service;
pub mod storage;
pub mod theme;
pub mod timer;

pub use clock::{Clock, ManualClock, SystemClock};
pub use daily_reset::{DailyReset, ResetZone};
pub use driver::DriverSettings;
pub use error::{ConfigError, CoreError, StorageError, ValidationError};
pub use events::{Change, Event};
pub use notify::{Notifier, NullNotifier};
pub use registry::Registry;
pub use scheduler::TickScheduler;
pub use service::{Command, ServiceOptions, TimerService};
pub use storage::{Config, Database, MemoryStore, Store};
pub use theme::Theme;
pub use timer::{Completion, Phase, Timer, TimerId, TimerMode, TimerView};
