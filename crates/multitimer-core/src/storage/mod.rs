//! Durable key-value storage for the engine's snapshot.
//!
//! The snapshot is split across independent keys: the timer list, the
//! next daily-reset instant and the theme preference.

mod config;
pub mod database;
pub mod memory;

pub use config::{Config, DailyResetConfig, NotificationsConfig, SchedulerConfig, TimerConfig};
pub use database::Database;
pub use memory::MemoryStore;

use std::path::PathBuf;

use crate::error::StorageError;

/// Key holding the JSON list of timer records.
pub const TIMERS_KEY: &str = "timers";
/// Key holding the next daily-reset instant (RFC 3339).
pub const NEXT_RESET_KEY: &str = "next_reset_at";
/// Key holding the theme preference.
pub const THEME_KEY: &str = "theme";

/// A string key-value store. Writes are synchronous.
pub trait Store {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&mut self, key: &str) -> Result<(), StorageError>;
}

impl<S: Store + ?Sized> Store for Box<S> {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set(key, value)
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        (**self).remove(key)
    }
}

/// Returns `~/.config/multitimer[-dev]/` based on MULTITIMER_ENV.
///
/// Set MULTITIMER_ENV=dev to use the development data directory, or
/// MULTITIMER_DATA_DIR to point somewhere else entirely.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> std::io::Result<PathBuf> {
    let dir = match std::env::var_os("MULTITIMER_DATA_DIR") {
        Some(custom) => PathBuf::from(custom),
        None => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");
            let env = std::env::var("MULTITIMER_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("multitimer-dev")
            } else {
                base_dir.join("multitimer")
            }
        }
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
