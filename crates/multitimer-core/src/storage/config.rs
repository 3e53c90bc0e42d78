//! TOML-based application configuration.
//!
//! Stores user preferences including:
//! - Work length for newly created timers
//! - Completion notification preferences
//! - Daily reset behaviour and time zone
//! - Live driver polling rate
//!
//! Configuration is stored at `~/.config/multitimer/config.toml`.
//! Break lengths and the long-break cadence are fixed and not listed here.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::data_dir;
use crate::error::{ConfigError, CoreError};
use crate::timer::{DEFAULT_WORK_MIN, MAX_WORK_MIN, MIN_WORK_MIN};

/// Defaults applied to new timers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimerConfig {
    #[serde(default = "default_duration_min")]
    pub default_duration_min: u32,
}

/// Notification configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationsConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Ring the terminal bell on completion.
    #[serde(default = "default_true")]
    pub bell: bool,
}

/// Daily reset configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyResetConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_check_interval_secs")]
    pub check_interval_secs: u64,
    /// Fixed UTC offset for midnight. Unset means the system zone, DST included.
    #[serde(default)]
    pub utc_offset_minutes: Option<i32>,
}

/// Live driver configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerConfig {
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/multitimer/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub timer: TimerConfig,
    #[serde(default)]
    pub notifications: NotificationsConfig,
    #[serde(default)]
    pub daily_reset: DailyResetConfig,
    #[serde(default)]
    pub scheduler: SchedulerConfig,
}

// Default functions
fn default_duration_min() -> u32 {
    DEFAULT_WORK_MIN
}
fn default_true() -> bool {
    true
}
fn default_check_interval_secs() -> u64 {
    60
}
fn default_poll_interval_ms() -> u64 {
    250
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            default_duration_min: default_duration_min(),
        }
    }
}

impl Default for NotificationsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            bell: true,
        }
    }
}

impl Default for DailyResetConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            check_interval_secs: default_check_interval_secs(),
            utc_offset_minutes: None,
        }
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval_ms(),
        }
    }
}

impl Config {
    fn get_json_value_by_path<'a>(
        root: &'a serde_json::Value,
        key: &str,
    ) -> Option<&'a serde_json::Value> {
        if key.is_empty() {
            return None;
        }

        let mut current = root;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    /// Write `value` at `key`, typed after the value already there.
    /// `optional` fields also accept `none` (or nothing) to clear them.
    fn set_json_value_by_path(
        root: &mut serde_json::Value,
        key: &str,
        value: &str,
        optional: bool,
    ) -> Result<(), ConfigError> {
        let unknown = || ConfigError::InvalidValue {
            key: key.to_string(),
            message: "unknown config key".into(),
        };
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };

        let mut parts = key.split('.').peekable();
        if key.is_empty() {
            return Err(unknown());
        }

        let mut current = root;
        while let Some(part) = parts.next() {
            let is_leaf = parts.peek().is_none();
            if is_leaf {
                let obj = current.as_object_mut().ok_or_else(unknown)?;
                let existing = obj.get(part).ok_or_else(unknown)?;

                let clears = value.eq_ignore_ascii_case("none") || value.is_empty();
                let new_value = match existing {
                    _ if optional && clears => serde_json::Value::Null,
                    serde_json::Value::Bool(_) => serde_json::Value::Bool(
                        value
                            .parse::<bool>()
                            .map_err(|_| invalid(format!("cannot parse '{value}' as bool")))?,
                    ),
                    serde_json::Value::Number(_) => {
                        let n = value
                            .parse::<i64>()
                            .map_err(|_| invalid(format!("cannot parse '{value}' as integer")))?;
                        serde_json::Value::Number(n.into())
                    }
                    // Optional numeric fields serialize as null when unset.
                    serde_json::Value::Null => {
                        let n = value
                            .parse::<i64>()
                            .map_err(|_| invalid(format!("cannot parse '{value}' as integer")))?;
                        serde_json::Value::Number(n.into())
                    }
                    serde_json::Value::Object(_) | serde_json::Value::Array(_) => {
                        serde_json::from_str(value).map_err(|e| invalid(e.to_string()))?
                    }
                    _ => serde_json::Value::String(value.into()),
                };

                obj.insert(part.to_string(), new_value);
                return Ok(());
            }

            current = current.get_mut(part).ok_or_else(unknown)?;
        }

        Err(unknown())
    }

    fn path() -> Result<PathBuf, CoreError> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from disk, writing the defaults if no file exists yet.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed or
    /// fails validation, or if the default config cannot be written.
    pub fn load() -> Result<Self, CoreError> {
        let path = Self::path()?;
        match std::fs::read_to_string(&path) {
            Ok(content) => {
                let cfg: Config = toml::from_str(&content).map_err(|e| ConfigError::LoadFailed {
                    path: path.clone(),
                    message: e.to_string(),
                })?;
                cfg.validate()?;
                Ok(cfg)
            }
            Err(_) => {
                let cfg = Self::default();
                cfg.save()?;
                Ok(cfg)
            }
        }
    }

    /// Persist to disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written to disk.
    pub fn save(&self) -> Result<(), CoreError> {
        let path = Self::path()?;
        let content = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::ParseFailed(e.to_string()))?;
        std::fs::write(&path, content).map_err(|e| ConfigError::SaveFailed {
            path,
            message: e.to_string(),
        })?;
        Ok(())
    }

    /// Load from disk, returning default on error.
    /// This is a convenience method that never fails.
    pub fn load_or_default() -> Self {
        match Self::load() {
            Ok(cfg) => cfg,
            Err(e) => {
                tracing::warn!(error = %e, "falling back to default configuration");
                Self::default()
            }
        }
    }

    /// Reject values outside their accepted ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let d = self.timer.default_duration_min;
        if !(MIN_WORK_MIN..=MAX_WORK_MIN).contains(&d) {
            return Err(ConfigError::InvalidValue {
                key: "timer.default_duration_min".into(),
                message: format!("{d} is outside {MIN_WORK_MIN}..={MAX_WORK_MIN}"),
            });
        }
        let check = self.daily_reset.check_interval_secs;
        if !(1..=60).contains(&check) {
            return Err(ConfigError::InvalidValue {
                key: "daily_reset.check_interval_secs".into(),
                message: format!("{check} is outside 1..=60"),
            });
        }
        if let Some(offset) = self.daily_reset.utc_offset_minutes {
            if offset.abs() >= 24 * 60 {
                return Err(ConfigError::InvalidValue {
                    key: "daily_reset.utc_offset_minutes".into(),
                    message: format!("{offset} is not a valid UTC offset"),
                });
            }
        }
        if self.scheduler.poll_interval_ms == 0 || self.scheduler.poll_interval_ms > 1000 {
            return Err(ConfigError::InvalidValue {
                key: "scheduler.poll_interval_ms".into(),
                message: format!("{} is outside 1..=1000", self.scheduler.poll_interval_ms),
            });
        }
        Ok(())
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set a config value by key without touching disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown, the value cannot be parsed, or
    /// the result fails validation. The config is unchanged on error.
    pub fn apply(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let mut json =
            serde_json::to_value(&*self).map_err(|e| ConfigError::ParseFailed(e.to_string()))?;
        // Fields that default to null are the optional ones.
        let defaults = serde_json::to_value(Config::default())
            .map_err(|e| ConfigError::ParseFailed(e.to_string()))?;
        let optional =
            Self::get_json_value_by_path(&defaults, key).is_some_and(serde_json::Value::is_null);
        Self::set_json_value_by_path(&mut json, key, value, optional)?;
        let updated: Config = serde_json::from_value(json).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        updated.validate()?;
        *self = updated;
        Ok(())
    }

    /// Set a config value by key and save.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown, the value cannot be parsed,
    /// or the config cannot be saved.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), CoreError> {
        self.apply(key, value)?;
        self.save()?;
        Ok(())
    }
}
