//! TOML-based application configuration.
//!
//! Stores:
//! - Tick interval and boundary-overflow policy for the timer
//! - Countdown display preference
//! - Default log filter
//! - User-defined workouts, merged over the built-in catalog
//!
//! Configuration is stored at `~/.config/paceline/config.toml`.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::data_dir;
use crate::error::ConfigError;
use crate::timer::{OverflowPolicy, TimerMachine};
use crate::workout::{InMemoryCatalog, WorkoutDefinition};

/// Timer-specific configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimerConfig {
    /// Period of the tick source in milliseconds.
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,
    #[serde(default)]
    pub overflow_policy: OverflowPolicy,
}

/// Display configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// Account for time since the last tick when showing the countdown.
    #[serde(default = "default_true")]
    pub sub_second_countdown: bool,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/paceline/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Default `tracing` filter when PACELINE_LOG is unset.
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub timer: TimerConfig,
    #[serde(default)]
    pub display: DisplayConfig,
    #[serde(default)]
    pub custom_workouts: Vec<WorkoutDefinition>,
}

fn default_tick_interval_ms() -> u64 {
    1000
}
fn default_true() -> bool {
    true
}
fn default_log_level() -> String {
    "warn".into()
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: default_tick_interval_ms(),
            overflow_policy: OverflowPolicy::default(),
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            sub_second_countdown: true,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            timer: TimerConfig::default(),
            display: DisplayConfig::default(),
            custom_workouts: Vec::new(),
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

    fn set_json_value_by_path(
        root: &mut serde_json::Value,
        key: &str,
        value: &str,
    ) -> Result<(), ConfigError> {
        let unknown = || ConfigError::UnknownKey(key.to_string());
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };

        let mut parts = key.split('.').peekable();
        if parts.peek().is_none() || key.is_empty() {
            return Err(unknown());
        }

        let mut current = root;
        while let Some(part) = parts.next() {
            let is_leaf = parts.peek().is_none();
            if is_leaf {
                let obj = current.as_object_mut().ok_or_else(unknown)?;
                let existing = obj.get(part).ok_or_else(unknown)?;

                let new_value = match existing {
                    serde_json::Value::Bool(_) => serde_json::Value::Bool(
                        value.parse::<bool>().map_err(|e| invalid(e.to_string()))?,
                    ),
                    serde_json::Value::Number(_) => {
                        let n = value
                            .parse::<u64>()
                            .map_err(|_| invalid(format!("cannot parse '{value}' as number")))?;
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

    fn path() -> Result<PathBuf, ConfigError> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from the data directory, writing defaults if no file exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::path()?)
    }

    /// Load from `path`, writing defaults there if it does not exist.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => {
                let cfg: Config = toml::from_str(&content).map_err(|e| ConfigError::LoadFailed {
                    path: path.to_path_buf(),
                    message: e.to_string(),
                })?;
                cfg.validate()?;
                Ok(cfg)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let cfg = Self::default();
                cfg.save_to(path)?;
                Ok(cfg)
            }
            Err(e) => Err(ConfigError::LoadFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            }),
        }
    }

    /// Persist to the data directory.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::path()?)
    }

    /// Persist to `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written to disk.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content).map_err(|e| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Reject values the timer cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.timer.tick_interval_ms == 0 {
            return Err(ConfigError::InvalidValue {
                key: "timer.tick_interval_ms".into(),
                message: "must be greater than zero".into(),
            });
        }
        for workout in &self.custom_workouts {
            workout.validate().map_err(|e| ConfigError::InvalidValue {
                key: format!("custom_workouts.{}", workout.id),
                message: e.to_string(),
            })?;
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

    /// Set a config value by key without saving. Returns error if the key is
    /// unknown or the value does not fit.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let mut json = serde_json::to_value(&*self).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        let updated: Config = serde_json::from_value(json).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        updated.validate()?;
        *self = updated;
        Ok(())
    }

    /// Built-in workouts plus `custom_workouts`; a custom workout with a
    /// built-in id replaces it.
    pub fn catalog(&self) -> Result<InMemoryCatalog, ConfigError> {
        let mut catalog = InMemoryCatalog::builtin();
        for workout in &self.custom_workouts {
            catalog
                .insert(workout.clone())
                .map_err(|e| ConfigError::InvalidValue {
                    key: format!("custom_workouts.{}", workout.id),
                    message: e.to_string(),
                })?;
        }
        Ok(catalog)
    }

    pub fn machine(&self) -> TimerMachine {
        TimerMachine::new(self.timer.overflow_policy)
    }

    pub fn tick_period(&self) -> Duration {
        Duration::from_millis(self.timer.tick_interval_ms)
    }

    /// Load from disk, returning default on error.
    /// This is a convenience method that never fails.
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workout::{PaceClass, Segment, WorkoutCatalog};

    #[test]
    fn default_config_roundtrip() {
        let cfg = Config::default();
        let toml_str = toml::to_string_pretty(&cfg).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.timer.tick_interval_ms, 1000);
        assert_eq!(parsed.timer.overflow_policy, OverflowPolicy::Cascade);
        assert!(parsed.display.sub_second_countdown);
    }

    #[test]
    fn empty_file_uses_defaults() {
        let cfg: Config = toml::from_str("").unwrap();
        assert_eq!(cfg.log_level, "warn");
        assert!(cfg.custom_workouts.is_empty());
    }

    #[test]
    fn get_supports_dot_path_keys() {
        let cfg = Config::default();
        assert_eq!(cfg.get("timer.tick_interval_ms").as_deref(), Some("1000"));
        assert_eq!(cfg.get("timer.overflow_policy").as_deref(), Some("cascade"));
        assert!(cfg.get("timer.missing_key").is_none());
    }

    #[test]
    fn set_updates_enum_and_number() {
        let mut cfg = Config::default();
        cfg.set("timer.overflow_policy", "discard").unwrap();
        cfg.set("timer.tick_interval_ms", "500").unwrap();
        assert_eq!(cfg.timer.overflow_policy, OverflowPolicy::Discard);
        assert_eq!(cfg.tick_period(), Duration::from_millis(500));
        assert_eq!(cfg.machine().overflow(), OverflowPolicy::Discard);
    }

    #[test]
    fn set_rejects_unknown_key_and_bad_values() {
        let mut cfg = Config::default();
        assert!(matches!(
            cfg.set("timer.nonexistent", "1"),
            Err(ConfigError::UnknownKey(_))
        ));
        assert!(cfg.set("display.sub_second_countdown", "maybe").is_err());
        assert!(cfg.set("timer.overflow_policy", "sideways").is_err());
        assert!(cfg.set("timer.tick_interval_ms", "0").is_err());
        assert_eq!(cfg.timer.tick_interval_ms, 1000);
    }

    #[test]
    fn custom_workouts_extend_catalog() {
        let mut cfg = Config::default();
        cfg.custom_workouts.push(
            WorkoutDefinition::new("mine", "Mine", vec![Segment::new(PaceClass::Easy, 120)])
                .unwrap(),
        );
        let catalog = cfg.catalog().unwrap();
        assert!(catalog.get("mine").is_some());
        assert!(catalog.get("tempo-30").is_some());
    }

    #[test]
    fn invalid_custom_workout_fails_validation() {
        let mut cfg = Config::default();
        cfg.custom_workouts.push(WorkoutDefinition {
            id: "empty".into(),
            name: "Empty".into(),
            segments: vec![],
        });
        assert!(cfg.validate().is_err());
        assert!(cfg.catalog().is_err());
    }

    #[test]
    fn load_from_missing_file_writes_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let cfg = Config::load_from(&path).unwrap();
        assert_eq!(cfg.timer.tick_interval_ms, 1000);
        assert!(path.exists());
    }

    #[test]
    fn custom_workouts_survive_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let mut cfg = Config::default();
        cfg.custom_workouts.push(
            WorkoutDefinition::new(
                "hills",
                "Hills",
                vec![
                    Segment::new(PaceClass::Warmup, 60).with_label("Warm Up"),
                    Segment::new(PaceClass::Interval, 90).with_incline(5.5),
                ],
            )
            .unwrap(),
        );
        cfg.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.custom_workouts, cfg.custom_workouts);
    }
}
