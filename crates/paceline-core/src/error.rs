//! Core error types for paceline-core.
//!
//! Two layers: [`Rejection`] is the value returned by the timer state machine
//! when an event does not apply to the current state, and [`CoreError`] covers
//! everything around it (configuration, catalog lookups, I/O, the controller
//! task).

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Why the state machine refused an event.
///
/// Rejections are local and recoverable. The state is left exactly as it was
/// and the caller decides whether to surface anything; usually a rejected
/// event is a double-tap or a race between a button and a tick.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rejection {
    /// Empty segment list or a segment with zero duration.
    #[error("workout definition is invalid")]
    InvalidWorkout,

    /// No workout loaded, or the workout already completed.
    #[error("nothing to skip")]
    NothingToSkip,

    #[error("timer is not running")]
    NotRunning,

    #[error("timer is not paused")]
    NotPaused,

    /// A skip is already in flight.
    #[error("a skip is already in progress")]
    AlreadySkipping,

    /// `start` while a workout is running or paused.
    #[error("a workout is already in progress")]
    AlreadyActive,
}

/// Core error type for paceline-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The catalog has no workout with this id
    #[error("Unknown workout: {0}")]
    UnknownWorkout(String),

    /// The state machine rejected an event
    #[error("Rejected: {0}")]
    Rejected(#[from] Rejection),

    /// The controller task has shut down
    #[error("Timer controller is no longer running")]
    ControllerClosed,

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Unknown configuration key
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    /// Could not resolve the data directory
    #[error("Cannot determine data directory")]
    NoDataDir,
}

impl From<toml::ser::Error> for ConfigError {
    fn from(err: toml::ser::Error) -> Self {
        ConfigError::SaveFailed {
            path: PathBuf::new(),
            message: err.to_string(),
        }
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
