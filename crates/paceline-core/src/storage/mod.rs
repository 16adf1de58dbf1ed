mod config;
mod state_file;

pub use config::{Config, DisplayConfig, TimerConfig};
pub use state_file::StateFile;

use std::path::PathBuf;

use crate::error::ConfigError;

/// Returns `~/.config/paceline[-dev]/` based on PACELINE_ENV.
///
/// Set PACELINE_ENV=dev to use development data directory.
/// PACELINE_HOME overrides the location entirely.
///
/// # Errors
/// Returns an error if the home directory cannot be determined or if
/// creating the directory fails.
pub fn data_dir() -> Result<PathBuf, ConfigError> {
    let dir = match std::env::var_os("PACELINE_HOME") {
        Some(home) => PathBuf::from(home),
        None => {
            let base_dir = dirs::home_dir().ok_or(ConfigError::NoDataDir)?.join(".config");
            let env = std::env::var("PACELINE_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("paceline-dev")
            } else {
                base_dir.join("paceline")
            }
        }
    };

    std::fs::create_dir_all(&dir).map_err(|e| ConfigError::SaveFailed {
        path: dir.clone(),
        message: e.to_string(),
    })?;
    Ok(dir)
}
