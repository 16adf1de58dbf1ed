//! Timer state persisted between process invocations.
//!
//! A front end that does not stay resident (the CLI) saves the controller's
//! state as JSON after every command and loads it before the next one. This
//! is process plumbing, not session history.

use std::path::{Path, PathBuf};

use tracing::warn;

use super::data_dir;
use crate::error::Result;
use crate::timer::TimerState;

const STATE_FILE: &str = "timer.json";

#[derive(Debug, Clone)]
pub struct StateFile {
    path: PathBuf,
}

impl StateFile {
    /// `timer.json` in the data directory.
    pub fn open() -> Result<Self> {
        Ok(Self::at(data_dir()?.join(STATE_FILE)))
    }

    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the saved state, or idle if there is none.
    ///
    /// A file that cannot be parsed, or whose counters do not add up, is
    /// discarded with a warning rather than resumed.
    pub fn load(&self) -> Result<TimerState> {
        let json = match std::fs::read_to_string(&self.path) {
            Ok(json) => json,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(TimerState::default()),
            Err(e) => return Err(e.into()),
        };
        match serde_json::from_str::<TimerState>(&json) {
            Ok(state) if state.is_consistent() => Ok(state),
            Ok(_) => {
                warn!(path = %self.path.display(), "saved timer state is inconsistent, starting idle");
                Ok(TimerState::default())
            }
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "saved timer state unreadable, starting idle");
                Ok(TimerState::default())
            }
        }
    }

    pub fn save(&self, state: &TimerState) -> Result<()> {
        let json = serde_json::to_string_pretty(state)?;
        std::fs::write(&self.path, json)?;
        Ok(())
    }
}
