//! # Paceline Core Library
//!
//! The workout progress timer behind Paceline. Screens, audio, history and
//! the workout catalog live elsewhere; this crate owns the one piece with
//! real timing logic: turning a stream of timestamps into a consistent view
//! of elapsed time, current segment and time remaining, across pause,
//! resume and skip.
//!
//! ## Architecture
//!
//! - **Timer State Machine**: a pure `apply(state, event)` function. Events
//!   carry their own timestamps; the machine never reads a clock.
//! - **Controller**: single owner of the state, resolving workout ids and
//!   handing finished runs to a recorder. Optionally runs on a tokio task
//!   behind an ordered queue with a cancellable 1 Hz tick source.
//! - **Storage**: TOML configuration and a JSON state file for front ends
//!   that do not stay resident.
//!
//! ## Key Components
//!
//! - [`TimerMachine`]: the transition function
//! - [`TimerState`] / [`TimerView`]: state record and derived snapshot
//! - [`WorkoutController`] / [`spawn_controller`]: ownership and driving
//! - [`WorkoutCatalog`] / [`SessionRecorder`]: collaborator contracts
//! - [`Config`]: application configuration management

pub mod error;
pub mod events;
pub mod session;
pub mod storage;
pub mod timer;
pub mod workout;

pub use error::{ConfigError, CoreError, Rejection, Result};
pub use events::Effect;
pub use session::{EndReason, LogRecorder, SegmentOutcome, SessionRecorder, SessionSummary};
pub use storage::{Config, StateFile};
pub use timer::{
    apply, spawn_controller, Action, ControllerHandle, OverflowPolicy, Phase, SystemClock,
    TimerEvent, TimerMachine, TimerState, TimerView, WorkoutController,
};
pub use workout::{InMemoryCatalog, PaceClass, Segment, WorkoutCatalog, WorkoutDefinition};
