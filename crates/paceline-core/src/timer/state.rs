use serde::{Deserialize, Serialize};

use crate::workout::{Segment, WorkoutDefinition};

/// Coarse lifecycle position, derived from the [`TimerState`] flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Idle,
    Running,
    Paused,
    Completed,
}

/// Everything the timer knows about the current run.
///
/// Only [`crate::timer::TimerMachine::apply`] produces new values of this
/// type; everything else reads it. All counters are whole seconds.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TimerState {
    #[serde(default)]
    pub workout: Option<WorkoutDefinition>,
    #[serde(default)]
    pub running: bool,
    #[serde(default)]
    pub started_at_epoch_ms: Option<i64>,
    /// Timestamp the next tick measures its delta from.
    #[serde(default)]
    pub last_tick_at_epoch_ms: Option<i64>,
    /// Total whole seconds spent paused so far.
    #[serde(default)]
    pub paused_accumulated_secs: u64,
    /// Set while paused.
    #[serde(default)]
    pub paused_at_epoch_ms: Option<i64>,
    /// Workout-relative time, counts up, never decreases.
    #[serde(default)]
    pub elapsed_secs: u64,
    #[serde(default)]
    pub current_segment_index: usize,
    /// Time within the current segment. Resets to 0 on advance.
    #[serde(default)]
    pub segment_elapsed_secs: u64,
    /// Only ever true inside a skip transition.
    #[serde(default)]
    pub skipping: bool,
    #[serde(default)]
    pub completed: bool,
    /// Indices of segments ended by `skip`, in order.
    #[serde(default)]
    pub skipped_segments: Vec<usize>,
}

impl TimerState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> Phase {
        match (&self.workout, self.completed, self.running) {
            (None, _, _) => Phase::Idle,
            (Some(_), true, _) => Phase::Completed,
            (Some(_), false, true) => Phase::Running,
            (Some(_), false, false) => Phase::Paused,
        }
    }

    pub fn is_idle(&self) -> bool {
        self.workout.is_none()
    }

    pub fn workout(&self) -> Option<&WorkoutDefinition> {
        self.workout.as_ref()
    }

    pub fn current_segment(&self) -> Option<&Segment> {
        self.workout
            .as_ref()
            .and_then(|w| w.segment(self.current_segment_index))
    }

    pub fn current_segment_duration_secs(&self) -> u64 {
        self.workout
            .as_ref()
            .map(|w| w.duration_of(self.current_segment_index))
            .unwrap_or(0)
    }

    /// `elapsed == cumulative(index) + segment_elapsed`.
    ///
    /// Holds after every transition; exposed for tests and for front ends
    /// that load a persisted state.
    pub fn is_consistent(&self) -> bool {
        let Some(workout) = &self.workout else {
            return self.elapsed_secs == 0
                && self.segment_elapsed_secs == 0
                && self.current_segment_index == 0;
        };
        if self.current_segment_index >= workout.segments.len() {
            return false;
        }
        self.segment_elapsed_secs <= workout.duration_of(self.current_segment_index)
            && self.elapsed_secs
                == workout.cumulative_secs(self.current_segment_index) + self.segment_elapsed_secs
    }
}

/// Inputs to the state machine. Every event that depends on time carries
/// its own timestamp; the machine never reads a clock.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TimerEvent {
    Start {
        workout: WorkoutDefinition,
        at_ms: i64,
    },
    Tick {
        at_ms: i64,
    },
    Pause {
        at_ms: i64,
    },
    Resume {
        at_ms: i64,
    },
    Skip {
        at_ms: i64,
    },
    Reset,
}

impl TimerEvent {
    pub fn name(&self) -> &'static str {
        match self {
            TimerEvent::Start { .. } => "start",
            TimerEvent::Tick { .. } => "tick",
            TimerEvent::Pause { .. } => "pause",
            TimerEvent::Resume { .. } => "resume",
            TimerEvent::Skip { .. } => "skip",
            TimerEvent::Reset => "reset",
        }
    }
}
