use serde::{Deserialize, Serialize};

/// Instructions produced by a state transition.
///
/// The state machine never starts timers, plays audio or navigates. It
/// returns these alongside the new state and the owner of the state carries
/// them out, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Effect {
    /// Begin delivering ticks.
    StartTicking,
    /// Stop delivering ticks before the next event is processed.
    StopTicking,
    SegmentStarted {
        index: usize,
    },
    SegmentCompleted {
        index: usize,
        skipped: bool,
    },
    /// Terminal signal. The last segment's duration is exhausted.
    Completed {
        elapsed_secs: u64,
    },
}

impl Effect {
    pub fn is_completed(&self) -> bool {
        matches!(self, Effect::Completed { .. })
    }
}
