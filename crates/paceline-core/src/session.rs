//! Hand-off of a finished (or abandoned) run to the session recorder.
//!
//! The core persists nothing. When a workout completes, or the user ends it
//! early, the final state is summarised here and passed to a
//! [`SessionRecorder`] owned by the surrounding app.

use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::error::Result;
use crate::timer::TimerState;
use crate::workout::PaceClass;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EndReason {
    Completed,
    EndedEarly,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SegmentOutcome {
    Completed,
    Skipped,
    /// The run ended inside this segment.
    Partial { elapsed_secs: u64 },
    NotStarted,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentRecord {
    pub index: usize,
    pub pace: PaceClass,
    pub duration_secs: u32,
    pub outcome: SegmentOutcome,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub session_id: Uuid,
    pub workout_id: String,
    pub workout_name: String,
    pub started_at_ms: Option<i64>,
    pub ended_at_ms: i64,
    pub elapsed_secs: u64,
    pub paused_secs: u64,
    pub current_segment_index: usize,
    pub end: EndReason,
    pub segments: Vec<SegmentRecord>,
}

impl SessionSummary {
    /// Summarise `state`. Returns `None` when no workout is loaded.
    pub fn from_state(state: &TimerState, ended_at_ms: i64) -> Option<Self> {
        let workout = state.workout.as_ref()?;
        let end = if state.completed {
            EndReason::Completed
        } else {
            EndReason::EndedEarly
        };

        let segments = workout
            .segments
            .iter()
            .enumerate()
            .map(|(index, segment)| {
                let outcome = if state.skipped_segments.contains(&index) {
                    SegmentOutcome::Skipped
                } else if index < state.current_segment_index {
                    SegmentOutcome::Completed
                } else if index > state.current_segment_index {
                    SegmentOutcome::NotStarted
                } else if state.segment_elapsed_secs >= u64::from(segment.duration_secs) {
                    SegmentOutcome::Completed
                } else if state.segment_elapsed_secs == 0 {
                    SegmentOutcome::NotStarted
                } else {
                    SegmentOutcome::Partial {
                        elapsed_secs: state.segment_elapsed_secs,
                    }
                };
                SegmentRecord {
                    index,
                    pace: segment.pace,
                    duration_secs: segment.duration_secs,
                    outcome,
                }
            })
            .collect();

        // Still paused at hand-off: count the open pause up to now.
        let open_pause = state
            .paused_at_epoch_ms
            .map(|p| ended_at_ms.saturating_sub(p).max(0).unsigned_abs() / 1000)
            .unwrap_or(0);

        Some(Self {
            session_id: Uuid::new_v4(),
            workout_id: workout.id.clone(),
            workout_name: workout.name.clone(),
            started_at_ms: state.started_at_epoch_ms,
            ended_at_ms,
            elapsed_secs: state.elapsed_secs,
            paused_secs: state.paused_accumulated_secs + open_pause,
            current_segment_index: state.current_segment_index,
            end,
            segments,
        })
    }

    pub fn skipped_count(&self) -> usize {
        self.segments
            .iter()
            .filter(|s| s.outcome == SegmentOutcome::Skipped)
            .count()
    }
}

/// Receives summaries for persistence elsewhere.
pub trait SessionRecorder: Send {
    fn record(&mut self, summary: &SessionSummary) -> Result<()>;
}

/// Writes summaries to the log and nothing else.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogRecorder;

impl SessionRecorder for LogRecorder {
    fn record(&mut self, summary: &SessionSummary) -> Result<()> {
        info!(
            session_id = %summary.session_id,
            workout = %summary.workout_id,
            end = ?summary.end,
            elapsed = summary.elapsed_secs,
            skipped = summary.skipped_count(),
            "session ended"
        );
        Ok(())
    }
}
