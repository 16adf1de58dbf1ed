//! Read-only values derived from a [`TimerState`].
//!
//! Nothing here is stored. Each call recomputes from the counters, so the two
//! clocks a screen shows (elapsed overall, remaining in segment) cannot drift
//! apart.

use serde::{Deserialize, Serialize};

use super::state::{Phase, TimerState};
use crate::workout::PaceClass;

impl TimerState {
    /// Seconds left in the current segment, rounded up and floored at 0.
    pub fn segment_remaining_secs(&self) -> u64 {
        self.current_segment_duration_secs()
            .saturating_sub(self.segment_elapsed_secs)
    }

    /// Like [`TimerState::segment_remaining_secs`] but accounts for the
    /// sub-second time since the last applied tick while running.
    ///
    /// Rounds up, so a countdown never shows 0 while time remains.
    pub fn segment_remaining_secs_at(&self, now_ms: i64) -> u64 {
        let remaining_ms = self.segment_remaining_secs().saturating_mul(1000);
        let pending_ms = match (self.running, self.last_tick_at_epoch_ms) {
            (true, Some(last)) => now_ms.saturating_sub(last).max(0).unsigned_abs(),
            _ => 0,
        };
        remaining_ms.saturating_sub(pending_ms).div_ceil(1000)
    }

    pub fn total_duration_secs(&self) -> u64 {
        self.workout
            .as_ref()
            .map(|w| w.total_duration_secs())
            .unwrap_or(0)
    }

    pub fn remaining_total_secs(&self) -> u64 {
        self.total_duration_secs().saturating_sub(self.elapsed_secs)
    }

    /// 0.0 .. 1.0 progress across the whole workout.
    pub fn progress_fraction(&self) -> f64 {
        let total = self.total_duration_secs();
        if total == 0 {
            return 0.0;
        }
        (self.elapsed_secs as f64 / total as f64).clamp(0.0, 1.0)
    }

    /// 0.0 .. 1.0 progress within the current segment.
    pub fn segment_progress_fraction(&self) -> f64 {
        let total = self.current_segment_duration_secs();
        if total == 0 {
            return 0.0;
        }
        (self.segment_elapsed_secs as f64 / total as f64).clamp(0.0, 1.0)
    }
}

/// Snapshot of everything a screen renders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimerView {
    pub phase: Phase,
    pub workout_id: Option<String>,
    pub workout_name: Option<String>,
    pub segment_index: usize,
    pub segment_count: usize,
    pub segment_label: String,
    pub segment_pace: Option<PaceClass>,
    pub elapsed_secs: u64,
    pub segment_elapsed_secs: u64,
    pub segment_remaining_secs: u64,
    pub total_duration_secs: u64,
    pub progress_fraction: f64,
    pub elapsed_display: String,
    pub remaining_display: String,
}

impl TimerView {
    pub fn from_state(state: &TimerState) -> Self {
        Self::build(state, state.segment_remaining_secs())
    }

    /// Snapshot using the sub-second-aware countdown at `now_ms`.
    pub fn at(state: &TimerState, now_ms: i64) -> Self {
        Self::build(state, state.segment_remaining_secs_at(now_ms))
    }

    fn build(state: &TimerState, segment_remaining_secs: u64) -> Self {
        let segment = state.current_segment();
        Self {
            phase: state.phase(),
            workout_id: state.workout.as_ref().map(|w| w.id.clone()),
            workout_name: state.workout.as_ref().map(|w| w.name.clone()),
            segment_index: state.current_segment_index,
            segment_count: state.workout.as_ref().map(|w| w.segments.len()).unwrap_or(0),
            segment_label: segment.map(|s| s.metadata.label.clone()).unwrap_or_default(),
            segment_pace: segment.map(|s| s.pace),
            elapsed_secs: state.elapsed_secs,
            segment_elapsed_secs: state.segment_elapsed_secs,
            segment_remaining_secs,
            total_duration_secs: state.total_duration_secs(),
            progress_fraction: state.progress_fraction(),
            elapsed_display: format_clock(state.elapsed_secs),
            remaining_display: format_clock(segment_remaining_secs),
        }
    }
}

/// `MM:SS` below an hour, `H:MM:SS` from an hour up.
pub fn format_clock(secs: u64) -> String {
    let h = secs / 3600;
    let m = (secs % 3600) / 60;
    let s = secs % 60;
    if h > 0 {
        format!("{}:{:02}:{:02}", h, m, s)
    } else {
        format!("{:02}:{:02}", m, s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workout::{Segment, WorkoutDefinition};

    fn state_at(elapsed: u64, index: usize, segment_elapsed: u64) -> TimerState {
        TimerState {
            workout: Some(
                WorkoutDefinition::new(
                    "w",
                    "W",
                    vec![
                        Segment::new(PaceClass::Warmup, 60).with_label("Warm Up"),
                        Segment::new(PaceClass::Sprint, 90).with_label("Sprint"),
                        Segment::new(PaceClass::Cooldown, 30),
                    ],
                )
                .unwrap(),
            ),
            running: true,
            last_tick_at_epoch_ms: Some(10_000),
            elapsed_secs: elapsed,
            current_segment_index: index,
            segment_elapsed_secs: segment_elapsed,
            ..TimerState::default()
        }
    }

    #[test]
    fn idle_selectors_are_zero() {
        let state = TimerState::new();
        assert_eq!(state.segment_remaining_secs(), 0);
        assert_eq!(state.total_duration_secs(), 0);
        assert_eq!(state.progress_fraction(), 0.0);
    }

    #[test]
    fn remaining_and_progress() {
        let state = state_at(75, 1, 15);
        assert_eq!(state.segment_remaining_secs(), 75);
        assert_eq!(state.total_duration_secs(), 180);
        assert_eq!(state.remaining_total_secs(), 105);
        assert!((state.progress_fraction() - 75.0 / 180.0).abs() < 1e-9);
    }

    #[test]
    fn countdown_rounds_up_between_ticks() {
        let state = state_at(59, 0, 59);
        assert_eq!(state.segment_remaining_secs_at(10_000), 1);
        assert_eq!(state.segment_remaining_secs_at(10_200), 1);
        assert_eq!(state.segment_remaining_secs_at(10_999), 1);
        assert_eq!(state.segment_remaining_secs_at(11_000), 0);
        assert_eq!(state.segment_remaining_secs_at(15_000), 0);
    }

    #[test]
    fn paused_countdown_ignores_wall_clock() {
        let mut state = state_at(30, 0, 30);
        state.running = false;
        assert_eq!(state.segment_remaining_secs_at(99_000), 30);
    }

    #[test]
    fn view_carries_segment_metadata() {
        let view = TimerView::from_state(&state_at(61, 1, 1));
        assert_eq!(view.phase, Phase::Running);
        assert_eq!(view.segment_label, "Sprint");
        assert_eq!(view.segment_pace, Some(PaceClass::Sprint));
        assert_eq!(view.segment_count, 3);
        assert_eq!(view.elapsed_display, "01:01");
        assert_eq!(view.remaining_display, "01:29");
    }

    #[test]
    fn format_clock_switches_to_hours() {
        assert_eq!(format_clock(0), "00:00");
        assert_eq!(format_clock(59), "00:59");
        assert_eq!(format_clock(754), "12:34");
        assert_eq!(format_clock(3600), "1:00:00");
        assert_eq!(format_clock(3725), "1:02:05");
    }
}
