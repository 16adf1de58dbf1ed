//! Timer state machine.
//!
//! A pure transition function over [`TimerState`]. It has no threads, no
//! clock and no side effects: every event carries its own timestamp, and the
//! instructions for the outside world come back as [`Effect`]s.
//!
//! ## State Transitions
//!
//! ```text
//! Idle -> Running <-> Paused -> Completed
//!           \__ skip __/
//! ```
//!
//! Skip runs as a single update. The `skipping` flag is raised and lowered
//! inside that update, so a tick can never observe a half-skipped state.
//!
//! ## Usage
//!
//! ```
//! use paceline_core::timer::{apply, TimerEvent, TimerState};
//! use paceline_core::workout::{PaceClass, Segment, WorkoutDefinition};
//!
//! let workout = WorkoutDefinition::new("w", "W", vec![Segment::new(PaceClass::Easy, 60)]).unwrap();
//! let state = TimerState::new();
//! let state = apply(&state, &TimerEvent::Start { workout, at_ms: 0 }).unwrap().state;
//! let state = apply(&state, &TimerEvent::Tick { at_ms: 5_000 }).unwrap().state;
//! assert_eq!(state.elapsed_secs, 5);
//! ```

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::state::{TimerEvent, TimerState};
use crate::error::Rejection;
use crate::events::Effect;
use crate::workout::WorkoutDefinition;

/// What happens to the part of a tick that runs past a segment boundary.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OverflowPolicy {
    /// Carry it into the following segments, crossing as many boundaries as
    /// the delta covers. One tick of N seconds lands exactly where N
    /// one-second ticks would.
    #[default]
    Cascade,
    /// Drop it at the first boundary. The next segment starts at 0.
    Discard,
}

/// Result of an accepted event.
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub state: TimerState,
    pub effects: Vec<Effect>,
}

impl Transition {
    fn quiet(state: TimerState) -> Self {
        Self {
            state,
            effects: Vec::new(),
        }
    }

    /// True if this transition carried the terminal `Completed` signal.
    pub fn completed(&self) -> bool {
        self.effects.iter().any(Effect::is_completed)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TimerMachine {
    overflow: OverflowPolicy,
}

/// Apply `event` to `state` with the default [`OverflowPolicy`].
pub fn apply(state: &TimerState, event: &TimerEvent) -> Result<Transition, Rejection> {
    TimerMachine::default().apply(state, event)
}

impl TimerMachine {
    pub fn new(overflow: OverflowPolicy) -> Self {
        Self { overflow }
    }

    pub fn overflow(&self) -> OverflowPolicy {
        self.overflow
    }

    /// Compute the state that follows `event`.
    ///
    /// On `Err` nothing changed: the caller keeps `state` as it was.
    pub fn apply(&self, state: &TimerState, event: &TimerEvent) -> Result<Transition, Rejection> {
        let result = match event {
            TimerEvent::Start { workout, at_ms } => self.start(state, workout, *at_ms),
            TimerEvent::Tick { at_ms } => self.tick(state, *at_ms),
            TimerEvent::Pause { at_ms } => self.pause(state, *at_ms),
            TimerEvent::Resume { at_ms } => self.resume(state, *at_ms),
            TimerEvent::Skip { at_ms } => self.skip(state, *at_ms),
            TimerEvent::Reset => Ok(self.reset(state)),
        };

        match &result {
            Ok(t) if !t.effects.is_empty() => debug!(
                event = event.name(),
                elapsed = t.state.elapsed_secs,
                segment = t.state.current_segment_index,
                segment_elapsed = t.state.segment_elapsed_secs,
                effects = t.effects.len(),
                "timer transition"
            ),
            Ok(_) => {}
            Err(reason) => debug!(event = event.name(), %reason, "timer event rejected"),
        }
        result
    }

    // ── Events ───────────────────────────────────────────────────────

    fn start(
        &self,
        state: &TimerState,
        workout: &WorkoutDefinition,
        at: i64,
    ) -> Result<Transition, Rejection> {
        if state.workout.is_some() && !state.completed {
            return Err(Rejection::AlreadyActive);
        }
        workout.validate()?;

        let next = TimerState {
            workout: Some(workout.clone()),
            running: true,
            started_at_epoch_ms: Some(at),
            last_tick_at_epoch_ms: Some(at),
            ..TimerState::default()
        };
        Ok(Transition {
            state: next,
            effects: vec![Effect::StartTicking, Effect::SegmentStarted { index: 0 }],
        })
    }

    fn pause(&self, state: &TimerState, at: i64) -> Result<Transition, Rejection> {
        if !state.running {
            return Err(Rejection::NotRunning);
        }
        // Counters freeze because no further ticks are applied.
        let mut next = state.clone();
        next.running = false;
        next.paused_at_epoch_ms = Some(at);
        Ok(Transition {
            state: next,
            effects: vec![Effect::StopTicking],
        })
    }

    fn resume(&self, state: &TimerState, at: i64) -> Result<Transition, Rejection> {
        if state.running || state.completed || state.workout.is_none() {
            return Err(Rejection::NotPaused);
        }
        let mut next = state.clone();
        close_pause(&mut next, at);
        next.running = true;
        // The next tick measures from here, so the paused interval is never counted.
        next.last_tick_at_epoch_ms = Some(at);
        Ok(Transition {
            state: next,
            effects: vec![Effect::StartTicking],
        })
    }

    fn tick(&self, state: &TimerState, at: i64) -> Result<Transition, Rejection> {
        if !state.running {
            return Err(Rejection::NotRunning);
        }
        if state.skipping {
            return Err(Rejection::AlreadySkipping);
        }
        let Some(workout) = state.workout.as_ref() else {
            return Err(Rejection::NotRunning);
        };

        let last = state.last_tick_at_epoch_ms.unwrap_or(at);
        let delta = whole_secs_between(last, at);
        if delta < 1 {
            // Sub-second or duplicate tick. `last_tick_at` stays put so the
            // fragments add up across rapid ticks.
            return Ok(Transition::quiet(state.clone()));
        }

        let mut next = state.clone();
        let mut effects = Vec::new();
        let mut budget = delta.unsigned_abs();
        loop {
            let duration = workout.duration_of(next.current_segment_index);
            let room = duration.saturating_sub(next.segment_elapsed_secs);
            let applied = budget.min(room);
            next.elapsed_secs += applied;
            next.segment_elapsed_secs += applied;
            budget -= applied;

            if next.segment_elapsed_secs < duration {
                break;
            }
            finish_segment(&mut next, workout, false, at, &mut effects);
            if next.completed || budget == 0 || self.overflow == OverflowPolicy::Discard {
                break;
            }
        }
        next.last_tick_at_epoch_ms = Some(at);

        Ok(Transition {
            state: next,
            effects,
        })
    }

    fn skip(&self, state: &TimerState, at: i64) -> Result<Transition, Rejection> {
        let Some(workout) = state.workout.as_ref() else {
            return Err(Rejection::NothingToSkip);
        };
        if state.completed {
            return Err(Rejection::NothingToSkip);
        }
        if state.skipping {
            return Err(Rejection::AlreadySkipping);
        }

        let mut next = state.clone();
        let mut effects = Vec::new();
        next.skipping = true;

        // Land exactly on the cumulative boundary using the stored counter,
        // never a fresh wall-clock delta.
        let index = next.current_segment_index;
        let duration = workout.duration_of(index);
        let remaining = duration.saturating_sub(next.segment_elapsed_secs);
        next.elapsed_secs += remaining;
        next.segment_elapsed_secs = duration;
        next.skipped_segments.push(index);
        finish_segment(&mut next, workout, true, at, &mut effects);

        // The next tick measures from the skip, not from the last pre-skip tick.
        next.last_tick_at_epoch_ms = Some(at);
        next.skipping = false;

        Ok(Transition {
            state: next,
            effects,
        })
    }

    fn reset(&self, state: &TimerState) -> Transition {
        let effects = if state.running {
            vec![Effect::StopTicking]
        } else {
            Vec::new()
        };
        Transition {
            state: TimerState::default(),
            effects,
        }
    }
}

// ── Internal ─────────────────────────────────────────────────────

/// Move past the current segment, which must be exhausted
/// (`segment_elapsed == duration`). Advances to the next segment or
/// completes the workout.
fn finish_segment(
    state: &mut TimerState,
    workout: &WorkoutDefinition,
    skipped: bool,
    at: i64,
    effects: &mut Vec<Effect>,
) {
    let index = state.current_segment_index;
    effects.push(Effect::SegmentCompleted { index, skipped });

    if index < workout.last_index() {
        state.current_segment_index = index + 1;
        state.segment_elapsed_secs = 0;
        effects.push(Effect::SegmentStarted { index: index + 1 });
        return;
    }

    // Last segment: the index stays put and segment_elapsed stays at the
    // full duration, so the boundary identity still holds.
    state.completed = true;
    close_pause(state, at);
    if state.running {
        state.running = false;
        effects.push(Effect::StopTicking);
    }
    effects.push(Effect::Completed {
        elapsed_secs: state.elapsed_secs,
    });
}

fn close_pause(state: &mut TimerState, at: i64) {
    if let Some(paused_at) = state.paused_at_epoch_ms.take() {
        let paused = whole_secs_between(paused_at, at).max(0);
        state.paused_accumulated_secs += paused.unsigned_abs();
    }
}

/// `floor((to - from) / 1000)`; negative when the clock went backwards.
fn whole_secs_between(from: i64, to: i64) -> i64 {
    to.saturating_sub(from).div_euclid(1000)
}
