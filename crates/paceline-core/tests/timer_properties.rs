//! Property tests for the timer invariants.

use paceline_core::{
    apply, PaceClass, Segment, TimerEvent, TimerState, WorkoutDefinition,
};
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Op {
    Tick(i64),
    Pause(i64),
    Resume(i64),
    Skip(i64),
    Reset,
    Start(i64),
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        6 => (0i64..4_000).prop_map(Op::Tick),
        1 => (0i64..10_000).prop_map(Op::Pause),
        1 => (0i64..60_000).prop_map(Op::Resume),
        1 => (0i64..2_000).prop_map(Op::Skip),
        1 => Just(Op::Reset),
        1 => (0i64..1_000).prop_map(Op::Start),
    ]
}

fn durations() -> impl Strategy<Value = Vec<u32>> {
    prop::collection::vec(1u32..120, 1..6)
}

fn workout(durations: &[u32]) -> WorkoutDefinition {
    let segments = durations
        .iter()
        .map(|&d| Segment::new(PaceClass::Steady, d))
        .collect();
    WorkoutDefinition::new("prop", "Prop", segments).unwrap()
}

fn started(durations: &[u32]) -> TimerState {
    apply(
        &TimerState::new(),
        &TimerEvent::Start {
            workout: workout(durations),
            at_ms: 0,
        },
    )
    .unwrap()
    .state
}

proptest! {
    #[test]
    fn counters_are_monotonic_and_consistent(durs in durations(), ops in prop::collection::vec(op(), 0..80)) {
        let def = workout(&durs);
        let mut state = started(&durs);
        let mut now = 0i64;

        for op in ops {
            let event = match op {
                Op::Tick(d) => { now += d; TimerEvent::Tick { at_ms: now } }
                Op::Pause(d) => { now += d; TimerEvent::Pause { at_ms: now } }
                Op::Resume(d) => { now += d; TimerEvent::Resume { at_ms: now } }
                Op::Skip(d) => { now += d; TimerEvent::Skip { at_ms: now } }
                Op::Reset => TimerEvent::Reset,
                Op::Start(d) => { now += d; TimerEvent::Start { workout: def.clone(), at_ms: now } }
            };
            let lifecycle = matches!(event, TimerEvent::Reset | TimerEvent::Start { .. });

            let Ok(t) = apply(&state, &event) else {
                continue;
            };
            if !lifecycle {
                prop_assert!(t.state.elapsed_secs >= state.elapsed_secs);
                prop_assert!(t.state.current_segment_index >= state.current_segment_index);
            }
            if state.completed && matches!(event, TimerEvent::Tick { .. }) {
                prop_assert_eq!(&t.state, &state);
            }
            prop_assert!(t.state.is_consistent(), "inconsistent after {:?}: {:?}", event, t.state);
            prop_assert!(!t.state.skipping);
            state = t.state;
        }
    }

    #[test]
    fn one_big_tick_equals_many_small_ones(durs in durations(), d in 0u64..700) {
        let start = started(&durs);

        let big = apply(&start, &TimerEvent::Tick { at_ms: d as i64 * 1_000 }).unwrap().state;

        let mut small = start.clone();
        for s in 1..=d as i64 {
            match apply(&small, &TimerEvent::Tick { at_ms: s * 1_000 }) {
                Ok(t) => small = t.state,
                Err(_) => break,
            }
        }

        prop_assert_eq!(big.elapsed_secs, small.elapsed_secs);
        prop_assert_eq!(big.current_segment_index, small.current_segment_index);
        prop_assert_eq!(big.segment_elapsed_secs, small.segment_elapsed_secs);
        prop_assert_eq!(big.completed, small.completed);
    }

    #[test]
    fn skip_lands_on_cumulative_boundary(durs in durations(), ticked in 0u64..200, skip_offset in 0i64..999) {
        let def = workout(&durs);
        let state = started(&durs);
        let state = apply(&state, &TimerEvent::Tick { at_ms: ticked as i64 * 1_000 }).unwrap().state;
        prop_assume!(!state.completed);

        let index = state.current_segment_index;
        let at = ticked as i64 * 1_000 + skip_offset;
        let t = apply(&state, &TimerEvent::Skip { at_ms: at }).unwrap();

        prop_assert_eq!(t.state.elapsed_secs, def.cumulative_secs(index + 1));
        if index + 1 < durs.len() {
            prop_assert_eq!(t.state.current_segment_index, index + 1);
            prop_assert_eq!(t.state.segment_elapsed_secs, 0);
            prop_assert_eq!(t.state.last_tick_at_epoch_ms, Some(at));
        } else {
            prop_assert!(t.state.completed);
            prop_assert!(t.completed());
        }
    }

    #[test]
    fn paused_interval_is_never_counted(pause_ms in 0i64..10_000_000, ticked in 1i64..50) {
        let state = started(&[100]);
        let state = apply(&state, &TimerEvent::Tick { at_ms: ticked * 1_000 }).unwrap().state;
        let before = state.elapsed_secs;

        let paused_at = ticked * 1_000;
        let state = apply(&state, &TimerEvent::Pause { at_ms: paused_at }).unwrap().state;
        let state = apply(&state, &TimerEvent::Resume { at_ms: paused_at + pause_ms }).unwrap().state;
        prop_assert_eq!(state.elapsed_secs, before);

        let state = apply(&state, &TimerEvent::Tick { at_ms: paused_at + pause_ms + 1_000 }).unwrap().state;
        prop_assert_eq!(state.elapsed_secs, before + 1);
    }
}
