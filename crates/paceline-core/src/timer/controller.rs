//! Single owner of the timer state.
//!
//! [`WorkoutController`] resolves workout ids through the catalog, feeds
//! events to the state machine and hands finished runs to the recorder. It is
//! synchronous and can be driven directly (the CLI does this).
//!
//! [`spawn_controller`] puts a controller on a tokio task behind a
//! single-consumer queue. User actions and ticks are applied strictly in the
//! order they were queued, and tick-source start/stop effects are carried out
//! inside the same step that produced them.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::driver::{Clock, Tick, TickSource};
use super::machine::{TimerMachine, Transition};
use super::progress::TimerView;
use super::state::{TimerEvent, TimerState};
use crate::error::{CoreError, Rejection, Result};
use crate::events::Effect;
use crate::session::{SessionRecorder, SessionSummary};
use crate::workout::WorkoutCatalog;

/// A request from the UI layer (or the tick source, for `Tick`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Start { workout_id: String },
    Tick,
    Pause,
    Resume,
    Skip,
    Reset,
    /// Hand the current run to the recorder and return to idle.
    EndEarly,
}

pub struct WorkoutController<C, R> {
    state: TimerState,
    machine: TimerMachine,
    catalog: C,
    recorder: R,
}

impl<C: WorkoutCatalog, R: SessionRecorder> WorkoutController<C, R> {
    pub fn new(catalog: C, recorder: R, machine: TimerMachine) -> Self {
        Self {
            state: TimerState::default(),
            machine,
            catalog,
            recorder,
        }
    }

    /// Resume ownership of a previously persisted state.
    pub fn with_state(mut self, state: TimerState) -> Self {
        self.state = state;
        self
    }

    pub fn state(&self) -> &TimerState {
        &self.state
    }

    pub fn into_state(self) -> TimerState {
        self.state
    }

    pub fn catalog(&self) -> &C {
        &self.catalog
    }

    pub fn recorder(&self) -> &R {
        &self.recorder
    }

    pub fn view(&self, now_ms: i64) -> TimerView {
        TimerView::at(&self.state, now_ms)
    }

    /// Apply `action` at `now_ms`.
    ///
    /// # Errors
    ///
    /// [`CoreError::UnknownWorkout`] for an id the catalog does not know,
    /// [`CoreError::Rejected`] when the machine refuses the event. The state
    /// is unchanged in both cases.
    pub fn handle(&mut self, action: &Action, now_ms: i64) -> Result<Transition> {
        let event = match action {
            Action::Start { workout_id } => {
                let workout = self
                    .catalog
                    .get(workout_id)
                    .ok_or_else(|| CoreError::UnknownWorkout(workout_id.clone()))?;
                TimerEvent::Start {
                    workout,
                    at_ms: now_ms,
                }
            }
            Action::Tick => TimerEvent::Tick { at_ms: now_ms },
            Action::Pause => TimerEvent::Pause { at_ms: now_ms },
            Action::Resume => TimerEvent::Resume { at_ms: now_ms },
            Action::Skip => TimerEvent::Skip { at_ms: now_ms },
            Action::Reset => TimerEvent::Reset,
            Action::EndEarly => return self.end_early(now_ms),
        };

        let transition = self.machine.apply(&self.state, &event)?;
        if let TimerEvent::Start { workout, .. } = &event {
            info!(workout = %workout.id, segments = workout.segments.len(), "workout started");
        }
        if transition.completed() {
            info!(elapsed = transition.state.elapsed_secs, "workout completed");
            self.hand_off(&transition.state, now_ms);
        }
        self.state = transition.state.clone();
        Ok(transition)
    }

    fn end_early(&mut self, now_ms: i64) -> Result<Transition> {
        if self.state.is_idle() {
            return Err(Rejection::NotRunning.into());
        }
        // A completed run was already recorded when it completed.
        if !self.state.completed {
            let state = self.state.clone();
            self.hand_off(&state, now_ms);
        }
        let transition = self.machine.apply(&self.state, &TimerEvent::Reset)?;
        self.state = transition.state.clone();
        Ok(transition)
    }

    fn hand_off(&mut self, state: &TimerState, now_ms: i64) {
        let Some(summary) = SessionSummary::from_state(state, now_ms) else {
            return;
        };
        if let Err(e) = self.recorder.record(&summary) {
            warn!(error = %e, session_id = %summary.session_id, "session recorder failed");
        }
    }
}

// ── Async runtime ────────────────────────────────────────────────

enum Message {
    Action {
        action: Action,
        reply: oneshot::Sender<Result<TimerView>>,
    },
    Tick(Tick),
    Snapshot(oneshot::Sender<TimerState>),
}

impl From<Tick> for Message {
    fn from(tick: Tick) -> Self {
        Message::Tick(tick)
    }
}

/// Cloneable handle to a controller running on a tokio task.
///
/// The task exits once every handle is dropped.
#[derive(Clone)]
pub struct ControllerHandle {
    tx: mpsc::UnboundedSender<Message>,
    view: watch::Receiver<TimerView>,
}

impl ControllerHandle {
    /// Queue `action` and wait for its result.
    pub async fn send(&self, action: Action) -> Result<TimerView> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(Message::Action { action, reply })
            .map_err(|_| CoreError::ControllerClosed)?;
        rx.await.map_err(|_| CoreError::ControllerClosed)?
    }

    pub async fn start(&self, workout_id: impl Into<String>) -> Result<TimerView> {
        self.send(Action::Start {
            workout_id: workout_id.into(),
        })
        .await
    }

    pub async fn pause(&self) -> Result<TimerView> {
        self.send(Action::Pause).await
    }

    pub async fn resume(&self) -> Result<TimerView> {
        self.send(Action::Resume).await
    }

    pub async fn skip(&self) -> Result<TimerView> {
        self.send(Action::Skip).await
    }

    pub async fn reset(&self) -> Result<TimerView> {
        self.send(Action::Reset).await
    }

    pub async fn end_early(&self) -> Result<TimerView> {
        self.send(Action::EndEarly).await
    }

    /// The full state, after everything queued before this call was applied.
    pub async fn snapshot(&self) -> Result<TimerState> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(Message::Snapshot(reply))
            .map_err(|_| CoreError::ControllerClosed)?;
        rx.await.map_err(|_| CoreError::ControllerClosed)
    }

    /// Latest published view, without waiting on the queue.
    pub fn view(&self) -> TimerView {
        self.view.borrow().clone()
    }

    /// Receiver that changes after every processed message.
    pub fn subscribe(&self) -> watch::Receiver<TimerView> {
        self.view.clone()
    }
}

/// Run `controller` on a tokio task.
pub fn spawn_controller<C, R>(
    controller: WorkoutController<C, R>,
    clock: Arc<dyn Clock>,
    tick_period: Duration,
) -> (ControllerHandle, JoinHandle<TimerState>)
where
    C: WorkoutCatalog + 'static,
    R: SessionRecorder + 'static,
{
    let (tx, rx) = mpsc::unbounded_channel();
    let (view_tx, view_rx) = watch::channel(controller.view(clock.now_ms()));
    let weak = tx.downgrade();

    let task = tokio::spawn(run_loop(controller, clock, tick_period, rx, weak, view_tx));
    (ControllerHandle { tx, view: view_rx }, task)
}

async fn run_loop<C, R>(
    mut controller: WorkoutController<C, R>,
    clock: Arc<dyn Clock>,
    tick_period: Duration,
    mut rx: mpsc::UnboundedReceiver<Message>,
    weak: mpsc::WeakUnboundedSender<Message>,
    view_tx: watch::Sender<TimerView>,
) -> TimerState
where
    C: WorkoutCatalog,
    R: SessionRecorder,
{
    let mut ticks = TickSource::new(tick_period);
    // A restored running state needs its tick source back.
    if controller.state().running {
        if let Some(tx) = weak.upgrade() {
            ticks.start(clock.clone(), &tx);
        }
    }

    while let Some(message) = rx.recv().await {
        match message {
            Message::Tick(tick) => {
                if !ticks.is_current(&tick) {
                    debug!(generation = tick.generation, "dropping stale tick");
                    continue;
                }
                match controller.handle(&Action::Tick, tick.at_ms) {
                    Ok(transition) => run_effects(&transition.effects, &mut ticks, &clock, &weak),
                    Err(e) => debug!(error = %e, "tick not applied"),
                }
            }
            Message::Action { action, reply } => {
                let now = clock.now_ms();
                let result = controller.handle(&action, now).map(|transition| {
                    run_effects(&transition.effects, &mut ticks, &clock, &weak);
                    controller.view(now)
                });
                let _ = reply.send(result);
            }
            Message::Snapshot(reply) => {
                let _ = reply.send(controller.state().clone());
                continue;
            }
        }
        view_tx.send_replace(controller.view(clock.now_ms()));
    }

    ticks.stop();
    controller.into_state()
}

fn run_effects(
    effects: &[Effect],
    ticks: &mut TickSource,
    clock: &Arc<dyn Clock>,
    weak: &mpsc::WeakUnboundedSender<Message>,
) {
    for effect in effects {
        match effect {
            Effect::StartTicking => {
                if let Some(tx) = weak.upgrade() {
                    ticks.start(clock.clone(), &tx);
                }
            }
            Effect::StopTicking => ticks.stop(),
            // Audio cues and navigation hang off the published view.
            Effect::SegmentStarted { .. }
            | Effect::SegmentCompleted { .. }
            | Effect::Completed { .. } => {}
        }
    }
}
