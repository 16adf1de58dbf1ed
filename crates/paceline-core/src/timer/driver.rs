//! Periodic tick source.
//!
//! A cancellable tokio task that stamps the current time roughly once per
//! period and pushes it into the controller queue. Every run of the task has
//! a generation number; [`TickSource::stop`] aborts the task and bumps the
//! generation, so any tick that was already queued is recognisably stale.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::mpsc::{UnboundedSender, WeakUnboundedSender};
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};
use tracing::trace;

/// Wall-clock source for event timestamps, in epoch milliseconds.
pub trait Clock: Send + Sync + 'static {
    fn now_ms(&self) -> i64;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> i64 {
        Utc::now().timestamp_millis()
    }
}

/// One timestamp from the tick source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tick {
    pub generation: u64,
    pub at_ms: i64,
}

#[derive(Debug)]
pub struct TickSource {
    period: Duration,
    generation: u64,
    handle: Option<JoinHandle<()>>,
}

impl TickSource {
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            generation: 0,
            handle: None,
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Ticks carrying any other generation are stale.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_running(&self) -> bool {
        self.handle.is_some()
    }

    pub fn is_current(&self, tick: &Tick) -> bool {
        self.handle.is_some() && tick.generation == self.generation
    }

    /// Start delivering ticks to `tx`, replacing any previous run.
    ///
    /// The first tick arrives one period from now. The task holds only a weak
    /// sender and exits on its own once the queue's last strong sender is
    /// gone.
    pub fn start<M>(&mut self, clock: Arc<dyn Clock>, tx: &UnboundedSender<M>)
    where
        M: From<Tick> + Send + 'static,
    {
        self.stop();
        let generation = self.generation;
        let period = self.period;
        let weak: WeakUnboundedSender<M> = tx.downgrade();

        let handle = tokio::spawn(async move {
            let mut interval = time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            // The first tick completes immediately; start/resume already
            // stamped this instant.
            interval.tick().await;
            loop {
                interval.tick().await;
                let Some(tx) = weak.upgrade() else {
                    break;
                };
                let tick = Tick {
                    generation,
                    at_ms: clock.now_ms(),
                };
                trace!(generation, at_ms = tick.at_ms, "tick");
                if tx.send(tick.into()).is_err() {
                    break;
                }
            }
        });
        self.handle = Some(handle);
    }

    /// Stop delivering ticks. Takes effect before this returns: the task is
    /// aborted and anything it already queued is stale.
    pub fn stop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
        self.generation = self.generation.wrapping_add(1);
    }
}

impl Drop for TickSource {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}
