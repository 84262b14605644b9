//! Cancellable periodic tasks driving the poll loops.
//!
//! Ticks never overlap: the next tick waits for the previous one to finish
//! (missed ticks are delayed, not bursted). Cancelling stops further ticks
//! but never aborts a tick already running; the tick body receives the
//! token and checks it before publishing results.

use std::future::Future;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

/// When the first tick fires
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FirstTick {
    Immediate,
    AfterPeriod,
}

/// Owner of a running poll loop. Dropping it cancels the loop.
#[derive(Debug)]
pub struct PollHandle {
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

impl PollHandle {
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    pub fn token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// True once the loop has exited (after cancellation and any in-flight tick)
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl Drop for PollHandle {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

/// Run `tick` every `period` on the tokio runtime until the handle is cancelled.
pub fn spawn_periodic<F, Fut>(period: Duration, first: FirstTick, mut tick: F) -> PollHandle
where
    F: FnMut(CancellationToken) -> Fut + Send + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    let cancel = CancellationToken::new();
    let token = cancel.clone();
    // Anchored at the call, not at the task's first poll
    let start = match first {
        FirstTick::Immediate => Instant::now(),
        FirstTick::AfterPeriod => Instant::now() + period,
    };

    let task = tokio::spawn(async move {
        let mut interval = tokio::time::interval_at(start, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                _ = token.cancelled() => break,
                _ = interval.tick() => {}
            }
            tick(token.clone()).await;
        }
    });

    PollHandle { cancel, task }
}
