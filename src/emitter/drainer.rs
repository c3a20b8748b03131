//! # Periodic queue draining.
//!
//! [`Drainer`] is the handle of a background task that calls `drain()` on a
//! queue emitter at a fixed interval.
//!
//! ```text
//! loop {
//!   select! {
//!     token.cancelled() ──► break
//!     ticker.tick()     ──► upgrade Weak<Chain> ──► gone? break : drain()
//!   }
//! }
//! ```
//!
//! The task holds the chain weakly, so it never keeps an emitter alive.
//! Dropping the handle stops the task.

use std::sync::Weak;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::trace;

use crate::chain::Chain;

const MIN_INTERVAL: Duration = Duration::from_millis(1);

/// Handle of a periodic drain task.
pub struct Drainer {
    token: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl Drainer {
    pub(crate) fn spawn<T: Clone + Send + 'static>(chain: Weak<Chain<T>>, every: Duration) -> Self {
        let token = CancellationToken::new();
        let stop = token.clone();
        let every = every.max(MIN_INTERVAL);

        let task = tokio::spawn(async move {
            let mut ticker = time::interval(every);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    _ = stop.cancelled() => break,
                    _ = ticker.tick() => {
                        let Some(chain) = chain.upgrade() else {
                            break;
                        };
                        let released = chain.drain();
                        if released > 0 {
                            trace!(emitter = chain.label(), released, "drained queue");
                        }
                    }
                }
            }
        });

        Self {
            token,
            task: Some(task),
        }
    }

    /// Asks the task to stop after its current tick.
    pub fn stop(&self) {
        self.token.cancel();
    }

    /// Returns `true` once the task has exited.
    pub fn is_finished(&self) -> bool {
        self.task.as_ref().is_none_or(JoinHandle::is_finished)
    }

    /// Stops the task and waits for it to exit.
    pub async fn join(mut self) {
        self.stop();
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }
}

impl Drop for Drainer {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use crate::{Broadcast, QueueEmitter};
    use futures::StreamExt;
    use std::time::Duration;

    #[tokio::test(start_paused = true)]
    async fn drains_released_slots_periodically() {
        let queue = QueueEmitter::new();
        let mut events = crate::Listen::future(&queue);
        queue.activate(1).activate(2);
        assert_eq!(events.next().await.unwrap().unwrap(), 1);
        drop(events);
        assert_eq!(queue.backlog(), 3);

        let drainer = queue.spawn_drainer(Duration::from_millis(10));
        tokio::time::sleep(Duration::from_millis(25)).await;
        assert_eq!(queue.backlog(), 1);
        drainer.join().await;
    }

    #[tokio::test(start_paused = true)]
    async fn exits_when_the_emitter_is_dropped() {
        let queue = QueueEmitter::<u8>::new();
        let drainer = queue.spawn_drainer(Duration::from_millis(5));
        drop(queue);
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(drainer.is_finished());
    }
}
