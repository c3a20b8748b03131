//! # Queue emitter: forward-only, self-draining.
//!
//! [`QueueEmitter`] shares the producer/consumer surface of
//! [`Emitter`](crate::Emitter) but releases settled slots once nobody can
//! observe them anymore, so memory is bounded by the backlog instead of the
//! lifetime number of settlements.
//!
//! ## Draining
//! ```text
//! [#5 settled, held by a stream][#6 settled][#7 pending]
//!        ▲ kept                     ▲ kept (behind #5)
//! stream moves on ──► [#7 pending]  (both released on the next drain)
//! ```
//!
//! - Draining runs on every settlement.
//! - [`QueueEmitter::drain`] runs it on demand.
//! - [`QueueEmitter::spawn_drainer`] runs it periodically on a Tokio task.
//!
//! There is no replay: a consumer that subscribes late only sees settlements
//! made after it subscribed.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::chain::{Chain, Retention};
use crate::config::Config;
use crate::subscribers::{Subscribe, SubscriberSet};

use super::broadcast::Broadcast;
use super::drainer::Drainer;
use super::sealed::Sealed;

/// Multi-event emitter that forgets consumed settlements.
///
/// Cloning yields another handle to the same emitter.
pub struct QueueEmitter<T> {
    pub(crate) chain: Arc<Chain<T>>,
}

impl<T: Clone + Send + 'static> QueueEmitter<T> {
    /// Creates a queue emitter with the default [`Config`].
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    /// Creates a queue emitter whose logs carry `name`.
    #[must_use]
    pub fn named(name: impl Into<Arc<str>>) -> Self {
        Self::with_config(Config::named(name))
    }

    /// Creates a queue emitter from an explicit [`Config`].
    #[must_use]
    pub fn with_config(config: Config) -> Self {
        Self {
            chain: Chain::new(config, Retention::Drain),
        }
    }

    /// Number of slots currently held (always at least the tail).
    pub fn backlog(&self) -> usize {
        self.chain.retained()
    }

    /// Releases consumed slots now. Returns how many were released.
    pub fn drain(&self) -> usize {
        self.chain.drain()
    }

    /// Spawns a Tokio task draining the queue every `every`.
    ///
    /// The task stops when the returned [`Drainer`] is stopped or when every
    /// handle to the emitter has been dropped.
    pub fn spawn_drainer(&self, every: Duration) -> Drainer {
        Drainer::spawn(Arc::downgrade(&self.chain), every)
    }

    /// Fans every future settlement out to `subscribers`.
    ///
    /// Must be called inside a Tokio runtime.
    pub fn subscribe(&self, subscribers: Vec<Arc<dyn Subscribe<T>>>) -> SubscriberSet<T>
    where
        T: Sync,
    {
        let set = SubscriberSet::new(subscribers, self.chain.config().subscriber_capacity_clamped());
        set.attach(self);
        set
    }
}

impl QueueEmitter<()> {
    /// Activates a unit queue emitter.
    pub fn trigger(&self) -> &Self {
        self.activate(())
    }
}

impl<T> Sealed<T> for QueueEmitter<T> {
    fn chain(&self) -> &Arc<Chain<T>> {
        &self.chain
    }
}

impl<T: Clone + Send + 'static> super::Listen<T> for QueueEmitter<T> {}

impl<T: Clone + Send + 'static> Broadcast<T> for QueueEmitter<T> {}

impl<T> Clone for QueueEmitter<T> {
    fn clone(&self) -> Self {
        Self {
            chain: Arc::clone(&self.chain),
        }
    }
}

impl<T: Clone + Send + 'static> Default for QueueEmitter<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone + Send + 'static> fmt::Debug for QueueEmitter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueueEmitter")
            .field("name", &self.chain.label())
            .field("count", &self.chain.count())
            .field("backlog", &self.chain.retained())
            .field("alive", &self.chain.is_alive())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Listen;
    use futures::StreamExt;

    #[test]
    fn backlog_stays_bounded_without_consumers() {
        let queue = QueueEmitter::new();
        for i in 0..1_000 {
            queue.activate(i);
        }
        assert_eq!(queue.count(), 1_000);
        assert_eq!(queue.backlog(), 1);
    }

    #[tokio::test]
    async fn stream_holds_back_draining() {
        let queue = QueueEmitter::new();
        let mut events = queue.future();
        queue.activate(1).activate(2).activate(3);
        assert_eq!(queue.backlog(), 4);

        assert_eq!(events.next().await.unwrap().unwrap(), 1);
        assert_eq!(events.next().await.unwrap().unwrap(), 2);
        assert_eq!(queue.drain(), 2);
        assert_eq!(queue.backlog(), 2);

        drop(events);
        assert_eq!(queue.drain(), 1);
        assert_eq!(queue.backlog(), 1);
    }

    #[tokio::test]
    async fn late_stream_only_sees_new_settlements() {
        let queue = QueueEmitter::new();
        queue.activate("old");
        let mut events = queue.future();
        queue.activate("new");
        assert_eq!(events.next().await.unwrap().unwrap(), "new");
    }
}
