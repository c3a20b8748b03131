//! # Sequence emitter: append-only history with replay.
//!
//! [`Emitter`] keeps every settled slot, so late consumers can replay the whole
//! history ([`Emitter::all`], [`Emitter::past`]) and look back at the most
//! recent settlement ([`Emitter::previous`]).
//!
//! Memory grows with the number of settlements. For long-lived, high-frequency
//! sources use [`QueueEmitter`](crate::QueueEmitter) instead.
//!
//! ## Example
//! ```
//! use tidings::{Broadcast, Emitter, Listen};
//! use futures::StreamExt;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let emitter = Emitter::named("clicks");
//! emitter.activate(1).activate(2).activate(3);
//!
//! let seen: Vec<_> = emitter.past().map(|r| r.unwrap()).collect().await;
//! assert_eq!(seen, vec![1, 2, 3]);
//! assert_eq!(emitter.previous().unwrap().unwrap(), 3);
//! # }
//! ```

use std::fmt;
use std::sync::Arc;

use crate::chain::{Chain, Events, Retention};
use crate::config::Config;
use crate::error::EmitError;
use crate::subscribers::{Subscribe, SubscriberSet};

use super::broadcast::Broadcast;
use super::listen::Listen;
use super::sealed::Sealed;

/// Multi-event emitter with replayable history.
///
/// Cloning yields another handle to the same emitter.
pub struct Emitter<T> {
    pub(crate) chain: Arc<Chain<T>>,
}

impl<T: Clone + Send + 'static> Emitter<T> {
    /// Creates an emitter with the default [`Config`].
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    /// Creates an emitter whose logs carry `name`.
    #[must_use]
    pub fn named(name: impl Into<Arc<str>>) -> Self {
        Self::with_config(Config::named(name))
    }

    /// Creates an emitter from an explicit [`Config`].
    #[must_use]
    pub fn with_config(config: Config) -> Self {
        Self {
            chain: Chain::new(config, Retention::Append),
        }
    }

    /// Outcome of the most recent settlement; `None` if never settled.
    pub fn previous(&self) -> Option<Result<T, EmitError>> {
        self.chain.previous()
    }

    /// Stream over the whole history, then every future settlement.
    pub fn all(&self) -> Events<T> {
        self.replay_from(0)
    }

    /// Finite stream over the settlements made so far.
    ///
    /// The bound is captured when called: later settlements are not included.
    pub fn past(&self) -> Events<T> {
        Events::new(Arc::clone(&self.chain), 0, Some(self.chain.count()))
    }

    /// Stream starting at slot `index`.
    pub fn replay_from(&self, index: u64) -> Events<T> {
        Events::new(Arc::clone(&self.chain), index, None)
    }

    /// Fans every future settlement out to `subscribers`.
    ///
    /// Queues are sized from [`Config::subscriber_capacity`] unless a
    /// subscriber declares its own capacity. Must be called inside a Tokio
    /// runtime.
    pub fn subscribe(&self, subscribers: Vec<Arc<dyn Subscribe<T>>>) -> SubscriberSet<T>
    where
        T: Sync,
    {
        let set = SubscriberSet::new(subscribers, self.chain.config().subscriber_capacity_clamped());
        set.attach(self);
        set
    }
}

impl Emitter<()> {
    /// Activates a unit emitter.
    pub fn trigger(&self) -> &Self {
        self.activate(())
    }
}

impl<T> Sealed<T> for Emitter<T> {
    fn chain(&self) -> &Arc<Chain<T>> {
        &self.chain
    }
}

impl<T: Clone + Send + 'static> Listen<T> for Emitter<T> {}

impl<T: Clone + Send + 'static> Broadcast<T> for Emitter<T> {}

impl<T> Clone for Emitter<T> {
    fn clone(&self) -> Self {
        Self {
            chain: Arc::clone(&self.chain),
        }
    }
}

impl<T: Clone + Send + 'static> Default for Emitter<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone + Send + 'static> fmt::Debug for Emitter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Emitter")
            .field("name", &self.chain.label())
            .field("count", &self.chain.count())
            .field("alive", &self.chain.is_alive())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policies::TerminationPolicy;
    use crate::slot::SlotStatus;
    use futures::StreamExt;
    use std::sync::Mutex;
    use std::time::Duration;
    use tokio_util::sync::CancellationToken;

    #[test]
    fn previous_tracks_latest_settlement() {
        let emitter = Emitter::<u8>::new();
        assert!(emitter.previous().is_none());
        emitter.activate(1);
        assert_eq!(emitter.previous().unwrap().unwrap(), 1);
        emitter.deactivate("boom");
        assert!(emitter.previous().unwrap().unwrap_err().is_deactivated());
    }

    #[test]
    fn deactivate_never_rewrites_a_settled_slot() {
        let emitter = Emitter::new();
        emitter.activate("a");
        emitter.deactivate("late");
        assert_eq!(emitter.status(0), Some(SlotStatus::Activated));
        assert_eq!(emitter.status(1), Some(SlotStatus::Deactivated));
        assert_eq!(emitter.status(2), Some(SlotStatus::Pending));
    }

    #[test]
    fn trigger_counts_unit_events() {
        let emitter = Emitter::new();
        emitter.trigger().trigger();
        assert_eq!(emitter.count(), 2);
    }

    #[test]
    fn once_sees_only_the_next_activation() {
        let emitter = Emitter::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let _listening = emitter.once(move |v| sink.lock().unwrap().push(v));
        emitter.activate(1).activate(2);
        assert_eq!(*seen.lock().unwrap(), vec![1]);
    }

    #[tokio::test]
    async fn once_reports_deactivation_through_the_handle() {
        let emitter = Emitter::<u8>::new();
        let listening = emitter.once(|_| {});
        emitter.deactivate("boom");
        let err = listening.await.unwrap_err();
        assert_eq!(err.as_label(), "emitter_deactivated");
    }

    #[tokio::test]
    async fn past_is_bounded_at_call_time() {
        let emitter = Emitter::new();
        emitter.activate(1).activate(2);
        let past = emitter.past();
        emitter.activate(3);
        let seen: Vec<_> = past.map(|r| r.unwrap()).collect().await;
        assert_eq!(seen, vec![1, 2]);
    }

    #[tokio::test]
    async fn terminated_emitter_reports_its_final_slot() {
        let emitter = Emitter::<u8>::with_config(Config {
            termination: TerminationPolicy::OnCancel,
            ..Config::default()
        });
        emitter.activate(1).cancel().activate(2);
        assert!(!emitter.is_alive());
        assert_eq!(emitter.count(), 2);
        assert!(emitter.next().await.unwrap_err().is_cancelled());
    }

    fn terminated_on_deactivate() -> Emitter<u8> {
        let emitter = Emitter::with_config(Config {
            termination: TerminationPolicy::OnDeactivate,
            ..Config::default()
        });
        emitter.activate(1).deactivate("boom");
        emitter
    }

    #[tokio::test]
    async fn future_on_terminated_emitter_is_empty() {
        let emitter = terminated_on_deactivate();
        assert!(emitter.future().next().await.is_none());
        assert_eq!(emitter.all().count().await, 2);
    }

    #[tokio::test]
    async fn late_listener_skips_the_final_settlement() {
        let emitter = terminated_on_deactivate();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();

        let listening = emitter.on(move |v| sink.lock().unwrap().push(v));
        assert!(listening.is_finished());
        listening.await.unwrap();
        assert!(seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn on_until_resolves_when_token_fires_on_a_quiet_emitter() {
        let emitter = Emitter::<u8>::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let token = CancellationToken::new();

        let listening = emitter.on_until(
            token.clone(),
            move |v| sink.lock().unwrap().push(v),
            |_| {},
        );
        token.cancel();

        tokio::time::timeout(Duration::from_millis(200), listening)
            .await
            .expect("handle resolves after cancel")
            .unwrap();
        // The listener (and the closure holding `sink`) left the tail slot.
        assert_eq!(Arc::strong_count(&seen), 1);
        assert_eq!(emitter.count(), 0);
    }

    #[tokio::test]
    async fn once_cancellable_detaches_without_its_handle() {
        let emitter = Emitter::<u8>::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();

        let token = emitter.once_cancellable(move |v| sink.lock().unwrap().push(v), |_| {});
        token.cancel();
        for _ in 0..10 {
            if Arc::strong_count(&seen) == 1 {
                break;
            }
            tokio::task::yield_now().await;
        }
        assert_eq!(Arc::strong_count(&seen), 1);

        emitter.activate(1);
        assert!(seen.lock().unwrap().is_empty());
    }

    #[test]
    fn once_cancellable_cancelled_before_activation_stays_silent() {
        let emitter = Emitter::<u8>::new();
        let values = Arc::new(Mutex::new(Vec::new()));
        let errors = Arc::new(Mutex::new(Vec::new()));
        let (sink, err_sink) = (values.clone(), errors.clone());

        let token = emitter.once_cancellable(
            move |v| sink.lock().unwrap().push(v),
            move |e| err_sink.lock().unwrap().push(e.to_string()),
        );
        token.cancel();
        emitter.activate(1).deactivate("boom");

        assert!(values.lock().unwrap().is_empty());
        assert!(errors.lock().unwrap().is_empty());
    }

    #[test]
    fn once_cancellable_routes_deactivation_to_err_f() {
        let emitter = Emitter::<u8>::new();
        let values = Arc::new(Mutex::new(Vec::new()));
        let errors = Arc::new(Mutex::new(Vec::new()));
        let (sink, err_sink) = (values.clone(), errors.clone());

        let _token = emitter.once_cancellable(
            move |v| sink.lock().unwrap().push(v),
            move |e| err_sink.lock().unwrap().push(e.to_string()),
        );
        emitter.deactivate("boom").activate(2);

        assert!(values.lock().unwrap().is_empty());
        assert_eq!(*errors.lock().unwrap(), vec!["deactivated: boom"]);
    }
}
