//! # Non-blocking fan-out to multiple subscribers.
//!
//! Provides [`SubscriberSet`]: distributes emitter deliveries to multiple
//! subscribers concurrently without blocking the producer.
//!
//! ## Architecture
//! ```text
//! activate(v) ──► listener ──► emit(v)
//!                                 │
//!                                 ├──► [queue 1] ──► worker 1 ──► subscriber1.on_event()
//!                                 │    (bounded)         └──────► panic → error! log
//!                                 ├──► [queue 2] ──► worker 2 ──► subscriber2.on_event()
//!                                 └──► [queue N] ──► worker N ──► subscriberN.on_event()
//! ```
//!
//! ## Rules
//! - **No cross-subscriber ordering**: subscriber A may process event N while B processes N+5
//! - **Overflow**: delivery dropped for that subscriber only, `warn!` logged
//! - **Non-blocking**: `emit()` returns immediately (uses `try_send`)
//! - **Isolation**: slow/panicking subscriber doesn't affect others
//! - **Per-subscriber FIFO**: each subscriber sees deliveries in order
//!
//! **Warning**: `AssertUnwindSafe` is used, which can leave shared state inconsistent
//! if a subscriber uses `Arc<Mutex<T>>` and panics while holding the lock.

use std::sync::Arc;

use futures::FutureExt;
use parking_lot::Mutex;
use tokio::{sync::mpsc, task::JoinHandle};
use tokio_util::sync::CancellationToken;
use tracing::{error, warn};

use crate::chain::panic_message;
use crate::emitter::Listen;
use crate::error::EmitError;

use super::Subscribe;

/// One queued delivery.
enum Signal<T> {
    Value(T),
    Error(EmitError),
}

/// Per-subscriber channel metadata.
struct SubscriberChannel<T> {
    name: &'static str,
    sender: mpsc::Sender<Arc<Signal<T>>>,
}

type Channels<T> = Arc<Mutex<Vec<SubscriberChannel<T>>>>;

/// Fan-out coordinator for emitter subscribers.
///
/// Manages per-subscriber queues and worker tasks, providing:
/// - **Concurrent delivery**: deliveries sent to all subscribers simultaneously
/// - **Isolation**: each subscriber has dedicated queue and worker
/// - **Panic safety**: panics caught and logged, don't crash runtime
/// - **Overflow handling**: dropped deliveries logged with `warn!`
pub struct SubscriberSet<T> {
    channels: Channels<T>,
    workers: Vec<JoinHandle<()>>,
    token: CancellationToken,
}

impl<T: Clone + Send + Sync + 'static> SubscriberSet<T> {
    /// Creates a new set and spawns one worker task per subscriber.
    ///
    /// ### Per-subscriber setup
    /// - Bounded mpsc queue (capacity from [`Subscribe::queue_capacity`], or
    ///   `default_capacity`)
    /// - Dedicated worker task (runs until the queue is closed)
    /// - Panic isolation via `catch_unwind`
    ///
    /// Must be called inside a Tokio runtime.
    #[must_use]
    pub fn new(subs: Vec<Arc<dyn Subscribe<T>>>, default_capacity: usize) -> Self {
        let mut channels = Vec::with_capacity(subs.len());
        let mut workers = Vec::with_capacity(subs.len());

        for sub in subs {
            let cap = sub.queue_capacity().unwrap_or(default_capacity).max(1);
            let name = sub.name();
            let (tx, mut rx) = mpsc::channel::<Arc<Signal<T>>>(cap);
            let s = Arc::clone(&sub);

            let handle = tokio::spawn(async move {
                while let Some(signal) = rx.recv().await {
                    let fut = async {
                        match signal.as_ref() {
                            Signal::Value(value) => s.on_event(value).await,
                            Signal::Error(err) => s.on_error(err).await,
                        }
                    };

                    if let Err(panic_err) = std::panic::AssertUnwindSafe(fut).catch_unwind().await {
                        error!(
                            subscriber = s.name(),
                            info = %panic_message(panic_err.as_ref()),
                            "subscriber panicked"
                        );
                    }
                }
            });
            channels.push(SubscriberChannel { name, sender: tx });
            workers.push(handle);
        }
        Self {
            channels: Arc::new(Mutex::new(channels)),
            workers,
            token: CancellationToken::new(),
        }
    }

    /// Number of subscribers.
    pub fn len(&self) -> usize {
        self.channels.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Sends an activation to every subscriber.
    pub fn emit(&self, value: T) {
        fan_out(&self.channels, Arc::new(Signal::Value(value)));
    }

    /// Sends a deactivation to every subscriber.
    pub fn emit_error(&self, err: EmitError) {
        fan_out(&self.channels, Arc::new(Signal::Error(err)));
    }

    /// Follows `source`: activations go to `on_event`, deactivations to
    /// `on_error`, and the set keeps following after a deactivation.
    ///
    /// A source cancellation stops following it. Several sources can be
    /// attached to one set.
    pub fn attach<L: Listen<T>>(&self, source: &L) {
        let on_value = {
            let channels = Arc::clone(&self.channels);
            move |value: T| fan_out(&channels, Arc::new(Signal::Value(value)))
        };
        let on_error = {
            let channels = Arc::clone(&self.channels);
            move |err: EmitError| fan_out(&channels, Arc::new(Signal::Error(err)))
        };
        let _listening =
            source.on_continue_after_error_until(self.token.child_token(), on_value, on_error);
    }

    /// Gracefully shuts down all subscriber workers.
    ///
    /// 1. Detaches from every source
    /// 2. Drops all channel senders (workers see channel closed)
    /// 3. Awaits all worker tasks to finish
    pub async fn shutdown(self) {
        self.token.cancel();
        self.channels.lock().clear();

        for h in self.workers {
            let _ = h.await;
        }
    }
}

/// Uses `try_send` (non-blocking); on a full or closed queue the delivery is
/// dropped for that subscriber and a warning is logged.
fn fan_out<T>(channels: &Channels<T>, signal: Arc<Signal<T>>) {
    for channel in channels.lock().iter() {
        match channel.sender.try_send(Arc::clone(&signal)) {
            Ok(()) => {}
            Err(mpsc::error::TrySendError::Full(_)) => {
                warn!(subscriber = channel.name, reason = "full", "subscriber overflow");
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                warn!(subscriber = channel.name, reason = "closed", "subscriber overflow");
            }
        }
    }
}
