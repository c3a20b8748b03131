//! # Callback listeners.
//!
//! A [`Listener`] is a continuation that walks the chain slot by slot:
//!
//! ```text
//! attach(#k) ──settled──► on_value(v) ──repeat?──► attach(#k+1) ──► ...
//!                     └─► cancelled ─────────────► finish Ok
//!                     └─► deactivated ──on_error?─► resume? ──► attach(#k+1)
//!                                       └─ none ──► finish Err(reason)
//! ```
//!
//! Completion is reported through a [`Listening`] handle. A listener that is
//! dropped before finishing (chain dropped, token cancelled, slot drained)
//! completes its handle with `Ok(())`.
//!
//! ## Token-bound listeners
//! A cancelled token detaches the listener from the pending tail:
//! - polling the [`Listening`] handle detaches it and resolves `Ok(())`;
//! - inside a tokio runtime a watcher task does the same for handles that are
//!   never polled, and exits as soon as the listener finishes on its own.
//!
//! Outside a runtime an unpolled listener is pruned by the next attach or
//! settlement on the chain.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Weak};
use std::task::{Context, Poll};

use tokio_util::sync::{CancellationToken, WaitForCancellationFutureOwned};
use tracing::{debug, warn};

use crate::error::EmitError;
use crate::slot::{Continuation, Delivery, Slot, SlotFuture};

use super::store::Chain;

type ValueFn<T> = Box<dyn FnMut(T) + Send + 'static>;
type ErrorFn = Box<dyn FnMut(EmitError) + Send + 'static>;
type DetachFn = Arc<dyn Fn() + Send + Sync + 'static>;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Repeat {
    Once,
    Forever,
}

/// Slot-walking callback continuation.
pub(crate) struct Listener<T> {
    chain: Weak<Chain<T>>,
    on_value: ValueFn<T>,
    on_error: Option<ErrorFn>,
    repeat: Repeat,
    resume_after_error: bool,
    report_cancellation: bool,
    token: Option<CancellationToken>,
    stop: Option<CancellationToken>,
    last: Option<u64>,
    done: Option<Arc<Slot<()>>>,
}

impl<T: Clone + Send + 'static> Listener<T> {
    /// Listener for a single slot.
    pub(crate) fn once(on_value: impl FnOnce(T) + Send + 'static) -> Self {
        let mut on_value = Some(on_value);
        Self::new(Repeat::Once, move |value| {
            if let Some(f) = on_value.take() {
                f(value);
            }
        })
    }

    /// Listener that keeps following the chain after each activation.
    pub(crate) fn forever(on_value: impl FnMut(T) + Send + 'static) -> Self {
        Self::new(Repeat::Forever, on_value)
    }

    fn new(repeat: Repeat, on_value: impl FnMut(T) + Send + 'static) -> Self {
        Self {
            chain: Weak::new(),
            on_value: Box::new(on_value),
            on_error: None,
            repeat,
            resume_after_error: false,
            report_cancellation: false,
            token: None,
            stop: None,
            last: None,
            done: None,
        }
    }

    /// Routes deactivations to `on_error` instead of failing the handle.
    pub(crate) fn on_error(mut self, on_error: impl FnMut(EmitError) + Send + 'static) -> Self {
        self.on_error = Some(Box::new(on_error));
        self
    }

    /// Keeps following the chain after a handled deactivation.
    pub(crate) fn resume_after_error(mut self) -> Self {
        self.resume_after_error = true;
        self
    }

    /// Passes cancellations to `on_error` too (the listener still stops).
    pub(crate) fn report_cancellation(mut self) -> Self {
        self.report_cancellation = true;
        self
    }

    /// Stops the listener once `token` is cancelled.
    pub(crate) fn until(mut self, token: CancellationToken) -> Self {
        self.token = Some(token);
        self
    }

    /// Registers on `chain` at its tail and returns the completion handle.
    pub(crate) fn attach(mut self, chain: &Arc<Chain<T>>) -> Listening {
        let done = Slot::pending();
        self.done = Some(Arc::clone(&done));
        self.chain = Arc::downgrade(chain);

        let watch = self.token.clone().map(|token| {
            let weak = Arc::downgrade(chain);
            let detach: DetachFn = Arc::new(move || {
                if let Some(chain) = weak.upgrade() {
                    chain.prune_tail();
                }
            });
            let stop = CancellationToken::new();
            self.stop = Some(stop.clone());
            spawn_watcher(token.clone(), stop, Arc::clone(&detach));
            Watch {
                cancelled: Box::pin(token.cancelled_owned()),
                detach,
            }
        });

        chain.attach_tail(Box::new(self));
        Listening {
            done: SlotFuture::new(done, 0),
            watch,
        }
    }

    fn follow(self, index: u64) {
        if !self.admit() {
            return;
        }
        if let Some(chain) = self.chain.upgrade() {
            chain.attach(index, Box::new(self));
        }
    }
}

impl<T> Listener<T> {
    fn finish(&mut self, result: Result<(), EmitError>) {
        if let Some(stop) = self.stop.take() {
            stop.cancel();
        }
        let Some(done) = self.done.take() else {
            return;
        };
        match self.chain.upgrade() {
            Some(chain) => debug!(
                emitter = chain.label(),
                index = self.last,
                ok = result.is_ok(),
                "listener stopped"
            ),
            None => debug!(index = self.last, ok = result.is_ok(), "listener stopped"),
        }
        if let Err(err) = &result {
            // Only the listener itself holds `done`: the handle was dropped.
            if Arc::strong_count(&done) == 1 {
                warn!(
                    error = %err,
                    label = err.as_label(),
                    "unobserved deactivation: listener handle was dropped"
                );
            }
        }
        done.settle(result);
    }
}

impl<T: Clone + Send + 'static> Continuation<T> for Listener<T> {
    fn admit(&self) -> bool {
        self.token.as_ref().is_none_or(|t| !t.is_cancelled())
    }

    fn resume(self: Box<Self>, delivery: Delivery<T>) {
        let mut this = *self;
        this.last = Some(delivery.index);
        let next = delivery.index + 1;
        match delivery.outcome {
            Ok(value) => {
                (this.on_value)(value);
                match this.repeat {
                    Repeat::Once => this.finish(Ok(())),
                    Repeat::Forever => this.follow(next),
                }
            }
            Err(err) if err.is_cancelled() => {
                if this.report_cancellation {
                    if let Some(on_error) = this.on_error.as_mut() {
                        on_error(err);
                    }
                }
                this.finish(Ok(()));
            }
            Err(err) => {
                let Some(on_error) = this.on_error.as_mut() else {
                    this.finish(Err(err));
                    return;
                };
                on_error(err);
                if this.repeat == Repeat::Forever && this.resume_after_error {
                    this.follow(next);
                } else {
                    this.finish(Ok(()));
                }
            }
        }
    }
}

impl<T> Drop for Listener<T> {
    fn drop(&mut self) {
        self.finish(Ok(()));
    }
}

/// Runs `detach` once `token` fires, unless `stop` fires first.
///
/// Without a tokio runtime nothing is spawned.
fn spawn_watcher(token: CancellationToken, stop: CancellationToken, detach: DetachFn) {
    let Ok(handle) = tokio::runtime::Handle::try_current() else {
        return;
    };
    handle.spawn(async move {
        tokio::select! {
            biased;
            _ = stop.cancelled() => {}
            _ = token.cancelled() => detach(),
        }
    });
}

struct Watch {
    cancelled: Pin<Box<WaitForCancellationFutureOwned>>,
    detach: DetachFn,
}

/// Completion handle of a callback listener.
///
/// Resolves with:
/// - `Ok(())` once the listener is done (single activation seen, cancellation,
///   handled deactivation, token cancelled, or emitter dropped);
/// - `Err(EmitError)` when a deactivation reached a listener without an
///   error callback.
///
/// Dropping the handle does not stop the listener.
#[must_use = "deactivations without an error callback are reported through this handle"]
pub struct Listening {
    done: SlotFuture<()>,
    watch: Option<Watch>,
}

impl Listening {
    /// Returns `true` once the listener has stopped.
    pub fn is_finished(&self) -> bool {
        self.done.status().is_settled()
    }
}

impl Future for Listening {
    type Output = Result<(), EmitError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = &mut *self;
        if let Poll::Ready(result) = Pin::new(&mut this.done).poll(cx) {
            return Poll::Ready(result);
        }
        let Some(watch) = this.watch.as_mut() else {
            return Poll::Pending;
        };
        if watch.cancelled.as_mut().poll(cx).is_pending() {
            return Poll::Pending;
        }
        (watch.detach)();
        this.watch = None;
        Poll::Ready(Ok(()))
    }
}

impl fmt::Debug for Listening {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Listening")
            .field("finished", &self.is_finished())
            .finish()
    }
}
