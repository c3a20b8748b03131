//! # Callback continuations attached to slots.
//!
//! A continuation is the callback-side counterpart of a waker: it is stored in
//! a pending slot and handed to the dispatcher when the slot settles.
//!
//! ```text
//! Slot::settle ──► Continuation::admit()? ──► Dispatcher queue ──► Continuation::resume(Delivery)
//! ```
//!
//! `admit` is evaluated at settlement time, under the chain lock. A listener
//! whose cancellation token fires *after* the settlement is still resumed,
//! which is what makes "activation wins over a same-turn cancellation" hold.

use std::sync::Arc;

use crate::error::EmitError;

use super::cell::Slot;

/// One settled slot as seen by a continuation.
pub(crate) struct Delivery<T> {
    /// Absolute chain index of the settled slot.
    pub(crate) index: u64,
    /// The settlement.
    pub(crate) outcome: Result<T, EmitError>,
    /// Keeps the slot retained (and the queue from draining past it) until
    /// the continuation has moved on.
    pub(crate) _slot: Arc<Slot<T>>,
}

/// Callback registered on a slot.
pub(crate) trait Continuation<T>: Send + 'static {
    /// Whether the continuation still wants to be resumed.
    ///
    /// Returning `false` drops it without dispatching.
    fn admit(&self) -> bool {
        true
    }

    /// Runs the callback for a settled slot.
    fn resume(self: Box<Self>, delivery: Delivery<T>);
}
