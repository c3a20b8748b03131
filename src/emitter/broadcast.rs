//! # Producer surface shared by every multi-event emitter.

use std::sync::Arc;

use crate::error::{BoxError, EmitError};

use super::sealed::Sealed;

/// Mutation operations of an emitter.
///
/// Every method settles the current tail slot and returns `&Self`, so calls
/// can be chained:
///
/// ```
/// use tidings::{Broadcast, Emitter, Listen};
///
/// let emitter = Emitter::new();
/// emitter.activate(1).activate(2).deactivate("boom");
/// assert_eq!(emitter.count(), 3);
/// ```
///
/// On a terminated emitter (see [`TerminationPolicy`](crate::TerminationPolicy))
/// the calls are no-ops.
pub trait Broadcast<T: Clone + Send + 'static>: Sealed<T> {
    /// Settles the tail with `value`.
    fn activate(&self, value: T) -> &Self {
        self.chain().settle(Ok(value));
        self
    }

    /// Settles the tail with a deactivation carrying `reason`.
    fn deactivate(&self, reason: impl Into<BoxError>) -> &Self {
        self.chain().settle(Err(EmitError::deactivated(reason)));
        self
    }

    /// Settles the tail with a graceful cancellation.
    fn cancel(&self) -> &Self {
        self.chain().settle(Err(EmitError::cancelled()));
        self
    }

    /// Settles the tail with a graceful cancellation carrying `message`.
    fn cancel_with(&self, message: impl Into<Arc<str>>) -> &Self {
        self.chain().settle(Err(EmitError::cancelled_with(message)));
        self
    }
}
