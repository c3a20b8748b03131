//! # Awaitable view of a slot.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use crate::error::EmitError;

use super::cell::Slot;
use super::status::SlotStatus;

/// Future resolving with one slot's settlement.
///
/// Returned by `next()` on emitters and by [`Gate::wait`](crate::Gate::wait).
/// Awaiting it yields `Ok(value)` on activation and `Err(EmitError)` on
/// deactivation or cancellation. The future can be polled again after
/// completion; it keeps returning the same outcome.
#[must_use = "futures do nothing unless awaited"]
pub struct SlotFuture<T> {
    slot: Arc<Slot<T>>,
    index: u64,
}

impl<T: Clone + Send + 'static> SlotFuture<T> {
    pub(crate) fn new(slot: Arc<Slot<T>>, index: u64) -> Self {
        Self { slot, index }
    }

    /// Absolute chain index of the awaited slot.
    #[inline]
    pub fn index(&self) -> u64 {
        self.index
    }

    /// Current status of the awaited slot.
    pub fn status(&self) -> SlotStatus {
        self.slot.status()
    }

    /// Returns the outcome without waiting, if the slot is settled.
    pub fn try_outcome(&self) -> Option<Result<T, EmitError>> {
        self.slot.outcome()
    }
}

impl<T: Clone + Send + 'static> Future for SlotFuture<T> {
    type Output = Result<T, EmitError>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        self.slot.poll_outcome(cx)
    }
}

impl<T: Clone + Send + 'static> fmt::Debug for SlotFuture<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SlotFuture")
            .field("index", &self.index)
            .field("status", &self.slot.status())
            .finish()
    }
}
