//! # Write-once slot cell.
//!
//! A [`Slot`] is a single settlement: pending until `settle` is called once,
//! then frozen. Two kinds of observers can wait on it:
//!
//! - **wakers** registered by [`SlotFuture`](super::SlotFuture) polls;
//! - **continuations** registered by callback listeners.
//!
//! Wakers are woken after the lock is released. Continuations are returned to
//! the caller of [`Slot::settle`] so the chain can hand them to its dispatcher
//! in registration order.

use std::sync::Arc;
use std::task::{Context, Poll, Waker};

use parking_lot::Mutex;

use crate::error::EmitError;

use super::continuation::Continuation;
use super::status::SlotStatus;

type Continuations<T> = Vec<Box<dyn Continuation<T>>>;

enum SlotState<T> {
    Pending {
        wakers: Vec<Waker>,
        continuations: Continuations<T>,
    },
    Settled(Result<T, EmitError>),
}

/// A single write-once settlement cell.
pub(crate) struct Slot<T> {
    state: Mutex<SlotState<T>>,
}

impl<T: Clone + Send + 'static> Slot<T> {
    /// Creates a fresh pending slot.
    pub(crate) fn pending() -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(SlotState::Pending {
                wakers: Vec::new(),
                continuations: Vec::new(),
            }),
        })
    }

    /// Settles the slot.
    ///
    /// Returns the registered continuations on the first call and `None` on
    /// every later call (the outcome is discarded).
    pub(crate) fn settle(&self, outcome: Result<T, EmitError>) -> Option<Continuations<T>> {
        let mut state = self.state.lock();
        let SlotState::Pending {
            wakers,
            continuations,
        } = &mut *state
        else {
            return None;
        };
        let wakers = std::mem::take(wakers);
        let continuations = std::mem::take(continuations);
        *state = SlotState::Settled(outcome);
        drop(state);

        for waker in wakers {
            waker.wake();
        }
        Some(continuations)
    }

    /// Registers a continuation.
    ///
    /// If the slot is already settled the continuation is handed back together
    /// with the outcome so the caller can dispatch it right away.
    #[allow(clippy::type_complexity)]
    pub(crate) fn attach(
        &self,
        continuation: Box<dyn Continuation<T>>,
    ) -> Result<(), (Box<dyn Continuation<T>>, Result<T, EmitError>)> {
        let mut state = self.state.lock();
        match &mut *state {
            SlotState::Pending { continuations, .. } => {
                // Stopped listeners would otherwise pile up on a quiet slot.
                continuations.retain(|c| c.admit());
                continuations.push(continuation);
                Ok(())
            }
            SlotState::Settled(outcome) => Err((continuation, outcome.clone())),
        }
    }

    /// Removes the continuations that no longer admit delivery.
    ///
    /// They are returned so the caller drops them after the lock is released.
    pub(crate) fn prune(&self) -> Continuations<T> {
        let mut state = self.state.lock();
        let SlotState::Pending { continuations, .. } = &mut *state else {
            return Vec::new();
        };
        let (kept, stopped): (Continuations<T>, Continuations<T>) =
            std::mem::take(continuations).into_iter().partition(|c| c.admit());
        *continuations = kept;
        stopped
    }

    /// Returns the outcome if settled.
    pub(crate) fn outcome(&self) -> Option<Result<T, EmitError>> {
        match &*self.state.lock() {
            SlotState::Pending { .. } => None,
            SlotState::Settled(outcome) => Some(outcome.clone()),
        }
    }

    pub(crate) fn status(&self) -> SlotStatus {
        match &*self.state.lock() {
            SlotState::Pending { .. } => SlotStatus::Pending,
            SlotState::Settled(outcome) => SlotStatus::of(outcome),
        }
    }

    #[inline]
    pub(crate) fn is_settled(&self) -> bool {
        self.status().is_settled()
    }

    /// Polls for the outcome, registering `cx`'s waker while pending.
    pub(crate) fn poll_outcome(&self, cx: &mut Context<'_>) -> Poll<Result<T, EmitError>> {
        let mut state = self.state.lock();
        match &mut *state {
            SlotState::Settled(outcome) => Poll::Ready(outcome.clone()),
            SlotState::Pending { wakers, .. } => {
                if !wakers.iter().any(|w| w.will_wake(cx.waker())) {
                    wakers.push(cx.waker().clone());
                }
                Poll::Pending
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::slot::Delivery;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Count(Arc<AtomicUsize>);

    impl Continuation<u32> for Count {
        fn resume(self: Box<Self>, _delivery: Delivery<u32>) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    struct Stopped;

    impl Continuation<u32> for Stopped {
        fn admit(&self) -> bool {
            false
        }

        fn resume(self: Box<Self>, _delivery: Delivery<u32>) {}
    }

    #[test]
    fn prune_removes_only_stopped_continuations() {
        let hits = Arc::new(AtomicUsize::new(0));
        let slot = Slot::<u32>::pending();
        assert!(slot.attach(Box::new(Count(hits.clone()))).is_ok());
        assert!(slot.attach(Box::new(Stopped)).is_ok());

        assert_eq!(slot.prune().len(), 1);
        assert!(slot.prune().is_empty());
        assert_eq!(slot.settle(Ok(1)).unwrap().len(), 1);
        assert!(slot.prune().is_empty());
    }

    #[test]
    fn settles_once() {
        let slot = Slot::<u32>::pending();
        assert_eq!(slot.status(), SlotStatus::Pending);
        assert!(slot.settle(Ok(1)).is_some());
        assert!(slot.settle(Ok(2)).is_none());
        assert_eq!(slot.outcome().unwrap().unwrap(), 1);
        assert_eq!(slot.status(), SlotStatus::Activated);
    }

    #[test]
    fn hands_back_continuations_in_order() {
        let hits = Arc::new(AtomicUsize::new(0));
        let slot = Slot::<u32>::pending();
        assert!(slot.attach(Box::new(Count(hits.clone()))).is_ok());
        assert!(slot.attach(Box::new(Count(hits.clone()))).is_ok());

        let conts = slot.settle(Err(EmitError::cancelled())).unwrap();
        assert_eq!(conts.len(), 2);
        assert_eq!(slot.status(), SlotStatus::Cancelled);

        let rejected = slot.attach(Box::new(Count(hits)));
        let (_, outcome) = rejected.err().expect("settled slot rejects attach");
        assert!(outcome.unwrap_err().is_cancelled());
    }
}
