//! # Slot chain.
//!
//! [`Chain`] owns the ordered slots of one emitter, the settlement counter and
//! the dispatcher that runs callback listeners.
//!
//! ## Layout
//! ```text
//!   base                                      tail (pending)
//!    │                                         │
//!    ▼                                         ▼
//! [ slot #base ][ slot #base+1 ] ... [ slot #count ]
//!   settled       settled              pending
//! ```
//!
//! - `count` is the number of settlements so far; while the chain is alive the
//!   tail is slot `#count`.
//! - `base` only moves for [`Retention::Drain`] chains.
//! - Once a termination policy ends the chain, no new tail is installed: the
//!   last slot stays settled and every later settlement is ignored.
//!
//! ## Rules
//! - Settlement and tail installation happen atomically under one lock.
//! - Continuations are queued under that lock but executed after it is released.
//! - Draining pops settled front slots that nobody but the chain references.

use std::collections::VecDeque;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, trace};

use crate::config::Config;
use crate::error::EmitError;
use crate::policies::TerminationPolicy;
use crate::slot::{Continuation, Delivery, Slot, SlotFuture, SlotStatus};

use super::dispatch::Dispatcher;

/// What happens to settled slots.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Retention {
    /// Keep every slot (history stays replayable).
    Append,
    /// Release settled slots once no waiter references them.
    Drain,
}

struct ChainState<T> {
    slots: VecDeque<Arc<Slot<T>>>,
    base: u64,
    count: u64,
    alive: bool,
}

impl<T: Clone + Send + 'static> ChainState<T> {
    fn tail_index(&self) -> u64 {
        self.base + self.slots.len() as u64 - 1
    }

    fn get(&self, index: u64) -> Option<&Arc<Slot<T>>> {
        let offset = index.checked_sub(self.base)?;
        self.slots.get(usize::try_from(offset).ok()?)
    }

    fn drain(&mut self) -> usize {
        let mut removed = 0;
        while self.slots.len() > 1 {
            let Some(front) = self.slots.front() else {
                break;
            };
            if !front.is_settled() || Arc::strong_count(front) > 1 {
                break;
            }
            self.slots.pop_front();
            self.base += 1;
            removed += 1;
        }
        removed
    }
}

/// Ordered slots of one emitter.
pub struct Chain<T> {
    state: Mutex<ChainState<T>>,
    dispatcher: Dispatcher<T>,
    retention: Retention,
    config: Config,
}

impl<T> Chain<T> {
    #[inline]
    pub(crate) fn label(&self) -> &str {
        self.config.label()
    }
}

impl<T: Clone + Send + 'static> Chain<T> {
    pub(crate) fn new(config: Config, retention: Retention) -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(ChainState {
                slots: VecDeque::from([Slot::pending()]),
                base: 0,
                count: 0,
                alive: true,
            }),
            dispatcher: Dispatcher::new(),
            retention,
            config,
        })
    }

    #[inline]
    pub(crate) fn config(&self) -> &Config {
        &self.config
    }

    /// Number of settlements so far.
    pub(crate) fn count(&self) -> u64 {
        self.state.lock().count
    }

    /// Whether a pending tail is still installed.
    pub(crate) fn is_alive(&self) -> bool {
        self.state.lock().alive
    }

    /// Number of slots currently held in memory.
    pub(crate) fn retained(&self) -> usize {
        self.state.lock().slots.len()
    }

    /// Index of the last slot: the pending tail, or the final slot once
    /// terminated.
    #[cfg(test)]
    pub(crate) fn tail_index(&self) -> u64 {
        self.state.lock().tail_index()
    }

    /// Future on the tail slot.
    pub(crate) fn next(&self) -> SlotFuture<T> {
        let state = self.state.lock();
        let index = state.tail_index();
        let slot = state.get(index).map(Arc::clone);
        drop(state);
        match slot {
            Some(slot) => SlotFuture::new(slot, index),
            // The deque always holds at least the tail.
            None => SlotFuture::new(Slot::pending(), index),
        }
    }

    /// Future on an arbitrary slot, `None` if it was drained or does not exist yet.
    pub(crate) fn waiter(&self, index: u64) -> Option<SlotFuture<T>> {
        let state = self.state.lock();
        state
            .get(index)
            .map(|slot| SlotFuture::new(Arc::clone(slot), index))
    }

    /// Outcome of the most recent settlement, if still retained.
    pub(crate) fn previous(&self) -> Option<Result<T, EmitError>> {
        let state = self.state.lock();
        let last = state.count.checked_sub(1)?;
        state.get(last)?.outcome()
    }

    /// Status of slot `index`, `None` if drained or beyond the tail.
    pub(crate) fn status(&self, index: u64) -> Option<SlotStatus> {
        self.state.lock().get(index).map(|slot| slot.status())
    }

    /// Index of the oldest retained slot.
    #[cfg(test)]
    pub(crate) fn base(&self) -> u64 {
        self.state.lock().base
    }

    /// Settles the tail and installs a new one (unless the chain terminates).
    ///
    /// Returns `false` when the chain had already terminated.
    pub(crate) fn settle(&self, outcome: Result<T, EmitError>) -> bool {
        let status = SlotStatus::of(&outcome);
        let abandoned = {
            let mut state = self.state.lock();
            if !state.alive {
                debug!(
                    emitter = self.label(),
                    status = status.as_label(),
                    "ignored settlement on terminated emitter"
                );
                return false;
            }

            let index = state.count;
            let Some(slot) = state.get(index).map(Arc::clone) else {
                return false;
            };
            if self.config.termination.terminates(&outcome) {
                state.alive = false;
            } else {
                state.slots.push_back(Slot::pending());
            }
            state.count += 1;

            let mut abandoned = Vec::new();
            for continuation in slot.settle(outcome.clone()).unwrap_or_default() {
                if continuation.admit() {
                    let delivery = Delivery {
                        index,
                        outcome: outcome.clone(),
                        _slot: Arc::clone(&slot),
                    };
                    self.dispatcher.push(continuation, delivery);
                } else {
                    abandoned.push(continuation);
                }
            }
            drop(slot);
            if self.retention == Retention::Drain {
                state.drain();
            }

            trace!(
                emitter = self.label(),
                index,
                status = status.as_label(),
                alive = state.alive,
                "slot settled"
            );
            abandoned
        };
        drop(abandoned);

        self.dispatcher.run();
        true
    }

    /// Registers a continuation on slot `index`.
    ///
    /// Settled slots dispatch it right away; drained or missing slots drop it.
    pub(crate) fn attach(&self, index: u64, continuation: Box<dyn Continuation<T>>) {
        self.attach_with(|_| Some(index), continuation);
    }

    /// Registers a continuation on the tail slot.
    ///
    /// On a terminated chain only single-shot chains
    /// ([`TerminationPolicy::Always`]) hand their final slot to late
    /// continuations; any other chain drops them.
    pub(crate) fn attach_tail(&self, continuation: Box<dyn Continuation<T>>) {
        let replays_final = self.config.termination == TerminationPolicy::Always;
        self.attach_with(
            |state| (state.alive || replays_final).then(|| state.tail_index()),
            continuation,
        );
    }

    fn attach_with(
        &self,
        pick: impl FnOnce(&ChainState<T>) -> Option<u64>,
        continuation: Box<dyn Continuation<T>>,
    ) {
        if !continuation.admit() {
            return;
        }
        let ready = {
            let state = self.state.lock();
            let slot = pick(&*state).and_then(|index| Some((index, Arc::clone(state.get(index)?))));
            let Some((index, slot)) = slot else {
                drop(state);
                drop(continuation);
                return;
            };
            match slot.attach(continuation) {
                Ok(()) => None,
                Err((continuation, outcome)) => Some((
                    continuation,
                    Delivery {
                        index,
                        outcome,
                        _slot: slot,
                    },
                )),
            }
        };

        if let Some((continuation, delivery)) = ready {
            if continuation.admit() {
                self.dispatcher.push(continuation, delivery);
                self.dispatcher.run();
            }
        }
    }

    /// Drops tail continuations that no longer admit delivery (their token
    /// fired). Returns how many went.
    pub(crate) fn prune_tail(&self) -> usize {
        let tail = {
            let state = self.state.lock();
            state.get(state.tail_index()).map(Arc::clone)
        };
        let Some(tail) = tail else {
            return 0;
        };
        let stopped = tail.prune();
        let pruned = stopped.len();
        drop(stopped);
        if pruned > 0 {
            trace!(emitter = self.label(), pruned, "pruned stopped listeners");
        }
        pruned
    }

    /// Releases settled front slots nobody waits on. Returns how many went.
    pub(crate) fn drain(&self) -> usize {
        self.state.lock().drain()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn settle_installs_new_tail() {
        let chain = Chain::<u32>::new(Config::default(), Retention::Append);
        assert_eq!(chain.tail_index(), 0);
        assert!(chain.settle(Ok(1)));
        assert!(chain.settle(Err(EmitError::cancelled())));
        assert_eq!(chain.count(), 2);
        assert_eq!(chain.tail_index(), 2);
        assert_eq!(chain.status(0), Some(SlotStatus::Activated));
        assert_eq!(chain.status(1), Some(SlotStatus::Cancelled));
        assert_eq!(chain.status(2), Some(SlotStatus::Pending));
        assert_eq!(chain.status(3), None);
    }

    #[test]
    fn termination_freezes_the_last_slot() {
        let cfg = Config {
            termination: TerminationPolicy::OnCancel,
            ..Config::default()
        };
        let chain = Chain::<u32>::new(cfg, Retention::Append);
        chain.settle(Ok(1));
        chain.settle(Err(EmitError::cancelled()));
        assert!(!chain.is_alive());
        assert!(!chain.settle(Ok(2)));
        assert_eq!(chain.count(), 2);
        assert_eq!(chain.tail_index(), 1);
    }

    struct Tally(Arc<AtomicUsize>);

    impl Continuation<u32> for Tally {
        fn resume(self: Box<Self>, _delivery: Delivery<u32>) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn terminated(termination: TerminationPolicy) -> Arc<Chain<u32>> {
        let chain = Chain::new(
            Config {
                termination,
                ..Config::default()
            },
            Retention::Append,
        );
        chain.settle(Err(EmitError::cancelled()));
        chain
    }

    #[test]
    fn late_tail_attach_replays_only_single_shot_chains() {
        let hits = Arc::new(AtomicUsize::new(0));

        terminated(TerminationPolicy::OnCancel).attach_tail(Box::new(Tally(hits.clone())));
        assert_eq!(hits.load(Ordering::SeqCst), 0);

        terminated(TerminationPolicy::Always).attach_tail(Box::new(Tally(hits.clone())));
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn drain_keeps_referenced_slots() {
        let chain = Chain::<u32>::new(Config::default(), Retention::Drain);
        let held = chain.next();
        chain.settle(Ok(1));
        chain.settle(Ok(2));
        // slot #0 is still referenced by `held`
        assert_eq!(chain.retained(), 3);
        drop(held);
        assert_eq!(chain.drain(), 2);
        assert_eq!(chain.retained(), 1);
        assert_eq!(chain.base(), 2);
        assert_eq!(chain.status(0), None);
        assert!(chain.previous().is_none());
    }
}
