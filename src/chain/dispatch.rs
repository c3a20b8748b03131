//! # Re-entrancy safe callback dispatcher.
//!
//! Every chain owns one [`Dispatcher`]. Settlements push the continuations of
//! the settled slot onto its FIFO queue and then call [`Dispatcher::run`].
//!
//! ```text
//! activate(v) ──► chain lock ──► push jobs ──► unlock ──► run()
//!                                                         │
//!               ┌─────────────────────────────────────────┘
//!               ▼
//!        running? ── yes ──► return (the active runner picks the jobs up)
//!               │ no
//!               ▼
//!        pop job ──► resume() (no locks held) ──► pop job ──► ... ──► idle
//! ```
//!
//! ## Rules
//! - Callbacks never run while the chain lock is held.
//! - A settlement issued from inside a callback only enqueues; the callbacks it
//!   triggers run after the current callback returns (no unbounded recursion).
//! - Jobs run in push order, so listeners of one slot run in registration order.
//! - A panicking callback is caught and logged; the queue keeps draining.
//!
//! When two threads settle concurrently, the thread that lost the race returns
//! before its callbacks have run; they run on the thread that owns the queue.

use std::any::Any;
use std::collections::VecDeque;
use std::panic::AssertUnwindSafe;

use parking_lot::Mutex;
use tracing::error;

use crate::slot::{Continuation, Delivery};

struct Job<T> {
    continuation: Box<dyn Continuation<T>>,
    delivery: Delivery<T>,
}

struct DispatchState<T> {
    queue: VecDeque<Job<T>>,
    running: bool,
}

/// FIFO trampoline for slot continuations.
pub(crate) struct Dispatcher<T> {
    state: Mutex<DispatchState<T>>,
}

impl<T: Clone + Send + 'static> Dispatcher<T> {
    pub(crate) fn new() -> Self {
        Self {
            state: Mutex::new(DispatchState {
                queue: VecDeque::new(),
                running: false,
            }),
        }
    }

    /// Enqueues a continuation for later execution by [`run`](Self::run).
    pub(crate) fn push(&self, continuation: Box<dyn Continuation<T>>, delivery: Delivery<T>) {
        self.state.lock().queue.push_back(Job {
            continuation,
            delivery,
        });
    }

    /// Drains the queue unless another frame is already draining it.
    pub(crate) fn run(&self) {
        {
            let mut state = self.state.lock();
            if state.running {
                return;
            }
            state.running = true;
        }

        loop {
            let job = {
                let mut state = self.state.lock();
                match state.queue.pop_front() {
                    Some(job) => job,
                    None => {
                        state.running = false;
                        return;
                    }
                }
            };

            let index = job.delivery.index;
            let resumed = std::panic::catch_unwind(AssertUnwindSafe(move || {
                job.continuation.resume(job.delivery);
            }));
            if let Err(panic) = resumed {
                error!(
                    index,
                    info = %panic_message(panic.as_ref()),
                    "listener panicked"
                );
            }
        }
    }

    /// Number of queued, not yet executed callbacks.
    #[cfg(test)]
    pub(crate) fn queued(&self) -> usize {
        self.state.lock().queue.len()
    }
}

/// Extracts a printable message from a panic payload.
pub(crate) fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(msg) = panic.downcast_ref::<&'static str>() {
        (*msg).to_string()
    } else if let Some(msg) = panic.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::slot::Slot;
    use std::sync::{Arc, Mutex as StdMutex};

    struct Record {
        id: u32,
        log: Arc<StdMutex<Vec<u32>>>,
        explode: bool,
    }

    impl Continuation<u32> for Record {
        fn resume(self: Box<Self>, delivery: Delivery<u32>) {
            if self.explode {
                panic!("listener {} exploded", self.id);
            }
            self.log.lock().unwrap().push(self.id * 100 + delivery.index as u32);
        }
    }

    fn delivery(index: u64) -> Delivery<u32> {
        let slot = Slot::pending();
        slot.settle(Ok(0));
        Delivery {
            index,
            outcome: Ok(0),
            _slot: slot,
        }
    }

    #[test]
    fn runs_in_push_order_and_survives_panics() {
        let log = Arc::new(StdMutex::new(Vec::new()));
        let dispatcher = Dispatcher::<u32>::new();
        for (id, explode) in [(1, false), (2, true), (3, false)] {
            dispatcher.push(
                Box::new(Record {
                    id,
                    log: log.clone(),
                    explode,
                }),
                delivery(0),
            );
        }
        assert_eq!(dispatcher.queued(), 3);

        dispatcher.run();
        assert_eq!(dispatcher.queued(), 0);
        assert_eq!(*log.lock().unwrap(), vec![100, 300]);
    }

    #[test]
    fn panic_payloads_are_readable() {
        let owned = std::panic::catch_unwind(|| panic!("{}", String::from("owned"))).unwrap_err();
        assert_eq!(panic_message(owned.as_ref()), "owned");
        let fixed = std::panic::catch_unwind(|| panic!("fixed")).unwrap_err();
        assert_eq!(panic_message(fixed.as_ref()), "fixed");
    }
}
