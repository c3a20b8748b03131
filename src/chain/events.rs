//! # Async iteration over a chain.
//!
//! [`Events`] is a [`Stream`] that walks the chain from a starting index,
//! yielding one item per settled slot:
//!
//! - activation → `Some(Ok(value))`, continue with the next slot;
//! - deactivation → `Some(Err(reason))`, then end;
//! - cancellation → end (`None`);
//! - optional upper bound reached → end.
//!
//! With [`Events::until`], a cancellation token ends the stream as well. A slot
//! that settles in the same turn as the token fires is still yielded: the slot
//! is always polled before the token.
//!
//! The stream holds the slot it waits on, so queue emitters never drain a slot
//! an iterator still needs.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures::Stream;
use futures::stream::FusedStream;
use tokio_util::sync::{CancellationToken, WaitForCancellationFutureOwned};

use crate::error::EmitError;
use crate::slot::SlotFuture;

use super::store::Chain;

/// Stream of settlements.
///
/// Created by `all()`, `future()`, `past()` and `replay_from()` on emitters.
#[must_use = "streams do nothing unless polled"]
pub struct Events<T> {
    chain: Arc<Chain<T>>,
    index: u64,
    end: Option<u64>,
    waiting: Option<SlotFuture<T>>,
    cancel: Option<Pin<Box<WaitForCancellationFutureOwned>>>,
    done: bool,
}

impl<T: Clone + Send + 'static> Events<T> {
    pub(crate) fn new(chain: Arc<Chain<T>>, index: u64, end: Option<u64>) -> Self {
        let waiting = if end.is_some_and(|end| index >= end) {
            None
        } else {
            chain.waiter(index)
        };
        Self {
            done: waiting.is_none(),
            chain,
            index,
            end,
            waiting,
            cancel: None,
        }
    }

    /// Ends the stream once `token` is cancelled.
    pub fn until(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(Box::pin(token.cancelled_owned()));
        self
    }

    /// Index of the slot the stream yields next.
    #[inline]
    pub fn position(&self) -> u64 {
        self.index
    }

    fn advance(&mut self) {
        self.index += 1;
        // The next slot is fetched before the current one is released.
        self.waiting = if self.end.is_some_and(|end| self.index >= end) {
            None
        } else {
            self.chain.waiter(self.index)
        };
        if self.waiting.is_none() {
            self.done = true;
        }
    }

    fn finish(&mut self) {
        self.done = true;
        self.waiting = None;
        self.cancel = None;
    }
}

impl<T: Clone + Send + 'static> Stream for Events<T> {
    type Item = Result<T, EmitError>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = &mut *self;
        if this.done {
            return Poll::Ready(None);
        }
        let Some(waiting) = this.waiting.as_mut() else {
            this.finish();
            return Poll::Ready(None);
        };

        match Pin::new(waiting).poll(cx) {
            Poll::Ready(Ok(value)) => {
                this.advance();
                Poll::Ready(Some(Ok(value)))
            }
            Poll::Ready(Err(err)) if err.is_cancelled() => {
                this.finish();
                Poll::Ready(None)
            }
            Poll::Ready(Err(err)) => {
                this.finish();
                Poll::Ready(Some(Err(err)))
            }
            Poll::Pending => {
                if let Some(cancel) = this.cancel.as_mut() {
                    if cancel.as_mut().poll(cx).is_ready() {
                        this.finish();
                        return Poll::Ready(None);
                    }
                }
                Poll::Pending
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.done {
            return (0, Some(0));
        }
        match self.end {
            Some(end) => (0, usize::try_from(end.saturating_sub(self.index)).ok()),
            None => (0, None),
        }
    }
}

impl<T: Clone + Send + 'static> FusedStream for Events<T> {
    fn is_terminated(&self) -> bool {
        self.done
    }
}

impl<T: Clone + Send + 'static> fmt::Debug for Events<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Events")
            .field("emitter", &self.chain.label())
            .field("index", &self.index)
            .field("end", &self.end)
            .field("done", &self.done)
            .finish()
    }
}
