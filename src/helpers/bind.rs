//! # Binding external event sources to an emitter.
//!
//! [`bind_stream`] and [`bind_broadcast`] spawn a Tokio task that forwards an
//! external source into an emitter until [`Binding::unbind`] is called:
//!
//! ```text
//! stream item Ok(v)   ──► target.activate(v)
//! stream item Err(e)  ──► target.deactivate(e)
//! stream ends         ──► target.cancel(), task exits
//!
//! broadcast Ok(v)         ──► target.activate(v)
//! broadcast Lagged(n)     ──► target.deactivate(Lagged { skipped: n }), keep going
//! broadcast Closed        ──► target.cancel(), task exits
//! ```
//!
//! Dropping a [`Binding`] does not unbind: the task keeps forwarding until the
//! source ends.

use futures::{Stream, StreamExt};
use thiserror::Error;
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::emitter::{Broadcast, Listen};
use crate::error::BoxError;

/// Deactivation reason used when a broadcast receiver falls behind.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("receiver lagged behind, {skipped} events skipped")]
pub struct Lagged {
    /// Number of events the receiver missed.
    pub skipped: u64,
}

/// Handle of a forwarding task.
#[derive(Debug)]
pub struct Binding {
    token: CancellationToken,
    task: JoinHandle<()>,
}

impl Binding {
    /// Stops forwarding. The target emitter is left as is (not cancelled).
    pub fn unbind(&self) {
        self.token.cancel();
    }

    /// Whether the forwarding task has exited.
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Waits for the forwarding task to exit.
    pub async fn join(self) {
        let _ = self.task.await;
    }
}

/// Forwards `stream` into `target`.
///
/// Must be called inside a Tokio runtime.
pub fn bind_stream<T, B, S, E>(target: &B, stream: S) -> Binding
where
    T: Clone + Send + 'static,
    B: Broadcast<T> + Listen<T> + Clone + Send + Sync + 'static,
    S: Stream<Item = Result<T, E>> + Send + 'static,
    E: Into<BoxError>,
{
    let token = CancellationToken::new();
    let stop = token.clone();
    let target = target.clone();

    let task = tokio::spawn(async move {
        let mut stream = std::pin::pin!(stream);
        loop {
            tokio::select! {
                biased;
                _ = stop.cancelled() => {
                    debug!(emitter = target.name(), "stream unbound");
                    break;
                }
                item = stream.next() => match item {
                    Some(Ok(value)) => {
                        target.activate(value);
                    }
                    Some(Err(err)) => {
                        target.deactivate(err);
                    }
                    None => {
                        target.cancel();
                        break;
                    }
                }
            }
        }
    });

    Binding { token, task }
}

/// Forwards a broadcast receiver into `target`.
///
/// Must be called inside a Tokio runtime.
pub fn bind_broadcast<T, B>(target: &B, mut rx: broadcast::Receiver<T>) -> Binding
where
    T: Clone + Send + 'static,
    B: Broadcast<T> + Listen<T> + Clone + Send + Sync + 'static,
{
    let token = CancellationToken::new();
    let stop = token.clone();
    let target = target.clone();

    let task = tokio::spawn(async move {
        loop {
            tokio::select! {
                biased;
                _ = stop.cancelled() => {
                    debug!(emitter = target.name(), "broadcast unbound");
                    break;
                }
                msg = rx.recv() => match msg {
                    Ok(value) => {
                        target.activate(value);
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        target.deactivate(Lagged { skipped });
                        continue;
                    }
                    Err(RecvError::Closed) => {
                        target.cancel();
                        break;
                    }
                }
            }
        }
    });

    Binding { token, task }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::slot::SlotStatus;
    use crate::{Emitter, QueueEmitter};

    #[tokio::test]
    async fn stream_items_settle_the_target() {
        let target = Emitter::<u8>::new();
        let items = futures::stream::iter(vec![Ok(1), Err("bad frame"), Ok(2)]);
        bind_stream(&target, items).join().await;

        assert_eq!(target.count(), 4);
        assert_eq!(target.status(1), Some(SlotStatus::Deactivated));
        assert_eq!(target.status(3), Some(SlotStatus::Cancelled));
    }

    #[tokio::test]
    async fn unbind_stops_forwarding() {
        let (tx, rx) = broadcast::channel(8);
        let target = QueueEmitter::new();
        let binding = bind_broadcast(&target, rx);

        let first = target.next();
        tx.send(1u8).unwrap();
        assert_eq!(first.await.unwrap(), 1);

        binding.unbind();
        binding.join().await;
        let _ = tx.send(2);
        assert_eq!(target.count(), 1);
    }

    #[tokio::test]
    async fn lag_deactivates_and_keeps_going() {
        let (tx, rx) = broadcast::channel(1);
        tx.send(1u8).unwrap();
        tx.send(2u8).unwrap();
        drop(tx);

        let target = Emitter::new();
        bind_broadcast(&target, rx).join().await;

        let err = target.status(0);
        assert_eq!(err, Some(SlotStatus::Deactivated));
        assert_eq!(target.status(1), Some(SlotStatus::Activated));
        assert_eq!(target.status(2), Some(SlotStatus::Cancelled));
    }
}
