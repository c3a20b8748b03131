//! # Waiting for a matching activation.
//!
//! [`filter`] resolves once the source produces an activation that satisfies a
//! predicate:
//!
//! - match → `Ok(true)`
//! - deactivation → `Err(reason)`
//! - cancellation, an already terminated source, or the source dropping its
//!   last handle → `Ok(false)`
//!
//! The source position is captured when `filter` is called, not when the
//! returned future is first polled, so activations made in between count.

use std::future::Future;

use futures::StreamExt;

use crate::emitter::Listen;
use crate::error::EmitError;

/// Resolves with `Ok(true)` on the first activation matching `predicate`.
pub fn filter<T, L, P>(
    source: &L,
    mut predicate: P,
) -> impl Future<Output = Result<bool, EmitError>> + Send + 'static + use<T, L, P>
where
    T: Clone + Send + 'static,
    L: Listen<T>,
    P: FnMut(&T) -> bool + Send + 'static,
{
    let mut events = source.future();
    async move {
        while let Some(item) = events.next().await {
            if predicate(&item?) {
                return Ok(true);
            }
        }
        Ok(false)
    }
}

/// Resolves with `Ok(true)` on the first activation equal to `value`.
pub fn filter_value<T, L>(
    source: &L,
    value: T,
) -> impl Future<Output = Result<bool, EmitError>> + Send + 'static + use<T, L>
where
    T: Clone + PartialEq + Send + 'static,
    L: Listen<T>,
{
    filter(source, move |current: &T| *current == value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Broadcast, Emitter};

    #[tokio::test]
    async fn resolves_on_first_match() {
        let emitter = Emitter::new();
        let found = filter(&emitter, |v: &u32| v % 2 == 0);
        emitter.activate(1).activate(3).activate(4);
        assert!(found.await.unwrap());
    }

    #[tokio::test]
    async fn cancellation_means_no_match() {
        let emitter = Emitter::new();
        let found = filter_value(&emitter, "needle");
        emitter.activate("hay").cancel();
        assert!(!found.await.unwrap());
    }

    #[tokio::test]
    async fn deactivation_is_an_error() {
        let emitter = Emitter::<u8>::new();
        let found = filter_value(&emitter, 9);
        emitter.deactivate("boom");
        assert!(found.await.unwrap_err().is_deactivated());
    }
}
