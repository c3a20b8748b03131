//! # Consumer surface shared by every multi-event emitter.
//!
//! [`Listen`] is implemented by [`Emitter`](crate::Emitter) and
//! [`QueueEmitter`](crate::QueueEmitter). The composition helpers are generic
//! over it, so they accept either flavor.
//!
//! ## Listener forms
//! ```text
//!                     value     deactivation          cancellation   token
//! once                1x        Listening → Err       Ok             -
//! on                  every     Listening → Err       Ok             -
//! once_until          1x        err_f, stop           Ok             stop
//! on_until            every     err_f, stop           Ok             stop
//! on_continue_after…  every     err_f, resume next    Ok             -
//! ```
//!
//! All registrations are eager: the listener is attached to the tail slot by
//! the time the call returns, so an `activate` issued right after is seen.
//! Late listeners on a terminated emitter never see its final settlement;
//! their handle resolves `Ok(())` immediately.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::chain::{Events, Listener, Listening};
use crate::error::EmitError;
use crate::slot::{SlotFuture, SlotStatus};

use super::sealed::Sealed;

/// Read and subscribe operations of an emitter.
pub trait Listen<T: Clone + Send + 'static>: Sealed<T> {
    /// Name used in logs and merge tags.
    fn name(&self) -> &str {
        self.chain().label()
    }

    /// Future of the next settlement (the tail slot).
    ///
    /// Both deactivation and cancellation surface as `Err`; see
    /// [`swallow_cancelled`](crate::swallow_cancelled).
    fn next(&self) -> SlotFuture<T> {
        self.chain().next()
    }

    /// Number of settled slots so far. Never decreases.
    fn count(&self) -> u64 {
        self.chain().count()
    }

    /// Whether further settlements are possible.
    fn is_alive(&self) -> bool {
        self.chain().is_alive()
    }

    /// Status of slot `index`; `None` when out of range or no longer retained.
    fn status(&self, index: u64) -> Option<SlotStatus> {
        self.chain().status(index)
    }

    /// Stream of settlements from now on, starting at slot `count()`.
    ///
    /// Ends right away on a terminated emitter.
    fn future(&self) -> Events<T> {
        let chain = self.chain();
        Events::new(Arc::clone(chain), chain.count(), None)
    }

    /// Calls `f` with the next activation.
    ///
    /// On a terminated emitter the listener finishes at once with `Ok(())`.
    fn once(&self, f: impl FnOnce(T) + Send + 'static) -> Listening {
        Listener::once(f).attach(self.chain())
    }

    /// Calls `f` for every activation until a deactivation or cancellation.
    fn on(&self, f: impl FnMut(T) + Send + 'static) -> Listening {
        Listener::forever(f).attach(self.chain())
    }

    /// [`once`](Self::once) that also stops when `token` is cancelled.
    ///
    /// Deactivations go to `err_f`; cancellations are swallowed.
    fn once_until(
        &self,
        token: CancellationToken,
        f: impl FnOnce(T) + Send + 'static,
        err_f: impl FnMut(EmitError) + Send + 'static,
    ) -> Listening {
        Listener::once(f)
            .on_error(err_f)
            .until(token)
            .attach(self.chain())
    }

    /// [`once_until`](Self::once_until) with a fresh token, returned as the canceller.
    fn once_cancellable(
        &self,
        f: impl FnOnce(T) + Send + 'static,
        err_f: impl FnMut(EmitError) + Send + 'static,
    ) -> CancellationToken {
        let token = CancellationToken::new();
        let _listening = self.once_until(token.clone(), f, err_f);
        token
    }

    /// [`on`](Self::on) that also stops when `token` is cancelled.
    ///
    /// An activation settled before the token was cancelled is still delivered.
    fn on_until(
        &self,
        token: CancellationToken,
        f: impl FnMut(T) + Send + 'static,
        err_f: impl FnMut(EmitError) + Send + 'static,
    ) -> Listening {
        Listener::forever(f)
            .on_error(err_f)
            .until(token)
            .attach(self.chain())
    }

    /// [`on_until`](Self::on_until) with a fresh token, returned as the canceller.
    fn on_cancellable(
        &self,
        f: impl FnMut(T) + Send + 'static,
        err_f: impl FnMut(EmitError) + Send + 'static,
    ) -> CancellationToken {
        let token = CancellationToken::new();
        let _listening = self.on_until(token.clone(), f, err_f);
        token
    }

    /// Calls `f` for every activation and `err_f` for every deactivation.
    ///
    /// After a deactivation the listener resumes at the slot that follows the
    /// failed one. Only a cancellation stops it.
    fn on_continue_after_error(
        &self,
        f: impl FnMut(T) + Send + 'static,
        err_f: impl FnMut(EmitError) + Send + 'static,
    ) -> Listening {
        Listener::forever(f)
            .on_error(err_f)
            .resume_after_error()
            .attach(self.chain())
    }

    /// [`on_continue_after_error`](Self::on_continue_after_error) that also
    /// stops when `token` is cancelled.
    fn on_continue_after_error_until(
        &self,
        token: CancellationToken,
        f: impl FnMut(T) + Send + 'static,
        err_f: impl FnMut(EmitError) + Send + 'static,
    ) -> Listening {
        Listener::forever(f)
            .on_error(err_f)
            .resume_after_error()
            .until(token)
            .attach(self.chain())
    }
}
