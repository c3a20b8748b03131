//! Settlement slots.
//!
//! A slot is the unit every emitter is built from: a write-once cell that is
//! pending until it is activated with a value, deactivated with a reason, or
//! cancelled.
//!
//! ## Contents
//! - `Slot` write-once cell holding wakers and callback continuations
//! - [`SlotFuture`] awaitable handle on one slot
//! - [`SlotStatus`] pending / activated / deactivated / cancelled
//!
//! ```text
//! pending ──activate(v)──► Activated(v)
//!    │  ──deactivate(e)──► Deactivated(e)
//!    └────cancel()───────► Cancelled
//! ```

mod cell;
mod continuation;
mod status;
mod waiter;

pub(crate) use cell::Slot;
pub(crate) use continuation::{Continuation, Delivery};
pub use status::SlotStatus;
pub use waiter::SlotFuture;
