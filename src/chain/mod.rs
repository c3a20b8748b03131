//! Slot chains: the machinery shared by every emitter flavor.
//!
//! ## Contents
//! - `Chain` ordered slots + settlement counter + dispatcher
//! - `Dispatcher` FIFO trampoline running callback listeners outside locks
//! - `Listener` continuation behind `once`/`on`/`catch`
//! - [`Listening`] completion handle of a callback listener
//! - [`Events`] `Stream` over settled slots
//!
//! ```text
//!  Emitter / QueueEmitter / Gate
//!            │ Arc<Chain<T>>
//!            ▼
//!  Chain ── slots ── [#0][#1]...[#n pending]
//!    │                  ▲   ▲
//!    │                  │   └── Events / SlotFuture (wakers)
//!    │                  └────── Listener (continuations)
//!    └── Dispatcher ──► Listener::resume (no locks held)
//! ```

mod dispatch;
mod events;
mod listener;
mod store;

pub(crate) use dispatch::panic_message;
pub use events::Events;
pub(crate) use listener::Listener;
pub use listener::Listening;
pub use store::Chain;
pub(crate) use store::Retention;
