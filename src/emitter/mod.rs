//! Multi-event emitters.
//!
//! Two flavors share one producer/consumer surface:
//!
//! - [`Emitter`]: keeps the full history (replay with `all`/`past`).
//! - [`QueueEmitter`]: releases consumed settlements (forward only).
//!
//! The surface lives in two traits so helpers can be generic over the flavor:
//!
//! - [`Broadcast`] `activate` / `deactivate` / `cancel` / `cancel_with`
//! - [`Listen`] `next` / `count` / `future` / `once` / `on` / cancellable forms
//!
//! Both traits are sealed: only the emitters of this crate implement them.

mod broadcast;
mod drainer;
mod listen;
mod queue;
mod sequence;

pub use broadcast::Broadcast;
pub use drainer::Drainer;
pub use listen::Listen;
pub use queue::QueueEmitter;
pub use sequence::Emitter;

pub(crate) mod sealed {
    use std::sync::Arc;

    use crate::chain::Chain;

    /// Access to the chain behind an emitter handle.
    pub trait Sealed<T> {
        fn chain(&self) -> &Arc<Chain<T>>;
    }
}
