//! # tidings
//!
//! **Tidings** is a typed, future-oriented event emitter for Tokio.
//!
//! Producers `activate` (with a value), `deactivate` (with an error) or
//! `cancel` an emitter; consumers await the next event, iterate events as a
//! [`Stream`](futures::Stream), or register callbacks. Every event is a
//! write-once *slot*; the emitter is a chain of slots with exactly one pending
//! tail.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!        producer                                   consumers
//!   activate / deactivate / cancel       next() · future() · once() · on() · subscribe()
//!            │                                             ▲
//!            ▼                                             │
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  Chain<T>                                                         │
//! │   [#0 settled][#1 settled] ... [#n pending tail]                  │
//! │      │            │                 │                             │
//! │      │ wakers ────┴─────────────────┴──► SlotFuture / Events      │
//! │      │ continuations ──► Dispatcher (FIFO, outside locks)         │
//! │      ▼                       └──► Listener::resume ──► callbacks  │
//! └───────────────────────────────────────────────────────────────────┘
//!     Emitter      : append-only, replayable history
//!     QueueEmitter : settled slots released once unobserved
//!     Gate         : first settlement wins, then frozen
//! ```
//!
//! ### Settlement
//! ```text
//! activate(v)
//!   ├─► lock chain
//!   ├─► settle tail (wake raw waiters)
//!   ├─► install new pending tail (unless the termination policy ends the chain)
//!   ├─► queue callback continuations in registration order
//!   ├─► drain released slots (queue emitters)
//!   ├─► unlock
//!   └─► run queued callbacks (re-entrant calls only enqueue)
//! ```
//!
//! ## Features
//! | Area              | Description                                                      | Key types / traits                        |
//! |-------------------|------------------------------------------------------------------|-------------------------------------------|
//! | **Emitters**      | Multi-event emitters with and without replay.                    | [`Emitter`], [`QueueEmitter`]             |
//! | **Gate**          | Exactly-one-event emitter.                                       | [`Gate`]                                  |
//! | **Surface**       | Producer/consumer operations shared by emitters.                 | [`Broadcast`], [`Listen`]                 |
//! | **Streams**       | Async iteration, optionally raced against a token.               | [`Events`], [`SlotFuture`], [`Listening`] |
//! | **Helpers**       | Merge, filter, mirror, bind external sources.                    | [`helpers`]                               |
//! | **Subscriber API**| Async handlers with isolated bounded queues.                     | [`Subscribe`], [`SubscriberSet`]          |
//! | **Policies**      | Whether cancellations/deactivations end the chain.               | [`TerminationPolicy`]                     |
//! | **Errors**        | Deactivation vs graceful cancellation.                           | [`EmitError`]                             |
//! | **Configuration** | Names, termination policy, subscriber queue sizes.               | [`Config`]                                |
//!
//! ## Optional features
//! - `logging`: exports a simple built-in [`LogWriter`] _(demo/reference only)_.
//!
//! ## Example
//! ```rust
//! use futures::StreamExt;
//! use tidings::prelude::*;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let emitter = Emitter::named("numbers");
//!
//!     // Callback listener: runs synchronously with every activation.
//!     let listening = emitter.on(|n: u32| println!("got {n}"));
//!
//!     // Stream consumer: captured now, polled later.
//!     let mut events = emitter.future();
//!
//!     emitter.activate(1).activate(2).cancel();
//!
//!     assert_eq!(events.next().await.transpose()?, Some(1));
//!     assert_eq!(events.next().await.transpose()?, Some(2));
//!     assert!(events.next().await.is_none()); // cancellation ends the stream
//!
//!     listening.await?; // cancellation is swallowed by listeners
//!     Ok(())
//! }
//! ```
mod chain;
mod config;
mod emitter;
mod error;
mod gate;
pub mod helpers;
mod policies;
mod slot;
mod subscribers;

// ---- Public re-exports ----

pub use chain::{Events, Listening};
pub use config::Config;
pub use emitter::{Broadcast, Drainer, Emitter, Listen, QueueEmitter};
pub use error::{BoxError, EmitError, swallow_cancelled};
pub use gate::Gate;
pub use policies::TerminationPolicy;
pub use slot::{SlotFuture, SlotStatus};
pub use subscribers::{Subscribe, SubscriberSet};

// Optional: expose a simple built-in logger subscriber (demo/reference).
// Enable with: `--features logging`
#[cfg(feature = "logging")]
pub use subscribers::LogWriter;

/// Everything needed to produce and consume events.
pub mod prelude {
    pub use crate::{
        Broadcast, EmitError, Emitter, Events, Gate, Listen, Listening, QueueEmitter,
        SlotStatus, swallow_cancelled,
    };
}
