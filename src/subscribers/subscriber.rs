//! # Async subscriber trait.
//!
//! Provides [`Subscribe`], an extension point for plugging async handlers
//! (logging, metrics, persistence) into an emitter.
//!
//! Each subscriber gets:
//! - **Dedicated worker task** (runs independently)
//! - **Per-subscriber bounded queue** (capacity via [`Subscribe::queue_capacity`])
//! - **Panic isolation** (panics are caught and logged with `tracing::error!`)
//!
//! ## Architecture
//! ```text
//! emitter settles ──► SubscriberSet ──► [bounded queue] ──► worker task ──► on_event / on_error
//!                                                        └─► panic caught → error! log
//! ```
//!
//! ## Rules
//! - A slow subscriber only affects its own queue.
//! - Queue overflow drops the delivery **for this subscriber only** (warn! log).
//! - Deliveries are processed sequentially (FIFO) per subscriber.
//! - Cancellations are not delivered; they end nothing either (the set keeps
//!   following the emitter).
//!
//! ## Example
//! ```rust
//! use async_trait::async_trait;
//! use tidings::{EmitError, Subscribe};
//!
//! struct Metrics;
//!
//! #[async_trait]
//! impl Subscribe<u64> for Metrics {
//!     async fn on_event(&self, bytes: &u64) {
//!         // export a metric, etc.
//!         let _ = bytes;
//!     }
//!
//!     async fn on_error(&self, err: &EmitError) {
//!         let _ = err.as_label();
//!     }
//!
//!     fn name(&self) -> &'static str { "metrics" }
//!     fn queue_capacity(&self) -> Option<usize> { Some(2048) }
//! }
//! ```

use async_trait::async_trait;

use crate::error::EmitError;

/// Async handler for emitter deliveries.
///
/// ### Implementation requirements
/// - Use async I/O; avoid blocking the executor.
/// - Handle errors internally; do not panic.
/// - Slow processing affects only this subscriber's queue.
#[async_trait]
pub trait Subscribe<T>: Send + Sync + 'static
where
    T: Send + Sync + 'static,
{
    /// Processes one activation.
    ///
    /// Called from a dedicated worker task, not in the producer context.
    async fn on_event(&self, value: &T);

    /// Processes one deactivation. Default: ignore.
    async fn on_error(&self, _err: &EmitError) {}

    /// Returns the subscriber name used in logs.
    ///
    /// The default uses `type_name::<Self>()`, which can be verbose - override it when possible.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Returns the preferred queue capacity for this subscriber.
    ///
    /// `None` uses the emitter's [`Config::subscriber_capacity`](crate::Config).
    /// Capacity is clamped to a minimum of 1.
    fn queue_capacity(&self) -> Option<usize> {
        None
    }
}
