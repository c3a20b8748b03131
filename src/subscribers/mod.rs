//! # Async subscribers for emitters.
//!
//! This module provides the [`Subscribe`] trait and the [`SubscriberSet`]
//! fan-out that connects subscribers to an emitter.
//!
//! ## Architecture
//! ```text
//! Emitter ── settle ──► listener (continue after error)
//!                          │
//!                          ▼
//!                    SubscriberSet
//!                 ┌────────┼────────┐
//!                 ▼        ▼        ▼
//!              worker1  worker2  workerN
//!                 ▼        ▼        ▼
//!            sub1.on_  sub2.on_  subN.on_
//!             event()   event()   event()
//! ```
//!
//! ## Implementing custom subscribers
//! ```no_run
//! use std::sync::Arc;
//! use async_trait::async_trait;
//! use tidings::{Broadcast, Emitter, Subscribe};
//!
//! struct Audit;
//!
//! #[async_trait]
//! impl Subscribe<String> for Audit {
//!     async fn on_event(&self, line: &String) {
//!         // append to an audit log
//!         let _ = line;
//!     }
//! }
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let emitter = Emitter::<String>::named("audit");
//! let subs: Vec<Arc<dyn Subscribe<String>>> = vec![Arc::new(Audit)];
//! let set = emitter.subscribe(subs);
//! emitter.activate("login".to_string());
//! set.shutdown().await;
//! # }
//! ```

#[cfg(feature = "logging")]
mod embedded;
mod subscriber;
mod subscriber_set;

pub use subscriber::Subscribe;
pub use subscriber_set::SubscriberSet;

#[cfg(feature = "logging")]
pub use embedded::LogWriter;
