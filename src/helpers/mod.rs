//! Composition helpers built on the emitter traits.
//!
//! ## Contents
//! - [`Merge`] / [`merge`] fan N named sources into one tagged emitter
//! - [`filter`] / [`filter_value`] wait for a matching activation
//! - [`mirror`] / [`mirror_until`] independent copy of an emitter
//! - [`bind_stream`] / [`bind_broadcast`] forward external sources, [`Binding::unbind`] to stop
//!
//! Every helper is generic over [`Listen`](crate::Listen) and/or
//! [`Broadcast`](crate::Broadcast), so it works with both
//! [`Emitter`](crate::Emitter) and [`QueueEmitter`](crate::QueueEmitter).

mod bind;
mod filter;
mod merge;
mod mirror;

pub use bind::{Binding, Lagged, bind_broadcast, bind_stream};
pub use filter::{filter, filter_value};
pub use merge::{Merge, Tagged, merge};
pub use mirror::{mirror, mirror_until};
