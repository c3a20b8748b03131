//! Chain lifecycle policies.
//!
//! This module groups the knobs that control **when** an emitter chain stops
//! producing pending tails.
//!
//! ## Contents
//! - [`TerminationPolicy`] never / on-cancel / on-deactivate / on-any / always
//!
//! ## Quick wiring
//! ```text
//! Config { termination: TerminationPolicy, .. }
//!      └─► chain::Chain::settle uses:
//!           - termination.terminates(&outcome) to decide "append tail" vs "close"
//! ```
//!
//! ## Defaults
//! - `TerminationPolicy::Never`: `cancel()` and `deactivate()` keep the
//!   emitter usable, matching the classic emitter behavior.

mod termination;

pub use termination::TerminationPolicy;
