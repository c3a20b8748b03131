//! # Built-in subscribers
//!
//! Small, self-contained implementations useful for demos and debugging.
//!
//! - [`LogWriter`]: logs deliveries through `tracing` (demo/debug).

mod log;

pub use log::LogWriter;
