//! # LogWriter: tracing-backed delivery logger
//!
//! A minimal subscriber that records every delivery through `tracing`.
//! Use it for tests or demos; install a `tracing` subscriber to see the output.
//!
//! ## Example output (with `tracing_subscriber::fmt`)
//! ```text
//! INFO tidings: [activated] value=42
//! WARN tidings: [deactivated] label="emitter_deactivated" error=deactivated: connection reset
//! INFO tidings: [activated] value=43
//! ```

use std::fmt::Debug;

use async_trait::async_trait;
use tracing::{info, warn};

use crate::error::EmitError;
use crate::subscribers::Subscribe;

/// Delivery logger subscriber.
#[derive(Default)]
pub struct LogWriter;

impl LogWriter {
    /// Construct a new [`LogWriter`].
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl<T> Subscribe<T> for LogWriter
where
    T: Debug + Send + Sync + 'static,
{
    async fn on_event(&self, value: &T) {
        info!(value = ?value, "[activated]");
    }

    async fn on_error(&self, err: &EmitError) {
        match err.source_name() {
            Some(source) => warn!(
                label = err.as_label(),
                source,
                error = %err,
                "[deactivated]"
            ),
            None => warn!(label = err.as_label(), error = %err, "[deactivated]"),
        }
    }

    fn name(&self) -> &'static str {
        "LogWriter"
    }
}
