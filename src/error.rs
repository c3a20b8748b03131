//! Error types delivered through emitter slots.
//!
//! Every settled slot that is not an activation carries an [`EmitError`]:
//!
//! - [`EmitError::Deactivated`] — an abnormal event raised by the producer.
//! - [`EmitError::Cancelled`] — a graceful, intentional end of stream.
//! - [`EmitError::Merged`] — a deactivation forwarded by a merged emitter,
//!   tagged with the name of the source that raised it.
//!
//! Errors are broadcast to every listener of a slot, so the type is cheap to
//! clone: user errors are stored behind an `Arc`.
//!
//! Like the rest of the crate, the type provides `as_label`/`as_message`
//! helpers for logs and metrics.

use std::error::Error as StdError;
use std::sync::Arc;

use thiserror::Error;

/// Boxed user error accepted by `deactivate`.
pub type BoxError = Box<dyn StdError + Send + Sync + 'static>;

const CANCELLED_MESSAGE: &str = "cancelled emitter gracefully";

/// # Errors observed by emitter consumers.
///
/// Raw access (`next()`, awaiting a gate, iterating `Events`) surfaces every
/// variant. The convenience listeners (`once`, `on`, ...) swallow
/// [`EmitError::Cancelled`] and only report the other variants.
#[non_exhaustive]
#[derive(Error, Debug, Clone)]
pub enum EmitError {
    /// The producer deactivated the emitter with an error.
    #[error("deactivated: {0}")]
    Deactivated(Arc<dyn StdError + Send + Sync + 'static>),

    /// The producer cancelled the emitter (graceful stop).
    #[error("{}", .message.as_deref().unwrap_or(CANCELLED_MESSAGE))]
    Cancelled {
        /// Optional message supplied to `cancel_with`.
        message: Option<Arc<str>>,
    },

    /// A source of a merged emitter was deactivated.
    #[error("emitter `{name}` failed: {source}")]
    Merged {
        /// Name the source was registered under.
        name: Arc<str>,
        /// The error raised by the source.
        source: Box<EmitError>,
    },
}

impl EmitError {
    /// Wraps a user error as a deactivation.
    ///
    /// # Example
    /// ```
    /// use tidings::EmitError;
    ///
    /// let err = EmitError::deactivated("connection reset");
    /// assert_eq!(err.to_string(), "deactivated: connection reset");
    /// assert!(!err.is_cancelled());
    /// ```
    pub fn deactivated(err: impl Into<BoxError>) -> Self {
        EmitError::Deactivated(Arc::from(err.into()))
    }

    /// A cancellation without a message.
    pub fn cancelled() -> Self {
        EmitError::Cancelled { message: None }
    }

    /// A cancellation carrying a message.
    pub fn cancelled_with(message: impl Into<Arc<str>>) -> Self {
        EmitError::Cancelled {
            message: Some(message.into()),
        }
    }

    /// Returns `true` for the graceful-stop variant.
    ///
    /// A merged error is never a cancellation: merged emitters absorb source
    /// cancellations instead of forwarding them.
    #[inline]
    pub fn is_cancelled(&self) -> bool {
        matches!(self, EmitError::Cancelled { .. })
    }

    /// Returns `true` for deactivations, including merged ones.
    #[inline]
    pub fn is_deactivated(&self) -> bool {
        !self.is_cancelled()
    }

    /// The user error behind a deactivation, looking through merge tags.
    pub fn reason(&self) -> Option<&(dyn StdError + Send + Sync + 'static)> {
        match self {
            EmitError::Deactivated(err) => Some(err.as_ref()),
            EmitError::Cancelled { .. } => None,
            EmitError::Merged { source, .. } => source.reason(),
        }
    }

    /// Name of the merged source that failed, if any.
    pub fn source_name(&self) -> Option<&str> {
        match self {
            EmitError::Merged { name, .. } => Some(name.as_ref()),
            _ => None,
        }
    }

    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use tidings::EmitError;
    ///
    /// assert_eq!(EmitError::cancelled().as_label(), "emitter_cancelled");
    /// assert_eq!(EmitError::deactivated("boom").as_label(), "emitter_deactivated");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            EmitError::Deactivated(_) => "emitter_deactivated",
            EmitError::Cancelled { .. } => "emitter_cancelled",
            EmitError::Merged { .. } => "emitter_merged_deactivated",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            EmitError::Deactivated(err) => format!("deactivated: {err}"),
            EmitError::Cancelled { message } => {
                format!("cancelled: {}", message.as_deref().unwrap_or(CANCELLED_MESSAGE))
            }
            EmitError::Merged { name, source } => {
                format!("source={name} {}", source.as_message())
            }
        }
    }
}

/// Swallows a cancellation, passing every other outcome through.
///
/// `Ok(Some(value))` for activations, `Ok(None)` for cancellations and
/// `Err(..)` for deactivations. Handy after awaiting `next()` directly.
///
/// # Example
/// ```
/// use tidings::{EmitError, swallow_cancelled};
///
/// let cancelled: Result<u8, EmitError> = Err(EmitError::cancelled());
/// assert!(matches!(swallow_cancelled(cancelled), Ok(None)));
///
/// let failed: Result<u8, EmitError> = Err(EmitError::deactivated("boom"));
/// assert!(swallow_cancelled(failed).is_err());
/// ```
pub fn swallow_cancelled<T>(result: Result<T, EmitError>) -> Result<Option<T>, EmitError> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(err) if err.is_cancelled() => Ok(None),
        Err(err) => Err(err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cancelled_uses_default_message() {
        let err = EmitError::cancelled();
        assert_eq!(err.to_string(), "cancelled emitter gracefully");
        assert!(err.is_cancelled());
        assert!(err.reason().is_none());
    }

    #[test]
    fn cancelled_with_message() {
        let err = EmitError::cancelled_with("shutting down");
        assert_eq!(err.to_string(), "shutting down");
        assert_eq!(err.as_message(), "cancelled: shutting down");
    }

    #[test]
    fn merged_exposes_source_and_reason() {
        let err = EmitError::Merged {
            name: "clicks".into(),
            source: Box::new(EmitError::deactivated("boom")),
        };
        assert_eq!(err.source_name(), Some("clicks"));
        assert_eq!(err.reason().map(|r| r.to_string()).as_deref(), Some("boom"));
        assert!(err.is_deactivated());
        assert!(StdError::source(&err).is_some());
        assert_eq!(err.to_string(), "emitter `clicks` failed: deactivated: boom");
    }

    #[test]
    fn clones_share_the_user_error() {
        let err = EmitError::deactivated(std::io::Error::other("disk"));
        let copy = err.clone();
        match (&err, &copy) {
            (EmitError::Deactivated(a), EmitError::Deactivated(b)) => assert!(Arc::ptr_eq(a, b)),
            _ => panic!("expected deactivations"),
        }
    }
}
