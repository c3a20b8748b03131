//! # Emitter configuration.
//!
//! Provides [`Config`], the settings shared by every emitter flavor.
//!
//! Config is used in two ways:
//! 1. **Emitter creation**: `Emitter::with_config(config)` / `QueueEmitter::with_config(config)`
//! 2. **Subscribers**: `emitter.subscribe(..)` sizes its queues from `subscriber_capacity`
//!
//! ## Sentinel values
//! - `name = None` → logs use the label `"emitter"`
//! - `subscriber_capacity = 0` → clamped to 1

use std::sync::Arc;

use crate::policies::TerminationPolicy;

const DEFAULT_LABEL: &str = "emitter";

/// Configuration for an emitter.
///
/// ## Field semantics
/// - `name`: label used in `tracing` records and merge tags
/// - `termination`: whether cancellations/deactivations end the chain
/// - `subscriber_capacity`: default per-subscriber queue size for [`SubscriberSet`](crate::SubscriberSet)
///
/// ## Notes
/// All fields are public for flexibility. Prefer using helper accessors to avoid
/// sprinkling sentinel checks across the codebase.
#[derive(Clone, Debug)]
pub struct Config {
    /// Human-readable emitter name used in logs.
    pub name: Option<Arc<str>>,

    /// Chain termination policy.
    ///
    /// Default keeps installing new tails after `cancel()` and `deactivate()`.
    pub termination: TerminationPolicy,

    /// Queue capacity used for subscribers that do not declare their own.
    ///
    /// On overflow, deliveries for the slow subscriber are dropped (warn).
    pub subscriber_capacity: usize,
}

impl Config {
    /// Creates a default config with the given name.
    pub fn named(name: impl Into<Arc<str>>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    /// Returns the label used in logs.
    #[inline]
    pub fn label(&self) -> &str {
        self.name.as_deref().unwrap_or(DEFAULT_LABEL)
    }

    /// Returns the subscriber queue capacity clamped to a minimum of 1.
    #[inline]
    pub fn subscriber_capacity_clamped(&self) -> usize {
        self.subscriber_capacity.max(1)
    }
}

impl Default for Config {
    /// Default configuration:
    ///
    /// - `name = None`
    /// - `termination = TerminationPolicy::Never`
    /// - `subscriber_capacity = 1024`
    fn default() -> Self {
        Self {
            name: None,
            termination: TerminationPolicy::default(),
            subscriber_capacity: 1024,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_label_and_capacity() {
        let cfg = Config::default();
        assert_eq!(cfg.label(), "emitter");
        assert_eq!(cfg.subscriber_capacity_clamped(), 1024);
        assert_eq!(cfg.termination, TerminationPolicy::Never);
    }

    #[test]
    fn named_and_clamped() {
        let mut cfg = Config::named("clicks");
        cfg.subscriber_capacity = 0;
        assert_eq!(cfg.label(), "clicks");
        assert_eq!(cfg.subscriber_capacity_clamped(), 1);
    }
}
