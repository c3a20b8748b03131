//! # Termination policies for emitter chains.
//!
//! [`TerminationPolicy`] decides whether a settlement ends the chain or whether
//! a fresh pending tail is installed for the next event.
//!
//! - [`TerminationPolicy::Never`] every settlement installs a new tail (default).
//! - [`TerminationPolicy::OnCancel`] a cancellation ends the chain.
//! - [`TerminationPolicy::OnDeactivate`] a deactivation ends the chain.
//! - [`TerminationPolicy::OnAny`] any non-activation ends the chain.
//! - [`TerminationPolicy::Always`] the first settlement of any kind ends the
//!   chain (this is how [`Gate`](crate::Gate) is built).
//!
//! ## Choosing the right policy
//!
//! **Long-lived event sources** (clicks, ticks, messages):
//! ```text
//! TerminationPolicy::Never         → cancel()/deactivate() are just events;
//!                                    listeners registered later see new activations
//! ```
//!
//! **Streams with a definite end** (downloads, handshakes, sessions):
//! ```text
//! TerminationPolicy::OnCancel      → cancel() closes the stream for good
//! TerminationPolicy::OnAny         → the first error or cancel closes it
//! ```
//!
//! Once terminated, the final slot stays settled forever: `next()` resolves
//! immediately with its error and later `activate`/`deactivate`/`cancel`
//! calls are ignored.

use crate::error::EmitError;

/// Policy controlling whether a settlement ends the emitter chain.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TerminationPolicy {
    /// Keep installing pending tails after every settlement (default).
    #[default]
    Never,
    /// End the chain on the first cancellation.
    OnCancel,
    /// End the chain on the first deactivation.
    OnDeactivate,
    /// End the chain on the first cancellation or deactivation.
    OnAny,
    /// End the chain on the first settlement, activations included.
    Always,
}

impl TerminationPolicy {
    /// Returns `true` if settling a slot with `outcome` ends the chain.
    pub fn terminates<T>(&self, outcome: &Result<T, EmitError>) -> bool {
        if matches!(self, TerminationPolicy::Always) {
            return true;
        }
        match outcome {
            Ok(_) => false,
            Err(err) if err.is_cancelled() => {
                matches!(self, TerminationPolicy::OnCancel | TerminationPolicy::OnAny)
            }
            Err(_) => matches!(
                self,
                TerminationPolicy::OnDeactivate | TerminationPolicy::OnAny
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn activation_never_terminates() {
        for policy in [
            TerminationPolicy::Never,
            TerminationPolicy::OnCancel,
            TerminationPolicy::OnDeactivate,
            TerminationPolicy::OnAny,
        ] {
            assert!(!policy.terminates(&Ok::<_, EmitError>(1)), "{policy:?}");
        }
    }

    #[test]
    fn never_keeps_the_chain_open() {
        let policy = TerminationPolicy::default();
        assert_eq!(policy, TerminationPolicy::Never);
        assert!(!policy.terminates::<()>(&Err(EmitError::cancelled())));
        assert!(!policy.terminates::<()>(&Err(EmitError::deactivated("boom"))));
    }

    #[test]
    fn on_cancel_ignores_deactivations() {
        let policy = TerminationPolicy::OnCancel;
        assert!(policy.terminates::<()>(&Err(EmitError::cancelled())));
        assert!(!policy.terminates::<()>(&Err(EmitError::deactivated("boom"))));
    }

    #[test]
    fn on_deactivate_ignores_cancellations() {
        let policy = TerminationPolicy::OnDeactivate;
        assert!(!policy.terminates::<()>(&Err(EmitError::cancelled())));
        assert!(policy.terminates::<()>(&Err(EmitError::deactivated("boom"))));
    }

    #[test]
    fn always_ends_on_activation() {
        let policy = TerminationPolicy::Always;
        assert!(policy.terminates(&Ok::<_, EmitError>(1)));
        assert!(policy.terminates::<()>(&Err(EmitError::cancelled())));
    }

    #[test]
    fn on_any_ends_on_both() {
        let policy = TerminationPolicy::OnAny;
        assert!(policy.terminates::<()>(&Err(EmitError::cancelled())));
        assert!(policy.terminates::<()>(&Err(EmitError::deactivated("boom"))));
    }
}
