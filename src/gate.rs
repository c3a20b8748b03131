//! # Single-shot gate.
//!
//! [`Gate`] settles exactly once. The first of `activate`, `deactivate` or
//! `cancel` wins; every later call is a no-op that returns `false`.
//!
//! Use it for exactly-one-event protocols: a handshake completing, a shutdown
//! request, a configuration becoming ready.
//!
//! ```text
//!           activate(v) ──► triggered, Activated(v)
//! pending ─ deactivate(e) ► triggered, Deactivated(e)   later calls: ignored
//!           cancel() ─────► triggered, Cancelled
//! ```
//!
//! ## Example
//! ```
//! use tidings::Gate;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let ready = Gate::new();
//! let waiter = ready.clone();
//! let task = tokio::spawn(async move { waiter.await });
//!
//! assert!(ready.activate("v1"));
//! assert!(!ready.activate("v2"));
//! assert_eq!(task.await.unwrap().unwrap(), "v1");
//! # }
//! ```

use std::fmt;
use std::future::IntoFuture;
use std::sync::Arc;

use crate::chain::{Chain, Listener, Listening, Retention};
use crate::config::Config;
use crate::error::{BoxError, EmitError};
use crate::policies::TerminationPolicy;
use crate::slot::{SlotFuture, SlotStatus};

/// Emitter that settles once.
///
/// Cloning yields another handle to the same gate. Awaiting a gate (or
/// [`Gate::wait`]) yields the value, or the error on deactivation and
/// cancellation.
pub struct Gate<T> {
    chain: Arc<Chain<T>>,
}

impl<T: Clone + Send + 'static> Gate<T> {
    /// Creates a pending gate.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    /// Creates a pending gate whose logs carry `name`.
    #[must_use]
    pub fn named(name: impl Into<Arc<str>>) -> Self {
        Self::with_config(Config::named(name))
    }

    /// Creates a pending gate from `config`.
    ///
    /// The termination policy is always [`TerminationPolicy::Always`].
    #[must_use]
    pub fn with_config(config: Config) -> Self {
        let config = Config {
            termination: TerminationPolicy::Always,
            ..config
        };
        Self {
            chain: Chain::new(config, Retention::Append),
        }
    }

    /// Creates a gate with listeners attached up front.
    ///
    /// Each listener is called once with the activation value. Their
    /// completion handles are not kept, so a deactivation is only logged.
    pub fn with_listeners<I, F>(listeners: I) -> Self
    where
        I: IntoIterator<Item = F>,
        F: FnOnce(T) + Send + 'static,
    {
        let gate = Self::new();
        for listener in listeners {
            let _listening = gate.once(listener);
        }
        gate
    }

    /// Settles the gate with `value`. Returns `false` if already settled.
    pub fn activate(&self, value: T) -> bool {
        self.chain.settle(Ok(value))
    }

    /// Settles the gate with a deactivation. Returns `false` if already settled.
    pub fn deactivate(&self, reason: impl Into<BoxError>) -> bool {
        self.chain.settle(Err(EmitError::deactivated(reason)))
    }

    /// Settles the gate with a cancellation. Returns `false` if already settled.
    pub fn cancel(&self) -> bool {
        self.chain.settle(Err(EmitError::cancelled()))
    }

    /// Like [`cancel`](Self::cancel), with a message.
    pub fn cancel_with(&self, message: impl Into<Arc<str>>) -> bool {
        self.chain.settle(Err(EmitError::cancelled_with(message)))
    }

    /// Whether the gate has settled (in any way).
    pub fn triggered(&self) -> bool {
        !self.chain.is_alive()
    }

    /// Whether the gate settled by deactivation.
    pub fn deactivated(&self) -> bool {
        self.status() == SlotStatus::Deactivated
    }

    /// Whether the gate settled by cancellation.
    pub fn cancelled(&self) -> bool {
        self.status() == SlotStatus::Cancelled
    }

    /// Status of the single slot; `Pending` until the first settlement.
    pub fn status(&self) -> SlotStatus {
        self.chain.status(0).unwrap_or(SlotStatus::Pending)
    }

    /// The settlement, if any, without waiting.
    pub fn outcome(&self) -> Option<Result<T, EmitError>> {
        self.chain.previous()
    }

    /// Future of the settlement.
    pub fn wait(&self) -> SlotFuture<T> {
        self.chain.next()
    }

    /// Calls `f` with the activation value.
    ///
    /// Registering on a settled gate runs `f` right away. A deactivation is
    /// reported through the returned handle; a cancellation is swallowed.
    pub fn once(&self, f: impl FnOnce(T) + Send + 'static) -> Listening {
        Listener::once(f).attach(&self.chain)
    }

    /// Calls `err_f` if the gate is deactivated. Activations and cancellations
    /// are ignored.
    pub fn catch(&self, err_f: impl FnOnce(EmitError) + Send + 'static) -> Listening {
        let mut err_f = Some(err_f);
        Listener::once(|_| {})
            .on_error(move |err| {
                if let Some(f) = err_f.take() {
                    f(err);
                }
            })
            .attach(&self.chain)
    }
}

impl Gate<()> {
    /// Activates a unit gate.
    pub fn trigger(&self) -> bool {
        self.activate(())
    }
}

impl<T: Clone + Send + 'static> IntoFuture for Gate<T> {
    type Output = Result<T, EmitError>;
    type IntoFuture = SlotFuture<T>;

    fn into_future(self) -> Self::IntoFuture {
        self.wait()
    }
}

impl<T: Clone + Send + 'static> IntoFuture for &Gate<T> {
    type Output = Result<T, EmitError>;
    type IntoFuture = SlotFuture<T>;

    fn into_future(self) -> Self::IntoFuture {
        self.wait()
    }
}

impl<T> Clone for Gate<T> {
    fn clone(&self) -> Self {
        Self {
            chain: Arc::clone(&self.chain),
        }
    }
}

impl<T: Clone + Send + 'static> Default for Gate<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone + Send + 'static> fmt::Debug for Gate<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Gate")
            .field("name", &self.chain.label())
            .field("status", &self.status())
            .finish()
    }
}
