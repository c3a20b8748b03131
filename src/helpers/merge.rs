//! # Fan-in of several emitters.
//!
//! [`Merge`] forwards the activations of N named sources into one
//! `Emitter<Tagged<U>>`:
//!
//! ```text
//! clicks ──activate(c)──┐
//!                       ├──► merged.activate(Tagged { name: "clicks", value })
//! keys ───activate(k)───┘
//!
//! source deactivates ──► merged.deactivate(EmitError::Merged { name, source })
//!                        (that source is no longer forwarded)
//! source cancels ──────► absorbed (that source is no longer forwarded)
//! ```
//!
//! Merging is eager: sources are subscribed while the builder is assembled.
//! [`Merge::token`] returns a token that detaches every source at once.

use std::fmt;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::chain::Listener;
use crate::config::Config;
use crate::emitter::sealed::Sealed;
use crate::emitter::{Broadcast, Emitter, Listen};
use crate::error::EmitError;

/// An activation tagged with the name of the source that produced it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Tagged<T> {
    /// Name the source was registered under.
    pub name: Arc<str>,
    /// The forwarded value.
    pub value: T,
}

/// Builder merging several emitters into one.
///
/// ## Example
/// ```
/// use tidings::{Broadcast, Emitter, Listen};
/// use tidings::helpers::Merge;
///
/// let clicks = Emitter::new();
/// let keys = Emitter::new();
/// let merged = Merge::new()
///     .source("clicks", &clicks)
///     .source_with("keys", &keys, |k: char| k as u32)
///     .build();
///
/// clicks.activate(7u32);
/// keys.activate('a');
/// assert_eq!(merged.count(), 2);
/// ```
pub struct Merge<U> {
    output: Emitter<Tagged<U>>,
    token: CancellationToken,
}

impl<U: Clone + Send + 'static> Merge<U> {
    /// Starts a merge into an emitter named `"merged"`.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(Config::named("merged"))
    }

    /// Starts a merge into an emitter built from `config`.
    #[must_use]
    pub fn with_config(config: Config) -> Self {
        Self {
            output: Emitter::with_config(config),
            token: CancellationToken::new(),
        }
    }

    /// Adds a source with the same payload type.
    pub fn source<L>(self, name: impl Into<Arc<str>>, source: &L) -> Self
    where
        L: Listen<U>,
    {
        self.source_with(name, source, |value| value)
    }

    /// Adds a source whose payload is converted with `map`.
    pub fn source_with<S, L, F>(self, name: impl Into<Arc<str>>, source: &L, mut map: F) -> Self
    where
        S: Clone + Send + 'static,
        L: Listen<S>,
        F: FnMut(S) -> U + Send + 'static,
    {
        let name: Arc<str> = name.into();

        let on_value = {
            let output = self.output.clone();
            let name = Arc::clone(&name);
            move |value: S| {
                output.activate(Tagged {
                    name: Arc::clone(&name),
                    value: map(value),
                });
            }
        };
        let on_error = {
            let output = self.output.clone();
            move |err: EmitError| {
                output.chain().settle(Err(EmitError::Merged {
                    name: Arc::clone(&name),
                    source: Box::new(err),
                }));
            }
        };

        let _listening = Listener::forever(on_value)
            .on_error(on_error)
            .until(self.token.child_token())
            .attach(source.chain());
        self
    }

    /// Token that detaches every source when cancelled.
    pub fn token(&self) -> CancellationToken {
        self.token.clone()
    }

    /// Returns the merged emitter.
    pub fn build(self) -> Emitter<Tagged<U>> {
        self.output
    }
}

impl<U: Clone + Send + 'static> Default for Merge<U> {
    fn default() -> Self {
        Self::new()
    }
}

impl<U: Clone + Send + 'static> fmt::Debug for Merge<U> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Merge")
            .field("output", &self.output)
            .finish_non_exhaustive()
    }
}

/// Merges same-typed sources given as `(name, emitter)` pairs.
pub fn merge<'a, T, L, N, I>(sources: I) -> Emitter<Tagged<T>>
where
    T: Clone + Send + 'static,
    L: Listen<T> + 'a,
    N: Into<Arc<str>>,
    I: IntoIterator<Item = (N, &'a L)>,
{
    sources
        .into_iter()
        .fold(Merge::new(), |merge, (name, source)| merge.source(name, source))
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::QueueEmitter;
    use std::sync::Mutex;

    #[test]
    fn tags_each_activation_with_its_source() {
        let a = Emitter::new();
        let b = QueueEmitter::new();
        let merged = Merge::new().source("a", &a).source("b", &b).build();

        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let _listening = merged.on(move |t: Tagged<u8>| {
            sink.lock().unwrap().push((t.name.to_string(), t.value));
        });

        a.activate(1);
        b.activate(2);
        a.activate(3);
        assert_eq!(
            *seen.lock().unwrap(),
            vec![("a".into(), 1), ("b".into(), 2), ("a".into(), 3)]
        );
    }

    #[test]
    fn source_failure_is_tagged_and_stops_that_source() {
        let a = Emitter::<u8>::new();
        let b = Emitter::<u8>::new();
        let merged = merge([("a", &a), ("b", &b)]);

        a.deactivate("boom");
        a.activate(1);
        b.cancel();
        b.activate(2);

        assert_eq!(merged.count(), 1);
        let err = merged.previous().unwrap().unwrap_err();
        assert_eq!(err.source_name(), Some("a"));
        assert_eq!(err.as_label(), "emitter_merged_deactivated");
    }

    #[test]
    fn token_detaches_all_sources() {
        let a = Emitter::<u8>::new();
        let merge = Merge::new().source("a", &a);
        let token = merge.token();
        let merged = merge.build();

        a.activate(1);
        token.cancel();
        a.activate(2);
        assert_eq!(merged.count(), 1);
    }
}
