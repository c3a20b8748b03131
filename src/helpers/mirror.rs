//! # Independent copy of an emitter.
//!
//! [`mirror`] returns a new [`Emitter`] that repeats every future settlement of
//! the source: activations and deactivations are forwarded as-is, and a source
//! cancellation is forwarded once before mirroring stops. History is not
//! replayed.
//!
//! The mirror is independent: settling it never reaches the source.

use tokio_util::sync::CancellationToken;

use crate::chain::Listener;
use crate::config::Config;
use crate::emitter::sealed::Sealed;
use crate::emitter::{Emitter, Listen};
use crate::error::EmitError;

/// Creates an emitter mirroring the future settlements of `source`.
pub fn mirror<T, L>(source: &L) -> Emitter<T>
where
    T: Clone + Send + 'static,
    L: Listen<T>,
{
    mirror_until(source, CancellationToken::new())
}

/// [`mirror`] that stops forwarding once `token` is cancelled.
pub fn mirror_until<T, L>(source: &L, token: CancellationToken) -> Emitter<T>
where
    T: Clone + Send + 'static,
    L: Listen<T>,
{
    let config = Config {
        name: Some(format!("{}-mirror", source.name()).into()),
        ..source.chain().config().clone()
    };
    let mirrored = Emitter::with_config(config);

    let on_value = {
        let target = mirrored.clone();
        move |value: T| {
            target.chain().settle(Ok(value));
        }
    };
    let on_error = {
        let target = mirrored.clone();
        move |err: EmitError| {
            target.chain().settle(Err(err));
        }
    };

    let _listening = Listener::forever(on_value)
        .on_error(on_error)
        .resume_after_error()
        .report_cancellation()
        .until(token)
        .attach(source.chain());
    mirrored
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::slot::SlotStatus;
    use crate::{Broadcast, QueueEmitter};

    #[test]
    fn forwards_future_settlements_only() {
        let source = Emitter::named("src");
        source.activate(1);
        let copy = mirror(&source);
        assert_eq!(copy.name(), "src-mirror");

        source.activate(2).deactivate("boom").activate(3);
        assert_eq!(copy.count(), 3);
        assert_eq!(copy.status(0), Some(SlotStatus::Activated));
        assert_eq!(copy.status(1), Some(SlotStatus::Deactivated));
        assert_eq!(copy.previous().unwrap().unwrap(), 3);
    }

    #[test]
    fn cancellation_is_forwarded_then_mirroring_stops() {
        let source = QueueEmitter::new();
        let copy = mirror(&source);
        source.activate(1).cancel().activate(2);
        assert_eq!(copy.count(), 2);
        assert_eq!(copy.status(1), Some(SlotStatus::Cancelled));
    }

    #[test]
    fn mirror_is_independent() {
        let source = Emitter::<u8>::new();
        let copy = mirror(&source);
        copy.activate(9);
        assert_eq!(source.count(), 0);
    }
}
