//! # Example: Handshake Gate
//!
//! A connection emits frames; a [`Gate`] completes exactly once when the
//! handshake frame arrives. Every frame is also fanned out to the built-in
//! `LogWriter` subscriber.
//!
//! Run with: `cargo run --example handshake --features logging`

use std::sync::Arc;
use std::time::Duration;

use tidings::prelude::*;
use tidings::{LogWriter, Subscribe};
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let frames = Emitter::<String>::named("frames");
    let subs: Vec<Arc<dyn Subscribe<String>>> = vec![Arc::new(LogWriter::new())];
    let logging = frames.subscribe(subs);

    let handshake = Gate::<String>::named("handshake");
    let _watch = {
        let handshake = handshake.clone();
        frames.on_continue_after_error(
            move |frame| {
                if let Some(session) = frame.strip_prefix("HELLO ") {
                    handshake.activate(session.to_string());
                }
            },
            |_| {},
        )
    };
    let _failed = handshake.catch(|err| eprintln!("[handshake] failed: {err}"));

    let connection = {
        let frames = frames.clone();
        tokio::spawn(async move {
            frames.activate("PING".into());
            frames.deactivate("checksum mismatch");
            tokio::time::sleep(Duration::from_millis(10)).await;
            frames.activate("HELLO s-42".into());
            frames.activate("HELLO s-43".into()); // ignored by the gate
        })
    };

    match tokio::time::timeout(Duration::from_secs(1), &handshake).await {
        Ok(Ok(session)) => println!("[main] handshake complete: session={session}"),
        Ok(Err(err)) => println!("[main] handshake failed: {err}"),
        Err(_) => println!("[main] handshake timed out"),
    }

    connection.await?;
    frames.cancel();
    logging.shutdown().await;
    Ok(())
}
