//! # Example: Draining Text Log
//!
//! A producer task appends log lines to a [`QueueEmitter`]; a consumer tails
//! them as a stream until a shutdown token fires. The queue releases consumed
//! lines, so its backlog stays small no matter how many lines were written.
//!
//! Run with: `RUST_LOG=tidings=trace cargo run --example text_log`

use std::time::Duration;

use futures::StreamExt;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use tidings::prelude::*;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let log = QueueEmitter::<String>::named("text-log");
    let drainer = log.spawn_drainer(Duration::from_millis(50));
    let shutdown = CancellationToken::new();

    // Tail: started before the producer, so it sees every line.
    let mut lines = log.future().until(shutdown.clone());
    let tail = tokio::spawn(async move {
        let mut seen = 0usize;
        while let Some(line) = lines.next().await {
            match line {
                Ok(line) => {
                    seen += 1;
                    println!("[tail] {line}");
                }
                Err(err) => {
                    println!("[tail] stopped: {err}");
                    break;
                }
            }
        }
        seen
    });

    let producer = {
        let log = log.clone();
        tokio::spawn(async move {
            for n in 1..=20 {
                log.activate(format!("line {n}"));
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
    };

    producer.await?;
    println!("[main] written={} backlog={}", log.count(), log.backlog());

    shutdown.cancel();
    let seen = tail.await?;
    drainer.join().await;
    println!("[main] tail saw {seen} lines, backlog now {}", log.backlog());
    Ok(())
}
