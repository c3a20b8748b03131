//! # Example: Merged Input Sources
//!
//! Two independent sources (mouse clicks and key presses) are merged into one
//! tagged emitter. A callback prints every merged event, and `filter_value`
//! waits for the `q` key before shutting down.

use std::time::Duration;

use tidings::helpers::{Merge, Tagged, filter_value};
use tidings::prelude::*;

#[derive(Clone, Debug)]
enum Input {
    Click { x: i32, y: i32 },
    Key(char),
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let clicks = Emitter::<(i32, i32)>::named("clicks");
    let keys = QueueEmitter::<char>::named("keys");

    let merged = Merge::new()
        .source_with("clicks", &clicks, |(x, y)| Input::Click { x, y })
        .source_with("keys", &keys, Input::Key)
        .build();

    let printer = merged.on(|Tagged { name, value }| match value {
        Input::Click { x, y } => println!("[{name}] click at ({x}, {y})"),
        Input::Key(key) => println!("[{name}] key {key:?}"),
    });
    let quit = filter_value(&keys, 'q');

    let producer = {
        let (clicks, keys) = (clicks.clone(), keys.clone());
        tokio::spawn(async move {
            clicks.activate((10, 20));
            keys.activate('h');
            tokio::time::sleep(Duration::from_millis(20)).await;
            clicks.activate((30, 40));
            keys.activate('q');
        })
    };

    if quit.await? {
        println!("[main] quit requested");
    }
    producer.await?;

    merged.cancel();
    printer.await?;
    println!("[main] merged {} events", merged.count() - 1);
    Ok(())
}
