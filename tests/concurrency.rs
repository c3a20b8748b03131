use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use futures::StreamExt;
use tidings::helpers::{bind_broadcast, filter_value, mirror};
use tidings::prelude::*;
use tokio::sync::broadcast;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_producers_lose_nothing() {
    let emitter = QueueEmitter::<u64>::new();
    let sum = Arc::new(AtomicU64::new(0));
    let hits = Arc::new(AtomicU64::new(0));

    let listening = {
        let (sum, hits) = (sum.clone(), hits.clone());
        emitter.on(move |v| {
            sum.fetch_add(v, Ordering::SeqCst);
            hits.fetch_add(1, Ordering::SeqCst);
        })
    };

    let producers: Vec<_> = (0..4u64)
        .map(|p| {
            let emitter = emitter.clone();
            tokio::spawn(async move {
                for i in 0..250u64 {
                    emitter.activate(p * 1_000 + i);
                    if i % 50 == 0 {
                        tokio::task::yield_now().await;
                    }
                }
            })
        })
        .collect();
    for producer in producers {
        producer.await.unwrap();
    }
    emitter.cancel();
    listening.await.unwrap();

    let expected: u64 = (0..4u64)
        .flat_map(|p| (0..250u64).map(move |i| p * 1_000 + i))
        .sum();
    assert_eq!(emitter.count(), 1_001);
    assert_eq!(hits.load(Ordering::SeqCst), 1_000);
    assert_eq!(sum.load(Ordering::SeqCst), expected);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_stream_consumer_keeps_order_across_threads() {
    let emitter = QueueEmitter::new();
    let events = emitter.future();

    let consumer = tokio::spawn(async move {
        events
            .take_while(|item| futures::future::ready(item.is_ok()))
            .map(Result::unwrap)
            .collect::<Vec<u32>>()
            .await
    });

    for i in 0..500u32 {
        emitter.activate(i);
    }
    emitter.deactivate("done");

    let seen = consumer.await.unwrap();
    assert_eq!(seen, (0..500).collect::<Vec<_>>());
}

#[tokio::test]
async fn test_gate_wakes_every_waiter() {
    let gate = Gate::<&'static str>::new();
    let waiters: Vec<_> = (0..8)
        .map(|_| {
            let gate = gate.clone();
            tokio::spawn(async move { gate.await })
        })
        .collect();

    tokio::task::yield_now().await;
    gate.activate("go");
    for waiter in waiters {
        assert_eq!(waiter.await.unwrap().unwrap(), "go");
    }
}

#[tokio::test]
async fn test_next_can_be_raced_with_a_timeout() {
    let emitter = Emitter::<u8>::new();
    let timed_out = tokio::time::timeout(Duration::from_millis(10), emitter.next()).await;
    assert!(timed_out.is_err());
    assert_eq!(emitter.count(), 0);
}

#[tokio::test]
async fn test_filter_over_a_bound_broadcast() {
    let (tx, rx) = broadcast::channel(16);
    let emitter = Emitter::new();
    let copy = mirror(&emitter);
    let found = filter_value(&copy, 3u8);
    let binding = bind_broadcast(&emitter, rx);

    for i in 0..5u8 {
        tx.send(i).unwrap();
    }
    assert!(found.await.unwrap());

    binding.unbind();
    binding.join().await;
    assert!(emitter.is_alive());
}
