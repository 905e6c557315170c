//! End-to-end use of the channel halves from separate threads.

mod common;

use common::{init_test_logging, settle};
use crossbeam_utils::sync::WaitGroup;
use guardsync::{Error, SharedSemaphore, channel};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;

#[test]
fn spsc_terminates_for_any_capacity() {
    init_test_logging();
    for capacity in [1, 2, 3, 5, 16] {
        let (tx, rx) = channel(capacity).unwrap();
        let producer = thread::Builder::new()
            .name(format!("producer-{capacity}"))
            .spawn(move || {
                for i in 1..=5 {
                    tx.send(i);
                }
            })
            .unwrap();
        let consumer = thread::Builder::new()
            .name(format!("consumer-{capacity}"))
            .spawn(move || (0..5).map(|_| rx.receive()).collect::<Vec<_>>())
            .unwrap();
        producer.join().unwrap();
        assert_eq!(consumer.join().unwrap(), [1, 2, 3, 4, 5]);
    }
}

#[test]
fn zero_capacity_channel_is_a_configuration_error() {
    init_test_logging();
    let err = channel::<()>(0).unwrap_err();
    assert_eq!(err, Error::ZeroCapacity);
    assert_eq!(err.to_string(), "bounded queue capacity must be at least 1");
}

#[test]
fn sender_blocks_until_receiver_makes_room() {
    init_test_logging();
    let (tx, rx) = channel(1).unwrap();
    tx.send(1);
    let producer = thread::spawn(move || tx.send(2));
    settle();
    assert!(!producer.is_finished());
    assert_eq!(rx.receive(), 1);
    producer.join().unwrap();
    assert_eq!(rx.try_receive(), Some(2));
    assert_eq!(rx.try_receive(), None);
}

#[test]
fn request_reply_over_two_channels() {
    init_test_logging();
    const REQUESTS: usize = 100;
    let (req_tx, req_rx) = channel::<usize>(4).unwrap();
    let (rep_tx, rep_rx) = channel::<usize>(4).unwrap();
    let served = Arc::new(AtomicUsize::new(0));
    let ready = SharedSemaphore::new(0);
    let wg = WaitGroup::new();

    {
        let (served, ready, wg) = (served.clone(), ready.clone(), wg.clone());
        thread::spawn(move || {
            ready.signal();
            for n in req_rx.iter().take(REQUESTS) {
                rep_tx.send(n * n);
                served.fetch_add(1, Ordering::SeqCst);
            }
            drop(wg);
        });
    }

    ready.wait();
    let client = thread::spawn(move || {
        let mut replies = Vec::with_capacity(REQUESTS);
        for n in 0..REQUESTS {
            req_tx.send(n);
            replies.push(rep_rx.receive());
        }
        replies
    });

    let replies = client.join().unwrap();
    wg.wait();
    assert_eq!(served.load(Ordering::SeqCst), REQUESTS);
    assert_eq!(replies, (0..REQUESTS).map(|n| n * n).collect::<Vec<_>>());
}
