//! §8 property 9: least-used's mirrored in-flight counter under 10^4
//! concurrent releases on one lane, starting from `in_flight = 10^4`, must
//! land at exactly 0 — no decrement lost, no value left negative.

use std::sync::Arc;
use std::thread;

use laned_dsa::ClampedCounter;

const CONCURRENT_RELEASERS: usize = 16;

#[test]
fn ten_thousand_concurrent_releases_drain_to_exactly_zero() {
    const N: usize = 10_000;
    let counter = Arc::new(ClampedCounter::new());
    counter.set(N);

    let per_thread = N / CONCURRENT_RELEASERS;
    let handles: Vec<_> = (0..CONCURRENT_RELEASERS)
        .map(|_| {
            let counter = counter.clone();
            thread::spawn(move || {
                for _ in 0..per_thread {
                    counter.decrement();
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(counter.get(), 0);
}

#[test]
fn releases_past_zero_never_go_negative_even_with_excess_releasers() {
    const STARTING: usize = 1_000;
    const RELEASES_PER_THREAD: usize = 250;
    let counter = Arc::new(ClampedCounter::new());
    counter.set(STARTING);

    let handles: Vec<_> = (0..CONCURRENT_RELEASERS)
        .map(|_| {
            let counter = counter.clone();
            thread::spawn(move || {
                let mut outcomes = Vec::with_capacity(RELEASES_PER_THREAD);
                for _ in 0..RELEASES_PER_THREAD {
                    outcomes.push(counter.decrement());
                }
                outcomes
            })
        })
        .collect();

    for handle in handles {
        for outcome in handle.join().unwrap() {
            assert!(outcome.value <= STARTING, "decrement produced an out-of-range value: {outcome:?}");
        }
    }

    assert_eq!(counter.get(), 0);
}
