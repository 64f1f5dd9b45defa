//! Round-robin distribution and overflow scenarios (§8, concrete scenarios
//! 1 and 2): the sequence converges to exactly uniform without contention,
//! and the sequence produced right across the counter's overflow point
//! stays a contiguous cyclic progression with no gap, skew, or sign flip.

use laned_core::strategy::{RoundRobinStrategy, SelectionStrategy};

#[test]
fn round_robin_distribution_is_exactly_uniform_over_1000_calls() {
    let strategy = RoundRobinStrategy::new();
    let n = 8u32;
    let mut counts = [0u32; 8];
    for _ in 0..1000 {
        counts[strategy.select_lane(n) as usize] += 1;
    }
    assert!(counts.iter().all(|&c| c == 125), "counts: {counts:?}");
}

#[test]
fn round_robin_overflow_produces_a_contiguous_cyclic_progression() {
    use laned_dsa::WrappingCounter;

    // Drive the strategy's underlying counter right up to the edge of its
    // range the way the strategy itself would construct one, since the
    // strategy doesn't expose a way to force its counter directly.
    let counter = WrappingCounter::new();
    counter.force(i32::MAX as u32 - 10);

    let n = 8u32;
    let got: Vec<u32> = (0..20).map(|_| counter.next_index(n)).collect();
    for window in got.windows(2) {
        let (a, b) = (window[0], window[1]);
        assert_eq!((a + 1) % n, b, "expected a contiguous cyclic step from {a} to {b}");
    }
    // no duplicates between adjacent calls, no value outside [0, n)
    assert!(got.iter().all(|&v| v < n));
}

#[test]
fn round_robin_single_thread_produces_the_canonical_cyclic_sequence() {
    let strategy = RoundRobinStrategy::new();
    let got: Vec<u32> = (0..12).map(|_| strategy.select_lane(5)).collect();
    assert_eq!(got, vec![0, 1, 2, 3, 4, 0, 1, 2, 3, 4, 0, 1]);
}

#[test]
fn every_lane_is_returned_exactly_k_times_for_k_times_n_calls() {
    for &n in &[1u32, 2, 4, 7, 8, 16, 32, 64] {
        let strategy = RoundRobinStrategy::new();
        let k = 11u32;
        let mut counts = vec![0u32; n as usize];
        for _ in 0..(n * k) {
            counts[strategy.select_lane(n) as usize] += 1;
        }
        assert!(counts.iter().all(|&c| c == k), "n={n}, counts={counts:?}");
    }
}
