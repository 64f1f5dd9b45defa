use laned_dsa::WrappingCounter;

use super::SelectionStrategy;

/// Monotonic atomic counter, load-and-increment, wrap-safe past `u32::MAX`.
#[derive(Debug, Default)]
pub struct RoundRobinStrategy {
    counter: WrappingCounter,
}

impl RoundRobinStrategy {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SelectionStrategy for RoundRobinStrategy {
    fn select_lane(&self, n: u32) -> u32 {
        self.counter.next_index(n)
    }

    fn name(&self) -> &'static str {
        "round-robin"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_thread_sequence_is_cyclic() {
        let strategy = RoundRobinStrategy::new();
        let got: Vec<u32> = (0..10).map(|_| strategy.select_lane(4)).collect();
        assert_eq!(got, vec![0, 1, 2, 3, 0, 1, 2, 3, 0, 1]);
    }

    #[test]
    fn every_lane_selected_exactly_k_times() {
        let strategy = RoundRobinStrategy::new();
        let n = 7u32;
        let k = 11u32;
        let mut counts = vec![0u32; n as usize];
        for _ in 0..(n * k) {
            counts[strategy.select_lane(n) as usize] += 1;
        }
        assert!(counts.iter().all(|&c| c == k));
    }

    #[test]
    fn name_is_stable() {
        assert_eq!(RoundRobinStrategy::new().name(), "round-robin");
    }
}
