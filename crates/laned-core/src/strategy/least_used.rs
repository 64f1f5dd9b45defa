use std::sync::{Arc, OnceLock};

use super::{LaneLoadView, SelectionStrategy};

/// Scans every lane's in-flight counter and picks the lowest, ties broken by
/// smallest index. Best-effort: the counter observed may already be stale by
/// the time the caller's borrow is issued.
///
/// Reads the lane array's own in-flight counters directly rather than
/// mirroring a separate count inside the strategy, so there is only ever one
/// counter per lane to keep consistent, not two that could drift apart (see
/// `DESIGN.md`). Consequently `on_connection_acquired`/`on_connection_released`
/// stay the trait's no-op default: there is nothing left for this strategy to
/// mirror.
#[derive(Default)]
pub struct LeastUsedStrategy {
    lanes: OnceLock<Arc<dyn LaneLoadView>>,
}

impl LeastUsedStrategy {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SelectionStrategy for LeastUsedStrategy {
    fn select_lane(&self, n: u32) -> u32 {
        let lanes = self.lanes.get().expect("LeastUsedStrategy used before initialize()");
        debug_assert_eq!(lanes.lane_count(), n as usize);
        let mut best_index = 0u32;
        let mut best_load = usize::MAX;
        for i in 0..n {
            let load = lanes.in_flight(i as usize);
            if load < best_load {
                best_load = load;
                best_index = i;
            }
        }
        best_index
    }

    fn name(&self) -> &'static str {
        "least-used"
    }

    fn initialize(&self, lanes: Arc<dyn LaneLoadView>) {
        let _ = self.lanes.set(lanes);
    }
}
