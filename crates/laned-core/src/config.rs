use serde::Deserialize;

/// Which concrete [`crate::strategy::SelectionStrategy`] the manager builds.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum SelectionStrategyKind {
    RoundRobin,
    ThreadAffinity,
    LeastUsed,
}

impl Default for SelectionStrategyKind {
    fn default() -> Self {
        Self::RoundRobin
    }
}

/// Recognized configuration options (§6), mirrored 1:1 against the table in
/// the driver-contract documentation.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct LaneManagerConfig {
    /// Fixes N at construction. Must be in `1..=64`.
    pub num_lanes: u32,
    pub strategy: SelectionStrategyKind,
    /// Dimensional tag attached to every metric this manager emits.
    pub connection_name: String,
    /// Soft warning threshold for the pub/sub tracker's active handle count.
    pub pubsub_warn_threshold: usize,
    /// Cap on distinct cached gauge/counter instances, if the sink caches them.
    pub metrics_cache_max: usize,
}

impl Default for LaneManagerConfig {
    fn default() -> Self {
        Self {
            num_lanes: 8,
            strategy: SelectionStrategyKind::RoundRobin,
            connection_name: "default".to_string(),
            pubsub_warn_threshold: 100,
            metrics_cache_max: 1000,
        }
    }
}

pub const MIN_LANES: u32 = 1;
pub const MAX_LANES: u32 = 64;

// §3: "1 <= N <= 64" is a load-bearing bound for the pin table and the
// `lane_index` dimension on every emitted metric; catch a typo in either
// constant at compile time rather than at the first out-of-range construction.
static_assertions::const_assert!(MIN_LANES <= MAX_LANES);
static_assertions::const_assert!(MIN_LANES >= 1);
