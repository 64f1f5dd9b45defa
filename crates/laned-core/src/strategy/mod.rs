//! Pluggable lane-selection strategies (§4.2).
//!
//! All three variants implement [`SelectionStrategy`]; `select_lane` is the
//! one call on every command's hot path and must stay infallible and
//! thread-safe. Only [`LeastUsedStrategy`] needs a non-owning view of the
//! lane array, through [`LaneLoadView`]; round-robin and thread-affinity
//! ignore `initialize` entirely.

mod least_used;
mod round_robin;
mod thread_affinity;

use std::sync::Arc;

pub use least_used::LeastUsedStrategy;
pub use round_robin::RoundRobinStrategy;
pub use thread_affinity::ThreadAffinityStrategy;

/// A read-only view onto a lane array's in-flight counters, captured by a
/// strategy during two-phase initialization. Never grants ownership: a
/// strategy must never be able to open, close, or replace a lane.
pub trait LaneLoadView: Send + Sync {
    fn lane_count(&self) -> usize;
    fn in_flight(&self, index: usize) -> usize;
}

pub trait SelectionStrategy: Send + Sync {
    /// Picks an index in `[0, n)`. Must be infallible and thread-safe.
    /// Design obligation (not test-enforced): < 50ns per call, 500ns ceiling.
    fn select_lane(&self, n: u32) -> u32;

    /// Stable identifier used as a metrics dimension.
    fn name(&self) -> &'static str;

    /// Lifecycle hook; default no-op. Only [`LeastUsedStrategy`] overrides
    /// this, and even then only because the single in-flight counter is
    /// owned by the lane, not mirrored separately here (see `DESIGN.md`'s
    /// note on the collapsed-counter decision).
    fn on_connection_acquired(&self, _lane_index: u32) {}

    /// Lifecycle hook; default no-op.
    fn on_connection_released(&self, _lane_index: u32) {}

    /// Optional two-phase init: strategies that need lane references capture
    /// a non-owning view here, after construction but before first use.
    fn initialize(&self, _lanes: Arc<dyn LaneLoadView>) {}
}
