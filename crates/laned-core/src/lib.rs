//! Fixed-size multiplexed connection lanes for a RESP (Redis-protocol)
//! driver: a pluggable lane-selection strategy, per-lane in-flight
//! accounting, transaction-affinity pinning, and a dedicated pub/sub
//! connection tracker, mitigating head-of-line blocking on a single
//! positional TCP connection.
//!
//! This crate never opens a socket itself (see [`laned_driver`]), never
//! encodes or decodes RESP (see `laned_codec` for the transaction-affinity
//! fallback classifier only), and never routes across cluster shards. Those
//! are explicitly out of scope; a composition wrapping several
//! [`LaneManager`]s is a future layer, not this one.

pub mod caller;
pub mod config;
pub mod error;
pub mod lane;
pub mod manager;
pub mod metrics;
pub mod pubsub;
pub mod strategy;

pub use config::{LaneManagerConfig, SelectionStrategyKind, MAX_LANES, MIN_LANES};
pub use error::{LaneError, PubSubReleaseNonmember};
pub use lane::Lane;
pub use manager::{Borrow, LaneManager, PubSubBorrow};
pub use metrics::{MetricsSink, NoopMetricsSink};
pub use pubsub::{PubSubHandle, PubSubTracker};
pub use strategy::{LaneLoadView, LeastUsedStrategy, RoundRobinStrategy, SelectionStrategy, ThreadAffinityStrategy};
