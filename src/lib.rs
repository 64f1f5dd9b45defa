//! Consumer-facing facade over the lane-dispatch workspace.
//!
//! [`LaneManager::new`] (in `laned-core`) takes its strategy, metrics sink,
//! and connection name as separate positional arguments; that contract is
//! exactly right for the core crate, which must stay decoupled from any one
//! configuration shape, but it is unergonomic once a caller wants sane
//! defaults for most of them. [`LaneManagerBuilder`] is the `with_*`
//! builder a consumer reaches for first.

use std::marker::PhantomData;
use std::sync::Arc;

use laned_core::{
    LaneError, LaneManager, LaneManagerConfig, LeastUsedStrategy, MetricsSink, NoopMetricsSink,
    RoundRobinStrategy, SelectionStrategy, SelectionStrategyKind, ThreadAffinityStrategy,
};
use laned_driver::{Connection, PubSubConnection};

pub use laned_codec::{ClassifyCommand, CommandKind, RespVerbClassifier};
pub use laned_core::{Borrow, LaneManagerConfig as Config, PubSubBorrow};
pub use laned_driver::{ClientOptions, DisconnectedBehavior};

/// Builds the trait-object strategy a [`LaneManagerConfig`]'s
/// `strategy` field names (§10.3). The only place in this workspace that
/// maps the configuration enum onto a concrete [`SelectionStrategy`].
pub fn strategy_for_kind(kind: SelectionStrategyKind) -> Arc<dyn SelectionStrategy> {
    match kind {
        SelectionStrategyKind::RoundRobin => Arc::new(RoundRobinStrategy::new()),
        SelectionStrategyKind::ThreadAffinity => Arc::new(ThreadAffinityStrategy::new()),
        SelectionStrategyKind::LeastUsed => Arc::new(LeastUsedStrategy::new()),
    }
}

/// Glues a [`LaneManagerConfig`], a strategy factory, a driver's connection
/// types, and an optional metrics sink together behind a terminal
/// [`LaneManagerBuilder::build`].
///
/// `C` and `P` are the driver's command-connection and pub/sub-connection
/// types (see `laned_driver::Connection` / `PubSubConnection`); nothing here
/// is specific to any one driver implementation.
pub struct LaneManagerBuilder<C, P>
where
    C: Connection,
    P: PubSubConnection<Error = C::Error>,
{
    uri: String,
    config: LaneManagerConfig,
    metrics: Arc<dyn MetricsSink>,
    _connections: PhantomData<fn() -> (C, P)>,
}

impl<C, P> LaneManagerBuilder<C, P>
where
    C: Connection,
    P: PubSubConnection<Error = C::Error>,
{
    /// Starts from the documented defaults (§6): 8 lanes, round-robin,
    /// connection name `"default"`, a no-op metrics sink.
    pub fn new(uri: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            config: LaneManagerConfig::default(),
            metrics: Arc::new(NoopMetricsSink),
            _connections: PhantomData,
        }
    }

    /// Replaces the whole configuration struct at once (e.g. one
    /// deserialized from a config file by the integration layer).
    pub fn with_config(mut self, config: LaneManagerConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_num_lanes(mut self, num_lanes: u32) -> Self {
        self.config.num_lanes = num_lanes;
        self
    }

    pub fn with_strategy(mut self, strategy: SelectionStrategyKind) -> Self {
        self.config.strategy = strategy;
        self
    }

    pub fn with_connection_name(mut self, connection_name: impl Into<String>) -> Self {
        self.config.connection_name = connection_name.into();
        self
    }

    pub fn with_pubsub_warn_threshold(mut self, threshold: usize) -> Self {
        self.config.pubsub_warn_threshold = threshold;
        self
    }

    pub fn with_metrics(mut self, metrics: Arc<dyn MetricsSink>) -> Self {
        self.metrics = metrics;
        self
    }

    /// Opens `config.num_lanes` connections and returns the constructed
    /// manager, or a `ConfigurationInvalid`/`InitializationFailed` error
    /// (§7) without leaking any partially-opened lane.
    pub async fn build(self) -> Result<LaneManager<C, P>, LaneError<C::Error>> {
        let strategy = strategy_for_kind(self.config.strategy);
        tracing::debug!(
            strategy = strategy.name(),
            num_lanes = self.config.num_lanes,
            connection_name = %self.config.connection_name,
            "building lane manager"
        );
        LaneManager::new(
            self.uri,
            self.config.num_lanes,
            strategy,
            self.metrics,
            self.config.connection_name,
            self.config.pubsub_warn_threshold,
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use laned_driver::{MockConnection, MockPubSubConnection};

    #[tokio::test]
    async fn builder_applies_documented_defaults() {
        let manager = LaneManagerBuilder::<MockConnection, MockPubSubConnection>::new("redis://localhost:6379")
            .build()
            .await
            .unwrap();
        assert_eq!(manager.lane_count(), 8);
    }

    #[tokio::test]
    async fn builder_honors_overrides() {
        let manager = LaneManagerBuilder::<MockConnection, MockPubSubConnection>::new("redis://localhost:6379")
            .with_num_lanes(3)
            .with_strategy(SelectionStrategyKind::LeastUsed)
            .with_connection_name("cache")
            .build()
            .await
            .unwrap();
        assert_eq!(manager.lane_count(), 3);
    }

    #[tokio::test]
    async fn builder_rejects_invalid_lane_count() {
        let result = LaneManagerBuilder::<MockConnection, MockPubSubConnection>::new("redis://localhost:6379")
            .with_num_lanes(0)
            .build()
            .await;
        assert!(matches!(result, Err(LaneError::ConfigurationInvalid { .. })));
    }
}
