/// Uniform counter/gauge surface the manager emits through.
///
/// Metric names and tag keys are part of the external interface (§6) and
/// must stay byte-stable across implementations. The sink owns its own
/// concurrency; the core makes no ordering guarantee between calls.
pub trait MetricsSink: Send + Sync {
    fn incr_counter(&self, name: &str, tags: &[(&str, &str)], amount: u64);
    fn set_gauge(&self, name: &str, tags: &[(&str, &str)], value: i64);
}

/// The zero-cost default: every call is a no-op.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopMetricsSink;

impl MetricsSink for NoopMetricsSink {
    fn incr_counter(&self, _name: &str, _tags: &[(&str, &str)], _amount: u64) {}
    fn set_gauge(&self, _name: &str, _tags: &[(&str, &str)], _value: i64) {}
}

pub const METRIC_LANE_SELECTIONS: &str = "lane.selections";
pub const METRIC_LANE_IN_FLIGHT: &str = "lane.in_flight";
pub const METRIC_HOL_BLOCKING_ESTIMATED: &str = "hol.blocking.estimated";
pub const METRIC_LANES_TOTAL: &str = "lanes.total";
pub const METRIC_STRATEGY_CAS_RETRIES: &str = "strategy.cas.retries";
