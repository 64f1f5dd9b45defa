use std::sync::Arc;

use laned_dsa::ClampedCounter;
use laned_driver::Connection;

use crate::metrics::{MetricsSink, METRIC_LANE_IN_FLIGHT};

/// One long-lived multiplexed connection, plus the bookkeeping the manager
/// needs to route and account for it.
///
/// `index` is stable for the lifetime of the lane: the driver's own reconnect
/// path may replace the connection underneath (not modeled here, since that
/// lives entirely inside `C`), but the `Lane` object's identity and position
/// in the manager's array never change.
pub struct Lane<C: Connection> {
    index: u32,
    connection: C,
    in_flight: ClampedCounter,
    metrics: Arc<dyn MetricsSink>,
    connection_name: Arc<str>,
}

impl<C: Connection> Lane<C> {
    pub fn new(index: u32, connection: C, metrics: Arc<dyn MetricsSink>, connection_name: Arc<str>) -> Self {
        Self {
            index,
            connection,
            in_flight: ClampedCounter::new(),
            metrics,
            connection_name,
        }
    }

    pub fn index(&self) -> u32 {
        self.index
    }

    pub fn connection(&self) -> &C {
        &self.connection
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight.get()
    }

    /// Infallible and wait-free: increments in-flight, emits the gauge.
    pub fn record_acquire(&self) {
        let value = self.in_flight.increment();
        self.emit_in_flight_gauge(value as i64);
    }

    /// Infallible and lock-free: clamped decrement, emits the gauge. Returns
    /// the number of CAS retries spent, for the `strategy.cas.retries` metric.
    pub fn record_release(&self) -> u32 {
        let outcome = self.in_flight.decrement();
        self.emit_in_flight_gauge(outcome.value as i64);
        outcome.retries
    }

    pub async fn is_open(&self) -> bool {
        self.connection.is_open().await
    }

    /// Idempotent; only the manager's destroy path may call this.
    pub async fn close(&self) -> Result<(), C::Error> {
        self.connection.close().await
    }

    fn emit_in_flight_gauge(&self, value: i64) {
        let lane_index = self.index.to_string();
        self.metrics.set_gauge(
            METRIC_LANE_IN_FLIGHT,
            &[("connection_name", &self.connection_name), ("lane_index", &lane_index)],
            value,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::NoopMetricsSink;
    use laned_driver::{ClientOptions, MockConnection};

    async fn make_lane(index: u32) -> Lane<MockConnection> {
        let connection = MockConnection::open("redis://localhost:6379", ClientOptions::fail_fast())
            .await
            .unwrap();
        Lane::new(index, connection, Arc::new(NoopMetricsSink), Arc::from("default"))
    }

    #[tokio::test]
    async fn acquire_and_release_balance() {
        let lane = make_lane(0).await;
        lane.record_acquire();
        lane.record_acquire();
        assert_eq!(lane.in_flight(), 2);
        lane.record_release();
        assert_eq!(lane.in_flight(), 1);
        lane.record_release();
        assert_eq!(lane.in_flight(), 0);
    }

    #[tokio::test]
    async fn release_clamps_at_zero() {
        let lane = make_lane(0).await;
        lane.record_release();
        lane.record_release();
        assert_eq!(lane.in_flight(), 0);
    }

    #[tokio::test]
    async fn is_open_reflects_connection_state() {
        let lane = make_lane(0).await;
        assert!(lane.is_open().await);
        lane.close().await.unwrap();
        assert!(!lane.is_open().await);
    }
}
