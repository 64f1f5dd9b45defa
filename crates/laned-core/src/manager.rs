//! The lane manager (§4.4): holds the lane array, runs the selection
//! strategy, enforces the destroy life-cycle, routes pub/sub traffic away
//! from the command lanes, and maintains the transaction-affinity pin table.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use dashmap::DashMap;
use laned_codec::{ClassifyCommand, CommandKind};
use laned_driver::{ClientOptions, Connection, PubSubConnection};

use crate::caller::current_identity;
use crate::error::LaneError;
use crate::lane::Lane;
use crate::metrics::{
    MetricsSink, METRIC_HOL_BLOCKING_ESTIMATED, METRIC_LANES_TOTAL, METRIC_LANE_SELECTIONS,
    METRIC_STRATEGY_CAS_RETRIES,
};
use crate::pubsub::{PubSubHandle, PubSubTracker};
use crate::strategy::{LaneLoadView, SelectionStrategy};

/// Non-owning view onto a manager's lane array, handed to a strategy during
/// two-phase init. Exists only so `LeastUsedStrategy` can read in-flight
/// counters; it grants no ability to open, close, or replace a lane.
struct LaneArrayView<C: Connection>(Vec<Arc<Lane<C>>>);

impl<C: Connection> LaneLoadView for LaneArrayView<C> {
    fn lane_count(&self) -> usize {
        self.0.len()
    }

    fn in_flight(&self, index: usize) -> usize {
        self.0[index].in_flight()
    }
}

/// A scoped right to issue commands on a specific lane (§3). Its `Drop` impl
/// guarantees release on every exit path (normal return, early return, or
/// panic-driven unwind); an explicit `release` is also offered and is
/// idempotent with the automatic one.
pub struct Borrow<C: Connection> {
    manager: Arc<LaneManagerInner<C>>,
    lane_index: u32,
    released: AtomicBool,
}

impl<C: Connection> Borrow<C> {
    fn new(manager: Arc<LaneManagerInner<C>>, lane_index: u32) -> Self {
        Self { manager, lane_index, released: AtomicBool::new(false) }
    }

    pub fn lane_index(&self) -> u32 {
        self.lane_index
    }

    /// The underlying driver's command API, unchanged. Never exposes a
    /// `close` that would close the connection out from under other
    /// borrowers — closing a lane is exclusively the manager's job.
    pub fn connection(&self) -> &C {
        self.manager.lanes[self.lane_index as usize].connection()
    }

    /// Idempotent: a second call (or the `Drop` impl running afterward) is a
    /// documented no-op, not an error.
    pub fn release(&self) {
        if self.released.swap(true, Ordering::AcqRel) {
            return;
        }
        self.manager.release_lane(self.lane_index);
    }
}

impl<C: Connection> Drop for Borrow<C> {
    fn drop(&mut self) {
        self.release();
    }
}

/// A scoped right to a dedicated pub/sub connection (§4.3). Never shares a
/// command lane; dropping it releases the handle back to the tracker exactly
/// once, same idempotence contract as [`Borrow`].
pub struct PubSubBorrow<P: PubSubConnection> {
    tracker: Arc<PubSubTracker<P>>,
    handle: Option<PubSubHandle<P>>,
}

impl<P: PubSubConnection> PubSubBorrow<P> {
    pub fn connection(&self) -> &P {
        self.handle.as_ref().expect("PubSubBorrow used after release").connection()
    }

    /// Idempotent: releasing twice (explicitly, or once explicitly and once
    /// via `Drop`) is a silent no-op — `PubSubReleaseNonmember` in the error
    /// taxonomy names this case for a caller that wants to observe it, but
    /// this call itself never returns an error for it.
    pub async fn release(&mut self) {
        if let Some(handle) = self.handle.take() {
            self.tracker.release(&handle).await;
        }
    }
}

/// Transaction-affinity pin table (§4.4): maps a caller identity to the lane
/// it is mid-transaction on. Sharded per §5 ("writers use a lock") so two
/// callers pinning at the same moment only ever contend if they happen to
/// hash into the same shard, not against every other in-flight transaction.
#[derive(Default)]
struct PinTable {
    pins: DashMap<u64, u32>,
}

impl PinTable {
    fn lookup(&self, identity: u64) -> Option<u32> {
        self.pins.get(&identity).map(|entry| *entry)
    }

    fn pin(&self, identity: u64, lane_index: u32) {
        self.pins.insert(identity, lane_index);
    }

    fn unpin(&self, identity: u64) {
        self.pins.remove(&identity);
    }
}

struct LaneManagerInner<C: Connection> {
    lanes: Vec<Arc<Lane<C>>>,
    strategy: Arc<dyn SelectionStrategy>,
    pins: PinTable,
    metrics: Arc<dyn MetricsSink>,
    connection_name: Arc<str>,
    destroyed: AtomicBool,
}

impl<C: Connection> LaneManagerInner<C> {
    /// The only release path: notifies the strategy, decrements the lane's
    /// in-flight counter, and forwards any CAS retries spent doing so to the
    /// `strategy.cas.retries` counter (§6) — this is the sole caller of
    /// `Lane::record_release` in the workspace, so there is exactly one place
    /// that metric can ever fire from.
    fn release_lane(&self, lane_index: u32) {
        self.strategy.on_connection_released(lane_index);
        let retries = self.lanes[lane_index as usize].record_release();
        if retries > 0 {
            self.metrics.incr_counter(
                METRIC_STRATEGY_CAS_RETRIES,
                &[
                    ("connection_name", &self.connection_name),
                    ("strategy_name", self.strategy.name()),
                ],
                retries as u64,
            );
        }
    }
}

/// Owns a fixed-size array of `N` multiplexed connections, a selection
/// strategy, a pub/sub tracker, and the transaction pin table (§3).
///
/// `C` is the driver's command-connection type, `P` its pub/sub connection
/// type; both are generic so the manager never depends on a concrete driver,
/// only on [`laned_driver::Connection`] / [`laned_driver::PubSubConnection`].
pub struct LaneManager<C: Connection, P: PubSubConnection<Error = C::Error>> {
    inner: Arc<LaneManagerInner<C>>,
    pubsub: Arc<PubSubTracker<P>>,
    uri: Arc<str>,
}

impl<C: Connection, P: PubSubConnection<Error = C::Error>> LaneManager<C, P> {
    /// Opens `num_lanes` connections concurrently and wires the strategy to
    /// them. `1 <= num_lanes <= 64`; any other value fails construction with
    /// `ConfigurationInvalid` before a single socket is touched. If any lane
    /// fails to open, every lane that *did* open is closed before the error
    /// is returned (§4.4).
    pub async fn new(
        uri: impl Into<String>,
        num_lanes: u32,
        strategy: Arc<dyn SelectionStrategy>,
        metrics: Arc<dyn MetricsSink>,
        connection_name: impl Into<String>,
        pubsub_warn_threshold: usize,
    ) -> Result<Self, LaneError<C::Error>> {
        if !(crate::config::MIN_LANES..=crate::config::MAX_LANES).contains(&num_lanes) {
            return Err(LaneError::configuration_invalid(format!(
                "num_lanes must be in [{}, {}], got {num_lanes}",
                crate::config::MIN_LANES,
                crate::config::MAX_LANES
            )));
        }

        let uri: Arc<str> = Arc::from(uri.into());
        let connection_name: Arc<str> = Arc::from(connection_name.into());
        let options = ClientOptions::fail_fast();

        let mut opened: Vec<Arc<Lane<C>>> = Vec::with_capacity(num_lanes as usize);
        for index in 0..num_lanes {
            tracing::debug!(index, "opening lane connection");
            match C::open(&uri, options.clone()).await {
                Ok(connection) => {
                    opened.push(Arc::new(Lane::new(index, connection, metrics.clone(), connection_name.clone())));
                }
                Err(error) => {
                    for lane in &opened {
                        if let Err(close_err) = lane.close().await {
                            tracing::warn!(%close_err, "error closing partially-opened lane during failed construction");
                        }
                    }
                    return Err(LaneError::initialization_failed(format!(
                        "lane {index} failed to open: {error}"
                    )));
                }
            }
        }

        strategy.initialize(Arc::new(LaneArrayView(opened.clone())));

        let n = opened.len() as i64;
        metrics.set_gauge(METRIC_LANES_TOTAL, &[("connection_name", &connection_name)], n);
        metrics.set_gauge(
            METRIC_HOL_BLOCKING_ESTIMATED,
            &[("connection_name", &connection_name)],
            100 / n,
        );

        tracing::info!(num_lanes, strategy = strategy.name(), connection_name = %connection_name, "lane manager constructed");

        let pubsub = Arc::new(PubSubTracker::new(pubsub_warn_threshold, metrics.clone(), connection_name.clone()));

        Ok(Self {
            inner: Arc::new(LaneManagerInner {
                lanes: opened,
                strategy,
                pins: PinTable::default(),
                metrics,
                connection_name,
                destroyed: AtomicBool::new(false),
            }),
            pubsub,
            uri,
        })
    }

    /// Borrows a lane for a single caller identity, honoring transaction
    /// affinity: if `identity` is pinned from a prior `MULTI`/`WATCH`, the
    /// pinned lane is returned unconditionally; otherwise the strategy picks
    /// one. `classification` drives pin-table maintenance (§4.4) — pass
    /// `CommandKind::Other` for calls that don't need affinity tracking.
    pub fn acquire_for(
        &self,
        identity: u64,
        classification: CommandKind,
    ) -> Result<Borrow<C>, LaneError<C::Error>> {
        if self.inner.destroyed.load(Ordering::Acquire) {
            return Err(LaneError::Destroyed);
        }

        let lane_index = if let Some(pinned) = self.inner.pins.lookup(identity) {
            pinned
        } else {
            let n = self.inner.lanes.len() as u32;
            let selected = self.inner.strategy.select_lane(n);
            if matches!(classification, CommandKind::TransactionBegin) {
                self.inner.pins.pin(identity, selected);
            }
            selected
        };

        if matches!(classification, CommandKind::TransactionEnd) {
            self.inner.pins.unpin(identity);
        }

        self.inner.strategy.on_connection_acquired(lane_index);
        self.inner.lanes[lane_index as usize].record_acquire();

        let lane_index_str = lane_index.to_string();
        self.inner.metrics.incr_counter(
            METRIC_LANE_SELECTIONS,
            &[
                ("connection_name", &self.inner.connection_name),
                ("lane_index", &lane_index_str),
                ("strategy_name", self.inner.strategy.name()),
            ],
            1,
        );

        Ok(Borrow::new(self.inner.clone(), lane_index))
    }

    /// Convenience for callers with no transaction affinity to track: equal
    /// to `acquire_for(current_identity(), CommandKind::Other)`.
    pub fn acquire(&self) -> Result<Borrow<C>, LaneError<C::Error>> {
        self.acquire_for(current_identity(), CommandKind::Other)
    }

    /// Classifies `command` with `classifier` and acquires against the
    /// current thread's identity — the usual entry point for callers that
    /// let the fallback RESP-verb classifier drive pin-table maintenance.
    pub fn acquire_classified<Cmd: ?Sized>(
        &self,
        classifier: &impl ClassifyCommand<Cmd>,
        command: &Cmd,
    ) -> Result<Borrow<C>, LaneError<C::Error>> {
        let kind = classifier.classify(command);
        self.acquire_for(current_identity(), kind)
    }

    /// Opens (or reuses, from the tracker's perspective nothing is reused —
    /// every call opens a fresh connection) a dedicated pub/sub connection.
    /// Never touches the command lanes (§4.3).
    pub async fn pubsub_acquire(&self) -> Result<PubSubBorrow<P>, LaneError<C::Error>> {
        if self.inner.destroyed.load(Ordering::Acquire) {
            return Err(LaneError::Destroyed);
        }
        let handle = self
            .pubsub
            .create(&self.uri, ClientOptions::fail_fast())
            .await
            .map_err(LaneError::DriverFault)?;
        Ok(PubSubBorrow { tracker: self.pubsub.clone(), handle: Some(handle) })
    }

    /// Explicit release, equivalent to dropping `borrow`. Idempotent per
    /// borrow (§4.4): a second call is a documented no-op.
    pub fn release(&self, borrow: &Borrow<C>) {
        borrow.release();
    }

    /// How many lanes currently report themselves open. Best-effort: a lane
    /// may flip closed immediately after being counted.
    pub async fn open_lane_count(&self) -> usize {
        let mut count = 0;
        for lane in &self.inner.lanes {
            if lane.is_open().await {
                count += 1;
            }
        }
        count
    }

    pub fn lane_count(&self) -> usize {
        self.inner.lanes.len()
    }

    pub fn pubsub_count(&self) -> usize {
        self.pubsub.count()
    }

    /// Idempotent: sets `destroyed` (visible to every subsequent reader),
    /// closes every lane and every pub/sub handle, and never propagates a
    /// shutdown-path error — those are logged and swallowed (§4.4, §7).
    pub async fn destroy(&self) {
        if self.inner.destroyed.swap(true, Ordering::AcqRel) {
            return;
        }
        for lane in &self.inner.lanes {
            if let Err(error) = lane.close().await {
                tracing::warn!(%error, lane_index = lane.index(), "error closing lane during destroy");
            }
        }
        self.pubsub.close_all().await;
        tracing::info!(connection_name = %self.inner.connection_name, "lane manager destroyed");
    }

    pub fn is_destroyed(&self) -> bool {
        self.inner.destroyed.load(Ordering::Acquire)
    }
}
