use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use laned_dsa::CowSet;
use laned_driver::{ClientOptions, PubSubConnection};

use crate::error::PubSubReleaseNonmember;
use crate::metrics::MetricsSink;

/// A tracked pub/sub connection. Cloning shares the underlying connection;
/// equality (and therefore `CowSet` membership) is by tracker-assigned id,
/// not by connection identity.
pub struct PubSubHandle<P> {
    id: u64,
    connection: Arc<P>,
}

impl<P> PubSubHandle<P> {
    pub fn connection(&self) -> &P {
        &self.connection
    }
}

impl<P> Clone for PubSubHandle<P> {
    fn clone(&self) -> Self {
        Self { id: self.id, connection: self.connection.clone() }
    }
}

impl<P> PartialEq for PubSubHandle<P> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

/// Tracks every dedicated pub/sub connection, isolated from the command
/// lanes: once a connection enters subscribe mode its response stream is no
/// longer positionally matched to a FIFO, so it must never double as a lane.
pub struct PubSubTracker<P: PubSubConnection> {
    handles: CowSet<PubSubHandle<P>>,
    next_id: AtomicU64,
    warn_threshold: usize,
    warned: AtomicBool,
    metrics: Arc<dyn MetricsSink>,
    connection_name: Arc<str>,
}

impl<P: PubSubConnection> PubSubTracker<P> {
    pub fn new(warn_threshold: usize, metrics: Arc<dyn MetricsSink>, connection_name: Arc<str>) -> Self {
        Self {
            handles: CowSet::new(),
            next_id: AtomicU64::new(0),
            warn_threshold,
            warned: AtomicBool::new(false),
            metrics,
            connection_name,
        }
    }

    /// Opens a new pub/sub connection and adds it to the tracked set.
    pub async fn create(&self, uri: &str, options: ClientOptions) -> Result<PubSubHandle<P>, P::Error> {
        let connection = P::open(uri, options).await?;
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let handle = PubSubHandle { id, connection: Arc::new(connection) };
        self.handles.insert(handle.clone());
        self.check_threshold();
        Ok(handle)
    }

    /// Idempotent remove + close. Returns whether the handle was actually
    /// present (a second release for the same handle is a no-op, not an
    /// error — `PubSubReleaseNonmember` in the error taxonomy names this
    /// case for callers that want to log it, but the tracker itself never
    /// surfaces it as an error).
    pub async fn release(&self, handle: &PubSubHandle<P>) -> bool {
        let present = self.handles.remove(handle);
        if present {
            if let Err(error) = handle.connection.close().await {
                tracing::warn!(%error, "error closing pub/sub connection during release");
            }
        } else {
            tracing::debug!(error = %PubSubReleaseNonmember, "pub/sub release on untracked handle");
        }
        present
    }

    pub fn count(&self) -> usize {
        self.handles.len()
    }

    /// Closes every tracked handle against a point-in-time snapshot, so a
    /// concurrent `release` during shutdown can never double-close or be
    /// skipped relative to what this call observed.
    pub async fn close_all(&self) {
        let snapshot = self.handles.clear();
        for handle in snapshot.iter() {
            if let Err(error) = handle.connection.close().await {
                tracing::warn!(%error, "error closing pub/sub connection during close_all");
            }
        }
    }

    fn check_threshold(&self) {
        let count = self.handles.len();
        if count > self.warn_threshold && !self.warned.swap(true, Ordering::Relaxed) {
            tracing::warn!(
                count,
                connection_name = %self.connection_name,
                "pub/sub tracker exceeded warn threshold"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::NoopMetricsSink;
    use laned_driver::MockPubSubConnection;

    fn tracker() -> PubSubTracker<MockPubSubConnection> {
        PubSubTracker::new(100, Arc::new(NoopMetricsSink), Arc::from("default"))
    }

    #[tokio::test]
    async fn create_and_release_round_trip() {
        let tracker = tracker();
        let handle = tracker.create("redis://localhost:6379", ClientOptions::fail_fast()).await.unwrap();
        assert_eq!(tracker.count(), 1);
        assert!(tracker.release(&handle).await);
        assert_eq!(tracker.count(), 0);
    }

    #[tokio::test]
    async fn release_is_idempotent() {
        let tracker = tracker();
        let handle = tracker.create("redis://localhost:6379", ClientOptions::fail_fast()).await.unwrap();
        assert!(tracker.release(&handle).await);
        assert!(!tracker.release(&handle).await);
    }

    #[tokio::test]
    async fn close_all_empties_the_tracker() {
        let tracker = tracker();
        for _ in 0..5 {
            tracker.create("redis://localhost:6379", ClientOptions::fail_fast()).await.unwrap();
        }
        assert_eq!(tracker.count(), 5);
        tracker.close_all().await;
        assert_eq!(tracker.count(), 0);
    }

    #[tokio::test]
    async fn count_never_negative_across_mixed_operations() {
        let tracker = tracker();
        let a = tracker.create("redis://localhost:6379", ClientOptions::fail_fast()).await.unwrap();
        let b = tracker.create("redis://localhost:6379", ClientOptions::fail_fast()).await.unwrap();
        tracker.release(&a).await;
        tracker.release(&a).await;
        assert_eq!(tracker.count(), 1);
        tracker.release(&b).await;
        assert_eq!(tracker.count(), 0);
    }
}
