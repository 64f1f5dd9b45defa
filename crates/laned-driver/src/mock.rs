//! An in-memory reference driver.
//!
//! Every lane-manager test and benchmark in this workspace runs against this
//! driver instead of a live server, so none of them need a reachable Redis
//! instance to pass.

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;

use crate::contract::{ClientOptions, Connection, PubSubConnection};
use crate::reconnect::ReconnectPolicy;

#[derive(Debug, thiserror::Error)]
pub enum MockDriverError {
    #[error("mock connection to {uri} refused by test fixture")]
    RefusedByFixture { uri: String },
    #[error("mock connection is closed")]
    Closed,
}

/// A connection that always succeeds, tracks its own open/closed state, and
/// echoes back whatever command it was sent (prefixed with a `+` so the
/// bytes look like a trivial RESP simple string).
pub struct MockConnection {
    uri: String,
    open: AtomicBool,
}

impl MockConnection {
    pub fn uri(&self) -> &str {
        &self.uri
    }
}

#[async_trait]
impl Connection for MockConnection {
    type Error = MockDriverError;

    async fn open(uri: &str, _options: ClientOptions) -> Result<Self, Self::Error> {
        tracing::debug!(uri, "mock connection opened");
        Ok(Self {
            uri: uri.to_string(),
            open: AtomicBool::new(true),
        })
    }

    async fn is_open(&self) -> bool {
        self.open.load(Ordering::Acquire)
    }

    async fn close(&self) -> Result<(), Self::Error> {
        self.open.store(false, Ordering::Release);
        Ok(())
    }

    async fn send_command(&self, command: &[u8]) -> Result<Vec<u8>, Self::Error> {
        if !self.is_open().await {
            return Err(MockDriverError::Closed);
        }
        let mut response = Vec::with_capacity(command.len() + 1);
        response.push(b'+');
        response.extend_from_slice(command);
        Ok(response)
    }
}

/// A connection opener that can be told, ahead of time, to fail the next
/// `open()` call — used to exercise `InitializationFailed` paths.
pub struct FlakyMockConnection;

impl FlakyMockConnection {
    /// Opens a connection that immediately reports itself refused, without
    /// ever reaching [`MockConnection`]. Tests call this directly rather than
    /// through the `Connection::open` associated function, since the trait
    /// has no parameter for fixture-driven failure injection.
    pub async fn open_refusing(uri: &str) -> Result<MockConnection, MockDriverError> {
        Err(MockDriverError::RefusedByFixture { uri: uri.to_string() })
    }
}

/// A connection that actually consults a [`ReconnectPolicy`] after a
/// simulated disconnect, so the policy (§4.4's "exponential back-off")
/// has something real driving it outside its own unit tests.
///
/// `simulate_disconnect` flips the connection closed and records a failure
/// with the policy; `reconnect_with_backoff` sleeps for the policy's
/// back-off duration (growing with consecutive failures) before flipping it
/// open again and notifying the policy of the recovery. Between those two
/// calls, `send_command` rejects immediately — the same *reject* behavior
/// §4.4 requires of a disconnected lane.
pub struct ReconnectingMockConnection {
    uri: String,
    open: AtomicBool,
    consecutive_failures: AtomicU32,
    policy: Arc<dyn ReconnectPolicy>,
}

impl ReconnectingMockConnection {
    /// `Connection::open`'s signature has no room for a policy parameter, so
    /// this (like `FlakyMockConnection::open_refusing`) is an inherent
    /// constructor tests reach for directly instead of going through the
    /// trait.
    pub async fn open_with_policy(
        uri: &str,
        _options: ClientOptions,
        policy: Arc<dyn ReconnectPolicy>,
    ) -> Result<Self, MockDriverError> {
        Ok(Self {
            uri: uri.to_string(),
            open: AtomicBool::new(true),
            consecutive_failures: AtomicU32::new(0),
            policy,
        })
    }

    pub fn uri(&self) -> &str {
        &self.uri
    }

    /// Marks the connection closed and tells the policy a connection
    /// attempt has failed.
    pub fn simulate_disconnect(&self) {
        self.open.store(false, Ordering::Release);
        self.consecutive_failures.fetch_add(1, Ordering::AcqRel);
        self.policy.notify_failure();
    }

    /// Waits out the policy's back-off for the current failure streak, then
    /// reopens the connection and resets the streak.
    pub async fn reconnect_with_backoff(&self) {
        let failures = self.consecutive_failures.load(Ordering::Acquire);
        let delay = self.policy.backoff(failures);
        tokio::time::sleep(delay).await;
        self.open.store(true, Ordering::Release);
        self.consecutive_failures.store(0, Ordering::Release);
        self.policy.notify_success();
    }
}

#[async_trait]
impl Connection for ReconnectingMockConnection {
    type Error = MockDriverError;

    async fn open(uri: &str, options: ClientOptions) -> Result<Self, Self::Error> {
        Self::open_with_policy(uri, options, Arc::new(crate::reconnect::ExponentialReconnectPolicy::with_defaults())).await
    }

    async fn is_open(&self) -> bool {
        self.open.load(Ordering::Acquire)
    }

    async fn close(&self) -> Result<(), Self::Error> {
        self.open.store(false, Ordering::Release);
        Ok(())
    }

    async fn send_command(&self, command: &[u8]) -> Result<Vec<u8>, Self::Error> {
        if !self.is_open().await {
            return Err(MockDriverError::Closed);
        }
        let mut response = Vec::with_capacity(command.len() + 1);
        response.push(b'+');
        response.extend_from_slice(command);
        Ok(response)
    }
}

pub struct MockPubSubConnection {
    open: AtomicBool,
}

#[async_trait]
impl PubSubConnection for MockPubSubConnection {
    type Error = MockDriverError;

    async fn open(_uri: &str, _options: ClientOptions) -> Result<Self, Self::Error> {
        Ok(Self {
            open: AtomicBool::new(true),
        })
    }

    async fn is_open(&self) -> bool {
        self.open.load(Ordering::Acquire)
    }

    async fn close(&self) -> Result<(), Self::Error> {
        self.open.store(false, Ordering::Release);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn open_and_close_round_trip() {
        let conn = MockConnection::open("redis://localhost:6379", ClientOptions::fail_fast())
            .await
            .expect("mock open never fails");
        assert!(conn.is_open().await);
        conn.close().await.expect("mock close never fails");
        assert!(!conn.is_open().await);
    }

    #[tokio::test]
    async fn send_command_fails_once_closed() {
        let conn = MockConnection::open("redis://localhost:6379", ClientOptions::fail_fast())
            .await
            .unwrap();
        conn.close().await.unwrap();
        let result = conn.send_command(b"PING").await;
        assert!(matches!(result, Err(MockDriverError::Closed)));
    }

    #[tokio::test]
    async fn flaky_connection_reports_refusal() {
        let result = FlakyMockConnection::open_refusing("redis://localhost:6379").await;
        assert!(matches!(result, Err(MockDriverError::RefusedByFixture { .. })));
    }

    #[tokio::test]
    async fn reconnecting_mock_rejects_commands_during_backoff_then_recovers() {
        use crate::reconnect::ExponentialReconnectPolicy;
        use std::time::Duration;

        let policy = Arc::new(ExponentialReconnectPolicy::new(
            Duration::from_millis(2),
            Duration::from_millis(50),
        ));
        let conn =
            ReconnectingMockConnection::open_with_policy("redis://localhost:6379", ClientOptions::fail_fast(), policy)
                .await
                .unwrap();
        assert!(conn.is_open().await);

        conn.simulate_disconnect();
        assert!(!conn.is_open().await);
        let result = conn.send_command(b"PING").await;
        assert!(matches!(result, Err(MockDriverError::Closed)));

        conn.reconnect_with_backoff().await;
        assert!(conn.is_open().await);
        let reply = conn.send_command(b"PING").await.unwrap();
        assert_eq!(reply[0], b'+');
    }

    #[tokio::test]
    async fn reconnecting_mock_backoff_grows_across_consecutive_failures() {
        use crate::reconnect::ExponentialReconnectPolicy;
        use std::time::Duration;

        let policy = Arc::new(ExponentialReconnectPolicy::new(
            Duration::from_millis(1),
            Duration::from_secs(1),
        ));
        let conn = ReconnectingMockConnection::open_with_policy(
            "redis://localhost:6379",
            ClientOptions::fail_fast(),
            policy.clone(),
        )
        .await
        .unwrap();

        conn.simulate_disconnect();
        assert_eq!(policy.backoff(1), Duration::from_millis(1));
        conn.reconnect_with_backoff().await;

        conn.simulate_disconnect();
        conn.simulate_disconnect();
        assert_eq!(policy.backoff(2), Duration::from_millis(2));
    }
}
