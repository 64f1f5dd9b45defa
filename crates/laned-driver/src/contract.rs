use async_trait::async_trait;

/// What a disconnected lane's driver does with commands issued to it.
///
/// The core fixes this to [`DisconnectedBehavior::Reject`] and does not expose
/// it as a configuration option; the enum exists so the driver's options
/// surface can express the choice at all, and so a driver that supports
/// buffering has something to turn off.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisconnectedBehavior {
    /// Commands issued while disconnected fail immediately.
    Reject,
    /// Commands issued while disconnected are queued until reconnect.
    ///
    /// The core never selects this; it is here so a driver's full option
    /// surface is representable, and so attempting to configure it is a
    /// detectable `ConfigurationInvalid` at the integration layer rather than
    /// a silently ignored setting.
    Buffer,
}

/// Client-level options a driver must accept before the core opens any lane.
#[derive(Debug, Clone)]
pub struct ClientOptions {
    pub auto_reconnect: bool,
    pub disconnected_behavior: DisconnectedBehavior,
}

impl ClientOptions {
    /// The only configuration the core ever actually hands a driver:
    /// reconnect on, reject while disconnected.
    pub fn fail_fast() -> Self {
        Self {
            auto_reconnect: true,
            disconnected_behavior: DisconnectedBehavior::Reject,
        }
    }
}

/// A single multiplexed connection to the server, as handed to one lane.
///
/// Implementors own their own reconnect loop (driven by a [`ReconnectPolicy`],
/// see [`crate::reconnect`]); the core never reaches into a connection beyond
/// this trait's surface.
#[async_trait]
pub trait Connection: Send + Sync {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Opens a connection to `uri` with the given options. Returns an owning
    /// handle; the lane holds this handle for its entire lifetime.
    async fn open(uri: &str, options: ClientOptions) -> Result<Self, Self::Error>
    where
        Self: Sized;

    /// Current liveness, best-effort and possibly stale by the time the
    /// caller acts on it.
    async fn is_open(&self) -> bool;

    /// Sends the protocol's graceful disconnect and releases the socket.
    /// Idempotent: closing an already-closed connection is a no-op.
    async fn close(&self) -> Result<(), Self::Error>;

    /// Issues a single command and awaits its response. The core does not
    /// interpret the bytes itself; classifying a command for the
    /// transaction-affinity pin table is handled above this trait, by
    /// `laned-core`'s classifier wrapper (§6 point 6), not by the connection.
    async fn send_command(&self, command: &[u8]) -> Result<Vec<u8>, Self::Error>;
}

/// A dedicated pub/sub connection, opened separately from the lane array.
#[async_trait]
pub trait PubSubConnection: Send + Sync {
    type Error: std::error::Error + Send + Sync + 'static;

    async fn open(uri: &str, options: ClientOptions) -> Result<Self, Self::Error>
    where
        Self: Sized;

    async fn is_open(&self) -> bool;

    async fn close(&self) -> Result<(), Self::Error>;
}
