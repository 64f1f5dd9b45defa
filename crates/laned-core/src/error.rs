use thiserror::Error;

/// The core's error taxonomy (§7). Generic over the driver's own error type so
/// `DriverFault` can wrap it directly instead of stringifying it away.
#[derive(Debug, Error)]
pub enum LaneError<E>
where
    E: std::error::Error + Send + Sync + 'static,
{
    /// `num_lanes` outside `[1, 64]`, or a nil metrics sink / nil strategy
    /// where a non-nil one is required. Surfaced at construction; never
    /// recoverable in-core.
    #[error("invalid lane manager configuration: {reason}")]
    ConfigurationInvalid { reason: String },

    /// One or more lanes failed to open during construction. All partial
    /// lanes were closed before this error was returned; the caller may
    /// retry construction.
    #[error("lane manager initialization failed: {reason}")]
    InitializationFailed { reason: String },

    /// A public entry point was invoked after `destroy()`.
    #[error("lane manager has been destroyed")]
    Destroyed,

    /// Propagated unchanged from the underlying driver.
    #[error("driver fault: {0}")]
    DriverFault(#[source] E),
}

impl<E> LaneError<E>
where
    E: std::error::Error + Send + Sync + 'static,
{
    pub fn configuration_invalid(reason: impl Into<String>) -> Self {
        Self::ConfigurationInvalid { reason: reason.into() }
    }

    pub fn initialization_failed(reason: impl Into<String>) -> Self {
        Self::InitializationFailed { reason: reason.into() }
    }
}

/// Releasing a pub/sub handle the tracker does not recognize. Per §7 this is
/// a silent no-op at the tracker's own API (`release` returns `bool`), never
/// a `LaneError` — the type exists only so a caller mapping the `bool` onto a
/// richer enum has a recognizable name to reach for.
#[derive(Debug, Error)]
#[error("released pub/sub handle is not tracked (idempotent no-op)")]
pub struct PubSubReleaseNonmember;
