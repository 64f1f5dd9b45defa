//! Reconnect back-off policy.
//!
//! The core requires only that a driver reconnect with exponential back-off
//! while rejecting commands in the meantime (§4.4); it does not prescribe the
//! back-off curve itself. This module gives a driver implementation a small
//! trait plus one ready-to-use default, the same shape as this crate's
//! congestion-credit precedent: a trait for the decision, one atomic-state
//! struct implementing it, no locks on the hot path.

use std::sync::atomic::{AtomicU8, Ordering};
use std::time::Duration;

/// Decides how long to wait before the next reconnect attempt.
pub trait ReconnectPolicy: Send + Sync {
    /// Delay to wait before the next attempt, given how many consecutive
    /// attempts have already failed.
    fn backoff(&self, consecutive_failures: u32) -> Duration;

    /// Called after a failed connection attempt.
    fn notify_failure(&self);

    /// Called after a successful connection attempt; resets back-off state.
    fn notify_success(&self);
}

/// Exponential back-off with a fixed base delay and a capped level count.
///
/// `active_level` tracks the current back-off tier so repeated calls to
/// [`ExponentialReconnectPolicy::backoff`] without an intervening
/// `notify_success` keep climbing rather than resetting; `notify_success`
/// drops the tier back to zero. The level is a single `AtomicU8`, updated
/// with plain stores — there is nothing to compare-and-swap because both
/// transitions (climb-on-failure, reset-on-success) are unconditional writes,
/// not read-modify-write updates.
pub struct ExponentialReconnectPolicy {
    base_delay: Duration,
    max_delay: Duration,
    active_level: AtomicU8,
}

const MAX_LEVEL: u8 = 10;

impl ExponentialReconnectPolicy {
    pub fn new(base_delay: Duration, max_delay: Duration) -> Self {
        Self {
            base_delay,
            max_delay,
            active_level: AtomicU8::new(0),
        }
    }

    /// Same curve, defaulted to a 50ms base and a 30s ceiling.
    pub fn with_defaults() -> Self {
        Self::new(Duration::from_millis(50), Duration::from_secs(30))
    }
}

impl Default for ExponentialReconnectPolicy {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl ReconnectPolicy for ExponentialReconnectPolicy {
    fn backoff(&self, consecutive_failures: u32) -> Duration {
        let level = consecutive_failures.min(MAX_LEVEL as u32) as u32;
        let factor = 1u64.checked_shl(level).unwrap_or(u64::MAX);
        let scaled = self.base_delay.saturating_mul(factor.min(u32::MAX as u64) as u32);
        scaled.min(self.max_delay)
    }

    fn notify_failure(&self) {
        let current = self.active_level.load(Ordering::Relaxed);
        if current < MAX_LEVEL {
            self.active_level.store(current + 1, Ordering::Relaxed);
        }
    }

    fn notify_success(&self) {
        self.active_level.store(0, Ordering::Relaxed);
    }
}
