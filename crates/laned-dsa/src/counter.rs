// Swaps in loom's shadow atomics under `--cfg loom` so the decrement-race
// tests in `tests/loom_counter.rs` can exhaustively explore interleavings;
// `AtomicU32`/`AtomicUsize` are otherwise the real `std` types.
#[cfg(not(loom))]
use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};
#[cfg(loom)]
use loom::sync::atomic::{AtomicU32, AtomicUsize, Ordering};

/// A non-negative atomic counter that clamps at zero on decrement.
///
/// Used for a lane's in-flight count and for the least-used strategy's mirrored
/// count. Increment is a single wait-free `fetch_add`; decrement is a lock-free
/// CAS loop because a naive `fetch_sub` would wrap past zero into
/// `usize::MAX` if the release path ever runs more times than the acquire path
/// (pathological caller code, per the release contract).
#[derive(Debug)]
pub struct ClampedCounter(AtomicUsize);

impl Default for ClampedCounter {
    fn default() -> Self {
        Self::new()
    }
}

/// Outcome of a clamped decrement: the value after the call, and how many CAS
/// attempts were spent getting there (0 means the first attempt succeeded).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecrementOutcome {
    pub value: usize,
    pub retries: u32,
}

// Both counters are shared across lanes/callers without any external
// synchronization (§5: "no blocking locks on any hot path"); if either ever
// stopped being `Sync` the manager would fail to compile, but only at the
// call site that tries to share it — pin the invariant here instead.
static_assertions::assert_impl_all!(ClampedCounter: Send, Sync);
static_assertions::assert_impl_all!(WrappingCounter: Send, Sync);

impl ClampedCounter {
    pub fn new() -> Self {
        Self(AtomicUsize::new(0))
    }

    /// Wait-free increment, returns the value after the increment.
    pub fn increment(&self) -> usize {
        self.0.fetch_add(1, Ordering::AcqRel) + 1
    }

    /// Lock-free decrement, clamped at zero. Never produces a negative or
    /// wrapped-positive value even under concurrent racing decrements.
    pub fn decrement(&self) -> DecrementOutcome {
        let mut retries = 0u32;
        loop {
            let current = self.0.load(Ordering::Acquire);
            if current == 0 {
                return DecrementOutcome { value: 0, retries };
            }
            match self.0.compare_exchange_weak(
                current,
                current - 1,
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => return DecrementOutcome { value: current - 1, retries },
                Err(_) => retries += 1,
            }
        }
    }

    /// Relaxed read of the current value; may be stale by the time a caller
    /// acts on it (documented as best-effort everywhere it is used).
    pub fn get(&self) -> usize {
        self.0.load(Ordering::Relaxed)
    }

    /// Seeds the counter to an arbitrary value. Used by tests that need to
    /// preset per-lane load before exercising a selection strategy.
    pub fn set(&self, value: usize) {
        self.0.store(value, Ordering::Release);
    }
}

/// A monotonic atomic cursor used by the round-robin strategy.
///
/// `next_index` performs a single wait-free `fetch_add` (no CAS, no retries —
/// round-robin never contributes to `strategy.cas.retries`), masks off the
/// sign bit, and reduces modulo `n`. The mask turns the raw `u32` into a
/// value in `[0, 2^31)`; because that range is a power of two, masking is
/// exactly modular reduction, so the sequence produced is continuous across
/// the `u32` wraparound with no gap, skew, or sign-induced discontinuity.
#[derive(Debug)]
pub struct WrappingCounter(AtomicU32);

impl Default for WrappingCounter {
    fn default() -> Self {
        Self::new()
    }
}

const SIGN_MASK: u32 = 0x7FFF_FFFF;

impl WrappingCounter {
    pub fn new() -> Self {
        Self(AtomicU32::new(0))
    }

    /// Returns the next index in `[0, n)`. `n` must be non-zero.
    pub fn next_index(&self, n: u32) -> u32 {
        debug_assert!(n > 0, "WrappingCounter::next_index requires n > 0");
        let raw = self.0.fetch_add(1, Ordering::Relaxed);
        (raw & SIGN_MASK) % n
    }

    /// Forces the underlying counter to an arbitrary value. Used by overflow
    /// tests that need to drive the counter to the edge of its range.
    pub fn force(&self, value: u32) {
        self.0.store(value, Ordering::Relaxed);
    }
}
