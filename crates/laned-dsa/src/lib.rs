//! Low-level, dependency-light concurrent primitives shared by the lane dispatch core.
//!
//! Kept as its own crate so the wait-free counters and the copy-on-write set can be
//! property- and loom-tested in isolation from the higher-level lane/strategy/manager
//! semantics that build on top of them.

pub mod counter;
pub mod cow_set;
pub mod hash;

pub use counter::{ClampedCounter, WrappingCounter};
pub use cow_set::CowSet;
pub use hash::avalanche_mix64;
