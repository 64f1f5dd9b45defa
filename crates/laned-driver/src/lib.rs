//! The driver contract the lane manager is built against.
//!
//! The core never opens a socket itself; it drives whatever implements
//! [`Connection`] and [`PubSubConnection`] here. This crate also carries the
//! reconnect back-off policy a real driver needs (§4.4 requires exponential
//! back-off from the driver, not the core) and an in-memory mock driver used
//! by every test and benchmark elsewhere in this workspace.

pub mod contract;
pub mod mock;
pub mod reconnect;

pub use contract::{ClientOptions, Connection, DisconnectedBehavior, PubSubConnection};
pub use mock::{
    FlakyMockConnection, MockConnection, MockDriverError, MockPubSubConnection,
    ReconnectingMockConnection,
};
pub use reconnect::{ExponentialReconnectPolicy, ReconnectPolicy};
