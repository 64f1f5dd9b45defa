//! The DX promise: an 8-lane round-robin dispatcher against a mocked Redis
//! endpoint in a dozen lines, built through the facade crate's
//! [`laned::LaneManagerBuilder`].

use std::sync::Arc;

use laned::LaneManagerBuilder;
use laned_core::SelectionStrategyKind;
use laned_driver::{MockConnection, MockPubSubConnection};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let manager = LaneManagerBuilder::<MockConnection, MockPubSubConnection>::new("redis://localhost:6379")
        .with_num_lanes(8)
        .with_strategy(SelectionStrategyKind::RoundRobin)
        .with_connection_name("demo")
        .build()
        .await?;
    let manager = Arc::new(manager);

    for round in 0..16 {
        let borrow = manager.acquire()?;
        println!("round {round:02} -> lane {}", borrow.lane_index());
        let reply = borrow.connection().send_command(b"PING").await?;
        println!("  replied: {}", String::from_utf8_lossy(&reply));
    }

    manager.destroy().await;
    Ok(())
}
