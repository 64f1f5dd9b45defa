//! Demonstrates transaction affinity (§4.4): a `MULTI` ... `EXEC` sequence
//! issued from one caller always lands on the same lane, even though every
//! other command round-robins freely.

use laned::{LaneManagerBuilder, RespVerbClassifier};
use laned_core::SelectionStrategyKind;
use laned_driver::{MockConnection, MockPubSubConnection};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let manager = LaneManagerBuilder::<MockConnection, MockPubSubConnection>::new("redis://localhost:6379")
        .with_num_lanes(4)
        .with_strategy(SelectionStrategyKind::RoundRobin)
        .with_connection_name("demo")
        .build()
        .await?;

    let classifier = RespVerbClassifier::new();

    println!("ordinary commands spread across lanes:");
    for _ in 0..4 {
        let borrow = manager.acquire_classified(&classifier, b"GET".as_slice())?;
        println!("  GET -> lane {}", borrow.lane_index());
    }

    println!("a transaction stays pinned to one lane:");
    let begin = manager.acquire_classified(&classifier, b"MULTI".as_slice())?;
    println!("  MULTI -> lane {}", begin.lane_index());
    let watch = manager.acquire_classified(&classifier, b"SET foo bar".as_slice())?;
    println!("  SET   -> lane {}", watch.lane_index());
    let end = manager.acquire_classified(&classifier, b"EXEC".as_slice())?;
    println!("  EXEC  -> lane {}", end.lane_index());
    assert_eq!(begin.lane_index(), watch.lane_index());
    assert_eq!(begin.lane_index(), end.lane_index());

    manager.destroy().await;
    Ok(())
}
