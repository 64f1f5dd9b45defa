//! Bench for the `acquire` + `release` round trip against the in-memory
//! mock driver, the path every one of this workspace's property tests
//! exercises thousands of times.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use laned_core::{LaneManager, NoopMetricsSink, RoundRobinStrategy};
use laned_driver::{MockConnection, MockPubSubConnection};
use std::sync::Arc;
use tokio::runtime::Runtime;

fn bench_acquire_release(c: &mut Criterion) {
    let rt = Runtime::new().expect("failed to build tokio runtime for bench");
    let manager: LaneManager<MockConnection, MockPubSubConnection> = rt.block_on(async {
        LaneManager::new(
            "redis://localhost:6379",
            8,
            Arc::new(RoundRobinStrategy::new()),
            Arc::new(NoopMetricsSink),
            "bench",
            100,
        )
        .await
        .expect("mock lanes never fail to open")
    });

    c.bench_function("acquire_release_round_trip_n8", |b| {
        b.iter(|| {
            let borrow = manager.acquire().expect("mock manager never returns Destroyed mid-bench");
            black_box(borrow.lane_index());
        })
    });

    rt.block_on(manager.destroy());
}

criterion_group!(benches, bench_acquire_release);
criterion_main!(benches);
