//! # Neuro-Relay Benchmarks
//!
//! | Component | Operation | Target |
//! |-----------|-----------|--------|
//! | nr-01 Gate Router | Driver admission | < 10µs |
//! | nr-01 Gate Router | Modulator gate install | < 10µs |
//! | shared-bus | Publish, fan-out to N subscribers | < 1µs per subscriber |
//! | shared-types | Topic construction | < 1µs |

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use nr_01_gate_router::{
    GateRouter, GateRouterApi, InMemoryGateStore, InMemoryGlobalModeStore,
    ModeBiasedThresholdPolicy, RecordingCortexPort, StaticRoutingPolicy,
};
use rand::Rng;
use shared_bus::{InMemoryTopicBus, TopicBus};
use shared_types::topics::topic_for;
use shared_types::{BusMessage, Envelope, ScopeLevel};
use std::sync::Arc;
use tokio::runtime::Runtime;

const NUCLEI: [&str; 4] = ["lgn", "mgn", "vpl", "vpm"];

fn runtime() -> Runtime {
    tokio::runtime::Builder::new_current_thread()
        .build()
        .expect("runtime")
}

fn router() -> GateRouter {
    GateRouter::new(
        Arc::new(InMemoryGateStore::new()),
        Arc::new(InMemoryGlobalModeStore::new()),
        Arc::new(StaticRoutingPolicy::sensory_defaults()),
        Arc::new(ModeBiasedThresholdPolicy::new()),
        Arc::new(RecordingCortexPort::new()),
    )
}

// ============================================================================
// NR-01: Gate Router
// ============================================================================

fn bench_gate_router(c: &mut Criterion) {
    let rt = runtime();
    let mut group = c.benchmark_group("nr-01-gate-router");

    let router = router();
    rt.block_on(async {
        for (i, nucleus) in NUCLEI.iter().enumerate() {
            router
                .set_inhibition(ScopeLevel::Room, "living_room", nucleus, i as f64 * 0.25, 0, None)
                .await
                .expect("seed gate");
        }
    });

    group.bench_function("driver_admission", |b| {
        let mut rng = rand::thread_rng();
        b.iter(|| {
            let nucleus = NUCLEI[rng.gen_range(0..NUCLEI.len())];
            let env = Envelope::driver(ScopeLevel::Room, "living_room", nucleus, 1_000);
            black_box(rt.block_on(router.ingest(env)).expect("ingest"))
        })
    });

    group.bench_function("modulator_install", |b| {
        let mut ts = 0u64;
        b.iter(|| {
            ts += 1;
            let env = Envelope::modulator(ScopeLevel::Room, "living_room", "lgn", ts)
                .with_field("requested_inhibition", 0.4)
                .with_field("window_ms", 500);
            black_box(rt.block_on(router.ingest(env)).expect("ingest"))
        })
    });

    group.finish();
}

// ============================================================================
// SHARED-BUS: Publish fan-out
// ============================================================================

fn bench_bus_fan_out(c: &mut Criterion) {
    let rt = runtime();
    let mut group = c.benchmark_group("shared-bus");
    let topic = "/A/driver/room/living_room/nucleus/lgn";
    let msg: BusMessage = Envelope::driver(ScopeLevel::Room, "living_room", "lgn", 1).into();

    for subscribers in [1usize, 8, 64] {
        let bus = InMemoryTopicBus::<BusMessage>::with_capacity(64);
        let subs: Vec<_> = (0..subscribers).map(|_| bus.subscribe(topic)).collect();

        group.throughput(Throughput::Elements(subscribers as u64));
        group.bench_with_input(
            BenchmarkId::new("publish", subscribers),
            &subscribers,
            |b, _| b.iter(|| black_box(rt.block_on(bus.publish(topic, msg.clone())))),
        );
        drop(subs);
    }

    group.finish();
}

// ============================================================================
// SHARED-TYPES: Topic construction
// ============================================================================

fn bench_topic_for(c: &mut Criterion) {
    let env = Envelope::driver(ScopeLevel::Room, "living_room", "lgn", 1);
    c.bench_function("shared-types/topic_for", |b| {
        b.iter(|| black_box(topic_for(black_box(&env)).expect("topic")))
    });
}

criterion_group!(benches, bench_gate_router, bench_bus_fan_out, bench_topic_for);
criterion_main!(benches);
