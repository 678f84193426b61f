//! # Gating Flows
//!
//! The gate router wired to the real in-memory stores and the bus-backed
//! cortex and gate ports. Observers subscribe to the audit, relay and gate
//! topics exactly as a cortex plane would.

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use nr_01_gate_router::{
        BusCortexPort, BusGatePort, GateRouter, GateRouterApi, GateStore, InMemoryGateStore,
        InMemoryGlobalModeStore, ModeBiasedThresholdPolicy, StaticRoutingPolicy,
    };
    use proptest::prelude::*;
    use shared_bus::{InMemoryTopicBus, Subscription, TopicBus};
    use shared_types::{BusMessage, Envelope, GateState, RelayDecision, ScopeLevel};
    use tokio::time::timeout;

    const DECISIONS: &str = "/X/decision/room/living_room/lane/A";
    const RELAY_V1: &str = "/thalamus/relay/room/living_room/cortex/V1/layer/l4";
    const GATE_LGN: &str = "/G/gate/room/living_room/nucleus/lgn";

    // =========================================================================
    // TEST FIXTURES
    // =========================================================================

    struct Fixture {
        bus: Arc<InMemoryTopicBus>,
        store: Arc<InMemoryGateStore>,
        router: GateRouter,
    }

    fn fixture(base_threshold: f64) -> Fixture {
        let bus = Arc::new(InMemoryTopicBus::<BusMessage>::new());
        let shared: Arc<dyn TopicBus> = bus.clone();
        let store = Arc::new(InMemoryGateStore::new());
        let router = GateRouter::new(
            store.clone(),
            Arc::new(InMemoryGlobalModeStore::new()),
            Arc::new(StaticRoutingPolicy::sensory_defaults()),
            Arc::new(ModeBiasedThresholdPolicy::new().with_base(base_threshold)),
            Arc::new(BusCortexPort::new(shared.clone())),
        )
        .with_gate_port(Arc::new(BusGatePort::new(shared)));
        Fixture { bus, store, router }
    }

    fn driver(timestamp_ms: u64) -> Envelope {
        Envelope::driver(ScopeLevel::Room, "living_room", "lgn", timestamp_ms)
    }

    async fn next_decision(sub: &mut Subscription) -> RelayDecision {
        let msg = timeout(Duration::from_millis(500), sub.recv())
            .await
            .expect("timeout waiting for decision")
            .expect("subscription closed");
        match msg {
            BusMessage::Decision(decision) => decision,
            other => panic!("Expected a relay decision, got {other:?}"),
        }
    }

    // =========================================================================
    // SCENARIOS
    // =========================================================================

    /// No gate state at threshold 0.5: the driver is relayed.
    #[tokio::test]
    async fn test_ungated_driver_is_relayed_to_cortex() {
        let f = fixture(0.5);
        let mut audit = f.bus.subscribe(DECISIONS);
        let mut relay = f.bus.subscribe(RELAY_V1);

        let decision = f.router.ingest(driver(1000)).await.unwrap().unwrap();

        assert!(decision.allowed);
        assert_eq!(decision.applied_inhibition, 0.0);
        assert_eq!(decision.rationale, "inhibition=0.00 threshold=0.50");
        assert_eq!(next_decision(&mut audit).await, decision);
        assert_eq!(next_decision(&mut relay).await, decision);
    }

    /// Modulator at t=1100 requests 0.9 for 500 ms: blocked at 1200, open
    /// again at 1650.
    #[tokio::test]
    async fn test_modulator_window_blocks_until_expiry() {
        let f = fixture(0.5);
        let mut gates = f.bus.subscribe(GATE_LGN);
        let mut relay = f.bus.subscribe(RELAY_V1);

        let modulator = Envelope::modulator(ScopeLevel::Room, "living_room", "lgn", 1100)
            .with_field("requested_inhibition", 0.9)
            .with_field("window_ms", 500);
        assert!(f.router.ingest(modulator).await.unwrap().is_none());

        let announced = timeout(Duration::from_millis(500), gates.recv())
            .await
            .unwrap()
            .unwrap();
        assert!(matches!(announced, BusMessage::Gate(ref s) if s.expires_at_ms == Some(1600)));

        let blocked = f.router.ingest(driver(1200)).await.unwrap().unwrap();
        assert!(!blocked.allowed);
        assert!(blocked.targets.is_empty());
        assert!(relay.try_recv().unwrap().is_none());

        let allowed = f.router.ingest(driver(1650)).await.unwrap().unwrap();
        assert!(allowed.allowed);
        assert_eq!(next_decision(&mut relay).await.envelope.timestamp_ms, 1650);
    }

    /// A gate expiring at T is visible strictly before T and gone from T on.
    #[tokio::test]
    async fn test_expiry_boundary() {
        let f = fixture(0.5);
        let state = GateState::new(ScopeLevel::Room, "living_room", "lgn", 1.0, 0)
            .unwrap()
            .with_expiry(Some(1000));
        f.store.put(state).await.unwrap();

        let before = f.router.ingest(driver(999)).await.unwrap().unwrap();
        let at = f.router.ingest(driver(1000)).await.unwrap().unwrap();

        assert!(!before.allowed);
        assert!(at.allowed);
        assert!(f
            .store
            .get(ScopeLevel::Room, "living_room", "lgn", 1000)
            .await
            .unwrap()
            .is_none());
    }

    /// Closing then reopening a gate through the control surface.
    #[tokio::test]
    async fn test_close_and_open_gate() {
        let f = fixture(0.5);

        f.router
            .close_gate(ScopeLevel::Room, "living_room", "lgn", 10, Some("maintenance"))
            .await
            .unwrap();
        assert!(!f.router.ingest(driver(20)).await.unwrap().unwrap().allowed);

        f.router
            .open_gate(ScopeLevel::Room, "living_room", "lgn", 30, None)
            .await
            .unwrap();
        assert!(f.router.ingest(driver(40)).await.unwrap().unwrap().allowed);

        let stats = f.router.stats();
        assert_eq!(stats.relayed, 1);
        assert_eq!(stats.blocked, 1);
    }

    // =========================================================================
    // PROPERTIES
    // =========================================================================

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        /// A driver passes exactly when inhibition is strictly below the
        /// threshold; equality blocks.
        #[test]
        fn prop_admission_is_strict(inhibition in 0.0f64..=1.0, threshold in 0.0f64..=1.0) {
            let runtime = tokio::runtime::Builder::new_current_thread().build().unwrap();
            let allowed = runtime.block_on(async {
                let f = fixture(threshold);
                f.router
                    .set_inhibition(ScopeLevel::Room, "living_room", "lgn", inhibition, 0, None)
                    .await
                    .unwrap();
                f.router.ingest(driver(1)).await.unwrap().unwrap().allowed
            });
            prop_assert_eq!(allowed, inhibition < threshold);
        }

        #[test]
        fn prop_equal_inhibition_blocks(level in 0.0f64..=1.0) {
            let runtime = tokio::runtime::Builder::new_current_thread().build().unwrap();
            let allowed = runtime.block_on(async {
                let f = fixture(level);
                f.router
                    .set_inhibition(ScopeLevel::Room, "living_room", "lgn", level, 0, None)
                    .await
                    .unwrap();
                f.router.ingest(driver(1)).await.unwrap().unwrap().allowed
            });
            prop_assert!(!allowed);
        }
    }
}
