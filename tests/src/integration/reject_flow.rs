//! # Reject Flow
//!
//! Plane boundaries in front of the bus: accepted traffic reaches its
//! dispatch hook, everything else converges on the scope's reflect channel.

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use async_trait::async_trait;
    use nr_01_gate_router::{
        GateRouter, GateRouterApi, InMemoryGateStore, InMemoryGlobalModeStore,
        ModeBiasedThresholdPolicy, RecordingCortexPort, StaticRoutingPolicy,
    };
    use nr_02_plane_ingress::{
        DispatchHook, IngressConfig, IngressError, IngressOutcome, NoopDispatch, PlaneIngress,
        PlaneIngressApi,
    };
    use parking_lot::Mutex;
    use shared_bus::{InMemoryTopicBus, TopicBus};
    use shared_types::{
        BusMessage, Envelope, Meta, MessageType, Plane, PlaneSignal, ScopeLevel, REJECT_WRONG_TYPE,
    };
    use tokio::sync::watch;
    use tokio::time::timeout;

    const REJECTS: &str = "/X/reflect/room/living_room/lane/reject";
    const UNSCOPED_REJECTS: &str = "/X/reflect/house/unknown/lane/reject";
    const ROOM_UNKNOWN_REJECTS: &str = "/X/reflect/room/unknown/lane/reject";

    // =========================================================================
    // TEST FIXTURES
    // =========================================================================

    /// Forwards thalamic envelopes into a gate router.
    struct RouterHook(Arc<GateRouter>);

    #[async_trait]
    impl DispatchHook for RouterHook {
        async fn dispatch(&self, _topic: &str, msg: BusMessage) -> Result<(), IngressError> {
            let BusMessage::Envelope(envelope) = msg else {
                return Err(IngressError::Dispatch("envelopes only".into()));
            };
            self.0
                .ingest(envelope)
                .await
                .map(|_| ())
                .map_err(|e| IngressError::Dispatch(e.to_string()))
        }
    }

    /// Remembers the topics it was handed.
    #[derive(Default)]
    struct TopicLog(Mutex<Vec<String>>);

    #[async_trait]
    impl DispatchHook for TopicLog {
        async fn dispatch(&self, topic: &str, _msg: BusMessage) -> Result<(), IngressError> {
            self.0.lock().push(topic.to_string());
            Ok(())
        }
    }

    fn signal(message_type: MessageType, plane: Plane) -> PlaneSignal {
        PlaneSignal::new(Meta::new(message_type, plane, 77).with_source("device-3"))
            .with_scope(ScopeLevel::Room, "living_room")
    }

    fn bus() -> Arc<InMemoryTopicBus> {
        Arc::new(InMemoryTopicBus::<BusMessage>::new())
    }

    // =========================================================================
    // INTEGRATION TESTS
    // =========================================================================

    /// Wrong-type traffic on any boundary lands on the same reject topic.
    #[tokio::test]
    async fn test_every_boundary_rejects_onto_one_topic() {
        let bus = bus();
        let mut rejects = bus.subscribe(REJECTS);
        let boundaries = [
            IngressConfig::thalamus(),
            IngressConfig::spinal(),
            IngressConfig::brainstem(),
        ]
        .map(|config| PlaneIngress::new(config, bus.clone(), Arc::new(NoopDispatch)).unwrap());

        for boundary in &boundaries {
            let outcome = boundary
                .ingest("/E/command/room/living_room", signal(MessageType::OutcomeEvent, Plane::Cortex).into())
                .await
                .unwrap();
            assert_eq!(
                outcome,
                IngressOutcome::Rejected {
                    reject_topic: REJECTS.to_string()
                }
            );
        }

        let mut planes = Vec::new();
        while let Some(BusMessage::Reject(reject)) = rejects.try_recv().unwrap() {
            assert_eq!(reject.reason, REJECT_WRONG_TYPE);
            assert_eq!(reject.original_topic, "/E/command/room/living_room");
            assert_eq!(reject.publisher_id.as_deref(), Some("device-3"));
            assert_eq!(reject.meta.timestamp_ms, 77);
            assert_eq!(reject.details["observed_type"], "OutcomeEvent");
            planes.push(reject.meta.origin_plane);
        }
        assert_eq!(planes, vec![Plane::Thalamus, Plane::Spinal, Plane::Brainstem]);
    }

    /// The thalamus boundary feeds the router; a foreign type never reaches it.
    #[tokio::test]
    async fn test_thalamus_boundary_in_front_of_router() {
        let bus = bus();
        let cortex = Arc::new(RecordingCortexPort::new());
        let router = Arc::new(GateRouter::new(
            Arc::new(InMemoryGateStore::new()),
            Arc::new(InMemoryGlobalModeStore::new()),
            Arc::new(StaticRoutingPolicy::sensory_defaults()),
            Arc::new(ModeBiasedThresholdPolicy::new()),
            cortex.clone(),
        ));
        let thalamus =
            PlaneIngress::new(IngressConfig::thalamus(), bus.clone(), Arc::new(RouterHook(router.clone())))
                .unwrap();
        let mut rejects = bus.subscribe(REJECTS);

        let env = Envelope::driver(ScopeLevel::Room, "living_room", "lgn", 1000);
        let topic = "/A/driver/room/living_room/nucleus/lgn";
        assert_eq!(
            thalamus.ingest(topic, env.into()).await.unwrap(),
            IngressOutcome::Dispatched
        );
        let afferent = signal(MessageType::AfferentSignal, Plane::Spinal);
        assert!(thalamus.ingest(topic, afferent.into()).await.unwrap().is_rejected());

        assert_eq!(router.stats().received, 1);
        assert_eq!(cortex.decisions().len(), 1);
        assert!(matches!(rejects.try_recv().unwrap(), Some(BusMessage::Reject(_))));

        let stats = thalamus.stats();
        assert_eq!(stats.dispatched, 1);
        assert_eq!(stats.rejected, 1);
    }

    /// A running spinal boundary sorts a mixed subscription until shutdown.
    #[tokio::test]
    async fn test_running_boundary_sorts_traffic() {
        let bus = bus();
        let log = Arc::new(TopicLog::default());
        let spinal = Arc::new(PlaneIngress::new(IngressConfig::spinal(), bus.clone(), log.clone()).unwrap());
        let mut rejects = bus.subscribe(UNSCOPED_REJECTS);

        let topic = "/A/driver/room/living_room/nucleus/dorsal_horn";
        let subscriptions = vec![bus.subscribe(topic)];
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let runner = {
            let spinal = spinal.clone();
            tokio::spawn(async move { spinal.run(subscriptions, shutdown_rx).await })
        };

        bus.publish(topic, signal(MessageType::ReflexTrigger, Plane::Spinal).into()).await;
        bus.publish(topic, PlaneSignal::headerless().into()).await;

        let reject = timeout(Duration::from_secs(1), async {
            loop {
                if let Some(BusMessage::Reject(reject)) = rejects.recv().await {
                    return reject;
                }
            }
        })
        .await
        .expect("no reject published");
        assert_eq!(reject.details["observed_type"], "none");
        assert_eq!(reject.scope, "unknown");
        assert_eq!(reject.publisher_id, None);

        timeout(Duration::from_secs(1), async {
            while spinal.stats().dispatched < 1 {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .expect("reflex trigger never dispatched");
        assert_eq!(*log.0.lock(), vec![topic.to_string()]);

        shutdown_tx.send(true).unwrap();
        timeout(Duration::from_secs(1), runner).await.unwrap().unwrap();
    }

    /// A relay bundle with a blank scope reaching the spinal boundary is
    /// still reflected, addressed to the unknown scope.
    #[tokio::test]
    async fn test_blank_scope_bundle_reflected_at_spinal_boundary() {
        let bus = bus();
        let spinal = Arc::new(
            PlaneIngress::new(IngressConfig::spinal(), bus.clone(), Arc::new(NoopDispatch)).unwrap(),
        );
        let mut rejects = bus.subscribe(ROOM_UNKNOWN_REJECTS);

        let topic = "/D/driver/room/living_room";
        let subscriptions = vec![bus.subscribe(topic)];
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let runner = {
            let spinal = spinal.clone();
            tokio::spawn(async move { spinal.run(subscriptions, shutdown_rx).await })
        };

        let bundle = PlaneSignal::new(
            Meta::new(MessageType::RelayBundle, Plane::Brainstem, 300).with_source("brainstem-1"),
        )
        .with_scope(ScopeLevel::Room, "");
        bus.publish(topic, bundle.into()).await;

        let reject = timeout(Duration::from_secs(1), async {
            loop {
                if let Some(BusMessage::Reject(reject)) = rejects.recv().await {
                    return reject;
                }
            }
        })
        .await
        .expect("no reject published");
        assert_eq!(reject.scope, "unknown");
        assert_eq!(reject.original_topic, topic);
        assert_eq!(reject.publisher_id.as_deref(), Some("brainstem-1"));
        assert_eq!(reject.details["observed_type"], "RelayBundle");

        shutdown_tx.send(true).unwrap();
        timeout(Duration::from_secs(1), runner).await.unwrap().unwrap();
    }
}
