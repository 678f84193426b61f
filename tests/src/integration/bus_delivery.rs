//! # Bus Delivery
//!
//! Fan-out, ordering and overflow behaviour of the topic bus as seen by
//! several independent boundaries sharing one topic.

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use shared_bus::{InMemoryTopicBus, Subscription, TopicBus};
    use shared_types::{BusMessage, Envelope, ScopeLevel};
    use tokio::time::timeout;

    const TOPIC: &str = "/A/driver/room/living_room/nucleus/lgn";

    fn driver(timestamp_ms: u64) -> BusMessage {
        Envelope::driver(ScopeLevel::Room, "living_room", "lgn", timestamp_ms).into()
    }

    fn drain(sub: &mut Subscription) -> Vec<Option<u64>> {
        let mut seen = Vec::new();
        while let Some(msg) = sub.try_recv().unwrap() {
            seen.push(msg.timestamp_ms());
        }
        seen
    }

    /// Every subscriber receives every message exactly once, in publish order.
    #[tokio::test]
    async fn test_fan_out_exactly_once_in_order() {
        let bus = InMemoryTopicBus::<BusMessage>::new();
        let mut subs: Vec<_> = (0..4).map(|_| bus.subscribe(TOPIC)).collect();

        for ts in 1..=10 {
            assert_eq!(bus.publish(TOPIC, driver(ts)).await, 4);
        }

        let expected: Vec<_> = (1..=10).map(Some).collect();
        for sub in &mut subs {
            assert_eq!(drain(sub), expected);
        }
        assert_eq!(bus.events_published(), 10);
    }

    /// A subscription on a neighbouring topic sees nothing.
    #[tokio::test]
    async fn test_delivery_is_exact_topic() {
        let bus = InMemoryTopicBus::<BusMessage>::new();
        let mut other = bus.subscribe("/A/driver/room/living_room/nucleus/mgn");

        assert_eq!(bus.publish(TOPIC, driver(1)).await, 0);
        assert!(other.try_recv().unwrap().is_none());
    }

    /// A full queue drops exactly its oldest entry per publish.
    #[tokio::test]
    async fn test_full_queue_evicts_oldest() {
        let bus = InMemoryTopicBus::<BusMessage>::with_capacity(3);
        let mut slow = bus.subscribe(TOPIC);
        let mut roomy = bus.subscribe_with_capacity(TOPIC, 10);

        for ts in 1..=3 {
            bus.publish(TOPIC, driver(ts)).await;
        }
        assert_eq!(slow.len(), 3);

        bus.publish(TOPIC, driver(4)).await;

        assert_eq!(slow.len(), 3);
        assert_eq!(bus.events_evicted(), 1);
        assert_eq!(drain(&mut slow), vec![Some(2), Some(3), Some(4)]);
        assert_eq!(drain(&mut roomy).len(), 4);
    }

    /// A waiting consumer on another task is woken by a later publish.
    #[tokio::test]
    async fn test_consumer_task_receives_concurrent_publishes() {
        let bus = Arc::new(InMemoryTopicBus::<BusMessage>::new());
        let mut sub = bus.subscribe(TOPIC);

        let consumer = tokio::spawn(async move {
            let mut seen = Vec::new();
            while seen.len() < 5 {
                match sub.recv().await {
                    Some(msg) => seen.push(msg.timestamp_ms()),
                    None => break,
                }
            }
            seen
        });

        let publisher = bus.clone();
        tokio::spawn(async move {
            for ts in 1..=5 {
                publisher.publish(TOPIC, driver(ts)).await;
                tokio::task::yield_now().await;
            }
        });

        let seen = timeout(Duration::from_secs(1), consumer)
            .await
            .expect("consumer timed out")
            .unwrap();
        assert_eq!(seen, (1..=5).map(Some).collect::<Vec<_>>());
    }

    /// Closing one subscription leaves the others delivering.
    #[tokio::test]
    async fn test_close_detaches_only_that_subscription() {
        let bus = InMemoryTopicBus::<BusMessage>::new();
        let mut closed = bus.subscribe(TOPIC);
        let mut open = bus.subscribe(TOPIC);

        closed.close();

        assert_eq!(bus.publish(TOPIC, driver(1)).await, 1);
        assert!(closed.recv().await.is_none());
        assert_eq!(drain(&mut open), vec![Some(1)]);
        assert_eq!(bus.subscriber_count(TOPIC), 1);
    }
}
