//! # Topic Bus
//!
//! Publishing side of the bus and the in-memory implementation.

use crate::metrics::{BusMetricsRecorder, NoOpBusMetrics};
use crate::queue::SubscriberQueue;
use crate::subscriber::{Registry, Subscription};
use crate::DEFAULT_QUEUE_CAPACITY;
use async_trait::async_trait;
use parking_lot::RwLock;
use shared_types::BusMessage;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::debug;

/// Topic-addressed publish/subscribe bus.
///
/// Delivery is exact-topic: a message reaches every subscription registered
/// on the same topic string at publish time, each exactly once.
#[async_trait]
pub trait TopicBus<M: Send + 'static = BusMessage>: Send + Sync {
    /// Publish a message to a topic.
    ///
    /// # Returns
    ///
    /// The number of subscriber queues the message was delivered to.
    async fn publish(&self, topic: &str, msg: M) -> usize;

    /// Subscribe to a topic using the bus default queue capacity.
    fn subscribe(&self, topic: &str) -> Subscription<M>;

    /// Subscribe to a topic with an explicit queue capacity.
    fn subscribe_with_capacity(&self, topic: &str, capacity: usize) -> Subscription<M>;
}

/// In-memory implementation of the topic bus.
///
/// Each subscription owns a bounded queue. Publishing never waits: a full
/// queue drops its oldest message to make room.
pub struct InMemoryTopicBus<M = BusMessage> {
    /// Registered subscriber queues by topic.
    registry: Registry<M>,

    /// Default capacity for new subscriptions.
    capacity: usize,

    next_id: AtomicU64,

    /// Total messages published.
    events_published: AtomicU64,

    /// Total messages dropped from full queues.
    events_evicted: AtomicU64,

    recorder: Arc<dyn BusMetricsRecorder>,
}

impl<M: Clone + Send + 'static> InMemoryTopicBus<M> {
    /// Create a new bus with default queue capacity.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_QUEUE_CAPACITY)
    }

    /// Create a new bus with the specified default queue capacity.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            registry: Arc::new(RwLock::new(HashMap::new())),
            capacity: capacity.max(1),
            next_id: AtomicU64::new(0),
            events_published: AtomicU64::new(0),
            events_evicted: AtomicU64::new(0),
            recorder: Arc::new(NoOpBusMetrics),
        }
    }

    /// Attach an external metrics recorder.
    #[must_use]
    pub fn with_metrics(mut self, recorder: Arc<dyn BusMetricsRecorder>) -> Self {
        self.recorder = recorder;
        self
    }

    /// Number of subscriptions currently registered on a topic.
    #[must_use]
    pub fn subscriber_count(&self, topic: &str) -> usize {
        self.registry.read().get(topic).map_or(0, Vec::len)
    }

    /// Topics with at least one subscription.
    #[must_use]
    pub fn topics(&self) -> Vec<String> {
        let mut topics: Vec<String> = self.registry.read().keys().cloned().collect();
        topics.sort();
        topics
    }

    /// Default queue capacity for new subscriptions.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Total messages published, including those nobody received.
    #[must_use]
    pub fn events_published(&self) -> u64 {
        self.events_published.load(Ordering::Relaxed)
    }

    /// Total messages evicted from full subscriber queues.
    #[must_use]
    pub fn events_evicted(&self) -> u64 {
        self.events_evicted.load(Ordering::Relaxed)
    }

    fn register(&self, topic: &str, capacity: usize) -> Subscription<M> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let queue = Arc::new(SubscriberQueue::new(id, capacity));

        self.registry
            .write()
            .entry(topic.to_string())
            .or_default()
            .push(queue.clone());

        debug!(topic = %topic, subscriber = id, capacity = queue.capacity(), "New subscription created");

        Subscription::new(queue, self.registry.clone(), topic.to_string())
    }
}

impl<M: Clone + Send + 'static> Default for InMemoryTopicBus<M> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<M: Clone + Send + Sync + 'static> TopicBus<M> for InMemoryTopicBus<M> {
    async fn publish(&self, topic: &str, msg: M) -> usize {
        self.events_published.fetch_add(1, Ordering::Relaxed);

        // Snapshot so slow pushes never hold the registry lock.
        let queues: Vec<Arc<SubscriberQueue<M>>> = self
            .registry
            .read()
            .get(topic)
            .cloned()
            .unwrap_or_default();

        let mut delivered = 0;
        for queue in &queues {
            if queue.is_closed() {
                continue;
            }
            if queue.push(msg.clone()) {
                self.events_evicted.fetch_add(1, Ordering::Relaxed);
                self.recorder.record_eviction(topic);
                debug!(topic = %topic, subscriber = queue.id(), "Subscriber queue full, oldest message evicted");
            }
            delivered += 1;
        }

        self.recorder.record_publish(topic, delivered);
        debug!(topic = %topic, receivers = delivered, "Message published");
        delivered
    }

    fn subscribe(&self, topic: &str) -> Subscription<M> {
        self.register(topic, self.capacity)
    }

    fn subscribe_with_capacity(&self, topic: &str, capacity: usize) -> Subscription<M> {
        self.register(topic, capacity)
    }
}
