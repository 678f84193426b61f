//! # Subscriber
//!
//! Subscription handles for the topic bus.
//!
//! A [`Subscription`] owns one bounded queue registered on one topic. It is
//! removed from the topic either explicitly, via [`Subscription::close`] or a
//! [`SubscriptionCloser`], or implicitly when the handle is dropped.

use crate::queue::SubscriberQueue;
use parking_lot::RwLock;
use shared_types::BusMessage;
use std::collections::HashMap;
use std::pin::Pin;
use std::sync::Arc;
use thiserror::Error;
use tokio_stream::Stream;
use tracing::debug;

/// Topic → registered subscriber queues.
pub(crate) type Registry<M> = Arc<RwLock<HashMap<String, Vec<Arc<SubscriberQueue<M>>>>>>;

/// Errors from subscription operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SubscriptionError {
    /// The subscription was closed.
    #[error("Subscription closed")]
    Closed,
}

/// Boxed stream of messages from a subscription.
pub type SubscriptionStream<M = BusMessage> = Pin<Box<dyn Stream<Item = M> + Send>>;

fn unregister<M>(registry: &Registry<M>, topic: &str, queue: &SubscriberQueue<M>) {
    if queue.is_closed() {
        return;
    }
    queue.close();

    let mut subs = registry.write();
    if let Some(queues) = subs.get_mut(topic) {
        queues.retain(|q| q.id() != queue.id());
        if queues.is_empty() {
            subs.remove(topic);
        }
    }
    debug!(topic = %topic, subscriber = queue.id(), "Subscription closed");
}

/// A subscription handle for receiving messages published on one topic.
///
/// Messages arrive in publish order. The sequence ends once the subscription
/// is closed; buffered messages are discarded at that point.
pub struct Subscription<M = BusMessage> {
    queue: Arc<SubscriberQueue<M>>,
    registry: Registry<M>,
    topic: String,
}

impl<M> Subscription<M> {
    pub(crate) fn new(queue: Arc<SubscriberQueue<M>>, registry: Registry<M>, topic: String) -> Self {
        Self {
            queue,
            registry,
            topic,
        }
    }

    /// Receive the next message.
    ///
    /// # Returns
    ///
    /// - `Some(msg)` - The next queued message
    /// - `None` - The subscription was closed
    pub async fn recv(&mut self) -> Option<M> {
        loop {
            if self.queue.is_closed() {
                return None;
            }
            if let Some(msg) = self.queue.pop() {
                return Some(msg);
            }
            self.queue.wait().await;
        }
    }

    /// Try to receive the next message without waiting.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(msg))` - A message was queued
    /// - `Ok(None)` - Nothing queued right now
    /// - `Err(SubscriptionError::Closed)` - The subscription was closed
    pub fn try_recv(&mut self) -> Result<Option<M>, SubscriptionError> {
        if self.queue.is_closed() {
            return Err(SubscriptionError::Closed);
        }
        Ok(self.queue.pop())
    }

    /// Unsubscribe from the topic and discard anything still queued.
    ///
    /// Idempotent. A pending [`recv`](Self::recv) on another task is woken and
    /// returns `None`.
    pub fn close(&self) {
        unregister(&self.registry, &self.topic, &self.queue);
    }

    /// Cloneable handle that can close this subscription from elsewhere.
    #[must_use]
    pub fn closer(&self) -> SubscriptionCloser<M> {
        SubscriptionCloser {
            queue: self.queue.clone(),
            registry: self.registry.clone(),
            topic: self.topic.clone(),
        }
    }

    #[must_use]
    pub fn topic(&self) -> &str {
        &self.topic
    }

    /// Number of messages currently queued.
    #[must_use]
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.queue.capacity()
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.queue.is_closed()
    }
}

impl<M: Send + 'static> Subscription<M> {
    /// Convert into a stream that ends when the subscription closes.
    #[must_use]
    pub fn into_stream(self) -> SubscriptionStream<M> {
        Box::pin(futures::stream::unfold(self, |mut sub| async move {
            let msg = sub.recv().await?;
            Some((msg, sub))
        }))
    }
}

impl<M> Drop for Subscription<M> {
    fn drop(&mut self) {
        unregister(&self.registry, &self.topic, &self.queue);
    }
}

impl<M> std::fmt::Debug for Subscription<M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("topic", &self.topic)
            .field("queued", &self.queue.len())
            .field("closed", &self.queue.is_closed())
            .finish()
    }
}

/// Detached close handle for a [`Subscription`].
pub struct SubscriptionCloser<M = BusMessage> {
    queue: Arc<SubscriberQueue<M>>,
    registry: Registry<M>,
    topic: String,
}

impl<M> SubscriptionCloser<M> {
    /// Close the associated subscription. Idempotent.
    pub fn close(&self) {
        unregister(&self.registry, &self.topic, &self.queue);
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.queue.is_closed()
    }
}

impl<M> Clone for SubscriptionCloser<M> {
    fn clone(&self) -> Self {
        Self {
            queue: self.queue.clone(),
            registry: self.registry.clone(),
            topic: self.topic.clone(),
        }
    }
}
