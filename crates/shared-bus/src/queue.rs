//! Bounded per-subscriber queue.
//!
//! A full queue evicts its oldest message to admit a new one, so publishers
//! never wait on slow subscribers and memory stays bounded.

use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::Notify;

pub(crate) struct SubscriberQueue<M> {
    id: u64,
    capacity: usize,
    buffer: Mutex<VecDeque<M>>,
    notify: Notify,
    closed: AtomicBool,
}

impl<M> SubscriberQueue<M> {
    pub(crate) fn new(id: u64, capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            id,
            capacity,
            buffer: Mutex::new(VecDeque::with_capacity(capacity.min(1024))),
            notify: Notify::new(),
            closed: AtomicBool::new(false),
        }
    }

    pub(crate) fn id(&self) -> u64 {
        self.id
    }

    pub(crate) fn capacity(&self) -> usize {
        self.capacity
    }

    /// Enqueue a message. Returns true if the oldest message was evicted.
    ///
    /// Messages pushed after close are dropped.
    pub(crate) fn push(&self, msg: M) -> bool {
        if self.is_closed() {
            return false;
        }
        let evicted = {
            let mut buffer = self.buffer.lock();
            let evicted = if buffer.len() >= self.capacity {
                buffer.pop_front().is_some()
            } else {
                false
            };
            buffer.push_back(msg);
            evicted
        };
        self.notify.notify_one();
        evicted
    }

    pub(crate) fn pop(&self) -> Option<M> {
        self.buffer.lock().pop_front()
    }

    pub(crate) fn len(&self) -> usize {
        self.buffer.lock().len()
    }

    pub(crate) fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Mark closed, discard buffered messages and wake a pending receiver.
    pub(crate) fn close(&self) {
        self.closed.store(true, Ordering::Release);
        self.buffer.lock().clear();
        self.notify.notify_one();
    }

    /// Wait until a push or close happens.
    pub(crate) async fn wait(&self) {
        self.notify.notified().await;
    }
}
