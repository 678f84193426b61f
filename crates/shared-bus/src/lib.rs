//! # Shared Bus - Topic Bus for Inter-Boundary Communication
//!
//! Boundaries never call each other directly. They publish messages on
//! string topics and consume them through subscriptions.
//!
//! ```text
//! ┌──────────────┐                    ┌──────────────┐
//! │  Boundary A  │                    │  Boundary B  │
//! │              │    publish()       │              │
//! │              │ ──────┐            │              │
//! └──────────────┘       │            └──────────────┘
//!                        ▼                    ↑
//!                  ┌──────────────┐          │
//!                  │  Topic Bus   │          │
//!                  │ [queue][queue]│ ─────────┘
//!                  └──────────────┘  subscribe()
//! ```
//!
//! ## Delivery Rules
//!
//! - Every subscription on a topic receives each message exactly once.
//! - Per-subscription FIFO; no ordering across topics.
//! - Bounded queues: a full queue evicts its oldest message, the publisher
//!   never waits.
//! - Subscriptions end on explicit close or on drop.

// Nursery lints that are too strict
#![allow(clippy::missing_const_for_fn)]
// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::panic))]

pub mod metrics;
pub mod publisher;
mod queue;
pub mod subscriber;

// Re-export main types
pub use metrics::{BusMetricsRecorder, NoOpBusMetrics};
pub use publisher::{InMemoryTopicBus, TopicBus};
pub use subscriber::{Subscription, SubscriptionCloser, SubscriptionError, SubscriptionStream};

/// Default number of messages buffered per subscription.
pub const DEFAULT_QUEUE_CAPACITY: usize = 1000;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_capacity() {
        assert_eq!(DEFAULT_QUEUE_CAPACITY, 1000);
        assert_eq!(InMemoryTopicBus::<u8>::new().capacity(), DEFAULT_QUEUE_CAPACITY);
    }
}
