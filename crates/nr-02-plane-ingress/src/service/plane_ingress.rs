//! Plane Ingress Service
//!
//! One configuration-driven boundary: checks the declared type of every
//! inbound message against the allow-list, hands accepted traffic to the
//! dispatch hook and publishes refused traffic as a reject event.

use crate::domain::{build_reject, IngressConfig};
use crate::error::IngressError;
use crate::metrics::{IngressMetricsRecorder, IngressStats, IngressStatsSnapshot, NoOpIngressMetrics};
use crate::ports::{DispatchHook, IngressOutcome, PlaneIngressApi};
use async_trait::async_trait;
use shared_bus::{Subscription, TopicBus};
use shared_types::BusMessage;
use std::sync::Arc;
use tokio::sync::watch;
use tokio_stream::{StreamExt, StreamMap};
use tracing::{debug, info, warn};

/// Validate-then-dispatch-or-reject boundary.
pub struct PlaneIngress {
    config: IngressConfig,
    bus: Arc<dyn TopicBus>,
    hook: Arc<dyn DispatchHook>,
    stats: IngressStats,
    recorder: Arc<dyn IngressMetricsRecorder>,
}

impl PlaneIngress {
    /// Create a boundary. Fails if the configuration does not validate.
    pub fn new(
        config: IngressConfig,
        bus: Arc<dyn TopicBus>,
        hook: Arc<dyn DispatchHook>,
    ) -> Result<Self, IngressError> {
        config.validate()?;
        Ok(Self {
            config,
            bus,
            hook,
            stats: IngressStats::new(),
            recorder: Arc::new(NoOpIngressMetrics),
        })
    }

    #[must_use]
    pub fn with_metrics(mut self, recorder: Arc<dyn IngressMetricsRecorder>) -> Self {
        self.recorder = recorder;
        self
    }

    #[must_use]
    pub fn stats(&self) -> IngressStatsSnapshot {
        self.stats.snapshot()
    }

    async fn reject(&self, topic: &str, msg: &BusMessage) -> Result<IngressOutcome, IngressError> {
        let (reject_topic, event) = build_reject(&self.config, topic, msg)?;
        warn!(
            plane = %self.config.plane,
            topic = %topic,
            observed = ?msg.message_type(),
            reject_topic = %reject_topic,
            "Message type not accepted at boundary"
        );
        self.bus
            .publish(&reject_topic, BusMessage::Reject(event))
            .await;
        self.stats.record_reject();
        self.recorder.record_reject(self.config.plane);
        Ok(IngressOutcome::Rejected { reject_topic })
    }

    /// Drive the boundary from bus subscriptions until `shutdown` flips to
    /// `true` or every subscription has closed.
    ///
    /// Dispatch failures are logged and skipped; one bad message never
    /// stops the boundary.
    pub async fn run(&self, subscriptions: Vec<Subscription>, mut shutdown: watch::Receiver<bool>) {
        let mut streams = StreamMap::new();
        for subscription in subscriptions {
            let topic = subscription.topic().to_string();
            streams.insert(topic, subscription.into_stream());
        }
        info!(
            plane = %self.config.plane,
            topics = streams.len(),
            "Plane ingress started"
        );

        loop {
            tokio::select! {
                next = streams.next() => {
                    let Some((topic, msg)) = next else {
                        info!(plane = %self.config.plane, "All ingress subscriptions closed");
                        break;
                    };
                    if let Err(err) = self.ingest(&topic, msg).await {
                        warn!(plane = %self.config.plane, topic = %topic, error = %err, "Ingress failed");
                    }
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        info!(plane = %self.config.plane, "Shutdown signal received");
                        break;
                    }
                }
            }
        }
    }
}

#[async_trait]
impl PlaneIngressApi for PlaneIngress {
    async fn ingest(&self, topic: &str, msg: BusMessage) -> Result<IngressOutcome, IngressError> {
        if !self.config.accepts(msg.message_type()) {
            return self.reject(topic, &msg).await;
        }

        debug!(plane = %self.config.plane, topic = %topic, "Dispatching message");
        match self.hook.dispatch(topic, msg).await {
            Ok(()) => {
                self.stats.record_dispatch(true);
                self.recorder.record_dispatch(self.config.plane, true);
                Ok(IngressOutcome::Dispatched)
            }
            Err(err) => {
                self.stats.record_dispatch(false);
                self.recorder.record_dispatch(self.config.plane, false);
                Err(err)
            }
        }
    }

    fn config(&self) -> &IngressConfig {
        &self.config
    }
}
