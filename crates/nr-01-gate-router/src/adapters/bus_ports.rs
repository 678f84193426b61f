//! Output ports backed by the topic bus.
//!
//! - [`BusCortexPort`]: every decision is reflected on the scope's decision
//!   topic; admitted decisions are also delivered on each target's relay
//!   topic.
//! - [`BusGatePort`]: gate changes are announced on the gate-state topic.

use crate::error::PortError;
use crate::ports::outbound::{CortexPort, GatePort};
use async_trait::async_trait;
use shared_bus::TopicBus;
use shared_types::topics::{decision_topic, gate_state_topic, relay_topic};
use shared_types::{BusMessage, ContractError, GateState, RelayDecision};
use std::sync::Arc;
use tracing::debug;

fn invalid_topic(err: ContractError) -> PortError {
    PortError::InvalidTopic(err.to_string())
}

/// Publishes relay decisions on the bus.
pub struct BusCortexPort {
    bus: Arc<dyn TopicBus>,
}

impl BusCortexPort {
    #[must_use]
    pub fn new(bus: Arc<dyn TopicBus>) -> Self {
        Self { bus }
    }
}

#[async_trait]
impl CortexPort for BusCortexPort {
    async fn publish_decision(&self, decision: &RelayDecision) -> Result<(), PortError> {
        let env = &decision.envelope;

        let audit = decision_topic(env.scope_level, &env.scope).map_err(invalid_topic)?;
        self.bus
            .publish(&audit, BusMessage::Decision(decision.clone()))
            .await;

        if !decision.allowed {
            return Ok(());
        }
        for target in &decision.targets {
            let topic = relay_topic(target).map_err(invalid_topic)?;
            let receivers = self
                .bus
                .publish(&topic, BusMessage::Decision(decision.clone()))
                .await;
            debug!(
                topic = %topic,
                receivers,
                correlation_id = %env.correlation_id,
                "Relayed driver signal"
            );
        }
        Ok(())
    }
}

/// Announces gate state changes on the bus.
pub struct BusGatePort {
    bus: Arc<dyn TopicBus>,
}

impl BusGatePort {
    #[must_use]
    pub fn new(bus: Arc<dyn TopicBus>) -> Self {
        Self { bus }
    }
}

#[async_trait]
impl GatePort for BusGatePort {
    async fn publish_gate(&self, state: &GateState) -> Result<(), PortError> {
        let topic = gate_state_topic(state).map_err(invalid_topic)?;
        self.bus.publish(&topic, BusMessage::Gate(state.clone())).await;
        Ok(())
    }
}
