//! # Bus Messages
//!
//! The single message type carried on the topic bus. Boundaries inspect the
//! header accessors to validate a message without matching on its body.

use crate::entities::{GateState, MessageType, Payload, RejectEvent, RelayDecision, ScopeLevel};
use crate::envelope::{Envelope, Meta};
use serde::{Deserialize, Serialize};

/// Generic message from a plane that this workspace does not model.
///
/// `meta` may be missing; such messages are rejected by every boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaneSignal {
    pub meta: Option<Meta>,
    pub scope_level: Option<ScopeLevel>,
    pub scope: Option<String>,
    #[serde(default)]
    pub body: Payload,
}

impl PlaneSignal {
    #[must_use]
    pub fn new(meta: Meta) -> Self {
        Self {
            meta: Some(meta),
            scope_level: None,
            scope: None,
            body: Payload::new(),
        }
    }

    /// A signal with no header at all.
    #[must_use]
    pub fn headerless() -> Self {
        Self {
            meta: None,
            scope_level: None,
            scope: None,
            body: Payload::new(),
        }
    }

    #[must_use]
    pub fn with_scope(mut self, scope_level: ScopeLevel, scope: impl Into<String>) -> Self {
        self.scope_level = Some(scope_level);
        self.scope = Some(scope.into());
        self
    }

    #[must_use]
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.body.insert(key.into(), value.into());
        self
    }
}

/// Everything that travels over the topic bus.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "body")]
pub enum BusMessage {
    Envelope(Envelope),
    Decision(RelayDecision),
    Gate(GateState),
    Reject(RejectEvent),
    Signal(PlaneSignal),
}

impl BusMessage {
    /// Declared type, `None` when the message carries no header.
    #[must_use]
    pub fn message_type(&self) -> Option<MessageType> {
        match self {
            Self::Envelope(_) => Some(MessageType::ThalamicEnvelope),
            Self::Decision(_) => Some(MessageType::RelayDecision),
            Self::Gate(_) => Some(MessageType::GateState),
            Self::Reject(_) => Some(MessageType::RejectEvent),
            Self::Signal(signal) => signal.meta.as_ref().map(|meta| meta.message_type),
        }
    }

    #[must_use]
    pub fn timestamp_ms(&self) -> Option<u64> {
        match self {
            Self::Envelope(env) => Some(env.timestamp_ms),
            Self::Decision(decision) => Some(decision.envelope.timestamp_ms),
            Self::Gate(state) => Some(state.timestamp_ms),
            Self::Reject(reject) => Some(reject.meta.timestamp_ms),
            Self::Signal(signal) => signal.meta.as_ref().map(|meta| meta.timestamp_ms),
        }
    }

    #[must_use]
    pub fn correlation_id(&self) -> Option<&str> {
        match self {
            Self::Envelope(env) => Some(&env.correlation_id),
            Self::Decision(decision) => Some(&decision.envelope.correlation_id),
            Self::Gate(_) => None,
            Self::Reject(reject) => reject.meta.correlation_id.as_deref(),
            Self::Signal(signal) => signal.meta.as_ref()?.correlation_id.as_deref(),
        }
    }

    /// Identity of whoever produced the message.
    #[must_use]
    pub fn publisher_id(&self) -> Option<&str> {
        match self {
            Self::Envelope(env) => Some(&env.source),
            Self::Decision(decision) => Some(&decision.envelope.source),
            Self::Gate(_) => None,
            Self::Reject(reject) => reject.meta.source.as_deref(),
            Self::Signal(signal) => signal.meta.as_ref()?.source.as_deref(),
        }
    }

    /// Scope the message addresses, when it declares one.
    #[must_use]
    pub fn scope(&self) -> (Option<ScopeLevel>, Option<&str>) {
        match self {
            Self::Envelope(env) => (Some(env.scope_level), Some(&env.scope)),
            Self::Decision(decision) => (
                Some(decision.envelope.scope_level),
                Some(&decision.envelope.scope),
            ),
            Self::Gate(state) => (Some(state.scope_level), Some(&state.scope)),
            Self::Reject(reject) => (Some(reject.scope_level), Some(&reject.scope)),
            Self::Signal(signal) => (signal.scope_level, signal.scope.as_deref()),
        }
    }
}

impl From<Envelope> for BusMessage {
    fn from(env: Envelope) -> Self {
        Self::Envelope(env)
    }
}

impl From<RelayDecision> for BusMessage {
    fn from(decision: RelayDecision) -> Self {
        Self::Decision(decision)
    }
}

impl From<GateState> for BusMessage {
    fn from(state: GateState) -> Self {
        Self::Gate(state)
    }
}

impl From<RejectEvent> for BusMessage {
    fn from(reject: RejectEvent) -> Self {
        Self::Reject(reject)
    }
}

impl From<PlaneSignal> for BusMessage {
    fn from(signal: PlaneSignal) -> Self {
        Self::Signal(signal)
    }
}
