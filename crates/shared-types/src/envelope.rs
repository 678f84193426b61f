//! # Envelope and Meta
//!
//! [`Envelope`] is the addressed unit the relay routes. [`Meta`] is the
//! header every plane message declares so a boundary can check its type
//! before touching the body.
//!
//! ## Addressing
//!
//! - `lane` + `kind` + `scope_level` + `scope` always form the topic prefix.
//! - `nucleus` is mandatory on driver, modulator and gate lanes.
//! - `correlation_id` ties reflections and decisions back to the producer.

use crate::entities::{Lane, MessageType, Payload, Plane, ScopeLevel, SignalKind, SCHEMA_VERSION};
use crate::errors::ContractError;
use crate::topics;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Typed header carried by plane messages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Meta {
    pub message_type: MessageType,
    pub schema_version: String,
    pub origin_plane: Plane,
    pub timestamp_ms: u64,
    pub correlation_id: Option<String>,
    pub source: Option<String>,
}

impl Meta {
    #[must_use]
    pub fn new(message_type: MessageType, origin_plane: Plane, timestamp_ms: u64) -> Self {
        Self {
            message_type,
            schema_version: SCHEMA_VERSION.to_string(),
            origin_plane,
            timestamp_ms,
            correlation_id: None,
            source: None,
        }
    }

    #[must_use]
    pub fn with_correlation_id(mut self, correlation_id: Option<String>) -> Self {
        self.correlation_id = correlation_id;
        self
    }

    #[must_use]
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }
}

/// Addressed signal routed by the gate router.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    pub lane: Lane,
    pub kind: SignalKind,
    pub scope_level: ScopeLevel,
    pub scope: String,
    pub timestamp_ms: u64,
    pub correlation_id: String,
    pub source: String,
    pub nucleus: Option<String>,
    pub priority: Option<i32>,
    pub salience: Option<f64>,
    pub deadline_ms: Option<u64>,
    pub confidence: Option<f64>,
    pub schema_version: String,
    #[serde(default)]
    pub payload: Payload,
}

impl Envelope {
    /// Create an envelope with a fresh correlation id and source `"unknown"`.
    #[must_use]
    pub fn new(
        lane: Lane,
        kind: SignalKind,
        scope_level: ScopeLevel,
        scope: impl Into<String>,
        timestamp_ms: u64,
    ) -> Self {
        Self {
            lane,
            kind,
            scope_level,
            scope: scope.into(),
            timestamp_ms,
            correlation_id: Uuid::new_v4().to_string(),
            source: "unknown".to_string(),
            nucleus: None,
            priority: None,
            salience: None,
            deadline_ms: None,
            confidence: None,
            schema_version: SCHEMA_VERSION.to_string(),
            payload: Payload::new(),
        }
    }

    /// Driver-kind envelope on lane A.
    #[must_use]
    pub fn driver(scope_level: ScopeLevel, scope: impl Into<String>, nucleus: impl Into<String>, timestamp_ms: u64) -> Self {
        Self::new(Lane::Driver, SignalKind::Driver, scope_level, scope, timestamp_ms).with_nucleus(nucleus)
    }

    /// Modulator-kind envelope on lane B.
    #[must_use]
    pub fn modulator(scope_level: ScopeLevel, scope: impl Into<String>, nucleus: impl Into<String>, timestamp_ms: u64) -> Self {
        Self::new(Lane::Modulator, SignalKind::Modulator, scope_level, scope, timestamp_ms).with_nucleus(nucleus)
    }

    /// Modulator-kind envelope on lane G.
    #[must_use]
    pub fn gate(scope_level: ScopeLevel, scope: impl Into<String>, nucleus: impl Into<String>, timestamp_ms: u64) -> Self {
        Self::new(Lane::Gate, SignalKind::Modulator, scope_level, scope, timestamp_ms).with_nucleus(nucleus)
    }

    #[must_use]
    pub fn with_nucleus(mut self, nucleus: impl Into<String>) -> Self {
        self.nucleus = Some(nucleus.into());
        self
    }

    #[must_use]
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = source.into();
        self
    }

    #[must_use]
    pub fn with_correlation_id(mut self, correlation_id: impl Into<String>) -> Self {
        self.correlation_id = correlation_id.into();
        self
    }

    #[must_use]
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = Some(priority);
        self
    }

    #[must_use]
    pub fn with_salience(mut self, salience: f64) -> Self {
        self.salience = Some(salience);
        self
    }

    #[must_use]
    pub fn with_deadline(mut self, deadline_ms: u64) -> Self {
        self.deadline_ms = Some(deadline_ms);
        self
    }

    #[must_use]
    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = Some(confidence);
        self
    }

    #[must_use]
    pub fn with_payload(mut self, payload: Payload) -> Self {
        self.payload = payload;
        self
    }

    /// Insert a single payload entry.
    #[must_use]
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.payload.insert(key.into(), value.into());
        self
    }

    /// Nucleus, or a contract error on lanes that require one.
    pub fn required_nucleus(&self) -> Result<&str, ContractError> {
        self.nucleus
            .as_deref()
            .ok_or(ContractError::MissingNucleus { lane: self.lane })
    }

    /// Topic this envelope is published on.
    pub fn topic(&self) -> Result<String, ContractError> {
        topics::topic_for(self)
    }

    /// Meta view of this envelope, used by ingress type checks.
    #[must_use]
    pub fn meta(&self) -> Meta {
        Meta::new(MessageType::ThalamicEnvelope, Plane::Thalamus, self.timestamp_ms)
            .with_correlation_id(Some(self.correlation_id.clone()))
            .with_source(self.source.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_defaults() {
        let env = Envelope::new(Lane::Command, SignalKind::Driver, ScopeLevel::Room, "kitchen", 10);

        assert_eq!(env.schema_version, "v1");
        assert_eq!(env.source, "unknown");
        assert!(env.nucleus.is_none());
        assert!(env.payload.is_empty());
        assert!(Uuid::parse_str(&env.correlation_id).is_ok());
    }

    #[test]
    fn test_required_nucleus() {
        let env = Envelope::new(Lane::Driver, SignalKind::Driver, ScopeLevel::Room, "kitchen", 10);
        assert_eq!(
            env.required_nucleus(),
            Err(ContractError::MissingNucleus { lane: Lane::Driver })
        );

        let env = env.with_nucleus("lgn");
        assert_eq!(env.required_nucleus(), Ok("lgn"));
    }

    #[test]
    fn test_envelope_topic() {
        let env = Envelope::driver(ScopeLevel::Room, "kitchen", "lgn", 10);
        assert_eq!(env.topic().unwrap(), "/A/driver/room/kitchen/nucleus/lgn");
    }

    #[test]
    fn test_with_field_builds_payload() {
        let env = Envelope::modulator(ScopeLevel::Room, "kitchen", "lgn", 10)
            .with_field("requested_inhibition", 0.9)
            .with_field("reason", "focus");

        assert_eq!(env.payload["requested_inhibition"], serde_json::json!(0.9));
        assert_eq!(env.payload["reason"], serde_json::json!("focus"));
    }

    #[test]
    fn test_envelope_serde_uses_wire_tokens() {
        let env = Envelope::gate(ScopeLevel::UserSession, "s1", "md", 5);
        let json = serde_json::to_value(&env).unwrap();

        assert_eq!(json["lane"], "G");
        assert_eq!(json["kind"], "modulator");
        assert_eq!(json["scope_level"], "user_session");
    }
}
