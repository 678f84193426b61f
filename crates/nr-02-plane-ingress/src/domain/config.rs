//! Boundary configuration and presets.
//!
//! A boundary is fully described by its allow-list, origin plane, reject
//! hint and publisher id; everything else is shared pipeline.

use crate::error::IngressError;
use serde::{Deserialize, Serialize};
use shared_types::{MessageType, Plane};

/// Configuration of one plane boundary.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngressConfig {
    /// Plane stamped as origin on emitted rejects.
    pub plane: Plane,
    /// Message types accepted for dispatch.
    pub allowed: Vec<MessageType>,
    /// Human-readable hint attached to every reject.
    pub hint: String,
    /// Source identity of emitted rejects.
    pub publisher_id: String,
}

impl IngressConfig {
    /// Build a configuration with a generated hint.
    #[must_use]
    pub fn new(plane: Plane, publisher_id: impl Into<String>, allowed: Vec<MessageType>) -> Self {
        let hint = format!("{} accepts {}.", display_name(plane), join_types(&allowed));
        Self {
            plane,
            allowed,
            hint,
            publisher_id: publisher_id.into(),
        }
    }

    /// Thalamus: relay bundles, thalamic envelopes and global broadcasts.
    #[must_use]
    pub fn thalamus() -> Self {
        Self::new(
            Plane::Thalamus,
            "thalamus",
            vec![
                MessageType::RelayBundle,
                MessageType::ThalamicEnvelope,
                MessageType::GlobalBroadcast,
            ],
        )
    }

    /// Spinal cord: afferent signals, efferent commands and reflex control.
    #[must_use]
    pub fn spinal() -> Self {
        Self::new(
            Plane::Spinal,
            "spinal",
            vec![
                MessageType::AfferentSignal,
                MessageType::EfferentCommand,
                MessageType::ReflexRule,
                MessageType::ReflexTrigger,
            ],
        )
        .with_hint("SpinalCord accepts only AfferentSignal, EfferentCommand, ReflexRule, ReflexTrigger.")
    }

    /// Brainstem: afferent signals, relay bundles, pattern triggers and
    /// global broadcasts.
    #[must_use]
    pub fn brainstem() -> Self {
        Self::new(
            Plane::Brainstem,
            "brainstem",
            vec![
                MessageType::AfferentSignal,
                MessageType::RelayBundle,
                MessageType::PatternTrigger,
                MessageType::GlobalBroadcast,
            ],
        )
    }

    #[must_use]
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = hint.into();
        self
    }

    #[must_use]
    pub fn with_publisher_id(mut self, publisher_id: impl Into<String>) -> Self {
        self.publisher_id = publisher_id.into();
        self
    }

    /// True when `message_type` may pass this boundary. Headerless messages
    /// never pass.
    #[must_use]
    pub fn accepts(&self, message_type: Option<MessageType>) -> bool {
        message_type.is_some_and(|t| self.allowed.contains(&t))
    }

    pub fn validate(&self) -> Result<(), IngressError> {
        if self.publisher_id.is_empty() {
            return Err(IngressError::InvalidConfig(
                "publisher_id must not be empty".into(),
            ));
        }
        if self.allowed.is_empty() {
            return Err(IngressError::InvalidConfig(format!(
                "{} boundary accepts no message types",
                self.plane
            )));
        }
        Ok(())
    }
}

fn display_name(plane: Plane) -> &'static str {
    match plane {
        Plane::Spinal => "Spinal",
        Plane::Brainstem => "Brainstem",
        Plane::Thalamus => "Thalamus",
        Plane::Cortex => "Cortex",
        Plane::Reliable => "Reliable",
        Plane::Reflect => "Reflect",
        Plane::Unknown => "Unknown",
    }
}

fn join_types(types: &[MessageType]) -> String {
    types
        .iter()
        .map(MessageType::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}
