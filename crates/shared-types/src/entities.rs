//! # Domain Entities
//!
//! Enumerations and value types shared by every relay boundary.
//!
//! Only [`GateState`] outlives a single message; every other entity is
//! created per message and discarded after delivery.

use crate::envelope::{Envelope, Meta};
use crate::errors::{check_inhibition, ContractError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque key-value payload carried by envelopes and events.
pub type Payload = serde_json::Map<String, serde_json::Value>;

/// Schema version stamped on every message produced by this workspace.
pub const SCHEMA_VERSION: &str = "v1";

// =============================================================================
// ENUMERATIONS
// =============================================================================

/// Logical channel a message travels on.
///
/// Driver, modulator and gate lanes are address sensitive: their topics end in
/// a nucleus segment. Video and audio lanes are session based and never
/// appear on the topic bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Lane {
    #[serde(rename = "A")]
    Driver,
    #[serde(rename = "B")]
    Modulator,
    #[serde(rename = "C")]
    Command,
    #[serde(rename = "D")]
    Global,
    #[serde(rename = "E")]
    Error,
    #[serde(rename = "G")]
    Gate,
    #[serde(rename = "X")]
    Reflect,
    #[serde(rename = "V")]
    Video,
    #[serde(rename = "U")]
    Audio,
}

impl Lane {
    /// Wire token used as the first topic segment.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Driver => "A",
            Self::Modulator => "B",
            Self::Command => "C",
            Self::Global => "D",
            Self::Error => "E",
            Self::Gate => "G",
            Self::Reflect => "X",
            Self::Video => "V",
            Self::Audio => "U",
        }
    }

    /// True for lanes whose topics are addressed down to a nucleus.
    #[must_use]
    pub fn is_address_sensitive(&self) -> bool {
        matches!(self, Self::Driver | Self::Modulator | Self::Gate)
    }

    /// True for session-based media lanes.
    #[must_use]
    pub fn is_media(&self) -> bool {
        matches!(self, Self::Video | Self::Audio)
    }
}

impl fmt::Display for Lane {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether a signal carries content or tunes how content is relayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalKind {
    Driver,
    Modulator,
}

impl SignalKind {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Driver => "driver",
            Self::Modulator => "modulator",
        }
    }
}

impl fmt::Display for SignalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Granularity of the scope a message addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScopeLevel {
    Device,
    Room,
    /// Used for rejects whose source message carried no scope.
    #[default]
    House,
    UserSession,
}

impl ScopeLevel {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Device => "device",
            Self::Room => "room",
            Self::House => "house",
            Self::UserSession => "user_session",
        }
    }

    /// Parse a wire token.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "device" => Some(Self::Device),
            "room" => Some(Self::Room),
            "house" => Some(Self::House),
            "user_session" => Some(Self::UserSession),
            _ => None,
        }
    }
}

impl fmt::Display for ScopeLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Processing plane a message originated from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Plane {
    Spinal,
    Brainstem,
    Thalamus,
    Cortex,
    Reliable,
    Reflect,
    #[default]
    Unknown,
}

impl Plane {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Spinal => "spinal",
            Self::Brainstem => "brainstem",
            Self::Thalamus => "thalamus",
            Self::Cortex => "cortex",
            Self::Reliable => "reliable",
            Self::Reflect => "reflect",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for Plane {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Declared type of a message, checked by ingress allow-lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MessageType {
    AfferentSignal,
    EfferentCommand,
    OutcomeEvent,
    ReflexRule,
    ReflexTrigger,
    ReflexEvent,
    RelayBundle,
    PatternTrigger,
    PatternResponse,
    GlobalBroadcast,
    ThalamicEnvelope,
    RelayDecision,
    GateState,
    RejectEvent,
}

impl MessageType {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AfferentSignal => "AfferentSignal",
            Self::EfferentCommand => "EfferentCommand",
            Self::OutcomeEvent => "OutcomeEvent",
            Self::ReflexRule => "ReflexRule",
            Self::ReflexTrigger => "ReflexTrigger",
            Self::ReflexEvent => "ReflexEvent",
            Self::RelayBundle => "RelayBundle",
            Self::PatternTrigger => "PatternTrigger",
            Self::PatternResponse => "PatternResponse",
            Self::GlobalBroadcast => "GlobalBroadcast",
            Self::ThalamicEnvelope => "ThalamicEnvelope",
            Self::RelayDecision => "RelayDecision",
            Self::GateState => "GateState",
            Self::RejectEvent => "RejectEvent",
        }
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Competition mode applied to a gated nucleus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GateMode {
    Multi,
    WinnerTakeAll,
}

impl GateMode {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Multi => "multi",
            Self::WinnerTakeAll => "winner_take_all",
        }
    }

    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "multi" => Some(Self::Multi),
            "winner_take_all" => Some(Self::WinnerTakeAll),
            _ => None,
        }
    }
}

/// Cortical layer a relay target feeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CortexLayer {
    L4,
    L5,
    L6,
}

impl CortexLayer {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::L4 => "l4",
            Self::L5 => "l5",
            Self::L6 => "l6",
        }
    }
}

// =============================================================================
// GATE STATE
// =============================================================================

/// Key a gate state is stored under.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GateKey {
    pub scope_level: ScopeLevel,
    pub scope: String,
    pub nucleus: String,
}

impl GateKey {
    #[must_use]
    pub fn new(scope_level: ScopeLevel, scope: impl Into<String>, nucleus: impl Into<String>) -> Self {
        Self {
            scope_level,
            scope: scope.into(),
            nucleus: nucleus.into(),
        }
    }
}

/// Inhibition installed for one nucleus within one scope.
///
/// A state whose `expires_at_ms` is at or before the current time is
/// logically absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GateState {
    pub scope_level: ScopeLevel,
    pub scope: String,
    pub nucleus: String,
    /// Always within `[0, 1]`.
    pub inhibition: f64,
    pub mode: Option<GateMode>,
    pub reason: Option<String>,
    pub timestamp_ms: u64,
    /// `None` means the state never expires on its own.
    pub expires_at_ms: Option<u64>,
}

impl GateState {
    /// Build a state, rejecting inhibition outside `[0, 1]`.
    pub fn new(
        scope_level: ScopeLevel,
        scope: impl Into<String>,
        nucleus: impl Into<String>,
        inhibition: f64,
        timestamp_ms: u64,
    ) -> Result<Self, ContractError> {
        Ok(Self {
            scope_level,
            scope: scope.into(),
            nucleus: nucleus.into(),
            inhibition: check_inhibition(inhibition)?,
            mode: None,
            reason: None,
            timestamp_ms,
            expires_at_ms: None,
        })
    }

    #[must_use]
    pub fn with_mode(mut self, mode: Option<GateMode>) -> Self {
        self.mode = mode;
        self
    }

    #[must_use]
    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    #[must_use]
    pub fn with_expiry(mut self, expires_at_ms: Option<u64>) -> Self {
        self.expires_at_ms = expires_at_ms;
        self
    }

    #[must_use]
    pub fn key(&self) -> GateKey {
        GateKey::new(self.scope_level, self.scope.clone(), self.nucleus.clone())
    }

    /// True when the state is no longer valid at `now_ms`.
    #[must_use]
    pub fn is_expired(&self, now_ms: u64) -> bool {
        self.expires_at_ms.is_some_and(|expires| expires <= now_ms)
    }
}

// =============================================================================
// RELAY DECISION
// =============================================================================

/// Downstream destination for an admitted driver signal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelayTarget {
    pub cortex_area: String,
    pub layer: Option<CortexLayer>,
    pub scope_level: ScopeLevel,
    pub scope: String,
}

impl RelayTarget {
    #[must_use]
    pub fn new(cortex_area: impl Into<String>, scope_level: ScopeLevel, scope: impl Into<String>) -> Self {
        Self {
            cortex_area: cortex_area.into(),
            layer: None,
            scope_level,
            scope: scope.into(),
        }
    }

    #[must_use]
    pub fn with_layer(mut self, layer: CortexLayer) -> Self {
        self.layer = Some(layer);
        self
    }
}

/// Outcome of evaluating one driver envelope against its gate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelayDecision {
    pub envelope: Envelope,
    pub allowed: bool,
    pub applied_inhibition: f64,
    /// Empty whenever `allowed` is false.
    pub targets: Vec<RelayTarget>,
    pub rationale: String,
}

// =============================================================================
// REJECT EVENT
// =============================================================================

/// Reason code for messages whose type is not accepted by a boundary.
pub const REJECT_WRONG_TYPE: &str = "wrong_type_or_missing_meta";

/// A message refused at a plane boundary, published on the reflect lane.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RejectEvent {
    pub meta: Meta,
    pub reason: String,
    pub original_topic: String,
    /// Source of the refused message, if it declared one.
    pub publisher_id: Option<String>,
    pub scope_level: ScopeLevel,
    pub scope: String,
    /// Carries `observed_type` and `hint`.
    pub details: Payload,
}
