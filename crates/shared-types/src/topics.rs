//! # Topic Naming
//!
//! Transport-agnostic topic construction. Every topic is a `/`-joined path
//! whose variable segments are validated before they are interpolated.
//!
//! ```text
//! address lanes (A, B, G):  /{lane}/{kind}/{scope_level}/{scope}/nucleus/{nucleus}
//! reflect lane (X):         /X/{kind}/{scope_level}/{scope}/lane/{src_lane}
//! other lanes:              /{lane}/{kind}/{scope_level}/{scope}
//! rejects:                  /X/reflect/{scope_level}/{scope}/lane/reject
//! ```

use crate::entities::{GateState, Lane, Payload, RelayTarget, ScopeLevel, SignalKind};
use crate::envelope::Envelope;
use crate::errors::ContractError;
use serde_json::{json, Value};

/// Payload key naming the lane a reflection was taken from.
pub const REFLECT_SOURCE_LANE: &str = "src_lane";

/// Validate a variable topic segment.
///
/// Accepts non-empty values made only of ASCII letters, digits, `_` and `-`,
/// which also rules out separators and `..`.
pub fn validate_path_component<'a>(
    field: &'static str,
    value: &'a str,
) -> Result<&'a str, ContractError> {
    let valid = !value.is_empty()
        && value
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-');

    if valid {
        Ok(value)
    } else {
        Err(ContractError::InvalidPathComponent {
            field,
            value: value.to_string(),
        })
    }
}

fn lane_prefix(
    lane: Lane,
    kind: &str,
    scope_level: ScopeLevel,
    scope: &str,
) -> Result<String, ContractError> {
    if lane.is_media() {
        return Err(ContractError::MediaLaneNotRoutable { lane });
    }
    let scope = validate_path_component("scope", scope)?;
    Ok(format!("/{}/{}/{}/{}", lane, kind, scope_level, scope))
}

/// Topic for a lane that is not addressed by nucleus.
pub fn lane_topic(
    lane: Lane,
    kind: SignalKind,
    scope_level: ScopeLevel,
    scope: &str,
) -> Result<String, ContractError> {
    lane_prefix(lane, kind.as_str(), scope_level, scope)
}

/// Topic for an address-sensitive lane.
pub fn nucleus_topic(
    lane: Lane,
    kind: SignalKind,
    scope_level: ScopeLevel,
    scope: &str,
    nucleus: &str,
) -> Result<String, ContractError> {
    let base = lane_topic(lane, kind, scope_level, scope)?;
    let nucleus = validate_path_component("nucleus", nucleus)?;
    Ok(format!("{base}/nucleus/{nucleus}"))
}

/// Topic for a reflection of a message taken from `src_lane`.
pub fn reflect_topic(
    kind: &str,
    scope_level: ScopeLevel,
    scope: &str,
    src_lane: &str,
) -> Result<String, ContractError> {
    let kind = validate_path_component("kind", kind)?;
    let base = lane_prefix(Lane::Reflect, kind, scope_level, scope)?;
    let src_lane = validate_path_component("src_lane", src_lane)?;
    Ok(format!("{base}/lane/{src_lane}"))
}

/// Canonical topic for reject events of a scope.
pub fn reject_topic(scope_level: ScopeLevel, scope: &str) -> Result<String, ContractError> {
    reflect_topic("reflect", scope_level, scope, "reject")
}

/// Audit topic every relay decision of a scope is reflected on.
pub fn decision_topic(scope_level: ScopeLevel, scope: &str) -> Result<String, ContractError> {
    reflect_topic("decision", scope_level, scope, Lane::Driver.as_str())
}

/// Topic an envelope is published on.
///
/// Address-sensitive lanes require a nucleus. Reflect-lane envelopes are
/// suffixed with the lane recorded in their payload (`unknown` if absent).
pub fn topic_for(env: &Envelope) -> Result<String, ContractError> {
    match env.lane {
        lane if lane.is_address_sensitive() => {
            let nucleus = env.required_nucleus()?;
            nucleus_topic(lane, env.kind, env.scope_level, &env.scope, nucleus)
        }
        Lane::Reflect => {
            let src_lane = env
                .payload
                .get(REFLECT_SOURCE_LANE)
                .and_then(Value::as_str)
                .unwrap_or("unknown");
            reflect_topic(env.kind.as_str(), env.scope_level, &env.scope, src_lane)
        }
        lane => lane_topic(lane, env.kind, env.scope_level, &env.scope),
    }
}

/// Topic admitted driver signals are relayed on for one target.
pub fn relay_topic(target: &RelayTarget) -> Result<String, ContractError> {
    let scope = validate_path_component("scope", &target.scope)?;
    let area = validate_path_component("cortex_area", &target.cortex_area)?;
    let mut topic = format!("/thalamus/relay/{}/{}/cortex/{}", target.scope_level, scope, area);
    if let Some(layer) = target.layer {
        topic.push_str("/layer/");
        topic.push_str(layer.as_str());
    }
    Ok(topic)
}

/// Topic installed gate states are announced on.
pub fn gate_state_topic(state: &GateState) -> Result<String, ContractError> {
    let base = lane_prefix(Lane::Gate, "gate", state.scope_level, &state.scope)?;
    let nucleus = validate_path_component("nucleus", &state.nucleus)?;
    Ok(format!("{base}/nucleus/{nucleus}"))
}

/// Non-blocking reflection copy of an envelope on lane X.
///
/// The copy keeps addressing and correlation, takes `reflector` as source and
/// `now_ms` as timestamp, and carries the original header and payload.
#[must_use]
pub fn reflect_of(env: &Envelope, now_ms: u64, reflector: &str) -> Envelope {
    let mut payload = Payload::new();
    payload.insert(REFLECT_SOURCE_LANE.into(), json!(env.lane.as_str()));
    payload.insert("src_source".into(), json!(env.source));
    payload.insert("src_timestamp_ms".into(), json!(env.timestamp_ms));
    payload.insert(
        "envelope".into(),
        json!({
            "lane": env.lane.as_str(),
            "kind": env.kind.as_str(),
            "scope_level": env.scope_level.as_str(),
            "scope": env.scope,
            "nucleus": env.nucleus,
            "priority": env.priority,
            "salience": env.salience,
            "deadline_ms": env.deadline_ms,
            "confidence": env.confidence,
            "schema_version": env.schema_version,
        }),
    );
    payload.insert("payload_copy".into(), Value::Object(env.payload.clone()));

    Envelope {
        lane: Lane::Reflect,
        timestamp_ms: now_ms,
        source: reflector.to_string(),
        payload,
        ..env.clone()
    }
}
