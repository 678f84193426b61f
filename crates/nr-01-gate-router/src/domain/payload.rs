//! Typed views over modulator and gate payloads.
//!
//! Payloads are opaque maps on the wire; these parsers turn the fields the
//! router understands into typed requests and reject values of the wrong
//! JSON type or out of range.

use serde_json::Value;
use shared_types::{check_inhibition, ContractError, GateMode, Payload};

pub const REQUESTED_INHIBITION: &str = "requested_inhibition";
pub const WINDOW_MS: &str = "window_ms";
pub const REASON: &str = "reason";
pub const INHIBITION: &str = "inhibition";
pub const MODE: &str = "mode";
pub const EXPIRES_AT_MS: &str = "expires_at_ms";

/// Time-boxed inhibition request carried by a modulator envelope.
#[derive(Debug, Clone, PartialEq)]
pub struct ModulatorRequest {
    pub inhibition: f64,
    pub window_ms: Option<u64>,
    pub reason: Option<String>,
}

impl ModulatorRequest {
    /// `Ok(None)` when the payload asks for nothing.
    pub fn from_payload(payload: &Payload) -> Result<Option<Self>, ContractError> {
        let Some(requested) = present(payload, REQUESTED_INHIBITION) else {
            return Ok(None);
        };
        Ok(Some(Self {
            inhibition: inhibition_value(REQUESTED_INHIBITION, requested)?,
            window_ms: optional_millis(payload, WINDOW_MS)?,
            reason: optional_string(payload, REASON)?,
        }))
    }
}

/// Direct gate installation carried by a gate-lane envelope.
#[derive(Debug, Clone, PartialEq)]
pub struct GateInstall {
    pub inhibition: f64,
    pub mode: Option<GateMode>,
    pub reason: Option<String>,
    pub expires_at_ms: Option<u64>,
}

impl GateInstall {
    /// `Ok(None)` when the payload carries nothing. Otherwise a missing
    /// `inhibition` installs an open gate (0.0).
    pub fn from_payload(payload: &Payload) -> Result<Option<Self>, ContractError> {
        if payload.values().all(Value::is_null) {
            return Ok(None);
        }
        let inhibition = match present(payload, INHIBITION) {
            Some(value) => inhibition_value(INHIBITION, value)?,
            None => 0.0,
        };
        let mode = match optional_string(payload, MODE)? {
            Some(mode) => Some(GateMode::parse(&mode).ok_or(ContractError::InvalidPayloadField {
                field: MODE,
                expected: "multi or winner_take_all",
            })?),
            None => None,
        };
        Ok(Some(Self {
            inhibition,
            mode,
            reason: optional_string(payload, REASON)?,
            expires_at_ms: optional_millis(payload, EXPIRES_AT_MS)?,
        }))
    }
}

/// Field value, treating explicit `null` as absent.
fn present<'a>(payload: &'a Payload, field: &str) -> Option<&'a Value> {
    payload.get(field).filter(|v| !v.is_null())
}

fn inhibition_value(field: &'static str, value: &Value) -> Result<f64, ContractError> {
    let number = value.as_f64().ok_or(ContractError::InvalidPayloadField {
        field,
        expected: "number",
    })?;
    check_inhibition(number)
}

/// Milliseconds as a non-negative integer. Integral floats such as `500.0`
/// are accepted.
fn optional_millis(payload: &Payload, field: &'static str) -> Result<Option<u64>, ContractError> {
    present(payload, field)
        .map(|v| {
            v.as_u64()
                .or_else(|| v.as_f64().and_then(integral_millis))
                .ok_or(ContractError::InvalidPayloadField {
                    field,
                    expected: "non-negative integer",
                })
        })
        .transpose()
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn integral_millis(value: f64) -> Option<u64> {
    let in_range = value >= 0.0 && value < u64::MAX as f64;
    (in_range && value.fract() == 0.0).then(|| value as u64)
}

fn optional_string(payload: &Payload, field: &'static str) -> Result<Option<String>, ContractError> {
    present(payload, field)
        .map(|v| {
            v.as_str()
                .map(str::to_string)
                .ok_or(ContractError::InvalidPayloadField {
                    field,
                    expected: "string",
                })
        })
        .transpose()
}
