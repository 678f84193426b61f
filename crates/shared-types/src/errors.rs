//! # Error Types
//!
//! Contract violations raised when a message breaks its addressing or
//! value rules. These are programmer errors at the producing boundary and are
//! surfaced to the caller instead of being converted into reject events.

use crate::entities::Lane;
use thiserror::Error;

/// Errors raised by message construction and topic derivation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ContractError {
    /// A path component was empty, contained a separator, a traversal
    /// sequence, or characters outside `[a-zA-Z0-9_-]`.
    #[error("Invalid path component for {field}: {value:?}")]
    InvalidPathComponent { field: &'static str, value: String },

    /// An address-sensitive lane was used without a nucleus.
    #[error("Lane {lane} requires a nucleus")]
    MissingNucleus { lane: Lane },

    /// Media lanes are session based and have no topic.
    #[error("Lane {lane} is a media lane and cannot be routed by topic")]
    MediaLaneNotRoutable { lane: Lane },

    /// Inhibition outside the closed unit interval.
    #[error("Inhibition out of range: {value} not in [0, 1]")]
    InhibitionOutOfRange { value: f64 },

    /// A payload field had the wrong JSON type.
    #[error("Invalid payload field {field}: expected {expected}")]
    InvalidPayloadField {
        field: &'static str,
        expected: &'static str,
    },
}

/// Validate that an inhibition value lies in `[0, 1]`.
pub fn check_inhibition(value: f64) -> Result<f64, ContractError> {
    if value.is_finite() && (0.0..=1.0).contains(&value) {
        Ok(value)
    } else {
        Err(ContractError::InhibitionOutOfRange { value })
    }
}
