//! Error types for plane ingress.

use shared_types::ContractError;
use thiserror::Error;

/// Plane ingress errors.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum IngressError {
    /// A reject topic could not be built from the refused message.
    #[error("Contract violation: {0}")]
    Contract(#[from] ContractError),

    /// The boundary's dispatch hook failed on an accepted message.
    #[error("Dispatch failed: {0}")]
    Dispatch(String),

    /// Ingress configuration failed validation.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}
