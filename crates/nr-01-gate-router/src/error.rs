//! Error types for the gate router.

use shared_types::ContractError;
use thiserror::Error;

/// Failures reported by outbound ports.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PortError {
    /// The downstream sink is no longer reachable.
    #[error("Port unavailable: {0}")]
    Unavailable(String),

    /// An output topic could not be built from the message.
    #[error("Invalid output topic: {0}")]
    InvalidTopic(String),

    /// A store rejected or failed an operation.
    #[error("Store error: {0}")]
    Store(String),
}

/// Gate router errors.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RouterError {
    /// The inbound envelope broke an addressing or value contract.
    #[error("Contract violation: {0}")]
    Contract(#[from] ContractError),

    /// An outbound port failed.
    #[error("Port failure: {0}")]
    Port(#[from] PortError),

    /// Router configuration failed validation.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl RouterError {
    /// Contract violations are producer bugs and are never retried.
    #[must_use]
    pub fn is_contract_violation(&self) -> bool {
        matches!(self, Self::Contract(_))
    }
}
