//! Inbound Ports (Driving Ports)

use async_trait::async_trait;
use shared_types::BusMessage;

use crate::domain::IngressConfig;
use crate::error::IngressError;

/// What a boundary did with one inbound message.
#[derive(Debug, Clone, PartialEq)]
pub enum IngressOutcome {
    /// Type was allowed and the dispatch hook accepted the message.
    Dispatched,
    /// Type was refused; the reject went out on `reject_topic`.
    Rejected { reject_topic: String },
}

impl IngressOutcome {
    #[must_use]
    pub fn is_rejected(&self) -> bool {
        matches!(self, Self::Rejected { .. })
    }
}

/// Validate-then-dispatch-or-reject entry point of a plane boundary.
#[async_trait]
pub trait PlaneIngressApi: Send + Sync {
    /// Inspect `msg` received on `topic` and either dispatch or reject it.
    ///
    /// A refused type is not an error: it yields [`IngressOutcome::Rejected`].
    async fn ingest(&self, topic: &str, msg: BusMessage) -> Result<IngressOutcome, IngressError>;

    fn config(&self) -> &IngressConfig;
}
