//! Outbound Ports (Driven Ports)

use async_trait::async_trait;
use shared_types::BusMessage;

use crate::error::IngressError;

/// Boundary-specific handling of accepted traffic.
#[async_trait]
pub trait DispatchHook: Send + Sync {
    async fn dispatch(&self, topic: &str, msg: BusMessage) -> Result<(), IngressError>;
}

/// Hook that accepts and discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopDispatch;

#[async_trait]
impl DispatchHook for NoopDispatch {
    async fn dispatch(&self, _topic: &str, _msg: BusMessage) -> Result<(), IngressError> {
        Ok(())
    }
}
