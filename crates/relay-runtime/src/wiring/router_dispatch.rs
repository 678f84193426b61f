//! # Router Dispatch
//!
//! Dispatch hook of the thalamus boundary. Translates every message type the
//! thalamus accepts into gate router or mode store calls:
//!
//! | Message | Action |
//! |---------|--------|
//! | `ThalamicEnvelope` | `GateRouterApi::ingest` |
//! | `RelayBundle` (body `envelopes`) | `ingest` for each envelope, in order |
//! | `GlobalBroadcast` (body `state`) | `GlobalModeStore::put_modes` for its scope |

use async_trait::async_trait;
use nr_01_gate_router::{GateRouterApi, GlobalModeStore, GlobalModes};
use nr_02_plane_ingress::{DispatchHook, IngressError};
use serde_json::Value;
use shared_types::{BusMessage, Envelope, MessageType, PlaneSignal};
use std::sync::Arc;
use tracing::{debug, info};

/// Body key of a relay bundle holding its envelopes.
pub const BUNDLE_ENVELOPES: &str = "envelopes";

/// Body key of a global broadcast holding its mode flags.
pub const BROADCAST_STATE: &str = "state";

fn dispatch_error(msg: impl Into<String>) -> IngressError {
    IngressError::Dispatch(msg.into())
}

/// Feeds accepted thalamus traffic into the gate router.
pub struct RouterDispatch {
    router: Arc<dyn GateRouterApi>,
    modes: Arc<dyn GlobalModeStore>,
}

impl RouterDispatch {
    pub fn new(router: Arc<dyn GateRouterApi>, modes: Arc<dyn GlobalModeStore>) -> Self {
        Self { router, modes }
    }

    async fn ingest(&self, envelope: Envelope) -> Result<(), IngressError> {
        self.router
            .ingest(envelope)
            .await
            .map(|_| ())
            .map_err(|e| dispatch_error(e.to_string()))
    }

    async fn relay_bundle(&self, signal: PlaneSignal) -> Result<(), IngressError> {
        let envelopes = match signal.body.get(BUNDLE_ENVELOPES) {
            Some(Value::Array(items)) => items.clone(),
            Some(_) => return Err(dispatch_error("relay bundle `envelopes` must be an array")),
            None => return Err(dispatch_error("relay bundle without `envelopes`")),
        };

        // Decode everything first so a malformed bundle changes no gate.
        let envelopes = envelopes
            .into_iter()
            .map(serde_json::from_value::<Envelope>)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| dispatch_error(format!("malformed bundled envelope: {e}")))?;

        debug!(count = envelopes.len(), "Relaying bundle");
        for envelope in envelopes {
            self.ingest(envelope).await?;
        }
        Ok(())
    }

    async fn global_broadcast(&self, signal: PlaneSignal) -> Result<(), IngressError> {
        let (Some(scope_level), Some(scope)) = (signal.scope_level, signal.scope.as_deref()) else {
            return Err(dispatch_error("global broadcast without scope"));
        };
        let Some(Value::Object(flags)) = signal.body.get(BROADCAST_STATE) else {
            return Err(dispatch_error("global broadcast without `state` object"));
        };

        let mut modes = GlobalModes::new();
        for (name, value) in flags {
            let active = value
                .as_bool()
                .ok_or_else(|| dispatch_error(format!("mode {name} must be a boolean")))?;
            modes.set(name.clone(), active);
        }

        info!(
            scope_level = %scope_level,
            scope = %scope,
            active = ?modes.active().collect::<Vec<_>>(),
            "Global modes updated"
        );
        self.modes
            .put_modes(scope_level, scope, modes)
            .await
            .map_err(|e| dispatch_error(e.to_string()))
    }
}

#[async_trait]
impl DispatchHook for RouterDispatch {
    async fn dispatch(&self, topic: &str, msg: BusMessage) -> Result<(), IngressError> {
        match msg {
            BusMessage::Envelope(envelope) => self.ingest(envelope).await,
            BusMessage::Signal(signal) => match signal.meta.as_ref().map(|m| m.message_type) {
                Some(MessageType::RelayBundle) => self.relay_bundle(signal).await,
                Some(MessageType::GlobalBroadcast) => self.global_broadcast(signal).await,
                other => Err(dispatch_error(format!(
                    "no thalamus handler for {other:?} on {topic}"
                ))),
            },
            other => Err(dispatch_error(format!(
                "no thalamus handler for {:?} on {topic}",
                other.message_type()
            ))),
        }
    }
}
