//! # Relay Container
//!
//! Holds the bus, the stores, the gate router and the thalamus boundary with
//! their adapters already injected.
//!
//! ## Thread Safety
//!
//! - Everything is wrapped in `Arc` for shared ownership across tasks
//! - Stores synchronize internally; the router itself is stateless
//! - The topic bus is the sole channel between boundaries

use std::sync::Arc;

use nr_01_gate_router::{
    BusCortexPort, BusGatePort, GateRouter, InMemoryGateStore, InMemoryGlobalModeStore,
    RouterError, StaticRoutingPolicy,
};
use nr_02_plane_ingress::{IngressConfig, IngressError, PlaneIngress};
use relay_telemetry::PrometheusRecorder;
use shared_bus::{InMemoryTopicBus, TopicBus};
use shared_types::{BusMessage, ContractError};
use thiserror::Error;
use tracing::info;

use crate::container::config::{ConfigError, RuntimeConfig};
use crate::wiring::RouterDispatch;

/// Errors raised while assembling the container.
#[derive(Debug, Error)]
pub enum ContainerError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Router(#[from] RouterError),

    #[error(transparent)]
    Ingress(#[from] IngressError),

    #[error(transparent)]
    Contract(#[from] ContractError),
}

/// Central container holding every relay component.
pub struct RelayContainer {
    /// Topic bus shared by all boundaries.
    pub bus: Arc<InMemoryTopicBus>,

    /// Gate state store, also swept by the runtime.
    pub gate_store: Arc<InMemoryGateStore>,

    /// Per-scope mode flags, written by global broadcasts.
    pub mode_store: Arc<InMemoryGlobalModeStore>,

    /// Nucleus to cortical area routing table.
    pub routing: Arc<StaticRoutingPolicy>,

    /// Gate router publishing decisions and gate states on the bus.
    pub router: Arc<GateRouter>,

    /// Thalamus boundary feeding the router.
    pub thalamus: Arc<PlaneIngress>,

    /// Runtime configuration (immutable after initialization).
    pub config: RuntimeConfig,
}

impl RelayContainer {
    /// Build and wire every component.
    pub fn new(config: RuntimeConfig) -> Result<Self, ContainerError> {
        config.validate()?;
        let recorder = Arc::new(PrometheusRecorder::new());

        let bus = Arc::new(
            InMemoryTopicBus::<BusMessage>::with_capacity(config.bus.queue_capacity)
                .with_metrics(recorder.clone()),
        );
        let gate_store = Arc::new(InMemoryGateStore::with_gc_interval(config.gate_gc_interval_ms));
        let mode_store = Arc::new(InMemoryGlobalModeStore::new());
        let routing = Arc::new(StaticRoutingPolicy::sensory_defaults());
        let shared_bus: Arc<dyn TopicBus> = bus.clone();

        let router = Arc::new(
            GateRouter::new(
                gate_store.clone(),
                mode_store.clone(),
                routing.clone(),
                Arc::new(config.threshold_policy()),
                Arc::new(BusCortexPort::new(shared_bus.clone())),
            )
            .with_gate_port(Arc::new(BusGatePort::new(shared_bus.clone())))
            .with_metrics(recorder.clone())
            .with_config(config.router.clone())?,
        );

        let dispatch = Arc::new(RouterDispatch::new(router.clone(), mode_store.clone()));
        let thalamus = Arc::new(
            PlaneIngress::new(IngressConfig::thalamus(), shared_bus, dispatch)?
                .with_metrics(recorder),
        );

        info!(
            queue_capacity = config.bus.queue_capacity,
            scopes = config.scopes.len(),
            "Relay container initialized"
        );

        Ok(Self {
            bus,
            gate_store,
            mode_store,
            routing,
            router,
            thalamus,
            config,
        })
    }

    /// Nuclei the thalamus subscribes to: the configured list, or every
    /// nucleus the routing table knows.
    #[must_use]
    pub fn watched_nuclei(&self) -> Vec<String> {
        if self.config.nuclei.is_empty() {
            self.routing.nuclei()
        } else {
            self.config.nuclei.clone()
        }
    }
}
