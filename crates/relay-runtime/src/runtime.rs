//! # Relay Runtime
//!
//! Lifecycle of the relay process.
//!
//! ## Startup Sequence
//!
//! 1. Build the container (bus, stores, router, thalamus boundary)
//! 2. Subscribe the thalamus boundary to every watched topic
//! 3. Spawn the boundary task and the expired-gate sweeper
//!
//! ## Shutdown Sequence
//!
//! 1. Signal shutdown to all tasks
//! 2. Wait for each task, bounded by a grace period
//! 3. Exit

use std::sync::Arc;
use std::time::Duration;

use shared_bus::TopicBus;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::container::{ContainerError, RelayContainer, RuntimeConfig};
use crate::wiring::thalamus_topics;

/// Time each task gets to finish after shutdown is signalled.
pub const SHUTDOWN_GRACE: Duration = Duration::from_secs(2);

/// The relay process: container plus its running tasks.
pub struct RelayRuntime {
    container: Arc<RelayContainer>,
    shutdown_tx: watch::Sender<bool>,
    shutdown_rx: watch::Receiver<bool>,
    tasks: Vec<(&'static str, JoinHandle<()>)>,
}

impl RelayRuntime {
    /// Create a runtime. Nothing runs until [`start`](Self::start).
    pub fn new(config: RuntimeConfig) -> Result<Self, ContainerError> {
        info!("Creating relay runtime");
        let container = Arc::new(RelayContainer::new(config)?);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        Ok(Self {
            container,
            shutdown_tx,
            shutdown_rx,
            tasks: Vec::new(),
        })
    }

    #[must_use]
    pub fn container(&self) -> Arc<RelayContainer> {
        Arc::clone(&self.container)
    }

    /// Subscribe the thalamus boundary and spawn the background tasks.
    ///
    /// Subscriptions are registered before this returns, so anything
    /// published afterwards is seen by the boundary.
    pub fn start(&mut self) -> Result<(), ContainerError> {
        let topics = thalamus_topics(&self.container.config.scopes, &self.container.watched_nuclei())?;
        let subscriptions = topics
            .iter()
            .map(|topic| self.container.bus.subscribe(topic))
            .collect::<Vec<_>>();
        info!(topics = subscriptions.len(), "Thalamus subscriptions registered");

        let thalamus = Arc::clone(&self.container.thalamus);
        let shutdown = self.shutdown_rx.clone();
        self.tasks.push((
            "thalamus",
            tokio::spawn(async move { thalamus.run(subscriptions, shutdown).await }),
        ));

        // Sweeps run on the store's envelope clock; the ticker only paces them.
        let store = Arc::clone(&self.container.gate_store);
        let interval = Duration::from_millis(self.container.config.gate_gc_interval_ms);
        let mut shutdown = self.shutdown_rx.clone();
        self.tasks.push((
            "gate-sweeper",
            tokio::spawn(async move {
                let mut ticker = tokio::time::interval(interval);
                ticker.tick().await;
                loop {
                    tokio::select! {
                        _ = ticker.tick() => {
                            store.sweep_stale();
                        }
                        _ = shutdown.changed() => {
                            info!("[gate-sweeper] Shutdown signal received");
                            break;
                        }
                    }
                }
            }),
        ));

        info!("Relay runtime started");
        Ok(())
    }

    /// Shut the runtime down gracefully.
    pub async fn shutdown(mut self) {
        info!("Initiating graceful shutdown...");

        if let Err(e) = self.shutdown_tx.send(true) {
            error!("Failed to send shutdown signal: {}", e);
        }

        for (name, handle) in self.tasks.drain(..) {
            match tokio::time::timeout(SHUTDOWN_GRACE, handle).await {
                Ok(Ok(())) => debug!(task = name, "Task stopped"),
                Ok(Err(e)) => error!(task = name, error = %e, "Task failed"),
                Err(_) => warn!(task = name, "Task did not stop within grace period"),
            }
        }

        info!("Shutdown complete");
    }
}
