//! Prometheus metrics for the relay boundaries.
//!
//! All metrics follow the naming convention: `nr_<component>_<metric>_<unit>`
//!
//! [`PrometheusRecorder`] implements the recorder hooks of the bus, the gate
//! router and plane ingress, so wiring it in is the only step needed to
//! export their activity.

use lazy_static::lazy_static;
use nr_01_gate_router::RouterMetricsRecorder;
use nr_02_plane_ingress::IngressMetricsRecorder;
use prometheus::{Counter, CounterVec, Encoder, Histogram, HistogramOpts, Opts, Registry, TextEncoder};
use shared_bus::BusMetricsRecorder;
use shared_types::{Lane, Plane};

use crate::TelemetryError;

/// Label used for gate writes that did not come from an envelope.
pub const CONTROL_LABEL: &str = "control";

lazy_static! {
    /// Global metrics registry
    pub static ref REGISTRY: Registry = Registry::new();

    // =========================================================================
    // ROUTER METRICS
    // =========================================================================

    /// Driver decisions by outcome
    pub static ref ROUTER_DECISIONS: CounterVec = CounterVec::new(
        Opts::new("nr_router_decisions_total", "Driver envelopes evaluated by the gate router"),
        &["outcome"]  // outcome: relayed/blocked
    ).expect("metric creation failed");

    /// Gate state writes by source lane
    pub static ref ROUTER_GATE_UPDATES: CounterVec = CounterVec::new(
        Opts::new("nr_router_gate_updates_total", "Gate states installed"),
        &["lane"]  // lane: B/G/control
    ).expect("metric creation failed");

    /// Envelopes refused for contract violations
    pub static ref ROUTER_CONTRACT_VIOLATIONS: CounterVec = CounterVec::new(
        Opts::new("nr_router_contract_violations_total", "Envelopes refused for contract violations"),
        &["lane"]
    ).expect("metric creation failed");

    /// Inhibition applied to each driver decision
    pub static ref ROUTER_APPLIED_INHIBITION: Histogram = Histogram::with_opts(
        HistogramOpts::new(
            "nr_router_applied_inhibition",
            "Inhibition in effect when a driver envelope was evaluated"
        ).buckets(vec![0.0, 0.1, 0.2, 0.3, 0.4, 0.5, 0.6, 0.7, 0.8, 0.9, 1.0])
    ).expect("metric creation failed");

    // =========================================================================
    // INGRESS METRICS
    // =========================================================================

    /// Rejects by boundary plane
    pub static ref INGRESS_REJECTS: CounterVec = CounterVec::new(
        Opts::new("nr_ingress_rejects_total", "Inbound messages refused at a boundary"),
        &["plane"]
    ).expect("metric creation failed");

    /// Dispatches by boundary plane and outcome
    pub static ref INGRESS_DISPATCHES: CounterVec = CounterVec::new(
        Opts::new("nr_ingress_dispatches_total", "Inbound messages handed to a dispatch hook"),
        &["plane", "outcome"]  // outcome: ok/failed
    ).expect("metric creation failed");

    // =========================================================================
    // BUS METRICS
    // =========================================================================

    /// Messages published on the bus
    pub static ref BUS_EVENTS_PUBLISHED: Counter = Counter::new(
        "nr_bus_events_published_total",
        "Messages published on the topic bus"
    ).expect("metric creation failed");

    /// Queue deliveries (one per receiving subscription)
    pub static ref BUS_DELIVERIES: Counter = Counter::new(
        "nr_bus_deliveries_total",
        "Messages enqueued on subscriber queues"
    ).expect("metric creation failed");

    /// Messages dropped from full subscriber queues
    pub static ref BUS_EVENTS_EVICTED: Counter = Counter::new(
        "nr_bus_events_evicted_total",
        "Oldest messages evicted from full subscriber queues"
    ).expect("metric creation failed");
}

/// Handle on the registered metrics.
#[derive(Debug, Clone)]
pub struct MetricsHandle {
    registry: Registry,
}

impl MetricsHandle {
    /// Encode all registered metrics in the Prometheus text format.
    pub fn encode(&self) -> Result<String, TelemetryError> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder
            .encode(&metric_families, &mut buffer)
            .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;
        String::from_utf8(buffer).map_err(|e| TelemetryError::MetricsInit(e.to_string()))
    }
}

/// Register all metrics with the global registry.
///
/// Safe to call more than once; metrics already registered are kept.
pub fn register_metrics() -> Result<MetricsHandle, TelemetryError> {
    let metrics: Vec<Box<dyn prometheus::core::Collector>> = vec![
        // Router
        Box::new(ROUTER_DECISIONS.clone()),
        Box::new(ROUTER_GATE_UPDATES.clone()),
        Box::new(ROUTER_CONTRACT_VIOLATIONS.clone()),
        Box::new(ROUTER_APPLIED_INHIBITION.clone()),
        // Ingress
        Box::new(INGRESS_REJECTS.clone()),
        Box::new(INGRESS_DISPATCHES.clone()),
        // Bus
        Box::new(BUS_EVENTS_PUBLISHED.clone()),
        Box::new(BUS_DELIVERIES.clone()),
        Box::new(BUS_EVENTS_EVICTED.clone()),
    ];

    for metric in metrics {
        match REGISTRY.register(metric) {
            Ok(()) | Err(prometheus::Error::AlreadyReg) => {}
            Err(e) => return Err(TelemetryError::MetricsInit(e.to_string())),
        }
    }

    Ok(MetricsHandle {
        registry: REGISTRY.clone(),
    })
}

/// Recorder feeding bus, router and ingress activity into the global metrics.
#[derive(Debug, Default, Clone, Copy)]
pub struct PrometheusRecorder;

impl PrometheusRecorder {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl BusMetricsRecorder for PrometheusRecorder {
    fn record_publish(&self, _topic: &str, receivers: usize) {
        BUS_EVENTS_PUBLISHED.inc();
        BUS_DELIVERIES.inc_by(receivers as f64);
    }

    fn record_eviction(&self, _topic: &str) {
        BUS_EVENTS_EVICTED.inc();
    }
}

impl RouterMetricsRecorder for PrometheusRecorder {
    fn record_decision(&self, allowed: bool, applied_inhibition: f64, _threshold: f64) {
        let outcome = if allowed { "relayed" } else { "blocked" };
        ROUTER_DECISIONS.with_label_values(&[outcome]).inc();
        ROUTER_APPLIED_INHIBITION.observe(applied_inhibition);
    }

    fn record_gate_update(&self, lane: Option<Lane>) {
        let label = lane.map_or(CONTROL_LABEL, |lane| lane.as_str());
        ROUTER_GATE_UPDATES.with_label_values(&[label]).inc();
    }

    fn record_contract_violation(&self, lane: Lane) {
        ROUTER_CONTRACT_VIOLATIONS
            .with_label_values(&[lane.as_str()])
            .inc();
    }
}

impl IngressMetricsRecorder for PrometheusRecorder {
    fn record_reject(&self, plane: Plane) {
        INGRESS_REJECTS.with_label_values(&[plane.as_str()]).inc();
    }

    fn record_dispatch(&self, plane: Plane, ok: bool) {
        let outcome = if ok { "ok" } else { "failed" };
        INGRESS_DISPATCHES
            .with_label_values(&[plane.as_str(), outcome])
            .inc();
    }
}
