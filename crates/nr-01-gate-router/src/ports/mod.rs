//! Ports Layer
//!
//! Defines the interfaces (traits) for:
//! - Driving Ports (inbound) - API for feeding and steering the router
//! - Driven Ports (outbound) - State stores, policies and output sinks

pub mod inbound;
pub mod outbound;

pub use inbound::{GateRouterApi, NucleusInhibition, ScopeSummary};
pub use outbound::{CortexPort, GatePort, GateStore, GlobalModeStore, RoutingPolicy, ThresholdPolicy};
