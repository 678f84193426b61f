//! Cross-boundary flows. Every module only holds `#[cfg(test)]` code.

pub mod addressing;
pub mod bus_delivery;
pub mod gating;
pub mod reject_flow;
