//! # Neuro-Relay Test Suite
//!
//! Unified test crate for behaviour that spans more than one boundary.
//!
//! ## Structure
//!
//! ```text
//! tests/
//! ├── src/integration/
//! │   ├── gating.rs        # Router scenarios over the real bus ports
//! │   ├── bus_delivery.rs  # Fan-out, FIFO and eviction on the topic bus
//! │   ├── reject_flow.rs   # Ingress boundaries and the reflect channel
//! │   └── addressing.rs    # Topic construction and path validation
//! └── benches/
//!     └── relay_benchmarks.rs
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! # All tests
//! cargo test -p nr-tests
//!
//! # By category
//! cargo test -p nr-tests integration::gating
//!
//! # Benchmarks
//! cargo bench -p nr-tests
//! ```

#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::panic))]

pub mod integration;
