//! # Graph Bridge Test Suite
//!
//! End-to-end tests against a real listener: HTTP clients on one side,
//! WebSocket editors on the other.
//!
//! ## Structure
//!
//! ```text
//! tests/
//! ├── benches/          # Criterion benchmarks
//! └── src/
//!     ├── harness.rs    # Spawned bridge + editor client
//!     └── integration/  # HTTP and WebSocket flows
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p graph-tests
//! cargo test -p graph-tests integration::ws_flows
//! cargo bench -p graph-tests
//! ```

pub mod harness;
pub mod integration;
