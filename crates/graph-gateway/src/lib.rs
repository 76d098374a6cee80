//! Graph Gateway - correlated request/response bridge to remote graph editors.
//!
//! Lets server-side callers drive a visual graph editor running in a browser:
//! one-way commands are broadcast to every connected editor, and correlated
//! requests block until an editor answers with a reply tagged by the same
//! `request_id` (or a deadline expires).
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                         GRAPH GATEWAY                               │
//! ├─────────────────────────────────────────────────────────────────────┤
//! │  ┌───────────────────────┐        ┌───────────────────────┐        │
//! │  │   REST /comfy/graph   │        │  WebSocket /ws        │        │
//! │  │ command batch request │        │ requests, state push  │        │
//! │  │ state queue save load │        │ bus fan-out           │        │
//! │  └──────────┬────────────┘        └──────────┬────────────┘        │
//! │             │                                │                      │
//! │  ┌──────────┴────────────────────────────────┴───────────┐         │
//! │  │              Exchange Coordinator                      │         │
//! │  │   register → publish → wait (deadline) → get_and_clear │         │
//! │  └──────────┬────────────────────────────────┬───────────┘         │
//! │             │                                │                      │
//! │  ┌──────────┴──────────┐          ┌──────────┴──────────┐          │
//! │  │  Correlation Store  │          │  Command Bus        │          │
//! │  │  (pending table)    │          │  (graph-bus)        │          │
//! │  └─────────────────────┘          └─────────────────────┘          │
//! └─────────────────────────────────────────────────────────────────────┘
//!           │                  │                     │
//!     Node registry       Job queue           Saved graphs
//!     (host HTTP/file)    (host HTTP)         (filesystem)
//! ```
//!
//! # Usage
//!
//! ```ignore
//! use graph_gateway::{BridgeConfig, GraphBridgeService};
//!
//! let service = GraphBridgeService::new(BridgeConfig::default())?;
//! service.start().await?;
//! ```

#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod adapters;
pub mod domain;
pub mod exchange;
pub mod middleware;
pub mod ports;
pub mod router;
pub mod routes;
pub mod service;
pub mod ws;

// Re-exports for public API
pub use domain::config::BridgeConfig;
pub use domain::error::{BridgeError, BridgeResult, GatewayError};
pub use domain::pending::{CorrelationStore, Resolution};
pub use domain::types::{ExchangeOutcome, ExchangeReply};
pub use exchange::ExchangeCoordinator;
pub use router::{build_router, AppState, ROUTE_PREFIX};
pub use service::{GraphBridgeService, ShutdownHandle};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
