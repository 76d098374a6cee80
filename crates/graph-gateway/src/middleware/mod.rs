//! HTTP middleware for the gateway.
//!
//! Layer order: Request → CORS → Tracing → Body limit → Handler

pub mod cors;
pub mod tracing;

pub use cors::create_cors_layer;
pub use tracing::{TraceParent, TracingLayer};
