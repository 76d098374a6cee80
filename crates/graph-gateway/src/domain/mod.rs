//! Domain types for the gateway.
//!
//! Configuration, errors, identifiers, wire envelopes and the correlation
//! store. Nothing here touches a socket.

pub mod config;
pub mod correlation;
pub mod error;
pub mod pending;
pub mod types;

// Re-exports for convenience
pub use config::{BridgeConfig, ConfigError, RegistrySource};
pub use correlation::{ConnectionId, CorrelationId};
pub use error::{BridgeError, BridgeResult, GatewayError};
pub use pending::{Abandoned, CorrelationStats, CorrelationStore, Resolution, WaitHandle};
pub use types::*;
