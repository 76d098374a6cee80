//! Ports (hexagonal boundaries) for the gateway.

pub mod outbound;

pub use outbound::{GraphStore, NodeRegistry, PromptQueue, QueueError, RegistryError, StoreError};
