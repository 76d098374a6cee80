//! Outbound ports for the gateway.
//!
//! The host process owns the node registry, the job queue and the saved
//! graph directory. The gateway only sees these traits.

use crate::domain::error::BridgeError;
use crate::domain::types::DocumentName;
use async_trait::async_trait;
use serde_json::Value;

/// Read-only view of the host's node type registry
#[async_trait]
pub trait NodeRegistry: Send + Sync {
    /// All registered node types as `(name, raw descriptor)` pairs.
    ///
    /// Descriptors use the host's listing shape (`input`, `output`,
    /// `category`, `description`); individual entries may be malformed.
    async fn entries(&self) -> Result<Vec<(String, Value)>, RegistryError>;
}

/// Filename-keyed store of graph documents
#[async_trait]
pub trait GraphStore: Send + Sync {
    /// Persist `graph` under `name`, replacing any previous document
    async fn save(&self, name: &DocumentName, graph: &Value) -> Result<(), StoreError>;

    /// Load the document saved under `name`, `None` if there is none
    async fn load(&self, name: &DocumentName) -> Result<Option<Value>, StoreError>;
}

/// The host's job queue
#[async_trait]
pub trait PromptQueue: Send + Sync {
    /// Submit a prompt, returning the downstream job identifier
    async fn enqueue(&self, prompt: Value) -> Result<Value, QueueError>;
}

/// Node registry errors
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("registry unreachable: {0}")]
    Unreachable(String),
    #[error("registry returned malformed listing: {0}")]
    Malformed(String),
}

/// Graph store errors
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("stored document is not valid JSON: {0}")]
    Corrupt(#[from] serde_json::Error),
}

/// Job queue errors
#[derive(Debug, thiserror::Error)]
pub enum QueueError {
    /// The queue answered with a non-success status
    #[error("queue rejected prompt with status {status}")]
    Rejected { status: u16, body: Value },
    /// The queue could not be reached
    #[error("queue unreachable: {0}")]
    Unreachable(String),
    /// The queue answered with something other than JSON
    #[error("queue returned malformed response: {0}")]
    Malformed(String),
}

impl From<RegistryError> for BridgeError {
    fn from(e: RegistryError) -> Self {
        match e {
            RegistryError::Unreachable(msg) => BridgeError::Unavailable(msg),
            RegistryError::Malformed(msg) => BridgeError::Internal(msg),
        }
    }
}

impl From<StoreError> for BridgeError {
    fn from(e: StoreError) -> Self {
        BridgeError::Storage(e.to_string())
    }
}

impl From<QueueError> for BridgeError {
    fn from(e: QueueError) -> Self {
        match e {
            QueueError::Rejected { status, body } => BridgeError::Downstream { status, body },
            QueueError::Unreachable(msg) => BridgeError::Unavailable(msg),
            QueueError::Malformed(msg) => BridgeError::Unavailable(msg),
        }
    }
}
