//! Gateway error types.
//!
//! [`BridgeError`] is the taxonomy surfaced to callers; each variant maps to
//! one HTTP status. [`GatewayError`] covers service startup and shutdown.

/// HTTP status codes used by the error taxonomy
pub mod codes {
    pub const BAD_REQUEST: u16 = 400;
    pub const NOT_FOUND: u16 = 404;
    pub const INTERNAL_ERROR: u16 = 500;
    pub const BAD_GATEWAY: u16 = 502;
    pub const GATEWAY_TIMEOUT: u16 = 504;
}

/// Errors surfaced to the immediate caller.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum BridgeError {
    /// Body failed to parse or failed structural validation. Never retried.
    #[error("{0}")]
    MalformedInput(String),

    /// Referenced persisted document does not exist.
    #[error("{0}")]
    NotFound(String),

    /// Correlated request without a usable correlation identifier.
    #[error("{0}")]
    Protocol(String),

    /// No reply within the deadline.
    #[error("timeout")]
    Timeout,

    /// Downstream service answered with a failure, relayed as-is.
    #[error("downstream service returned {status}")]
    Downstream {
        /// Status reported by the downstream service
        status: u16,
        /// Body reported by the downstream service
        body: serde_json::Value,
    },

    /// Downstream service could not be reached.
    #[error("downstream service unavailable: {0}")]
    Unavailable(String),

    /// Persistence failed for a reason other than "not found".
    #[error("storage error: {0}")]
    Storage(String),

    /// Anything else.
    #[error("internal error: {0}")]
    Internal(String),
}

impl BridgeError {
    /// Body could not be parsed as JSON
    pub fn invalid_json() -> Self {
        Self::MalformedInput("invalid JSON".into())
    }

    /// Required field absent or empty
    pub fn missing_field(field: &str) -> Self {
        Self::MalformedInput(format!("missing field: {}", field))
    }

    /// Missing correlation identifier on a correlated request
    pub fn missing_request_id() -> Self {
        Self::Protocol("missing field: request_id".into())
    }

    /// HTTP status for this error
    pub fn status_code(&self) -> u16 {
        match self {
            Self::MalformedInput(_) | Self::Protocol(_) => codes::BAD_REQUEST,
            Self::NotFound(_) => codes::NOT_FOUND,
            Self::Timeout => codes::GATEWAY_TIMEOUT,
            Self::Downstream { status, .. } => *status,
            Self::Unavailable(_) => codes::BAD_GATEWAY,
            Self::Storage(_) | Self::Internal(_) => codes::INTERNAL_ERROR,
        }
    }

    /// JSON body for this error.
    ///
    /// Downstream failures relay the downstream body untouched; everything
    /// else is `{"error": <message>}`.
    pub fn body(&self) -> serde_json::Value {
        match self {
            Self::Downstream { body, .. } => body.clone(),
            other => serde_json::json!({ "error": other.to_string() }),
        }
    }
}

impl From<serde_json::Error> for BridgeError {
    fn from(_: serde_json::Error) -> Self {
        BridgeError::invalid_json()
    }
}

/// Result type for gateway operations
pub type BridgeResult<T> = Result<T, BridgeError>;

/// Service-level errors (startup, binding, shutdown)
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Server socket bind error
    #[error("server bind error: {0}")]
    Bind(String),

    /// Server stopped with an I/O error
    #[error("server error: {0}")]
    Serve(#[from] std::io::Error),

    /// Adapter construction failed
    #[error("adapter error: {0}")]
    Adapter(String),
}
