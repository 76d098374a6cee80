//! Classification of inbound streaming frames.

use crate::domain::correlation::CorrelationId;
use crate::domain::error::BridgeError;
use serde_json::Value;

/// Frame type an editor uses to push state back
pub const STATE_PUSH_TYPE: &str = "graph_state";

/// One decoded inbound frame
#[derive(Debug, Clone, PartialEq)]
pub enum InboundFrame {
    /// Reply or unsolicited state push from the editor
    StatePush {
        request_id: Option<CorrelationId>,
        data: Value,
    },
    /// Anything else is a request to correlate
    Request(Value),
}

impl InboundFrame {
    /// Decode a text frame.
    ///
    /// Fails with `invalid JSON` when the text does not parse.
    pub fn parse(text: &str) -> Result<Self, BridgeError> {
        let value: Value = serde_json::from_str(text)?;
        Ok(Self::classify(value))
    }

    /// Classify an already parsed frame
    pub fn classify(value: Value) -> Self {
        if value.get("type").and_then(Value::as_str) == Some(STATE_PUSH_TYPE) {
            let request_id = CorrelationId::from_field(&value);
            let data = value.get("data").cloned().unwrap_or(Value::Null);
            Self::StatePush { request_id, data }
        } else {
            Self::Request(value)
        }
    }
}
