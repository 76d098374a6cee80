//! # Bus Messages
//!
//! The envelope every connected editor receives.

use serde::{Deserialize, Serialize};

/// Channel carrying one-way graph commands (`create_node`, `load_graph`, ...).
pub const GRAPH_COMMAND_CHANNEL: &str = "graph_command";

/// Channel carrying correlated requests that expect a reply.
pub const GRAPH_REQUEST_CHANNEL: &str = "graph_ws_request";

/// A message published on the bus.
///
/// Serialized as `{"type": <channel>, "data": <payload>}`, which is the
/// envelope the editor dispatches on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BusMessage {
    /// Logical channel name.
    #[serde(rename = "type")]
    pub channel: String,
    /// Opaque payload, owned by the sender and the editor.
    #[serde(rename = "data")]
    pub payload: serde_json::Value,
}

impl BusMessage {
    /// Create a new message.
    pub fn new(channel: impl Into<String>, payload: serde_json::Value) -> Self {
        Self {
            channel: channel.into(),
            payload,
        }
    }

    /// Encode as a JSON text frame.
    pub fn to_frame(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Selects which channels a subscription receives.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChannelFilter {
    /// Channels to receive. Empty means every channel.
    pub channels: Vec<String>,
}

impl ChannelFilter {
    /// Receive every channel.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Receive only the named channels.
    #[must_use]
    pub fn channels<I, S>(channels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            channels: channels.into_iter().map(Into::into).collect(),
        }
    }

    /// Check whether a message passes this filter.
    #[must_use]
    pub fn matches(&self, message: &BusMessage) -> bool {
        self.channels.is_empty() || self.channels.iter().any(|c| *c == message.channel)
    }
}
