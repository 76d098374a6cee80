//! Job queue adapter that forwards prompts to the host over HTTP.

use crate::adapters::{host_client, join_url};
use crate::ports::outbound::{PromptQueue, QueueError};
use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

/// Posts `{"prompt": ..}` to `{base_url}/prompt`.
///
/// One attempt per call. Non-success answers are relayed with their status
/// and body.
pub struct HostPromptQueue {
    client: reqwest::Client,
    endpoint: String,
}

impl HostPromptQueue {
    pub fn new(base_url: &str, timeout: Duration) -> Self {
        Self {
            client: host_client(timeout),
            endpoint: join_url(base_url, "/prompt"),
        }
    }

    /// Full URL prompts are posted to
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl PromptQueue for HostPromptQueue {
    async fn enqueue(&self, prompt: Value) -> Result<Value, QueueError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(&serde_json::json!({ "prompt": prompt }))
            .send()
            .await
            .map_err(|e| {
                warn!(endpoint = %self.endpoint, error = %e, "Job queue unreachable");
                QueueError::Unreachable(format!("cannot reach {}", self.endpoint))
            })?;

        let status = response.status();
        let body: Value = response
            .json()
            .await
            .map_err(|e| QueueError::Malformed(e.to_string()))?;

        if !status.is_success() {
            debug!(status = status.as_u16(), "Job queue rejected prompt");
            return Err(QueueError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        Ok(body.get("prompt_id").cloned().unwrap_or(Value::Null))
    }
}
