//! Request/response coordinator.

use crate::domain::correlation::CorrelationId;
use crate::domain::error::BridgeError;
use crate::domain::pending::{CorrelationStore, Resolution};
use crate::domain::types::ExchangeReply;
use graph_bus::{CommandPublisher, GRAPH_REQUEST_CHANNEL};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Drives correlated exchanges with the connected editors.
///
/// Publish, wait, clean up: every exchange ends with `get_and_clear` on both
/// the success and the timeout path, so abandoned requests never accumulate
/// in the store.
pub struct ExchangeCoordinator {
    /// Pending table shared with every reply path
    store: Arc<CorrelationStore>,
    /// Fan-out to connected editors
    publisher: Arc<dyn CommandPublisher>,
    /// Deadline used when the caller gives none
    default_timeout: Duration,
}

impl ExchangeCoordinator {
    pub fn new(
        store: Arc<CorrelationStore>,
        publisher: Arc<dyn CommandPublisher>,
        default_timeout: Duration,
    ) -> Self {
        Self {
            store,
            publisher,
            default_timeout,
        }
    }

    /// Publish `request` and wait for the editor's tagged reply.
    ///
    /// Never fails as such: a missing identifier or an expired deadline come
    /// back as an error reply, ready to be written to the caller.
    pub async fn correlate(
        &self,
        request: serde_json::Value,
        timeout: Option<Duration>,
    ) -> ExchangeReply {
        let Some(request_id) = CorrelationId::from_field(&request) else {
            return ExchangeReply::from_error(None, &BridgeError::missing_request_id());
        };
        let timeout = timeout.unwrap_or(self.default_timeout);
        let started = Instant::now();

        let mut handle = self.store.register(&request_id);

        let receivers = self.publisher.publish(GRAPH_REQUEST_CHANNEL, request).await;
        debug!(
            request_id = %request_id,
            receivers = receivers,
            timeout_ms = timeout.as_millis(),
            "Published correlated request"
        );

        let waited = tokio::time::timeout(timeout, async {
            if handle.wait().await.is_err() {
                // Entry replaced by a reused id; sit out the deadline
                std::future::pending::<()>().await;
            }
        })
        .await;

        // Always purge, even if the reply raced the deadline
        let result = self.store.get_and_clear(&request_id);

        match waited {
            Ok(()) => {
                debug!(
                    request_id = %request_id,
                    elapsed_ms = started.elapsed().as_millis(),
                    "Exchange completed"
                );
                ExchangeReply::ok(request_id, result.unwrap_or(serde_json::Value::Null))
            }
            Err(_) => {
                self.store.record_timeout();
                warn!(
                    request_id = %request_id,
                    timeout_ms = timeout.as_millis(),
                    "Exchange timed out"
                );
                ExchangeReply::from_error(Some(request_id), &BridgeError::Timeout)
            }
        }
    }

    /// Deliver a reply (or unsolicited state) pushed by an editor.
    ///
    /// Untagged pushes go straight to the Last-Observed State.
    pub fn deliver(
        &self,
        request_id: Option<CorrelationId>,
        data: serde_json::Value,
    ) -> Resolution {
        match request_id {
            Some(id) => self.store.resolve(&id, data),
            None => {
                self.store.observe(data);
                Resolution::Observed
            }
        }
    }

    /// Get the shared correlation store
    pub fn store(&self) -> &Arc<CorrelationStore> {
        &self.store
    }

    /// Get the default exchange deadline
    pub fn default_timeout(&self) -> Duration {
        self.default_timeout
    }
}
