//! # Bus Subscription
//!
//! Receiving side of the bus, one per connected editor.

use crate::events::{BusMessage, ChannelFilter};
use thiserror::Error;
use tokio::sync::broadcast;
use tracing::{debug, warn};

/// Errors from subscription operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SubscriptionError {
    /// The bus was dropped.
    #[error("command bus closed")]
    Closed,
}

/// A subscription handle for receiving bus messages.
pub struct BusSubscription {
    receiver: broadcast::Receiver<BusMessage>,
    filter: ChannelFilter,
}

impl BusSubscription {
    pub(crate) fn new(receiver: broadcast::Receiver<BusMessage>, filter: ChannelFilter) -> Self {
        Self { receiver, filter }
    }

    /// Receive the next message passing the filter.
    ///
    /// A lagging subscription skips what it missed rather than failing.
    ///
    /// # Returns
    ///
    /// - `Some(message)` - The next matching message
    /// - `None` - The bus was dropped
    pub async fn recv(&mut self) -> Option<BusMessage> {
        loop {
            let message = match self.receiver.recv().await {
                Ok(m) => m,
                Err(broadcast::error::RecvError::Closed) => return None,
                Err(broadcast::error::RecvError::Lagged(count)) => {
                    warn!(lagged = count, "Bus subscription lagged, messages skipped");
                    continue;
                }
            };

            if self.filter.matches(&message) {
                return Some(message);
            }
        }
    }

    /// Try to receive the next matching message without waiting.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(message))` - A matching message was available
    /// - `Ok(None)` - Nothing available right now
    /// - `Err(SubscriptionError::Closed)` - The bus was dropped
    pub fn try_recv(&mut self) -> Result<Option<BusMessage>, SubscriptionError> {
        loop {
            let message = match self.receiver.try_recv() {
                Ok(m) => m,
                Err(broadcast::error::TryRecvError::Empty) => return Ok(None),
                Err(broadcast::error::TryRecvError::Closed) => {
                    return Err(SubscriptionError::Closed)
                }
                Err(broadcast::error::TryRecvError::Lagged(_)) => continue,
            };

            if self.filter.matches(&message) {
                return Ok(Some(message));
            }
        }
    }

    /// Get the filter for this subscription.
    #[must_use]
    pub fn filter(&self) -> &ChannelFilter {
        &self.filter
    }
}

impl Drop for BusSubscription {
    fn drop(&mut self) {
        debug!(channels = ?self.filter.channels, "Bus subscription dropped");
    }
}
