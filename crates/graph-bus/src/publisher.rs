//! # Command Publisher
//!
//! Defines the publishing side of the bus.

use crate::events::{BusMessage, ChannelFilter};
use crate::subscriber::BusSubscription;
use crate::DEFAULT_CHANNEL_CAPACITY;
use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::broadcast;
use tracing::debug;

/// Trait for publishing to every connected listener.
///
/// This is the only contract the rest of the system relies on: delivery is
/// best-effort, nothing is acknowledged, and publishing into an empty room
/// is not an error.
#[async_trait]
pub trait CommandPublisher: Send + Sync {
    /// Publish `payload` on `channel`.
    ///
    /// # Returns
    ///
    /// The number of listeners the message was handed to. Callers are free
    /// to ignore it.
    async fn publish(&self, channel: &str, payload: serde_json::Value) -> usize;

    /// Get the total number of publish attempts.
    fn messages_published(&self) -> u64;
}

/// In-memory implementation of the command bus.
///
/// Uses `tokio::sync::broadcast` so every subscription sees every message.
/// Suitable for a single process; nothing is persisted or replayed.
pub struct InMemoryCommandBus {
    /// Broadcast sender for messages.
    sender: broadcast::Sender<BusMessage>,

    /// Total publish attempts.
    messages_published: AtomicU64,

    /// Channel capacity.
    capacity: usize,
}

impl InMemoryCommandBus {
    /// Create a new bus with default capacity.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CHANNEL_CAPACITY)
    }

    /// Create a new bus with specified capacity.
    ///
    /// A capacity of zero is bumped to one, since broadcast channels cannot
    /// be empty.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let (sender, _) = broadcast::channel(capacity);
        Self {
            sender,
            messages_published: AtomicU64::new(0),
            capacity,
        }
    }

    /// Subscribe to messages passing `filter`.
    ///
    /// Only messages published after this call are received.
    #[must_use]
    pub fn subscribe(&self, filter: ChannelFilter) -> BusSubscription {
        let receiver = self.sender.subscribe();
        debug!(channels = ?filter.channels, "New bus subscription");
        BusSubscription::new(receiver, filter)
    }

    /// Get the number of active subscriptions.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    /// Get the channel capacity.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for InMemoryCommandBus {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CommandPublisher for InMemoryCommandBus {
    async fn publish(&self, channel: &str, payload: serde_json::Value) -> usize {
        // Counted even when nobody is listening
        self.messages_published.fetch_add(1, Ordering::Relaxed);

        match self.sender.send(BusMessage::new(channel, payload)) {
            Ok(receivers) => {
                debug!(channel = channel, receivers = receivers, "Message published");
                receivers
            }
            Err(_) => {
                debug!(channel = channel, "Message dropped (no listeners)");
                0
            }
        }
    }

    fn messages_published(&self) -> u64 {
        self.messages_published.load(Ordering::Relaxed)
    }
}
