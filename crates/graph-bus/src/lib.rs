//! # Graph Bus - Fan-out Delivery to Connected Editors
//!
//! One-way, unacknowledged publish of graph commands to every connected
//! remote editor.
//!
//! ```text
//! ┌──────────────┐   publish(channel, payload)   ┌──────────────┐
//! │ HTTP handler │ ────────────┐                 │  Editor #1   │
//! └──────────────┘             ▼            ┌──▶ │  (WebSocket) │
//!                       ┌──────────────┐    │    └──────────────┘
//! ┌──────────────┐      │  Command Bus │ ───┤    ┌──────────────┐
//! │ Coordinator  │ ───▶ │  (broadcast) │    └──▶ │  Editor #2   │
//! └──────────────┘      └──────────────┘         └──────────────┘
//! ```
//!
//! Delivery is best-effort: publishing with zero listeners is not an error,
//! and a listener that falls behind skips what it missed.

// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod events;
pub mod publisher;
pub mod subscriber;

// Re-export main types
pub use events::{BusMessage, ChannelFilter, GRAPH_COMMAND_CHANNEL, GRAPH_REQUEST_CHANNEL};
pub use publisher::{CommandPublisher, InMemoryCommandBus};
pub use subscriber::{BusSubscription, SubscriptionError};

/// Maximum messages to buffer per listener before it starts lagging.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 1024;
