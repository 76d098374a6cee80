//! Correlated request/response over the broadcast bus.
//!
//! The coordinator turns a one-way publish into an exchange that waits for
//! the editor's tagged reply. Streaming connections and HTTP handlers both
//! drive it.

pub mod coordinator;
pub mod frames;

pub use coordinator::ExchangeCoordinator;
pub use frames::InboundFrame;
