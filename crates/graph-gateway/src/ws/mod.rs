//! WebSocket channel to connected editors.
//!
//! - Fan-out of every bus message to every connection
//! - Correlated requests with the reply written back on the same connection
//! - State pushes (`graph_state`) routed to the correlation store

pub mod connections;
pub mod handler;

pub use connections::{ConnectionInfo, ConnectionRegistry};
pub use handler::{WebSocketHandler, MESSAGE_TOO_LARGE};
