//! Registry of open streaming connections.

use crate::domain::correlation::ConnectionId;
use dashmap::DashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;
use tracing::debug;

/// One open connection
#[derive(Debug, Clone)]
pub struct ConnectionInfo {
    /// Peer address, when the transport reports one
    pub remote: Option<SocketAddr>,
    /// When the connection was accepted
    pub connected_at: Instant,
}

/// Set of currently connected editors.
///
/// Fan-out itself goes through the bus; this only tracks who is connected
/// for logging and health reporting.
#[derive(Debug, Default)]
pub struct ConnectionRegistry {
    connections: DashMap<ConnectionId, ConnectionInfo>,
    total_opened: AtomicU64,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a newly opened connection
    pub fn add(&self, connection_id: ConnectionId, remote: Option<SocketAddr>) {
        self.connections.insert(
            connection_id,
            ConnectionInfo {
                remote,
                connected_at: Instant::now(),
            },
        );
        self.total_opened.fetch_add(1, Ordering::Relaxed);
        debug!(connection_id = %connection_id, "Connection registered");
    }

    /// Forget a closed connection, returning what was recorded for it
    pub fn remove(&self, connection_id: &ConnectionId) -> Option<ConnectionInfo> {
        let removed = self.connections.remove(connection_id).map(|(_, info)| info);
        if removed.is_some() {
            debug!(connection_id = %connection_id, "Connection removed");
        }
        removed
    }

    pub fn contains(&self, connection_id: &ConnectionId) -> bool {
        self.connections.contains_key(connection_id)
    }

    /// Number of open connections
    pub fn len(&self) -> usize {
        self.connections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }

    /// Connections opened since startup
    pub fn total_opened(&self) -> u64 {
        self.total_opened.load(Ordering::Relaxed)
    }
}
