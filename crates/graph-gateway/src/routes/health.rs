//! Health endpoint.

use crate::router::AppState;
use axum::{extract::State, Json};
use graph_bus::CommandPublisher;
use serde_json::Value;

/// Service name reported by the health endpoint
pub const SERVICE_NAME: &str = "graph-bridge";

/// `GET /health`
pub async fn health_check(State(state): State<AppState>) -> Json<Value> {
    let store = state.coordinator.store();
    Json(serde_json::json!({
        "status": "healthy",
        "service": SERVICE_NAME,
        "version": env!("CARGO_PKG_VERSION"),
        "pending": store.pending_count(),
        "connections": state.connections.len(),
        "stats": {
            "exchanges": store.stats().to_json(),
            "messages_published": state.bus.messages_published(),
            "connections_opened": state.connections.total_opened(),
        }
    }))
}
