//! Saving and loading graph documents.

use crate::domain::error::{BridgeError, BridgeResult};
use crate::domain::types::{required_field, DocumentName};
use crate::router::AppState;
use crate::routes::{ack, parse_body};
use axum::{extract::State, Json};
use graph_bus::{CommandPublisher, GRAPH_COMMAND_CHANNEL};
use serde_json::Value;
use tracing::info;

/// Command the editor applies to replace its graph
pub const LOAD_GRAPH_COMMAND: &str = "load_graph";

/// `POST /save`: `{filename, graph}`
pub async fn post_save(State(state): State<AppState>, body: String) -> BridgeResult<Json<Value>> {
    let body = parse_body(&body)?;

    required_field(&body, "filename")?;
    let graph = match body.get("graph") {
        None | Some(Value::Null) => return Err(BridgeError::missing_field("graph")),
        Some(graph) => graph,
    };
    let name = DocumentName::from_body(&body)?;

    state.store.save(&name, graph).await?;
    info!(filename = %name, "Graph saved");

    Ok(ack())
}

/// `POST /load`: `{filename}`, then tell every editor to load it
pub async fn post_load(State(state): State<AppState>, body: String) -> BridgeResult<Json<Value>> {
    let body = parse_body(&body)?;
    let name = DocumentName::from_body(&body)?;

    let graph = state
        .store
        .load(&name)
        .await?
        .ok_or_else(|| BridgeError::NotFound("file not found".into()))?;

    state
        .bus
        .publish(
            GRAPH_COMMAND_CHANNEL,
            serde_json::json!({ "type": LOAD_GRAPH_COMMAND, "graph_data": graph }),
        )
        .await;
    info!(filename = %name, "Graph loaded");

    Ok(Json(serde_json::json!({ "ok": true, "graph": graph })))
}
