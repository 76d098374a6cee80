//! Editor state pushes and polling.

use crate::domain::correlation::CorrelationId;
use crate::domain::error::BridgeResult;
use crate::router::AppState;
use crate::routes::{ack, parse_body};
use axum::{extract::State, Json};
use serde_json::Value;
use tracing::debug;

/// `POST /state`: `{request_id?, data}` from the editor.
///
/// Tagged pushes resolve the matching exchange; untagged or unmatched ones
/// become the Last-Observed State.
pub async fn post_state(State(state): State<AppState>, body: String) -> BridgeResult<Json<Value>> {
    let body = parse_body(&body)?;
    let request_id = CorrelationId::from_field(&body);
    let data = body.get("data").cloned().unwrap_or(Value::Null);

    let resolution = state.coordinator.deliver(request_id, data);
    debug!(resolution = ?resolution, "State pushed over HTTP");

    Ok(ack())
}

/// `GET /state`: the Last-Observed State, `null` if nothing was pushed yet
pub async fn get_state(State(state): State<AppState>) -> Json<Value> {
    let last = state.coordinator.store().last_observed();
    Json(serde_json::json!({ "ok": true, "state": last }))
}
