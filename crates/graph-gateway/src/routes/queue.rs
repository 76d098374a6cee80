//! Forwarding prompts to the host's job queue.

use crate::domain::error::BridgeResult;
use crate::domain::types::required_field;
use crate::router::AppState;
use crate::routes::parse_body;
use axum::{extract::State, Json};
use serde_json::Value;
use tracing::info;

/// `POST /queue`: `{prompt}` → `{ok, prompt_id}`
pub async fn post_queue(State(state): State<AppState>, body: String) -> BridgeResult<Json<Value>> {
    let body = parse_body(&body)?;
    let prompt = required_field(&body, "prompt")?.clone();

    let prompt_id = state.queue.enqueue(prompt).await?;
    info!(prompt_id = %prompt_id, "Prompt queued");

    Ok(Json(serde_json::json!({ "ok": true, "prompt_id": prompt_id })))
}
