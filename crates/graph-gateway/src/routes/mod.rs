//! HTTP entry points under `/comfy/graph`.
//!
//! Handlers take the raw body as a `String` and parse it themselves so that
//! a malformed body always yields `{"error": "invalid JSON"}`.

pub mod commands;
pub mod documents;
pub mod exchange;
pub mod health;
pub mod nodes;
pub mod queue;
pub mod state;

use crate::domain::error::{BridgeError, BridgeResult};
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::Value;

impl IntoResponse for BridgeError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self.body())).into_response()
    }
}

/// Parse a request body as JSON
pub(crate) fn parse_body(body: &str) -> BridgeResult<Value> {
    Ok(serde_json::from_str(body)?)
}

/// The `{"ok": true}` acknowledgement
pub(crate) fn ack() -> Json<Value> {
    Json(serde_json::json!({ "ok": true }))
}
