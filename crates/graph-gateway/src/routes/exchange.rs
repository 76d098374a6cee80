//! Correlated exchange over plain HTTP.

use crate::domain::config::humantime_serde::parse_duration;
use crate::domain::error::BridgeError;
use crate::domain::types::{ExchangeOutcome, ExchangeReply};
use crate::router::AppState;
use crate::routes::parse_body;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;

/// Query string of `POST /request`
#[derive(Debug, Default, Deserialize)]
pub struct ExchangeQuery {
    /// Deadline such as `"2s"` or `"500ms"`; the configured default otherwise
    pub timeout: Option<String>,
}

/// `POST /request`: publish the body and wait for the editor's reply.
///
/// Always answers with an exchange reply frame. 200 when the editor
/// answered, 400 for a missing `request_id`, 504 on timeout.
pub async fn post_request(
    State(state): State<AppState>,
    Query(query): Query<ExchangeQuery>,
    body: String,
) -> Response {
    let timeout = match query.timeout.as_deref().map(parse_duration) {
        None => None,
        Some(Ok(timeout)) if !timeout.is_zero() => Some(timeout),
        Some(_) => {
            let err = BridgeError::MalformedInput("invalid timeout".into());
            return reply(StatusCode::BAD_REQUEST, ExchangeReply::from_error(None, &err));
        }
    };

    let request = match parse_body(&body) {
        Ok(request) => request,
        Err(e) => return reply(StatusCode::BAD_REQUEST, ExchangeReply::from_error(None, &e)),
    };

    let result = state.coordinator.correlate(request, timeout).await;

    // The coordinator only fails without an id when the id was missing
    let status = match (&result.outcome, &result.request_id) {
        (ExchangeOutcome::Ok { .. }, _) => StatusCode::OK,
        (ExchangeOutcome::Error { .. }, None) => StatusCode::BAD_REQUEST,
        (ExchangeOutcome::Error { .. }, Some(_)) => StatusCode::GATEWAY_TIMEOUT,
    };
    reply(status, result)
}

fn reply(status: StatusCode, reply: ExchangeReply) -> Response {
    (status, Json(reply)).into_response()
}
