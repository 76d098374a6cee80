//! One-way command broadcast.

use crate::domain::error::{BridgeError, BridgeResult};
use crate::domain::types::{required_key, BatchReport};
use crate::router::AppState;
use crate::routes::{ack, parse_body};
use axum::{extract::State, Json};
use graph_bus::{CommandPublisher, GRAPH_COMMAND_CHANNEL};
use serde_json::Value;
use tracing::debug;

/// `POST /command`: broadcast one `{type, ..}` command
pub async fn post_command(
    State(state): State<AppState>,
    body: String,
) -> BridgeResult<Json<Value>> {
    let command = parse_body(&body)?;
    required_key(&command, "type")?;

    let receivers = state.bus.publish(GRAPH_COMMAND_CHANNEL, command).await;
    debug!(receivers = receivers, "Command broadcast");

    Ok(ack())
}

/// `POST /batch`: broadcast `{commands: [..]}` in order.
///
/// Items without a `type` are reported and skipped; the rest still go out.
pub async fn post_batch(
    State(state): State<AppState>,
    body: String,
) -> BridgeResult<Json<BatchReport>> {
    let body = parse_body(&body)?;

    let commands = match body.get("commands") {
        None | Some(Value::Null) => return Err(BridgeError::missing_field("commands")),
        Some(Value::Array(commands)) => commands.clone(),
        Some(_) => {
            return Err(BridgeError::MalformedInput(
                "commands must be a list".into(),
            ))
        }
    };

    let mut report = BatchReport::new();
    for (index, command) in commands.into_iter().enumerate() {
        if let Err(e) = required_key(&command, "type") {
            report.skipped(index, e.to_string());
            continue;
        }
        state.bus.publish(GRAPH_COMMAND_CHANNEL, command).await;
        report.published();
    }

    debug!(
        published = report.count,
        skipped = report.errors.len(),
        "Batch broadcast"
    );
    Ok(Json(report))
}
