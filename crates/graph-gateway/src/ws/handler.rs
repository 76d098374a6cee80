//! WebSocket handler for the editor channel.
//!
//! One handler owns one connection. Inbound frames are either state pushes
//! (routed to the correlation store) or correlated requests (handed to the
//! coordinator, reply written back on this connection). Every bus message is
//! forwarded to the connection as well.

use crate::domain::config::WebSocketConfig;
use crate::domain::correlation::ConnectionId;
use crate::domain::error::BridgeError;
use crate::domain::types::ExchangeReply;
use crate::exchange::{ExchangeCoordinator, InboundFrame};
use crate::ws::connections::ConnectionRegistry;
use axum::extract::ws::{Message, WebSocket};
use futures::{SinkExt, StreamExt};
use graph_bus::BusSubscription;
use serde_json::Value;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Error message for frames over the size limit
pub const MESSAGE_TOO_LARGE: &str = "message too large";

/// What to do with one inbound text frame
#[derive(Debug, Clone, PartialEq)]
enum FrameAction {
    /// Write this error frame back
    Reject(String),
    /// State push, already delivered; nothing to write
    Delivered,
    /// Correlate and write the reply back
    Correlate(Value),
}

/// Decides what each inbound text frame means for one connection
struct FrameRouter {
    coordinator: Arc<ExchangeCoordinator>,
    connection_id: ConnectionId,
    max_message_size: usize,
}

impl FrameRouter {
    /// Classify one text frame, delivering state pushes on the spot
    fn classify(&self, text: &str) -> FrameAction {
        if text.len() > self.max_message_size {
            warn!(
                connection_id = %self.connection_id,
                size = text.len(),
                max = self.max_message_size,
                "Message exceeds size limit"
            );
            return FrameAction::Reject(ExchangeReply::error(None, MESSAGE_TOO_LARGE).to_frame());
        }

        match InboundFrame::parse(text) {
            Err(e) => {
                debug!(connection_id = %self.connection_id, "Unparseable frame");
                FrameAction::Reject(ExchangeReply::from_error(None, &e).to_frame())
            }
            Ok(InboundFrame::StatePush { request_id, data }) => {
                let resolution = self.coordinator.deliver(request_id, data);
                debug!(
                    connection_id = %self.connection_id,
                    resolution = ?resolution,
                    "State push delivered"
                );
                FrameAction::Delivered
            }
            Ok(InboundFrame::Request(request)) => FrameAction::Correlate(request),
        }
    }
}

/// WebSocket connection handler
pub struct WebSocketHandler {
    coordinator: Arc<ExchangeCoordinator>,
    connections: Arc<ConnectionRegistry>,
    subscription: BusSubscription,
    connection_id: ConnectionId,
    remote: Option<SocketAddr>,
    config: WebSocketConfig,
}

impl WebSocketHandler {
    pub fn new(
        coordinator: Arc<ExchangeCoordinator>,
        connections: Arc<ConnectionRegistry>,
        subscription: BusSubscription,
        config: WebSocketConfig,
    ) -> Self {
        Self {
            coordinator,
            connections,
            subscription,
            connection_id: ConnectionId::new(),
            remote: None,
            config,
        }
    }

    /// Record the peer address for logging
    pub fn with_remote(mut self, remote: SocketAddr) -> Self {
        self.remote = Some(remote);
        self
    }

    pub fn connection_id(&self) -> ConnectionId {
        self.connection_id
    }

    /// Handle a WebSocket connection until it closes
    pub async fn handle(self, socket: WebSocket) {
        let WebSocketHandler {
            coordinator,
            connections,
            mut subscription,
            connection_id,
            remote,
            config,
        } = self;

        connections.add(connection_id, remote);
        info!(connection_id = %connection_id, remote = ?remote, "New WebSocket connection");

        let (mut sink, mut stream) = socket.split();
        let (out_tx, mut out_rx) = mpsc::channel::<Message>(config.outbound_buffer);

        // Single writer: replies and bus fan-out share the sink
        let writer = tokio::spawn(async move {
            loop {
                let message = tokio::select! {
                    outbound = out_rx.recv() => match outbound {
                        Some(message) => message,
                        None => break,
                    },
                    bus = subscription.recv() => match bus {
                        Some(bus_message) => match bus_message.to_frame() {
                            Ok(text) => Message::Text(text),
                            Err(e) => {
                                warn!(error = %e, "Failed to encode bus message");
                                continue;
                            }
                        },
                        None => break,
                    },
                };

                if let Err(e) = sink.send(message).await {
                    debug!(connection_id = %connection_id, error = %e, "WebSocket send failed");
                    break;
                }
            }
        });

        let router = FrameRouter {
            coordinator,
            connection_id,
            max_message_size: config.max_message_size,
        };

        while let Some(result) = stream.next().await {
            let text = match result {
                Ok(Message::Text(text)) => text,
                Ok(Message::Binary(data)) => match String::from_utf8(data) {
                    Ok(text) => text,
                    Err(_) => {
                        let frame = ExchangeReply::from_error(None, &BridgeError::invalid_json());
                        if out_tx.send(Message::Text(frame.to_frame())).await.is_err() {
                            break;
                        }
                        continue;
                    }
                },
                Ok(Message::Ping(data)) => {
                    if out_tx.send(Message::Pong(data)).await.is_err() {
                        break;
                    }
                    continue;
                }
                Ok(Message::Pong(_)) => continue,
                Ok(Message::Close(_)) => {
                    debug!(connection_id = %connection_id, "WebSocket close received");
                    break;
                }
                Err(e) => {
                    warn!(connection_id = %connection_id, error = %e, "WebSocket error");
                    break;
                }
            };

            match router.classify(&text) {
                FrameAction::Reject(frame) => {
                    if out_tx.send(Message::Text(frame)).await.is_err() {
                        break;
                    }
                }
                FrameAction::Delivered => {}
                FrameAction::Correlate(request) => {
                    let coordinator = Arc::clone(&router.coordinator);
                    let out_tx = out_tx.clone();
                    tokio::spawn(async move {
                        let reply = coordinator.correlate(request, None).await;
                        // Connection may be gone by now
                        let _ = out_tx.send(Message::Text(reply.to_frame())).await;
                    });
                }
            }
        }

        writer.abort();
        connections.remove(&connection_id);

        info!(connection_id = %connection_id, "WebSocket connection closed");
    }
}
