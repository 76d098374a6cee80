//! Router assembly and shared handler state.

use crate::domain::config::{BridgeConfig, WebSocketConfig};
use crate::domain::pending::CorrelationStore;
use crate::exchange::ExchangeCoordinator;
use crate::middleware::{create_cors_layer, TracingLayer};
use crate::ports::outbound::{GraphStore, NodeRegistry, PromptQueue};
use crate::routes::{commands, documents, exchange, health, nodes, queue, state};
use crate::ws::{ConnectionRegistry, WebSocketHandler};
use axum::{
    extract::{ws::WebSocketUpgrade, ConnectInfo, DefaultBodyLimit, State},
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use graph_bus::{ChannelFilter, CommandPublisher, InMemoryCommandBus};
use std::net::SocketAddr;
use std::sync::Arc;
use tower::ServiceBuilder;

/// Prefix every gateway route lives under
pub const ROUTE_PREFIX: &str = "/comfy/graph";

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub coordinator: Arc<ExchangeCoordinator>,
    pub bus: Arc<InMemoryCommandBus>,
    pub connections: Arc<ConnectionRegistry>,
    pub registry: Arc<dyn NodeRegistry>,
    pub store: Arc<dyn GraphStore>,
    pub queue: Arc<dyn PromptQueue>,
    pub websocket: WebSocketConfig,
}

impl AppState {
    /// Wire a fresh correlation store and coordinator around `bus`
    pub fn new(
        config: &BridgeConfig,
        bus: Arc<InMemoryCommandBus>,
        registry: Arc<dyn NodeRegistry>,
        store: Arc<dyn GraphStore>,
        queue: Arc<dyn PromptQueue>,
    ) -> Self {
        let coordinator = Arc::new(ExchangeCoordinator::new(
            Arc::new(CorrelationStore::new()),
            Arc::clone(&bus) as Arc<dyn CommandPublisher>,
            config.timeouts.exchange,
        ));

        Self {
            coordinator,
            bus,
            connections: Arc::new(ConnectionRegistry::new()),
            registry,
            store,
            queue,
            websocket: config.websocket.clone(),
        }
    }
}

/// Build the full HTTP + WebSocket router
pub fn build_router(state: AppState, config: &BridgeConfig) -> Router {
    let middleware = ServiceBuilder::new()
        .layer(create_cors_layer(&config.cors))
        .layer(TracingLayer::new())
        .layer(DefaultBodyLimit::max(config.limits.max_request_size));

    let routes = Router::new()
        .route("/command", post(commands::post_command))
        .route("/batch", post(commands::post_batch))
        .route("/node_types", get(nodes::get_node_types))
        .route("/all_nodes", get(nodes::get_all_nodes))
        .route("/request", post(exchange::post_request))
        .route("/state", post(state::post_state).get(state::get_state))
        .route("/queue", post(queue::post_queue))
        .route("/save", post(documents::post_save))
        .route("/load", post(documents::post_load))
        .route("/health", get(health::health_check))
        .route("/ws", get(ws_upgrade));

    Router::new()
        .nest(ROUTE_PREFIX, routes)
        .layer(middleware)
        .with_state(state)
}

/// `GET /ws`: upgrade and hand the socket to a [`WebSocketHandler`]
async fn ws_upgrade(
    State(state): State<AppState>,
    remote: Option<ConnectInfo<SocketAddr>>,
    ws: WebSocketUpgrade,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| async move {
        let subscription = state.bus.subscribe(ChannelFilter::all());
        let mut handler = WebSocketHandler::new(
            Arc::clone(&state.coordinator),
            Arc::clone(&state.connections),
            subscription,
            state.websocket.clone(),
        );
        if let Some(ConnectInfo(addr)) = remote {
            handler = handler.with_remote(addr);
        }
        handler.handle(socket).await;
    })
}
