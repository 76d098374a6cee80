//! Graph bridge service - main entry point.
//!
//! One listener serves the REST routes and the editor WebSocket.

use crate::adapters::{FsGraphStore, HostNodeRegistry, HostPromptQueue, StaticNodeRegistry};
use crate::domain::config::{BridgeConfig, RegistrySource};
use crate::domain::error::GatewayError;
use crate::ports::outbound::{GraphStore, NodeRegistry, PromptQueue};
use crate::router::{build_router, AppState};
use axum::Router;
use graph_bus::InMemoryCommandBus;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::Notify;
use tracing::{error, info};

/// Graph bridge service state
pub struct GraphBridgeService {
    config: BridgeConfig,
    state: AppState,
    shutdown: Arc<Notify>,
}

impl GraphBridgeService {
    /// Create the service with adapters chosen by `config`
    pub fn new(config: BridgeConfig) -> Result<Self, GatewayError> {
        config
            .validate()
            .map_err(|e| GatewayError::Config(e.to_string()))?;

        let registry: Arc<dyn NodeRegistry> = match &config.registry.source {
            RegistrySource::Host => Arc::new(HostNodeRegistry::new(
                &config.host.base_url,
                config.timeouts.downstream,
            )),
            RegistrySource::File { path } => Arc::new(
                StaticNodeRegistry::from_file(path)
                    .map_err(|e| GatewayError::Adapter(e.to_string()))?,
            ),
        };
        let store: Arc<dyn GraphStore> = Arc::new(FsGraphStore::new(&config.storage.save_dir));
        let queue: Arc<dyn PromptQueue> = Arc::new(HostPromptQueue::new(
            &config.host.base_url,
            config.timeouts.downstream,
        ));

        Self::with_adapters(config, registry, store, queue)
    }

    /// Create the service around caller-supplied adapters
    pub fn with_adapters(
        config: BridgeConfig,
        registry: Arc<dyn NodeRegistry>,
        store: Arc<dyn GraphStore>,
        queue: Arc<dyn PromptQueue>,
    ) -> Result<Self, GatewayError> {
        config
            .validate()
            .map_err(|e| GatewayError::Config(e.to_string()))?;

        let bus = Arc::new(InMemoryCommandBus::with_capacity(config.bus.capacity));
        let state = AppState::new(&config, bus, registry, store, queue);

        Ok(Self {
            config,
            state,
            shutdown: Arc::new(Notify::new()),
        })
    }

    /// Shared handler state
    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Build the router for this service
    pub fn router(&self) -> Router {
        build_router(self.state.clone(), &self.config)
    }

    /// Handle that stops [`serve`](Self::serve) from another task
    pub fn shutdown_handle(&self) -> ShutdownHandle {
        ShutdownHandle(Arc::clone(&self.shutdown))
    }

    /// Bind the configured address and serve until shutdown
    pub async fn start(&self) -> Result<(), GatewayError> {
        let addr = self.config.http_addr();
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| GatewayError::Bind(format!("{}: {}", addr, e)))?;
        self.serve(listener).await
    }

    /// Serve on an already bound listener until shutdown
    pub async fn serve(&self, listener: TcpListener) -> Result<(), GatewayError> {
        let addr = listener.local_addr()?;
        let router = self.router();
        let shutdown = Arc::clone(&self.shutdown);

        info!(addr = %addr, "Starting graph bridge");
        let result = axum::serve(
            listener,
            router.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(async move {
            shutdown.notified().await;
            info!("Received shutdown signal");
        })
        .await;

        if let Err(e) = &result {
            error!(error = %e, "HTTP server error");
        }
        info!("Graph bridge stopped");
        result.map_err(GatewayError::from)
    }

    /// Trigger graceful shutdown
    pub fn shutdown(&self) {
        self.shutdown.notify_one();
    }
}

/// Stops a running [`GraphBridgeService`].
///
/// A shutdown requested before serving starts is remembered.
#[derive(Clone)]
pub struct ShutdownHandle(Arc<Notify>);

impl ShutdownHandle {
    pub fn shutdown(&self) {
        self.0.notify_one();
    }
}
