//! # Test Harness
//!
//! Spawns a bridge on an ephemeral port with an in-memory node registry, a
//! recording job queue and a scratch save directory.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use parking_lot::Mutex;
use serde_json::{json, Value};
use tempfile::TempDir;
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;
use tokio_tungstenite::{connect_async, tungstenite::Message, MaybeTlsStream, WebSocketStream};

use graph_gateway::adapters::{FsGraphStore, StaticNodeRegistry};
use graph_gateway::ports::outbound::{PromptQueue, QueueError};
use graph_gateway::{BridgeConfig, GatewayError, GraphBridgeService, ShutdownHandle, ROUTE_PREFIX};

/// How long a test waits for any single frame or condition
pub const STEP_TIMEOUT: Duration = Duration::from_secs(5);

/// Job queue double that records every prompt
#[derive(Default)]
pub struct RecordingQueue {
    prompts: Mutex<Vec<Value>>,
}

impl RecordingQueue {
    pub fn prompts(&self) -> Vec<Value> {
        self.prompts.lock().clone()
    }
}

#[async_trait]
impl PromptQueue for RecordingQueue {
    async fn enqueue(&self, prompt: Value) -> Result<Value, QueueError> {
        let mut prompts = self.prompts.lock();
        prompts.push(prompt);
        Ok(json!(format!("job-{}", prompts.len())))
    }
}

/// Registry listing served by every test bridge
pub fn node_listing() -> Value {
    json!({
        "KSampler": {
            "input": {
                "required": {"model": ["MODEL"], "steps": ["INT", {"default": 20}]},
                "optional": {}
            },
            "output": ["LATENT"],
            "category": "sampling",
            "description": "Denoise a latent"
        },
        "CheckpointLoaderSimple": {
            "input": {"required": {"ckpt_name": [["a.safetensors"]]}},
            "output": ["MODEL", "CLIP", "VAE"],
            "category": "loaders"
        },
        "VAEDecode": {
            "input": {"required": {"samples": ["LATENT"], "vae": ["VAE"]}},
            "output": ["IMAGE"],
            "category": "latent"
        }
    })
}

/// A bridge serving on `127.0.0.1:<ephemeral>`
pub struct TestBridge {
    pub addr: SocketAddr,
    pub queue: Arc<RecordingQueue>,
    client: reqwest::Client,
    shutdown: ShutdownHandle,
    server: JoinHandle<Result<(), GatewayError>>,
    _save_dir: TempDir,
}

impl TestBridge {
    /// Spawn with default configuration
    pub async fn spawn() -> Self {
        Self::spawn_with(|_| {}).await
    }

    /// Spawn after letting the caller adjust the configuration
    pub async fn spawn_with(configure: impl FnOnce(&mut BridgeConfig)) -> Self {
        let save_dir = tempfile::tempdir().expect("create save dir");

        let mut config = BridgeConfig::default();
        config.storage.save_dir = save_dir.path().to_path_buf();
        configure(&mut config);

        let registry =
            Arc::new(StaticNodeRegistry::from_listing(node_listing()).expect("valid listing"));
        let store = Arc::new(FsGraphStore::new(save_dir.path()));
        let queue = Arc::new(RecordingQueue::default());

        let service =
            GraphBridgeService::with_adapters(config, registry, store, queue.clone())
                .expect("valid configuration");
        let shutdown = service.shutdown_handle();

        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let addr = listener.local_addr().expect("local addr");
        let server = tokio::spawn(async move { service.serve(listener).await });

        Self {
            addr,
            queue,
            client: reqwest::Client::new(),
            shutdown,
            server,
            _save_dir: save_dir,
        }
    }

    /// HTTP URL of a route, e.g. `url("/command")`
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}{}", self.addr, ROUTE_PREFIX, path)
    }

    pub fn ws_url(&self) -> String {
        format!("ws://{}{}/ws", self.addr, ROUTE_PREFIX)
    }

    /// POST a JSON body, returning status and parsed response
    pub async fn post(&self, path: &str, body: Value) -> (u16, Value) {
        self.post_raw(path, &body.to_string()).await
    }

    /// POST raw text, returning status and parsed response
    pub async fn post_raw(&self, path: &str, body: &str) -> (u16, Value) {
        let response = self
            .client
            .post(self.url(path))
            .header("content-type", "application/json")
            .body(body.to_string())
            .send()
            .await
            .expect("request sent");
        let status = response.status().as_u16();
        (status, response.json().await.expect("JSON response"))
    }

    pub async fn get(&self, path: &str) -> (u16, Value) {
        let response = self
            .client
            .get(self.url(path))
            .send()
            .await
            .expect("request sent");
        let status = response.status().as_u16();
        (status, response.json().await.expect("JSON response"))
    }

    /// Current health report
    pub async fn health(&self) -> Value {
        self.get("/health").await.1
    }

    /// Poll the health report until `check` holds
    pub async fn wait_for_health(&self, check: impl Fn(&Value) -> bool) {
        tokio::time::timeout(STEP_TIMEOUT, async {
            loop {
                if check(&self.health().await) {
                    return;
                }
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .expect("health condition never held");
    }

    /// Connect an editor and wait until it receives broadcasts
    pub async fn connect_editor(&self) -> EditorClient {
        let opened = self.health().await["stats"]["connections_opened"]
            .as_u64()
            .unwrap_or(0);

        let (stream, _) = connect_async(self.ws_url()).await.expect("ws connect");

        // Registered only after its bus subscription exists
        self.wait_for_health(|h| h["stats"]["connections_opened"].as_u64() > Some(opened))
            .await;

        EditorClient { stream }
    }

    /// Stop the server and wait for it to exit
    pub async fn stop(self) {
        self.shutdown.shutdown();
        let result = tokio::time::timeout(STEP_TIMEOUT, self.server)
            .await
            .expect("server did not stop")
            .expect("server task panicked");
        assert!(result.is_ok());
    }
}

/// A WebSocket client standing in for the browser editor
pub struct EditorClient {
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

impl EditorClient {
    pub async fn send_json(&mut self, frame: Value) {
        self.send_text(&frame.to_string()).await;
    }

    pub async fn send_text(&mut self, text: &str) {
        self.stream
            .send(Message::text(text.to_string()))
            .await
            .expect("ws send");
    }

    /// Next text frame as JSON, skipping control frames
    pub async fn next_json(&mut self) -> Value {
        tokio::time::timeout(STEP_TIMEOUT, async {
            loop {
                let message = self
                    .stream
                    .next()
                    .await
                    .expect("ws closed")
                    .expect("ws error");
                if let Message::Text(text) = message {
                    return serde_json::from_str(text.as_str()).expect("JSON frame");
                }
            }
        })
        .await
        .expect("no frame before timeout")
    }

    /// Skip frames until one satisfies `matches`
    pub async fn next_matching(&mut self, matches: impl Fn(&Value) -> bool) -> Value {
        loop {
            let frame = self.next_json().await;
            if matches(&frame) {
                return frame;
            }
        }
    }

    /// Wait for the next bus message on `channel`
    pub async fn next_on_channel(&mut self, channel: &str) -> Value {
        self.next_matching(|f| f["type"] == channel).await
    }

    /// Assert nothing arrives within `window`
    pub async fn expect_silence(&mut self, window: Duration) {
        if let Ok(Some(Ok(Message::Text(text)))) =
            tokio::time::timeout(window, self.stream.next()).await
        {
            panic!("unexpected frame: {}", text.as_str());
        }
    }

    pub async fn close(mut self) {
        let _ = self.stream.close(None).await;
    }
}
