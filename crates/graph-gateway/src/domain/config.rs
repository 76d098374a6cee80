//! Gateway configuration with validation.
//!
//! Every section is `#[serde(default)]`, so a TOML file only needs the keys
//! it overrides.

use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

/// Main gateway configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// HTTP server configuration (REST and WebSocket share one listener)
    pub http: HttpConfig,
    /// WebSocket channel configuration
    pub websocket: WebSocketConfig,
    /// Timeout configuration
    pub timeouts: TimeoutConfig,
    /// Request validation limits
    pub limits: LimitsConfig,
    /// Downstream host (job queue and node registry)
    pub host: HostConfig,
    /// Graph document storage
    pub storage: StorageConfig,
    /// Where node type descriptors come from
    pub registry: RegistryConfig,
    /// Fan-out bus configuration
    pub bus: BusConfig,
    /// CORS configuration
    pub cors: CorsConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
}

impl BridgeConfig {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.timeouts.exchange.is_zero() {
            return Err(ConfigError::InvalidTimeout(
                "exchange timeout cannot be 0".into(),
            ));
        }

        if self.timeouts.downstream.is_zero() {
            return Err(ConfigError::InvalidTimeout(
                "downstream timeout cannot be 0".into(),
            ));
        }

        if self.limits.max_request_size == 0 {
            return Err(ConfigError::InvalidLimit(
                "max_request_size cannot be 0".into(),
            ));
        }

        if self.websocket.max_message_size == 0 {
            return Err(ConfigError::InvalidLimit(
                "max_message_size cannot be 0".into(),
            ));
        }

        if self.websocket.outbound_buffer == 0 {
            return Err(ConfigError::InvalidLimit(
                "outbound_buffer cannot be 0".into(),
            ));
        }

        if self.bus.capacity == 0 {
            return Err(ConfigError::InvalidLimit("bus capacity cannot be 0".into()));
        }

        if self.host.base_url.trim().is_empty() {
            return Err(ConfigError::Invalid("host.base_url cannot be empty".into()));
        }

        if let RegistrySource::File { path } = &self.registry.source {
            if path.as_os_str().is_empty() {
                return Err(ConfigError::Invalid("registry file path cannot be empty".into()));
            }
        }

        Ok(())
    }

    /// Get HTTP server bind address
    pub fn http_addr(&self) -> SocketAddr {
        SocketAddr::new(self.http.host, self.http.port)
    }
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Bind address
    pub host: IpAddr,
    /// Port (default: 8189)
    pub port: u16,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: 8189,
        }
    }
}

/// WebSocket channel configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WebSocketConfig {
    /// Maximum inbound frame size in bytes
    pub max_message_size: usize,
    /// Frames queued per connection before writers wait
    pub outbound_buffer: usize,
}

impl Default for WebSocketConfig {
    fn default() -> Self {
        Self {
            max_message_size: 1024 * 1024, // 1MB
            outbound_buffer: 256,
        }
    }
}

/// Timeout configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Default deadline for a correlated exchange
    #[serde(with = "humantime_serde")]
    pub exchange: Duration,
    /// Deadline for calls to the downstream host
    #[serde(with = "humantime_serde")]
    pub downstream: Duration,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            exchange: Duration::from_secs(5),
            downstream: Duration::from_secs(30),
        }
    }
}

/// Request limits configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Max request body size in bytes (default: 16MB, graphs can be large)
    pub max_request_size: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_request_size: 16 * 1024 * 1024,
        }
    }
}

/// Downstream host configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HostConfig {
    /// Base URL of the host process (`/prompt`, `/object_info` live under it)
    pub base_url: String,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8188".to_string(),
        }
    }
}

/// Graph document storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory holding saved graphs, created on first save
    pub save_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            save_dir: PathBuf::from("saved_graphs"),
        }
    }
}

/// Node registry configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Registry source
    pub source: RegistrySource,
}

/// Where node type descriptors come from
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RegistrySource {
    /// Ask the host (`GET {base_url}/object_info`) on every listing
    #[default]
    Host,
    /// Read once from a JSON file shaped like the host's listing
    File {
        /// Path to the JSON file
        path: PathBuf,
    },
}

/// Fan-out bus configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BusConfig {
    /// Messages buffered per listener before it lags
    pub capacity: usize,
}

impl Default for BusConfig {
    fn default() -> Self {
        Self {
            capacity: graph_bus::DEFAULT_CHANNEL_CAPACITY,
        }
    }
}

/// CORS configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CorsConfig {
    /// Enable CORS
    pub enabled: bool,
    /// Allowed origins ("*" for all)
    pub allowed_origins: Vec<String>,
    /// Allowed methods
    pub allowed_methods: Vec<String>,
    /// Allowed headers
    pub allowed_headers: Vec<String>,
    /// Max age for preflight cache
    pub max_age: u64,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            allowed_origins: vec!["*".to_string()],
            allowed_methods: vec!["GET".to_string(), "POST".to_string(), "OPTIONS".to_string()],
            allowed_headers: vec!["Content-Type".to_string()],
            max_age: 86400, // 24 hours
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter directive when `RUST_LOG` is unset
    pub level: String,
    /// Emit JSON lines instead of human-readable output
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

/// Configuration errors
#[derive(Debug, Clone, thiserror::Error)]
pub enum ConfigError {
    /// Invalid size or count limit
    #[error("invalid limit: {0}")]
    InvalidLimit(String),
    /// Invalid timeout value
    #[error("invalid timeout: {0}")]
    InvalidTimeout(String),
    /// General configuration error
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Human-readable durations: `"5s"`, `"300ms"`, `"2m"`, or bare seconds.
pub mod humantime_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        if duration.subsec_millis() == 0 {
            serializer.serialize_str(&format!("{}s", duration.as_secs()))
        } else {
            serializer.serialize_str(&format!("{}ms", duration.as_millis()))
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        parse_duration(&s).map_err(serde::de::Error::custom)
    }

    /// Parse a duration string.
    ///
    /// Values too large for a [`Duration`] are rejected, never saturated.
    pub fn parse_duration(s: &str) -> Result<Duration, &'static str> {
        let s = s.trim();
        // "ms" before "s" and "m", both of which are suffixes of it
        if let Some(ms) = s.strip_suffix("ms") {
            ms.trim()
                .parse::<u64>()
                .map(Duration::from_millis)
                .map_err(|_| "invalid milliseconds")
        } else if let Some(secs) = s.strip_suffix('s') {
            float_seconds(secs.trim()).ok_or("invalid seconds")
        } else if let Some(mins) = s.strip_suffix('m') {
            mins.trim()
                .parse::<u64>()
                .ok()
                .and_then(|m| m.checked_mul(60))
                .map(Duration::from_secs)
                .ok_or("invalid minutes")
        } else {
            // Bare number means seconds
            float_seconds(s).ok_or("invalid duration format")
        }
    }

    fn float_seconds(s: &str) -> Option<Duration> {
        let secs = s.parse::<f64>().ok()?;
        if secs < 0.0 {
            return None;
        }
        // NaN, infinity and out-of-range values all fail here
        Duration::try_from_secs_f64(secs).ok()
    }
}
