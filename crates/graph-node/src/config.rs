//! Configuration loading.
//!
//! Later sources win: built-in defaults, then the TOML file, then
//! `GRAPH_BRIDGE_*` environment variables, then command-line flags.

use graph_gateway::domain::config::humantime_serde::parse_duration;
use graph_gateway::domain::RegistrySource;
use graph_gateway::BridgeConfig;
use std::path::{Path, PathBuf};
use std::fmt;
use std::time::Duration;

/// Environment variable for the HTTP port
pub const ENV_PORT: &str = "GRAPH_BRIDGE_PORT";
/// Environment variable for the host base URL
pub const ENV_HOST_URL: &str = "GRAPH_BRIDGE_HOST_URL";
/// Environment variable for the saved graph directory
pub const ENV_SAVE_DIR: &str = "GRAPH_BRIDGE_SAVE_DIR";
/// Environment variable for the default exchange timeout
pub const ENV_EXCHANGE_TIMEOUT: &str = "GRAPH_BRIDGE_EXCHANGE_TIMEOUT";

/// Values taken from the command line
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub port: Option<u16>,
    pub host_url: Option<String>,
    pub save_dir: Option<PathBuf>,
    pub exchange_timeout: Option<Duration>,
    pub registry_file: Option<PathBuf>,
    pub log_json: bool,
}

/// An environment override that could not be parsed and was skipped
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IgnoredEnv {
    pub var: &'static str,
    pub value: String,
    pub reason: &'static str,
}

impl fmt::Display for IgnoredEnv {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={:?}: {}", self.var, self.value, self.reason)
    }
}

/// Effective configuration plus the overrides that were skipped.
///
/// Loading happens before logging exists, so skipped values are handed
/// back for the caller to report.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config: BridgeConfig,
    pub ignored: Vec<IgnoredEnv>,
}

/// Configuration loading errors
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

/// Build the effective configuration.
///
/// `env` looks up environment variables; pass `|k| std::env::var(k).ok()`
/// in production. Unparseable environment values are skipped and listed in
/// [`LoadedConfig::ignored`].
pub fn load_config<F>(
    file: Option<&Path>,
    env: F,
    overrides: &ConfigOverrides,
) -> Result<LoadedConfig, LoadError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = match file {
        Some(path) => read_file(path)?,
        None => BridgeConfig::default(),
    };

    let ignored = apply_env(&mut config, env);
    apply_overrides(&mut config, overrides);

    Ok(LoadedConfig { config, ignored })
}

fn read_file(path: &Path) -> Result<BridgeConfig, LoadError> {
    let text = std::fs::read_to_string(path).map_err(|source| LoadError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&text).map_err(|source| LoadError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

fn apply_env<F>(config: &mut BridgeConfig, env: F) -> Vec<IgnoredEnv>
where
    F: Fn(&str) -> Option<String>,
{
    let mut ignored = Vec::new();

    if let Some(port) = env(ENV_PORT) {
        match port.parse() {
            Ok(p) => config.http.port = p,
            Err(_) => ignored.push(IgnoredEnv {
                var: ENV_PORT,
                value: port,
                reason: "invalid port",
            }),
        }
    }
    if let Some(url) = env(ENV_HOST_URL) {
        config.host.base_url = url;
    }
    if let Some(dir) = env(ENV_SAVE_DIR) {
        config.storage.save_dir = PathBuf::from(dir);
    }
    if let Some(timeout) = env(ENV_EXCHANGE_TIMEOUT) {
        match parse_duration(&timeout) {
            Ok(d) => config.timeouts.exchange = d,
            Err(reason) => ignored.push(IgnoredEnv {
                var: ENV_EXCHANGE_TIMEOUT,
                value: timeout,
                reason,
            }),
        }
    }

    ignored
}

fn apply_overrides(config: &mut BridgeConfig, overrides: &ConfigOverrides) {
    if let Some(port) = overrides.port {
        config.http.port = port;
    }
    if let Some(url) = &overrides.host_url {
        config.host.base_url = url.clone();
    }
    if let Some(dir) = &overrides.save_dir {
        config.storage.save_dir = dir.clone();
    }
    if let Some(timeout) = overrides.exchange_timeout {
        config.timeouts.exchange = timeout;
    }
    if let Some(path) = &overrides.registry_file {
        config.registry.source = RegistrySource::File { path: path.clone() };
    }
    if overrides.log_json {
        config.logging.json = true;
    }
}
