//! # Graph Node
//!
//! Process plumbing around [`graph_gateway::GraphBridgeService`].
//!
//! ## Startup Sequence
//!
//! 1. Parse command line
//! 2. Load configuration (defaults, TOML file, environment, flags)
//! 3. Initialize logging
//! 4. Start the gateway and wait for Ctrl+C

pub mod config;
pub mod logging;

pub use config::{load_config, ConfigOverrides, IgnoredEnv, LoadedConfig, LoadError};
pub use logging::init_logging;
