//! Adapters for the gateway's outbound ports.
//!
//! Filesystem and HTTP implementations of the traits in [`crate::ports`].

pub mod fs_store;
pub mod prompt_queue;
pub mod registry;

pub use fs_store::FsGraphStore;
pub use prompt_queue::HostPromptQueue;
pub use registry::{HostNodeRegistry, StaticNodeRegistry};

/// Build the HTTP client used for calls to the host process.
pub(crate) fn host_client(timeout: std::time::Duration) -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(timeout)
        .connect_timeout(std::time::Duration::from_secs(2))
        .build()
        .unwrap_or_else(|_| reqwest::Client::new())
}

/// Join a base URL and an absolute path without doubling the slash
pub(crate) fn join_url(base: &str, path: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), path.trim_start_matches('/'))
}
