//! Node registry adapters.

use crate::adapters::{host_client, join_url};
use crate::ports::outbound::{NodeRegistry, RegistryError};
use async_trait::async_trait;
use serde_json::Value;
use std::path::Path;
use std::time::Duration;
use tracing::info;

/// Fixed set of descriptors, held in memory.
#[derive(Debug, Clone, Default)]
pub struct StaticNodeRegistry {
    entries: Vec<(String, Value)>,
}

impl StaticNodeRegistry {
    pub fn new(entries: Vec<(String, Value)>) -> Self {
        Self { entries }
    }

    /// Build from a listing shaped like the host's `/object_info` answer
    pub fn from_listing(listing: Value) -> Result<Self, RegistryError> {
        match listing {
            Value::Object(map) => Ok(Self::new(map.into_iter().collect())),
            _ => Err(RegistryError::Malformed(
                "node listing must be a JSON object".into(),
            )),
        }
    }

    /// Load a listing from a JSON file
    pub fn from_file(path: &Path) -> Result<Self, RegistryError> {
        let bytes = std::fs::read(path)
            .map_err(|e| RegistryError::Unreachable(format!("{}: {}", path.display(), e)))?;
        let listing: Value = serde_json::from_slice(&bytes)
            .map_err(|e| RegistryError::Malformed(format!("{}: {}", path.display(), e)))?;

        let registry = Self::from_listing(listing)?;
        info!(path = %path.display(), nodes = registry.len(), "Loaded node registry");
        Ok(registry)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl NodeRegistry for StaticNodeRegistry {
    async fn entries(&self) -> Result<Vec<(String, Value)>, RegistryError> {
        Ok(self.entries.clone())
    }
}

/// Queries the host's `GET {base_url}/object_info` on every call.
pub struct HostNodeRegistry {
    client: reqwest::Client,
    endpoint: String,
}

impl HostNodeRegistry {
    pub fn new(base_url: &str, timeout: Duration) -> Self {
        Self {
            client: host_client(timeout),
            endpoint: join_url(base_url, "/object_info"),
        }
    }
}

#[async_trait]
impl NodeRegistry for HostNodeRegistry {
    async fn entries(&self) -> Result<Vec<(String, Value)>, RegistryError> {
        let response = self
            .client
            .get(&self.endpoint)
            .send()
            .await
            .map_err(|e| RegistryError::Unreachable(e.to_string()))?;

        if !response.status().is_success() {
            return Err(RegistryError::Unreachable(format!(
                "{} returned {}",
                self.endpoint,
                response.status()
            )));
        }

        let listing: Value = response
            .json()
            .await
            .map_err(|e| RegistryError::Malformed(e.to_string()))?;

        StaticNodeRegistry::from_listing(listing).map(|registry| registry.entries)
    }
}
