//! Filesystem-backed graph store.

use crate::domain::types::DocumentName;
use crate::ports::outbound::{GraphStore, StoreError};
use async_trait::async_trait;
use serde_json::Value;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Stores each graph as `<save_dir>/<name>`, JSON encoded.
///
/// The directory is created on the first save.
pub struct FsGraphStore {
    save_dir: PathBuf,
}

impl FsGraphStore {
    pub fn new(save_dir: impl Into<PathBuf>) -> Self {
        Self {
            save_dir: save_dir.into(),
        }
    }

    /// Directory documents are written to
    pub fn save_dir(&self) -> &Path {
        &self.save_dir
    }

    fn path_for(&self, name: &DocumentName) -> PathBuf {
        self.save_dir.join(name.as_str())
    }
}

#[async_trait]
impl GraphStore for FsGraphStore {
    async fn save(&self, name: &DocumentName, graph: &Value) -> Result<(), StoreError> {
        tokio::fs::create_dir_all(&self.save_dir).await?;

        let path = self.path_for(name);
        let bytes = serde_json::to_vec(graph)?;
        tokio::fs::write(&path, bytes).await?;

        debug!(path = %path.display(), "Saved graph document");
        Ok(())
    }

    async fn load(&self, name: &DocumentName) -> Result<Option<Value>, StoreError> {
        let path = self.path_for(name);
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        debug!(path = %path.display(), "Loaded graph document");
        Ok(Some(serde_json::from_slice(&bytes)?))
    }
}
