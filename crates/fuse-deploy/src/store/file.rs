//! File-backed state store.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::debug;

use crate::config::StoreConfig;
use crate::error::FuseResult;
use crate::state::DeploymentState;

use super::StateStore;

/// Stores each deployment state as a JSON document under a directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Create a store rooted at `dir`. The directory is created on first save.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Create a store from configuration.
    #[must_use]
    pub fn from_config(config: &StoreConfig) -> Self {
        Self::new(config.state_dir.clone())
    }

    /// Directory the store writes to.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

#[async_trait]
impl StateStore for FileStore {
    async fn load(&self, key: &str) -> FuseResult<Option<DeploymentState>> {
        let path = self.path(key);
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn save(&self, key: &str, state: &DeploymentState) -> FuseResult<()> {
        tokio::fs::create_dir_all(&self.dir).await?;

        let path = self.path(key);
        let tmp = path.with_extension("json.tmp");
        let bytes = serde_json::to_vec_pretty(state)?;

        // Write then rename so a crash never leaves a half-written state file.
        tokio::fs::write(&tmp, &bytes).await?;
        tokio::fs::rename(&tmp, &path).await?;

        debug!(path = %path.display(), stage = %state.kind(), "deployment state saved");
        Ok(())
    }

    async fn discard(&self, key: &str) -> FuseResult<()> {
        match tokio::fs::remove_file(self.path(key)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
