use std::path::{Path, PathBuf};

use crate::api::error;

/// Files on local disk, addressed by a relative key and published under a base URL.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    root: PathBuf,
    public_base: String,
}

impl LocalStorage {
    pub fn new(root: impl Into<PathBuf>, public_base: &str) -> Self {
        Self { root: root.into(), public_base: public_base.trim_end_matches('/').to_string() }
    }

    pub fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(key.trim_start_matches('/'))
    }

    pub fn public_url(&self, key: &str) -> String {
        format!("{}/{}", self.public_base, key.trim_start_matches('/'))
    }

    /// Write `bytes` under `key`, creating parent directories. Returns the on-disk path.
    pub async fn write(&self, key: &str, bytes: &[u8]) -> Result<String, error::SystemError> {
        let path = self.path_for(key);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&path, bytes).await?;
        Ok(path.to_string_lossy().into_owned())
    }

    pub async fn remove(&self, path: impl AsRef<Path>) -> Result<(), error::SystemError> {
        tokio::fs::remove_file(path).await?;
        Ok(())
    }
}
