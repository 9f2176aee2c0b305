use std::io::ErrorKind;
use std::path::PathBuf;

use async_trait::async_trait;

use super::{MediaError, MediaStore};

/// Files under a root directory, served at `<url_prefix>/<key>`
#[derive(Debug, Clone)]
pub struct LocalMediaStore {
    root: PathBuf,
    url_prefix: String,
}

impl LocalMediaStore {
    pub fn new(root: impl Into<PathBuf>, url_prefix: &str) -> Self {
        Self {
            root: root.into(),
            url_prefix: url_prefix.trim_end_matches('/').to_string(),
        }
    }

    pub fn root(&self) -> &std::path::Path {
        &self.root
    }

    fn key_for(&self, url: &str) -> Result<String, MediaError> {
        let key = url
            .strip_prefix(&self.url_prefix)
            .and_then(|rest| rest.strip_prefix('/'))
            .ok_or_else(|| MediaError::ForeignUrl(url.to_string()))?;
        // Keys are flat; anything with a separator escapes the root
        if key.is_empty() || key.contains('/') || key.contains('\\') || key == ".." {
            return Err(MediaError::ForeignUrl(url.to_string()));
        }
        Ok(key.to_string())
    }
}

#[async_trait]
impl MediaStore for LocalMediaStore {
    async fn put(&self, key: &str, bytes: &[u8]) -> Result<String, MediaError> {
        tokio::fs::create_dir_all(&self.root).await?;
        tokio::fs::write(self.root.join(key), bytes).await?;
        tracing::debug!("Stored {} bytes as {}", bytes.len(), key);
        Ok(format!("{}/{}", self.url_prefix, key))
    }

    async fn delete(&self, url: &str) -> Result<(), MediaError> {
        let key = self.key_for(url)?;
        match tokio::fs::remove_file(self.root.join(&key)).await {
            Ok(()) => {
                tracing::debug!("Removed media {}", key);
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
