use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{MediaError, MediaStore};

const URL_PREFIX: &str = "/media/";

#[derive(Debug, Default)]
pub struct MemoryMediaStore {
    objects: RwLock<HashMap<String, Vec<u8>>>,
}

impl MemoryMediaStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn contains(&self, url: &str) -> bool {
        self.objects.read().await.contains_key(url)
    }

    pub async fn len(&self) -> usize {
        self.objects.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl MediaStore for MemoryMediaStore {
    async fn put(&self, key: &str, bytes: &[u8]) -> Result<String, MediaError> {
        let url = format!("{}{}", URL_PREFIX, key);
        self.objects.write().await.insert(url.clone(), bytes.to_vec());
        Ok(url)
    }

    async fn delete(&self, url: &str) -> Result<(), MediaError> {
        if !url.starts_with(URL_PREFIX) {
            return Err(MediaError::ForeignUrl(url.to_string()));
        }
        self.objects.write().await.remove(url);
        Ok(())
    }
}
