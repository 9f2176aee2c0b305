//! Storage for item attachments.
//!
//! Objects are addressed by a generated key; the store hands back the public URL
//! that goes into the item record, and later deletes by that same URL.

pub mod local;
pub mod memory;

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::database::models::MediaType;

pub use local::LocalMediaStore;
pub use memory::MemoryMediaStore;

#[derive(Debug, Error)]
pub enum MediaError {
    #[error("Media URL {0} is not managed by this store")]
    ForeignUrl(String),

    #[error("Media I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Attachment backend. `delete` succeeds when the object is already gone.
#[async_trait]
pub trait MediaStore: Send + Sync {
    /// Store `bytes` under `key` and return the URL it is served from
    async fn put(&self, key: &str, bytes: &[u8]) -> Result<String, MediaError>;

    async fn delete(&self, url: &str) -> Result<(), MediaError>;
}

/// `.mp4` and `.mov` are video; every other extension is treated as an image
pub fn classify(file_name: &str) -> MediaType {
    match extension(file_name).as_deref() {
        Some(".mp4") | Some(".mov") => MediaType::Video,
        _ => MediaType::Image,
    }
}

/// Fresh storage key keeping the upload's lowercased extension
pub fn storage_key(file_name: &str) -> String {
    format!("{}{}", Uuid::new_v4(), extension(file_name).unwrap_or_default())
}

/// Extensions that are not plain ASCII alphanumerics are dropped so every key stays URL-safe
fn extension(file_name: &str) -> Option<String> {
    std::path::Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .filter(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(|ext| format!(".{}", ext.to_ascii_lowercase()))
}
