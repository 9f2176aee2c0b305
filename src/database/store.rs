use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::database::models::{TodoItem, TodoList, TodoListShare, User};

/// Errors surfaced by persistence adapters
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Not found: {0}")]
    NotFound(String),

    /// The list moved past the version the caller observed
    #[error("Version conflict on list {list_id}: expected {expected}, found {actual}")]
    Conflict { list_id: Uuid, expected: i64, actual: i64 },

    /// A uniqueness constraint rejected the write
    #[error("Duplicate: {0}")]
    Duplicate(String),

    #[error("Invalid stored value: {0}")]
    Corrupt(String),

    #[error("Backend error: {0}")]
    Backend(String),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// Persistence port for users, lists, items and shares.
///
/// Lists returned by `find_list` carry no relations; `lists_for_user` returns
/// fully hydrated lists. Version-checked writes compare against the list's
/// current version and bump it by one on success, returning the new version.
#[async_trait]
pub trait TodoStore: Send + Sync {
    async fn insert_user(&self, user: &User) -> Result<(), StoreError>;
    async fn find_user(&self, user_id: Uuid) -> Result<Option<User>, StoreError>;
    async fn find_user_by_name(&self, display_name: &str) -> Result<Option<User>, StoreError>;

    async fn insert_list(&self, list: &TodoList) -> Result<(), StoreError>;
    async fn find_list(&self, list_id: Uuid) -> Result<Option<TodoList>, StoreError>;
    async fn update_list(&self, list: &TodoList, expected_version: i64) -> Result<i64, StoreError>;

    /// Remove the list with all of its items and shares, all or nothing.
    async fn delete_list(&self, list_id: Uuid) -> Result<(), StoreError>;

    /// Items in insertion order.
    async fn list_items(&self, list_id: Uuid) -> Result<Vec<TodoItem>, StoreError>;
    async fn insert_item(&self, item: &TodoItem, expected_version: i64) -> Result<i64, StoreError>;
    async fn delete_item(&self, list_id: Uuid, item_id: Uuid, expected_version: i64) -> Result<i64, StoreError>;

    async fn list_shares(&self, list_id: Uuid) -> Result<Vec<TodoListShare>, StoreError>;
    async fn find_share(&self, list_id: Uuid, user_id: Uuid) -> Result<Option<TodoListShare>, StoreError>;
    /// Fails with `Duplicate` if the (list, user) pair already has a share.
    async fn insert_share(&self, share: &TodoListShare) -> Result<(), StoreError>;
    async fn delete_share(&self, share_id: Uuid) -> Result<(), StoreError>;

    /// Every list the user owns or holds a share on, hydrated with items and shares.
    async fn lists_for_user(&self, user_id: Uuid) -> Result<Vec<TodoList>, StoreError>;
}
