//! In-process store used by tests and `--in-memory` runs.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::database::models::{TodoItem, TodoList, TodoListShare, User};
use crate::database::store::{StoreError, TodoStore};

#[derive(Debug, Default)]
struct Tables {
    users: HashMap<Uuid, User>,
    // Headers only; relations live in `items` and `shares`
    lists: HashMap<Uuid, TodoList>,
    // Global insertion order doubles as per-list item order
    items: Vec<TodoItem>,
    shares: Vec<TodoListShare>,
}

impl Tables {
    fn check_version(&self, list_id: Uuid, expected: i64) -> Result<i64, StoreError> {
        let list = self
            .lists
            .get(&list_id)
            .ok_or_else(|| StoreError::NotFound(format!("list {}", list_id)))?;
        if list.version != expected {
            return Err(StoreError::Conflict {
                list_id,
                expected,
                actual: list.version,
            });
        }
        Ok(list.version)
    }

    fn bump(&mut self, list_id: Uuid) -> i64 {
        match self.lists.get_mut(&list_id) {
            Some(list) => {
                list.version += 1;
                list.version
            }
            None => 0,
        }
    }

    fn hydrate(&self, header: &TodoList) -> TodoList {
        let mut list = header.clone();
        list.items = self.items.iter().filter(|i| i.list_id == header.id).cloned().collect();
        list.shares = self.shares.iter().filter(|s| s.list_id == header.id).cloned().collect();
        list
    }
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
    #[cfg(test)]
    failures: std::sync::Mutex<std::collections::HashSet<&'static str>>,
    #[cfg(test)]
    interleaved: std::sync::Mutex<std::collections::HashSet<&'static str>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every later call to `operation` fail with a backend error.
    #[cfg(test)]
    pub fn inject_failure(&self, operation: &'static str) {
        if let Ok(mut failures) = self.failures.lock() {
            failures.insert(operation);
        }
    }

    #[cfg(test)]
    fn check_failure(&self, operation: &'static str) -> Result<(), StoreError> {
        match self.failures.lock() {
            Ok(failures) if failures.contains(operation) => {
                Err(StoreError::Backend(format!("injected failure in {}", operation)))
            }
            _ => Ok(()),
        }
    }

    #[cfg(not(test))]
    fn check_failure(&self, _operation: &'static str) -> Result<(), StoreError> {
        Ok(())
    }

    /// Bump the list version right before every later call to `operation`, as a
    /// writer racing the caller would.
    #[cfg(test)]
    pub fn inject_concurrent_write(&self, operation: &'static str) {
        if let Ok(mut interleaved) = self.interleaved.lock() {
            interleaved.insert(operation);
        }
    }

    #[cfg(test)]
    fn interleave(&self, tables: &mut Tables, operation: &'static str, list_id: Uuid) {
        let racing = self
            .interleaved
            .lock()
            .map(|interleaved| interleaved.contains(operation))
            .unwrap_or(false);
        if racing {
            tables.bump(list_id);
        }
    }

    #[cfg(not(test))]
    fn interleave(&self, _tables: &mut Tables, _operation: &'static str, _list_id: Uuid) {}
}

#[async_trait]
impl TodoStore for MemoryStore {
    async fn insert_user(&self, user: &User) -> Result<(), StoreError> {
        self.check_failure("insert_user")?;
        let mut tables = self.tables.write().await;
        if tables.users.values().any(|u| u.display_name == user.display_name) {
            return Err(StoreError::Duplicate(format!("user {}", user.display_name)));
        }
        tables.users.insert(user.id, user.clone());
        Ok(())
    }

    async fn find_user(&self, user_id: Uuid) -> Result<Option<User>, StoreError> {
        self.check_failure("find_user")?;
        Ok(self.tables.read().await.users.get(&user_id).cloned())
    }

    async fn find_user_by_name(&self, display_name: &str) -> Result<Option<User>, StoreError> {
        self.check_failure("find_user_by_name")?;
        let tables = self.tables.read().await;
        Ok(tables.users.values().find(|u| u.display_name == display_name).cloned())
    }

    async fn insert_list(&self, list: &TodoList) -> Result<(), StoreError> {
        self.check_failure("insert_list")?;
        let mut tables = self.tables.write().await;
        if tables.lists.contains_key(&list.id) {
            return Err(StoreError::Duplicate(format!("list {}", list.id)));
        }
        tables.lists.insert(list.id, list.header());
        Ok(())
    }

    async fn find_list(&self, list_id: Uuid) -> Result<Option<TodoList>, StoreError> {
        self.check_failure("find_list")?;
        Ok(self.tables.read().await.lists.get(&list_id).cloned())
    }

    async fn update_list(&self, list: &TodoList, expected_version: i64) -> Result<i64, StoreError> {
        self.check_failure("update_list")?;
        let mut tables = self.tables.write().await;
        tables.check_version(list.id, expected_version)?;
        if let Some(stored) = tables.lists.get_mut(&list.id) {
            stored.title = list.title.clone();
        }
        Ok(tables.bump(list.id))
    }

    async fn delete_list(&self, list_id: Uuid) -> Result<(), StoreError> {
        self.check_failure("delete_list")?;
        // Single write guard: the cascade is observed all at once or not at all
        let mut tables = self.tables.write().await;
        if tables.lists.remove(&list_id).is_none() {
            return Err(StoreError::NotFound(format!("list {}", list_id)));
        }
        tables.items.retain(|i| i.list_id != list_id);
        tables.shares.retain(|s| s.list_id != list_id);
        Ok(())
    }

    async fn list_items(&self, list_id: Uuid) -> Result<Vec<TodoItem>, StoreError> {
        self.check_failure("list_items")?;
        let tables = self.tables.read().await;
        Ok(tables.items.iter().filter(|i| i.list_id == list_id).cloned().collect())
    }

    async fn insert_item(&self, item: &TodoItem, expected_version: i64) -> Result<i64, StoreError> {
        self.check_failure("insert_item")?;
        let mut tables = self.tables.write().await;
        self.interleave(&mut tables, "insert_item", item.list_id);
        tables.check_version(item.list_id, expected_version)?;
        tables.items.push(item.clone());
        Ok(tables.bump(item.list_id))
    }

    async fn delete_item(&self, list_id: Uuid, item_id: Uuid, expected_version: i64) -> Result<i64, StoreError> {
        self.check_failure("delete_item")?;
        let mut tables = self.tables.write().await;
        self.interleave(&mut tables, "delete_item", list_id);
        tables.check_version(list_id, expected_version)?;
        let before = tables.items.len();
        tables.items.retain(|i| !(i.id == item_id && i.list_id == list_id));
        if tables.items.len() == before {
            return Err(StoreError::NotFound(format!("item {}", item_id)));
        }
        Ok(tables.bump(list_id))
    }

    async fn list_shares(&self, list_id: Uuid) -> Result<Vec<TodoListShare>, StoreError> {
        self.check_failure("list_shares")?;
        let tables = self.tables.read().await;
        Ok(tables.shares.iter().filter(|s| s.list_id == list_id).cloned().collect())
    }

    async fn find_share(&self, list_id: Uuid, user_id: Uuid) -> Result<Option<TodoListShare>, StoreError> {
        self.check_failure("find_share")?;
        let tables = self.tables.read().await;
        Ok(tables
            .shares
            .iter()
            .find(|s| s.list_id == list_id && s.shared_with_user_id == user_id)
            .cloned())
    }

    async fn insert_share(&self, share: &TodoListShare) -> Result<(), StoreError> {
        self.check_failure("insert_share")?;
        let mut tables = self.tables.write().await;
        if !tables.lists.contains_key(&share.list_id) {
            return Err(StoreError::NotFound(format!("list {}", share.list_id)));
        }
        if tables
            .shares
            .iter()
            .any(|s| s.list_id == share.list_id && s.shared_with_user_id == share.shared_with_user_id)
        {
            return Err(StoreError::Duplicate(format!(
                "share of list {} with user {}",
                share.list_id, share.shared_with_user_id
            )));
        }
        tables.shares.push(share.clone());
        Ok(())
    }

    async fn delete_share(&self, share_id: Uuid) -> Result<(), StoreError> {
        self.check_failure("delete_share")?;
        let mut tables = self.tables.write().await;
        let before = tables.shares.len();
        tables.shares.retain(|s| s.id != share_id);
        if tables.shares.len() == before {
            return Err(StoreError::NotFound(format!("share {}", share_id)));
        }
        Ok(())
    }

    async fn lists_for_user(&self, user_id: Uuid) -> Result<Vec<TodoList>, StoreError> {
        self.check_failure("lists_for_user")?;
        let tables = self.tables.read().await;
        let mut lists: Vec<TodoList> = tables
            .lists
            .values()
            .filter(|list| {
                list.owner_id == user_id
                    || tables
                        .shares
                        .iter()
                        .any(|s| s.list_id == list.id && s.shared_with_user_id == user_id)
            })
            .map(|list| tables.hydrate(list))
            .collect();
        // HashMap order is arbitrary; keep results stable for callers
        lists.sort_by(|a, b| a.title.cmp(&b.title).then(a.id.cmp(&b.id)));
        Ok(lists)
    }
}
