use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{TodoItem, TodoListShare};

/// A to-do list. `owner_id` is fixed at creation and never changes.
///
/// `items` and `shares` are only populated when the caller asked for them;
/// an empty vector does not mean the list has no items.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TodoList {
    pub id: Uuid,
    pub title: Option<String>,
    pub owner_id: Uuid,
    /// Bumped by one on every write to the list or its items.
    pub version: i64,
    #[serde(default)]
    pub items: Vec<TodoItem>,
    #[serde(default)]
    pub shares: Vec<TodoListShare>,
}

impl TodoList {
    pub fn new(owner_id: Uuid, title: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            title,
            owner_id,
            version: 1,
            items: Vec::new(),
            shares: Vec::new(),
        }
    }

    pub fn is_owner(&self, user_id: Uuid) -> bool {
        self.owner_id == user_id
    }

    pub fn find_item(&self, item_id: Uuid) -> Option<&TodoItem> {
        self.items.iter().find(|item| item.id == item_id)
    }

    pub fn share_for(&self, user_id: Uuid) -> Option<&TodoListShare> {
        self.shares.iter().find(|share| share.shared_with_user_id == user_id)
    }

    /// Copy of the list without its relations, as the store keeps list rows.
    pub fn header(&self) -> TodoList {
        TodoList {
            items: Vec::new(),
            shares: Vec::new(),
            ..self.clone()
        }
    }
}
