/// Shared types used across the codebase

use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type UserId = Uuid;
pub type ListId = Uuid;
pub type ItemId = Uuid;
pub type ShareId = Uuid;

/// Mutations that produce a change notification
/// Used by the list service and the observer dispatcher
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Operation {
    CreateList,
    UpdateList,
    DeleteList,
    AddItem,
    DeleteItem,
    ShareList,
    UnshareList,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::CreateList => "create_list",
            Operation::UpdateList => "update_list",
            Operation::DeleteList => "delete_list",
            Operation::AddItem => "add_item",
            Operation::DeleteItem => "delete_item",
            Operation::ShareList => "share_list",
            Operation::UnshareList => "unshare_list",
        }
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
