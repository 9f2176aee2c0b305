use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PermissionType {
    #[default]
    View,
    Edit,
}

impl PermissionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PermissionType::View => "View",
            PermissionType::Edit => "Edit",
        }
    }

    pub fn from_raw(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "view" | "0" => Some(PermissionType::View),
            "edit" | "1" => Some(PermissionType::Edit),
            _ => None,
        }
    }

    pub fn can_edit(&self) -> bool {
        matches!(self, PermissionType::Edit)
    }
}

/// A grant of access on a list for one non-owner user.
/// At most one share exists per (list_id, shared_with_user_id).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoListShare {
    pub id: Uuid,
    pub list_id: Uuid,
    pub shared_with_user_id: Uuid,
    pub permission: PermissionType,
}

impl TodoListShare {
    pub fn new(list_id: Uuid, shared_with_user_id: Uuid, permission: PermissionType) -> Self {
        Self {
            id: Uuid::new_v4(),
            list_id,
            shared_with_user_id,
            permission,
        }
    }
}
