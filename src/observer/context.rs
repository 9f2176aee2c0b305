use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::types::Operation;

/// Event names as seen by subscribers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventName {
    ListCreated,
    ListUpdated,
    ListDeleted,
    ItemAdded,
    ItemDeleted,
    ListShared,
    ListUnshared,
}

impl EventName {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventName::ListCreated => "ListCreated",
            EventName::ListUpdated => "ListUpdated",
            EventName::ListDeleted => "ListDeleted",
            EventName::ItemAdded => "ItemAdded",
            EventName::ItemDeleted => "ItemDeleted",
            EventName::ListShared => "ListShared",
            EventName::ListUnshared => "ListUnshared",
        }
    }
}

impl From<Operation> for EventName {
    fn from(operation: Operation) -> Self {
        match operation {
            Operation::CreateList => EventName::ListCreated,
            Operation::UpdateList => EventName::ListUpdated,
            Operation::DeleteList => EventName::ListDeleted,
            Operation::AddItem => EventName::ItemAdded,
            Operation::DeleteItem => EventName::ItemDeleted,
            Operation::ShareList => EventName::ListShared,
            Operation::UnshareList => EventName::ListUnshared,
        }
    }
}

impl std::fmt::Display for EventName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Who receives an event: everyone watching a list, or one user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Audience {
    Group(Uuid),
    User(Uuid),
}

impl Audience {
    /// Topic name: the list id or user id in string form
    pub fn topic(&self) -> String {
        match self {
            Audience::Group(id) | Audience::User(id) => id.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TodoEvent {
    pub name: EventName,
    pub audience: Audience,
    pub payload: Option<Value>,
}

impl TodoEvent {
    /// Event for every subscriber of a list
    pub fn group<T: Serialize>(operation: Operation, list_id: Uuid, payload: &T) -> Self {
        Self {
            name: operation.into(),
            audience: Audience::Group(list_id),
            payload: to_payload(payload),
        }
    }

    /// Event addressed to a single user
    pub fn user<T: Serialize>(operation: Operation, user_id: Uuid, payload: &T) -> Self {
        Self {
            name: operation.into(),
            audience: Audience::User(user_id),
            payload: to_payload(payload),
        }
    }
}

fn to_payload<T: Serialize>(payload: &T) -> Option<Value> {
    match serde_json::to_value(payload) {
        Ok(value) => Some(value),
        Err(e) => {
            // Still deliver the event name
            tracing::warn!("Failed to serialize event payload: {}", e);
            None
        }
    }
}
