use async_trait::async_trait;
use serde_json::Value;

use crate::observer::context::{Audience, EventName, TodoEvent};
use crate::observer::error::ObserverError;

/// Outbound notification channel, addressed by group (list) or user.
/// Delivery semantics belong to the implementation.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn notify_group(&self, group_id: &str, event: EventName, payload: Option<Value>) -> Result<(), ObserverError>;

    async fn notify_user(&self, user_id: &str, event: EventName, payload: Option<Value>) -> Result<(), ObserverError>;

    /// Route an event by its audience
    async fn deliver(&self, event: TodoEvent) -> Result<(), ObserverError> {
        match event.audience {
            Audience::Group(_) => self.notify_group(&event.audience.topic(), event.name, event.payload).await,
            Audience::User(_) => self.notify_user(&event.audience.topic(), event.name, event.payload).await,
        }
    }
}
