//! Test utilities: an in-memory service stack with a recording sink

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::Value;
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::database::memory::MemoryStore;
use crate::database::models::{PermissionType, TodoList};
use crate::media::MemoryMediaStore;
use crate::observer::{Audience, EventDispatcher, EventName, NotificationSink, ObserverError, TodoEvent, DEFAULT_SINK_TIMEOUT};
use crate::services::{NewList, ShareRequest, TodoService, UserService};

/// Sink that keeps every delivered event in order
#[derive(Debug, Default)]
pub struct RecordingSink {
    events: Mutex<Vec<TodoEvent>>,
}

impl RecordingSink {
    pub fn events(&self) -> Vec<TodoEvent> {
        self.events.lock().map(|events| events.clone()).unwrap_or_default()
    }

    fn record(&self, name: EventName, audience: Audience, payload: Option<Value>) {
        if let Ok(mut events) = self.events.lock() {
            events.push(TodoEvent { name, audience, payload });
        }
    }
}

#[async_trait]
impl NotificationSink for RecordingSink {
    async fn notify_group(&self, group_id: &str, event: EventName, payload: Option<Value>) -> Result<(), ObserverError> {
        let id = Uuid::parse_str(group_id).map_err(|e| ObserverError::SinkError(e.to_string()))?;
        self.record(event, Audience::Group(id), payload);
        Ok(())
    }

    async fn notify_user(&self, user_id: &str, event: EventName, payload: Option<Value>) -> Result<(), ObserverError> {
        let id = Uuid::parse_str(user_id).map_err(|e| ObserverError::SinkError(e.to_string()))?;
        self.record(event, Audience::User(id), payload);
        Ok(())
    }
}

/// Services wired over in-memory backends. Must be created inside a tokio runtime.
pub struct TestContext {
    pub store: Arc<MemoryStore>,
    pub media: Arc<MemoryMediaStore>,
    pub sink: Arc<RecordingSink>,
    pub events: EventDispatcher,
    pub todos: TodoService,
    pub users: UserService,
}

impl TestContext {
    pub fn new() -> Self {
        let store = Arc::new(MemoryStore::new());
        let media = Arc::new(MemoryMediaStore::new());
        let sink = Arc::new(RecordingSink::default());
        let events = EventDispatcher::spawn(sink.clone(), 256, DEFAULT_SINK_TIMEOUT);

        Self {
            todos: TodoService::new(store.clone(), media.clone(), events.clone()),
            users: UserService::new(store.clone()),
            store,
            media,
            sink,
            events,
        }
    }

    /// Register a user and return it as a verified identity
    pub async fn user(&self, name: &str) -> AuthUser {
        let user = self.users.register(name).await.unwrap();
        AuthUser::new(user.id, user.display_name)
    }

    pub async fn list(&self, owner: &AuthUser, title: &str) -> TodoList {
        let request = NewList {
            title: Some(title.to_string()),
        };
        self.todos.create_list(owner, request).await.unwrap()
    }

    pub async fn share(&self, owner: &AuthUser, list_id: Uuid, with: &AuthUser, permission: PermissionType) {
        let request = ShareRequest {
            user_id: Some(with.user_id),
            permission,
        };
        self.todos.share_list(owner, list_id, request).await.unwrap();
    }

    /// Every event delivered so far, after draining the dispatcher
    pub async fn delivered(&self) -> Vec<TodoEvent> {
        self.events.flush().await.unwrap();
        self.sink.events()
    }
}
