//! In-process publish/subscribe sink.
//!
//! Every list id and user id is a topic. Subscribers hold a broadcast receiver
//! per topic; publishing to a topic nobody listens to is not an error. A topic
//! is dropped from the table once its last receiver is gone.

use std::collections::HashMap;
use std::sync::{RwLock, RwLockWriteGuard};

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::observer::context::EventName;
use crate::observer::error::ObserverError;
use crate::observer::traits::NotificationSink;

/// Message received by topic subscribers
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopicMessage {
    pub topic: String,
    pub event: EventName,
    pub payload: Option<Value>,
}

#[derive(Debug)]
pub struct TopicHub {
    capacity: usize,
    topics: RwLock<HashMap<String, broadcast::Sender<TopicMessage>>>,
}

impl TopicHub {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            topics: RwLock::new(HashMap::new()),
        }
    }

    /// Receive events published to a list
    pub fn join_group(&self, list_id: Uuid) -> broadcast::Receiver<TopicMessage> {
        self.subscribe(list_id.to_string())
    }

    /// Receive events addressed to a user
    pub fn subscribe_user(&self, user_id: Uuid) -> broadcast::Receiver<TopicMessage> {
        self.subscribe(user_id.to_string())
    }

    fn write_topics(&self) -> RwLockWriteGuard<'_, HashMap<String, broadcast::Sender<TopicMessage>>> {
        match self.topics.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn subscribe(&self, topic: String) -> broadcast::Receiver<TopicMessage> {
        let mut topics = self.write_topics();
        // Sweep topics whose receivers have all gone away
        topics.retain(|_, sender| sender.receiver_count() > 0);
        topics
            .entry(topic)
            .or_insert_with(|| broadcast::channel(self.capacity).0)
            .subscribe()
    }

    fn leave_if_idle(&self, topic: &str) {
        let mut topics = self.write_topics();
        // A subscriber may have joined since the failed send
        if topics.get(topic).is_some_and(|sender| sender.receiver_count() == 0) {
            topics.remove(topic);
            tracing::trace!("Dropped idle topic {}", topic);
        }
    }

    fn publish(&self, topic: &str, event: EventName, payload: Option<Value>) -> Result<(), ObserverError> {
        let delivered = {
            let topics = self
                .topics
                .read()
                .map_err(|_| ObserverError::SinkError("topic table poisoned".to_string()))?;
            let Some(sender) = topics.get(topic) else {
                tracing::trace!("No subscribers for {} on {}", event, topic);
                return Ok(());
            };
            let message = TopicMessage {
                topic: topic.to_string(),
                event,
                payload,
            };
            // A send error only means every receiver has gone away
            sender.send(message).is_ok()
        };
        if !delivered {
            self.leave_if_idle(topic);
        }
        Ok(())
    }
}

impl Default for TopicHub {
    fn default() -> Self {
        Self::new(64)
    }
}

#[async_trait]
impl NotificationSink for TopicHub {
    async fn notify_group(&self, group_id: &str, event: EventName, payload: Option<Value>) -> Result<(), ObserverError> {
        self.publish(group_id, event, payload)
    }

    async fn notify_user(&self, user_id: &str, event: EventName, payload: Option<Value>) -> Result<(), ObserverError> {
        self.publish(user_id, event, payload)
    }
}
