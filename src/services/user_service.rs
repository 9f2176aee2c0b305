use std::sync::Arc;

use uuid::Uuid;

use crate::database::models::User;
use crate::database::store::{StoreError, TodoStore};
use crate::services::error::{ServiceError, ServiceResult};

/// Registration and lookup of users. Users are immutable once created.
#[derive(Clone)]
pub struct UserService {
    store: Arc<dyn TodoStore>,
}

impl UserService {
    pub fn new(store: Arc<dyn TodoStore>) -> Self {
        Self { store }
    }

    pub async fn register(&self, display_name: &str) -> ServiceResult<User> {
        let display_name = display_name.trim();
        if display_name.is_empty() {
            return Err(ServiceError::bad_request("Display name is required"));
        }

        let user = User::new(display_name);
        match self.store.insert_user(&user).await {
            Ok(()) => {
                tracing::info!(user_id = %user.id, "Registered user {}", user.display_name);
                Ok(user)
            }
            Err(StoreError::Duplicate(_)) => Err(ServiceError::bad_request("User already exists")),
            Err(err) => Err(ServiceError::from_store(err, "register_user", None, None)),
        }
    }

    pub async fn get_by_id(&self, user_id: Uuid) -> ServiceResult<User> {
        self.store
            .find_user(user_id)
            .await
            .map_err(|err| ServiceError::from_store(err, "find_user", None, Some(user_id)))?
            .ok_or_else(|| ServiceError::not_found("User not found"))
    }

    pub async fn get_by_name(&self, display_name: &str) -> ServiceResult<User> {
        self.store
            .find_user_by_name(display_name)
            .await
            .map_err(|err| ServiceError::from_store(err, "find_user", None, None))?
            .ok_or_else(|| ServiceError::not_found("User not found"))
    }
}
