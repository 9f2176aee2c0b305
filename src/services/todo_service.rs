//! List Mutation Service.
//!
//! Every operation resolves the acting user, asks the [`AccessGate`] for the list
//! with the relations it needs, performs the change through the store and then
//! queues a notification. Notifications are queued only after the store call
//! returned, and their delivery never affects the result.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use uuid::Uuid;

use crate::access::{AccessGate, AccessNeed};
use crate::auth::IdentityContext;
use crate::database::models::{PermissionType, PriorityType, StatusType, TodoItem, TodoList, TodoListShare};
use crate::database::store::{StoreError, TodoStore};
use crate::filter::{AttributeType, Filter, FilterSpec, SortDirection, SortSpec};
use crate::media::{self, MediaError, MediaStore};
use crate::observer::{EventDispatcher, TodoEvent};
use crate::services::error::{ServiceError, ServiceResult};
use crate::types::{ItemId, ListId, Operation, UserId};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewList {
    #[serde(default)]
    pub title: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ListUpdate {
    #[serde(default)]
    pub title: Option<String>,
    /// List version the caller last observed
    pub version: i64,
}

/// Attachment uploaded together with a new item
#[derive(Debug, Clone)]
pub struct MediaUpload {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, Default)]
pub struct NewItem {
    pub name: Option<String>,
    pub description: Option<String>,
    pub due_date: Option<DateTime<Utc>>,
    pub status: Option<StatusType>,
    pub priority: Option<PriorityType>,
    pub media: Option<MediaUpload>,
    /// List version the caller last observed
    pub version: i64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ShareRequest {
    #[serde(default, alias = "userId")]
    pub user_id: Option<Uuid>,
    #[serde(default)]
    pub permission: PermissionType,
}

#[derive(Clone)]
pub struct TodoService {
    store: Arc<dyn TodoStore>,
    media: Arc<dyn MediaStore>,
    events: EventDispatcher,
    gate: Arc<AccessGate>,
}

impl TodoService {
    pub fn new(store: Arc<dyn TodoStore>, media: Arc<dyn MediaStore>, events: EventDispatcher) -> Self {
        let gate = Arc::new(AccessGate::new(store.clone()));
        Self {
            store,
            media,
            events,
            gate,
        }
    }

    pub async fn create_list(&self, identity: &dyn IdentityContext, request: NewList) -> ServiceResult<TodoList> {
        let user_id = identity.current_user_id()?;
        let list = TodoList::new(user_id, request.title);

        self.store
            .insert_list(&list)
            .await
            .map_err(ServiceError::store("create_list", list.id, user_id))?;

        tracing::info!(list_id = %list.id, %user_id, "Created todo list");
        self.notify_group(Operation::CreateList, &list);
        Ok(list)
    }

    pub async fn get_list(&self, identity: &dyn IdentityContext, list_id: ListId) -> ServiceResult<TodoList> {
        let user_id = identity.current_user_id()?;
        let (list, _) = self
            .gate
            .resolve(list_id, user_id, AccessNeed::read().items().shares())
            .await?;
        Ok(list)
    }

    /// Overwrite the title. Editors and the owner only.
    pub async fn update_list(
        &self,
        identity: &dyn IdentityContext,
        list_id: ListId,
        update: ListUpdate,
    ) -> ServiceResult<TodoList> {
        let user_id = identity.current_user_id()?;
        let (mut list, _) = self
            .gate
            .resolve(list_id, user_id, AccessNeed::read().shares().edit())
            .await?;

        list.title = update.title;
        list.version = self
            .store
            .update_list(&list, update.version)
            .await
            .map_err(ServiceError::store("update_list", list_id, user_id))?;

        tracing::info!(%list_id, %user_id, version = list.version, "Updated todo list");
        self.notify_group(Operation::UpdateList, &list);
        Ok(list)
    }

    /// Remove the list with all its items and shares, then the items' media.
    pub async fn delete_list(&self, identity: &dyn IdentityContext, list_id: ListId) -> ServiceResult<TodoList> {
        let user_id = identity.current_user_id()?;
        let (list, _) = self
            .gate
            .resolve(list_id, user_id, AccessNeed::read().items().shares().owner())
            .await?;

        self.store
            .delete_list(list_id)
            .await
            .map_err(ServiceError::store("delete_list", list_id, user_id))?;

        // Records are gone; leftover objects are only logged
        let cleanups = list
            .items
            .iter()
            .filter_map(|item| item.media_url.as_deref().map(|url| (item.id, url)))
            .map(|(item_id, url)| async move {
                if let Err(e) = self.media.delete(url).await {
                    tracing::warn!(%list_id, %item_id, "Failed to remove media {}: {}", url, e);
                }
            });
        futures::future::join_all(cleanups).await;

        tracing::info!(%list_id, %user_id, items = list.items.len(), shares = list.shares.len(), "Deleted todo list");
        self.notify_group(Operation::DeleteList, &list);
        Ok(list)
    }

    /// Append an item, storing its attachment first. Returns the list with the
    /// new item and version.
    pub async fn add_item(&self, identity: &dyn IdentityContext, list_id: ListId, request: NewItem) -> ServiceResult<TodoList> {
        let user_id = identity.current_user_id()?;
        let (mut list, _) = self
            .gate
            .resolve(list_id, user_id, AccessNeed::read().items().shares().edit())
            .await?;
        ensure_version(&list, request.version)?;

        let mut item = TodoItem::new(list_id, request.name.unwrap_or_default());
        item.description = request.description.unwrap_or_default();
        item.due_date = request.due_date;
        item.status = request.status.unwrap_or_default();
        item.priority = request.priority.unwrap_or_default();

        if let Some(upload) = &request.media {
            let key = media::storage_key(&upload.file_name);
            let url = self
                .media
                .put(&key, &upload.bytes)
                .await
                .map_err(|e| media_failure(e, Operation::AddItem, list_id, user_id))?;
            item.media_url = Some(url);
            item.media_type = Some(media::classify(&upload.file_name));
        }

        let version = match self.store.insert_item(&item, request.version).await {
            Ok(version) => version,
            Err(err) => {
                if let Some(url) = &item.media_url {
                    if let Err(e) = self.media.delete(url).await {
                        tracing::warn!(%list_id, "Failed to remove orphaned media {}: {}", url, e);
                    }
                }
                return Err(ServiceError::from_store(err, "add_item", Some(list_id), Some(user_id)));
            }
        };

        tracing::info!(%list_id, item_id = %item.id, %user_id, version, "Added todo item");
        self.events
            .dispatch(TodoEvent::group(Operation::AddItem, list_id, &item));
        list.items.push(item);
        list.version = version;
        Ok(list)
    }

    /// Delete one item of the list, then its attachment. Returns the list without it.
    pub async fn delete_item(
        &self,
        identity: &dyn IdentityContext,
        list_id: ListId,
        item_id: ItemId,
        version: i64,
    ) -> ServiceResult<TodoList> {
        let user_id = identity.current_user_id()?;
        let (mut list, _) = self
            .gate
            .resolve(list_id, user_id, AccessNeed::read().items().shares().edit())
            .await?;

        let item = list
            .find_item(item_id)
            .cloned()
            .ok_or_else(|| ServiceError::not_found("The todo item cannot be found"))?;
        ensure_version(&list, version)?;

        // The record goes first; the store's version check is the one that counts
        list.version = self
            .store
            .delete_item(list_id, item_id, version)
            .await
            .map_err(ServiceError::store("delete_item", list_id, user_id))?;
        list.items.retain(|i| i.id != item_id);

        if let Some(url) = &item.media_url {
            if let Err(e) = self.media.delete(url).await {
                tracing::warn!(%list_id, %item_id, "Failed to remove media {}: {}", url, e);
            }
        }

        tracing::info!(%list_id, %item_id, %user_id, version = list.version, "Deleted todo item");
        self.events
            .dispatch(TodoEvent::group(Operation::DeleteItem, list_id, &item));
        Ok(list)
    }

    /// Grant another user access. Owner only; one share per user.
    pub async fn share_list(
        &self,
        identity: &dyn IdentityContext,
        list_id: ListId,
        request: ShareRequest,
    ) -> ServiceResult<TodoList> {
        let user_id = identity.current_user_id()?;
        let (mut list, _) = self
            .gate
            .resolve(list_id, user_id, AccessNeed::read().shares().owner())
            .await?;

        let target = self.target_user(request.user_id, list_id, user_id).await?;
        if list.is_owner(target) {
            return Err(ServiceError::bad_request("A list cannot be shared with its owner"));
        }
        let already_shared = || ServiceError::bad_request(format!("List already shared with user {}", target));
        if list.share_for(target).is_some() {
            return Err(already_shared());
        }

        let share = TodoListShare::new(list_id, target, request.permission);
        self.store.insert_share(&share).await.map_err(|err| match err {
            // Lost a race with a concurrent share of the same pair
            StoreError::Duplicate(_) => already_shared(),
            other => ServiceError::from_store(other, "share_list", Some(list_id), Some(user_id)),
        })?;
        list.shares.push(share);

        tracing::info!(%list_id, %user_id, shared_with = %target, permission = request.permission.as_str(), "Shared todo list");
        self.events
            .dispatch(TodoEvent::user(Operation::ShareList, target, &list));
        Ok(list)
    }

    /// Revoke a user's share. Owner only.
    pub async fn unshare_list(
        &self,
        identity: &dyn IdentityContext,
        list_id: ListId,
        target_user_id: Option<UserId>,
    ) -> ServiceResult<TodoList> {
        let user_id = identity.current_user_id()?;
        let (mut list, _) = self
            .gate
            .resolve(list_id, user_id, AccessNeed::read().shares().owner())
            .await?;

        let target = self.target_user(target_user_id, list_id, user_id).await?;
        let share_id = list
            .share_for(target)
            .map(|share| share.id)
            .ok_or_else(|| ServiceError::not_found("User is not shared with this list"))?;

        self.store
            .delete_share(share_id)
            .await
            .map_err(ServiceError::store("unshare_list", list_id, user_id))?;
        list.shares.retain(|share| share.id != share_id);

        tracing::info!(%list_id, %user_id, unshared = %target, "Unshared todo list");
        self.events
            .dispatch(TodoEvent::user(Operation::UnshareList, target, &list));
        Ok(list)
    }

    /// Lists the acting user owns or has been shared
    pub async fn lists_for_user(&self, identity: &dyn IdentityContext) -> ServiceResult<Vec<TodoList>> {
        let user_id = identity.current_user_id()?;
        self.store
            .lists_for_user(user_id)
            .await
            .map_err(|err| ServiceError::from_store(err, "list_todo_lists", None, Some(user_id)))
    }

    pub async fn filter_items(
        &self,
        identity: &dyn IdentityContext,
        list_id: ListId,
        attribute: AttributeType,
        key: Option<&str>,
    ) -> ServiceResult<TodoList> {
        self.query_items(identity, list_id, Filter::new().filter(FilterSpec::new(attribute, key)))
            .await
    }

    pub async fn sort_items(
        &self,
        identity: &dyn IdentityContext,
        list_id: ListId,
        attribute: AttributeType,
        direction: Option<SortDirection>,
    ) -> ServiceResult<TodoList> {
        self.query_items(identity, list_id, Filter::new().sort(SortSpec::new(attribute, direction)))
            .await
    }

    pub async fn filter_then_sort(
        &self,
        identity: &dyn IdentityContext,
        list_id: ListId,
        filter: FilterSpec,
        sort: SortSpec,
    ) -> ServiceResult<TodoList> {
        self.query_items(identity, list_id, Filter::new().filter(filter).sort(sort))
            .await
    }

    /// Read-only view of the list whose items went through `filter`
    pub async fn query_items(&self, identity: &dyn IdentityContext, list_id: ListId, filter: Filter) -> ServiceResult<TodoList> {
        let user_id = identity.current_user_id()?;
        let (mut list, _) = self
            .gate
            .resolve(list_id, user_id, AccessNeed::read().items())
            .await?;

        let items = std::mem::take(&mut list.items);
        list.items = filter.apply(items)?;
        tracing::debug!(%list_id, %user_id, ?filter, matched = list.items.len(), "Queried todo items");
        Ok(list)
    }

    async fn target_user(&self, target: Option<UserId>, list_id: ListId, user_id: UserId) -> ServiceResult<UserId> {
        let target = target
            .filter(|id| !id.is_nil())
            .ok_or_else(|| ServiceError::bad_request("User ID is required"))?;
        self.store
            .find_user(target)
            .await
            .map_err(ServiceError::store("find_user", list_id, user_id))?
            .map(|user| user.id)
            .ok_or_else(|| ServiceError::not_found("User not found"))
    }

    fn notify_group(&self, operation: Operation, list: &TodoList) {
        self.events.dispatch(TodoEvent::group(operation, list.id, list));
    }
}

fn ensure_version(list: &TodoList, observed: i64) -> ServiceResult<()> {
    if list.version != observed {
        return Err(ServiceError::conflict(format!(
            "The list was modified concurrently (expected version {}, current version {})",
            observed, list.version
        )));
    }
    Ok(())
}

fn media_failure(err: MediaError, operation: Operation, list_id: ListId, user_id: UserId) -> ServiceError {
    tracing::error!(operation = operation.as_str(), %list_id, %user_id, "Media failure: {}", err);
    ServiceError::unknown(format!("Failed to {}", operation.as_str().replace('_', " ")))
}
