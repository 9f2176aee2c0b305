use axum::extract::{Multipart, Path, Query, State};
use axum::Extension;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::Deserialize;
use uuid::Uuid;

use crate::auth::RequestIdentity;
use crate::database::models::{PriorityType, StatusType, TodoList};
use crate::error::ApiError;
use crate::filter::{AttributeType, Filter, FilterError, FilterSpec, SortDirection, SortSpec};
use crate::handlers::AppState;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::{MediaUpload, NewItem, ServiceError};

#[derive(Debug, Default, Deserialize)]
pub struct ItemQuery {
    /// Attribute to filter on
    pub filter: Option<String>,
    /// Raw filter value
    pub key: Option<String>,
    /// Attribute to sort by
    pub sort: Option<String>,
    pub order: Option<String>,
}

impl ItemQuery {
    fn into_filter(self) -> Result<Filter, FilterError> {
        let mut filter = Filter::new();
        if let Some(attribute) = self.filter.as_deref() {
            filter = filter.filter(FilterSpec::new(attribute.parse()?, self.key.as_deref()));
        }
        if let Some(attribute) = self.sort.as_deref() {
            let direction = self.order.as_deref().map(str::parse::<SortDirection>).transpose()?;
            filter = filter.sort(SortSpec::new(attribute.parse::<AttributeType>()?, direction));
        }
        Ok(filter)
    }
}

/// GET /api/todo/list/:list_id/items?filter=&key=&sort=&order=
pub async fn items_get(
    State(state): State<AppState>,
    Extension(identity): Extension<RequestIdentity>,
    Path(list_id): Path<Uuid>,
    Query(query): Query<ItemQuery>,
) -> ApiResult<TodoList> {
    let filter = query.into_filter().map_err(ServiceError::from)?;
    Ok(ApiResponse::success(state.todos.query_items(&identity, list_id, filter).await?))
}

/// POST /api/todo/item/:list_id - multipart form, `media` is an optional file part
pub async fn item_post(
    State(state): State<AppState>,
    Extension(identity): Extension<RequestIdentity>,
    Path(list_id): Path<Uuid>,
    multipart: Multipart,
) -> ApiResult<TodoList> {
    let request = read_item_form(multipart).await?;
    Ok(ApiResponse::created(state.todos.add_item(&identity, list_id, request).await?))
}

#[derive(Debug, Deserialize)]
pub struct VersionQuery {
    pub version: i64,
}

/// DELETE /api/todo/item/:list_id/:item_id?version=
pub async fn item_delete(
    State(state): State<AppState>,
    Extension(identity): Extension<RequestIdentity>,
    Path((list_id, item_id)): Path<(Uuid, Uuid)>,
    Query(query): Query<VersionQuery>,
) -> ApiResult<TodoList> {
    Ok(ApiResponse::success(
        state.todos.delete_item(&identity, list_id, item_id, query.version).await?,
    ))
}

async fn read_item_form(mut multipart: Multipart) -> Result<NewItem, ApiError> {
    let mut item = NewItem::default();
    let mut version = None;

    while let Some(field) = multipart.next_field().await? {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };

        if name == "media" {
            let file_name = field.file_name().unwrap_or_default().to_string();
            let bytes = field.bytes().await?;
            // Browsers send an empty part when no file was picked
            if !bytes.is_empty() {
                item.media = Some(MediaUpload {
                    file_name,
                    bytes: bytes.to_vec(),
                });
            }
            continue;
        }

        let value = field.text().await?;
        let value = value.trim();
        if value.is_empty() {
            continue;
        }
        match name.as_str() {
            "name" => item.name = Some(value.to_string()),
            "description" => item.description = Some(value.to_string()),
            "due_date" | "dueDate" => {
                item.due_date =
                    Some(parse_due_date(value).ok_or_else(|| ApiError::bad_request(format!("Invalid due date: {}", value)))?)
            }
            "status" => {
                item.status =
                    Some(StatusType::from_raw(value).ok_or_else(|| ApiError::bad_request(format!("Invalid status: {}", value)))?)
            }
            "priority" => {
                item.priority = Some(
                    PriorityType::from_raw(value).ok_or_else(|| ApiError::bad_request(format!("Invalid priority: {}", value)))?,
                )
            }
            "version" => {
                version = Some(
                    value
                        .parse::<i64>()
                        .map_err(|_| ApiError::bad_request(format!("Invalid version: {}", value)))?,
                )
            }
            other => tracing::debug!("Ignoring unknown form field {}", other),
        }
    }

    item.version = version.ok_or_else(|| ApiError::bad_request("List version is required"))?;
    Ok(item)
}

/// RFC 3339, naive timestamps (taken as UTC) or a bare date at midnight UTC
fn parse_due_date(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    if let Ok(ts) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S") {
        return Some(ts.and_utc());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|ts| ts.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_builds_filter_and_sort() {
        let query = ItemQuery {
            filter: Some("priority".into()),
            key: Some("High".into()),
            sort: Some("due_date".into()),
            order: Some("DESC".into()),
        };
        assert!(!query.into_filter().unwrap().is_empty());
        assert!(ItemQuery::default().into_filter().unwrap().is_empty());
    }

    #[test]
    fn query_rejects_unknown_attributes() {
        let query = ItemQuery {
            sort: Some("colour".into()),
            ..ItemQuery::default()
        };
        assert_eq!(
            query.into_filter().unwrap_err(),
            FilterError::UnsupportedAttribute("colour".to_string())
        );
    }

    #[test]
    fn due_dates_accept_common_shapes() {
        assert!(parse_due_date("2025-05-22T16:45:00Z").is_some());
        assert!(parse_due_date("2025-05-22T16:45:00").is_some());
        assert_eq!(parse_due_date("2025-05-22").unwrap().to_rfc3339(), "2025-05-22T00:00:00+00:00");
        assert!(parse_due_date("tomorrow").is_none());
    }
}
