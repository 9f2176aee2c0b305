use axum::extract::{Path, State};
use axum::{Extension, Json};
use uuid::Uuid;

use crate::auth::RequestIdentity;
use crate::database::models::TodoList;
use crate::handlers::AppState;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::{ListUpdate, NewList};

/// GET /api/todo/lists - lists owned by or shared with the caller
pub async fn lists_get(
    State(state): State<AppState>,
    Extension(identity): Extension<RequestIdentity>,
) -> ApiResult<Vec<TodoList>> {
    Ok(ApiResponse::success(state.todos.lists_for_user(&identity).await?))
}

/// POST /api/todo/list
pub async fn list_post(
    State(state): State<AppState>,
    Extension(identity): Extension<RequestIdentity>,
    Json(request): Json<NewList>,
) -> ApiResult<TodoList> {
    Ok(ApiResponse::created(state.todos.create_list(&identity, request).await?))
}

/// GET /api/todo/list/:list_id
pub async fn list_get(
    State(state): State<AppState>,
    Extension(identity): Extension<RequestIdentity>,
    Path(list_id): Path<Uuid>,
) -> ApiResult<TodoList> {
    Ok(ApiResponse::success(state.todos.get_list(&identity, list_id).await?))
}

/// PUT /api/todo/list/:list_id
pub async fn list_put(
    State(state): State<AppState>,
    Extension(identity): Extension<RequestIdentity>,
    Path(list_id): Path<Uuid>,
    Json(update): Json<ListUpdate>,
) -> ApiResult<TodoList> {
    Ok(ApiResponse::success(state.todos.update_list(&identity, list_id, update).await?))
}

/// DELETE /api/todo/list/:list_id - returns the deleted list
pub async fn list_delete(
    State(state): State<AppState>,
    Extension(identity): Extension<RequestIdentity>,
    Path(list_id): Path<Uuid>,
) -> ApiResult<TodoList> {
    Ok(ApiResponse::success(state.todos.delete_list(&identity, list_id).await?))
}
