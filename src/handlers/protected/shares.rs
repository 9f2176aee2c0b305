use axum::extract::{Path, State};
use axum::{Extension, Json};
use uuid::Uuid;

use crate::auth::RequestIdentity;
use crate::database::models::TodoList;
use crate::handlers::AppState;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::ShareRequest;

/// POST /api/todo/share/:list_id
pub async fn share_post(
    State(state): State<AppState>,
    Extension(identity): Extension<RequestIdentity>,
    Path(list_id): Path<Uuid>,
    Json(request): Json<ShareRequest>,
) -> ApiResult<TodoList> {
    Ok(ApiResponse::success(state.todos.share_list(&identity, list_id, request).await?))
}

/// POST /api/todo/unshare/:list_id - permission in the body is ignored
pub async fn unshare_post(
    State(state): State<AppState>,
    Extension(identity): Extension<RequestIdentity>,
    Path(list_id): Path<Uuid>,
    Json(request): Json<ShareRequest>,
) -> ApiResult<TodoList> {
    Ok(ApiResponse::success(
        state.todos.unshare_list(&identity, list_id, request.user_id).await?,
    ))
}
