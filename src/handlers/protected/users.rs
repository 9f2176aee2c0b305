use axum::extract::{Path, State};
use axum::Extension;
use uuid::Uuid;

use crate::auth::{IdentityContext, RequestIdentity};
use crate::database::models::User;
use crate::handlers::AppState;
use crate::middleware::{ApiResponse, ApiResult};

/// GET /api/users/:user_id
pub async fn user_get(
    State(state): State<AppState>,
    Extension(identity): Extension<RequestIdentity>,
    Path(user_id): Path<Uuid>,
) -> ApiResult<User> {
    identity.current_user_id()?;
    Ok(ApiResponse::success(state.users.get_by_id(user_id).await?))
}
