use axum::{extract::State, Json};
use serde::Deserialize;

use crate::database::models::User;
use crate::handlers::AppState;
use crate::middleware::{ApiResponse, ApiResult};

#[derive(Debug, Deserialize)]
pub struct RegistrationRequest {
    #[serde(alias = "displayName")]
    pub display_name: String,
}

/// POST /api/users/register
pub async fn user_register(State(state): State<AppState>, Json(request): Json<RegistrationRequest>) -> ApiResult<User> {
    let user = state.users.register(&request.display_name).await?;
    Ok(ApiResponse::created(user))
}
