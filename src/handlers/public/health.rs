use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::database::DatabaseManager;
use crate::error::ApiError;
use crate::handlers::AppState;

/// GET /health - liveness plus database reachability when one is configured
pub async fn health(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let now = chrono::Utc::now();

    let database = match &state.pool {
        None => "memory",
        Some(pool) => {
            DatabaseManager::health_check(pool).await.map_err(|e| {
                tracing::warn!("Health check failed: {}", e);
                ApiError::service_unavailable("Database unavailable")
            })?;
            "ok"
        }
    };

    Ok(Json(json!({ "success": true, "data": { "status": "ok", "timestamp": now, "database": database } })))
}
