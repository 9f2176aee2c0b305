// handlers/mod.rs - HTTP surface
//
// Public (no identity needed) → Protected (identity resolved by the JWT middleware;
// the service layer rejects anonymous callers with 401)

pub mod protected;
pub mod public;

use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    http::HeaderValue,
    middleware,
    routing::{get, post},
    Router,
};
use sqlx::PgPool;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::config::config;
use crate::database::TodoStore;
use crate::media::MediaStore;
use crate::middleware::jwt_auth_middleware;
use crate::observer::EventDispatcher;
use crate::services::{TodoService, UserService};

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub todos: TodoService,
    pub users: UserService,
    pub jwt_secret: Arc<str>,
    /// Present when running on Postgres; checked by `/health`
    pub pool: Option<PgPool>,
}

impl AppState {
    pub fn new(
        store: Arc<dyn TodoStore>,
        media: Arc<dyn MediaStore>,
        events: EventDispatcher,
        jwt_secret: &str,
        pool: Option<PgPool>,
    ) -> Self {
        Self {
            todos: TodoService::new(store.clone(), media, events),
            users: UserService::new(store),
            jwt_secret: Arc::from(jwt_secret),
            pool,
        }
    }
}

/// Full application router
pub fn app(state: AppState) -> Router {
    let api_config = &config().api;

    let router = Router::new()
        // Public
        .route("/health", get(public::health))
        .route("/api/users/register", post(public::user_register))
        // Protected
        .route("/api/users/:user_id", get(protected::user_get))
        .route("/api/todo/lists", get(protected::lists_get))
        .route("/api/todo/list", post(protected::list_post))
        .route(
            "/api/todo/list/:list_id",
            get(protected::list_get)
                .put(protected::list_put)
                .delete(protected::list_delete),
        )
        .route("/api/todo/list/:list_id/items", get(protected::items_get))
        .route("/api/todo/item/:list_id", post(protected::item_post))
        .route("/api/todo/item/:list_id/:item_id", axum::routing::delete(protected::item_delete))
        .route("/api/todo/share/:list_id", post(protected::share_post))
        .route("/api/todo/unshare/:list_id", post(protected::unshare_post))
        .layer(
            ServiceBuilder::new()
                .layer(cors_layer())
                .layer(DefaultBodyLimit::max(api_config.max_request_size_bytes))
                .layer(middleware::from_fn_with_state(state.clone(), jwt_auth_middleware)),
        )
        .with_state(state);

    if api_config.enable_request_logging {
        router.layer(TraceLayer::new_for_http())
    } else {
        router
    }
}

fn cors_layer() -> CorsLayer {
    let security = &config().security;
    if !security.enable_cors {
        return CorsLayer::new();
    }
    let origins: Vec<HeaderValue> = security
        .cors_origins
        .iter()
        .filter_map(|origin| HeaderValue::from_str(origin).ok())
        .collect();
    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(tower_http::cors::Any)
        .allow_headers(tower_http::cors::Any)
}
