use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};

use crate::auth::{verify_token, AuthUser, RequestIdentity};
use crate::handlers::AppState;

/// Attaches a [`RequestIdentity`] to every request.
///
/// Requests without a usable bearer token continue as anonymous; whether that is
/// acceptable is decided by the service layer, which answers `Unauthorized`.
pub async fn jwt_auth_middleware(State(state): State<AppState>, mut request: Request, next: Next) -> Response {
    let identity = match extract_jwt_from_headers(request.headers()) {
        Ok(token) => match verify_token(&token, &state.jwt_secret) {
            Ok(claims) => RequestIdentity(Some(AuthUser::from(claims))),
            Err(e) => {
                tracing::debug!("Rejected bearer token: {}", e);
                RequestIdentity::anonymous()
            }
        },
        Err(reason) => {
            tracing::trace!("No identity: {}", reason);
            RequestIdentity::anonymous()
        }
    };

    request.extensions_mut().insert(identity);
    next.run(request).await
}

/// Extract JWT token from Authorization header
fn extract_jwt_from_headers(headers: &HeaderMap) -> Result<String, &'static str> {
    let auth_header = headers
        .get("authorization")
        .ok_or("Missing Authorization header")?;

    let auth_str = auth_header
        .to_str()
        .map_err(|_| "Invalid Authorization header format")?;

    match auth_str.strip_prefix("Bearer ") {
        Some(token) if !token.trim().is_empty() => Ok(token.trim().to_string()),
        Some(_) => Err("Empty JWT token"),
        None => Err("Authorization header must use Bearer token format"),
    }
}
