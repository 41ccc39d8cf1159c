//! services/api/src/web/middleware.rs
//!
//! Authentication middleware for protecting routes, plus the cookie parsing
//! shared with the handlers that merely observe the session (the hybrid note
//! store routes on it instead of requiring it).

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, StatusCode},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use tracing::error;

use crate::web::state::AppState;
use biblia_core::ports::AccountRepository;

/// Extracts the opaque session id from the `session=` cookie, if present.
pub fn session_token_from_headers(headers: &HeaderMap) -> Option<String> {
    let cookie_header = headers.get(header::COOKIE)?.to_str().ok()?;
    cookie_header.split(';').find_map(|c| {
        let c = c.trim();
        c.strip_prefix("session=").map(|token| token.to_string())
    })
}

/// Middleware that validates the auth session cookie and extracts the user_id.
///
/// If valid, inserts the user_id into request extensions for handlers to use.
/// If invalid or missing, returns 401 Unauthorized.
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    // 1. Extract session ID from the cookie header
    let auth_session_id =
        session_token_from_headers(req.headers()).ok_or(StatusCode::UNAUTHORIZED)?;

    // 2. Without a database there are no accounts to be logged into
    let db = state.db.as_ref().ok_or(StatusCode::UNAUTHORIZED)?;

    // 3. Validate auth session in database, get user_id
    let user_id = db
        .validate_auth_session(&auth_session_id)
        .await
        .map_err(|e| {
            error!("Failed to validate auth session: {:?}", e);
            StatusCode::UNAUTHORIZED
        })?;

    // 4. Insert user_id into request extensions
    req.extensions_mut().insert(user_id);

    // 5. Continue to the handler
    Ok(next.run(req).await)
}
