use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

use crate::gateway::state::AppState;
use crate::store::UserId;

/// Resolves the bearer token in `Authorization` to a user id and injects it
/// into the request extensions, standing in for the `X-User-Id` header the
/// surrounding handler layer would otherwise forward.
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, StatusCode> {
    let token = request
        .headers()
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.strip_prefix("Bearer ").unwrap_or(v))
        .ok_or(StatusCode::UNAUTHORIZED)?;

    let user_id: UserId = state
        .auth
        .verify(token)
        .map_err(|_| StatusCode::UNAUTHORIZED)?;

    request.extensions_mut().insert(user_id);
    Ok(next.run(request).await)
}
