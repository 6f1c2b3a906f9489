use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use std::sync::Arc;

use crate::gateway::error::ApiError;
use crate::gateway::state::AppState;
use crate::gateway::types::{LoginRequest, RegisterRequest};

pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(body): Json<RegisterRequest>,
) -> Result<Response, ApiError> {
    let user_id = state.auth.register(&body.login, &body.password).await?;
    let token = state
        .auth
        .issue_token(user_id)
        .map_err(ApiError::from)?;

    Ok((
        StatusCode::OK,
        [(header::AUTHORIZATION, token)],
    )
        .into_response())
}

pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(body): Json<LoginRequest>,
) -> Result<Response, ApiError> {
    let (_user_id, token) = state.auth.login(&body.login, &body.password).await?;

    Ok((
        StatusCode::OK,
        [(header::AUTHORIZATION, token)],
    )
        .into_response())
}
