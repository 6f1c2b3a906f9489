use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::{Extension, Json};
use std::sync::Arc;

use crate::gateway::error::ApiError;
use crate::gateway::state::AppState;
use crate::gateway::types::OrderView;
use crate::orders::InsertOutcome;
use crate::store::UserId;

pub async fn submit_order(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<UserId>,
    body: String,
) -> Result<Response, ApiError> {
    let order_id = body.trim().to_string();
    match state.orders.insert_order(user_id, &order_id).await? {
        InsertOutcome::Created => Ok(StatusCode::ACCEPTED.into_response()),
        InsertOutcome::AlreadyOwnedBySameUser => Ok(StatusCode::OK.into_response()),
    }
}

pub async fn list_orders(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<UserId>,
) -> Result<Response, ApiError> {
    let orders = state.orders.list_user_orders(user_id).await?;
    if orders.is_empty() {
        return Ok(StatusCode::NO_CONTENT.into_response());
    }
    let views: Vec<OrderView> = orders.into_iter().map(OrderView::from).collect();
    Ok(Json(views).into_response())
}
