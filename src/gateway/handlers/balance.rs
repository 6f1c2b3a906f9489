use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::{Extension, Json};
use std::sync::Arc;
use uuid::Uuid;

use crate::gateway::error::ApiError;
use crate::gateway::state::AppState;
use crate::gateway::types::{BalanceView, WithdrawRequestBody, WithdrawalView};
use crate::money::WithdrawRequest;
use crate::store::UserId;

pub async fn get_balance(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<UserId>,
) -> Result<Response, ApiError> {
    let balance = state.money.get_balance(user_id).await?;
    Ok(Json(BalanceView {
        current: balance.current,
        withdrawn: balance.withdrawn,
    })
    .into_response())
}

pub async fn withdraw(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<UserId>,
    headers: HeaderMap,
    Json(body): Json<WithdrawRequestBody>,
) -> Result<Response, ApiError> {
    let idempotency_key = match headers.get("Idempotency-Key") {
        Some(value) => {
            let value = value.to_str().map_err(|_| ApiError(StatusCode::BAD_REQUEST))?;
            Some(Uuid::parse_str(value).map_err(|_| ApiError(StatusCode::BAD_REQUEST))?)
        }
        None => None,
    };

    state
        .money
        .withdraw(WithdrawRequest {
            user_id: Some(user_id),
            order_id: body.order,
            sum: body.sum,
            id: idempotency_key,
        })
        .await?;

    Ok(StatusCode::OK.into_response())
}

pub async fn list_withdrawals(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<UserId>,
) -> Result<Response, ApiError> {
    let withdrawals = state.money.get_withdrawals(user_id).await?;
    if withdrawals.is_empty() {
        return Ok(StatusCode::NO_CONTENT.into_response());
    }
    let views: Vec<WithdrawalView> = withdrawals.into_iter().map(WithdrawalView::from).collect();
    Ok(Json(views).into_response())
}
