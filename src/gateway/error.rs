use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::auth::AuthError;
use crate::money::MoneyError;
use crate::orders::OrderError;

/// Maps domain error kinds to the literal status codes spec.md's HTTP table
/// requires. Callers never match on message text.
pub struct ApiError(pub StatusCode);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        self.0.into_response()
    }
}

impl From<AuthError> for ApiError {
    fn from(e: AuthError) -> Self {
        let status = match e {
            AuthError::LoginTaken => StatusCode::CONFLICT,
            AuthError::BadCredentials | AuthError::TokenInvalid => StatusCode::UNAUTHORIZED,
            AuthError::Hash(_) | AuthError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        ApiError(status)
    }
}

impl From<OrderError> for ApiError {
    fn from(e: OrderError) -> Self {
        let status = match e {
            OrderError::BadOrderId => StatusCode::UNPROCESSABLE_ENTITY,
            OrderError::ConflictAnotherUser => StatusCode::CONFLICT,
            OrderError::NotFound => StatusCode::NOT_FOUND,
            OrderError::Money(_) | OrderError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        ApiError(status)
    }
}

impl From<MoneyError> for ApiError {
    fn from(e: MoneyError) -> Self {
        let status = match e {
            MoneyError::BadOrderId => StatusCode::UNPROCESSABLE_ENTITY,
            MoneyError::BadAmount => StatusCode::BAD_REQUEST,
            MoneyError::Unauthenticated => StatusCode::UNAUTHORIZED,
            MoneyError::InsufficientFunds => StatusCode::PAYMENT_REQUIRED,
            MoneyError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        ApiError(status)
    }
}
