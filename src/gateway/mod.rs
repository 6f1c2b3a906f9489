pub mod error;
pub mod handlers;
pub mod state;
pub mod types;

use axum::middleware::from_fn_with_state;
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;

pub use state::AppState;

pub fn router(state: Arc<AppState>) -> Router {
    let public = Router::new()
        .route("/api/user/register", post(handlers::user::register))
        .route("/api/user/login", post(handlers::user::login))
        .route("/api/v1/health", get(handlers::health::health_check));

    let private = Router::new()
        .route(
            "/api/user/orders",
            post(handlers::orders::submit_order).get(handlers::orders::list_orders),
        )
        .route("/api/user/balance", get(handlers::balance::get_balance))
        .route(
            "/api/user/balance/withdraw",
            post(handlers::balance::withdraw),
        )
        .route(
            "/api/user/withdrawals",
            get(handlers::balance::list_withdrawals),
        )
        .layer(from_fn_with_state(
            state.clone(),
            crate::auth::middleware::require_auth,
        ));

    public.merge(private).with_state(state)
}
