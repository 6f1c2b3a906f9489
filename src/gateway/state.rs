use std::sync::Arc;

use crate::auth::AuthService;
use crate::money::MoneyService;
use crate::orders::OrderService;
use crate::store::Store;

/// Shared, `Arc`-wrapped handle to the store and domain services,
/// constructed once at bootstrap and cloned into every handler.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub auth: Arc<AuthService>,
    pub money: Arc<MoneyService>,
    pub orders: Arc<OrderService>,
}
