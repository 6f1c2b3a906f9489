//! Wire DTOs for the HTTP gateway: the bit-exact shapes spec.md's scenarios
//! assert against, not an `ApiResponse<T>` envelope.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::store::{Order, OrderStatus, Withdrawal};

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub login: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub login: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct OrderView {
    pub number: String,
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accrual: Option<Decimal>,
    pub uploaded_at: String,
}

impl From<Order> for OrderView {
    fn from(order: Order) -> Self {
        Self {
            number: order.id,
            status: order.status.as_str(),
            accrual: match order.status {
                OrderStatus::Processed => order.accrual,
                _ => None,
            },
            uploaded_at: order.created_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct BalanceView {
    pub current: Decimal,
    pub withdrawn: Decimal,
}

#[derive(Debug, Deserialize)]
pub struct WithdrawRequestBody {
    pub order: String,
    pub sum: Decimal,
}

#[derive(Debug, Serialize)]
pub struct WithdrawalView {
    pub order: String,
    pub sum: Decimal,
    pub processed_at: String,
}

impl From<Withdrawal> for WithdrawalView {
    fn from(w: Withdrawal) -> Self {
        Self {
            order: w.order_id,
            sum: w.sum,
            processed_at: w.created_at.to_rfc3339(),
        }
    }
}
