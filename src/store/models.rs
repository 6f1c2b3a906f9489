use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

pub type UserId = Uuid;

#[derive(Debug, Clone)]
pub struct User {
    pub id: UserId,
    pub login: String,
    pub password_hash: String,
}

/// Closed tagged set of order states. The external accrual calculator's
/// `REGISTERED` is mapped onto `New` at the decoding boundary, never carried
/// past it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderStatus {
    New,
    Processing,
    Invalid,
    Processed,
}

impl OrderStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, OrderStatus::Invalid | OrderStatus::Processed)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            OrderStatus::New => "NEW",
            OrderStatus::Processing => "PROCESSING",
            OrderStatus::Invalid => "INVALID",
            OrderStatus::Processed => "PROCESSED",
        }
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "NEW" => Ok(OrderStatus::New),
            "PROCESSING" => Ok(OrderStatus::Processing),
            "INVALID" => Ok(OrderStatus::Invalid),
            "PROCESSED" => Ok(OrderStatus::Processed),
            other => Err(format!("unknown order status {other}")),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Order {
    pub id: String,
    pub user_id: UserId,
    pub status: OrderStatus,
    pub accrual: Option<Decimal>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The fields C3's `apply_update` writes, as produced by C6.
#[derive(Debug, Clone)]
pub struct OrderUpdate {
    pub order_id: String,
    pub status: OrderStatus,
    pub accrual: Option<Decimal>,
}

#[derive(Debug, Clone)]
pub struct Balance {
    pub user_id: UserId,
    pub current: Decimal,
    pub withdrawn: Decimal,
    pub updated_at: DateTime<Utc>,
}

impl Balance {
    pub fn zero(user_id: UserId) -> Self {
        Self {
            user_id,
            current: Decimal::ZERO,
            withdrawn: Decimal::ZERO,
            updated_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Withdrawal {
    pub id: Uuid,
    pub user_id: UserId,
    pub order_id: String,
    pub sum: Decimal,
    pub created_at: DateTime<Utc>,
}
