use crate::money::MoneyError;
use crate::store::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum OrderError {
    #[error("order id fails Luhn validation")]
    BadOrderId,

    #[error("order already claimed by another user")]
    ConflictAnotherUser,

    #[error("order not found")]
    NotFound,

    #[error(transparent)]
    Money(#[from] MoneyError),

    #[error(transparent)]
    Store(#[from] StoreError),
}
