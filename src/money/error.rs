use crate::store::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MoneyError {
    #[error("order id fails Luhn validation")]
    BadOrderId,

    #[error("amount must be positive")]
    BadAmount,

    #[error("request is not authenticated")]
    Unauthenticated,

    #[error("insufficient funds")]
    InsufficientFunds,

    #[error(transparent)]
    Store(#[from] StoreError),
}
