//! Transactional storage contract (C1).
//!
//! [`Store`] is implemented by [`postgres::PgStore`] for production use and by
//! [`memory::MemoryStore`] as an in-process test double exercising the same
//! contract. Every write operation that must share atomicity with another
//! write takes an explicit `&mut Tx`. There is no ambient transaction.

pub mod error;
pub mod memory;
pub mod models;
pub mod postgres;

pub use error::StoreError;
pub use models::{Balance, Order, OrderStatus, OrderUpdate, User, UserId, Withdrawal};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

/// A scoped transaction handle spanning possibly-multiple tables.
///
/// `Noop` exists for [`memory::MemoryStore`], whose mutations are already
/// serialized by an internal lock and need no real transaction, mirroring a
/// transaction wrapper that stays inert when there is no database underneath
/// it.
pub enum Tx {
    Postgres(sqlx::Transaction<'static, sqlx::Postgres>),
    Noop,
}

impl Tx {
    pub async fn commit(self) -> Result<(), StoreError> {
        match self {
            Tx::Postgres(tx) => Ok(tx.commit().await?),
            Tx::Noop => Ok(()),
        }
    }

    pub async fn rollback(self) -> Result<(), StoreError> {
        match self {
            Tx::Postgres(tx) => Ok(tx.rollback().await?),
            Tx::Noop => Ok(()),
        }
    }
}

#[async_trait]
pub trait Store: Send + Sync {
    async fn begin_tx(&self) -> Result<Tx, StoreError>;

    async fn get_user_by_login(&self, login: &str) -> Result<Option<User>, StoreError>;
    async fn insert_user(&self, login: &str, password_hash: &str) -> Result<User, StoreError>;

    /// Owning user of `order_id`, or `None` if unclaimed.
    async fn get_order_owner(&self, order_id: &str) -> Result<Option<UserId>, StoreError>;
    async fn insert_order(&self, user_id: UserId, order_id: &str) -> Result<(), StoreError>;
    /// Applies a status/accrual update, returning the owning user id, or
    /// `None` if no such order exists.
    async fn update_order(
        &self,
        tx: &mut Tx,
        update: &OrderUpdate,
    ) -> Result<Option<UserId>, StoreError>;
    async fn list_orders_by_user(&self, user_id: UserId) -> Result<Vec<Order>, StoreError>;
    /// Orders with status NEW/PROCESSING, `created_at < before` (or all, if
    /// `before` is `None`), newest first, capped at `limit`.
    async fn list_waiting_orders(
        &self,
        limit: i64,
        before: Option<DateTime<Utc>>,
    ) -> Result<Vec<Order>, StoreError>;

    /// Never fails with not-found: an absent row reads as a zero balance.
    async fn get_balance(&self, user_id: UserId) -> Result<Balance, StoreError>;
    async fn add_balance(&self, tx: &mut Tx, user_id: UserId, amount: Decimal)
    -> Result<(), StoreError>;
    /// Atomically decrements `current` and increments `withdrawn` by the same
    /// amount, but only if `current >= amount`. Returns `false` (no mutation)
    /// if the balance is insufficient or the row does not exist; the caller
    /// must treat that as `InsufficientFunds`, not as success.
    async fn reduce_balance(
        &self,
        tx: &mut Tx,
        user_id: UserId,
        amount: Decimal,
    ) -> Result<bool, StoreError>;

    async fn get_withdrawal(&self, id: Uuid) -> Result<Option<Withdrawal>, StoreError>;
    async fn list_withdrawals_by_user(&self, user_id: UserId) -> Result<Vec<Withdrawal>, StoreError>;
    /// `ON CONFLICT(id) DO NOTHING` semantics: returns `true` if a new row was
    /// inserted, `false` if `withdrawal.id` already existed (idempotent
    /// replay).
    async fn insert_withdrawal(&self, tx: &mut Tx, withdrawal: &Withdrawal) -> Result<bool, StoreError>;
}
