//! In-process test double for [`super::Store`], mirroring the same contract
//! the Postgres implementation satisfies. Mutations are serialized by a
//! single internal lock, so the transaction handle it hands back is always
//! [`super::Tx::Noop`]: there is nothing to commit or roll back.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::Mutex;
use uuid::Uuid;

use super::{Balance, Order, OrderUpdate, Store, StoreError, Tx, User, UserId, Withdrawal};

#[derive(Default)]
struct Inner {
    users_by_id: HashMap<UserId, User>,
    users_by_login: HashMap<String, UserId>,
    orders: HashMap<String, Order>,
    balances: HashMap<UserId, Balance>,
    withdrawals: HashMap<Uuid, Withdrawal>,
}

#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn begin_tx(&self) -> Result<Tx, StoreError> {
        Ok(Tx::Noop)
    }

    async fn get_user_by_login(&self, login: &str) -> Result<Option<User>, StoreError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .users_by_login
            .get(login)
            .and_then(|id| inner.users_by_id.get(id))
            .cloned())
    }

    async fn insert_user(&self, login: &str, password_hash: &str) -> Result<User, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        let user = User {
            id: Uuid::new_v4(),
            login: login.to_string(),
            password_hash: password_hash.to_string(),
        };
        inner.users_by_login.insert(login.to_string(), user.id);
        inner.users_by_id.insert(user.id, user.clone());
        Ok(user)
    }

    async fn get_order_owner(&self, order_id: &str) -> Result<Option<UserId>, StoreError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.orders.get(order_id).map(|o| o.user_id))
    }

    async fn insert_order(&self, user_id: UserId, order_id: &str) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().unwrap();
        let now = Utc::now();
        inner.orders.insert(
            order_id.to_string(),
            Order {
                id: order_id.to_string(),
                user_id,
                status: super::OrderStatus::New,
                accrual: None,
                created_at: now,
                updated_at: now,
            },
        );
        Ok(())
    }

    async fn update_order(
        &self,
        _tx: &mut Tx,
        update: &OrderUpdate,
    ) -> Result<Option<UserId>, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        match inner.orders.get_mut(&update.order_id) {
            Some(order) => {
                order.status = update.status;
                order.accrual = update.accrual;
                order.updated_at = Utc::now();
                Ok(Some(order.user_id))
            }
            None => Ok(None),
        }
    }

    async fn list_orders_by_user(&self, user_id: UserId) -> Result<Vec<Order>, StoreError> {
        let inner = self.inner.lock().unwrap();
        let mut orders: Vec<Order> = inner
            .orders
            .values()
            .filter(|o| o.user_id == user_id)
            .cloned()
            .collect();
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(orders)
    }

    async fn list_waiting_orders(
        &self,
        limit: i64,
        before: Option<DateTime<Utc>>,
    ) -> Result<Vec<Order>, StoreError> {
        let inner = self.inner.lock().unwrap();
        let mut orders: Vec<Order> = inner
            .orders
            .values()
            .filter(|o| !o.status.is_terminal())
            .filter(|o| before.is_none_or(|cursor| o.created_at < cursor))
            .cloned()
            .collect();
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        orders.truncate(limit.max(0) as usize);
        Ok(orders)
    }

    async fn get_balance(&self, user_id: UserId) -> Result<Balance, StoreError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .balances
            .get(&user_id)
            .cloned()
            .unwrap_or_else(|| Balance::zero(user_id)))
    }

    async fn add_balance(
        &self,
        _tx: &mut Tx,
        user_id: UserId,
        amount: Decimal,
    ) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().unwrap();
        let balance = inner
            .balances
            .entry(user_id)
            .or_insert_with(|| Balance::zero(user_id));
        balance.current += amount;
        balance.updated_at = Utc::now();
        Ok(())
    }

    async fn reduce_balance(
        &self,
        _tx: &mut Tx,
        user_id: UserId,
        amount: Decimal,
    ) -> Result<bool, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        let balance = inner
            .balances
            .entry(user_id)
            .or_insert_with(|| Balance::zero(user_id));
        if balance.current < amount {
            return Ok(false);
        }
        balance.current -= amount;
        balance.withdrawn += amount;
        balance.updated_at = Utc::now();
        Ok(true)
    }

    async fn get_withdrawal(&self, id: Uuid) -> Result<Option<Withdrawal>, StoreError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.withdrawals.get(&id).cloned())
    }

    async fn list_withdrawals_by_user(&self, user_id: UserId) -> Result<Vec<Withdrawal>, StoreError> {
        let inner = self.inner.lock().unwrap();
        let mut withdrawals: Vec<Withdrawal> = inner
            .withdrawals
            .values()
            .filter(|w| w.user_id == user_id)
            .cloned()
            .collect();
        withdrawals.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(withdrawals)
    }

    async fn insert_withdrawal(&self, _tx: &mut Tx, withdrawal: &Withdrawal) -> Result<bool, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        if inner.withdrawals.contains_key(&withdrawal.id) {
            return Ok(false);
        }
        inner.withdrawals.insert(withdrawal.id, withdrawal.clone());
        Ok(true)
    }
}
