//! Order service (C3): attaches orders to users and applies the pipeline's
//! fetched results atomically alongside the balance credit.

pub mod error;

pub use error::OrderError;

use crate::luhn;
use crate::money::MoneyService;
use crate::store::{Order, OrderUpdate, Store, UserId};
use rust_decimal::Decimal;
use std::sync::Arc;

/// Outcome of [`OrderService::insert_order`] when it does not fail.
/// `AlreadyOwnedBySameUser` is not an error: the gateway maps it to HTTP 200
/// instead of 202.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    Created,
    AlreadyOwnedBySameUser,
}

pub struct OrderService {
    store: Arc<dyn Store>,
    money: Arc<MoneyService>,
}

impl OrderService {
    pub fn new(store: Arc<dyn Store>, money: Arc<MoneyService>) -> Self {
        Self { store, money }
    }

    pub async fn insert_order(
        &self,
        user_id: UserId,
        order_id: &str,
    ) -> Result<InsertOutcome, OrderError> {
        if !luhn::is_valid(order_id) {
            return Err(OrderError::BadOrderId);
        }

        match self.store.get_order_owner(order_id).await? {
            Some(owner) if owner == user_id => Ok(InsertOutcome::AlreadyOwnedBySameUser),
            Some(_) => Err(OrderError::ConflictAnotherUser),
            None => {
                self.store.insert_order(user_id, order_id).await?;
                Ok(InsertOutcome::Created)
            }
        }
    }

    pub async fn list_user_orders(&self, user_id: UserId) -> Result<Vec<Order>, OrderError> {
        Ok(self.store.list_orders_by_user(user_id).await?)
    }

    pub async fn list_waiting(
        &self,
        limit: i64,
        before: Option<chrono::DateTime<chrono::Utc>>,
    ) -> Result<Vec<Order>, OrderError> {
        Ok(self.store.list_waiting_orders(limit, before).await?)
    }

    /// The atomic fulfillment step: status/accrual write and balance credit
    /// commit together or not at all. Not safe to replay: callers must
    /// ensure terminal orders are never re-applied (C4's filter).
    pub async fn apply_update(&self, update: OrderUpdate) -> Result<(), OrderError> {
        let mut tx = self.store.begin_tx().await?;

        let owner = match self.store.update_order(&mut tx, &update).await {
            Ok(Some(owner)) => owner,
            Ok(None) => {
                tx.rollback().await?;
                return Err(OrderError::NotFound);
            }
            Err(e) => {
                tx.rollback().await?;
                return Err(e.into());
            }
        };

        let credit = match update.accrual {
            Some(accrual) if accrual > Decimal::ZERO => {
                self.money.add_accrual(&mut tx, owner, accrual).await
            }
            _ => Ok(()),
        };

        match credit {
            Ok(()) => {
                tx.commit().await?;
                Ok(())
            }
            Err(e) => {
                tx.rollback().await?;
                Err(e.into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::MemoryStore;
    use crate::store::OrderStatus;
    use uuid::Uuid;

    fn service() -> OrderService {
        let store: Arc<dyn Store> = Arc::new(MemoryStore::new());
        let money = Arc::new(MoneyService::new(store.clone()));
        OrderService::new(store, money)
    }

    #[tokio::test]
    async fn insert_rejects_bad_luhn() {
        let svc = service();
        let err = svc.insert_order(Uuid::new_v4(), "1111").await.unwrap_err();
        assert!(matches!(err, OrderError::BadOrderId));
    }

    #[tokio::test]
    async fn resubmission_by_same_user_is_not_an_error() {
        let svc = service();
        let alice = Uuid::new_v4();
        assert_eq!(
            svc.insert_order(alice, "1115").await.unwrap(),
            InsertOutcome::Created
        );
        assert_eq!(
            svc.insert_order(alice, "1115").await.unwrap(),
            InsertOutcome::AlreadyOwnedBySameUser
        );
    }

    #[tokio::test]
    async fn resubmission_by_another_user_conflicts() {
        let svc = service();
        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();
        svc.insert_order(alice, "1115").await.unwrap();
        let err = svc.insert_order(bob, "1115").await.unwrap_err();
        assert!(matches!(err, OrderError::ConflictAnotherUser));
    }

    #[tokio::test]
    async fn apply_update_credits_balance_exactly_once() {
        let svc = service();
        let alice = Uuid::new_v4();
        svc.insert_order(alice, "1115").await.unwrap();

        svc.apply_update(OrderUpdate {
            order_id: "1115".to_string(),
            status: OrderStatus::Processed,
            accrual: Some(Decimal::from(100)),
        })
        .await
        .unwrap();

        let balance = svc.money.get_balance(alice).await.unwrap();
        assert_eq!(balance.current, Decimal::from(100));

        let orders = svc.list_user_orders(alice).await.unwrap();
        assert_eq!(orders[0].status, OrderStatus::Processed);
    }

    #[tokio::test]
    async fn apply_update_on_unknown_order_is_not_found() {
        let svc = service();
        let err = svc
            .apply_update(OrderUpdate {
                order_id: "9999999999".to_string(),
                status: OrderStatus::Invalid,
                accrual: None,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, OrderError::NotFound));
    }
}
