//! Money service (C2): idempotent withdraw, accrual credit, balance reads.
//! The invariant guardian: every point that ever leaves or enters a
//! balance passes through here.

pub mod error;

pub use error::MoneyError;

use crate::luhn;
use crate::store::{Balance, Store, Tx, UserId, Withdrawal};
use rust_decimal::Decimal;
use std::sync::Arc;
use uuid::Uuid;

pub struct WithdrawRequest {
    pub user_id: Option<UserId>,
    pub order_id: String,
    pub sum: Decimal,
    pub id: Option<Uuid>,
}

pub struct MoneyService {
    store: Arc<dyn Store>,
}

impl MoneyService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Steps mirror the contract exactly: validate, check idempotent
    /// replay, read-then-write the balance inside one transaction.
    pub async fn withdraw(&self, req: WithdrawRequest) -> Result<(), MoneyError> {
        if !luhn::is_valid(&req.order_id) {
            return Err(MoneyError::BadOrderId);
        }
        if req.sum <= Decimal::ZERO {
            return Err(MoneyError::BadAmount);
        }
        let user_id = req.user_id.ok_or(MoneyError::Unauthenticated)?;

        let id = req.id.unwrap_or_else(Uuid::new_v4);
        if self.store.get_withdrawal(id).await?.is_some() {
            return Ok(());
        }

        let balance = self.store.get_balance(user_id).await?;
        if req.sum > balance.current {
            return Err(MoneyError::InsufficientFunds);
        }

        let mut tx = self.store.begin_tx().await?;
        let withdrawal = Withdrawal {
            id,
            user_id,
            order_id: req.order_id,
            sum: req.sum,
            created_at: chrono::Utc::now(),
        };
        let result = async {
            let inserted = self.store.insert_withdrawal(&mut tx, &withdrawal).await?;
            if inserted {
                // Authoritative check: the balance read above is only a
                // fast-fail heuristic. This conditional update re-validates
                // `sum <= current` under the row lock it takes, so two
                // concurrent withdrawals against the same balance cannot
                // both commit.
                let reduced = self.store.reduce_balance(&mut tx, user_id, req.sum).await?;
                if !reduced {
                    return Err(MoneyError::InsufficientFunds);
                }
            }
            Ok::<(), MoneyError>(())
        }
        .await;

        match result {
            Ok(()) => {
                tx.commit().await?;
                Ok(())
            }
            Err(e) => {
                tx.rollback().await?;
                Err(e)
            }
        }
    }

    /// Delegates to the store on the caller's transaction. Never commits;
    /// the caller (C3's `apply_update`) owns the transaction's lifetime.
    pub async fn add_accrual(
        &self,
        tx: &mut Tx,
        user_id: UserId,
        amount: Decimal,
    ) -> Result<(), MoneyError> {
        if amount <= Decimal::ZERO {
            return Err(MoneyError::BadAmount);
        }
        self.store.add_balance(tx, user_id, amount).await?;
        Ok(())
    }

    pub async fn get_balance(&self, user_id: UserId) -> Result<Balance, MoneyError> {
        Ok(self.store.get_balance(user_id).await?)
    }

    pub async fn get_withdrawals(&self, user_id: UserId) -> Result<Vec<Withdrawal>, MoneyError> {
        Ok(self.store.list_withdrawals_by_user(user_id).await?)
    }
}
