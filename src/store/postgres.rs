//! PostgreSQL-backed implementation of [`super::Store`].

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::Row;
use std::time::Duration;
use uuid::Uuid;

use super::{Balance, Order, OrderUpdate, Store, StoreError, Tx, User, UserId, Withdrawal};

/// Thin wrapper around the shared connection pool, following the same
/// connect/pool/health_check shape used across the rest of the crate's
/// storage layers.
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub async fn connect(database_uri: &str, max_connections: u32) -> Result<Self, sqlx::Error> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(Duration::from_secs(5))
            .connect(database_uri)
            .await?;

        tracing::info!("PostgreSQL connection pool established");
        Ok(Self { pool })
    }

    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub async fn migrate(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await
    }

    pub async fn health_check(&self) -> Result<(), sqlx::Error> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

fn row_to_order(
    id: String,
    user_id: Uuid,
    status: String,
    accrual: Option<Decimal>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
) -> Order {
    Order {
        id,
        user_id,
        status: status.parse().expect("status column holds a closed set"),
        accrual,
        created_at,
        updated_at,
    }
}

#[async_trait]
impl Store for PgStore {
    async fn begin_tx(&self) -> Result<Tx, StoreError> {
        Ok(Tx::Postgres(self.pool.begin().await?))
    }

    async fn get_user_by_login(&self, login: &str) -> Result<Option<User>, StoreError> {
        let row = sqlx::query(
            "SELECT id, login, password_hash FROM users WHERE login = $1",
        )
        .bind(login)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| User {
            id: r.get("id"),
            login: r.get("login"),
            password_hash: r.get("password_hash"),
        }))
    }

    async fn insert_user(&self, login: &str, password_hash: &str) -> Result<User, StoreError> {
        let row = sqlx::query(
            "INSERT INTO users (id, login, password_hash) VALUES ($1, $2, $3) RETURNING id, login, password_hash",
        )
        .bind(Uuid::new_v4())
        .bind(login)
        .bind(password_hash)
        .fetch_one(&self.pool)
        .await?;

        Ok(User {
            id: row.get("id"),
            login: row.get("login"),
            password_hash: row.get("password_hash"),
        })
    }

    async fn get_order_owner(&self, order_id: &str) -> Result<Option<UserId>, StoreError> {
        let row = sqlx::query("SELECT user_id FROM orders WHERE id = $1")
            .bind(order_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(|r| r.get("user_id")))
    }

    async fn insert_order(&self, user_id: UserId, order_id: &str) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO orders (id, user_id, status, created_at, updated_at) VALUES ($1, $2, 'NEW', now(), now())",
        )
        .bind(order_id)
        .bind(user_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn update_order(
        &self,
        tx: &mut Tx,
        update: &OrderUpdate,
    ) -> Result<Option<UserId>, StoreError> {
        let Tx::Postgres(conn) = tx else {
            unreachable!("PgStore is always driven with a Tx::Postgres handle")
        };

        let row = sqlx::query(
            "UPDATE orders SET status = $1, accrual = $2, updated_at = now() WHERE id = $3 RETURNING user_id",
        )
        .bind(update.status.as_str())
        .bind(update.accrual)
        .bind(&update.order_id)
        .fetch_optional(&mut **conn)
        .await?;

        Ok(row.map(|r| r.get("user_id")))
    }

    async fn list_orders_by_user(&self, user_id: UserId) -> Result<Vec<Order>, StoreError> {
        let rows = sqlx::query(
            "SELECT id, user_id, status, accrual, created_at, updated_at FROM orders WHERE user_id = $1 ORDER BY created_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| {
                row_to_order(
                    r.get("id"),
                    r.get("user_id"),
                    r.get("status"),
                    r.get("accrual"),
                    r.get("created_at"),
                    r.get("updated_at"),
                )
            })
            .collect())
    }

    async fn list_waiting_orders(
        &self,
        limit: i64,
        before: Option<DateTime<Utc>>,
    ) -> Result<Vec<Order>, StoreError> {
        let rows = match before {
            Some(cursor) => {
                sqlx::query(
                    "SELECT id, user_id, status, accrual, created_at, updated_at FROM orders \
                     WHERE status IN ('NEW', 'PROCESSING') AND created_at < $1 \
                     ORDER BY created_at DESC LIMIT $2",
                )
                .bind(cursor)
                .bind(limit)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query(
                    "SELECT id, user_id, status, accrual, created_at, updated_at FROM orders \
                     WHERE status IN ('NEW', 'PROCESSING') \
                     ORDER BY created_at DESC LIMIT $1",
                )
                .bind(limit)
                .fetch_all(&self.pool)
                .await?
            }
        };

        Ok(rows
            .into_iter()
            .map(|r| {
                row_to_order(
                    r.get("id"),
                    r.get("user_id"),
                    r.get("status"),
                    r.get("accrual"),
                    r.get("created_at"),
                    r.get("updated_at"),
                )
            })
            .collect())
    }

    async fn get_balance(&self, user_id: UserId) -> Result<Balance, StoreError> {
        let row = sqlx::query(
            "SELECT current, withdrawn, updated_at FROM balances WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(match row {
            Some(r) => Balance {
                user_id,
                current: r.get("current"),
                withdrawn: r.get("withdrawn"),
                updated_at: r.get("updated_at"),
            },
            None => Balance::zero(user_id),
        })
    }

    async fn add_balance(
        &self,
        tx: &mut Tx,
        user_id: UserId,
        amount: Decimal,
    ) -> Result<(), StoreError> {
        let Tx::Postgres(conn) = tx else {
            unreachable!("PgStore is always driven with a Tx::Postgres handle")
        };

        sqlx::query(
            "INSERT INTO balances (user_id, current, withdrawn, updated_at) VALUES ($1, $2, 0, now()) \
             ON CONFLICT (user_id) DO UPDATE SET current = balances.current + EXCLUDED.current, updated_at = now()",
        )
        .bind(user_id)
        .bind(amount)
        .execute(&mut **conn)
        .await?;
        Ok(())
    }

    async fn reduce_balance(
        &self,
        tx: &mut Tx,
        user_id: UserId,
        amount: Decimal,
    ) -> Result<bool, StoreError> {
        let Tx::Postgres(conn) = tx else {
            unreachable!("PgStore is always driven with a Tx::Postgres handle")
        };

        // The WHERE clause re-validates the balance against the row's
        // current value at the moment this UPDATE takes its lock, closing
        // the check-then-act race a plain SELECT then UPDATE would leave
        // open under concurrent withdrawals.
        let result = sqlx::query(
            "UPDATE balances SET current = current - $1, withdrawn = withdrawn + $1, updated_at = now() \
             WHERE user_id = $2 AND current >= $1",
        )
        .bind(amount)
        .bind(user_id)
        .execute(&mut **conn)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn get_withdrawal(&self, id: Uuid) -> Result<Option<Withdrawal>, StoreError> {
        let row = sqlx::query(
            "SELECT id, user_id, order_id, sum, created_at FROM withdrawals WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| Withdrawal {
            id: r.get("id"),
            user_id: r.get("user_id"),
            order_id: r.get("order_id"),
            sum: r.get("sum"),
            created_at: r.get("created_at"),
        }))
    }

    async fn list_withdrawals_by_user(&self, user_id: UserId) -> Result<Vec<Withdrawal>, StoreError> {
        let rows = sqlx::query(
            "SELECT id, user_id, order_id, sum, created_at FROM withdrawals WHERE user_id = $1 ORDER BY created_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| Withdrawal {
                id: r.get("id"),
                user_id: r.get("user_id"),
                order_id: r.get("order_id"),
                sum: r.get("sum"),
                created_at: r.get("created_at"),
            })
            .collect())
    }

    async fn insert_withdrawal(&self, tx: &mut Tx, withdrawal: &Withdrawal) -> Result<bool, StoreError> {
        let Tx::Postgres(conn) = tx else {
            unreachable!("PgStore is always driven with a Tx::Postgres handle")
        };

        let result = sqlx::query(
            "INSERT INTO withdrawals (id, user_id, order_id, sum, created_at) VALUES ($1, $2, $3, $4, now()) ON CONFLICT (id) DO NOTHING",
        )
        .bind(withdrawal.id)
        .bind(withdrawal.user_id)
        .bind(&withdrawal.order_id)
        .bind(withdrawal.sum)
        .execute(&mut **conn)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
