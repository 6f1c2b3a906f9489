//! Loyalty-points back end.
//!
//! The authenticated HTTP API ([`gateway`]) lets end users register, submit
//! order identifiers and withdraw accumulated points. The core of the crate
//! is the order-enrichment pipeline in [`enricher`]: a background subsystem
//! that discovers non-terminal orders, queries an external accrual
//! calculator with bounded concurrency, and atomically applies each result
//! through [`orders`] and [`money`] against the transactional [`store`].
//!
//! # Modules
//!
//! - [`store`]: transactional storage contract (users, orders, balances,
//!   withdrawals) and its Postgres/in-memory implementations.
//! - [`money`]: idempotent withdraw, accrual credit, balance reads.
//! - [`orders`]: attaches orders to users; applies pipeline results
//!   atomically alongside the balance credit.
//! - [`enricher`]: the producer/fetcher/applier pipeline and its
//!   orchestrator.
//! - [`auth`]: password hashing and JWT issuance/validation.
//! - [`gateway`]: the axum HTTP surface.
//! - [`luhn`]: order-id checksum validation.
//! - [`config`]: process bootstrap configuration.
//! - [`logging`]: structured logging setup.

pub mod auth;
pub mod config;
pub mod enricher;
pub mod gateway;
pub mod logging;
pub mod luhn;
pub mod money;
pub mod orders;
pub mod store;

pub use enricher::Enricher;
pub use gateway::AppState;
pub use money::MoneyService;
pub use orders::OrderService;
pub use store::Store;
