//! The order-enrichment pipeline (C4–C7): the core of this crate.

pub mod accrual_client;
pub mod config;
pub mod getter;
pub mod orchestrator;
pub mod sender;
pub mod updater;

pub use accrual_client::AccrualClient;
pub use config::EnricherConfig;
pub use orchestrator::Enricher;
