//! Process bootstrap configuration (C10): CLI flags layered over
//! environment variables, CLI taking precedence: the same layering
//! `original_source`'s config loader used, reimplemented with `clap`'s
//! built-in env fallback instead of a hand-rolled merge.

use clap::Parser;
use std::time::Duration;

use crate::enricher::EnricherConfig;

#[derive(Debug, Parser)]
#[command(name = "loyalty-system", about = "Loyalty-points back end")]
pub struct Config {
    /// RUN_ADDRESS / -a: HTTP listen host:port.
    #[arg(short = 'a', long, env = "RUN_ADDRESS", default_value = "0.0.0.0:8080")]
    pub run_address: String,

    /// DATABASE_URI / -d: relational store DSN.
    #[arg(short = 'd', long, env = "DATABASE_URI")]
    pub database_uri: String,

    /// ACCRUAL_SYSTEM_ADDRESS / -r: base URL of the accrual service.
    #[arg(short = 'r', long, env = "ACCRUAL_SYSTEM_ADDRESS")]
    pub accrual_system_address: String,

    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    #[arg(long, env = "LOG_DIR", default_value = "logs")]
    pub log_dir: String,

    #[arg(long, env = "SECRET_KEY")]
    pub secret_key: Option<String>,

    /// JWT lifetime, in seconds.
    #[arg(long, env = "TOKEN_EXP", default_value_t = 86_400)]
    pub token_exp_secs: i64,

    #[arg(long, env = "CONNECTIONS_LIMIT", default_value_t = 10)]
    pub connections_limit: u32,

    #[arg(long, env = "ORDER_GETTER_ORDERS_LIMIT", default_value_t = 10)]
    pub order_getter_orders_limit: i64,

    #[arg(long, env = "ORDER_GETTER_RATE_LIMIT", default_value_t = 1.0)]
    pub order_getter_rate_limit: f64,

    #[arg(long, env = "ORDER_SENDER_RATE_LIMIT", default_value_t = 10)]
    pub order_sender_rate_limit: usize,

    #[arg(long, env = "ORDER_SENDER_ACCRUAL_TIMEOUT", default_value_t = 5)]
    pub order_sender_accrual_timeout_secs: u64,

    #[arg(long, env = "ORDER_SENDER_ACCRUAL_RETRIES", default_value_t = 3)]
    pub order_sender_accrual_retries: u32,

    #[arg(long, env = "ORDER_UPDATER_RATE_LIMIT", default_value_t = 10)]
    pub order_updater_rate_limit: usize,

    #[arg(long, env = "ORDER_ENRICHER_PERIOD", default_value_t = 10)]
    pub order_enricher_period_secs: u64,

    #[arg(long, env = "ORDER_ENRICHER_TIMEOUT", default_value_t = 60)]
    pub order_enricher_timeout_secs: u64,
}

impl Config {
    pub fn load() -> Self {
        Self::parse()
    }

    /// Falls back to a freshly generated key when none is configured, which
    /// is acceptable for a first-run bootstrap, but any deployment that must
    /// survive a restart should set `SECRET_KEY` explicitly.
    pub fn jwt_secret(&self) -> String {
        self.secret_key.clone().unwrap_or_else(|| {
            use rand::RngCore;
            let mut bytes = [0u8; 32];
            rand::thread_rng().fill_bytes(&mut bytes);
            bytes.iter().map(|b| format!("{b:02x}")).collect()
        })
    }

    pub fn token_ttl(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.token_exp_secs)
    }

    pub fn enricher_config(&self) -> EnricherConfig {
        EnricherConfig {
            getter_limit: self.order_getter_orders_limit,
            getter_rate: self.order_getter_rate_limit,
            sender_workers: self.order_sender_rate_limit,
            sender_timeout: Duration::from_secs(self.order_sender_accrual_timeout_secs),
            sender_retries: self.order_sender_accrual_retries,
            updater_workers: self.order_updater_rate_limit,
            period: Duration::from_secs(self.order_enricher_period_secs),
            iteration_timeout: Duration::from_secs(self.order_enricher_timeout_secs),
            ..EnricherConfig::default()
        }
    }
}
