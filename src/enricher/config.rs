use std::time::Duration;

/// Every knob C4–C7 read from `Config` (see spec §6), grouped by the
/// component that owns it.
#[derive(Debug, Clone)]
pub struct EnricherConfig {
    /// ORDER_GETTER_ORDERS_LIMIT: page size for C4's waiting-orders scan.
    pub getter_limit: i64,
    /// ORDER_GETTER_RATE_LIMIT: page fetches per second.
    pub getter_rate: f64,

    /// ORDER_SENDER_RATE_LIMIT: worker pool size `W` for C5.
    pub sender_workers: usize,
    /// ORDER_SENDER_ACCRUAL_TIMEOUT: single-request timeout.
    pub sender_timeout: Duration,
    /// ORDER_SENDER_ACCRUAL_RETRIES: retry budget per order id.
    pub sender_retries: u32,

    /// ORDER_UPDATER_RATE_LIMIT: worker pool size `U` for C6.
    pub updater_workers: usize,

    /// ORDER_ENRICHER_PERIOD: interval between iterations.
    pub period: Duration,
    /// ORDER_ENRICHER_TIMEOUT: per-iteration deadline.
    pub iteration_timeout: Duration,

    /// Capacity shared by the `ids` and `results` bounded channels.
    pub channel_capacity: usize,
}

impl EnricherConfig {
    pub fn getter_page_interval(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.getter_rate.max(0.001))
    }
}

impl Default for EnricherConfig {
    fn default() -> Self {
        Self {
            getter_limit: 10,
            getter_rate: 1.0,
            sender_workers: 10,
            sender_timeout: Duration::from_secs(5),
            sender_retries: 3,
            updater_workers: 10,
            period: Duration::from_secs(10),
            iteration_timeout: Duration::from_secs(60),
            channel_capacity: 64,
        }
    }
}
