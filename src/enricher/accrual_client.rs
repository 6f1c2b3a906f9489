//! Wire client for the external accrual calculator consumed by C5.

use rust_decimal::Decimal;
use serde::Deserialize;
use std::time::Duration;

use crate::store::OrderStatus;

#[derive(Debug, Deserialize)]
struct AccrualResponse {
    order: String,
    status: String,
    accrual: Option<Decimal>,
}

#[derive(Debug, Clone)]
pub struct OrderResult {
    pub order_id: String,
    pub status: OrderStatus,
    pub accrual: Option<Decimal>,
}

/// What happened on one HTTP round trip, before any retry decision is made.
#[derive(Debug)]
pub enum FetchOutcome {
    /// `200`: a definitive result to forward downstream.
    Result(OrderResult),
    /// `204`: unknown to the calculator, drop with no downstream emit.
    Unknown,
}

#[derive(Debug)]
pub enum FetchError {
    /// `429`: honor `Retry-After` (seconds) before retrying.
    RateLimited(Option<Duration>),
    /// `5xx` or a transport timeout: retry with zero delay.
    Retryable,
    /// Any other `4xx`: permanent, drop with a warning.
    Permanent,
}

pub struct AccrualClient {
    http: reqwest::Client,
    base_url: String,
}

impl AccrualClient {
    pub fn new(base_url: String, request_timeout: Duration) -> Self {
        let http = reqwest::Client::builder()
            .timeout(request_timeout)
            .build()
            .expect("reqwest client builds with a fixed timeout");
        Self { http, base_url }
    }

    /// `GET {base}/api/orders/{id}`, one attempt, no retry. Retry policy is
    /// owned by the caller (C5).
    pub async fn fetch(&self, order_id: &str) -> Result<FetchOutcome, FetchError> {
        let url = format!("{}/api/orders/{}", self.base_url, order_id);
        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|_| FetchError::Retryable)?;

        let status = response.status();

        if status.as_u16() == 204 {
            return Ok(FetchOutcome::Unknown);
        }
        if status.as_u16() == 429 {
            let retry_after = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<u64>().ok())
                .map(Duration::from_secs);
            return Err(FetchError::RateLimited(retry_after));
        }
        if status.is_server_error() {
            return Err(FetchError::Retryable);
        }
        if status.is_client_error() {
            return Err(FetchError::Permanent);
        }

        let body: AccrualResponse = response.json().await.map_err(|_| FetchError::Retryable)?;
        let mapped_status = match body.status.as_str() {
            // The external calculator's REGISTERED maps onto our internal
            // NEW at this boundary; nothing downstream ever sees REGISTERED.
            "REGISTERED" => OrderStatus::New,
            other => other.parse().map_err(|_| FetchError::Permanent)?,
        };

        Ok(FetchOutcome::Result(OrderResult {
            order_id: body.order,
            status: mapped_status,
            accrual: body.accrual,
        }))
    }
}
