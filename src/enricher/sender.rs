//! Accrual fetcher (C5): a fixed worker pool querying the external
//! calculator, honoring its rate-limit/retry protocol.

use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use super::accrual_client::{AccrualClient, FetchError, FetchOutcome, OrderResult};
use super::config::EnricherConfig;

const PACING_INTERVAL: std::time::Duration = std::time::Duration::from_secs(1);

pub async fn run(
    client: Arc<AccrualClient>,
    config: EnricherConfig,
    ids_rx: mpsc::Receiver<String>,
    results_tx: mpsc::Sender<OrderResult>,
    cancel: CancellationToken,
) {
    let ids_rx = Arc::new(tokio::sync::Mutex::new(ids_rx));

    let workers = (0..config.sender_workers).map(|_| {
        let client = client.clone();
        let config = config.clone();
        let ids_rx = ids_rx.clone();
        let results_tx = results_tx.clone();
        let cancel = cancel.clone();
        tokio::spawn(worker_loop(client, config, ids_rx, results_tx, cancel))
    });

    futures::future::join_all(workers).await;
}

async fn worker_loop(
    client: Arc<AccrualClient>,
    config: EnricherConfig,
    ids_rx: Arc<tokio::sync::Mutex<mpsc::Receiver<String>>>,
    results_tx: mpsc::Sender<OrderResult>,
    cancel: CancellationToken,
) {
    let mut pacer = tokio::time::interval(PACING_INTERVAL);

    loop {
        let order_id = {
            let mut rx = ids_rx.lock().await;
            tokio::select! {
                _ = cancel.cancelled() => return,
                id = rx.recv() => match id {
                    Some(id) => id,
                    None => return,
                }
            }
        };

        tokio::select! {
            _ = cancel.cancelled() => return,
            _ = pacer.tick() => {}
        }

        if let Some(result) = fetch_with_retry(&client, &config, &order_id, &cancel).await {
            if results_tx.send(result).await.is_err() {
                return;
            }
        }
    }
}

async fn fetch_with_retry(
    client: &AccrualClient,
    config: &EnricherConfig,
    order_id: &str,
    cancel: &CancellationToken,
) -> Option<OrderResult> {
    let mut attempts = 0u32;

    loop {
        if cancel.is_cancelled() {
            return None;
        }

        match client.fetch(order_id).await {
            Ok(FetchOutcome::Result(result)) => return Some(result),
            Ok(FetchOutcome::Unknown) => return None,
            Err(FetchError::Permanent) => {
                tracing::warn!(order_id, "sender: permanent failure, dropping");
                return None;
            }
            Err(FetchError::RateLimited(retry_after)) => {
                if attempts >= config.sender_retries {
                    tracing::warn!(order_id, "sender: retry budget exhausted (rate limited)");
                    return None;
                }
                attempts += 1;
                let wait = retry_after.unwrap_or(std::time::Duration::ZERO);
                tokio::select! {
                    _ = cancel.cancelled() => return None,
                    _ = tokio::time::sleep(wait) => {}
                }
            }
            Err(FetchError::Retryable) => {
                if attempts >= config.sender_retries {
                    tracing::warn!(order_id, "sender: retry budget exhausted (transient failure)");
                    return None;
                }
                attempts += 1;
            }
        }
    }
}
