//! Order applier (C6): consumes fetched results and applies each via C3,
//! swallowing per-item errors so one bad update never kills the pipeline.

use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use super::accrual_client::OrderResult;
use super::config::EnricherConfig;
use crate::orders::OrderService;
use crate::store::OrderUpdate;

const PACING_INTERVAL: std::time::Duration = std::time::Duration::from_secs(1);

pub async fn run(
    order_service: Arc<OrderService>,
    config: EnricherConfig,
    results_rx: mpsc::Receiver<OrderResult>,
    cancel: CancellationToken,
) {
    let results_rx = Arc::new(tokio::sync::Mutex::new(results_rx));

    let workers = (0..config.updater_workers).map(|_| {
        let order_service = order_service.clone();
        let results_rx = results_rx.clone();
        let cancel = cancel.clone();
        tokio::spawn(worker_loop(order_service, results_rx, cancel))
    });

    futures::future::join_all(workers).await;
}

async fn worker_loop(
    order_service: Arc<OrderService>,
    results_rx: Arc<tokio::sync::Mutex<mpsc::Receiver<OrderResult>>>,
    cancel: CancellationToken,
) {
    let mut pacer = tokio::time::interval(PACING_INTERVAL);

    loop {
        let result = {
            let mut rx = results_rx.lock().await;
            tokio::select! {
                _ = cancel.cancelled() => return,
                item = rx.recv() => match item {
                    Some(item) => item,
                    None => return,
                }
            }
        };

        tokio::select! {
            _ = cancel.cancelled() => return,
            _ = pacer.tick() => {}
        }

        let update = OrderUpdate {
            order_id: result.order_id.clone(),
            status: result.status,
            accrual: result.accrual,
        };

        // Not re-queued on failure: if the order is still non-terminal it
        // reappears via C4 in a later iteration.
        if let Err(e) = order_service.apply_update(update).await {
            tracing::warn!(order_id = %result.order_id, error = %e, "updater: apply_update failed");
        }
    }
}
