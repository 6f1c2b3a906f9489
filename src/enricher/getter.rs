//! Waiting-orders producer (C4): a descending-`created_at`-cursor scan that
//! stays stable under concurrent inserts and transitions.

use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use super::config::EnricherConfig;
use crate::orders::OrderService;

pub async fn run(
    order_service: Arc<OrderService>,
    config: EnricherConfig,
    ids_tx: mpsc::Sender<String>,
    cancel: CancellationToken,
) {
    let mut interval = tokio::time::interval(config.getter_page_interval());
    let mut cursor = None;

    loop {
        tokio::select! {
            _ = cancel.cancelled() => return,
            _ = interval.tick() => {}
        }

        let page = match order_service.list_waiting(config.getter_limit, cursor).await {
            Ok(page) => page,
            Err(e) => {
                tracing::warn!(error = %e, "getter: storage error, aborting iteration");
                return;
            }
        };

        let page_len = page.len();
        let last_created_at = page.last().map(|o| o.created_at);

        for order in page {
            tokio::select! {
                _ = cancel.cancelled() => return,
                send_result = ids_tx.send(order.id) => {
                    if send_result.is_err() {
                        return;
                    }
                }
            }
        }

        if page_len < config.getter_limit as usize {
            return;
        }
        cursor = last_created_at;
    }
}
