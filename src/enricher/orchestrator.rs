//! Enricher orchestrator (C7): schedules periodic iterations, wires
//! C4→C5→C6, and enforces the per-iteration deadline.

use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use super::accrual_client::AccrualClient;
use super::config::EnricherConfig;
use super::{getter, sender, updater};
use crate::orders::OrderService;

pub struct Enricher {
    order_service: Arc<OrderService>,
    accrual_client: Arc<AccrualClient>,
    config: EnricherConfig,
}

impl Enricher {
    pub fn new(
        order_service: Arc<OrderService>,
        accrual_client: Arc<AccrualClient>,
        config: EnricherConfig,
    ) -> Self {
        Self {
            order_service,
            accrual_client,
            config,
        }
    }

    /// Runs until `cancel` fires. Each iteration is linked to `cancel` so a
    /// parent cancel unwinds the in-flight iteration cooperatively.
    pub async fn run(&self, cancel: CancellationToken) {
        let mut ticker = tokio::time::interval(self.config.period);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::info!("enricher: parent cancelled, stopping");
                    return;
                }
                _ = ticker.tick() => {
                    self.run_iteration(&cancel).await;
                }
            }
        }
    }

    async fn run_iteration(&self, parent: &CancellationToken) {
        let child = parent.child_token();

        let deadline_guard = {
            let child = child.clone();
            let timeout = self.config.iteration_timeout;
            tokio::spawn(async move {
                tokio::time::sleep(timeout).await;
                child.cancel();
            })
        };

        let (ids_tx, ids_rx) = mpsc::channel(self.config.channel_capacity);
        let (results_tx, results_rx) = mpsc::channel(self.config.channel_capacity);

        let getter_task = tokio::spawn(getter::run(
            self.order_service.clone(),
            self.config.clone(),
            ids_tx,
            child.clone(),
        ));
        let sender_task = tokio::spawn(sender::run(
            self.accrual_client.clone(),
            self.config.clone(),
            ids_rx,
            results_tx,
            child.clone(),
        ));
        let updater_task = tokio::spawn(updater::run(
            self.order_service.clone(),
            self.config.clone(),
            results_rx,
            child.clone(),
        ));

        let _ = tokio::join!(getter_task, sender_task, updater_task);

        deadline_guard.abort();
        child.cancel();
    }
}
