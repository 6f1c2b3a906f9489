//! Process bootstrap (C10): load configuration, wire the storage layer and
//! domain services, spawn the enricher orchestrator, serve the HTTP
//! gateway, and unwind cooperatively on SIGINT.

use std::sync::Arc;

use loyalty_system::config::Config;
use loyalty_system::enricher::{AccrualClient, Enricher};
use loyalty_system::gateway::{self, AppState};
use loyalty_system::logging;
use loyalty_system::money::MoneyService;
use loyalty_system::orders::OrderService;
use loyalty_system::store::postgres::PgStore;
use loyalty_system::store::Store;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load();
    let _log_guard = logging::init_logging(&config);

    tracing::info!(git_hash = env!("GIT_HASH"), "loyalty-system starting");

    let pg_store = PgStore::connect(&config.database_uri, config.connections_limit).await?;
    pg_store.migrate().await?;
    let store: Arc<dyn Store> = Arc::new(pg_store);

    let money = Arc::new(MoneyService::new(store.clone()));
    let orders = Arc::new(OrderService::new(store.clone(), money.clone()));
    let auth = Arc::new(loyalty_system::auth::AuthService::new(
        store.clone(),
        config.jwt_secret(),
        config.token_ttl(),
    ));

    let state = Arc::new(AppState {
        store: store.clone(),
        auth,
        money,
        orders: orders.clone(),
    });

    let enricher_config = config.enricher_config();
    let accrual_client = Arc::new(AccrualClient::new(
        config.accrual_system_address.clone(),
        enricher_config.sender_timeout,
    ));
    let enricher = Enricher::new(orders, accrual_client, enricher_config);

    let root_cancel = CancellationToken::new();
    let enricher_handle = {
        let cancel = root_cancel.clone();
        tokio::spawn(async move { enricher.run(cancel).await })
    };

    let app = gateway::router(state);
    let listener = TcpListener::bind(&config.run_address).await?;
    tracing::info!(address = %config.run_address, "HTTP gateway listening");

    let serve_cancel = root_cancel.clone();
    let serve_result = axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("SIGINT received, shutting down");
            serve_cancel.cancel();
        })
        .await;

    root_cancel.cancel();
    if let Err(e) = enricher_handle.await {
        tracing::warn!(error = %e, "enricher task join failed");
    }

    serve_result?;
    Ok(())
}
