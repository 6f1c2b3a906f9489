//! End-to-end scenarios against an in-process router (axum + in-memory
//! store) and the enrichment pipeline wired against a mocked accrual
//! calculator. Mirrors the concrete I/O scenarios the loyalty HTTP contract
//! and the enricher pipeline are expected to satisfy.

use std::sync::Arc;
use std::time::Duration;

use http_body_util::BodyExt;
use loyalty_system::auth::AuthService;
use loyalty_system::enricher::{AccrualClient, Enricher, EnricherConfig};
use loyalty_system::gateway::{self, AppState};
use loyalty_system::money::MoneyService;
use loyalty_system::orders::OrderService;
use loyalty_system::store::memory::MemoryStore;
use loyalty_system::store::Store;
use rust_decimal::Decimal;
use tokio_util::sync::CancellationToken;
use tower::ServiceExt;
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

fn test_state() -> Arc<AppState> {
    let store: Arc<dyn Store> = Arc::new(MemoryStore::new());
    let money = Arc::new(MoneyService::new(store.clone()));
    let orders = Arc::new(OrderService::new(store.clone(), money.clone()));
    let auth = Arc::new(AuthService::new(
        store.clone(),
        "test-secret".to_string(),
        chrono::Duration::hours(24),
    ));
    Arc::new(AppState {
        store,
        auth,
        money,
        orders,
    })
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn json_request(method: &str, uri: &str, token: Option<&str>, body: serde_json::Value) -> axum::http::Request<axum::body::Body> {
    let mut builder = axum::http::Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json");
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    builder.body(axum::body::Body::from(body.to_string())).unwrap()
}

#[tokio::test]
async fn register_then_login_round_trip_and_duplicate_conflict() {
    let app = gateway::router(test_state());

    let register = json_request(
        "POST",
        "/api/user/register",
        None,
        serde_json::json!({"login": "alice", "password": "p"}),
    );
    let response = app.clone().oneshot(register).await.unwrap();
    assert_eq!(response.status(), axum::http::StatusCode::OK);
    assert!(response.headers().get("authorization").is_some());

    let duplicate = json_request(
        "POST",
        "/api/user/register",
        None,
        serde_json::json!({"login": "alice", "password": "p"}),
    );
    let response = app.clone().oneshot(duplicate).await.unwrap();
    assert_eq!(response.status(), axum::http::StatusCode::CONFLICT);

    let login = json_request(
        "POST",
        "/api/user/login",
        None,
        serde_json::json!({"login": "alice", "password": "p"}),
    );
    let response = app.clone().oneshot(login).await.unwrap();
    assert_eq!(response.status(), axum::http::StatusCode::OK);

    let bad_login = json_request(
        "POST",
        "/api/user/login",
        None,
        serde_json::json!({"login": "alice", "password": "wrong"}),
    );
    let response = app.oneshot(bad_login).await.unwrap();
    assert_eq!(response.status(), axum::http::StatusCode::UNAUTHORIZED);
}

async fn register_and_login(app: &axum::Router, login: &str) -> String {
    let register = json_request(
        "POST",
        "/api/user/register",
        None,
        serde_json::json!({"login": login, "password": "p"}),
    );
    let response = app.clone().oneshot(register).await.unwrap();
    response
        .headers()
        .get("authorization")
        .unwrap()
        .to_str()
        .unwrap()
        .to_string()
}

#[tokio::test]
async fn submit_order_duplicate_same_user_and_conflict_with_another_user() {
    let app = gateway::router(test_state());
    let alice_token = register_and_login(&app, "alice").await;
    let bob_token = register_and_login(&app, "bob").await;

    let submit = axum::http::Request::builder()
        .method("POST")
        .uri("/api/user/orders")
        .header("content-type", "text/plain")
        .header("authorization", format!("Bearer {alice_token}"))
        .body(axum::body::Body::from("1115"))
        .unwrap();
    let response = app.clone().oneshot(submit).await.unwrap();
    assert_eq!(response.status(), axum::http::StatusCode::ACCEPTED);

    let resubmit = axum::http::Request::builder()
        .method("POST")
        .uri("/api/user/orders")
        .header("content-type", "text/plain")
        .header("authorization", format!("Bearer {alice_token}"))
        .body(axum::body::Body::from("1115"))
        .unwrap();
    let response = app.clone().oneshot(resubmit).await.unwrap();
    assert_eq!(response.status(), axum::http::StatusCode::OK);

    let bob_submit = axum::http::Request::builder()
        .method("POST")
        .uri("/api/user/orders")
        .header("content-type", "text/plain")
        .header("authorization", format!("Bearer {bob_token}"))
        .body(axum::body::Body::from("1115"))
        .unwrap();
    let response = app.clone().oneshot(bob_submit).await.unwrap();
    assert_eq!(response.status(), axum::http::StatusCode::CONFLICT);

    let bad_luhn = axum::http::Request::builder()
        .method("POST")
        .uri("/api/user/orders")
        .header("content-type", "text/plain")
        .header("authorization", format!("Bearer {alice_token}"))
        .body(axum::body::Body::from("1111"))
        .unwrap();
    let response = app.oneshot(bad_luhn).await.unwrap();
    assert_eq!(response.status(), axum::http::StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn withdraw_happy_path_idempotent_replay_and_insufficient_funds() {
    let state = test_state();
    let app = gateway::router(state.clone());
    let alice_token = register_and_login(&app, "alice").await;

    let user_id = state.auth.verify(&alice_token).unwrap();
    {
        let mut tx = state.store.begin_tx().await.unwrap();
        state
            .money
            .add_accrual(&mut tx, user_id, Decimal::from(100))
            .await
            .unwrap();
        tx.commit().await.unwrap();
    }

    let withdraw = |sum: i64| {
        axum::http::Request::builder()
            .method("POST")
            .uri("/api/user/balance/withdraw")
            .header("content-type", "application/json")
            .header("authorization", format!("Bearer {alice_token}"))
            .header("Idempotency-Key", "6e8bc430-9c3a-11d9-9669-0800200c9a66")
            .body(axum::body::Body::from(
                serde_json::json!({"order": "1321", "sum": sum}).to_string(),
            ))
            .unwrap()
    };

    let response = app.clone().oneshot(withdraw(60)).await.unwrap();
    assert_eq!(response.status(), axum::http::StatusCode::OK);

    let balance = state.money.get_balance(user_id).await.unwrap();
    assert_eq!(balance.current, Decimal::from(40));
    assert_eq!(balance.withdrawn, Decimal::from(60));

    // Replay with the same idempotency key must not mutate the balance again.
    let response = app.clone().oneshot(withdraw(60)).await.unwrap();
    assert_eq!(response.status(), axum::http::StatusCode::OK);
    let balance = state.money.get_balance(user_id).await.unwrap();
    assert_eq!(balance.current, Decimal::from(40));
    assert_eq!(balance.withdrawn, Decimal::from(60));

    let withdrawals_request = axum::http::Request::builder()
        .method("GET")
        .uri("/api/user/withdrawals")
        .header("authorization", format!("Bearer {alice_token}"))
        .body(axum::body::Body::empty())
        .unwrap();
    let response = app.clone().oneshot(withdrawals_request).await.unwrap();
    let withdrawals = body_json(response).await;
    assert_eq!(withdrawals.as_array().unwrap().len(), 1);

    // A second, larger withdraw under a fresh key exceeds the remaining balance.
    let insufficient = axum::http::Request::builder()
        .method("POST")
        .uri("/api/user/balance/withdraw")
        .header("content-type", "application/json")
        .header("authorization", format!("Bearer {alice_token}"))
        .header("Idempotency-Key", "7e8bc430-9c3a-11d9-9669-0800200c9a66")
        .body(axum::body::Body::from(
            serde_json::json!({"order": "1321", "sum": 50}).to_string(),
        ))
        .unwrap();
    let response = app.oneshot(insufficient).await.unwrap();
    assert_eq!(response.status(), axum::http::StatusCode::PAYMENT_REQUIRED);
}

fn fast_enricher_config() -> EnricherConfig {
    EnricherConfig {
        getter_limit: 10,
        getter_rate: 20.0,
        sender_workers: 2,
        sender_timeout: Duration::from_secs(2),
        sender_retries: 3,
        updater_workers: 2,
        period: Duration::from_millis(20),
        iteration_timeout: Duration::from_secs(5),
        channel_capacity: 16,
    }
}

#[tokio::test]
async fn enricher_pipeline_credits_balance_for_processed_order() {
    let store: Arc<dyn Store> = Arc::new(MemoryStore::new());
    let money = Arc::new(MoneyService::new(store.clone()));
    let orders = Arc::new(OrderService::new(store.clone(), money.clone()));

    let user_id = uuid::Uuid::new_v4();
    orders.insert_order(user_id, "1115").await.unwrap();
    orders.insert_order(user_id, "1214").await.unwrap();

    let server = MockServer::start().await;
    Mock::given(wiremock::matchers::method("GET"))
        .and(wiremock::matchers::path("/api/orders/1115"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "order": "1115",
            "status": "PROCESSED",
            "accrual": 100,
        })))
        .mount(&server)
        .await;
    Mock::given(wiremock::matchers::method("GET"))
        .and(wiremock::matchers::path("/api/orders/1214"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "order": "1214",
            "status": "INVALID",
        })))
        .mount(&server)
        .await;

    let client = Arc::new(AccrualClient::new(server.uri(), Duration::from_secs(2)));
    let enricher = Enricher::new(orders.clone(), client, fast_enricher_config());

    let cancel = CancellationToken::new();
    let handle = {
        let cancel = cancel.clone();
        tokio::spawn(async move { enricher.run(cancel).await })
    };

    tokio::time::sleep(Duration::from_millis(300)).await;
    cancel.cancel();
    tokio::time::timeout(Duration::from_secs(5), handle)
        .await
        .expect("enricher stopped within the grace period")
        .unwrap();

    let user_orders = orders.list_user_orders(user_id).await.unwrap();
    let processed = user_orders.iter().find(|o| o.id == "1115").unwrap();
    assert_eq!(processed.status, loyalty_system::store::OrderStatus::Processed);
    assert_eq!(processed.accrual, Some(Decimal::from(100)));

    let invalid = user_orders.iter().find(|o| o.id == "1214").unwrap();
    assert_eq!(invalid.status, loyalty_system::store::OrderStatus::Invalid);

    let balance = money.get_balance(user_id).await.unwrap();
    assert_eq!(balance.current, Decimal::from(100));
}

struct RetryThenSucceed {
    calls: std::sync::atomic::AtomicU32,
}

impl Respond for RetryThenSucceed {
    fn respond(&self, _request: &Request) -> ResponseTemplate {
        let call = self.calls.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        if call == 0 {
            ResponseTemplate::new(429).insert_header("Retry-After", "1")
        } else {
            ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "order": "1321",
                "status": "PROCESSED",
                "accrual": 50,
            }))
        }
    }
}

#[tokio::test]
async fn enricher_honors_retry_after_before_crediting_accrual() {
    let store: Arc<dyn Store> = Arc::new(MemoryStore::new());
    let money = Arc::new(MoneyService::new(store.clone()));
    let orders = Arc::new(OrderService::new(store.clone(), money.clone()));

    let user_id = uuid::Uuid::new_v4();
    orders.insert_order(user_id, "1321").await.unwrap();

    let server = MockServer::start().await;
    Mock::given(wiremock::matchers::method("GET"))
        .and(wiremock::matchers::path("/api/orders/1321"))
        .respond_with(RetryThenSucceed {
            calls: std::sync::atomic::AtomicU32::new(0),
        })
        .mount(&server)
        .await;

    let client = Arc::new(AccrualClient::new(server.uri(), Duration::from_secs(2)));
    let mut config = fast_enricher_config();
    config.period = Duration::from_millis(50);
    config.iteration_timeout = Duration::from_secs(5);
    let enricher = Enricher::new(orders.clone(), client, config);

    let cancel = CancellationToken::new();
    let handle = {
        let cancel = cancel.clone();
        tokio::spawn(async move { enricher.run(cancel).await })
    };

    let started = std::time::Instant::now();
    loop {
        let balance = money.get_balance(user_id).await.unwrap();
        if balance.current == Decimal::from(50) {
            break;
        }
        assert!(
            started.elapsed() < Duration::from_secs(4),
            "accrual was not credited within the iteration deadline"
        );
        tokio::time::sleep(Duration::from_millis(50)).await;
    }

    // Retry-After(1) was honored: the credit cannot land before 1 second has passed.
    assert!(started.elapsed() >= Duration::from_secs(1));

    cancel.cancel();
    tokio::time::timeout(Duration::from_secs(5), handle)
        .await
        .expect("enricher stopped within the grace period")
        .unwrap();
}
