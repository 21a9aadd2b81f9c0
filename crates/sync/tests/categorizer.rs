//! AI service client tests against a throwaway local HTTP server.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use biztrack_core::category::ExpenseCategory;
use biztrack_core::ledger::{PaymentMethod, Transaction, TransactionKind};
use biztrack_shared::config::CategorizerConfig;
use biztrack_shared::types::{BusinessId, TransactionId};
use biztrack_sync::CategorizerClient;
use chrono::NaiveDate;
use rstest::rstest;
use rust_decimal_macros::dec;
use serde_json::{Value, json};

// ============================================================================
// Helpers
// ============================================================================

async fn serve(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
}

fn client(base_url: String) -> CategorizerClient {
    CategorizerClient::new(&CategorizerConfig {
        base_url,
        timeout_secs: 1,
        ..CategorizerConfig::default()
    })
    .unwrap()
}

fn prediction(label: &str, confidence: f64) -> Value {
    json!({
        "predictions": [{
            "description": "whatever",
            "suggested_category": label,
            "confidence": confidence
        }]
    })
}

/// Serves a fixed prediction and counts requests.
async fn prediction_service(body: Value) -> (String, Arc<AtomicUsize>) {
    let hits = Arc::new(AtomicUsize::new(0));
    let router = Router::new()
        .route(
            "/predict/category",
            post(
                |State((hits, body)): State<(Arc<AtomicUsize>, Value)>| async move {
                    hits.fetch_add(1, Ordering::SeqCst);
                    Json(body)
                },
            ),
        )
        .with_state((Arc::clone(&hits), body));
    (serve(router).await, hits)
}

fn history_row(kind: TransactionKind, amount: rust_decimal::Decimal) -> Transaction {
    Transaction {
        id: TransactionId::new(),
        business_id: BusinessId::new(),
        kind,
        date: NaiveDate::from_ymd_opt(2024, 1, 10).unwrap(),
        amount: Some(amount),
        category: "other".to_string(),
        payment_method: PaymentMethod::Cash,
        description: Some("Daily sales".to_string()),
        customer_id: None,
    }
}

// ============================================================================
// Category suggestions
// ============================================================================

#[tokio::test]
async fn test_confident_known_label_is_suggested_and_cached() {
    let (url, hits) = prediction_service(prediction("Rent", 0.92)).await;
    let client = client(url);

    let first = client.suggest_expense_category("Office rent January").await;
    let second = client.suggest_expense_category("  office RENT   january ").await;

    assert_eq!(first, Some(ExpenseCategory::Rent));
    assert_eq!(second, Some(ExpenseCategory::Rent));
    assert_eq!(hits.load(Ordering::SeqCst), 1);

    client.clear_cache();
    client.suggest_expense_category("Office rent January").await;
    assert_eq!(hits.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_request_follows_service_contract() {
    let seen: Arc<Mutex<Vec<Value>>> = Arc::default();
    let router = Router::new()
        .route(
            "/predict/category",
            post(
                |State(seen): State<Arc<Mutex<Vec<Value>>>>, Json(body): Json<Value>| async move {
                    seen.lock().unwrap().push(body);
                    Json(prediction("transport", 0.8))
                },
            ),
        )
        .with_state(Arc::clone(&seen));
    let client = client(serve(router).await);

    let suggestion = client.suggest_expense_category("Fuel for delivery van").await;

    assert_eq!(suggestion, Some(ExpenseCategory::Transport));
    let requests = seen.lock().unwrap();
    assert_eq!(requests.len(), 1);
    let item = &requests[0]["transactions"][0];
    assert_eq!(item["description"], "Fuel for delivery van");
    assert!(item["amount"].is_number());
    assert!(item["date"].is_string());
}

#[rstest]
#[case::low_confidence(prediction("rent", 0.4))]
#[case::at_threshold(prediction("rent", 0.6))]
#[case::unknown_label(prediction("groceries", 0.95))]
#[case::no_predictions(json!({ "predictions": [] }))]
#[case::wrong_shape(json!({ "detail": "Not Found" }))]
#[tokio::test]
async fn test_unusable_answers_yield_none(#[case] body: Value) {
    let (url, hits) = prediction_service(body).await;
    let client = client(url);

    assert_eq!(client.suggest_expense_category("Office rent").await, None);
    assert_eq!(hits.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_server_error_yields_none() {
    let router = Router::new().route(
        "/predict/category",
        post(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "model not loaded") }),
    );
    let client = client(serve(router).await);

    assert_eq!(client.suggest_expense_category("Office rent").await, None);
}

#[tokio::test]
async fn test_malformed_body_yields_none() {
    let router = Router::new().route("/predict/category", post(|| async { "not json" }));
    let client = client(serve(router).await);

    assert_eq!(client.suggest_expense_category("Office rent").await, None);
}

#[tokio::test]
async fn test_slow_service_yields_none() {
    let router = Router::new().route(
        "/predict/category",
        post(|| async {
            tokio::time::sleep(Duration::from_secs(3)).await;
            Json(prediction("rent", 0.99))
        }),
    );
    let client = client(serve(router).await);

    assert_eq!(client.suggest_expense_category("Office rent").await, None);
}

#[tokio::test]
async fn test_unreachable_service_yields_none() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    let client = client(format!("http://{addr}"));

    assert_eq!(client.suggest_expense_category("Office rent").await, None);
    assert!(!client.health().await);
}

// ============================================================================
// Forecast & health
// ============================================================================

#[tokio::test]
async fn test_forecast_parses_projection() {
    let seen: Arc<Mutex<Vec<Value>>> = Arc::default();
    let router = Router::new()
        .route(
            "/predict/forecast",
            post(
                |State(seen): State<Arc<Mutex<Vec<Value>>>>, Json(body): Json<Value>| async move {
                    seen.lock().unwrap().push(body);
                    Json(json!({
                        "business_id": "ignored",
                        "income_forecast": [
                            { "ds": "2024-02-01T00:00:00", "yhat": 1200.5, "yhat_lower": 900.0, "yhat_upper": 1500.25 }
                        ],
                        "income_trend": 4.5,
                        "expense_forecast": [],
                        "expense_trend": -2.0,
                        "seasonality": "weekly",
                        "message": "Advanced forecast generated successfully"
                    }))
                },
            ),
        )
        .with_state(Arc::clone(&seen));
    let client = client(serve(router).await);
    let business = BusinessId::new();

    let forecast = client
        .forecast(
            business,
            &[history_row(TransactionKind::Income, dec!(1000))],
            &[history_row(TransactionKind::Expense, dec!(300))],
            30,
        )
        .await
        .unwrap();

    assert_eq!(forecast.income_forecast.len(), 1);
    assert_eq!(forecast.income_forecast[0].yhat, dec!(1200.5));
    assert_eq!(forecast.income_trend, dec!(4.5));
    assert!(forecast.expense_forecast.is_empty());
    assert_eq!(forecast.seasonality, "weekly");

    let requests = seen.lock().unwrap();
    assert_eq!(requests[0]["business_id"], business.to_string());
    assert_eq!(requests[0]["days"], 30);
    assert_eq!(requests[0]["income_history"][0]["date"], "2024-01-10");
}

#[tokio::test]
async fn test_forecast_error_field_yields_none() {
    let router = Router::new().route(
        "/predict/forecast",
        post(|| async {
            Json(json!({ "error": "not enough history", "message": "Failed to generate forecast" }))
        }),
    );
    let client = client(serve(router).await);

    assert!(client.forecast(BusinessId::new(), &[], &[], 30).await.is_none());
}

#[tokio::test]
async fn test_health_check() {
    let router = Router::new().route(
        "/",
        get(|| async { Json(json!({ "status": "healthy", "service": "BizTrack AI Engine" })) }),
    );
    let client = client(serve(router).await);

    assert!(client.health().await);
}
