use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use chrono::{Duration, Utc};
use http_body_util::BodyExt;
use sea_orm::Database;
use serde_json::{Value, json};
use tower::ServiceExt;

use std::sync::Arc;

use engine::Engine;
use migration::MigratorTrait;

const ADMIN_CODE: &str = "letmein";
const STATIONERY: i64 = 3;

async fn app() -> Router {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder()
        .database(db)
        .admin_code(Some(ADMIN_CODE.to_string()))
        .build()
        .await
        .unwrap();
    server::router(Arc::new(engine))
}

async fn call(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let request = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => request
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => request.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

fn manual(reference: &str, previous: i64, new: i64) -> Value {
    json!({
        "external_reference": reference,
        "previous_balance_minor": previous,
        "new_balance_minor": new,
        "occurred_at": (Utc::now() - Duration::days(1)).to_rfc3339(),
    })
}

#[tokio::test]
async fn withdrawal_is_opened_classified_and_locked() {
    let app = app().await;

    let (status, opened) = call(&app, "POST", "/api/transactions", Some(manual("QK100", 100_000, 50_000))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(opened["delta_minor"], -50_000);
    assert_eq!(opened["fee_minor"], 1_300);
    assert_eq!(opened["remaining_to_classify_minor"], 48_700);
    let id = opened["transaction_id"].as_i64().unwrap();

    let (status, body) = call(&app, "POST", "/api/transactions", Some(manual("QK101", 50_000, 40_000))).await;
    assert_eq!(status, StatusCode::LOCKED);
    assert_eq!(body["open_transaction_id"], id);

    let (status, added) = call(
        &app,
        "POST",
        &format!("/api/transactions/{id}/splits"),
        Some(json!({"splits": [{"category_id": STATIONERY, "amount_minor": 48_700}]})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(added["balanced"], true);

    let (status, balance) = call(&app, "GET", &format!("/api/transactions/{id}/balance"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(balance["remaining_minor"], 0);

    let (status, locked) = call(&app, "POST", &format!("/api/transactions/{id}/lock"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(locked["wallet_balance_minor"], 50_000);

    let (status, system) = call(&app, "GET", "/api/system/status", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(system["is_locked"], false);
    assert_eq!(system["wallet_balance_minor"], 50_000);

    let (_, history) = call(&app, "GET", "/api/wallet/history?limit=5", None).await;
    assert_eq!(history["entries"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn over_allocation_reports_the_ceiling() {
    let app = app().await;
    let (_, opened) = call(&app, "POST", "/api/transactions", Some(manual("QK102", 100_000, 50_000))).await;
    let id = opened["transaction_id"].as_i64().unwrap();

    let (status, body) = call(
        &app,
        "POST",
        &format!("/api/transactions/{id}/splits"),
        Some(json!({"splits": [{"category_id": STATIONERY, "amount_minor": 50_000}]})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["max_allowed_minor"], 48_700);
    assert_eq!(body["current_total_minor"], 0);
    assert_eq!(body["attempted_minor"], 50_000);

    let (status, body) = call(&app, "POST", &format!("/api/transactions/{id}/lock"), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["remaining_minor"], 48_700);
}

#[tokio::test]
async fn fee_split_is_listed_with_the_open_transaction() {
    let app = app().await;
    call(&app, "POST", "/api/transactions", Some(manual("QK103", 100_000, 50_000))).await;

    let (status, body) = call(&app, "GET", "/api/transactions/open", None).await;
    assert_eq!(status, StatusCode::OK);
    let open = &body["open_transaction"];
    assert_eq!(open["transaction"]["status"], "OPEN");
    assert_eq!(open["splits"][0]["is_fee"], true);
    assert_eq!(open["splits"][0]["category_name"], "M-Pesa Fees");

    let fee_split = open["splits"][0]["id"].as_i64().unwrap();
    let (status, _) = call(&app, "DELETE", &format!("/api/transactions/splits/{fee_split}"), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn no_open_transaction_is_null() {
    let app = app().await;
    let (status, body) = call(&app, "GET", "/api/transactions/open", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["open_transaction"], Value::Null);
}

#[tokio::test]
async fn unknown_transaction_is_not_found() {
    let app = app().await;
    let (status, _) = call(&app, "GET", "/api/transactions/999/balance", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn duplicate_reference_conflicts() {
    let app = app().await;
    let (_, opened) = call(&app, "POST", "/api/transactions", Some(manual("QK104", 100_000, 50_000))).await;

    let (status, body) = call(&app, "POST", "/api/transactions", Some(manual("QK104", 100_000, 50_000))).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["existing_transaction_id"], opened["transaction_id"]);
}

#[tokio::test]
async fn force_unlock_requires_the_admin_code() {
    let app = app().await;
    call(&app, "POST", "/api/transactions", Some(manual("QK105", 100_000, 50_000))).await;

    let (status, _) = call(
        &app,
        "POST",
        "/api/system/force-unlock",
        Some(json!({"reason": "stuck", "admin_code": "nope"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, receipt) = call(
        &app,
        "POST",
        "/api/system/force-unlock",
        Some(json!({"reason": "stuck", "admin_code": ADMIN_CODE})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(receipt["external_reference"], "QK105");

    let (_, system) = call(&app, "GET", "/api/system/status", None).await;
    assert_eq!(system["is_locked"], false);
}

#[tokio::test]
async fn daraja_withdrawal_opens_a_webhook_transaction() {
    let app = app().await;
    let (status, _) = call(&app, "POST", "/api/wallet/sync", Some(json!({"balance_minor": 100_000}))).await;
    assert_eq!(status, StatusCode::OK);

    let callback = json!({
        "Result": {
            "ResultType": "Withdrawal",
            "ResultCode": 0,
            "ResultDesc": "The service request is processed successfully.",
            "TransactionID": "OEI2AK4Q16",
            "MpesaReceiptNumber": "RCPT300",
            "TransactionAmount": "500.00",
            "TransactionDate": "20261018143000",
        }
    });
    let (status, ack) = call(&app, "POST", "/api/daraja/callback", Some(callback)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ack["ResultCode"], 0);

    let (_, body) = call(&app, "GET", "/api/transactions/open", None).await;
    let tx = &body["open_transaction"]["transaction"];
    assert_eq!(tx["id"], ack["TransactionID"]);
    assert_eq!(tx["source"], "WEBHOOK");
    assert_eq!(tx["provider_reference"], "RCPT300");
    assert_eq!(tx["previous_balance_minor"], 100_000);
    assert_eq!(tx["new_balance_minor"], 50_000);
}

#[tokio::test]
async fn daraja_failure_result_is_rejected() {
    let app = app().await;
    let callback = json!({
        "Result": {
            "ResultType": "Deposit",
            "ResultCode": 2001,
            "ResultDesc": "The initiator information is invalid.",
            "TransactionID": "OEI2AK4Q17",
            "TransactionAmount": 500,
            "TransactionDate": "20261018143000",
        }
    });
    let (status, _) = call(&app, "POST", "/api/daraja/callback", Some(callback)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, list) = call(&app, "GET", "/api/transactions", None).await;
    assert!(list["transactions"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn categories_are_served_as_tree_and_dropdown() {
    let app = app().await;

    let (status, tree) = call(&app, "GET", "/api/categories", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(tree.as_array().unwrap().len(), 7);

    let (_, options) = call(&app, "GET", "/api/categories/dropdown", None).await;
    let options = options.as_array().unwrap();
    assert_eq!(options.len(), 17);
    assert!(options.iter().all(|o| o["name"] != "M-Pesa Fees"));

    let (status, stats) = call(&app, "GET", "/api/categories/stats", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(stats.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn health_and_wallet_are_reported() {
    let app = app().await;

    let (status, health) = call(&app, "GET", "/api/system/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(health["status"], "ok");

    let (status, wallet) = call(&app, "GET", "/api/wallet", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(wallet["balance_minor"], 0);
    assert!(wallet["recent_transactions"].as_array().unwrap().is_empty());
}
