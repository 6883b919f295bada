mod common;

use axum::http::{Method, StatusCode};
use common::*;
use serde_json::json;
use solpay_gateway::error::GatewayError;

#[tokio::test]
async fn append_for_unknown_account_is_not_found() {
    let app = TestApp::new().await;

    let err = app
        .db
        .transactions()
        .append("nobody", "payment_failed", None)
        .await
        .unwrap_err();

    assert!(matches!(err, GatewayError::NotFound(_)));
}

#[tokio::test]
async fn list_is_scoped_ordered_and_paginated() {
    let app = TestApp::new().await;
    app.login_as("alice").await;
    app.login_as("bob").await;
    let log = app.db.transactions();

    for i in 0..5 {
        log.append("alice", "note", Some(format!("a{}", i))).await.unwrap();
        log.append("bob", "note", Some(format!("b{}", i))).await.unwrap();
    }

    let all = log.list("alice", 0, 100).await.unwrap();
    assert_eq!(all.len(), 5);
    assert!(all.iter().all(|t| t.username == "alice"));
    assert!(all.windows(2).all(|w| w[0].transaction_id < w[1].transaction_id));

    let page = log.list("alice", 1, 2).await.unwrap();
    let details: Vec<_> = page
        .iter()
        .map(|t| t.transaction_details.clone().unwrap())
        .collect();
    assert_eq!(details, vec!["a1", "a2"]);

    assert_eq!(log.list("alice", 10, 100).await.unwrap().len(), 0);
}

#[tokio::test]
async fn get_checks_existence_then_ownership() {
    let app = TestApp::new().await;
    app.login_as("alice").await;
    app.login_as("bob").await;
    let log = app.db.transactions();

    let row = log.append("bob", "note", None).await.unwrap();

    let own = log.get(row.transaction_id, "bob").await.unwrap();
    assert_eq!(own.transaction_id, row.transaction_id);

    let err = log.get(row.transaction_id, "alice").await.unwrap_err();
    assert!(matches!(err, GatewayError::Forbidden(_)));

    let err = log.get(row.transaction_id + 100, "alice").await.unwrap_err();
    assert!(matches!(err, GatewayError::NotFound(_)));
}

#[tokio::test]
async fn history_endpoints_enforce_ownership() {
    let app = TestApp::new().await;
    let alice = app.login_as("alice").await;
    let bob = app.login_as("bob").await;

    let (status, created) = app
        .post(
            "/api/transactions",
            &bob,
            json!({ "transaction_type": "refund_requested", "transaction_details": "order 9" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(created["username"], "bob");
    let id = created["transaction_id"].as_i64().unwrap();

    let (status, body) = app.get(&format!("/api/transactions/{}", id), &bob).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["transaction_type"], "refund_requested");
    assert_eq!(body["transaction_details"], "order 9");

    let (status, body) = app.get(&format!("/api/transactions/{}", id), &alice).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error_code"], "FORBIDDEN");

    let (status, _) = app.get("/api/transactions/9999", &alice).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = app.get("/api/transactions", &alice).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));

    let (status, body) = app.get("/api/transactions?skip=0&limit=10", &bob).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn checkout_rows_show_up_in_history() {
    let app = TestApp::new().await;
    let token = app.login_as("alice").await;

    app.post(
        "/api/checkout/payment-url",
        &token,
        json!({ "recipient": MERCHANT, "amount": 0.75, "memo": "inv-1" }),
    )
    .await;
    app.post(
        "/api/checkout/verify-payment",
        &token,
        json!({ "signature": SIGNATURE, "expected_recipient": MERCHANT, "expected_amount": 0.75 }),
    )
    .await;

    let (status, body) = app.get("/api/transactions", &token).await;
    assert_eq!(status, StatusCode::OK);
    let types: Vec<_> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["transaction_type"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(types, vec!["payment_url_generated", "payment_failed"]);
}

#[tokio::test]
async fn empty_transaction_type_is_rejected() {
    let app = TestApp::new().await;
    let token = app.login_as("alice").await;

    let (status, _) = app
        .post("/api/transactions", &token, json!({ "transaction_type": " " }))
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn health_and_root_are_public() {
    let app = TestApp::new().await;

    let (status, body) = app.request(Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["database"], true);
    assert_eq!(body["solana_rpc"], true);
    assert_eq!(body["redis"], false);

    let (status, body) = app.request(Method::GET, "/", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["message"].as_str().unwrap().contains("solpay-gateway"));
}

#[tokio::test]
async fn health_degrades_when_rpc_is_down() {
    let app = TestApp::with_ledger(FakeLedger::unreachable()).await;

    let (_, body) = app.request(Method::GET, "/health", None, None).await;
    assert_eq!(body["status"], "degraded");
}

#[tokio::test]
async fn malformed_query_and_path_get_the_json_error_envelope() {
    let app = TestApp::new().await;
    let token = app.login_as("alice").await;

    for uri in ["/api/transactions?skip=-1", "/api/transactions/abc"] {
        let (status, body) = app.get(uri, &token).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{}", uri);
        assert_eq!(body["success"], false);
        assert_eq!(body["error_code"], "VALIDATION_ERROR");
    }
}
