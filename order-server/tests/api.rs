//! Router-level tests through `tower::ServiceExt::oneshot`

mod common;

use axum::Router;
use axum::body::{Body, to_bytes};
use common::setup;
use http::{Method, Request, StatusCode};
use order_server::core::server::router;
use serde_json::{Value, json};
use shared::models::PaymentMethod;
use tower::ServiceExt;

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            builder = builder.header("content-type", "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };
    let response = app
        .clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

#[tokio::test]
async fn test_health() {
    let app = setup().await;
    let router = router(app.state.clone());

    let (status, body) = send(&router, Method::GET, "/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["database"], "ok");
}

#[tokio::test]
async fn test_scan_then_order_flow() {
    let app = setup().await;
    let router = router(app.state.clone());

    let (status, session) = send(
        &router,
        Method::POST,
        "/customer/session",
        Some(json!({ "tableNumber": 5 })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(session["tableNumber"], 5);
    let session_id = session["sessionId"].as_str().unwrap().to_string();

    let (status, placed) = send(
        &router,
        Method::POST,
        "/customer/order",
        Some(json!({
            "customerName": "Ana",
            "tableNumber": 5,
            "items": [{"id": 1, "qty": 2, "price": 1}, {"id": 2, "qty": 1, "price": 1}],
            "paymentMethod": "cash",
            "totalPrice": 2,
            "sessionId": session_id,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(placed["order"]["totalPrice"], 55_000);
    assert_eq!(placed["order"]["status"], "PENDING");
    assert!(placed.get("snapToken").is_none());

    let order_id = placed["order"]["id"].as_i64().unwrap();
    let (status, order) = send(&router, Method::GET, &format!("/customer/order/{order_id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(order["items"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_qris_order_returns_token() {
    let app = setup().await;
    let router = router(app.state.clone());
    let session = app.session(5).await;

    let (status, placed) = send(
        &router,
        Method::POST,
        "/customer/order",
        Some(json!({
            "customerName": "Budi",
            "tableNumber": 5,
            "items": [{"id": 1, "qty": 1}],
            "paymentMethod": "qris",
            "sessionId": session.id,
        })),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(placed["snapToken"], "snap-token-1");
    assert_eq!(placed["order"]["paymentMethod"], "NONCASH");
}

#[tokio::test]
async fn test_table_mismatch_is_forbidden() {
    let app = setup().await;
    let router = router(app.state.clone());
    let session = app.session(3).await;

    let (status, body) = send(
        &router,
        Method::POST,
        "/customer/order",
        Some(json!({
            "customerName": "Ana",
            "tableNumber": 7,
            "items": [{"id": 1, "qty": 1}],
            "paymentMethod": "cash",
            "sessionId": session.id,
        })),
    )
    .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], 7006);
    assert_eq!(app.count("orders").await, 0);
}

#[tokio::test]
async fn test_unknown_payment_method_is_bad_request() {
    let app = setup().await;
    let router = router(app.state.clone());
    let session = app.session(5).await;

    let (status, _) = send(
        &router,
        Method::POST,
        "/customer/order",
        Some(json!({
            "customerName": "Ana",
            "tableNumber": 5,
            "items": [{"id": 1, "qty": 1}],
            "paymentMethod": "bitcoin",
            "sessionId": session.id,
        })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_unavailable_menu_is_unprocessable_without_ids() {
    let app = setup().await;
    let router = router(app.state.clone());
    let session = app.session(5).await;

    let (status, body) = send(
        &router,
        Method::POST,
        "/customer/order",
        Some(json!({
            "customerName": "Ana",
            "tableNumber": 5,
            "items": [{"id": 3, "qty": 1}],
            "paymentMethod": "cash",
            "sessionId": session.id,
        })),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["code"], 6003);
    assert!(body.get("details").is_none());
}

#[tokio::test]
async fn test_admin_status_update_and_invalid_transition() {
    let app = setup().await;
    let router = router(app.state.clone());
    let order_id = app.place_order(5, PaymentMethod::Cash).await;
    let uri = format!("/admin/orders/{order_id}/status");

    let (status, body) = send(&router, Method::PATCH, &uri, Some(json!({ "status": "PREPARING" }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "PREPARING");

    let (status, body) = send(&router, Method::PATCH, &uri, Some(json!({ "status": "PENDING" }))).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], 4009);

    let (status, _) = send(&router, Method::PATCH, &uri, Some(json!({ "status": "SERVED" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_admin_list_filters_by_status() {
    let app = setup().await;
    let router = router(app.state.clone());
    let first = app.place_order(5, PaymentMethod::Cash).await;
    app.place_order(3, PaymentMethod::Cash).await;
    app.set_status(first, "DONE").await;

    let (status, body) = send(&router, Method::GET, "/admin/orders?status=done", None).await;
    assert_eq!(status, StatusCode::OK);
    let orders = body.as_array().unwrap();
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0]["id"], first);

    let (status, _) = send(&router, Method::GET, "/admin/orders?status=lost", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_payment_webhook() {
    let app = setup().await;
    let router = router(app.state.clone());
    let order_id = app.place_order(5, PaymentMethod::NonCash).await;
    let payload = common::notification(&format!("ORDER-{order_id}-1699999999"), "settlement", None);

    let (status, body) = send(&router, Method::POST, "/payment/notification", Some(payload.clone())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["result"], "applied");

    let (status, body) = send(&router, Method::POST, "/payment/notification", Some(payload)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["result"], "duplicate");

    let (_, order) = send(&router, Method::GET, &format!("/customer/order/{order_id}"), None).await;
    assert_eq!(order["paymentStatus"], "PAID");
    assert_eq!(order["status"], "PREPARING");
}

#[tokio::test]
async fn test_payment_webhook_rejects_bad_input() {
    let app = setup().await;
    let router = router(app.state.clone());

    let (status, _) = send(
        &router,
        Method::POST,
        "/payment/notification",
        Some(common::notification("ORDER-x-1", "settlement", None)),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let mut forged = common::notification("ORDER-1-1", "settlement", None);
    forged["signature_key"] = "bad".into();
    let (status, _) = send(&router, Method::POST, "/payment/notification", Some(forged)).await;
    assert!(status.is_client_error());

    let request = Request::builder()
        .method(Method::POST)
        .uri("/payment/notification")
        .body(Body::from("not json"))
        .unwrap();
    let response = router.clone().oneshot(request).await.unwrap();
    assert!(response.status().is_client_error());
}
