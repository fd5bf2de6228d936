mod common;

use common::{ES_TEH, NASI_GORENG, SATE_SOLD_OUT, cart, order_command, setup};
use order_server::db::repository::order::{NewOrder, NewOrderItem};
use order_server::db::repository::{dining_table, order};
use order_server::orders::OrderError;
use order_server::payment::parse_reference;
use shared::models::{OrderStatus, PaymentMethod, PaymentStatus};

#[tokio::test]
async fn test_total_is_recomputed_from_catalog() {
    let app = setup().await;
    let session = app.session(5).await;

    // client claims price 1 per item and total 2
    let placed = app
        .state
        .intake
        .create_order(order_command(
            5,
            Some(session.id),
            vec![cart(NASI_GORENG, 2), cart(ES_TEH, 1)],
            PaymentMethod::Cash,
        ))
        .await
        .unwrap();

    let order = &placed.order.order;
    assert_eq!(order.total_price, 55_000);
    assert_eq!(order.table_number, 5);
    assert_eq!(order.status, OrderStatus::Pending);
    assert_eq!(order.payment_status, PaymentStatus::Unpaid);
    assert_eq!(order.payment_method, PaymentMethod::Cash);

    let items = &placed.order.items;
    assert_eq!(items.len(), 2);
    assert_eq!(items[0].price, 25_000);
    assert_eq!(items[0].menu_name, "Nasi Goreng");
    assert_eq!(items[1].price, 5_000);
    let sum: i64 = items.iter().map(|i| i.line_total()).sum();
    assert_eq!(sum, order.total_price);

    // cash orders never touch the gateway
    assert!(placed.snap_token.is_none());
    assert!(app.gateway.requests().is_empty());
}

#[tokio::test]
async fn test_missing_session() {
    let app = setup().await;

    let err = app
        .state
        .intake
        .create_order(order_command(5, None, vec![cart(NASI_GORENG, 1)], PaymentMethod::Cash))
        .await
        .unwrap_err();

    assert!(matches!(err, OrderError::MissingSession));
    assert_eq!(app.count("orders").await, 0);
}

#[tokio::test]
async fn test_session_for_other_table_never_creates_order() {
    let app = setup().await;
    let session = app.session(3).await;

    let err = app
        .state
        .intake
        .create_order(order_command(
            7,
            Some(session.id),
            vec![cart(NASI_GORENG, 1)],
            PaymentMethod::Cash,
        ))
        .await
        .unwrap_err();

    assert!(matches!(err, OrderError::TableMismatch { .. }));
    assert_eq!(app.count("orders").await, 0);
}

#[tokio::test]
async fn test_expired_session_rejected() {
    let app = setup().await;
    let session = app.session(5).await;
    app.age_session(&session.id, 4 * 60 * 60 * 1000 + 1).await;

    let err = app
        .state
        .intake
        .create_order(order_command(
            5,
            Some(session.id),
            vec![cart(NASI_GORENG, 1)],
            PaymentMethod::Cash,
        ))
        .await
        .unwrap_err();

    assert!(matches!(err, OrderError::SessionExpired));
    assert_eq!(app.count("orders").await, 0);
}

#[tokio::test]
async fn test_empty_cart() {
    let app = setup().await;
    let session = app.session(5).await;

    let err = app
        .state
        .intake
        .create_order(order_command(5, Some(session.id), vec![], PaymentMethod::Cash))
        .await
        .unwrap_err();

    assert!(matches!(err, OrderError::EmptyOrder));
    assert_eq!(app.count("orders").await, 0);
    assert_eq!(app.count("order_item").await, 0);
}

#[tokio::test]
async fn test_session_checked_before_cart() {
    let app = setup().await;

    let err = app
        .state
        .intake
        .create_order(order_command(
            5,
            Some("forged".into()),
            vec![],
            PaymentMethod::Cash,
        ))
        .await
        .unwrap_err();

    assert!(matches!(err, OrderError::InvalidSession));
}

#[tokio::test]
async fn test_non_positive_quantity() {
    let app = setup().await;
    let session = app.session(5).await;

    let err = app
        .state
        .intake
        .create_order(order_command(
            5,
            Some(session.id),
            vec![cart(NASI_GORENG, 1), cart(ES_TEH, 0)],
            PaymentMethod::Cash,
        ))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        OrderError::InvalidQuantity {
            menu_id: ES_TEH,
            quantity: 0
        }
    ));
    assert_eq!(app.count("orders").await, 0);
}

#[tokio::test]
async fn test_unavailable_and_unknown_menus() {
    let app = setup().await;
    let session = app.session(5).await;

    let err = app
        .state
        .intake
        .create_order(order_command(
            5,
            Some(session.id),
            vec![cart(NASI_GORENG, 1), cart(SATE_SOLD_OUT, 1), cart(99, 1)],
            PaymentMethod::Cash,
        ))
        .await
        .unwrap_err();

    match err {
        OrderError::MenuUnavailable(ids) => assert_eq!(ids, vec![SATE_SOLD_OUT, 99]),
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(app.count("orders").await, 0);
}

#[tokio::test]
async fn test_duplicate_menu_lines_rejected() {
    let app = setup().await;
    let session = app.session(5).await;

    let err = app
        .state
        .intake
        .create_order(order_command(
            5,
            Some(session.id),
            vec![cart(NASI_GORENG, 1), cart(NASI_GORENG, 2)],
            PaymentMethod::Cash,
        ))
        .await
        .unwrap_err();

    match err {
        OrderError::MenuUnavailable(ids) => assert_eq!(ids, vec![NASI_GORENG]),
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(app.count("orders").await, 0);
}

#[tokio::test]
async fn test_qris_order_gets_token() {
    let app = setup().await;
    let session = app.session(5).await;

    let placed = app
        .state
        .intake
        .create_order(order_command(
            5,
            Some(session.id),
            vec![cart(NASI_GORENG, 2), cart(ES_TEH, 1)],
            PaymentMethod::NonCash,
        ))
        .await
        .unwrap();

    assert_eq!(placed.snap_token.as_deref(), Some("snap-token-1"));
    assert!(placed.payment_error.is_none());

    let requests = app.gateway.requests();
    assert_eq!(requests.len(), 1);
    let descriptor = &requests[0];
    assert_eq!(
        parse_reference("ORDER", &descriptor.external_ref),
        Some(placed.order.order.id)
    );
    assert_eq!(descriptor.gross_amount, 55_000);
    assert_eq!(descriptor.customer_name, "Ana");
    let items_total: i64 = descriptor.items.iter().map(|i| i.price * i.quantity).sum();
    assert_eq!(items_total, descriptor.gross_amount);
}

#[tokio::test]
async fn test_gateway_failure_keeps_order() {
    let app = setup().await;
    app.gateway.set_failing(true);
    let session = app.session(5).await;

    let placed = app
        .state
        .intake
        .create_order(order_command(
            5,
            Some(session.id),
            vec![cart(NASI_GORENG, 1)],
            PaymentMethod::NonCash,
        ))
        .await
        .unwrap();

    assert!(placed.snap_token.is_none());
    assert!(placed.payment_error.is_some());

    let stored = app
        .state
        .lifecycle
        .get_order(placed.order.order.id)
        .await
        .unwrap();
    assert_eq!(stored.order.status, OrderStatus::Pending);
    assert_eq!(stored.order.payment_status, PaymentStatus::Unpaid);
    assert_eq!(stored.items.len(), 1);

    // pay later
    app.gateway.set_failing(false);
    let token = app
        .state
        .intake
        .request_payment_token(placed.order.order.id)
        .await
        .unwrap();
    assert_eq!(token.token, "snap-token-1");
}

#[tokio::test]
async fn test_retry_token_uses_fresh_reference() {
    let app = setup().await;
    let order_id = app.place_order(5, PaymentMethod::NonCash).await;

    tokio::time::sleep(std::time::Duration::from_millis(2)).await;
    app.state.intake.request_payment_token(order_id).await.unwrap();

    let requests = app.gateway.requests();
    assert_eq!(requests.len(), 2);
    assert_ne!(requests[0].external_ref, requests[1].external_ref);
    assert_eq!(parse_reference("ORDER", &requests[1].external_ref), Some(order_id));
}

#[tokio::test]
async fn test_retry_token_rules() {
    let app = setup().await;

    let cash = app.place_order(5, PaymentMethod::Cash).await;
    assert!(matches!(
        app.state.intake.request_payment_token(cash).await.unwrap_err(),
        OrderError::PaymentNotRequired(_)
    ));

    let canceled = app.place_order(5, PaymentMethod::NonCash).await;
    app.set_status(canceled, "CANCELED").await;
    assert!(matches!(
        app.state.intake.request_payment_token(canceled).await.unwrap_err(),
        OrderError::OrderCanceled(_)
    ));

    assert!(matches!(
        app.state.intake.request_payment_token(9_999).await.unwrap_err(),
        OrderError::OrderNotFound(9_999)
    ));
}

#[tokio::test]
async fn test_item_insert_failure_rolls_back_header() {
    let app = setup().await;
    let table = dining_table::find_by_number(app.pool(), 5)
        .await
        .unwrap()
        .unwrap();

    // second line references a menu row that does not exist
    let new_order = NewOrder {
        customer_name: "Ana".into(),
        table_id: table.id,
        total_price: 25_000,
        payment_method: PaymentMethod::Cash,
        items: vec![
            NewOrderItem {
                menu_id: NASI_GORENG,
                quantity: 1,
                price: 25_000,
                note: None,
            },
            NewOrderItem {
                menu_id: 9_999,
                quantity: 1,
                price: 0,
                note: None,
            },
        ],
    };

    let result = order::create_with_items(app.pool(), &new_order, shared::util::now_millis()).await;

    assert!(result.is_err());
    assert_eq!(app.count("orders").await, 0);
    assert_eq!(app.count("order_item").await, 0);
}
