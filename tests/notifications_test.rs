//! Event fan-out from order mutations to bus subscribers, including the
//! bulk-close cap and the zero-subscriber case.

mod common;

use axum::http::Method;
use common::{response_json, TestApp};
use serde_json::json;
use tableside_api::events::{OrderEventKind, BULK_EVENT_CAP};

fn order_payload(label: &str) -> serde_json::Value {
    json!({
        "tableName": label,
        "items": [ { "itemCode": "BRG-01", "qty": 1, "price": "450" } ],
        "netTotal": "450",
        "orderType": "Dine In"
    })
}

#[tokio::test]
async fn create_update_close_each_publish_an_event() {
    let app = TestApp::new().await;
    app.seed_settings().await;

    let mut rx = app.state.event_bus.subscribe();

    let response = app
        .request_as_staff(Method::POST, "/api/orders", Some(order_payload("Table 9")))
        .await;
    assert_eq!(response.status(), 200);
    let order_id = response_json(response).await["data"]["orderId"]
        .as_i64()
        .unwrap();

    let event = rx.recv().await.expect("created event");
    assert_eq!(event.kind, OrderEventKind::OrderCreated);
    assert_eq!(event.payload.order_id, order_id);
    assert_eq!(event.payload.table_name.as_deref(), Some("Table 9"));
    assert_eq!(event.payload.user.as_deref(), Some("maria"));
    assert_eq!(event.payload.user_id, Some(app.staff.id));
    assert_eq!(event.payload.order_type.as_deref(), Some("Dine In"));

    let update = json!({
        "orderId": order_id,
        "tableName": "Table 9",
        "items": [ { "itemCode": "BRG-01", "qty": 2, "price": "450" } ],
        "netTotal": "900",
        "orderType": "Dine In"
    });
    let response = app
        .request_as_staff(Method::POST, "/api/orders", Some(update))
        .await;
    assert_eq!(response.status(), 200);

    let event = rx.recv().await.expect("updated event");
    assert_eq!(event.kind, OrderEventKind::OrderUpdated);
    assert_eq!(event.payload.order_id, order_id);

    let response = app
        .request_as_admin(Method::POST, &format!("/api/orders/{}/close", order_id), None)
        .await;
    assert_eq!(response.status(), 200);

    let event = rx.recv().await.expect("closed event");
    assert_eq!(event.kind, OrderEventKind::OrderClosed);
    assert_eq!(event.payload.order_id, order_id);
    assert_eq!(event.payload.user.as_deref(), Some("admin"));
}

#[tokio::test]
async fn close_with_no_subscribers_still_succeeds() {
    let app = TestApp::new().await;
    app.seed_settings().await;

    let response = app
        .request_as_staff(Method::POST, "/api/orders", Some(order_payload("Table 1")))
        .await;
    let order_id = response_json(response).await["data"]["orderId"]
        .as_i64()
        .unwrap();

    assert_eq!(app.state.event_bus.subscriber_count(), 0);

    let response = app
        .request_as_admin(Method::POST, &format!("/api/orders/{}/close", order_id), None)
        .await;
    assert_eq!(response.status(), 200, "publish must never fail the write");
}

#[tokio::test]
async fn small_bulk_close_emits_one_event_per_order() {
    let app = TestApp::new().await;
    app.seed_settings().await;

    let mut ids = Vec::new();
    for n in 0..3 {
        let response = app
            .request_as_staff(
                Method::POST,
                "/api/orders",
                Some(order_payload(&format!("Ticket {n}"))),
            )
            .await;
        ids.push(
            response_json(response).await["data"]["orderId"]
                .as_i64()
                .unwrap(),
        );
    }

    let mut rx = app.state.event_bus.subscribe();

    let response = app
        .request_as_admin(
            Method::POST,
            "/api/sales/bulk",
            Some(json!({ "orderIds": ids })),
        )
        .await;
    assert_eq!(response.status(), 200);

    let mut seen = Vec::new();
    for _ in 0..3 {
        let event = rx.recv().await.expect("closed event");
        assert_eq!(event.kind, OrderEventKind::OrderClosed);
        seen.push(event.payload.order_id);
    }
    seen.sort_unstable();
    let mut expected = ids.clone();
    expected.sort_unstable();
    assert_eq!(seen, expected);
}

#[tokio::test]
async fn oversized_bulk_close_emits_single_refresh_event() {
    let app = TestApp::new().await;
    app.seed_settings().await;

    let mut ids = Vec::new();
    for n in 0..(BULK_EVENT_CAP + 1) {
        let response = app
            .request_as_staff(
                Method::POST,
                "/api/orders",
                Some(order_payload(&format!("Ticket {n}"))),
            )
            .await;
        ids.push(
            response_json(response).await["data"]["orderId"]
                .as_i64()
                .unwrap(),
        );
    }

    let mut rx = app.state.event_bus.subscribe();

    let response = app
        .request_as_admin(
            Method::POST,
            "/api/sales/bulk",
            Some(json!({ "orderIds": ids })),
        )
        .await;
    assert_eq!(response.status(), 200);
    let body = response_json(response).await;
    assert_eq!(
        body["data"]["count"].as_u64(),
        Some((BULK_EVENT_CAP + 1) as u64)
    );

    let event = rx.recv().await.expect("refresh event");
    assert_eq!(event.kind, OrderEventKind::OrderClosed);
    assert_eq!(event.payload.order_id, 0, "0 means refresh everything");

    // And nothing else follows.
    assert!(
        rx.try_recv().is_err(),
        "oversized bulk close collapses to one event"
    );
}

#[tokio::test]
async fn close_all_running_emits_refresh_event() {
    let app = TestApp::new().await;
    app.seed_settings().await;

    for n in 0..2 {
        app.request_as_staff(
            Method::POST,
            "/api/orders",
            Some(order_payload(&format!("Ticket {n}"))),
        )
        .await;
    }

    let mut rx = app.state.event_bus.subscribe();

    let response = app
        .request_as_admin(
            Method::POST,
            "/api/sales/bulk",
            Some(json!({ "closeAllRunning": true })),
        )
        .await;
    assert_eq!(response.status(), 200);

    let event = rx.recv().await.expect("refresh event");
    assert_eq!(event.kind, OrderEventKind::OrderClosed);
    assert_eq!(event.payload.order_id, 0);
}
