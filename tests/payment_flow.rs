mod common;

use std::{
    sync::{
        Arc,
        atomic::{AtomicBool, AtomicUsize, Ordering},
    },
    time::Duration,
};

use async_trait::async_trait;
use axum::{
    Router,
    http::{Method, StatusCode},
    routing::patch,
};
use megapang_api::{
    db::create_orm_conn,
    entity::{
        Payments,
        payments::{Column as PaymentCol, Model as PaymentModel},
    },
    routes::{order_api, payment_relay},
    services::{
        order_client::{HttpOrderClient, OrderClientError, OrderStatusClient},
        reconcile::{ReconcileReport, SWEEP_BATCH, reconcile_pending},
    },
    state::{OrderState, PaymentState},
};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter};
use serde_json::{Value, json};

use crate::common::{call, order_state, payment_db, spawn_server};

async fn create_order(order_app: &Router) -> i64 {
    let (status, body) = call(
        order_app,
        Method::POST,
        "/orders",
        Some(json!({
            "user_id": "u1",
            "items": [{ "id": "p1", "quantity": 2, "price": 5000 }],
            "total_price": 10000,
            "payment_method": "card"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    body["order_id"].as_i64().unwrap()
}

async fn order_status(order_app: &Router, order_id: i64) -> String {
    let (_, body) = call(order_app, Method::GET, &format!("/orders/{order_id}"), None).await;
    body["order"]["status"].as_str().unwrap().to_string()
}

fn callback(order_id: impl ToString) -> Value {
    json!({
        "user_id": "u1",
        "order_id": order_id.to_string(),
        "payment_method": "card",
        "amount": 10000,
        "items": [{ "id": "p1", "quantity": 2 }]
    })
}

async fn only_payment(db: &DatabaseConnection) -> PaymentModel {
    let mut payments = Payments::find().all(db).await.unwrap();
    assert_eq!(payments.len(), 1);
    payments.remove(0)
}

async fn relay_to(base_url: &str, timeout: Duration) -> (Router, DatabaseConnection) {
    let db = payment_db().await;
    let client = HttpOrderClient::new(base_url, timeout).unwrap();
    let app = payment_relay(PaymentState {
        orm: db.clone(),
        orders: Arc::new(client),
    });
    (app, db)
}

#[tokio::test]
async fn confirmed_payment_marks_the_order_paid() {
    let order_app = order_api(order_state().await);
    let base_url = spawn_server(order_app.clone()).await;
    let order_id = create_order(&order_app).await;

    let (relay, payments) = relay_to(&base_url, Duration::from_secs(5)).await;
    let (status, body) = call(&relay, Method::POST, "/callback", Some(callback(order_id))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["status"], "completed");
    let payment_id = body["payment_id"].as_str().unwrap().to_string();

    let payment = Payments::find_by_id(payment_id.clone())
        .one(&payments)
        .await
        .unwrap()
        .expect("payment stored");
    assert_eq!(payment.order_id, order_id.to_string());
    assert_eq!(payment.amount, Some(10000));
    assert_eq!(payment.status, "completed");
    assert!(payment.transaction_id.starts_with("TXN-"));
    assert!(payment.order_synced);
    assert_eq!(payment.notify_attempts, 1);
    assert!(payment.synced_at.is_some());

    assert_eq!(order_status(&order_app, order_id).await, "paid");
}

#[tokio::test]
async fn rejected_order_update_keeps_the_payment() {
    let failing = Router::new().route(
        "/orders/{id}/status",
        patch(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "db down") }),
    );
    let base_url = spawn_server(failing).await;

    let (relay, payments) = relay_to(&base_url, Duration::from_secs(5)).await;
    let (status, body) = call(&relay, Method::POST, "/callback", Some(callback(1))).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "ORDER_UPDATE_FAILED");
    assert!(body["error"].as_str().unwrap().contains("500"));

    let payment = only_payment(&payments).await;
    assert_eq!(payment.status, "completed");
    assert!(!payment.order_synced);
    assert_eq!(payment.notify_attempts, 1);
    assert!(payment.last_notify_error.is_some());
}

#[tokio::test]
async fn unreachable_order_service_keeps_the_payment() {
    // Grab a free port and close it again so nothing is listening there.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let (relay, payments) = relay_to(&format!("http://{addr}"), Duration::from_secs(2)).await;
    let (status, body) = call(&relay, Method::POST, "/callback", Some(callback(1))).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["message"], "ORDER_UPDATE_FAILED");
    assert!(!only_payment(&payments).await.order_synced);
}

#[tokio::test]
async fn hanging_order_service_times_out() {
    let hanging = Router::new().route(
        "/orders/{id}/status",
        patch(|| async {
            tokio::time::sleep(Duration::from_secs(30)).await;
            StatusCode::OK
        }),
    );
    let base_url = spawn_server(hanging).await;

    let (relay, payments) = relay_to(&base_url, Duration::from_millis(200)).await;
    let started = std::time::Instant::now();
    let (status, body) = call(&relay, Method::POST, "/callback", Some(callback(1))).await;

    assert!(started.elapsed() < Duration::from_secs(10));
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["message"], "ORDER_UPDATE_FAILED");
    assert!(!only_payment(&payments).await.order_synced);
}

#[tokio::test]
async fn missing_fields_are_rejected_before_any_write() {
    let (relay, payments) = relay_to("http://127.0.0.1:9", Duration::from_secs(1)).await;

    for payload in [
        json!({ "order_id": "1", "payment_method": "card" }),
        json!({ "user_id": "u1", "payment_method": "card" }),
        json!({ "user_id": "u1", "order_id": "1" }),
        json!({ "user_id": "", "order_id": "1", "payment_method": "card" }),
    ] {
        let (status, body) = call(&relay, Method::POST, "/callback", Some(payload)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "MISSING_FIELDS");
    }

    assert_eq!(Payments::find().count(&payments).await.unwrap(), 0);
}

#[tokio::test]
async fn non_numeric_order_ids_are_rejected_before_any_write() {
    let db = payment_db().await;
    let orders = Arc::new(FlakyOrders::default());
    let relay = payment_relay(PaymentState {
        orm: db.clone(),
        orders: orders.clone(),
    });

    let (status, body) = call(&relay, Method::POST, "/callback", Some(callback("bad0"))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "INVALID_ORDER_ID");

    assert_eq!(Payments::find().count(&db).await.unwrap(), 0);
    assert_eq!(orders.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn failed_payment_write_never_reaches_the_order_service() {
    // No migrations: the payments table does not exist, so the insert fails.
    let db = create_orm_conn("sqlite::memory:").await.unwrap();
    let orders = Arc::new(FlakyOrders::default());
    orders.healthy.store(true, Ordering::SeqCst);
    let relay = payment_relay(PaymentState {
        orm: db,
        orders: orders.clone(),
    });

    let (status, body) = call(&relay, Method::POST, "/callback", Some(callback(1))).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "SERVER_ERROR");
    assert_eq!(orders.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn duplicate_callbacks_record_two_payments() {
    let order_app = order_api(order_state().await);
    let base_url = spawn_server(order_app.clone()).await;
    let order_id = create_order(&order_app).await;

    let (relay, payments) = relay_to(&base_url, Duration::from_secs(5)).await;
    let (_, first) = call(&relay, Method::POST, "/callback", Some(callback(order_id))).await;
    let (_, second) = call(&relay, Method::POST, "/callback", Some(callback(order_id))).await;

    assert_eq!(first["success"], true);
    assert_eq!(second["success"], true);
    assert_ne!(first["payment_id"], second["payment_id"]);
    assert_eq!(Payments::find().count(&payments).await.unwrap(), 2);
    assert_eq!(order_status(&order_app, order_id).await, "paid");
}

/// Order service stand-in that fails until told otherwise.
#[derive(Default)]
struct FlakyOrders {
    healthy: AtomicBool,
    calls: AtomicUsize,
}

#[async_trait]
impl OrderStatusClient for FlakyOrders {
    async fn mark_paid(&self, _order_id: &str, _payment_id: &str) -> Result<(), OrderClientError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.healthy.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(OrderClientError::Rejected {
                status: reqwest::StatusCode::SERVICE_UNAVAILABLE,
                body: "maintenance".into(),
            })
        }
    }
}

#[tokio::test]
async fn reconciliation_sweep_closes_the_gap() {
    let db = payment_db().await;
    let orders = Arc::new(FlakyOrders::default());
    let relay = payment_relay(PaymentState {
        orm: db.clone(),
        orders: orders.clone(),
    });

    let (status, body) = call(&relay, Method::POST, "/callback", Some(callback(5))).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["message"], "ORDER_UPDATE_FAILED");

    // Still failing: the sweep tries again and records the attempt.
    let report = reconcile_pending(&db, orders.as_ref(), Duration::ZERO).await.unwrap();
    assert_eq!(report, ReconcileReport { scanned: 1, synced: 0, failed: 1 });
    assert_eq!(only_payment(&db).await.notify_attempts, 2);

    orders.healthy.store(true, Ordering::SeqCst);
    let report = reconcile_pending(&db, orders.as_ref(), Duration::ZERO).await.unwrap();
    assert_eq!(report, ReconcileReport { scanned: 1, synced: 1, failed: 0 });

    let payment = only_payment(&db).await;
    assert!(payment.order_synced);
    assert!(payment.last_notify_error.is_none());

    // Nothing left to do.
    let report = reconcile_pending(&db, orders.as_ref(), Duration::ZERO).await.unwrap();
    assert_eq!(report, ReconcileReport::default());
    assert_eq!(orders.calls.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn reconciliation_leaves_fresh_payments_alone() {
    let db = payment_db().await;
    let orders = Arc::new(FlakyOrders::default());
    let relay = payment_relay(PaymentState {
        orm: db.clone(),
        orders: orders.clone(),
    });

    call(&relay, Method::POST, "/callback", Some(callback(5))).await;

    let report = reconcile_pending(&db, orders.as_ref(), Duration::from_secs(3600))
        .await
        .unwrap();
    assert_eq!(report, ReconcileReport::default());
    assert_eq!(orders.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn order_state_is_shared_between_the_relay_call_and_reads() {
    // The relay talks to a real order-api over HTTP; a separate handle on the
    // same order store sees the transition.
    let state: OrderState = order_state().await;
    let order_app = order_api(state.clone());
    let base_url = spawn_server(order_app.clone()).await;
    let order_id = create_order(&order_app).await;

    let client = HttpOrderClient::new(&base_url, Duration::from_secs(5)).unwrap();
    client.mark_paid(&order_id.to_string(), "payment-x").await.unwrap();
    client.mark_paid(&order_id.to_string(), "payment-x").await.unwrap();

    let order = megapang_api::entity::Orders::find_by_id(order_id)
        .one(&state.orm)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(order.status, "paid");
}

/// Order service that never accepts orders from `dead_from` upward and only
/// accepts the rest once healthy.
struct PartlyBrokenOrders {
    dead_from: i64,
    healthy: AtomicBool,
}

#[async_trait]
impl OrderStatusClient for PartlyBrokenOrders {
    async fn mark_paid(&self, order_id: &str, _payment_id: &str) -> Result<(), OrderClientError> {
        let dead = order_id.parse::<i64>().map_or(true, |id| id >= self.dead_from);
        if !dead && self.healthy.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(OrderClientError::Rejected {
                status: reqwest::StatusCode::BAD_REQUEST,
                body: "rejected".into(),
            })
        }
    }
}

#[tokio::test]
async fn payments_that_keep_failing_do_not_starve_the_sweep() {
    let db = payment_db().await;
    let orders = Arc::new(PartlyBrokenOrders {
        dead_from: 1000,
        healthy: AtomicBool::new(false),
    });
    let relay = payment_relay(PaymentState {
        orm: db.clone(),
        orders: orders.clone(),
    });

    let stuck = SWEEP_BATCH as i64 + 1;
    for order_id in 1000..1000 + stuck {
        let (status, _) = call(&relay, Method::POST, "/callback", Some(callback(order_id))).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    }
    let (status, _) = call(&relay, Method::POST, "/callback", Some(callback(7))).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);

    orders.healthy.store(true, Ordering::SeqCst);
    let first = reconcile_pending(&db, orders.as_ref(), Duration::ZERO).await.unwrap();
    let second = reconcile_pending(&db, orders.as_ref(), Duration::ZERO).await.unwrap();
    assert_eq!(first.scanned, SWEEP_BATCH as usize);
    assert_eq!(first.synced + second.synced, 1);

    let recovered = Payments::find()
        .filter(PaymentCol::OrderId.eq("7"))
        .one(&db)
        .await
        .unwrap()
        .expect("payment for order 7");
    assert!(recovered.order_synced);

    let still_stuck = Payments::find()
        .filter(PaymentCol::OrderSynced.eq(false))
        .count(&db)
        .await
        .unwrap();
    assert_eq!(still_stuck, stuck as u64);
}
