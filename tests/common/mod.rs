#![allow(dead_code)]

use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use megapang_api::{
    db::{create_orm_conn, run_migrations},
    migration::{CartMigrator, OrderMigrator, PaymentMigrator},
    state::{CartState, OrderState},
};
use sea_orm::DatabaseConnection;
use sea_orm_migration::MigratorTrait;
use serde_json::Value;
use tower::ServiceExt;

/// Fresh in-memory SQLite database with one store's schema applied.
pub async fn memory_db<M: MigratorTrait>() -> DatabaseConnection {
    let orm = create_orm_conn("sqlite::memory:")
        .await
        .expect("open in-memory sqlite");
    run_migrations::<M>(&orm).await.expect("run migrations");
    orm
}

pub async fn order_state() -> OrderState {
    OrderState {
        orm: memory_db::<OrderMigrator>().await,
    }
}

pub async fn cart_state() -> CartState {
    CartState {
        orm: memory_db::<CartMigrator>().await,
    }
}

pub async fn payment_db() -> DatabaseConnection {
    memory_db::<PaymentMigrator>().await
}

/// Drives one request through the router and decodes the JSON body.
pub async fn call(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

pub async fn call_raw(app: &Router, method: Method, uri: &str, raw_body: &str) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(raw_body.to_string()))
        .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

/// Serves `app` on a loopback port and returns its base URL.
pub async fn spawn_server(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}
