use axum::{
    Json, Router,
    extract::{Path, State, rejection::JsonRejection},
    routing::{get, patch},
};

use crate::{
    dto::orders::{CreateOrderRequest, OrderCreated, OrderList, OrderWithItems, UpdateStatusRequest},
    error::AppResult,
    response::{ApiResponse, Empty, ErrorResponse},
    services::order_service,
    state::OrderState,
};

pub fn router() -> Router<OrderState> {
    Router::new()
        .route("/orders", get(list_orders).post(create_order))
        .route("/orders/user/{user_id}", get(list_user_orders))
        .route("/orders/{id}", get(get_order))
        .route("/orders/{id}/status", patch(update_order_status))
}

#[utoipa::path(
    get,
    path = "/orders",
    responses(
        (status = 200, description = "Every order, newest first", body = ApiResponse<OrderList>),
        (status = 500, description = "Storage failure", body = ErrorResponse),
    ),
    tag = "Orders"
)]
pub async fn list_orders(State(state): State<OrderState>) -> AppResult<Json<ApiResponse<OrderList>>> {
    let resp = order_service::list_orders(&state, None).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/orders/user/{user_id}",
    params(
        ("user_id" = String, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "Orders of one user, newest first", body = ApiResponse<OrderList>),
        (status = 500, description = "Storage failure", body = ErrorResponse),
    ),
    tag = "Orders"
)]
pub async fn list_user_orders(
    State(state): State<OrderState>,
    Path(user_id): Path<String>,
) -> AppResult<Json<ApiResponse<OrderList>>> {
    let resp = order_service::list_orders(&state, Some(&user_id)).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/orders",
    request_body = CreateOrderRequest,
    responses(
        (status = 200, description = "Order and all of its lines written", body = ApiResponse<OrderCreated>),
        (status = 400, description = "Missing user, empty order or bad quantity", body = ErrorResponse),
        (status = 500, description = "Nothing was written", body = ErrorResponse),
    ),
    tag = "Orders"
)]
pub async fn create_order(
    State(state): State<OrderState>,
    payload: Result<Json<CreateOrderRequest>, JsonRejection>,
) -> AppResult<Json<ApiResponse<OrderCreated>>> {
    let Json(payload) = payload?;
    let resp = order_service::create_order(&state, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/orders/{id}",
    params(
        ("id" = i64, Path, description = "Order ID")
    ),
    responses(
        (status = 200, description = "Order with its lines", body = ApiResponse<OrderWithItems>),
        (status = 400, description = "Malformed order id", body = ErrorResponse),
        (status = 404, description = "No such order", body = ErrorResponse),
    ),
    tag = "Orders"
)]
pub async fn get_order(
    State(state): State<OrderState>,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<OrderWithItems>>> {
    let resp = order_service::get_order(&state, &id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    patch,
    path = "/orders/{id}/status",
    params(
        ("id" = i64, Path, description = "Order ID")
    ),
    request_body = UpdateStatusRequest,
    responses(
        (status = 200, description = "Status written", body = ApiResponse<Empty>),
        (status = 400, description = "Missing status or malformed id", body = ErrorResponse),
        (status = 500, description = "Storage failure", body = ErrorResponse),
    ),
    tag = "Orders"
)]
pub async fn update_order_status(
    State(state): State<OrderState>,
    Path(id): Path<String>,
    payload: Result<Json<UpdateStatusRequest>, JsonRejection>,
) -> AppResult<Json<ApiResponse<Empty>>> {
    let Json(payload) = payload?;
    let resp = order_service::update_status(&state, &id, payload).await?;
    Ok(Json(resp))
}
