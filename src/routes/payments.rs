use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    routing::post,
};

use crate::{
    dto::payments::{PaymentCallbackRequest, PaymentConfirmed},
    error::AppResult,
    response::{ApiResponse, ErrorResponse},
    services::payment_service,
    state::PaymentState,
};

pub fn router() -> Router<PaymentState> {
    Router::new().route("/callback", post(payment_callback))
}

#[utoipa::path(
    post,
    path = "/callback",
    request_body = PaymentCallbackRequest,
    responses(
        (status = 200, description = "Payment recorded and order marked paid", body = ApiResponse<PaymentConfirmed>),
        (status = 400, description = "user_id, order_id or payment_method missing", body = ErrorResponse),
        (status = 500, description = "SERVER_ERROR: nothing recorded. ORDER_UPDATE_FAILED: payment recorded, order not yet paid", body = ErrorResponse),
    ),
    tag = "Payments"
)]
pub async fn payment_callback(
    State(state): State<PaymentState>,
    payload: Result<Json<PaymentCallbackRequest>, JsonRejection>,
) -> AppResult<Json<ApiResponse<PaymentConfirmed>>> {
    let Json(payload) = payload?;
    let resp = payment_service::confirm_payment(&state, payload).await?;
    Ok(Json(resp))
}
