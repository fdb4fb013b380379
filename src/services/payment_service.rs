use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, Set};
use uuid::Uuid;

use crate::{
    dto::{
        self,
        payments::{PaymentCallbackRequest, PaymentConfirmed},
    },
    entity::payments::{ActiveModel as PaymentActive, Column as PaymentCol, Entity as Payments, Model as PaymentModel},
    error::{AppError, AppResult},
    response::{ApiResponse, codes},
    services::order_client::{OrderClientError, OrderStatusClient},
    state::PaymentState,
};

/// The relay trusts its caller; every recorded payment is complete.
pub const PAYMENT_STATUS_COMPLETED: &str = "completed";

#[derive(Debug, Clone)]
pub struct PaymentConfirmation {
    pub user_id: String,
    pub order_id: String,
    pub payment_method: String,
    pub amount: Option<i64>,
}

pub fn validate_confirmation(payload: PaymentCallbackRequest) -> AppResult<PaymentConfirmation> {
    match (
        dto::present(payload.user_id),
        dto::present(payload.order_id),
        dto::present(payload.payment_method),
    ) {
        (Some(user_id), Some(order_id), Some(payment_method)) => {
            // Order ids are integers in the order store.
            let order_id = order_id
                .trim()
                .parse::<i64>()
                .map_err(|_| AppError::BadRequest(codes::INVALID_ORDER_ID))?;
            Ok(PaymentConfirmation {
                user_id,
                order_id: order_id.to_string(),
                payment_method,
                amount: payload.amount,
            })
        }
        _ => Err(AppError::BadRequest(codes::MISSING_FIELDS)),
    }
}

pub fn new_payment_id() -> String {
    format!("payment-{}", Uuid::new_v4())
}

pub fn new_transaction_id() -> String {
    format!("TXN-{}", Uuid::new_v4().simple()).to_uppercase()
}

/// Step one: the durable write. Nothing downstream is attempted if this fails.
pub async fn record_payment(
    db: &DatabaseConnection,
    confirmation: &PaymentConfirmation,
) -> Result<PaymentModel, DbErr> {
    PaymentActive {
        payment_id: Set(new_payment_id()),
        user_id: Set(confirmation.user_id.clone()),
        order_id: Set(confirmation.order_id.clone()),
        payment_method: Set(confirmation.payment_method.clone()),
        amount: Set(confirmation.amount),
        status: Set(PAYMENT_STATUS_COMPLETED.to_string()),
        transaction_id: Set(new_transaction_id()),
        order_synced: Set(false),
        notify_attempts: Set(0),
        last_notify_error: Set(None),
        created_at: Set(Utc::now().into()),
        synced_at: Set(None),
    }
    .insert(db)
    .await
}

/// Step two: drive the order to `paid` and remember the outcome on the payment.
///
/// The payment is never rolled back. A failed call leaves it unsynced for the
/// reconciliation sweep and is logged at `error` so the gap is visible.
pub async fn notify_order(
    db: &DatabaseConnection,
    orders: &dyn OrderStatusClient,
    payment: &PaymentModel,
) -> Result<(), OrderClientError> {
    match orders.mark_paid(&payment.order_id, &payment.payment_id).await {
        Ok(()) => {
            if let Err(err) = mark_synced(db, &payment.payment_id).await {
                tracing::warn!(
                    payment_id = %payment.payment_id,
                    order_id = %payment.order_id,
                    error = %err,
                    "order marked paid but payment sync flag not saved"
                );
            }
            Ok(())
        }
        Err(err) => {
            tracing::error!(
                payment_id = %payment.payment_id,
                order_id = %payment.order_id,
                attempt = payment.notify_attempts + 1,
                error = %err,
                "payment recorded but order status update failed"
            );
            if let Err(db_err) = record_notify_failure(db, &payment.payment_id, &err).await {
                tracing::warn!(
                    payment_id = %payment.payment_id,
                    error = %db_err,
                    "could not record failed notification"
                );
            }
            Err(err)
        }
    }
}

pub async fn confirm_payment(
    state: &PaymentState,
    payload: PaymentCallbackRequest,
) -> AppResult<ApiResponse<PaymentConfirmed>> {
    let confirmation = validate_confirmation(payload)?;

    let payment = record_payment(&state.orm, &confirmation).await?;
    tracing::info!(
        payment_id = %payment.payment_id,
        order_id = %payment.order_id,
        user_id = %payment.user_id,
        "payment recorded"
    );

    notify_order(&state.orm, state.orders.as_ref(), &payment).await?;

    Ok(ApiResponse::success(PaymentConfirmed {
        payment_id: payment.payment_id,
        status: payment.status,
    }))
}

async fn mark_synced(db: &DatabaseConnection, payment_id: &str) -> Result<(), DbErr> {
    let now: DateTimeWithTimeZone = Utc::now().into();
    Payments::update_many()
        .col_expr(PaymentCol::OrderSynced, Expr::value(true))
        .col_expr(PaymentCol::SyncedAt, Expr::value(now))
        .col_expr(PaymentCol::NotifyAttempts, Expr::col(PaymentCol::NotifyAttempts).add(1))
        .col_expr(PaymentCol::LastNotifyError, Expr::value(Option::<String>::None))
        .filter(PaymentCol::PaymentId.eq(payment_id))
        .exec(db)
        .await?;
    Ok(())
}

async fn record_notify_failure(
    db: &DatabaseConnection,
    payment_id: &str,
    err: &OrderClientError,
) -> Result<(), DbErr> {
    Payments::update_many()
        .col_expr(PaymentCol::NotifyAttempts, Expr::col(PaymentCol::NotifyAttempts).add(1))
        .col_expr(PaymentCol::LastNotifyError, Expr::value(err.to_string()))
        .filter(PaymentCol::PaymentId.eq(payment_id))
        .exec(db)
        .await?;
    Ok(())
}
