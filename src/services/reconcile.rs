//! Background sweep that closes the payment/order inconsistency window.
//!
//! Payments whose `paid` notification never got through are re-sent on a
//! fixed cadence. Marking an order paid twice is harmless, so a payment that
//! was synced but whose flag failed to save is simply sent again. Payments
//! with the fewest attempts go first, so rows that keep failing cannot starve
//! the ones behind them.

use std::time::Duration;

use chrono::{TimeDelta, Utc};
use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::{ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, QueryOrder, QuerySelect};
use serde::Serialize;
use tokio::task::JoinHandle;

use crate::{
    entity::payments::{Column as PaymentCol, Entity as Payments},
    services::{order_client::OrderStatusClient, payment_service::notify_order},
    state::PaymentState,
};

/// Payments retried per sweep.
pub const SWEEP_BATCH: u64 = 100;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ReconcileReport {
    pub scanned: usize,
    pub synced: usize,
    pub failed: usize,
}

/// One pass over unsynced payments at least `grace` old, least attempted first.
pub async fn reconcile_pending(
    db: &DatabaseConnection,
    orders: &dyn OrderStatusClient,
    grace: Duration,
) -> Result<ReconcileReport, DbErr> {
    let grace = TimeDelta::from_std(grace).unwrap_or(TimeDelta::zero());
    let cutoff: DateTimeWithTimeZone = (Utc::now() - grace).into();

    let pending = Payments::find()
        .filter(PaymentCol::OrderSynced.eq(false))
        .filter(PaymentCol::CreatedAt.lte(cutoff))
        .order_by_asc(PaymentCol::NotifyAttempts)
        .order_by_asc(PaymentCol::CreatedAt)
        .limit(SWEEP_BATCH)
        .all(db)
        .await?;

    let mut report = ReconcileReport {
        scanned: pending.len(),
        ..Default::default()
    };
    for payment in &pending {
        match notify_order(db, orders, payment).await {
            Ok(()) => {
                tracing::info!(
                    payment_id = %payment.payment_id,
                    order_id = %payment.order_id,
                    "reconciled payment with order"
                );
                report.synced += 1;
            }
            Err(_) => report.failed += 1,
        }
    }

    Ok(report)
}

pub fn spawn_reconciler(state: PaymentState, every: Duration, grace: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            match reconcile_pending(&state.orm, state.orders.as_ref(), grace).await {
                Ok(report) if report.scanned > 0 => {
                    tracing::info!(
                        scanned = report.scanned,
                        synced = report.synced,
                        failed = report.failed,
                        "reconciliation sweep finished"
                    );
                }
                Ok(_) => tracing::debug!("reconciliation sweep found nothing to do"),
                Err(err) => tracing::error!(error = %err, "reconciliation sweep failed"),
            }
        }
    })
}
