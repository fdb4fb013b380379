use std::sync::Arc;

use megapang_api::{
    config::PaymentRelayConfig,
    db::{create_orm_conn, run_migrations},
    migration::PaymentMigrator,
    routes::payment_relay,
    server::{init_tracing, serve},
    services::{order_client::HttpOrderClient, reconcile::spawn_reconciler},
    state::PaymentState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = PaymentRelayConfig::from_env()?;
    let orm = create_orm_conn(&config.database_url).await?;
    run_migrations::<PaymentMigrator>(&orm).await?;

    let orders = HttpOrderClient::new(&config.order_api_url, config.order_api_timeout)?;
    tracing::info!(
        order_api_url = %config.order_api_url,
        timeout = ?config.order_api_timeout,
        "order service client ready"
    );

    let state = PaymentState {
        orm: orm.clone(),
        orders: Arc::new(orders),
    };

    let reconciler = config.reconcile_interval.map(|every| {
        tracing::info!(every_secs = every.as_secs(), "reconciliation sweep enabled");
        spawn_reconciler(state.clone(), every, config.reconcile_grace)
    });

    serve(payment_relay(state), &config.server, "payment-relay").await?;

    if let Some(handle) = reconciler {
        handle.abort();
    }
    orm.close().await?;
    Ok(())
}
