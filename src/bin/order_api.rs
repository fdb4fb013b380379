use megapang_api::{
    config::OrderApiConfig,
    db::{create_orm_conn, run_migrations},
    migration::OrderMigrator,
    routes::order_api,
    server::{init_tracing, serve},
    state::OrderState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = OrderApiConfig::from_env()?;
    let orm = create_orm_conn(&config.database_url).await?;
    run_migrations::<OrderMigrator>(&orm).await?;

    let app = order_api(OrderState { orm: orm.clone() });
    serve(app, &config.server, "order-api").await?;

    orm.close().await?;
    Ok(())
}
