use megapang_api::{
    config::CartApiConfig,
    db::{create_orm_conn, run_migrations},
    migration::CartMigrator,
    routes::cart_api,
    server::{init_tracing, serve},
    state::CartState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = CartApiConfig::from_env()?;
    let orm = create_orm_conn(&config.database_url).await?;
    run_migrations::<CartMigrator>(&orm).await?;

    let app = cart_api(CartState { orm: orm.clone() });
    serve(app, &config.server, "cart-api").await?;

    orm.close().await?;
    Ok(())
}
