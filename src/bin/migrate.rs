use std::env;

use megapang_api::{
    db::{create_orm_conn, run_migrations},
    migration::{CartMigrator, OrderMigrator, PaymentMigrator},
};

/// Applies the migrations of every store whose database URL is configured.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let shared = env::var("DATABASE_URL").ok();
    let url_for = |key: &str| env::var(key).ok().or_else(|| shared.clone());

    let mut applied = 0;
    if let Some(url) = url_for("ORDER_DATABASE_URL") {
        run_migrations::<OrderMigrator>(&create_orm_conn(&url).await?).await?;
        println!("Order store migrated");
        applied += 1;
    }
    if let Some(url) = url_for("CART_DATABASE_URL") {
        run_migrations::<CartMigrator>(&create_orm_conn(&url).await?).await?;
        println!("Cart store migrated");
        applied += 1;
    }
    if let Some(url) = url_for("PAYMENT_DATABASE_URL") {
        run_migrations::<PaymentMigrator>(&create_orm_conn(&url).await?).await?;
        println!("Payment store migrated");
        applied += 1;
    }

    if applied == 0 {
        anyhow::bail!("set DATABASE_URL or a per-store *_DATABASE_URL");
    }
    Ok(())
}
