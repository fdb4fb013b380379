//! Schema migrations, one migrator per store.
//!
//! Each service owns its own database, so every migrator keeps its history
//! in a separate bookkeeping table and can share a database with the others
//! when a single `DATABASE_URL` is used for local runs.

pub use sea_orm_migration::prelude::*;

mod m20251019_000001_create_orders;
mod m20251019_000002_create_cart_items;
mod m20251019_000003_create_payments;

pub struct OrderMigrator;

#[async_trait::async_trait]
impl MigratorTrait for OrderMigrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![Box::new(m20251019_000001_create_orders::Migration)]
    }

    fn migration_table_name() -> DynIden {
        Alias::new("order_migrations").into_iden()
    }
}

pub struct CartMigrator;

#[async_trait::async_trait]
impl MigratorTrait for CartMigrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![Box::new(m20251019_000002_create_cart_items::Migration)]
    }

    fn migration_table_name() -> DynIden {
        Alias::new("cart_migrations").into_iden()
    }
}

pub struct PaymentMigrator;

#[async_trait::async_trait]
impl MigratorTrait for PaymentMigrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![Box::new(m20251019_000003_create_payments::Migration)]
    }

    fn migration_table_name() -> DynIden {
        Alias::new("payment_migrations").into_iden()
    }
}
