use anyhow::Result;
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use sea_orm_migration::MigratorTrait;

/// Create a SeaORM connection pool.
///
/// An in-memory SQLite database only exists for the connection that opened
/// it, so such URLs get a single-connection pool.
pub async fn create_orm_conn(database_url: &str) -> Result<DatabaseConnection> {
    let mut options = ConnectOptions::new(database_url.to_owned());
    if is_in_memory_sqlite(database_url) {
        options.max_connections(1).min_connections(1);
    }
    let conn = Database::connect(options).await?;
    Ok(conn)
}

/// Apply every pending migration of one store's migrator.
pub async fn run_migrations<M: MigratorTrait>(conn: &DatabaseConnection) -> Result<()> {
    M::up(conn, None).await?;
    Ok(())
}

fn is_in_memory_sqlite(database_url: &str) -> bool {
    database_url.starts_with("sqlite") && database_url.contains(":memory:")
}
