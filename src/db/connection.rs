use std::time::Duration;

use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection};
use tracing::info;

use crate::config::DatabaseConfig;

const SQLITE_MEMORY_URL: &str = "sqlite::memory:";

/// Connects and syncs the schema from the entity registry.
pub async fn connect(cfg: &DatabaseConfig) -> anyhow::Result<DatabaseConnection> {
    let mut options = ConnectOptions::new(cfg.url.clone());
    options
        .max_connections(cfg.max_connections)
        .min_connections(cfg.min_idle)
        .connect_timeout(Duration::from_secs(5))
        .sqlx_logging(false);

    connect_with(options).await
}

/// Single-connection in-memory SQLite database; every connection of a
/// `sqlite::memory:` pool would otherwise see its own empty database.
pub async fn connect_in_memory() -> anyhow::Result<DatabaseConnection> {
    let mut options = ConnectOptions::new(SQLITE_MEMORY_URL);
    options
        .max_connections(1)
        .min_connections(1)
        .sqlx_logging(false);

    connect_with(options).await
}

async fn connect_with(options: ConnectOptions) -> anyhow::Result<DatabaseConnection> {
    let db = Database::connect(options).await?;
    info!(backend = ?db.get_database_backend(), "syncing database schema from entities");
    db.get_schema_registry("sso_auth::db::entities::*")
        .sync(&db)
        .await?;
    Ok(db)
}
