pub mod entities;
pub mod migrator;
pub mod repositories;
pub mod seed;

use std::time::Duration;

use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use tracing::info;

/// Database configuration
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// Database URL (e.g., "sqlite://./powerbank.db?mode=rwc")
    pub url: String,
    /// Pool size; `None` keeps the driver default
    pub max_connections: Option<u32>,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://./powerbank.db?mode=rwc".to_string(),
            max_connections: None,
        }
    }
}

impl DatabaseConfig {
    /// Create config for SQLite
    pub fn sqlite(path: &str) -> Self {
        Self {
            url: format!("sqlite://{}?mode=rwc", path),
            max_connections: None,
        }
    }

    /// Private in-memory database. A single connection, since every
    /// SQLite memory connection is its own database.
    pub fn in_memory() -> Self {
        Self {
            url: "sqlite::memory:".to_string(),
            max_connections: Some(1),
        }
    }
}

/// Initialize database connection
pub async fn init_database(config: &DatabaseConfig) -> Result<DatabaseConnection, sea_orm::DbErr> {
    info!("Connecting to database: {}", config.url);
    let mut options = ConnectOptions::new(config.url.clone());
    options
        .connect_timeout(Duration::from_secs(10))
        .sqlx_logging(false);
    if let Some(max) = config.max_connections {
        options.max_connections(max).min_connections(1);
    }
    let db = Database::connect(options).await?;
    info!("Database connected successfully");
    Ok(db)
}

/// Fresh in-memory database with all migrations applied.
#[cfg(test)]
pub(crate) async fn test_database() -> DatabaseConnection {
    use sea_orm_migration::MigratorTrait;

    let db = init_database(&DatabaseConfig::in_memory())
        .await
        .expect("in-memory database");
    migrator::Migrator::up(&db, None)
        .await
        .expect("migrations");
    db
}

/// Migrated SQLite file under `dir` behind a pool of `max_connections`, so
/// concurrent units really run on separate connections.
#[cfg(test)]
pub(crate) async fn test_file_database(
    dir: &std::path::Path,
    max_connections: u32,
) -> DatabaseConnection {
    use sea_orm_migration::MigratorTrait;

    let path = dir.join("powerbank.db");
    let config = DatabaseConfig {
        max_connections: Some(max_connections),
        ..DatabaseConfig::sqlite(&path.to_string_lossy())
    };
    let db = init_database(&config).await.expect("file database");
    migrator::Migrator::up(&db, None)
        .await
        .expect("migrations");
    db
}
