//! Database module for handling PostgreSQL connections and operations
//!
//! This module provides connection pooling, configuration, and health checks
//! for the PostgreSQL database.

use std::time::Duration;

use sqlx::{PgPool, migrate::Migrator, postgres::PgPoolOptions};
use tracing::{error, info};

use crate::{
    env,
    error::{ConfigError, DatabaseError, DatabaseResult},
};

/// Database configuration struct
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// Database connection URL
    pub database_url: String,
    /// Maximum number of connections in the pool
    pub max_connections: u32,
    /// Minimum number of connections in the pool
    pub min_connections: u32,
    /// Connection timeout in seconds
    pub connection_timeout: u64,
}

impl DatabaseConfig {
    /// Create a new DatabaseConfig from environment variables
    ///
    /// # Environment Variables
    /// - `DATABASE_URL`: full PostgreSQL connection URL. When unset the URL is
    ///   assembled from `DB_HOST`, `DB_PORT` (default 5432), `DB_NAME`,
    ///   `DB_USER` and `DB_PASSWORD`.
    /// - `DATABASE_MAX_CONNECTIONS`: Maximum number of connections (default: 10)
    /// - `DATABASE_MIN_CONNECTIONS`: Minimum number of connections (default: 1)
    /// - `DATABASE_CONNECTION_TIMEOUT`: Connection timeout in seconds (default: 30)
    pub fn from_env() -> Result<Self, ConfigError> {
        let database_url = match env::required("DATABASE_URL") {
            Ok(url) => url,
            Err(_) => {
                let host = env::required("DB_HOST")?;
                let port: u16 = env::parse_or("DB_PORT", 5432)?;
                let name = env::required("DB_NAME")?;
                let user = env::required("DB_USER")?;
                let password = env::or_default("DB_PASSWORD", "");
                format!("postgresql://{user}:{password}@{host}:{port}/{name}?sslmode=disable")
            }
        };

        Ok(Self {
            database_url,
            max_connections: env::parse_or("DATABASE_MAX_CONNECTIONS", 10)?,
            min_connections: env::parse_or("DATABASE_MIN_CONNECTIONS", 1)?,
            connection_timeout: env::parse_or("DATABASE_CONNECTION_TIMEOUT", 30)?,
        })
    }
}

/// Initialize a PostgreSQL connection pool
pub async fn init_pool(config: &DatabaseConfig) -> DatabaseResult<PgPool> {
    info!("Initializing database connection pool");

    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(Duration::from_secs(config.connection_timeout))
        .connect(&config.database_url)
        .await
        .map_err(DatabaseError::Connection)?;

    info!("Database connection pool initialized successfully");
    Ok(pool)
}

/// Apply pending migrations from an embedded migrator
pub async fn migrate(pool: &PgPool, migrator: &Migrator) -> DatabaseResult<()> {
    migrator.run(pool).await?;
    info!("Database migrations applied");
    Ok(())
}

/// Check database connectivity
pub async fn health_check(pool: &PgPool) -> DatabaseResult<bool> {
    match sqlx::query("SELECT 1").execute(pool).await {
        Ok(_) => Ok(true),
        Err(e) => {
            error!("Database health check failed: {}", e);
            Err(DatabaseError::Query(e))
        }
    }
}
