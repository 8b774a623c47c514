use std::sync::Arc;

use anyhow::Result;
use api::{AppState, ServerConfig, create_router};
use auth::{JwtConfig, JwtService, database::MIGRATOR, repositories::PgUserRepository};
use common::database::{DatabaseConfig, health_check, init_pool, migrate};
use media::{ApodConfig, NasaApodClient, S3Store, StorageConfig};
use tokio::net::TcpListener;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting API service");

    let server_config = ServerConfig::from_env()?;
    let jwt_config = JwtConfig::from_env()?;
    let storage_config = StorageConfig::from_env()?;
    let apod_config = ApodConfig::from_env()?;

    // Initialize database connection pool
    let db_config = DatabaseConfig::from_env()?;
    let pool = init_pool(&db_config).await?;

    if health_check(&pool).await? {
        info!("Database connection successful");
    } else {
        anyhow::bail!("Failed to connect to database");
    }

    migrate(&pool, &MIGRATOR).await?;

    let store = S3Store::connect(&storage_config).await;
    let apod = NasaApodClient::new(&apod_config)?;

    let state = AppState::new(
        Arc::new(PgUserRepository::new(pool)),
        JwtService::new(jwt_config),
        Arc::new(store),
        Arc::new(apod),
        server_config.request_timeout,
    );

    let app = create_router(state);

    let listener = TcpListener::bind(server_config.addr()).await?;
    info!("API service listening on {}", server_config.addr());

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("API service stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
