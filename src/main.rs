use sqlx::postgres::PgPoolOptions;
use std::net::TcpListener;
use std::sync::Arc;
use std::time::Duration;

use postboard::auth::purge_expired_refresh_tokens;
use postboard::configuration::get_configuration;
use postboard::repository::{MemoryRepository, PgRepository, Repository};
use postboard::startup::run;
use postboard::telemetry::init_telemetry;

#[tokio::main]
async fn main() -> std::io::Result<()> {
    let configuration = get_configuration().map_err(|e| {
        eprintln!("Failed to read configuration: {}", e);
        std::io::Error::new(std::io::ErrorKind::InvalidInput, "Configuration error")
    })?;

    init_telemetry(&configuration.application.log_level);
    tracing::info!(settings = ?configuration, "Configuration loaded");

    let repository: Arc<dyn Repository> = if configuration.database.in_memory {
        tracing::warn!("Using in-memory storage; nothing survives a restart");
        Arc::new(MemoryRepository::new())
    } else {
        tracing::info!("Attempting to connect to database");

        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(&configuration.database.connection_string())
            .await
            .map_err(|e| {
                tracing::error!("Failed to create connection pool: {}", e);
                std::io::Error::new(
                    std::io::ErrorKind::ConnectionRefused,
                    "Database connection error",
                )
            })?;

        sqlx::migrate!("./migrations").run(&pool).await.map_err(|e| {
            tracing::error!("Failed to run migrations: {}", e);
            std::io::Error::new(std::io::ErrorKind::Other, "Migration error")
        })?;

        tracing::info!("Database connection pool created successfully");
        Arc::new(PgRepository::new(pool))
    };

    if let Some(secs) = configuration.maintenance.refresh_token_cleanup_interval_secs {
        let repository = repository.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_secs(secs.max(1)));
            loop {
                interval.tick().await;
                if let Err(e) = purge_expired_refresh_tokens(repository.as_ref()).await {
                    tracing::error!(error = %e, "Refresh token cleanup failed");
                }
            }
        });
    }

    let address = format!(
        "{}:{}",
        configuration.application.host, configuration.application.port
    );
    let listener = TcpListener::bind(&address)?;
    tracing::info!("Server listening on: {}", address);

    let server = run(listener, repository, configuration)?;
    server.await
}
