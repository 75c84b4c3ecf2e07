use std::net::SocketAddr;
use std::time::Duration;

use anyhow::Context;
use railbook_api::{app, state::AppState};
use railbook_core::repository::HealthCheck;
use railbook_store::{app_config::Config, DbClient};
use tokio::signal;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const MIGRATION_RETRY_INITIAL: Duration = Duration::from_secs(1);
const MIGRATION_RETRY_MAX: Duration = Duration::from_secs(30);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                concat!(
                    "railbook_api=debug,railbook_store=debug,railbook_core=debug,",
                    "tower_http=debug,axum::rejection=trace"
                )
                .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::load().context("Failed to load config")?;
    tracing::info!("Starting Railbook API on port {}", config.server.port);

    let db = DbClient::connect_lazy(&config.database).context("Invalid database configuration")?;

    // Keep serving even if the database is down; requests fail with 500 until it is back
    // and the schema has been migrated.
    let migrated = match db.ping().await {
        Ok(()) => {
            tracing::info!("Database connected successfully");
            if config.database.run_migrations {
                match db.migrate().await {
                    Ok(()) => true,
                    Err(e) => {
                        tracing::error!("Database migrations failed: {}", e);
                        false
                    }
                }
            } else {
                true
            }
        }
        Err(e) => {
            tracing::error!("Error connecting to the database: {}", e);
            false
        }
    };

    if config.database.run_migrations && !migrated {
        let db = db.clone();
        tokio::spawn(async move {
            db.migrate_with_retry(MIGRATION_RETRY_INITIAL, MIGRATION_RETRY_MAX)
                .await;
        });
    }

    let app_state = AppState::postgres(&db, &config.auth, &config.cors);
    let app = app(app_state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    tracing::info!("Server shut down gracefully");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install SIGINT handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => tracing::info!("Received SIGINT, shutting down"),
        () = terminate => tracing::info!("Received SIGTERM, shutting down"),
    }
}
