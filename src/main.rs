use sea_orm::Database;
use sea_orm_migration::MigratorTrait;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tokio::signal;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use oura_sleep::common::AppState;
use oura_sleep::config::{Config, LogFormat, RunMode};
use oura_sleep::oura::OuraClient;
use oura_sleep::routes;
use oura_sleep::sync;

fn init_tracing(format: LogFormat) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| "info,oura_sleep=debug".into());
    let registry = tracing_subscriber::registry().with(filter);

    match format {
        LogFormat::Json => registry.with(tracing_subscriber::fmt::layer().json()).init(),
        LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer()).init(),
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration (fail-fast)
    let config = Config::from_env()?;

    init_tracing(config.log_format);
    tracing::info!(
        deployment = ?config.deployment,
        run_mode = ?config.run_mode,
        write_mode = ?config.write_mode,
        "Configuration loaded"
    );

    // Connect to database (fail-fast)
    tracing::info!("Connecting to database...");
    let db = Database::connect(&config.database_url).await?;
    tracing::info!("Database connection established");

    if config.run_migrations {
        tracing::info!("Running migrations...");
        migration::Migrator::up(&db, None).await?;
        tracing::info!("Migrations completed");
    }

    let oura_client = OuraClient::new(&config)?;
    tracing::info!(base_url = %config.oura_base_url, "Oura client initialized");

    let run_mode = config.run_mode;
    let state = AppState::new(db, config, oura_client);

    match run_mode {
        RunMode::Once => {
            let report = sync::scheduler::run_once(state).await?;
            tracing::info!(
                fetched = report.fetched,
                written = report.written,
                rejected = report.rejected,
                "Sleep sync finished"
            );
        }
        RunMode::Serve => serve(state).await?,
    }

    Ok(())
}

async fn serve(state: AppState) -> Result<(), Box<dyn std::error::Error>> {
    // Background sync (fire-and-forget, non-blocking)
    tracing::info!("Spawning background sync task...");
    tokio::spawn(sync::scheduler::run_sleep_sync(state.clone()));

    let addr = state.config.bind_address();
    let app = routes::build_router(state)?;

    tracing::info!(address = %addr, "Starting server");
    let listener = TcpListener::bind(&addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    tracing::info!("Server shut down gracefully");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received Ctrl+C, shutting down...");
        },
        () = terminate => {
            tracing::info!("Received SIGTERM, shutting down...");
        },
    }
}
