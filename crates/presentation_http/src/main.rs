//! Skywatch HTTP Server
//!
//! Serves the weather API and runs the polling monitor in the background.

use std::{path::PathBuf, sync::Arc};

use anyhow::Context;
use application::{
    BreachDetector, DailyAggregator, WeatherMonitor,
    ports::{AlertPort, DatabaseHealthPort, ReadingStore, SummaryStore, WeatherPort},
};
use infrastructure::{
    AppConfig, AsyncDatabase, AsyncDatabaseConfig, LogAlertNotifier, LogFormat,
    SqliteDatabaseHealth, SqliteReadingStore, SqliteSummaryStore, WeatherAdapter, init_tracing,
};
use presentation_http::{AppState, routes, spawn_weather_polling_task};
use tokio::{net::TcpListener, signal};
use tokio_util::sync::CancellationToken;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Optional explicit config file via SKYWATCH_CONFIG
    let config_path = std::env::var_os("SKYWATCH_CONFIG").map(PathBuf::from);
    let config = AppConfig::load_from(config_path.as_deref()).context("Failed to load config")?;

    let log_format: LogFormat = config.server.log_format.parse()?;
    init_tracing(log_format, &config.telemetry.log_filter)?;

    info!("Skywatch v{} starting...", env!("CARGO_PKG_VERSION"));
    config.validate()?;

    info!(
        environment = %config.environment,
        host = %config.server.host,
        port = config.server.port,
        locations = config.monitor.locations.len(),
        threshold_temp = config.monitor.threshold_temp,
        "Configuration loaded"
    );

    // Persistence
    let database = AsyncDatabase::new(&AsyncDatabaseConfig::from(&config.database))
        .await
        .context("Failed to open database")?;
    if config.database.run_migrations {
        database.migrate().await.context("Failed to run migrations")?;
    }
    let pool = database.pool().clone();
    let readings: Arc<dyn ReadingStore> = Arc::new(SqliteReadingStore::new(pool.clone()));
    let summaries: Arc<dyn SummaryStore> = Arc::new(SqliteSummaryStore::new(pool.clone()));
    let db_health: Arc<dyn DatabaseHealthPort> = Arc::new(SqliteDatabaseHealth::new(pool));

    // Provider and alert sink
    let weather: Arc<dyn WeatherPort> =
        Arc::new(WeatherAdapter::with_config(config.weather.to_client_config())?);
    let alerts: Arc<dyn AlertPort> = Arc::new(LogAlertNotifier::new());

    // Services
    let thresholds = config.monitor.thresholds()?;
    let aggregator = DailyAggregator::new(Arc::clone(&readings), summaries);
    let detector = Arc::new(BreachDetector::new(
        Arc::clone(&readings),
        alerts,
        thresholds.clone(),
    ));
    let monitor = Arc::new(WeatherMonitor::new(
        Arc::clone(&weather),
        Arc::clone(&readings),
        aggregator.clone(),
        detector,
        config.monitor.monitor_config(),
    ));

    let state = AppState {
        weather,
        readings,
        aggregator,
        monitor: Arc::clone(&monitor),
        db_health,
        thresholds,
    };

    // Background polling
    let shutdown = CancellationToken::new();
    let poller = if config.monitor.enabled {
        Some(spawn_weather_polling_task(
            monitor,
            config.monitor.poll_interval(),
            shutdown.clone(),
        ))
    } else {
        info!("Weather monitor disabled by configuration");
        None
    };

    // Configure CORS layer
    let cors_layer = if config.server.allowed_origins.is_empty() {
        CorsLayer::new().allow_origin(Any).allow_methods(Any)
    } else {
        use axum::http::{HeaderValue, Method};
        let origins: Vec<HeaderValue> = config
            .server
            .allowed_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([Method::GET, Method::POST])
    };

    let app = routes::create_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer);

    let addr = config.server.bind_address();
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // Stop scheduling cycles, let an in-flight one finish
    shutdown.cancel();
    if let Some(handle) = poller {
        match tokio::time::timeout(config.server.shutdown_timeout(), handle).await {
            Ok(Ok(())) => info!("Weather polling task stopped"),
            Ok(Err(e)) => warn!(error = %e, "Weather polling task ended abnormally"),
            Err(_) => warn!("Timed out waiting for the polling cycle to finish"),
        }
    }

    database.close().await;
    info!("Server shutdown complete");

    Ok(())
}

/// Wait for shutdown signals (SIGINT, SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            },
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            },
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received Ctrl+C, initiating graceful shutdown...");
        }
        () = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown...");
        }
    }
}
