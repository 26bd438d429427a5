//! Marketplace server entry point.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use fred::prelude::*;
use marketplace_api::{AppState, app};
use marketplace_common::{Config, LocalStorage, OtpBackend};
use marketplace_core::{InMemoryOtpStore, OtpStore, RedisOtpStore};
use tokio::signal;
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Room for every document field of one registration form.
const BODY_LIMIT_FILES: usize = 24;

/// Waits for a shutdown signal (SIGINT or SIGTERM).
///
/// On Unix systems, this listens for both SIGINT (Ctrl+C) and SIGTERM.
/// On Windows, this only listens for Ctrl+C.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received SIGINT, initiating graceful shutdown...");
        },
        () = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown...");
        },
    }
}

/// Build the configured OTP store.
async fn otp_store(config: &Config) -> Result<Arc<dyn OtpStore>, Box<dyn std::error::Error>> {
    match config.otp.backend {
        OtpBackend::Memory => {
            warn!("OTP codes are kept in process memory; use the redis backend for multiple replicas");
            let store = InMemoryOtpStore::new();

            // Expired codes are dropped on read; this sweep catches codes nobody asks for again.
            let sweeper = store.clone();
            tokio::spawn(async move {
                let mut interval = tokio::time::interval(std::time::Duration::from_secs(300));
                loop {
                    interval.tick().await;
                    let purged = sweeper.purge().await;
                    if purged > 0 {
                        tracing::debug!(purged, "Purged stale OTP records");
                    }
                }
            });

            Ok(Arc::new(store))
        }
        OtpBackend::Redis => {
            let url = config
                .otp
                .redis_url
                .as_deref()
                .ok_or("otp.redis_url is required when otp.backend = \"redis\"")?;

            info!("Connecting to Redis...");
            let fred_config = fred::types::config::Config::from_url(url)?;
            let client = fred::clients::Client::new(fred_config, None, None, None);
            client.connect();
            client.wait_for_connect().await?;
            info!("Connected to Redis OTP store");

            Ok(Arc::new(RedisOtpStore::new(
                Arc::new(client),
                config.otp.key_prefix.clone(),
            )))
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "marketplace=debug,tower_http=debug".into()),
        )
        .init();

    info!("Starting marketplace server...");

    // Load configuration
    let config = Config::load()?;

    // Connect to database
    let db = marketplace_db::init(&config).await?;
    info!("Connected to database");

    // Run migrations
    info!("Running database migrations...");
    marketplace_db::migrate(&db).await?;
    info!("Migrations completed");

    if config.mail.api_key.is_none() {
        warn!("Mail API key not configured; OTP and notification emails will report failed delivery");
    }

    let otp_store = otp_store(&config).await?;

    tokio::fs::create_dir_all(&config.uploads.dir).await?;
    let storage = LocalStorage::new(config.uploads.dir.clone(), config.uploads.base_url.clone());

    let state = AppState::new(Arc::new(db), &config, otp_store, Arc::new(storage));

    // Build router
    let body_limit = config.uploads.max_file_size.saturating_mul(BODY_LIMIT_FILES);
    let app = app(state)
        .nest_service(&config.uploads.base_url, ServeDir::new(&config.uploads.dir))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        );

    // Start server with graceful shutdown
    let host: std::net::IpAddr = config.server.host.parse()?;
    let addr = SocketAddr::from((host, config.server.port));
    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}
