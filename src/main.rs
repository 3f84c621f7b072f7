//! Clubhouse - club ledger backend
//! Mission: Never lose the club's books
//!
//! Loads the ledger from the first storage target that has it, serves the
//! JSON API and keeps saving until shutdown.

use anyhow::{Context, Result};
use clap::Parser;
use clubhouse_backend::{
    api::{self, AppState},
    auth::{AuthState, JwtHandler},
    autosave::AutoSaveScheduler,
    config::{load_env, AppConfig},
    ledger,
    middleware::{RateLimitConfig, RateLimitLayer},
    store::PersistenceStore,
};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    load_env();
    init_tracing();

    let config = AppConfig::parse();
    info!("🚀 Clubhouse backend starting");
    config.warn_on_insecure_defaults();

    let http_client = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.http_timeout_secs))
        .build()
        .context("Failed to build HTTP client")?;

    let store = Arc::new(PersistenceStore::new(config.storage_targets(&http_client)));
    info!("💾 Storage targets: {:?}", store.target_names());

    let loaded = store.load().await;
    match loaded.source {
        Some(source) => info!("📂 Ledger loaded from {}", source),
        None => info!("🌱 Starting with seed ledger"),
    }
    let ledger = ledger::shared(loaded.document);

    let autosave = AutoSaveScheduler::new(ledger.clone(), store.clone(), config.autosave_period())
        .start();

    let jwt_handler = Arc::new(JwtHandler::new(
        config.jwt_secret.clone(),
        config.token_ttl_hours,
    ));
    let auth_state = AuthState::new(jwt_handler, config.site_password.as_str());

    let limiter = RateLimitLayer::new(RateLimitConfig {
        max_requests: config.rate_limit_max,
        window: Duration::from_secs(config.rate_limit_window_secs.max(1)),
    });
    tokio::spawn(rate_limit_cleanup(limiter.clone()));

    let app = api::build_router(AppState::new(ledger, store), auth_state, limiter);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("🎯 API server listening on {}", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("Server error")?;

    match autosave.shutdown().await {
        Ok(report) => info!("👋 Final save stored in {:?}", report.accepted()),
        Err(e) => warn!("👋 Exiting without a successful final save: {}", e),
    }

    Ok(())
}

async fn rate_limit_cleanup(limiter: RateLimitLayer) {
    let mut ticker = tokio::time::interval(limiter.config().window);
    loop {
        ticker.tick().await;
        limiter.cleanup();
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                warn!("Failed to listen for SIGTERM: {}", e);
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

    info!("🛑 Shutdown signal received");
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "clubhouse_backend=debug,clubhouse=debug,tower_http=info".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
