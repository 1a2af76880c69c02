//! Serve command implementation

use crate::api::{create_router, AppState};
use crate::cli::ServeArgs;
use crate::config::CallsyncConfig;
use crate::directory::MemoryDirectory;
use crate::provider::RetellProvider;
use crate::query::QueryFacade;
use crate::recon::{ReconcileOptions, Reconciler};
use crate::store::MemoryStore;
use anyhow::Result;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

/// Load configuration with CLI overrides
pub fn load_config_with_overrides(args: &ServeArgs) -> Result<CallsyncConfig> {
    let mut config = load_config(&args.config)?;

    // Apply CLI overrides (highest priority)
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(ref host) = args.host {
        config.server.host = host.clone();
    }
    if let Some(ref log_level) = args.log_level {
        config.logging.level = log_level.clone();
    }

    Ok(config)
}

/// Load config from file if it exists, fall back to defaults, then apply
/// environment overrides.
pub fn load_config(path: &Path) -> Result<CallsyncConfig> {
    let config = if path.exists() {
        CallsyncConfig::load(Some(path))?
    } else {
        tracing::debug!("Config file not found, using defaults");
        CallsyncConfig::default()
    };
    Ok(config.with_env_overrides())
}

/// Wire provider, store, and directory into a query façade.
pub fn build_facade(config: &CallsyncConfig) -> Result<Arc<QueryFacade>> {
    let client = Arc::new(
        reqwest::Client::builder()
            .timeout(Duration::from_secs(config.provider.request_timeout_seconds))
            .pool_max_idle_per_host(10)
            .build()?,
    );

    let provider = Arc::new(RetellProvider::from_config(&config.provider, client)?);
    let store = Arc::new(MemoryStore::new());

    let directory = Arc::new(MemoryDirectory::new());
    for user in &config.users {
        let stored = directory.add_user(&user.username, user.role);
        tracing::info!(
            username = %stored.username,
            role = ?stored.role,
            "Loaded static user from config"
        );
    }

    let options = ReconcileOptions {
        page_size: config.provider.page_size,
        max_pages: config.provider.max_pages,
        fallback_fetch_cap: config.reconcile.fallback_fetch_cap,
    };
    let reconciler = Arc::new(Reconciler::new(provider, store, directory, options));

    Ok(Arc::new(QueryFacade::new(
        reconciler,
        Duration::from_secs(config.cache.ttl_seconds),
    )))
}

/// Wait for shutdown signal (SIGINT or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install CTRL+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received SIGINT, shutting down...");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, shutting down...");
        }
    }
}

/// Main serve command handler
pub async fn run_serve(args: ServeArgs) -> Result<()> {
    let config = load_config_with_overrides(&args)?;
    config.validate()?;

    crate::logging::init_tracing(&config.logging).map_err(|e| anyhow::anyhow!(e.to_string()))?;

    tracing::info!("Starting Callsync server");
    tracing::debug!(
        port = config.server.port,
        provider = %config.provider.base_url,
        "Loaded configuration"
    );

    let facade = build_facade(&config)?;
    let config_arc = Arc::new(config.clone());
    let state = Arc::new(AppState::new(facade, config_arc));
    let app = create_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    tracing::info!(addr = %addr, "Callsync API server listening");

    let listener = tokio::net::TcpListener::bind(&addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Callsync server stopped");
    Ok(())
}
