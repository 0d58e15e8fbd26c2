//! Charthouse server binary.

use anyhow::{Context, Result};
use charthouse_core::config::AppConfig;
use charthouse_index::{IndexBuilder, RebuildScheduler, RepositoryRegistry};
use charthouse_server::{AppState, create_router};
use clap::Parser;
use figment::Figment;
use figment::providers::{Env, Format, Toml};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Charthouse - a Helm chart repository server
#[derive(Parser, Debug)]
#[command(name = "charthoused")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(
        short,
        long,
        env = "CHARTHOUSE_CONFIG",
        default_value = "config/server.toml"
    )]
    config: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Charthouse v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration. The file is optional: every setting has a
    // default and env vars can provide or override everything.
    let config_path = std::path::Path::new(&args.config);
    let mut figment = Figment::new();

    if config_path.exists() {
        tracing::info!(config_path = %args.config, "Loading configuration from file");
        figment = figment.merge(Toml::file(&args.config));
    } else {
        tracing::debug!("No config file found at {}", args.config);
    }

    let config: AppConfig = figment
        .merge(Env::prefixed("CHARTHOUSE_").split("__"))
        .extract()
        .context("failed to load configuration")?;

    // Initialize the file store
    let store = charthouse_storage::from_config(&config.storage)
        .await
        .context("failed to initialize storage")?;
    tracing::info!(backend = store.backend_name(), "Storage backend initialized");

    // Registry, builder, scheduler
    let registry = Arc::new(RepositoryRegistry::new(
        store.clone(),
        &config.index.base_url,
    ));
    let builder = Arc::new(IndexBuilder::new(store.clone(), config.index.clone()));
    let scheduler = Arc::new(RebuildScheduler::new(
        store.clone(),
        registry.clone(),
        builder.clone(),
        config.index.rebuild_interval(),
    ));

    // Index every repository before accepting requests so the first
    // reader already sees complete documents.
    scheduler
        .rebuild_all()
        .await
        .context("initial index rebuild failed")?;

    let _rebuild_handle = scheduler.clone().spawn();

    if config.auth.is_some() {
        tracing::info!("HTTP Basic authentication enabled");
    }

    // Create application state and router
    let state = AppState::new(config.clone(), store, registry, builder);
    let app = create_router(state);

    let addr: SocketAddr = config.server.bind.parse().context("invalid bind address")?;
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind to {}", addr))?;
    axum::serve(listener, app).await?;

    Ok(())
}
