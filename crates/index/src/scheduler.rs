//! Periodic full-rebuild scheduling.

use crate::builder::IndexBuilder;
use crate::error::IndexResult;
use crate::registry::RepositoryRegistry;
use charthouse_storage::FileStore;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{error, info};

/// Drives full index rebuilds: one synchronous pass at startup and,
/// when an interval is configured, a background loop thereafter.
///
/// Repositories are discovered from the store root on every pass, so
/// directories created outside the server are picked up. Passes never
/// overlap: the next sleep only starts after the previous pass finishes.
pub struct RebuildScheduler {
    store: Arc<dyn FileStore>,
    registry: Arc<RepositoryRegistry>,
    builder: Arc<IndexBuilder>,
    interval: Option<Duration>,
}

impl RebuildScheduler {
    pub fn new(
        store: Arc<dyn FileStore>,
        registry: Arc<RepositoryRegistry>,
        builder: Arc<IndexBuilder>,
        interval: Option<Duration>,
    ) -> Self {
        Self {
            store,
            registry,
            builder,
            interval,
        }
    }

    /// Run one rebuild pass over every repository directory in the store.
    ///
    /// Per-repository failures are logged and skipped so one broken
    /// directory cannot stall the rest of the pass.
    pub async fn rebuild_all(&self) -> IndexResult<()> {
        let names = self.store.list_dirs("").await?;
        info!(repos = names.len(), "index rebuild pass starting");

        for name in names {
            let repo = match self.registry.ensure(&name).await {
                Ok(repo) => repo,
                Err(e) => {
                    error!(repo = %name, error = %e, "failed to register repository");
                    continue;
                }
            };
            if let Err(e) = self.builder.full_rebuild(&repo).await {
                error!(repo = %name, error = %e, "index rebuild failed");
            }
        }

        info!("index rebuild pass finished");
        Ok(())
    }

    /// Spawn the periodic rebuild loop, if an interval is configured.
    pub fn spawn(self: Arc<Self>) -> Option<JoinHandle<()>> {
        let interval = self.interval?;
        info!(interval_secs = interval.as_secs(), "periodic index rebuild enabled");

        Some(tokio::spawn(async move {
            loop {
                tokio::time::sleep(interval).await;
                if let Err(e) = self.rebuild_all().await {
                    error!(error = %e, "index rebuild pass failed");
                }
            }
        }))
    }
}
