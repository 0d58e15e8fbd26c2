//! Application state shared across handlers.

use charthouse_core::config::AppConfig;
use charthouse_index::{IndexBuilder, RepositoryRegistry};
use charthouse_storage::FileStore;
use std::sync::Arc;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Arc<AppConfig>,
    /// File store backend.
    pub store: Arc<dyn FileStore>,
    /// Repository registry.
    pub registry: Arc<RepositoryRegistry>,
    /// Index builder for mutations and rebuilds.
    pub builder: Arc<IndexBuilder>,
}

impl AppState {
    /// Create a new application state.
    pub fn new(
        config: AppConfig,
        store: Arc<dyn FileStore>,
        registry: Arc<RepositoryRegistry>,
        builder: Arc<IndexBuilder>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            store,
            registry,
            builder,
        }
    }
}
