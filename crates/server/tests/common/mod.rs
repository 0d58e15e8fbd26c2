//! Common test utilities.

use charthouse_core::config::AppConfig;
use charthouse_index::{IndexBuilder, RepositoryRegistry};
use charthouse_server::{AppState, create_router};
use std::sync::Arc;
use tempfile::TempDir;

/// A test server wrapper with all dependencies.
/// Note: #[allow(dead_code)] because each test file compiles common/ separately.
#[allow(dead_code)]
pub struct TestServer {
    pub router: axum::Router,
    pub state: AppState,
    _temp_dir: TempDir,
}

#[allow(dead_code)]
impl TestServer {
    /// Create a new test server with temporary storage.
    pub async fn new() -> Self {
        Self::with_config(|_| {}).await
    }

    /// Create a test server with custom config modifications.
    pub async fn with_config<F>(modifier: F) -> Self
    where
        F: FnOnce(&mut AppConfig),
    {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp directory");
        let storage_path = temp_dir.path().join("storage");

        let mut config = AppConfig::for_testing(storage_path);
        modifier(&mut config);

        let store = charthouse_storage::from_config(&config.storage)
            .await
            .expect("Failed to create storage backend");

        let registry = Arc::new(RepositoryRegistry::new(
            store.clone(),
            &config.index.base_url,
        ));
        let builder = Arc::new(IndexBuilder::new(store.clone(), config.index.clone()));

        let state = AppState::new(config, store, registry, builder);
        let router = create_router(state.clone());

        Self {
            router,
            state,
            _temp_dir: temp_dir,
        }
    }
}
