//! File store abstraction and backends for charthouse.
//!
//! This crate provides:
//! - The `FileStore` trait the index core reads and writes through
//! - A local filesystem backend with atomic writes

pub mod backends;
pub mod error;
pub mod traits;

pub use backends::filesystem::FilesystemStore;
pub use error::{StorageError, StorageResult};
pub use traits::{FileMeta, FileStore};

use charthouse_core::config::StorageConfig;
use std::sync::Arc;

/// Create a file store from configuration.
pub async fn from_config(config: &StorageConfig) -> StorageResult<Arc<dyn FileStore>> {
    match config {
        StorageConfig::Filesystem { path } => {
            let store = FilesystemStore::new(path).await?;
            Ok(Arc::new(store))
        }
    }
}
