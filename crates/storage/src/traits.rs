//! File store trait definitions.

use crate::error::StorageResult;
use async_trait::async_trait;
use bytes::Bytes;

/// Metadata about a stored file.
#[derive(Clone, Debug)]
pub struct FileMeta {
    /// File size in bytes.
    pub size: u64,
    /// Last modification time.
    pub modified: time::OffsetDateTime,
}

/// File store abstraction consumed by the index core.
///
/// Keys are `repo/filename` pairs; the store is a flat two-level layout
/// where each repository maps to one directory. Listing order is whatever
/// the backend's directory enumeration yields and the index preserves it.
#[async_trait]
pub trait FileStore: Send + Sync + 'static {
    /// List file names (not paths) directly inside a directory, in the
    /// backend's enumeration order. A missing directory lists as empty.
    async fn list_files(&self, dir: &str) -> StorageResult<Vec<String>>;

    /// List directory names directly inside a directory. An empty `dir`
    /// lists the store root (the set of repositories).
    async fn list_dirs(&self, dir: &str) -> StorageResult<Vec<String>>;

    /// Get a file's metadata without reading its content.
    async fn stat(&self, key: &str) -> StorageResult<FileMeta>;

    /// Read a file's full content.
    async fn read(&self, key: &str) -> StorageResult<Bytes>;

    /// Write a file atomically, replacing any existing content.
    async fn write(&self, key: &str, data: Bytes) -> StorageResult<()>;

    /// Delete a file. Missing files fail with NotFound; callers on
    /// best-effort paths may tolerate it.
    async fn delete(&self, key: &str) -> StorageResult<()>;

    /// Whether a directory exists.
    async fn dir_exists(&self, dir: &str) -> StorageResult<bool>;

    /// Create a directory (and parents) if absent.
    async fn ensure_dir(&self, dir: &str) -> StorageResult<()>;

    /// Static identifier for the backend type, used in logging.
    fn backend_name(&self) -> &'static str;
}
