//! Local filesystem file store.

use crate::error::{StorageError, StorageResult};
use crate::traits::{FileMeta, FileStore};
use async_trait::async_trait;
use bytes::Bytes;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::instrument;
use uuid::Uuid;

/// Local filesystem file store.
///
/// Each repository is one directory directly under the root; archives and
/// provenance sidecars are plain files inside it.
pub struct FilesystemStore {
    root: PathBuf,
}

impl FilesystemStore {
    /// Create a new filesystem store, creating the root if absent.
    pub async fn new(root: impl AsRef<Path>) -> StorageResult<Self> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root).await?;
        Ok(Self { root })
    }

    /// Resolve a key to a path under the root, with traversal protection.
    ///
    /// Rejects keys that would escape the storage root. Keys are at most
    /// two levels deep (`repo` or `repo/filename`).
    fn key_path(&self, key: &str) -> StorageResult<PathBuf> {
        if key.contains("..") || key.starts_with('/') || key.starts_with('\\') {
            return Err(StorageError::InvalidKey(format!(
                "path traversal not allowed: {key}"
            )));
        }

        for component in Path::new(key).components() {
            match component {
                std::path::Component::Normal(_) => {}
                _ => {
                    return Err(StorageError::InvalidKey(format!(
                        "contains unsafe path component: {key}"
                    )));
                }
            }
        }

        Ok(self.root.join(key))
    }

    /// Resolve a directory key, allowing empty to mean the root.
    fn dir_path(&self, dir: &str) -> StorageResult<PathBuf> {
        if dir.is_empty() {
            Ok(self.root.clone())
        } else {
            self.key_path(dir)
        }
    }

    fn map_not_found(key: &str, e: std::io::Error) -> StorageError {
        if e.kind() == std::io::ErrorKind::NotFound {
            StorageError::NotFound(key.to_string())
        } else {
            StorageError::Io(e)
        }
    }
}

#[async_trait]
impl FileStore for FilesystemStore {
    #[instrument(skip(self), fields(backend = "filesystem"))]
    async fn list_files(&self, dir: &str) -> StorageResult<Vec<String>> {
        let path = self.dir_path(dir)?;
        let mut names = Vec::new();

        let mut entries = match fs::read_dir(&path).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(names),
            Err(e) => return Err(StorageError::Io(e)),
        };

        while let Some(entry) = entries.next_entry().await? {
            // file_type() does not follow symlinks; links are skipped so a
            // planted symlink cannot pull outside content into a listing.
            let file_type = entry.file_type().await?;
            if file_type.is_file() {
                names.push(entry.file_name().to_string_lossy().to_string());
            }
        }

        Ok(names)
    }

    #[instrument(skip(self), fields(backend = "filesystem"))]
    async fn list_dirs(&self, dir: &str) -> StorageResult<Vec<String>> {
        let path = self.dir_path(dir)?;
        let mut names = Vec::new();

        let mut entries = match fs::read_dir(&path).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(names),
            Err(e) => return Err(StorageError::Io(e)),
        };

        while let Some(entry) = entries.next_entry().await? {
            let file_type = entry.file_type().await?;
            if file_type.is_dir() {
                names.push(entry.file_name().to_string_lossy().to_string());
            }
        }

        Ok(names)
    }

    #[instrument(skip(self), fields(backend = "filesystem"))]
    async fn stat(&self, key: &str) -> StorageResult<FileMeta> {
        let path = self.key_path(key)?;
        let metadata = fs::metadata(&path)
            .await
            .map_err(|e| Self::map_not_found(key, e))?;

        let modified = metadata
            .modified()
            .map(time::OffsetDateTime::from)
            .unwrap_or(time::OffsetDateTime::UNIX_EPOCH);

        Ok(FileMeta {
            size: metadata.len(),
            modified,
        })
    }

    #[instrument(skip(self), fields(backend = "filesystem"))]
    async fn read(&self, key: &str) -> StorageResult<Bytes> {
        let path = self.key_path(key)?;
        let data = fs::read(&path)
            .await
            .map_err(|e| Self::map_not_found(key, e))?;
        Ok(Bytes::from(data))
    }

    #[instrument(skip(self, data), fields(backend = "filesystem", size = data.len()))]
    async fn write(&self, key: &str, data: Bytes) -> StorageResult<()> {
        let path = self.key_path(key)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }

        // Write to a uniquely named temp file, fsync, then rename, so a
        // concurrent reader never observes a partially written archive.
        let temp_name = format!(".tmp.{}", Uuid::new_v4());
        let temp_path = path.with_file_name(
            path.file_name()
                .map(|n| format!("{}{}", n.to_string_lossy(), temp_name))
                .unwrap_or_else(|| temp_name.clone()),
        );
        {
            let mut file = fs::File::create(&temp_path).await?;
            file.write_all(&data).await?;
            file.sync_all().await?;
        }
        fs::rename(&temp_path, &path).await?;

        Ok(())
    }

    #[instrument(skip(self), fields(backend = "filesystem"))]
    async fn delete(&self, key: &str) -> StorageResult<()> {
        let path = self.key_path(key)?;
        fs::remove_file(&path)
            .await
            .map_err(|e| Self::map_not_found(key, e))?;
        Ok(())
    }

    #[instrument(skip(self), fields(backend = "filesystem"))]
    async fn dir_exists(&self, dir: &str) -> StorageResult<bool> {
        let path = self.dir_path(dir)?;
        match fs::metadata(&path).await {
            Ok(metadata) => Ok(metadata.is_dir()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(StorageError::Io(e)),
        }
    }

    #[instrument(skip(self), fields(backend = "filesystem"))]
    async fn ensure_dir(&self, dir: &str) -> StorageResult<()> {
        let path = self.dir_path(dir)?;
        fs::create_dir_all(&path).await?;
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "filesystem"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn write_read_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FilesystemStore::new(dir.path()).await.unwrap();

        let key = "stable/foo-1.0.0.tgz";
        let data = Bytes::from("chart bytes");

        store.write(key, data.clone()).await.unwrap();
        let retrieved = store.read(key).await.unwrap();
        assert_eq!(retrieved, data);

        let meta = store.stat(key).await.unwrap();
        assert_eq!(meta.size, data.len() as u64);
    }

    #[tokio::test]
    async fn read_missing_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let store = FilesystemStore::new(dir.path()).await.unwrap();

        let err = store.read("stable/missing.tgz").await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn delete_missing_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let store = FilesystemStore::new(dir.path()).await.unwrap();

        let err = store.delete("stable/missing.tgz").await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn list_files_skips_directories() {
        let dir = tempfile::tempdir().unwrap();
        let store = FilesystemStore::new(dir.path()).await.unwrap();

        store.ensure_dir("stable").await.unwrap();
        store.ensure_dir("stable/nested").await.unwrap();
        store
            .write("stable/a-1.0.0.tgz", Bytes::from("a"))
            .await
            .unwrap();

        let files = store.list_files("stable").await.unwrap();
        assert_eq!(files, vec!["a-1.0.0.tgz".to_string()]);
    }

    #[tokio::test]
    async fn list_missing_dir_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = FilesystemStore::new(dir.path()).await.unwrap();

        assert!(store.list_files("nope").await.unwrap().is_empty());
        assert!(store.list_dirs("nope").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn list_dirs_finds_repositories() {
        let dir = tempfile::tempdir().unwrap();
        let store = FilesystemStore::new(dir.path()).await.unwrap();

        store.ensure_dir("stable").await.unwrap();
        store.ensure_dir("incubator").await.unwrap();
        store.write("loose.txt", Bytes::from("x")).await.unwrap();

        let mut dirs = store.list_dirs("").await.unwrap();
        dirs.sort();
        assert_eq!(dirs, vec!["incubator".to_string(), "stable".to_string()]);
    }

    #[tokio::test]
    async fn path_traversal_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let store = FilesystemStore::new(dir.path()).await.unwrap();

        assert!(store.read("../escape").await.is_err());
        assert!(store.read("/absolute/path").await.is_err());
        assert!(store.write("foo/../bar", Bytes::from("x")).await.is_err());
        assert!(store.delete("foo/../../etc/passwd").await.is_err());
    }
}
