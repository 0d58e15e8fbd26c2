//! Repository registry: the process-wide set of known repositories.

use crate::chart_index::ChartIndex;
use crate::error::IndexResult;
use charthouse_storage::FileStore;
use indexmap::IndexMap;
use std::sync::{Arc, RwLock};
use tokio::sync::{Mutex, MutexGuard};
use tracing::info;

/// The repository-list document for a registry with no repositories.
const EMPTY_REPOS_DOCUMENT: &str = "---\nrepos: []\n";

/// One named repository: its mutation lock and its published index.
///
/// The mutex linearizes all mutation (upload, delete, full rebuild) for
/// this repository. The index itself is published as an immutable
/// `Arc<ChartIndex>` snapshot: mutators build a complete, fully rendered
/// index while holding the mutex and then swap it in, so readers never
/// take the mutex and never observe a torn state.
pub struct Repository {
    name: String,
    mutation: Mutex<()>,
    current: RwLock<Arc<ChartIndex>>,
}

impl Repository {
    fn new(name: String, base_url: &str) -> Self {
        let index = ChartIndex::new(name.clone(), base_url);
        Self {
            name,
            mutation: Mutex::new(()),
            current: RwLock::new(Arc::new(index)),
        }
    }

    /// The repository name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Acquire the mutation lock. Held across an entire upload, delete,
    /// or full rebuild.
    pub async fn lock(&self) -> MutexGuard<'_, ()> {
        self.mutation.lock().await
    }

    /// The currently published index snapshot.
    pub fn current(&self) -> Arc<ChartIndex> {
        self.current.read().expect("index publication lock poisoned").clone()
    }

    /// Publish a new index snapshot. Callers must hold the mutation lock
    /// and pass a fully rendered index.
    pub fn publish(&self, index: Arc<ChartIndex>) {
        *self.current.write().expect("index publication lock poisoned") = index;
    }
}

/// Process-wide registry of repositories.
///
/// The creation mutex guards only insertion of new repositories; it is
/// never held during chart mutation or rendering. Lookups of existing
/// repositories go through the map's read lock only.
pub struct RepositoryRegistry {
    store: Arc<dyn FileStore>,
    base_url: String,
    creation: Mutex<()>,
    repos: RwLock<IndexMap<String, Arc<Repository>>>,
    repos_document: RwLock<Arc<String>>,
}

impl RepositoryRegistry {
    /// Create an empty registry.
    pub fn new(store: Arc<dyn FileStore>, base_url: impl Into<String>) -> Self {
        Self {
            store,
            base_url: base_url.into(),
            creation: Mutex::new(()),
            repos: RwLock::new(IndexMap::new()),
            repos_document: RwLock::new(Arc::new(EMPTY_REPOS_DOCUMENT.to_string())),
        }
    }

    /// The file store repositories live in.
    pub fn store(&self) -> &Arc<dyn FileStore> {
        &self.store
    }

    /// Ensure a repository exists, creating it lazily on first reference.
    ///
    /// Idempotent. Known repositories return on the fast path without the
    /// creation lock; unknown ones take it, create the backing directory,
    /// install an empty index, and re-render the repository-list document.
    pub async fn ensure(&self, name: &str) -> IndexResult<Arc<Repository>> {
        if let Some(repo) = self.get(name) {
            return Ok(repo);
        }

        let _guard = self.creation.lock().await;

        // Re-check: another task may have created it while we waited.
        if let Some(repo) = self.get(name) {
            return Ok(repo);
        }

        if !self.store.dir_exists(name).await? {
            self.store.ensure_dir(name).await?;
        }

        let repo = Arc::new(Repository::new(name.to_string(), &self.base_url));
        {
            let mut repos = self.repos.write().expect("registry lock poisoned");
            repos.insert(name.to_string(), repo.clone());

            let mut document = String::from("---\nrepos:\n");
            for repo_name in repos.keys() {
                document.push_str("- ");
                document.push_str(repo_name);
                document.push('\n');
            }
            *self.repos_document.write().expect("registry lock poisoned") = Arc::new(document);
        }

        info!(repo = name, "repository registered");
        Ok(repo)
    }

    /// Look up a known repository. Read paths use this so they never
    /// create repositories as a side effect.
    pub fn get(&self, name: &str) -> Option<Arc<Repository>> {
        self.repos
            .read()
            .expect("registry lock poisoned")
            .get(name)
            .cloned()
    }

    /// Snapshot of all known repositories, in registration order.
    pub fn repositories(&self) -> Vec<Arc<Repository>> {
        self.repos
            .read()
            .expect("registry lock poisoned")
            .values()
            .cloned()
            .collect()
    }

    /// The cached repository-list document.
    pub fn repos_document(&self) -> Arc<String> {
        self.repos_document
            .read()
            .expect("registry lock poisoned")
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use charthouse_storage::FilesystemStore;

    async fn registry() -> (tempfile::TempDir, RepositoryRegistry) {
        let temp = tempfile::tempdir().unwrap();
        let store: Arc<dyn FileStore> =
            Arc::new(FilesystemStore::new(temp.path()).await.unwrap());
        (temp, RepositoryRegistry::new(store, ""))
    }

    #[tokio::test]
    async fn empty_registry_document() {
        let (_temp, registry) = registry().await;
        assert_eq!(*registry.repos_document(), "---\nrepos: []\n");
        assert!(registry.get("stable").is_none());
    }

    #[tokio::test]
    async fn ensure_creates_directory_and_document() {
        let (_temp, registry) = registry().await;

        registry.ensure("stable").await.unwrap();
        registry.ensure("incubator").await.unwrap();

        assert!(registry.store().dir_exists("stable").await.unwrap());
        assert_eq!(
            *registry.repos_document(),
            "---\nrepos:\n- stable\n- incubator\n"
        );
    }

    #[tokio::test]
    async fn ensure_is_idempotent() {
        let (_temp, registry) = registry().await;

        let first = registry.ensure("stable").await.unwrap();
        let second = registry.ensure("stable").await.unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(*registry.repos_document(), "---\nrepos:\n- stable\n");
    }

    #[tokio::test]
    async fn new_repository_starts_empty() {
        let (_temp, registry) = registry().await;
        let repo = registry.ensure("stable").await.unwrap();
        assert!(repo.current().is_empty());
        assert_eq!(repo.current().render().json, "{}");
    }

    #[tokio::test]
    async fn concurrent_ensure_single_insertion() {
        let (_temp, registry) = registry().await;
        let registry = Arc::new(registry);

        let mut handles = Vec::new();
        for _ in 0..8 {
            let registry = registry.clone();
            handles.push(tokio::spawn(async move {
                registry.ensure("stable").await.unwrap();
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(registry.repositories().len(), 1);
        assert_eq!(*registry.repos_document(), "---\nrepos:\n- stable\n");
    }
}
