//! Index construction: full rebuilds and incremental mutations.

use crate::chart_index::ChartIndex;
use crate::entry::ChartVersionEntry;
use crate::error::{IndexError, IndexResult};
use crate::registry::Repository;
use bytes::Bytes;
use charthouse_core::config::IndexConfig;
use charthouse_core::{
    CHART_EXTENSION, ContentDigest, CreatedStamps, PROVENANCE_EXTENSION, parse_archive_filename,
    split_name_version,
};
use charthouse_storage::FileStore;
use futures::StreamExt;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// An uploaded file part: its client-supplied filename and content.
#[derive(Clone, Debug)]
pub struct UploadedFile {
    pub filename: String,
    pub bytes: Bytes,
}

/// Builds and mutates repository indexes against the file store.
///
/// Every operation runs under the target repository's mutation lock and
/// publishes a fully rendered index before releasing it. Full rebuilds
/// replace the index wholesale; uploads and deletes clone the current
/// snapshot, apply one change, and publish the clone.
pub struct IndexBuilder {
    store: Arc<dyn FileStore>,
    config: IndexConfig,
}

impl IndexBuilder {
    /// Create a builder over a file store.
    pub fn new(store: Arc<dyn FileStore>, config: IndexConfig) -> Self {
        Self { store, config }
    }

    /// Size of the digest worker pool for a rebuild of `file_count` files.
    ///
    /// Small repositories get one worker per file; large ones scale with
    /// `file_count / ratio` up to the configured ceiling.
    pub fn pool_size(file_count: usize, limit: usize, ratio: usize) -> usize {
        if file_count == 0 {
            return 0;
        }
        if file_count < limit {
            return file_count;
        }
        let scaled = file_count / ratio.max(1) + 1;
        scaled.min(limit)
    }

    /// Rebuild a repository's index from a fresh directory scan and
    /// publish it as a single snapshot swap.
    pub async fn full_rebuild(&self, repo: &Repository) -> IndexResult<()> {
        let _guard = repo.lock().await;

        let files = self.store.list_files(repo.name()).await?;

        // Filter to versioned archives; listing order is preserved all the
        // way into the rendered documents.
        let candidates: Vec<(String, String, String)> = files
            .into_iter()
            .filter_map(|filename| {
                let stem = filename.strip_suffix(CHART_EXTENSION)?;
                let parsed = split_name_version(stem);
                if !parsed.has_version() {
                    return None;
                }
                Some((filename, parsed.chart, parsed.version))
            })
            .collect();

        let pool = Self::pool_size(
            candidates.len(),
            self.config.digest_workers,
            self.config.digest_ratio,
        );

        let entries: Vec<ChartVersionEntry> = if candidates.is_empty() {
            Vec::new()
        } else {
            let scanned: Vec<Option<ChartVersionEntry>> =
                futures::stream::iter(candidates.into_iter().map(|(filename, chart, version)| {
                    let store = self.store.clone();
                    let repo_name = repo.name().to_string();
                    async move {
                        scan_entry(store.as_ref(), &repo_name, filename, chart, version).await
                    }
                }))
                .buffered(pool)
                .collect()
                .await;
            scanned.into_iter().flatten().collect()
        };

        let count = entries.len();
        let index = ChartIndex::from_entries(repo.name(), &self.config.base_url, entries);
        repo.publish(Arc::new(index));

        info!(repo = repo.name(), charts = count, "index rebuilt");
        Ok(())
    }

    /// Persist an uploaded archive (and optional provenance sidecar) and
    /// apply it to the repository's index.
    ///
    /// Fails atomically: filename validation and the overwrite check run
    /// before anything is written, so a rejected upload leaves both the
    /// store and the index untouched.
    pub async fn apply_upload(
        &self,
        repo: &Repository,
        chart: UploadedFile,
        prov: Option<UploadedFile>,
    ) -> IndexResult<ChartVersionEntry> {
        let _guard = repo.lock().await;

        let filename = basename(&chart.filename).to_string();
        let parsed = parse_archive_filename(&filename, CHART_EXTENSION)?;

        let prov_filename = match &prov {
            Some(file) => {
                let name = basename(&file.filename).to_string();
                parse_archive_filename(&name, PROVENANCE_EXTENSION)?;
                Some(name)
            }
            None => None,
        };

        let current = repo.current();
        if !self.config.allow_overwrite && current.contains(&parsed.chart, &parsed.version) {
            return Err(IndexError::OverwriteDenied {
                chart: parsed.chart,
                version: parsed.version,
            });
        }

        let key = format!("{}/{}", repo.name(), filename);
        // The digest is taken from the upload buffer rather than re-read
        // from the store; the atomic write path makes them equivalent.
        let digest = ContentDigest::compute(&chart.bytes);
        self.store.write(&key, chart.bytes).await?;

        if let (Some(file), Some(name)) = (prov, prov_filename) {
            let prov_key = format!("{}/{}", repo.name(), name);
            self.store.write(&prov_key, file.bytes).await?;
        }

        let meta = self.store.stat(&key).await?;
        let entry = ChartVersionEntry {
            chart: parsed.chart,
            version: parsed.version,
            filename,
            digest,
            created: CreatedStamps::from_time(meta.modified),
        };

        let mut next = (*current).clone();
        next.upsert_version(entry.clone());
        repo.publish(Arc::new(next));

        info!(
            repo = repo.name(),
            chart = entry.chart,
            version = entry.version,
            "chart uploaded"
        );
        Ok(entry)
    }

    /// Persist a standalone provenance sidecar. The index is not touched.
    pub async fn apply_prov(&self, repo: &Repository, prov: UploadedFile) -> IndexResult<()> {
        let filename = basename(&prov.filename).to_string();
        parse_archive_filename(&filename, PROVENANCE_EXTENSION)?;

        let key = format!("{}/{}", repo.name(), filename);
        self.store.write(&key, prov.bytes).await?;
        Ok(())
    }

    /// Remove a chart version from the index, deleting its backing files
    /// on a best-effort basis.
    ///
    /// The index is the source of truth for existence: a file-store
    /// deletion failure is logged and the index mutation proceeds.
    pub async fn apply_delete(
        &self,
        repo: &Repository,
        chart: &str,
        version: &str,
    ) -> IndexResult<()> {
        let _guard = repo.lock().await;

        let current = repo.current();
        let entry = current.entry(chart, version).ok_or_else(|| {
            if current.contains_chart(chart) {
                IndexError::VersionNotFound {
                    repo: repo.name().to_string(),
                    chart: chart.to_string(),
                    version: version.to_string(),
                }
            } else {
                IndexError::ChartNotFound {
                    repo: repo.name().to_string(),
                    chart: chart.to_string(),
                }
            }
        })?;

        let archive_key = format!("{}/{}", repo.name(), entry.filename);
        let prov_key = format!("{archive_key}.prov");
        for key in [&archive_key, &prov_key] {
            if let Err(e) = self.store.delete(key).await {
                if e.is_not_found() {
                    debug!(repo = repo.name(), key = %key, "no file to delete");
                } else {
                    warn!(repo = repo.name(), key = %key, error = %e, "best-effort delete failed");
                }
            }
        }

        let mut next = (*current).clone();
        next.remove_version(chart, version)?;
        repo.publish(Arc::new(next));

        info!(repo = repo.name(), chart, version, "chart deleted");
        Ok(())
    }
}

/// Digest and stat one scanned file. Files that vanished or cannot be
/// read between listing and digesting yield no entry.
async fn scan_entry(
    store: &dyn FileStore,
    repo: &str,
    filename: String,
    chart: String,
    version: String,
) -> Option<ChartVersionEntry> {
    let key = format!("{repo}/{filename}");

    let bytes = match store.read(&key).await {
        Ok(bytes) => bytes,
        Err(e) => {
            debug!(repo, key = %key, error = %e, "skipping unreadable file");
            return None;
        }
    };
    let meta = match store.stat(&key).await {
        Ok(meta) => meta,
        Err(e) => {
            debug!(repo, key = %key, error = %e, "skipping unstatable file");
            return None;
        }
    };

    Some(ChartVersionEntry {
        chart,
        version,
        filename,
        digest: ContentDigest::compute(&bytes),
        created: CreatedStamps::from_time(meta.modified),
    })
}

/// Strip any path components from a client-supplied filename.
fn basename(name: &str) -> &str {
    name.rsplit(['/', '\\']).next().unwrap_or(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pool_size_zero_files() {
        assert_eq!(IndexBuilder::pool_size(0, 50, 1024), 0);
    }

    #[test]
    fn pool_size_small_repo_one_worker_per_file() {
        assert_eq!(IndexBuilder::pool_size(1, 50, 1024), 1);
        assert_eq!(IndexBuilder::pool_size(49, 50, 1024), 49);
    }

    #[test]
    fn pool_size_large_repo_scales_with_ratio() {
        assert_eq!(IndexBuilder::pool_size(50, 50, 1024), 1);
        assert_eq!(IndexBuilder::pool_size(2048, 50, 1024), 3);
        assert_eq!(IndexBuilder::pool_size(10_240, 50, 1024), 11);
    }

    #[test]
    fn pool_size_never_exceeds_limit() {
        assert_eq!(IndexBuilder::pool_size(1_000_000, 50, 1024), 50);
    }

    #[test]
    fn basename_strips_paths() {
        assert_eq!(basename("foo-1.0.0.tgz"), "foo-1.0.0.tgz");
        assert_eq!(basename("/tmp/foo-1.0.0.tgz"), "foo-1.0.0.tgz");
        assert_eq!(basename("..\\evil\\foo-1.0.0.tgz"), "foo-1.0.0.tgz");
    }
}
