//! Configuration types shared across crates.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Top-level application configuration.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,
    /// File store backend.
    #[serde(default)]
    pub storage: StorageConfig,
    /// Index cache settings.
    #[serde(default)]
    pub index: IndexConfig,
    /// Upload form settings.
    #[serde(default)]
    pub upload: UploadConfig,
    /// Optional HTTP Basic authentication. When absent, all access is
    /// anonymous.
    #[serde(default)]
    pub auth: Option<AuthConfig>,
}

impl AppConfig {
    /// Create a test configuration rooted at the given storage path.
    ///
    /// **For testing only.**
    pub fn for_testing(storage_path: PathBuf) -> Self {
        Self {
            storage: StorageConfig::Filesystem { path: storage_path },
            ..Default::default()
        }
    }
}

/// HTTP server configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

/// File store backend configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum StorageConfig {
    /// Local filesystem storage.
    Filesystem {
        /// Root directory; each repository is one subdirectory.
        path: PathBuf,
    },
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self::Filesystem {
            path: PathBuf::from("./data/storage"),
        }
    }
}

/// Index cache configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct IndexConfig {
    /// Base URL prefixed to chart download URLs in rendered documents
    /// (e.g., "https://charts.example.com").
    #[serde(default)]
    pub base_url: String,
    /// Whether re-uploading an existing (chart, version) replaces it.
    #[serde(default = "default_allow_overwrite")]
    pub allow_overwrite: bool,
    /// Interval between periodic full rebuilds, in seconds.
    /// Zero means rebuild only at startup.
    #[serde(default)]
    pub rebuild_interval_secs: u64,
    /// Ceiling on concurrent digest workers during a full rebuild.
    #[serde(default = "default_digest_workers")]
    pub digest_workers: usize,
    /// Files-per-worker ratio used to size the digest pool for large
    /// repositories.
    #[serde(default = "default_digest_ratio")]
    pub digest_ratio: usize,
}

impl IndexConfig {
    /// Get the rebuild interval, or None when periodic rebuilds are off.
    pub fn rebuild_interval(&self) -> Option<Duration> {
        if self.rebuild_interval_secs > 0 {
            Some(Duration::from_secs(self.rebuild_interval_secs))
        } else {
            None
        }
    }
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            allow_overwrite: default_allow_overwrite(),
            rebuild_interval_secs: 0,
            digest_workers: default_digest_workers(),
            digest_ratio: default_digest_ratio(),
        }
    }
}

/// Multipart upload form configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct UploadConfig {
    /// Form field name carrying the chart archive.
    #[serde(default = "default_chart_field")]
    pub chart_field: String,
    /// Form field name carrying the provenance sidecar.
    #[serde(default = "default_prov_field")]
    pub prov_field: String,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            chart_field: default_chart_field(),
            prov_field: default_prov_field(),
        }
    }
}

/// HTTP Basic authentication configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Expected username.
    pub username: String,
    /// Expected password.
    pub password: String,
    /// Allow unauthenticated GET/HEAD requests.
    #[serde(default)]
    pub anonymous_read: bool,
}

fn default_bind() -> String {
    "127.0.0.1:8080".to_string()
}

fn default_allow_overwrite() -> bool {
    true
}

fn default_digest_workers() -> usize {
    50
}

fn default_digest_ratio() -> usize {
    1024
}

fn default_chart_field() -> String {
    "chart".to_string()
}

fn default_prov_field() -> String {
    "prov".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = AppConfig::default();
        assert_eq!(config.server.bind, "127.0.0.1:8080");
        assert!(config.index.allow_overwrite);
        assert_eq!(config.index.digest_workers, 50);
        assert_eq!(config.index.digest_ratio, 1024);
        assert!(config.index.rebuild_interval().is_none());
        assert_eq!(config.upload.chart_field, "chart");
        assert_eq!(config.upload.prov_field, "prov");
        assert!(config.auth.is_none());
    }

    #[test]
    fn rebuild_interval_positive() {
        let index = IndexConfig {
            rebuild_interval_secs: 300,
            ..Default::default()
        };
        assert_eq!(index.rebuild_interval(), Some(Duration::from_secs(300)));
    }
}
