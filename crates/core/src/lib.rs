//! Core domain types and shared logic for the charthouse chart repository.
//!
//! This crate defines the canonical data model used across all other crates:
//! - Chart filename parsing (name/version splitting)
//! - Content digests
//! - Timestamp text encodings used by the rendered index documents
//! - Configuration types

pub mod config;
pub mod digest;
pub mod error;
pub mod name_version;
pub mod timestamp;

pub use config::{AppConfig, AuthConfig, IndexConfig, ServerConfig, StorageConfig, UploadConfig};
pub use digest::ContentDigest;
pub use error::{Error, Result};
pub use name_version::{NameVersion, parse_archive_filename, split_name_version};
pub use timestamp::{CreatedStamps, generated_stamp};

/// File extension for chart archives.
pub const CHART_EXTENSION: &str = ".tgz";

/// File extension for provenance sidecar files.
pub const PROVENANCE_EXTENSION: &str = ".tgz.prov";
