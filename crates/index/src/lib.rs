//! In-memory chart index for charthouse.
//!
//! Each repository's index lives entirely in memory as an immutable,
//! fully rendered snapshot. Mutators (upload, delete, rebuild) build the
//! next snapshot under a per-repository lock and swap it in atomically;
//! readers serve cached document strings without locking or rendering.

pub mod builder;
pub mod chart_index;
pub mod entry;
pub mod error;
pub mod registry;
pub mod scheduler;

pub use builder::{IndexBuilder, UploadedFile};
pub use chart_index::{ChartIndex, empty_repo_rendering};
pub use entry::{ChartVersionEntry, Rendered};
pub use error::{IndexError, IndexResult};
pub use registry::{Repository, RepositoryRegistry};
pub use scheduler::RebuildScheduler;
