//! Request handlers.

pub mod charts;
pub mod common;
pub mod download;
pub mod index;
pub mod info;

pub use charts::{delete_chart_version, post_chart, post_prov};
pub use download::get_chart_file;
pub use index::{get_chart, get_chart_version, get_repo_charts, get_repo_index};
pub use info::{get_info, get_repos, health_check};
