//! Service-level endpoints: health, repository list, version info.

use crate::handlers::common::{json_document, yaml_document};
use crate::state::AppState;
use axum::extract::State;
use axum::response::Response;

/// `GET /health` - liveness probe, never authenticated.
pub async fn health_check() -> Response {
    json_document("{\"healthy\":true}")
}

/// `GET /` - the repository-list document.
pub async fn get_repos(State(state): State<AppState>) -> Response {
    yaml_document(state.registry.repos_document().as_str())
}

/// `GET /info` - server version.
pub async fn get_info() -> Response {
    json_document(format!(
        "{{\"version\":\"v{}\"}}",
        env!("CARGO_PKG_VERSION")
    ))
}
