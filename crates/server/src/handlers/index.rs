//! Read-path endpoints serving cached index documents.
//!
//! Every response body here is a pre-rendered string; no YAML or JSON is
//! produced at request time.

use crate::error::{ApiError, ApiResult};
use crate::handlers::common::{json_document, yaml_document};
use crate::state::AppState;
use axum::extract::{Path, State};
use axum::response::Response;
use charthouse_index::empty_repo_rendering;

/// `GET /{repo}/index.yaml` - the repository's YAML index.
///
/// Unknown repositories serve a well-formed empty index rather than an
/// error, so `helm repo add` works before the first upload.
pub async fn get_repo_index(
    State(state): State<AppState>,
    Path(repo): Path<String>,
) -> Response {
    match state.registry.get(&repo) {
        Some(repo) => yaml_document(repo.current().render().yaml.clone()),
        None => yaml_document(empty_repo_rendering().yaml),
    }
}

/// `GET /api/{repo}/charts` - the repository's JSON index. Unknown
/// repositories serve `{}`.
pub async fn get_repo_charts(
    State(state): State<AppState>,
    Path(repo): Path<String>,
) -> Response {
    match state.registry.get(&repo) {
        Some(repo) => json_document(repo.current().render().json.clone()),
        None => json_document("{}"),
    }
}

/// `GET /api/{repo}/charts/{chart}` - one chart's version list.
pub async fn get_chart(
    State(state): State<AppState>,
    Path((repo, chart)): Path<(String, String)>,
) -> ApiResult<Response> {
    let repository = state
        .registry
        .get(&repo)
        .ok_or_else(|| ApiError::NotFound(format!("{repo} not found")))?;

    let index = repository.current();
    let rendered = index
        .chart_rendering(&chart)
        .ok_or_else(|| ApiError::NotFound(format!("{repo}/{chart} not found")))?;

    Ok(json_document(rendered.json.clone()))
}

/// `GET /api/{repo}/charts/{chart}/{version}` - one version entry.
pub async fn get_chart_version(
    State(state): State<AppState>,
    Path((repo, chart, version)): Path<(String, String, String)>,
) -> ApiResult<Response> {
    let repository = state
        .registry
        .get(&repo)
        .ok_or_else(|| ApiError::NotFound(format!("{repo} not found")))?;

    let index = repository.current();
    if !index.contains_chart(&chart) {
        return Err(ApiError::NotFound(format!("{repo}/{chart} not found")));
    }
    let rendered = index
        .version_rendering(&chart, &version)
        .ok_or_else(|| ApiError::NotFound(format!("{repo}/{chart}-{version} not found")))?;

    Ok(json_document(rendered.json.clone()))
}
