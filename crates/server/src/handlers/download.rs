//! Chart archive download endpoint.

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;
use axum::extract::{Path, State};
use axum::http::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use axum::response::{IntoResponse, Response};
use charthouse_core::CHART_EXTENSION;

/// `GET /{repo}/charts/{file}` - serve a stored file as an attachment.
///
/// Files are served straight from the store, not through the index, so
/// provenance sidecars and not-yet-indexed archives download fine.
pub async fn get_chart_file(
    State(state): State<AppState>,
    Path((repo, file)): Path<(String, String)>,
) -> ApiResult<Response> {
    let key = format!("{repo}/{file}");
    let bytes = state.store.read(&key).await.map_err(|e| {
        if e.is_not_found() {
            ApiError::NotFound(format!("{repo}/{file} not found"))
        } else {
            ApiError::Storage(e)
        }
    })?;

    let content_type = if file.ends_with(CHART_EXTENSION) {
        "application/x-tar"
    } else {
        "text/plain; charset=utf-8"
    };

    Ok((
        [
            (CONTENT_TYPE, content_type.to_string()),
            (
                CONTENT_DISPOSITION,
                format!("attachment; filename=\"{file}\""),
            ),
        ],
        bytes,
    )
        .into_response())
}
