//! Mutating endpoints: chart upload, provenance upload, deletion.

use crate::error::{ApiError, ApiResult};
use crate::handlers::common::json_document;
use crate::state::AppState;
use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::response::Response;
use charthouse_index::UploadedFile;

/// Pull the configured chart and provenance parts out of a multipart form.
/// Unrecognized fields are ignored, as are parts without a filename.
async fn extract_upload_parts(
    state: &AppState,
    multipart: &mut Multipart,
) -> ApiResult<(Option<UploadedFile>, Option<UploadedFile>)> {
    let chart_field = &state.config.upload.chart_field;
    let prov_field = &state.config.upload.prov_field;

    let mut chart = None;
    let mut prov = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("malformed multipart body: {e}")))?
    {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };
        let Some(filename) = field.file_name().map(str::to_string) else {
            continue;
        };

        if name == *chart_field || name == *prov_field {
            let bytes = field
                .bytes()
                .await
                .map_err(|e| ApiError::BadRequest(format!("failed to read part {name}: {e}")))?;
            let file = UploadedFile { filename, bytes };

            if name == *chart_field {
                chart = Some(file);
            } else {
                prov = Some(file);
            }
        }
    }

    Ok((chart, prov))
}

/// `POST /api/{repo}/charts` - upload a chart archive, optionally with a
/// provenance sidecar in the same form.
pub async fn post_chart(
    State(state): State<AppState>,
    Path(repo): Path<String>,
    mut multipart: Multipart,
) -> ApiResult<(StatusCode, Response)> {
    let (chart, prov) = extract_upload_parts(&state, &mut multipart).await?;
    let chart = chart.ok_or_else(|| {
        ApiError::BadRequest(format!(
            "missing chart form field: {}",
            state.config.upload.chart_field
        ))
    })?;

    let repository = state.registry.ensure(&repo).await?;
    state.builder.apply_upload(&repository, chart, prov).await?;

    Ok((StatusCode::CREATED, json_document("{\"saved\":true}")))
}

/// `POST /api/{repo}/prov` - upload a standalone provenance sidecar.
pub async fn post_prov(
    State(state): State<AppState>,
    Path(repo): Path<String>,
    mut multipart: Multipart,
) -> ApiResult<(StatusCode, Response)> {
    let (_, prov) = extract_upload_parts(&state, &mut multipart).await?;
    let prov = prov.ok_or_else(|| {
        ApiError::BadRequest(format!(
            "missing provenance form field: {}",
            state.config.upload.prov_field
        ))
    })?;

    let repository = state.registry.ensure(&repo).await?;
    state.builder.apply_prov(&repository, prov).await?;

    Ok((StatusCode::CREATED, json_document("{\"saved\":true}")))
}

/// `DELETE /api/{repo}/charts/{chart}/{version}` - remove a chart version.
pub async fn delete_chart_version(
    State(state): State<AppState>,
    Path((repo, chart, version)): Path<(String, String, String)>,
) -> ApiResult<Response> {
    let repository = state
        .registry
        .get(&repo)
        .ok_or_else(|| ApiError::NotFound(format!("{repo} not found")))?;

    state
        .builder
        .apply_delete(&repository, &chart, &version)
        .await?;

    Ok(json_document("{\"deleted\":true}"))
}
