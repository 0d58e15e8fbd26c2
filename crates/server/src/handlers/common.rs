//! Shared response constructors for handlers.

use axum::http::header::CONTENT_TYPE;
use axum::response::{IntoResponse, Response};

pub const CONTENT_TYPE_JSON: &str = "application/json; charset=utf-8";
pub const CONTENT_TYPE_YAML: &str = "application/x-yaml";

/// A JSON response from a pre-rendered document string.
pub fn json_document(body: impl Into<String>) -> Response {
    ([(CONTENT_TYPE, CONTENT_TYPE_JSON)], body.into()).into_response()
}

/// A YAML response from a pre-rendered document string.
pub fn yaml_document(body: impl Into<String>) -> Response {
    ([(CONTENT_TYPE, CONTENT_TYPE_YAML)], body.into()).into_response()
}
