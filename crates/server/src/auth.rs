//! HTTP Basic authentication middleware.

use crate::error::ApiError;
use crate::state::AppState;
use axum::extract::{Request, State};
use axum::http::Method;
use axum::http::header::AUTHORIZATION;
use axum::middleware::Next;
use axum::response::Response;
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use charthouse_core::config::AuthConfig;
use sha2::{Digest, Sha256};

/// Extract username and password from a Basic Authorization header.
/// Per RFC 7617, the "Basic" scheme is case-insensitive.
fn extract_basic_credentials(req: &Request) -> Option<(String, String)> {
    let value = req.headers().get(AUTHORIZATION)?.to_str().ok()?;
    if value.len() < 6 || !value[..6].eq_ignore_ascii_case("basic ") {
        return None;
    }

    let decoded = BASE64.decode(value[6..].trim()).ok()?;
    let decoded = String::from_utf8(decoded).ok()?;
    let (user, password) = decoded.split_once(':')?;
    Some((user.to_string(), password.to_string()))
}

/// Compare two secrets by their SHA-256 digests. The fixed-length
/// comparison avoids leaking the configured value's length.
fn digests_match(supplied: &str, expected: &str) -> bool {
    Sha256::digest(supplied.as_bytes()) == Sha256::digest(expected.as_bytes())
}

fn credentials_valid(req: &Request, auth: &AuthConfig) -> bool {
    match extract_basic_credentials(req) {
        Some((user, password)) => {
            digests_match(&user, &auth.username) & digests_match(&password, &auth.password)
        }
        None => false,
    }
}

/// Authentication middleware.
///
/// With no `auth` section configured everything is anonymous. When
/// configured, mutating methods always require credentials; reads require
/// them unless `anonymous_read` is set. `/health` is never authenticated
/// so probes keep working behind locked-down deployments.
pub async fn auth_middleware(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let Some(auth) = &state.config.auth else {
        return Ok(next.run(req).await);
    };

    if req.uri().path() == "/health" {
        return Ok(next.run(req).await);
    }

    let is_read = matches!(*req.method(), Method::GET | Method::HEAD);
    if is_read && auth.anonymous_read {
        return Ok(next.run(req).await);
    }

    if !credentials_valid(&req, auth) {
        return Err(ApiError::Unauthorized(
            "valid credentials required".to_string(),
        ));
    }

    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;

    fn request_with_auth(header: &str) -> Request {
        Request::builder()
            .uri("/")
            .header(AUTHORIZATION, header)
            .body(Body::empty())
            .unwrap()
    }

    #[test]
    fn extracts_basic_credentials() {
        let encoded = BASE64.encode("user:pa:ss");
        let req = request_with_auth(&format!("Basic {encoded}"));
        let (user, password) = extract_basic_credentials(&req).unwrap();
        assert_eq!(user, "user");
        // Only the first colon separates user from password.
        assert_eq!(password, "pa:ss");
    }

    #[test]
    fn scheme_is_case_insensitive() {
        let encoded = BASE64.encode("user:pass");
        let req = request_with_auth(&format!("bAsIc {encoded}"));
        assert!(extract_basic_credentials(&req).is_some());
    }

    #[test]
    fn rejects_other_schemes_and_garbage() {
        assert!(extract_basic_credentials(&request_with_auth("Bearer abc")).is_none());
        assert!(extract_basic_credentials(&request_with_auth("Basic !!!not-base64")).is_none());

        let no_colon = BASE64.encode("nocolon");
        assert!(extract_basic_credentials(&request_with_auth(&format!("Basic {no_colon}"))).is_none());
    }

    #[test]
    fn digest_comparison() {
        assert!(digests_match("secret", "secret"));
        assert!(!digests_match("secret", "Secret"));
        assert!(!digests_match("", "secret"));
    }
}
