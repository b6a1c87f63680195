use axum::Json;
use axum::extract::FromRequestParts;
use axum::http::{HeaderMap, StatusCode, request::Parts};
use axum::response::{IntoResponse, Response};
use serde_json::json;
use subtle::ConstantTimeEq;

use crate::router::FlowState;

fn key_matches(candidate: &str, expected: &str) -> bool {
    candidate.as_bytes().ct_eq(expected.as_bytes()).into()
}

/// Ensure the inbound request carries the server key.
/// Accepts either:
/// - Header: `Authorization: Bearer <key>`
/// - Header: `x-api-key: <key>`
/// - Query string: `?key=...`
pub fn ensure_authorized(
    headers: &HeaderMap,
    query: Option<&str>,
    expected: &str,
) -> Result<(), Response> {
    if expected.is_empty() {
        return Err((
            StatusCode::UNAUTHORIZED,
            Json(json!({"error": "unauthorized", "reason": "server key not configured"})),
        )
            .into_response());
    }

    // 1) header: Authorization: Bearer <key>
    if let Some(auth) = headers.get("authorization").and_then(|v| v.to_str().ok()) {
        let auth = auth.trim();
        if let Some(token) = auth
            .strip_prefix("Bearer ")
            .or_else(|| auth.strip_prefix("bearer "))
            && key_matches(token, expected)
        {
            return Ok(());
        }
    }

    // 2) header: x-api-key
    if let Some(hv) = headers.get("x-api-key").and_then(|v| v.to_str().ok())
        && key_matches(hv, expected)
    {
        return Ok(());
    }

    // 3) query: key=...
    if let Some(qs) = query {
        for (k, v) in url::form_urlencoded::parse(qs.as_bytes()) {
            if k == "key" && key_matches(&v, expected) {
                return Ok(());
            }
        }
    }

    Err((
        StatusCode::UNAUTHORIZED,
        Json(json!({"error": "unauthorized", "reason": "invalid or missing key"})),
    )
        .into_response())
}

#[derive(Debug, Clone, Copy)]
pub struct RequireKeyAuth;

impl FromRequestParts<FlowState> for RequireKeyAuth {
    type Rejection = Response;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &FlowState,
    ) -> Result<Self, Self::Rejection> {
        let headers = &parts.headers;
        let query = parts.uri.query();
        ensure_authorized(headers, query, state.api_key())?;
        Ok(Self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn bearer_header_is_accepted() {
        let mut headers = HeaderMap::new();
        headers.insert("authorization", HeaderValue::from_static("Bearer s3cret"));
        assert!(ensure_authorized(&headers, None, "s3cret").is_ok());
    }

    #[test]
    fn api_key_header_is_accepted() {
        let mut headers = HeaderMap::new();
        headers.insert("x-api-key", HeaderValue::from_static("s3cret"));
        assert!(ensure_authorized(&headers, None, "s3cret").is_ok());
    }

    #[test]
    fn query_key_is_accepted() {
        let headers = HeaderMap::new();
        assert!(ensure_authorized(&headers, Some("key=s3cret"), "s3cret").is_ok());
    }

    #[test]
    fn wrong_or_missing_key_is_rejected() {
        let mut headers = HeaderMap::new();
        headers.insert("x-api-key", HeaderValue::from_static("nope"));
        assert!(ensure_authorized(&headers, None, "s3cret").is_err());
        assert!(ensure_authorized(&HeaderMap::new(), None, "s3cret").is_err());
    }

    #[test]
    fn empty_server_key_rejects_everything() {
        let headers = HeaderMap::new();
        assert!(ensure_authorized(&headers, Some("key="), "").is_err());
    }
}
