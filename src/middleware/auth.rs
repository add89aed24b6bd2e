use axum::Json;
use axum::extract::FromRequestParts;
use axum::http::{HeaderMap, StatusCode, request::Parts};
use axum::response::{IntoResponse, Response};
use serde_json::json;

use crate::config::CONFIG;

/// Ensure the inbound request carries the admin key.
/// Accepts either:
/// - Header: `x-api-key: ...`
/// - Header: `Authorization: Bearer <key>`
///   Requires the server key to be configured via `FORGE_ADMIN_KEY`.
pub fn ensure_authorized(headers: &HeaderMap) -> Result<(), Response> {
    let expected = CONFIG.admin_key.as_str();

    if !expected.is_empty() {
        if let Some(hv) = headers.get("x-api-key").and_then(|v| v.to_str().ok())
            && hv == expected
        {
            return Ok(());
        }

        if let Some(auth) = headers.get("authorization").and_then(|v| v.to_str().ok()) {
            let auth = auth.trim();
            if let Some(token) = auth
                .strip_prefix("Bearer ")
                .or_else(|| auth.strip_prefix("bearer "))
                && token == expected
            {
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
pub struct RequireAdminKey;

impl<S> FromRequestParts<S> for RequireAdminKey
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        ensure_authorized(&parts.headers)?;
        Ok(Self)
    }
}
