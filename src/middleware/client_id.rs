use std::net::SocketAddr;

use axum::extract::{ConnectInfo, FromRequestParts};
use axum::http::request::Parts;

const MAX_CLIENT_ID_LEN: usize = 128;

/// Anonymous caller identity. `id` is the `X-Client-Id` header when
/// present and sane, otherwise the peer IP, otherwise "unknown".
#[derive(Debug, Clone)]
pub struct ClientId {
    pub id: String,
    ip: String,
    from_header: bool,
}

impl ClientId {
    pub fn as_str(&self) -> &str {
        &self.id
    }

    /// Rate-limit partition key. Combines IP and client id so changing the
    /// header alone cannot bypass limits.
    pub fn partition_key(&self) -> String {
        if self.from_header {
            format!("{}:{}", self.ip, self.id)
        } else {
            self.ip.clone()
        }
    }
}

impl<S> FromRequestParts<S> for ClientId
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let ip = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|info| info.0.ip().to_string())
            .unwrap_or_else(|| "unknown".to_string());

        let header = parts
            .headers
            .get("x-client-id")
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty() && v.len() <= MAX_CLIENT_ID_LEN);

        Ok(match header {
            Some(id) => Self {
                id: id.to_string(),
                ip,
                from_header: true,
            },
            None => Self {
                id: ip.clone(),
                ip,
                from_header: false,
            },
        })
    }
}
