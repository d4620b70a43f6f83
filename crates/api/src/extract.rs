//! Request extractors for the operational endpoints.

use std::convert::Infallible;
use std::net::SocketAddr;

use axum::extract::{ConnectInfo, FromRequestParts, Query};
use axum::http::request::Parts;
use serde::Deserialize;

use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
struct KeyParams {
    key: Option<String>,
}

/// Proof that the request carried the shared secret in `?key=`.
///
/// Rejects with 401 before the handler body runs. When no secret is
/// configured every request is rejected.
#[derive(Debug, Clone, Copy)]
pub struct CronAuth;

impl FromRequestParts<AppState> for CronAuth {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let provided = Query::<KeyParams>::try_from_uri(&parts.uri)
            .ok()
            .and_then(|Query(params)| params.key);

        let authorized = match (&state.config.cron_key, provided.as_deref()) {
            (Some(secret), Some(key)) => secret.matches(key),
            _ => false,
        };

        if authorized {
            Ok(CronAuth)
        } else {
            tracing::warn!(path = %parts.uri.path(), "Rejected request with invalid key");
            Err(AppError::unauthorized())
        }
    }
}

/// Best-effort caller address for the activity log.
///
/// Uses the first `X-Forwarded-For` entry when present, otherwise the peer
/// address from the connection. Not suitable for access control.
#[derive(Debug, Clone, Default)]
pub struct ClientAddr(pub Option<String>);

impl<S: Send + Sync> FromRequestParts<S> for ClientAddr {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let forwarded = parts
            .headers
            .get("x-forwarded-for")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string);

        let peer = || {
            parts
                .extensions
                .get::<ConnectInfo<SocketAddr>>()
                .map(|ConnectInfo(addr)| addr.ip().to_string())
        };

        Ok(ClientAddr(forwarded.or_else(peer)))
    }
}
