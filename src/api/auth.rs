//! HTTP Basic authentication against registered API clients.
//!
//! The credential pair checked here is the same one [`ApiClient::auth_header`] encodes,
//! so a client's own header authenticates it.
//!
//! [`ApiClient::auth_header`]: crate::domain::model::ApiClient::auth_header

use crate::api::error::ApiError;
use crate::api::state::AppState;
use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};

/// Splits an `Authorization: Basic ...` value into `(credential_id, credential_secret)`.
pub fn parse_basic_credentials(header: &str) -> Option<(String, String)> {
    let (scheme, encoded) = header.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("basic") {
        return None;
    }

    let decoded = BASE64.decode(encoded.trim()).ok()?;
    let decoded = String::from_utf8(decoded).ok()?;
    let (id, secret) = decoded.split_once(':')?;
    Some((id.to_string(), secret.to_string()))
}

pub async fn require_client_credentials(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let (credential_id, credential_secret) = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(parse_basic_credentials)
        .ok_or(ApiError::Unauthorized)?;

    let client = state
        .store()
        .clients()
        .find_by_credentials(&credential_id, &credential_secret)
        .await?
        .ok_or_else(|| {
            tracing::warn!("Rejected credentials for '{}'", credential_id);
            ApiError::Unauthorized
        })?;

    tracing::debug!("Authenticated API client #{} '{}'", client.id, client.name);
    request.extensions_mut().insert(client);
    Ok(next.run(request).await)
}
