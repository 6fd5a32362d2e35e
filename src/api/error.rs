//! HTTP mapping of lookup and admin failures.

use crate::utils::error::{LookupError, StoreError};
use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

impl IntoResponse for LookupError {
    fn into_response(self) -> Response {
        match self {
            // 上游錯誤原封不動轉回
            LookupError::UpstreamHttp {
                status,
                content_type,
                body,
            } => {
                let status = StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY);
                let content_type = content_type
                    .and_then(|ct| HeaderValue::from_str(&ct).ok())
                    .unwrap_or_else(|| HeaderValue::from_static("application/json"));
                (status, [(header::CONTENT_TYPE, content_type)], body).into_response()
            }
            LookupError::UpstreamConnection(cause) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"msg": "failed to connect to API", "detail": cause})),
            )
                .into_response(),
            LookupError::UpstreamDecode(cause) => (
                StatusCode::BAD_GATEWAY,
                Json(json!({"msg": "invalid response from API", "detail": cause})),
            )
                .into_response(),
            LookupError::Misconfigured => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"msg": "Misconfigured: no API client records"})),
            )
                .into_response(),
            LookupError::InvalidClient(cause) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"msg": "Misconfigured: invalid API client", "detail": cause})),
            )
                .into_response(),
            LookupError::UnresolvedClassification(record) => (
                StatusCode::BAD_REQUEST,
                Json(json!({"msg": "unknown sewage type for property", "detail": record})),
            )
                .into_response(),
            LookupError::InvalidAddress(cause) => (
                StatusCode::BAD_REQUEST,
                Json(json!({"msg": "invalid address", "detail": cause})),
            )
                .into_response(),
            LookupError::Store(e) => store_error_response(e),
        }
    }
}

fn store_error_response(err: StoreError) -> Response {
    let (status, msg) = match &err {
        StoreError::DuplicateCredential(_) => (StatusCode::CONFLICT, err.to_string()),
        StoreError::ClientNotFound(_) => (StatusCode::NOT_FOUND, err.to_string()),
        StoreError::Io(_) | StoreError::Serialization(_) => {
            tracing::error!("Storage error: {}", err);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "storage failure".to_string(),
            )
        }
    };
    (status, Json(json!({"msg": msg}))).into_response()
}

/// Failures of the administrative endpoints.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Lookup(#[from] LookupError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("{0}")]
    NotFound(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Invalid credentials")]
    Unauthorized,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Lookup(e) => e.into_response(),
            ApiError::Store(e) => store_error_response(e),
            ApiError::NotFound(msg) => {
                (StatusCode::NOT_FOUND, Json(json!({"msg": msg}))).into_response()
            }
            ApiError::InvalidRequest(msg) => {
                (StatusCode::BAD_REQUEST, Json(json!({"msg": msg}))).into_response()
            }
            ApiError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                [(header::WWW_AUTHENTICATE, "Basic realm=\"api\"")],
                Json(json!({"msg": "Invalid credentials"})),
            )
                .into_response(),
        }
    }
}
