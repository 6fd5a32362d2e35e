use crate::domain::model::{ClientId, PropertyRecord};
use thiserror::Error;

/// 啟動與設定階段的錯誤
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value for {field}: '{value}' ({reason})")]
    InvalidValueError {
        field: String,
        value: String,
        reason: String,
    },
}

pub type Result<T> = std::result::Result<T, ServiceError>;

/// Failures raised by a `RemoteFetch` implementation.
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("upstream returned HTTP {status}")]
    Http {
        status: u16,
        content_type: Option<String>,
        body: Vec<u8>,
    },

    #[error("{0}")]
    Connection(String),

    #[error("upstream body is not valid JSON: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("invalid API client URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Snapshot serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("credential identifier '{0}' is already registered")]
    DuplicateCredential(String),

    #[error("no API client with id {0}")]
    ClientNotFound(ClientId),
}

/// Outcomes of a single lookup that never reach the `{"septic": bool}` answer.
#[derive(Error, Debug)]
pub enum LookupError {
    #[error("upstream returned HTTP {status}")]
    UpstreamHttp {
        status: u16,
        content_type: Option<String>,
        body: Vec<u8>,
    },

    #[error("failed to connect to API: {0}")]
    UpstreamConnection(String),

    #[error("invalid response from API: {0}")]
    UpstreamDecode(String),

    #[error("Misconfigured: no API client records")]
    Misconfigured,

    #[error("Misconfigured: {0}")]
    InvalidClient(String),

    #[error("unknown sewage type for property {}", .0.identifier)]
    UnresolvedClassification(Box<PropertyRecord>),

    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<ClientError> for LookupError {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::Http {
                status,
                content_type,
                body,
            } => LookupError::UpstreamHttp {
                status,
                content_type,
                body,
            },
            ClientError::Connection(cause) => LookupError::UpstreamConnection(cause),
            ClientError::Decode(e) => LookupError::UpstreamDecode(e.to_string()),
            ClientError::InvalidUrl(e) => LookupError::InvalidClient(e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_http_error_keeps_status_and_body() {
        let err: LookupError = ClientError::Http {
            status: 404,
            content_type: Some("application/json".to_string()),
            body: br#"{"msg":"no such property"}"#.to_vec(),
        }
        .into();

        match err {
            LookupError::UpstreamHttp { status, body, .. } => {
                assert_eq!(status, 404);
                assert_eq!(body, br#"{"msg":"no such property"}"#.to_vec());
            }
            other => panic!("unexpected variant: {other:?}"),
        }
    }

    #[test]
    fn test_connection_error_message() {
        let err: LookupError = ClientError::Connection("connection refused".to_string()).into();
        assert_eq!(err.to_string(), "failed to connect to API: connection refused");
    }

    #[test]
    fn test_misconfigured_message() {
        assert_eq!(
            LookupError::Misconfigured.to_string(),
            "Misconfigured: no API client records"
        );
    }
}
