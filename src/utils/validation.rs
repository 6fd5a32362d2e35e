use crate::utils::error::{Result, ServiceError};
use std::net::SocketAddr;
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

fn invalid(field_name: &str, value: &str, reason: impl Into<String>) -> ServiceError {
    ServiceError::InvalidValueError {
        field: field_name.to_string(),
        value: value.to_string(),
        reason: reason.into(),
    }
}

pub fn validate_url(field_name: &str, url_str: &str) -> Result<()> {
    if url_str.is_empty() {
        return Err(invalid(field_name, url_str, "URL cannot be empty"));
    }

    match Url::parse(url_str) {
        Ok(url) => match url.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(invalid(
                field_name,
                url_str,
                format!("Unsupported URL scheme: {}", scheme),
            )),
        },
        Err(e) => Err(invalid(
            field_name,
            url_str,
            format!("Invalid URL format: {}", e),
        )),
    }
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(invalid(field_name, path, "Path cannot be empty"));
    }

    if path.contains('\0') {
        return Err(invalid(field_name, path, "Path contains null bytes"));
    }

    Ok(())
}

/// 驗證相對 URL 片段（例如 `property/details`）
pub fn validate_path_segment(field_name: &str, segment: &str) -> Result<()> {
    let trimmed = segment.trim_matches('/');
    if trimmed.is_empty() {
        return Err(invalid(field_name, segment, "Path segment cannot be empty"));
    }

    if trimmed.contains("://") || segment.starts_with("//") {
        return Err(invalid(field_name, segment, "Expected a relative path, not a URL"));
    }

    if let Some(c) = trimmed
        .chars()
        .find(|c| c.is_whitespace() || matches!(c, '?' | '#' | '\\'))
    {
        return Err(invalid(
            field_name,
            segment,
            format!("Path segment contains forbidden character {:?}", c),
        ));
    }

    if trimmed.split('/').any(|part| part == "..") {
        return Err(invalid(field_name, segment, "Path segment cannot contain '..'"));
    }

    Ok(())
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(invalid(
            field_name,
            value,
            "Value cannot be empty or whitespace-only",
        ));
    }
    Ok(())
}

pub fn validate_zipcode(field_name: &str, value: &str) -> Result<()> {
    if value.len() != 5 || !value.chars().all(|c| c.is_ascii_digit()) {
        return Err(invalid(field_name, value, "Postal code must be exactly five digits"));
    }
    Ok(())
}

pub fn validate_socket_addr(field_name: &str, value: &str) -> Result<SocketAddr> {
    value
        .parse::<SocketAddr>()
        .map_err(|e| invalid(field_name, value, format!("Invalid socket address: {}", e)))
}
