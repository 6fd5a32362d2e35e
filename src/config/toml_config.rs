use crate::domain::model::NewApiClient;
use crate::utils::error::{Result, ServiceError};
use crate::utils::validation::{validate_path, validate_socket_addr, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::net::SocketAddr;
use std::path::Path;

pub const DEFAULT_BIND: &str = "127.0.0.1:8000";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServiceConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub clients: Vec<NewApiClient>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

fn default_bind() -> String {
    DEFAULT_BIND.to_string()
}

/// `path` 未設定時使用記憶體儲存
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageConfig {
    pub path: Option<String>,
    pub snapshot_file: Option<String>,
}

impl ServiceConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(ServiceError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        // 處理環境變數替換
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| ServiceError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${HC_API_SECRET})，未設定的變數保持原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| ServiceError::ConfigError {
            message: format!("invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn bind_addr(&self) -> Result<SocketAddr> {
        validate_socket_addr("server.bind", &self.server.bind)
    }
}

impl Validate for ServiceConfig {
    fn validate(&self) -> Result<()> {
        self.bind_addr()?;

        if let Some(path) = &self.storage.path {
            validate_path("storage.path", path)?;
        }

        let mut seen = HashSet::new();
        for client in &self.clients {
            client.validate()?;
            if !seen.insert(client.credential_id.as_str()) {
                return Err(ServiceError::InvalidValueError {
                    field: "clients.credential_id".to_string(),
                    value: client.credential_id.clone(),
                    reason: "credential identifiers must be unique".to_string(),
                });
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_full_config() {
        let toml_content = r#"
[server]
bind = "0.0.0.0:9000"

[storage]
path = "./data"

[[clients]]
name = "HouseCanary"
credential_id = "hc-id"
credential_secret = "hc-secret"
host = "https://api.housecanary.com/v2"
path = "property/details"
"#;

        let config = ServiceConfig::from_toml_str(toml_content).unwrap();

        assert_eq!(config.server.bind, "0.0.0.0:9000");
        assert_eq!(config.storage.path.as_deref(), Some("./data"));
        assert_eq!(config.clients.len(), 1);
        assert_eq!(config.clients[0].credential_id, "hc-id");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = ServiceConfig::from_toml_str("").unwrap();

        assert_eq!(config.server.bind, DEFAULT_BIND);
        assert!(config.storage.path.is_none());
        assert!(config.clients.is_empty());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_client_path_defaults_to_property_details() {
        let toml_content = r#"
[[clients]]
credential_id = "id"
credential_secret = "secret"
host = "http://localhost:8080"
"#;

        let config = ServiceConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.clients[0].path, "property/details");
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("SEPTIC_TEST_SECRET", "from-env");

        let toml_content = r#"
[[clients]]
credential_id = "id"
credential_secret = "${SEPTIC_TEST_SECRET}"
host = "http://localhost:8080"
"#;

        let config = ServiceConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.clients[0].credential_secret, "from-env");

        std::env::remove_var("SEPTIC_TEST_SECRET");
    }

    #[test]
    fn test_duplicate_credential_ids_fail_validation() {
        let toml_content = r#"
[[clients]]
credential_id = "same"
credential_secret = "a"
host = "http://localhost:8080"

[[clients]]
credential_id = "same"
credential_secret = "b"
host = "http://localhost:8081"
"#;

        let config = ServiceConfig::from_toml_str(toml_content).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_bind_fails_validation() {
        let config = ServiceConfig::from_toml_str("[server]\nbind = \"nowhere\"\n").unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(b"[server]\nbind = \"127.0.0.1:8123\"\n")
            .unwrap();

        let config = ServiceConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.bind_addr().unwrap().port(), 8123);
    }
}
