use crate::utils::error::Result;
use crate::utils::validation::{
    validate_non_empty_string, validate_path_segment, validate_url, validate_zipcode, Validate,
};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use url::Url;

pub type RecordId = u64;
pub type ClientId = RecordId;

/// Identity key of a cached property: street address plus 5-digit postal code.
///
/// Matched exactly, field by field. No normalisation is applied.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PropertyAddress {
    pub address: String,
    pub zipcode: String,
}

impl PropertyAddress {
    pub fn new(address: impl Into<String>, zipcode: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            zipcode: zipcode.into(),
        }
    }

    /// Query parameters sent upstream, in a stable order.
    pub fn query_pairs(&self) -> [(&str, &str); 2] {
        [
            ("address", self.address.as_str()),
            ("zipcode", self.zipcode.as_str()),
        ]
    }
}

impl fmt::Display for PropertyAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.address, self.zipcode)
    }
}

impl Validate for PropertyAddress {
    fn validate(&self) -> Result<()> {
        validate_non_empty_string("address", &self.address)?;
        validate_zipcode("zipcode", &self.zipcode)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SewageType {
    #[default]
    Unknown,
    None,
    Municipal,
    Storm,
    Septic,
    Yes,
}

impl SewageType {
    pub const ALL: [SewageType; 6] = [
        SewageType::Unknown,
        SewageType::None,
        SewageType::Municipal,
        SewageType::Storm,
        SewageType::Septic,
        SewageType::Yes,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SewageType::Unknown => "unknown",
            SewageType::None => "none",
            SewageType::Municipal => "municipal",
            SewageType::Storm => "storm",
            SewageType::Septic => "septic",
            SewageType::Yes => "yes",
        }
    }

    /// Matches an upstream label such as `"Septic"` against the enumeration, ignoring case.
    /// Surrounding whitespace is not stripped.
    pub fn from_label(label: &str) -> Option<Self> {
        let label = label.to_uppercase();
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str().to_uppercase() == label)
    }
}

impl fmt::Display for SewageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Connection and credential data for one upstream property-data API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiClient {
    pub id: ClientId,
    pub name: String,
    pub credential_id: String,
    pub credential_secret: String,
    pub host: String,
    pub path: String,
}

impl ApiClient {
    pub fn from_draft(id: ClientId, draft: NewApiClient) -> Self {
        Self {
            id,
            name: draft.name,
            credential_id: draft.credential_id,
            credential_secret: draft.credential_secret,
            host: draft.host,
            path: draft.path,
        }
    }

    /// `host` without its trailing slash, joined to `path` without its leading slash.
    pub fn endpoint(&self) -> std::result::Result<Url, url::ParseError> {
        let host = self.host.trim_end_matches('/');
        let path = self.path.trim_start_matches('/');
        Url::parse(&format!("{}/{}", host, path))
    }

    /// Top-level key of the upstream response body.
    pub fn response_key(&self) -> &str {
        self.path.trim_matches('/')
    }

    /// Basic auth value identifying this client to others, e.g. `Basic Y2lkOnNlY3JldA==`.
    pub fn auth_header(&self) -> String {
        let token = BASE64.encode(format!("{}:{}", self.credential_id, self.credential_secret));
        format!("Basic {}", token)
    }
}

fn default_path() -> String {
    "property/details".to_string()
}

/// Client attributes as supplied by configuration or the admin API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewApiClient {
    #[serde(default)]
    pub name: String,
    pub credential_id: String,
    pub credential_secret: String,
    pub host: String,
    #[serde(default = "default_path")]
    pub path: String,
}

impl Validate for NewApiClient {
    fn validate(&self) -> Result<()> {
        validate_non_empty_string("credential_id", &self.credential_id)?;
        validate_non_empty_string("credential_secret", &self.credential_secret)?;
        validate_url("host", &self.host)?;
        validate_path_segment("path", &self.path)
    }
}

fn empty_object() -> serde_json::Value {
    serde_json::Value::Object(serde_json::Map::new())
}

/// Cached upstream data for one property.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyRecord {
    /// `None` until the record has been saved.
    pub id: Option<RecordId>,
    pub identifier: PropertyAddress,
    pub api_client: Option<ClientId>,
    pub assessment_date: Option<NaiveDate>,
    #[serde(default)]
    pub sewage_type: SewageType,
    #[serde(default = "empty_object")]
    pub other_data: serde_json::Value,
}

impl PropertyRecord {
    pub fn new(identifier: PropertyAddress, api_client: Option<ClientId>) -> Self {
        Self {
            id: None,
            identifier,
            api_client,
            assessment_date: None,
            sewage_type: SewageType::default(),
            other_data: empty_object(),
        }
    }
}

/// Optional filters for listing property records.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyFilter {
    pub sewage_type: Option<SewageType>,
    pub assessment_date: Option<NaiveDate>,
    pub api_client: Option<ClientId>,
}

impl PropertyFilter {
    pub fn matches(&self, record: &PropertyRecord) -> bool {
        self.sewage_type.map_or(true, |t| record.sewage_type == t)
            && self
                .assessment_date
                .map_or(true, |d| record.assessment_date == Some(d))
            && self
                .api_client
                .map_or(true, |id| record.api_client == Some(id))
    }
}
