use crate::domain::model::{
    ApiClient, ClientId, NewApiClient, PropertyAddress, PropertyFilter, PropertyRecord, RecordId,
};
use crate::utils::error::{ClientError, StoreError};
use async_trait::async_trait;

/// Raw upstream response. The body is not inspected until [`UpstreamResponse::json`].
#[derive(Debug, Clone)]
pub struct UpstreamResponse {
    pub status: u16,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

impl UpstreamResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn error_for_status(self) -> Result<Self, ClientError> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(ClientError::Http {
                status: self.status,
                content_type: self.content_type,
                body: self.body,
            })
        }
    }

    pub fn json(&self) -> Result<serde_json::Value, ClientError> {
        Ok(serde_json::from_slice(&self.body)?)
    }
}

/// One authenticated way of issuing GET requests against an upstream API.
#[async_trait]
pub trait RemoteFetch: Send + Sync {
    /// Stored client this fetcher acts for, if any.
    fn client_id(&self) -> Option<ClientId>;

    /// Configured request path; its slash-trimmed form keys the response body.
    fn path(&self) -> &str;

    async fn get(&self, params: &[(&str, &str)]) -> Result<UpstreamResponse, ClientError>;
}

#[async_trait]
pub trait PropertyStore: Send + Sync {
    async fn find(&self, key: &PropertyAddress) -> Result<Option<PropertyRecord>, StoreError>;

    async fn get(&self, id: RecordId) -> Result<Option<PropertyRecord>, StoreError>;

    async fn list(&self, filter: &PropertyFilter) -> Result<Vec<PropertyRecord>, StoreError>;

    /// Atomically returns the record for `key`, inserting `defaults` under that key if
    /// none exists. The flag is `true` when a record was created.
    async fn get_or_create(
        &self,
        key: &PropertyAddress,
        defaults: PropertyRecord,
    ) -> Result<(PropertyRecord, bool), StoreError>;

    /// Upserts by identity key and assigns `record.id`.
    async fn save(&self, record: &mut PropertyRecord) -> Result<(), StoreError>;

    async fn delete(&self, key: &PropertyAddress) -> Result<bool, StoreError>;
}

#[async_trait]
pub trait ClientStore: Send + Sync {
    /// The earliest registered client.
    async fn first(&self) -> Result<Option<ApiClient>, StoreError>;

    async fn get(&self, id: ClientId) -> Result<Option<ApiClient>, StoreError>;

    async fn list(&self) -> Result<Vec<ApiClient>, StoreError>;

    async fn find_by_credentials(
        &self,
        credential_id: &str,
        credential_secret: &str,
    ) -> Result<Option<ApiClient>, StoreError>;

    async fn create(&self, draft: NewApiClient) -> Result<ApiClient, StoreError>;

    async fn update(&self, id: ClientId, draft: NewApiClient) -> Result<ApiClient, StoreError>;

    /// Removes the client and clears it as owner of its properties.
    async fn delete(&self, id: ClientId) -> Result<bool, StoreError>;
}

/// Both repositories behind one handle.
pub trait Repository: Send + Sync {
    fn properties(&self) -> &dyn PropertyStore;
    fn clients(&self) -> &dyn ClientStore;
}

impl<T: PropertyStore + ClientStore> Repository for T {
    fn properties(&self) -> &dyn PropertyStore {
        self
    }

    fn clients(&self) -> &dyn ClientStore {
        self
    }
}

/// Raw byte storage used for snapshots.
pub trait Storage: Send + Sync {
    fn read_file(
        &self,
        path: &str,
    ) -> impl std::future::Future<Output = Result<Vec<u8>, StoreError>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<(), StoreError>> + Send;
}
