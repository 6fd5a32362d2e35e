use crate::adapters::http::BasicAuthClient;
use crate::domain::model::{ApiClient, PropertyAddress, PropertyRecord, SewageType};
use crate::domain::ports::Repository;
use crate::utils::error::LookupError;
use crate::utils::validation::Validate;
use reqwest::Client;
use std::sync::Arc;

/// Cache-aside lookup of property records, backed by the first registered API client.
#[derive(Clone)]
pub struct LookupService {
    store: Arc<dyn Repository>,
    http: Client,
}

impl LookupService {
    pub fn new(store: Arc<dyn Repository>, http: Client) -> Self {
        Self { store, http }
    }

    pub fn store(&self) -> &dyn Repository {
        self.store.as_ref()
    }

    pub fn connect(&self, record: ApiClient) -> BasicAuthClient {
        BasicAuthClient::new(record, self.http.clone())
    }

    /// The upstream used on a cache miss: always the earliest registered client.
    pub async fn select_client(&self) -> Result<BasicAuthClient, LookupError> {
        match self.store.clients().first().await? {
            Some(record) => Ok(self.connect(record)),
            None => {
                tracing::error!("❌ No API client records configured");
                Err(LookupError::Misconfigured)
            }
        }
    }

    /// Returns the cached record for `address`, fetching and persisting it on a miss.
    ///
    /// Concurrent misses on one address may both go upstream. Each persists through
    /// [`PropertyStore::save`], an upsert on the identity key, so the last write wins
    /// and a single record remains. `get_or_create` is not used here because the
    /// record is only worth storing once upstream has answered.
    ///
    /// [`PropertyStore::save`]: crate::domain::ports::PropertyStore::save
    pub async fn lookup(&self, address: &PropertyAddress) -> Result<PropertyRecord, LookupError> {
        address
            .validate()
            .map_err(|e| LookupError::InvalidAddress(e.to_string()))?;

        if let Some(record) = self.store.properties().find(address).await? {
            tracing::debug!("Cache hit for {}", address);
            return Ok(record);
        }

        tracing::info!("🔍 Cache miss for {}, querying upstream", address);
        let client = self.select_client().await?;
        let record = PropertyRecord::from_client(
            &client,
            address.clone(),
            Some(self.store.properties()),
        )
        .await
        .inspect_err(|e| tracing::warn!("⚠️ Upstream lookup for {} failed: {}", address, e))?;

        Ok(record)
    }

    /// `true` when the property at `address` is on a septic system.
    pub async fn has_septic(&self, address: &PropertyAddress) -> Result<bool, LookupError> {
        let record = self.lookup(address).await?;

        match record.sewage_type {
            SewageType::Unknown => Err(LookupError::UnresolvedClassification(Box::new(record))),
            sewage_type => Ok(sewage_type == SewageType::Septic),
        }
    }

    /// Re-fetches a stored record through its owning client, or the first client when
    /// the owner has been removed.
    pub async fn refresh(&self, mut record: PropertyRecord) -> Result<PropertyRecord, LookupError> {
        let owner = match record.api_client {
            Some(id) => self.store.clients().get(id).await?,
            None => None,
        };

        let client = match owner {
            Some(owner) => self.connect(owner),
            None => {
                let client = self.select_client().await?;
                record.api_client = Some(client.record().id);
                client
            }
        };

        record
            .fetch_and_update(&client, Some(self.store.properties()))
            .await?;
        Ok(record)
    }
}
