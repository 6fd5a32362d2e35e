use crate::domain::model::{PropertyAddress, PropertyRecord};
use crate::domain::ports::{PropertyStore, RemoteFetch, UpstreamResponse};
use crate::domain::property::envelope;
use crate::utils::error::{ClientError, LookupError};

impl PropertyRecord {
    /// GETs this record's address from `client`; non-2xx statuses become errors.
    pub async fn fetch(&self, client: &dyn RemoteFetch) -> Result<UpstreamResponse, ClientError> {
        let response = client.get(&self.identifier.query_pairs()).await?;
        response.error_for_status()
    }

    /// Refreshes this record from upstream, saving it when a store is given.
    pub async fn fetch_and_update(
        &mut self,
        client: &dyn RemoteFetch,
        store: Option<&dyn PropertyStore>,
    ) -> Result<&mut Self, LookupError> {
        let response = self.fetch(client).await?;
        let payload = response.json()?;
        let key = client.path().trim_matches('/');
        self.parse(envelope(&payload, key));

        if let Some(store) = store {
            store.save(self).await?;
            tracing::info!(
                "💾 Saved property {} (id {:?}, sewage type {})",
                self.identifier,
                self.id,
                self.sewage_type
            );
        }

        Ok(self)
    }

    /// Builds a new record owned by `client` and fills it from upstream.
    pub async fn from_client(
        client: &dyn RemoteFetch,
        address: PropertyAddress,
        store: Option<&dyn PropertyStore>,
    ) -> Result<Self, LookupError> {
        let mut record = PropertyRecord::new(address, client.client_id());
        record.fetch_and_update(client, store).await?;
        Ok(record)
    }
}
