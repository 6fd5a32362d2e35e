use crate::domain::model::{
    ApiClient, ClientId, NewApiClient, PropertyAddress, PropertyFilter, PropertyRecord, RecordId,
};
use crate::domain::ports::{ClientStore, PropertyStore};
use crate::utils::error::StoreError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tokio::sync::Mutex;

/// Full store contents. Also the on-disk snapshot format of `FileStore`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    next_client_id: ClientId,
    #[serde(default)]
    next_property_id: RecordId,
    #[serde(default)]
    clients: BTreeMap<ClientId, ApiClient>,
    #[serde(default)]
    properties: BTreeMap<RecordId, PropertyRecord>,
}

impl Snapshot {
    fn property_id_for(&self, key: &PropertyAddress) -> Option<RecordId> {
        self.properties
            .iter()
            .find(|(_, record)| &record.identifier == key)
            .map(|(id, _)| *id)
    }

    fn allocate_client_id(&mut self) -> ClientId {
        self.next_client_id = self
            .next_client_id
            .max(self.clients.keys().next_back().copied().unwrap_or(0))
            + 1;
        self.next_client_id
    }

    fn allocate_property_id(&mut self) -> RecordId {
        self.next_property_id = self
            .next_property_id
            .max(self.properties.keys().next_back().copied().unwrap_or(0))
            + 1;
        self.next_property_id
    }

    fn credential_taken(&self, credential_id: &str, except: Option<ClientId>) -> bool {
        self.clients
            .values()
            .any(|c| c.credential_id == credential_id && Some(c.id) != except)
    }
}

/// Secret comparison that does not exit early on the first differing byte.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut result = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        result |= x ^ y;
    }
    result == 0
}

/// In-process store. Every operation runs under one lock, which makes
/// `get_or_create` and `save` atomic with respect to the identity key.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<Snapshot>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_snapshot(snapshot: Snapshot) -> Self {
        Self {
            state: Mutex::new(snapshot),
        }
    }

    pub async fn snapshot(&self) -> Snapshot {
        self.state.lock().await.clone()
    }

    /// Replaces the whole state, e.g. to roll back a change that could not be persisted.
    pub async fn restore(&self, snapshot: Snapshot) {
        *self.state.lock().await = snapshot;
    }
}

#[async_trait]
impl PropertyStore for MemoryStore {
    async fn find(&self, key: &PropertyAddress) -> Result<Option<PropertyRecord>, StoreError> {
        let state = self.state.lock().await;
        Ok(state
            .property_id_for(key)
            .and_then(|id| state.properties.get(&id).cloned()))
    }

    async fn get(&self, id: RecordId) -> Result<Option<PropertyRecord>, StoreError> {
        Ok(self.state.lock().await.properties.get(&id).cloned())
    }

    async fn list(&self, filter: &PropertyFilter) -> Result<Vec<PropertyRecord>, StoreError> {
        let state = self.state.lock().await;
        Ok(state
            .properties
            .values()
            .filter(|record| filter.matches(record))
            .cloned()
            .collect())
    }

    async fn get_or_create(
        &self,
        key: &PropertyAddress,
        defaults: PropertyRecord,
    ) -> Result<(PropertyRecord, bool), StoreError> {
        let mut state = self.state.lock().await;
        if let Some(existing) = state
            .property_id_for(key)
            .and_then(|id| state.properties.get(&id))
        {
            return Ok((existing.clone(), false));
        }

        let id = state.allocate_property_id();
        let record = PropertyRecord {
            id: Some(id),
            identifier: key.clone(),
            ..defaults
        };
        state.properties.insert(id, record.clone());
        Ok((record, true))
    }

    async fn save(&self, record: &mut PropertyRecord) -> Result<(), StoreError> {
        let mut state = self.state.lock().await;

        // 同一地址只保留一筆，後寫入者覆蓋
        let id = match state.property_id_for(&record.identifier) {
            Some(id) => id,
            None => match record.id.filter(|id| state.properties.contains_key(id)) {
                Some(id) => id,
                None => state.allocate_property_id(),
            },
        };

        record.id = Some(id);
        state.properties.insert(id, record.clone());
        Ok(())
    }

    async fn delete(&self, key: &PropertyAddress) -> Result<bool, StoreError> {
        let mut state = self.state.lock().await;
        match state.property_id_for(key) {
            Some(id) => Ok(state.properties.remove(&id).is_some()),
            None => Ok(false),
        }
    }
}

#[async_trait]
impl ClientStore for MemoryStore {
    async fn first(&self) -> Result<Option<ApiClient>, StoreError> {
        Ok(self.state.lock().await.clients.values().next().cloned())
    }

    async fn get(&self, id: ClientId) -> Result<Option<ApiClient>, StoreError> {
        Ok(self.state.lock().await.clients.get(&id).cloned())
    }

    async fn list(&self) -> Result<Vec<ApiClient>, StoreError> {
        Ok(self.state.lock().await.clients.values().cloned().collect())
    }

    async fn find_by_credentials(
        &self,
        credential_id: &str,
        credential_secret: &str,
    ) -> Result<Option<ApiClient>, StoreError> {
        let state = self.state.lock().await;
        Ok(state
            .clients
            .values()
            .find(|c| c.credential_id == credential_id)
            .filter(|c| {
                constant_time_eq(c.credential_secret.as_bytes(), credential_secret.as_bytes())
            })
            .cloned())
    }

    async fn create(&self, draft: NewApiClient) -> Result<ApiClient, StoreError> {
        let mut state = self.state.lock().await;
        if state.credential_taken(&draft.credential_id, None) {
            return Err(StoreError::DuplicateCredential(draft.credential_id));
        }

        let id = state.allocate_client_id();
        let client = ApiClient::from_draft(id, draft);
        state.clients.insert(id, client.clone());
        Ok(client)
    }

    async fn update(&self, id: ClientId, draft: NewApiClient) -> Result<ApiClient, StoreError> {
        let mut state = self.state.lock().await;
        if !state.clients.contains_key(&id) {
            return Err(StoreError::ClientNotFound(id));
        }
        if state.credential_taken(&draft.credential_id, Some(id)) {
            return Err(StoreError::DuplicateCredential(draft.credential_id));
        }

        let client = ApiClient::from_draft(id, draft);
        state.clients.insert(id, client.clone());
        Ok(client)
    }

    async fn delete(&self, id: ClientId) -> Result<bool, StoreError> {
        let mut state = self.state.lock().await;
        if state.clients.remove(&id).is_none() {
            return Ok(false);
        }

        for record in state.properties.values_mut() {
            if record.api_client == Some(id) {
                record.api_client = None;
            }
        }
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::SewageType;
    use crate::domain::ports::Repository;
    use std::sync::Arc;

    fn draft(credential_id: &str) -> NewApiClient {
        NewApiClient {
            name: "HouseCanary".to_string(),
            credential_id: credential_id.to_string(),
            credential_secret: "secret".to_string(),
            host: "https://api.housecanary.com/v2".to_string(),
            path: "property/details".to_string(),
        }
    }

    fn melrose() -> PropertyAddress {
        PropertyAddress::new("7500 Melrose Ave", "90046")
    }

    #[tokio::test]
    async fn test_first_client_is_earliest_registered() {
        let store = MemoryStore::new();
        assert!(store.clients().first().await.unwrap().is_none());

        let a = store.clients().create(draft("a")).await.unwrap();
        store.clients().create(draft("b")).await.unwrap();

        assert_eq!(store.clients().first().await.unwrap(), Some(a));
    }

    #[tokio::test]
    async fn test_duplicate_credential_rejected() {
        let store = MemoryStore::new();
        store.clients().create(draft("dup")).await.unwrap();

        let err = store.clients().create(draft("dup")).await.unwrap_err();
        assert!(matches!(err, StoreError::DuplicateCredential(id) if id == "dup"));
    }

    #[tokio::test]
    async fn test_update_missing_client() {
        let store = MemoryStore::new();
        let err = store.clients().update(42, draft("x")).await.unwrap_err();
        assert!(matches!(err, StoreError::ClientNotFound(42)));
    }

    #[tokio::test]
    async fn test_save_upserts_by_identity_key() {
        let store = MemoryStore::new();

        let mut first = PropertyRecord::new(melrose(), None);
        store.properties().save(&mut first).await.unwrap();

        // 另一個未儲存的同地址記錄
        let mut second = PropertyRecord::new(melrose(), None);
        second.sewage_type = SewageType::Septic;
        store.properties().save(&mut second).await.unwrap();

        assert_eq!(first.id, second.id);
        let all = store.properties().list(&PropertyFilter::default()).await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].sewage_type, SewageType::Septic);
    }

    #[tokio::test]
    async fn test_get_or_create_is_atomic_under_concurrency() {
        let store = Arc::new(MemoryStore::new());

        let mut handles = Vec::new();
        for _ in 0..16 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store
                    .properties()
                    .get_or_create(&melrose(), PropertyRecord::new(melrose(), None))
                    .await
                    .unwrap()
            }));
        }

        let mut created = 0;
        for handle in handles {
            let (_, was_created) = handle.await.unwrap();
            if was_created {
                created += 1;
            }
        }

        assert_eq!(created, 1);
        let all = store.properties().list(&PropertyFilter::default()).await.unwrap();
        assert_eq!(all.len(), 1);
    }

    #[tokio::test]
    async fn test_delete_client_clears_property_owner() {
        let store = MemoryStore::new();
        let client = store.clients().create(draft("owner")).await.unwrap();

        let mut record = PropertyRecord::new(melrose(), Some(client.id));
        store.properties().save(&mut record).await.unwrap();

        assert!(store.clients().delete(client.id).await.unwrap());
        assert!(!store.clients().delete(client.id).await.unwrap());

        let stored = store.properties().find(&melrose()).await.unwrap().unwrap();
        assert_eq!(stored.api_client, None);
    }

    #[tokio::test]
    async fn test_delete_property_by_key() {
        let store = MemoryStore::new();
        let mut record = PropertyRecord::new(melrose(), None);
        store.properties().save(&mut record).await.unwrap();

        assert!(store.properties().delete(&melrose()).await.unwrap());
        assert!(store.properties().find(&melrose()).await.unwrap().is_none());
        assert!(!store.properties().delete(&melrose()).await.unwrap());
    }

    #[tokio::test]
    async fn test_find_by_credentials_requires_matching_secret() {
        let store = MemoryStore::new();
        store.clients().create(draft("cid")).await.unwrap();

        assert!(store
            .clients()
            .find_by_credentials("cid", "secret")
            .await
            .unwrap()
            .is_some());
        assert!(store
            .clients()
            .find_by_credentials("cid", "wrong")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_find_by_credentials_rejects_secret_prefixes() {
        let store = MemoryStore::new();
        store.clients().create(draft("cid")).await.unwrap();

        for attempt in ["secre", "secret-and-more", ""] {
            assert!(store
                .clients()
                .find_by_credentials("cid", attempt)
                .await
                .unwrap()
                .is_none());
        }
    }

    #[test]
    fn test_constant_time_eq() {
        assert!(constant_time_eq(b"secret", b"secret"));
        assert!(!constant_time_eq(b"secret", b"secreT"));
        assert!(!constant_time_eq(b"secret", b"secret2"));
        assert!(constant_time_eq(b"", b""));
    }
}
