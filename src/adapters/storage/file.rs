use super::memory::{MemoryStore, Snapshot};
use crate::domain::model::{
    ApiClient, ClientId, NewApiClient, PropertyAddress, PropertyFilter, PropertyRecord, RecordId,
};
use crate::domain::ports::{ClientStore, PropertyStore, Storage};
use crate::utils::error::StoreError;
use async_trait::async_trait;
use tokio::sync::Mutex;

pub const DEFAULT_SNAPSHOT_FILE: &str = "store.json";

/// [`MemoryStore`] that writes a JSON snapshot through a [`Storage`] after each mutation.
pub struct FileStore<S: Storage> {
    inner: MemoryStore,
    storage: S,
    file_name: String,
    write_lock: Mutex<()>,
}

impl<S: Storage> FileStore<S> {
    /// Loads an existing snapshot, or starts empty when the file does not exist yet.
    pub async fn open(storage: S, file_name: impl Into<String>) -> Result<Self, StoreError> {
        let file_name = file_name.into();
        let snapshot = match storage.read_file(&file_name).await {
            Ok(bytes) => serde_json::from_slice::<Snapshot>(&bytes)?,
            Err(StoreError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!("📂 No snapshot at {}, starting with an empty store", file_name);
                Snapshot::default()
            }
            Err(e) => return Err(e),
        };

        Ok(Self {
            inner: MemoryStore::from_snapshot(snapshot),
            storage,
            file_name,
            write_lock: Mutex::new(()),
        })
    }

    /// Writes the current state. On failure the in-memory state is rolled back to
    /// `before`, so the store never keeps a change that is not on disk.
    ///
    /// Callers hold `write_lock` from before the mutation until this returns.
    async fn commit(&self, before: Snapshot) -> Result<(), StoreError> {
        let snapshot = self.inner.snapshot().await;
        let written = match serde_json::to_vec_pretty(&snapshot) {
            Ok(data) => self
                .storage
                .write_file(&self.file_name, &data)
                .await
                .map(|()| data.len()),
            Err(e) => Err(e.into()),
        };

        match written {
            Ok(len) => {
                tracing::debug!("💾 Snapshot written ({} bytes)", len);
                Ok(())
            }
            Err(e) => {
                tracing::error!("❌ Snapshot write failed, rolling back: {}", e);
                self.inner.restore(before).await;
                Err(e)
            }
        }
    }
}

#[async_trait]
impl<S: Storage> PropertyStore for FileStore<S> {
    async fn find(&self, key: &PropertyAddress) -> Result<Option<PropertyRecord>, StoreError> {
        PropertyStore::find(&self.inner, key).await
    }

    async fn get(&self, id: RecordId) -> Result<Option<PropertyRecord>, StoreError> {
        PropertyStore::get(&self.inner, id).await
    }

    async fn list(&self, filter: &PropertyFilter) -> Result<Vec<PropertyRecord>, StoreError> {
        PropertyStore::list(&self.inner, filter).await
    }

    async fn get_or_create(
        &self,
        key: &PropertyAddress,
        defaults: PropertyRecord,
    ) -> Result<(PropertyRecord, bool), StoreError> {
        let _guard = self.write_lock.lock().await;
        let before = self.inner.snapshot().await;
        let (record, created) = self.inner.get_or_create(key, defaults).await?;
        if created {
            self.commit(before).await?;
        }
        Ok((record, created))
    }

    async fn save(&self, record: &mut PropertyRecord) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().await;
        let before = self.inner.snapshot().await;
        let previous_id = record.id;
        self.inner.save(record).await?;
        if let Err(e) = self.commit(before).await {
            record.id = previous_id;
            return Err(e);
        }
        Ok(())
    }

    async fn delete(&self, key: &PropertyAddress) -> Result<bool, StoreError> {
        let _guard = self.write_lock.lock().await;
        let before = self.inner.snapshot().await;
        let deleted = PropertyStore::delete(&self.inner, key).await?;
        if deleted {
            self.commit(before).await?;
        }
        Ok(deleted)
    }
}

#[async_trait]
impl<S: Storage> ClientStore for FileStore<S> {
    async fn first(&self) -> Result<Option<ApiClient>, StoreError> {
        self.inner.first().await
    }

    async fn get(&self, id: ClientId) -> Result<Option<ApiClient>, StoreError> {
        ClientStore::get(&self.inner, id).await
    }

    async fn list(&self) -> Result<Vec<ApiClient>, StoreError> {
        ClientStore::list(&self.inner).await
    }

    async fn find_by_credentials(
        &self,
        credential_id: &str,
        credential_secret: &str,
    ) -> Result<Option<ApiClient>, StoreError> {
        self.inner
            .find_by_credentials(credential_id, credential_secret)
            .await
    }

    async fn create(&self, draft: NewApiClient) -> Result<ApiClient, StoreError> {
        let _guard = self.write_lock.lock().await;
        let before = self.inner.snapshot().await;
        let client = self.inner.create(draft).await?;
        self.commit(before).await?;
        Ok(client)
    }

    async fn update(&self, id: ClientId, draft: NewApiClient) -> Result<ApiClient, StoreError> {
        let _guard = self.write_lock.lock().await;
        let before = self.inner.snapshot().await;
        let client = self.inner.update(id, draft).await?;
        self.commit(before).await?;
        Ok(client)
    }

    async fn delete(&self, id: ClientId) -> Result<bool, StoreError> {
        let _guard = self.write_lock.lock().await;
        let before = self.inner.snapshot().await;
        let deleted = ClientStore::delete(&self.inner, id).await?;
        if deleted {
            self.commit(before).await?;
        }
        Ok(deleted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::storage::LocalStorage;
    use crate::domain::model::SewageType;
    use crate::domain::ports::Repository;
    use std::sync::atomic::{AtomicBool, Ordering};
    use tempfile::TempDir;

    /// Storage with no snapshot yet whose writes can be switched off.
    #[derive(Default)]
    struct FlakyStorage {
        fail_writes: AtomicBool,
    }

    impl Storage for FlakyStorage {
        async fn read_file(&self, _path: &str) -> Result<Vec<u8>, StoreError> {
            Err(std::io::Error::from(std::io::ErrorKind::NotFound).into())
        }

        async fn write_file(&self, _path: &str, _data: &[u8]) -> Result<(), StoreError> {
            if self.fail_writes.load(Ordering::SeqCst) {
                Err(std::io::Error::other("disk full").into())
            } else {
                Ok(())
            }
        }
    }

    fn draft(credential_id: &str) -> NewApiClient {
        NewApiClient {
            name: "mock".to_string(),
            credential_id: credential_id.to_string(),
            credential_secret: "secret".to_string(),
            host: "http://localhost:9000".to_string(),
            path: "property/details".to_string(),
        }
    }

    #[tokio::test]
    async fn test_failed_write_rolls_back_save() {
        let storage = FlakyStorage::default();
        storage.fail_writes.store(true, Ordering::SeqCst);
        let store = FileStore::open(storage, "s.json").await.unwrap();
        let address = PropertyAddress::new("7500 Melrose Ave", "90046");

        let mut record = PropertyRecord::new(address.clone(), None);
        record.sewage_type = SewageType::Septic;
        let result = store.properties().save(&mut record).await;

        assert!(matches!(result, Err(StoreError::Io(_))));
        assert_eq!(record.id, None);
        assert!(store.properties().find(&address).await.unwrap().is_none());

        assert!(store
            .properties()
            .get_or_create(&address, PropertyRecord::new(address.clone(), None))
            .await
            .is_err());
        assert!(store.properties().find(&address).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_failed_write_rolls_back_client_changes() {
        let store = FileStore::open(FlakyStorage::default(), "s.json")
            .await
            .unwrap();
        let client = store.clients().create(draft("cid")).await.unwrap();
        let mut record = PropertyRecord::new(
            PropertyAddress::new("1 Main St", "10001"),
            Some(client.id),
        );
        store.properties().save(&mut record).await.unwrap();

        store.storage.fail_writes.store(true, Ordering::SeqCst);

        assert!(store.clients().create(draft("other")).await.is_err());
        assert!(store.clients().update(client.id, draft("renamed")).await.is_err());
        assert!(ClientStore::delete(&store, client.id).await.is_err());

        let clients = store.clients().list().await.unwrap();
        assert_eq!(clients, vec![client.clone()]);
        let kept = store.properties().get(record.id.unwrap()).await.unwrap().unwrap();
        assert_eq!(kept.api_client, Some(client.id));

        // 寫入恢復後可正常提交
        store.storage.fail_writes.store(false, Ordering::SeqCst);
        let other = store.clients().create(draft("other")).await.unwrap();
        assert_eq!(other.id, client.id + 1);
    }

    #[tokio::test]
    async fn test_snapshot_survives_reopen() {
        let temp_dir = TempDir::new().unwrap();
        let address = PropertyAddress::new("7500 Melrose Ave", "90046");

        {
            let store = FileStore::open(LocalStorage::new(temp_dir.path()), DEFAULT_SNAPSHOT_FILE)
                .await
                .unwrap();
            let client = store
                .clients()
                .create(NewApiClient {
                    name: "mock".to_string(),
                    credential_id: "cid".to_string(),
                    credential_secret: "secret".to_string(),
                    host: "http://localhost:9000".to_string(),
                    path: "property/details".to_string(),
                })
                .await
                .unwrap();

            let mut record = PropertyRecord::new(address.clone(), Some(client.id));
            record.sewage_type = SewageType::Septic;
            store.properties().save(&mut record).await.unwrap();
        }

        assert!(temp_dir.path().join(DEFAULT_SNAPSHOT_FILE).exists());

        let reopened = FileStore::open(LocalStorage::new(temp_dir.path()), DEFAULT_SNAPSHOT_FILE)
            .await
            .unwrap();
        let record = reopened.properties().find(&address).await.unwrap().unwrap();
        assert_eq!(record.sewage_type, SewageType::Septic);
        assert_eq!(reopened.clients().list().await.unwrap().len(), 1);

        // 新的 id 不可與舊資料重複
        let next = reopened
            .clients()
            .create(NewApiClient {
                name: "second".to_string(),
                credential_id: "cid-2".to_string(),
                credential_secret: "secret".to_string(),
                host: "http://localhost:9001".to_string(),
                path: "property/details".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(next.id, 2);
    }

    #[tokio::test]
    async fn test_corrupt_snapshot_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join(DEFAULT_SNAPSHOT_FILE), b"not json").unwrap();

        let result = FileStore::open(LocalStorage::new(temp_dir.path()), DEFAULT_SNAPSHOT_FILE).await;
        assert!(matches!(result, Err(StoreError::Serialization(_))));
    }
}
