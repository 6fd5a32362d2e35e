use crate::domain::model::NewApiClient;
use crate::domain::ports::ClientStore;
use crate::utils::error::StoreError;

/// Registers configured clients whose credential identifier is not stored yet.
///
/// Returns how many were created. Existing clients are left untouched so edits made
/// through the admin API survive a restart.
pub async fn seed_clients(
    store: &dyn ClientStore,
    clients: &[NewApiClient],
) -> Result<usize, StoreError> {
    let existing = store.list().await?;
    let mut created = 0;

    for draft in clients {
        if existing
            .iter()
            .any(|c| c.credential_id == draft.credential_id)
        {
            tracing::debug!("API client '{}' already registered", draft.credential_id);
            continue;
        }

        let client = store.create(draft.clone()).await?;
        tracing::info!(
            "✅ Registered API client #{} '{}' -> {}",
            client.id,
            client.name,
            client.host
        );
        created += 1;
    }

    Ok(created)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::storage::MemoryStore;
    use crate::domain::ports::Repository;

    fn draft(credential_id: &str) -> NewApiClient {
        NewApiClient {
            name: credential_id.to_string(),
            credential_id: credential_id.to_string(),
            credential_secret: "secret".to_string(),
            host: "http://localhost:9000".to_string(),
            path: "property/details".to_string(),
        }
    }

    #[tokio::test]
    async fn test_seed_is_idempotent() {
        let store = MemoryStore::new();
        let clients = vec![draft("a"), draft("b")];

        assert_eq!(seed_clients(store.clients(), &clients).await.unwrap(), 2);
        assert_eq!(seed_clients(store.clients(), &clients).await.unwrap(), 0);
        assert_eq!(store.clients().list().await.unwrap().len(), 2);
    }
}
