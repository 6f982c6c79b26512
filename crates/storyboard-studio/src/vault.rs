//! Credential vault kept in the key-value store.

use std::sync::Arc;

use async_trait::async_trait;
use storyboard_core::credential::CredentialVault;
use storyboard_core::error::StorageError;
use storyboard_core::storage::KeyValueStore;

/// Storage key of the manually entered key.
pub const API_KEY_KEY: &str = "wt_api_key";

/// Storage key of the "vault activated" flag.
pub const ACTIVATED_KEY: &str = "wt_vault_activated";

/// Vault over a [`KeyValueStore`], plus the environment-provided key.
pub struct StoredCredentialVault {
    store: Arc<dyn KeyValueStore>,
    environment_key: bool,
}

impl StoredCredentialVault {
    /// Creates a vault. `environment_key` tells whether the process
    /// environment supplies a key.
    #[must_use]
    pub fn new(store: Arc<dyn KeyValueStore>, environment_key: bool) -> Self {
        Self {
            store,
            environment_key,
        }
    }
}

#[async_trait]
impl CredentialVault for StoredCredentialVault {
    fn has_environment_key(&self) -> bool {
        self.environment_key
    }

    async fn is_activated(&self) -> Result<bool, StorageError> {
        Ok(self.store.get(ACTIVATED_KEY).await?.as_deref() == Some("true"))
    }

    async fn set_activated(&self, activated: bool) -> Result<(), StorageError> {
        self.store.set(ACTIVATED_KEY, activated.to_string()).await
    }

    async fn has_stored_key(&self) -> Result<bool, StorageError> {
        Ok(self
            .store
            .get(API_KEY_KEY)
            .await?
            .is_some_and(|key| !key.trim().is_empty()))
    }

    async fn store_key(&self, key: &str) -> Result<(), StorageError> {
        self.store.set(API_KEY_KEY, key.to_owned()).await
    }

    async fn remove_key(&self) -> Result<(), StorageError> {
        self.store.remove(API_KEY_KEY).await
    }
}

impl std::fmt::Debug for StoredCredentialVault {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoredCredentialVault")
            .field("environment_key", &self.environment_key)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use storyboard_test_support::{FailingStore, MemoryStore};

    #[tokio::test]
    async fn test_empty_store_is_not_activated_and_has_no_key() {
        let vault = StoredCredentialVault::new(Arc::new(MemoryStore::new()), false);

        assert!(!vault.has_environment_key());
        assert!(!vault.is_activated().await.unwrap());
        assert!(!vault.has_stored_key().await.unwrap());
    }

    #[tokio::test]
    async fn test_store_activate_and_remove_key() {
        // Arrange
        let store = Arc::new(MemoryStore::new());
        let vault = StoredCredentialVault::new(Arc::clone(&store) as Arc<dyn KeyValueStore>, false);

        // Act
        vault.store_key("AIza-test").await.unwrap();
        vault.set_activated(true).await.unwrap();

        // Assert
        assert_eq!(store.value(API_KEY_KEY).as_deref(), Some("AIza-test"));
        assert_eq!(store.value(ACTIVATED_KEY).as_deref(), Some("true"));
        assert!(vault.is_activated().await.unwrap());
        assert!(vault.has_stored_key().await.unwrap());

        vault.remove_key().await.unwrap();
        assert!(!vault.has_stored_key().await.unwrap());
    }

    #[tokio::test]
    async fn test_storage_failures_propagate() {
        let vault = StoredCredentialVault::new(Arc::new(FailingStore), true);

        assert!(vault.has_environment_key());
        assert!(matches!(
            vault.is_activated().await,
            Err(StorageError::Io(_))
        ));
    }
}
