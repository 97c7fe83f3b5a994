//! Persisted Grant Store
//!
//! Backend contract for grant records plus in-memory and mock implementations.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Mutex;
use tokio::sync::RwLock;

use crate::error::{GrantStoreError, StorageError};
use crate::types::{PersistedGrant, PersistedGrantFilter};

/// Persisted grant store interface.
///
/// Every operation is atomic per key; no multi-key transactions are required.
#[async_trait]
pub trait PersistedGrantStore: Send + Sync {
    /// Insert or replace a grant by key.
    async fn store(&self, grant: PersistedGrant) -> Result<(), GrantStoreError>;

    /// Get a grant by key.
    async fn get(&self, key: &str) -> Result<Option<PersistedGrant>, GrantStoreError>;

    /// Get all grants matching a filter.
    async fn get_all(
        &self,
        filter: &PersistedGrantFilter,
    ) -> Result<Vec<PersistedGrant>, GrantStoreError>;

    /// Remove a grant by key. Removing a missing key is not an error.
    async fn remove(&self, key: &str) -> Result<(), GrantStoreError>;

    /// Remove all grants matching a filter, returning how many were removed.
    async fn remove_all(&self, filter: &PersistedGrantFilter) -> Result<u64, GrantStoreError>;
}

/// In-memory persisted grant store.
#[derive(Default)]
pub struct InMemoryPersistedGrantStore {
    grants: RwLock<HashMap<String, PersistedGrant>>,
}

impl InMemoryPersistedGrantStore {
    /// Create new in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored grants.
    pub async fn len(&self) -> usize {
        self.grants.read().await.len()
    }

    /// Check if the store is empty.
    pub async fn is_empty(&self) -> bool {
        self.grants.read().await.is_empty()
    }

    /// Remove grants expired at `now`, returning how many were removed.
    pub async fn clear_expired(&self, now: DateTime<Utc>) -> u64 {
        let mut grants = self.grants.write().await;
        let initial_count = grants.len();
        grants.retain(|_, grant| !grant.is_expired_at(now));
        (initial_count - grants.len()) as u64
    }
}

#[async_trait]
impl PersistedGrantStore for InMemoryPersistedGrantStore {
    async fn store(&self, grant: PersistedGrant) -> Result<(), GrantStoreError> {
        self.grants.write().await.insert(grant.key.clone(), grant);
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<PersistedGrant>, GrantStoreError> {
        Ok(self.grants.read().await.get(key).cloned())
    }

    async fn get_all(
        &self,
        filter: &PersistedGrantFilter,
    ) -> Result<Vec<PersistedGrant>, GrantStoreError> {
        filter.validate()?;

        let grants = self.grants.read().await;
        Ok(grants
            .values()
            .filter(|grant| filter.matches(grant))
            .cloned()
            .collect())
    }

    async fn remove(&self, key: &str) -> Result<(), GrantStoreError> {
        self.grants.write().await.remove(key);
        Ok(())
    }

    async fn remove_all(&self, filter: &PersistedGrantFilter) -> Result<u64, GrantStoreError> {
        filter.validate()?;

        let mut grants = self.grants.write().await;
        let initial_count = grants.len();
        grants.retain(|_, grant| !filter.matches(grant));
        Ok((initial_count - grants.len()) as u64)
    }
}

/// Mock persisted grant store for testing.
#[derive(Default)]
pub struct MockPersistedGrantStore {
    grants: Mutex<HashMap<String, PersistedGrant>>,
    store_history: Mutex<Vec<PersistedGrant>>,
    get_history: Mutex<Vec<String>>,
    remove_history: Mutex<Vec<String>>,
    remove_all_history: Mutex<Vec<PersistedGrantFilter>>,
    next_error: Mutex<Option<GrantStoreError>>,
    should_fail: Mutex<bool>,
    fail_writes: Mutex<bool>,
}

impl MockPersistedGrantStore {
    /// Create new mock store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set next error to return.
    pub fn set_next_error(&self, error: GrantStoreError) -> &Self {
        *self.next_error.lock().unwrap() = Some(error);
        self
    }

    /// Set store to fail all operations.
    pub fn set_should_fail(&self, should_fail: bool) -> &Self {
        *self.should_fail.lock().unwrap() = should_fail;
        self
    }

    /// Set store to fail writes while reads keep working.
    pub fn set_fail_writes(&self, fail_writes: bool) -> &Self {
        *self.fail_writes.lock().unwrap() = fail_writes;
        self
    }

    /// Pre-populate a grant.
    pub fn add_grant(&self, grant: PersistedGrant) -> &Self {
        self.grants.lock().unwrap().insert(grant.key.clone(), grant);
        self
    }

    /// Replace the payload bytes of a stored grant.
    pub fn corrupt_data(&self, key: &str, data: Vec<u8>) -> bool {
        match self.grants.lock().unwrap().get_mut(key) {
            Some(grant) => {
                grant.data = data;
                true
            }
            None => false,
        }
    }

    /// Get a stored grant without recording history.
    pub fn peek(&self, key: &str) -> Option<PersistedGrant> {
        self.grants.lock().unwrap().get(key).cloned()
    }

    /// All stored grants.
    pub fn grants(&self) -> Vec<PersistedGrant> {
        self.grants.lock().unwrap().values().cloned().collect()
    }

    /// Get store history.
    pub fn get_store_history(&self) -> Vec<PersistedGrant> {
        self.store_history.lock().unwrap().clone()
    }

    /// Get lookup history.
    pub fn get_get_history(&self) -> Vec<String> {
        self.get_history.lock().unwrap().clone()
    }

    /// Get remove history.
    pub fn get_remove_history(&self) -> Vec<String> {
        self.remove_history.lock().unwrap().clone()
    }

    /// Get bulk remove history.
    pub fn get_remove_all_history(&self) -> Vec<PersistedGrantFilter> {
        self.remove_all_history.lock().unwrap().clone()
    }

    fn check_error(&self) -> Result<(), GrantStoreError> {
        if *self.should_fail.lock().unwrap() {
            return Err(StorageError::Unavailable {
                message: "Mock storage failure".to_string(),
            }
            .into());
        }

        if let Some(error) = self.next_error.lock().unwrap().take() {
            return Err(error);
        }

        Ok(())
    }
}

#[async_trait]
impl PersistedGrantStore for MockPersistedGrantStore {
    async fn store(&self, grant: PersistedGrant) -> Result<(), GrantStoreError> {
        self.check_error()?;
        if *self.fail_writes.lock().unwrap() {
            return Err(StorageError::WriteFailed {
                message: "Mock write failure".to_string(),
            }
            .into());
        }

        self.store_history.lock().unwrap().push(grant.clone());
        self.grants.lock().unwrap().insert(grant.key.clone(), grant);
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<PersistedGrant>, GrantStoreError> {
        self.check_error()?;

        self.get_history.lock().unwrap().push(key.to_string());
        Ok(self.grants.lock().unwrap().get(key).cloned())
    }

    async fn get_all(
        &self,
        filter: &PersistedGrantFilter,
    ) -> Result<Vec<PersistedGrant>, GrantStoreError> {
        self.check_error()?;
        filter.validate()?;

        Ok(self
            .grants
            .lock()
            .unwrap()
            .values()
            .filter(|grant| filter.matches(grant))
            .cloned()
            .collect())
    }

    async fn remove(&self, key: &str) -> Result<(), GrantStoreError> {
        self.check_error()?;

        self.remove_history.lock().unwrap().push(key.to_string());
        self.grants.lock().unwrap().remove(key);
        Ok(())
    }

    async fn remove_all(&self, filter: &PersistedGrantFilter) -> Result<u64, GrantStoreError> {
        self.check_error()?;
        filter.validate()?;

        self.remove_all_history.lock().unwrap().push(filter.clone());
        let mut grants = self.grants.lock().unwrap();
        let initial_count = grants.len();
        grants.retain(|_, grant| !filter.matches(grant));
        Ok((initial_count - grants.len()) as u64)
    }
}

/// Create in-memory persisted grant store.
pub fn create_in_memory_grant_store() -> InMemoryPersistedGrantStore {
    InMemoryPersistedGrantStore::new()
}

/// Create mock persisted grant store for testing.
pub fn create_mock_grant_store() -> MockPersistedGrantStore {
    MockPersistedGrantStore::new()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GrantError;
    use crate::types::persisted_grant_types;
    use chrono::Duration;

    fn create_test_grant(key: &str, subject: &str, client: &str) -> PersistedGrant {
        PersistedGrant {
            key: key.to_string(),
            grant_type: persisted_grant_types::REFRESH_TOKEN.to_string(),
            subject_id: Some(subject.to_string()),
            client_id: client.to_string(),
            session_id: None,
            description: None,
            creation_time: Utc::now(),
            expiration: None,
            consumed_time: None,
            data: b"{}".to_vec(),
        }
    }

    #[tokio::test]
    async fn test_in_memory_store_and_get() {
        let store = InMemoryPersistedGrantStore::new();
        store
            .store(create_test_grant("k1", "bob", "app2"))
            .await
            .unwrap();

        let grant = store.get("k1").await.unwrap();
        assert_eq!(grant.unwrap().client_id, "app2");
        assert!(store.get("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_in_memory_store_upserts() {
        let store = InMemoryPersistedGrantStore::new();
        store
            .store(create_test_grant("k1", "bob", "app2"))
            .await
            .unwrap();
        store
            .store(create_test_grant("k1", "bob", "app3"))
            .await
            .unwrap();

        assert_eq!(store.len().await, 1);
        assert_eq!(store.get("k1").await.unwrap().unwrap().client_id, "app3");
    }

    #[tokio::test]
    async fn test_in_memory_remove_is_idempotent() {
        let store = InMemoryPersistedGrantStore::new();
        store
            .store(create_test_grant("k1", "bob", "app2"))
            .await
            .unwrap();

        store.remove("k1").await.unwrap();
        store.remove("k1").await.unwrap();
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_in_memory_remove_all() {
        let store = InMemoryPersistedGrantStore::new();
        for (key, client) in [("k1", "app2"), ("k2", "app2"), ("k3", "app3")] {
            store
                .store(create_test_grant(key, "bob", client))
                .await
                .unwrap();
        }

        let filter = PersistedGrantFilter::new().subject_id("bob").client_id("app2");
        assert_eq!(store.get_all(&filter).await.unwrap().len(), 2);
        assert_eq!(store.remove_all(&filter).await.unwrap(), 2);
        assert_eq!(store.len().await, 1);
        assert!(store.get("k3").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_in_memory_rejects_empty_filter() {
        let store = InMemoryPersistedGrantStore::new();
        store
            .store(create_test_grant("k1", "bob", "app2"))
            .await
            .unwrap();

        let result = store.remove_all(&PersistedGrantFilter::new()).await;
        assert!(matches!(
            result,
            Err(GrantStoreError::Grant(GrantError::InvalidFilter))
        ));
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_in_memory_clear_expired() {
        let store = InMemoryPersistedGrantStore::new();
        let now = Utc::now();

        let mut expired = create_test_grant("k1", "bob", "app2");
        expired.expiration = Some(now - Duration::seconds(10));
        let mut live = create_test_grant("k2", "bob", "app2");
        live.expiration = Some(now + Duration::seconds(10));

        store.store(expired).await.unwrap();
        store.store(live).await.unwrap();
        store
            .store(create_test_grant("k3", "bob", "app2"))
            .await
            .unwrap();

        assert_eq!(store.clear_expired(now).await, 1);
        assert!(store.get("k1").await.unwrap().is_none());
        assert_eq!(store.len().await, 2);
    }

    #[tokio::test]
    async fn test_mock_store_history() {
        let store = MockPersistedGrantStore::new();
        store
            .store(create_test_grant("k1", "bob", "app2"))
            .await
            .unwrap();
        store.get("k1").await.unwrap();
        store.remove("k1").await.unwrap();

        assert_eq!(store.get_store_history().len(), 1);
        assert_eq!(store.get_get_history(), vec!["k1".to_string()]);
        assert_eq!(store.get_remove_history(), vec!["k1".to_string()]);
    }

    #[tokio::test]
    async fn test_mock_store_failure() {
        let store = MockPersistedGrantStore::new();
        store.set_should_fail(true);

        let result = store.store(create_test_grant("k1", "bob", "app2")).await;
        assert!(result.unwrap_err().is_retryable());
    }

    #[tokio::test]
    async fn test_mock_store_next_error_is_consumed() {
        let store = MockPersistedGrantStore::new();
        store.set_next_error(
            StorageError::ReadFailed {
                message: "timeout".to_string(),
            }
            .into(),
        );

        assert!(store.get("k1").await.is_err());
        assert!(store.get("k1").await.is_ok());
    }
}
