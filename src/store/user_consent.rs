//! User Consent Store
//!
//! Consent is keyed by subject and client rather than by a minted handle.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::warn;

use super::grant_store::DefaultGrantStore;
use crate::core::{GrantSerializer, HandleGenerator, PersistedGrantStore};
use crate::error::GrantStoreError;
use crate::telemetry::GrantStoreMetrics;
use crate::types::{persisted_grant_types, Consent, GrantMetadata, GrantStoreOptions};

/// User consent store interface.
#[async_trait]
pub trait UserConsentStore: Send + Sync {
    /// Store (or replace) a user's consent for a client.
    async fn store_user_consent(&self, consent: &Consent) -> Result<(), GrantStoreError>;

    /// Get a user's consent for a client.
    async fn get_user_consent(
        &self,
        subject_id: &str,
        client_id: &str,
    ) -> Result<Option<Consent>, GrantStoreError>;

    /// Remove a user's consent for a client.
    async fn remove_user_consent(
        &self,
        subject_id: &str,
        client_id: &str,
    ) -> Result<(), GrantStoreError>;
}

/// Default user consent store.
#[derive(Clone)]
pub struct DefaultUserConsentStore {
    grants: DefaultGrantStore<Consent>,
}

impl DefaultUserConsentStore {
    /// Create new user consent store.
    pub fn new(
        store: Arc<dyn PersistedGrantStore>,
        serializer: Arc<dyn GrantSerializer>,
        handles: Arc<dyn HandleGenerator>,
    ) -> Self {
        Self {
            grants: DefaultGrantStore::new(
                persisted_grant_types::USER_CONSENT,
                store,
                serializer,
                handles,
            ),
        }
    }

    /// Set options.
    pub fn with_options(mut self, options: GrantStoreOptions) -> Self {
        self.grants = self.grants.with_options(options);
        self
    }

    /// Set metrics sink.
    pub fn with_metrics(mut self, metrics: Arc<dyn GrantStoreMetrics>) -> Self {
        self.grants = self.grants.with_metrics(metrics);
        self
    }
}

#[async_trait]
impl UserConsentStore for DefaultUserConsentStore {
    async fn store_user_consent(&self, consent: &Consent) -> Result<(), GrantStoreError> {
        let handle = Consent::handle(&consent.subject_id, &consent.client_id);
        let metadata =
            GrantMetadata::new(consent.client_id.clone()).subject_id(Some(consent.subject_id.clone()));

        self.grants
            .store_item(
                &handle,
                consent,
                metadata,
                consent.creation_time,
                consent.expiration,
                None,
            )
            .await
    }

    async fn get_user_consent(
        &self,
        subject_id: &str,
        client_id: &str,
    ) -> Result<Option<Consent>, GrantStoreError> {
        let consent = self
            .grants
            .get_item(&Consent::handle(subject_id, client_id))
            .await?;

        match consent {
            Some(consent) if consent.is_for(subject_id, client_id) => Ok(Some(consent)),
            Some(consent) => {
                warn!(
                    client_id = %client_id,
                    stored_client_id = %consent.client_id,
                    "Consent handle resolved to another subject or client, treating as not found"
                );
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn remove_user_consent(
        &self,
        subject_id: &str,
        client_id: &str,
    ) -> Result<(), GrantStoreError> {
        if self.get_user_consent(subject_id, client_id).await?.is_none() {
            return Ok(());
        }

        self.grants
            .remove_item(&Consent::handle(subject_id, client_id))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{InMemoryPersistedGrantStore, JsonGrantSerializer, MockHandleGenerator};
    use crate::error::GrantError;
    use chrono::{Duration, Utc};
    use std::collections::BTreeSet;

    fn create_store() -> (DefaultUserConsentStore, Arc<MockHandleGenerator>) {
        let handles = Arc::new(MockHandleGenerator::new());
        let store = DefaultUserConsentStore::new(
            Arc::new(InMemoryPersistedGrantStore::new()),
            Arc::new(JsonGrantSerializer::new()),
            handles.clone(),
        );
        (store, handles)
    }

    fn consent(scopes: &[&str]) -> Consent {
        Consent {
            subject_id: "alice".to_string(),
            client_id: "app1".to_string(),
            scopes: scopes.iter().map(|s| s.to_string()).collect::<BTreeSet<_>>(),
            creation_time: Utc::now(),
            expiration: None,
        }
    }

    #[tokio::test]
    async fn test_consent_is_replaced_in_place() {
        let (store, handles) = create_store();

        store.store_user_consent(&consent(&["openid"])).await.unwrap();
        store
            .store_user_consent(&consent(&["openid", "profile"]))
            .await
            .unwrap();

        let fetched = store.get_user_consent("alice", "app1").await.unwrap().unwrap();
        assert_eq!(fetched.scopes.len(), 2);
        assert!(store.get_user_consent("bob", "app1").await.unwrap().is_none());
        assert!(handles.get_generate_history().is_empty());

        store.remove_user_consent("alice", "app1").await.unwrap();
        assert!(store.get_user_consent("alice", "app1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delimiter_in_ids_does_not_leak_consent() {
        let (store, _) = create_store();
        let mut owned = consent(&["openid"]);
        owned.subject_id = "c".to_string();
        owned.client_id = "a|b".to_string();

        store.store_user_consent(&owned).await.unwrap();

        assert!(store.get_user_consent("b|c", "a").await.unwrap().is_none());
        store.remove_user_consent("b|c", "a").await.unwrap();
        assert_eq!(store.get_user_consent("c", "a|b").await.unwrap(), Some(owned));
    }

    #[tokio::test]
    async fn test_consent_of_another_owner_is_not_returned_or_removed() {
        let (store, _) = create_store();
        let foreign = consent(&["openid"]);

        // A record whose payload names another subject sits under bob's handle.
        store
            .grants
            .store_item(
                &Consent::handle("bob", "app1"),
                &foreign,
                GrantMetadata::new("app1"),
                foreign.creation_time,
                None,
                None,
            )
            .await
            .unwrap();

        assert!(store.get_user_consent("bob", "app1").await.unwrap().is_none());
        store.remove_user_consent("bob", "app1").await.unwrap();

        let raw = store
            .grants
            .get_item(&Consent::handle("bob", "app1"))
            .await
            .unwrap();
        assert_eq!(raw, Some(foreign));
    }

    #[tokio::test]
    async fn test_consent_expiring_before_creation_is_rejected() {
        let (store, _) = create_store();
        let mut bad = consent(&["openid"]);
        bad.expiration = Some(bad.creation_time - Duration::seconds(1));

        let result = store.store_user_consent(&bad).await;
        assert!(matches!(
            result,
            Err(GrantStoreError::Grant(GrantError::InvalidExpiration))
        ));
    }
}
