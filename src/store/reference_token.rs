//! Reference Token Store
//!
//! Opaque access tokens whose content is looked up by handle.

use async_trait::async_trait;
use std::sync::Arc;

use super::grant_store::DefaultGrantStore;
use crate::core::{GrantSerializer, HandleGenerator, PersistedGrantStore};
use crate::error::GrantStoreError;
use crate::telemetry::GrantStoreMetrics;
use crate::types::{persisted_grant_types, GrantMetadata, GrantStoreOptions, Token};

/// Reference token store interface.
#[async_trait]
pub trait ReferenceTokenStore: Send + Sync {
    /// Store a reference token and return its handle.
    async fn store_reference_token(&self, token: &Token) -> Result<String, GrantStoreError>;

    /// Get a reference token.
    async fn get_reference_token(&self, handle: &str) -> Result<Option<Token>, GrantStoreError>;

    /// Remove a reference token.
    async fn remove_reference_token(&self, handle: &str) -> Result<(), GrantStoreError>;

    /// Remove all reference tokens of a subject for a client, optionally within one session.
    async fn remove_reference_tokens(
        &self,
        subject_id: &str,
        client_id: &str,
        session_id: Option<&str>,
    ) -> Result<(), GrantStoreError>;
}

/// Default reference token store.
#[derive(Clone)]
pub struct DefaultReferenceTokenStore {
    grants: DefaultGrantStore<Token>,
}

impl DefaultReferenceTokenStore {
    /// Create new reference token store.
    pub fn new(
        store: Arc<dyn PersistedGrantStore>,
        serializer: Arc<dyn GrantSerializer>,
        handles: Arc<dyn HandleGenerator>,
    ) -> Self {
        Self {
            grants: DefaultGrantStore::new(
                persisted_grant_types::REFERENCE_TOKEN,
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
impl ReferenceTokenStore for DefaultReferenceTokenStore {
    async fn store_reference_token(&self, token: &Token) -> Result<String, GrantStoreError> {
        let metadata = GrantMetadata::new(token.client_id.clone())
            .subject_id(token.subject_id.clone())
            .session_id(token.resolved_session_id().map(String::from))
            .description(token.description.clone());

        self.grants
            .create_item(token, metadata, token.creation_time, token.lifetime)
            .await
    }

    async fn get_reference_token(&self, handle: &str) -> Result<Option<Token>, GrantStoreError> {
        self.grants.get_item(handle).await
    }

    async fn remove_reference_token(&self, handle: &str) -> Result<(), GrantStoreError> {
        self.grants.remove_item(handle).await
    }

    async fn remove_reference_tokens(
        &self,
        subject_id: &str,
        client_id: &str,
        session_id: Option<&str>,
    ) -> Result<(), GrantStoreError> {
        self.grants
            .remove_all(subject_id, client_id, session_id)
            .await
            .map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{DefaultHandleGenerator, InMemoryPersistedGrantStore, JsonGrantSerializer};
    use crate::types::{claim_types, Claim};
    use chrono::Utc;

    fn create_store(persisted: Arc<InMemoryPersistedGrantStore>) -> DefaultReferenceTokenStore {
        DefaultReferenceTokenStore::new(
            persisted,
            Arc::new(JsonGrantSerializer::new()),
            Arc::new(DefaultHandleGenerator::new()),
        )
    }

    fn create_test_token(session: &str) -> Token {
        let mut token = Token::new("api-client", Utc::now(), 300);
        token.subject_id = Some("alice".to_string());
        token.scopes.insert("api.read".to_string());
        token.claims.push(Claim::new(claim_types::SESSION_ID, session));
        token.audiences.push("urn:api".to_string());
        token
    }

    #[tokio::test]
    async fn test_store_and_get_reference_token() {
        let persisted = Arc::new(InMemoryPersistedGrantStore::new());
        let store = create_store(persisted);
        let token = create_test_token("s-1");

        let handle = store.store_reference_token(&token).await.unwrap();
        let fetched = store.get_reference_token(&handle).await.unwrap();
        assert_eq!(fetched, Some(token));

        store.remove_reference_token(&handle).await.unwrap();
        assert!(store.get_reference_token(&handle).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_remove_reference_tokens_by_session() {
        let persisted = Arc::new(InMemoryPersistedGrantStore::new());
        let store = create_store(persisted.clone());

        let first = store
            .store_reference_token(&create_test_token("s-1"))
            .await
            .unwrap();
        let second = store
            .store_reference_token(&create_test_token("s-2"))
            .await
            .unwrap();

        store
            .remove_reference_tokens("alice", "api-client", Some("s-1"))
            .await
            .unwrap();

        assert!(store.get_reference_token(&first).await.unwrap().is_none());
        assert!(store.get_reference_token(&second).await.unwrap().is_some());
    }
}
