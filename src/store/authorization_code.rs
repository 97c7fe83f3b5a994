//! Authorization Code Store

use async_trait::async_trait;
use std::sync::Arc;

use super::grant_store::DefaultGrantStore;
use crate::core::{GrantSerializer, HandleGenerator, PersistedGrantStore};
use crate::error::GrantStoreError;
use crate::telemetry::GrantStoreMetrics;
use crate::types::{persisted_grant_types, AuthorizationCode, GrantMetadata, GrantStoreOptions};

/// Authorization code store interface.
#[async_trait]
pub trait AuthorizationCodeStore: Send + Sync {
    /// Store an authorization code and return its handle.
    async fn store_authorization_code(
        &self,
        code: &AuthorizationCode,
    ) -> Result<String, GrantStoreError>;

    /// Get an authorization code.
    async fn get_authorization_code(
        &self,
        handle: &str,
    ) -> Result<Option<AuthorizationCode>, GrantStoreError>;

    /// Remove an authorization code.
    async fn remove_authorization_code(&self, handle: &str) -> Result<(), GrantStoreError>;
}

/// Default authorization code store.
#[derive(Clone)]
pub struct DefaultAuthorizationCodeStore {
    grants: DefaultGrantStore<AuthorizationCode>,
}

impl DefaultAuthorizationCodeStore {
    /// Create new authorization code store.
    pub fn new(
        store: Arc<dyn PersistedGrantStore>,
        serializer: Arc<dyn GrantSerializer>,
        handles: Arc<dyn HandleGenerator>,
    ) -> Self {
        Self {
            grants: DefaultGrantStore::new(
                persisted_grant_types::AUTHORIZATION_CODE,
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
impl AuthorizationCodeStore for DefaultAuthorizationCodeStore {
    async fn store_authorization_code(
        &self,
        code: &AuthorizationCode,
    ) -> Result<String, GrantStoreError> {
        let metadata = GrantMetadata::new(code.client_id.clone())
            .subject_id(Some(code.subject.subject_id.clone()))
            .session_id(code.resolved_session_id().map(String::from))
            .description(code.description.clone());

        self.grants
            .create_item(code, metadata, code.creation_time, code.lifetime)
            .await
    }

    async fn get_authorization_code(
        &self,
        handle: &str,
    ) -> Result<Option<AuthorizationCode>, GrantStoreError> {
        self.grants.get_item(handle).await
    }

    async fn remove_authorization_code(&self, handle: &str) -> Result<(), GrantStoreError> {
        self.grants.remove_item(handle).await
    }
}
