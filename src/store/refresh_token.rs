//! Refresh Token Store
//!
//! Refresh token persistence on top of the generic grant store, with legacy
//! record migration on read.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{info, warn};

use super::grant_store::{compute_expiration, DefaultGrantStore};
use super::migration::{migrate_refresh_token, needs_migration};
use crate::core::{GrantSerializer, HandleGenerator, PersistedGrantStore};
use crate::error::GrantStoreError;
use crate::telemetry::GrantStoreMetrics;
use crate::types::{
    persisted_grant_types, GrantMetadata, GrantStoreOptions, MigrationPolicy, RefreshToken,
};

/// Refresh token store interface.
#[async_trait]
pub trait RefreshTokenStore: Send + Sync {
    /// Store a new refresh token and return its handle.
    async fn store_refresh_token(&self, token: &RefreshToken) -> Result<String, GrantStoreError>;

    /// Replace the refresh token stored under a handle.
    async fn update_refresh_token(
        &self,
        handle: &str,
        token: &RefreshToken,
    ) -> Result<(), GrantStoreError>;

    /// Get a refresh token, upgraded to the current schema version.
    async fn get_refresh_token(&self, handle: &str)
        -> Result<Option<RefreshToken>, GrantStoreError>;

    /// Remove a refresh token.
    async fn remove_refresh_token(&self, handle: &str) -> Result<(), GrantStoreError>;

    /// Remove all refresh tokens of a subject for a client.
    async fn remove_refresh_tokens(
        &self,
        subject_id: &str,
        client_id: &str,
    ) -> Result<(), GrantStoreError>;
}

/// Default refresh token store.
#[derive(Clone)]
pub struct DefaultRefreshTokenStore {
    grants: DefaultGrantStore<RefreshToken>,
}

impl DefaultRefreshTokenStore {
    /// Create new refresh token store.
    pub fn new(
        store: Arc<dyn PersistedGrantStore>,
        serializer: Arc<dyn GrantSerializer>,
        handles: Arc<dyn HandleGenerator>,
    ) -> Self {
        Self {
            grants: DefaultGrantStore::new(
                persisted_grant_types::REFRESH_TOKEN,
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

    /// Underlying grant store.
    pub fn grants(&self) -> &DefaultGrantStore<RefreshToken> {
        &self.grants
    }

    fn metadata(token: &RefreshToken) -> GrantMetadata {
        GrantMetadata::new(token.client_id.clone())
            .subject_id(token.subject_id().map(String::from))
            .session_id(token.session_id.clone())
            .description(token.description.clone())
    }
}

#[async_trait]
impl RefreshTokenStore for DefaultRefreshTokenStore {
    async fn store_refresh_token(&self, token: &RefreshToken) -> Result<String, GrantStoreError> {
        self.grants
            .create_item(
                token,
                Self::metadata(token),
                token.creation_time,
                token.lifetime,
            )
            .await
    }

    async fn update_refresh_token(
        &self,
        handle: &str,
        token: &RefreshToken,
    ) -> Result<(), GrantStoreError> {
        // The lifetime window is carried forward as-is; only consumed time may change.
        let expiration = compute_expiration(token.creation_time, token.lifetime)?;

        self.grants
            .store_item(
                handle,
                token,
                Self::metadata(token),
                token.creation_time,
                expiration,
                token.consumed_time,
            )
            .await
    }

    async fn get_refresh_token(
        &self,
        handle: &str,
    ) -> Result<Option<RefreshToken>, GrantStoreError> {
        let token = match self.grants.get_item(handle).await? {
            Some(token) => token,
            None => return Ok(None),
        };

        if !needs_migration(&token) {
            return Ok(Some(token));
        }

        let from_version = token.version;
        if token.access_token.is_none() {
            warn!(
                version = from_version,
                "Legacy refresh token has no embedded access token"
            );
        }

        let migrated = migrate_refresh_token(token);
        let mut persisted = false;

        if self.grants.options().migration == MigrationPolicy::MigrateAndPersist {
            match self.update_refresh_token(handle, &migrated).await {
                Ok(()) => persisted = true,
                Err(error) => warn!(
                    error = %error,
                    "Failed to persist migrated refresh token"
                ),
            }
        }

        info!(
            from_version,
            to_version = migrated.version,
            persisted,
            "Migrated legacy refresh token"
        );
        self.grants
            .metrics()
            .record_migration(self.grants.grant_type(), from_version, persisted);

        Ok(Some(migrated))
    }

    async fn remove_refresh_token(&self, handle: &str) -> Result<(), GrantStoreError> {
        self.grants.remove_item(handle).await
    }

    async fn remove_refresh_tokens(
        &self,
        subject_id: &str,
        client_id: &str,
    ) -> Result<(), GrantStoreError> {
        self.grants
            .remove_all(subject_id, client_id, None)
            .await
            .map(|_| ())
    }
}
