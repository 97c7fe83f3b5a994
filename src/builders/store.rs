//! Grant Store Builder
//!
//! Assembles a [`DefaultGrantStore`] from its collaborators, defaulting the optional ones.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::marker::PhantomData;
use std::sync::Arc;

use crate::core::{
    DefaultHandleGenerator, GrantSerializer, HandleGenerator, JsonGrantSerializer,
    PersistedGrantStore,
};
use crate::error::{ConfigurationError, GrantStoreError};
use crate::store::DefaultGrantStore;
use crate::telemetry::{GrantStoreMetrics, NoOpMetrics};
use crate::types::GrantStoreOptions;

/// Grant store builder.
pub struct GrantStoreBuilder<T> {
    grant_type: Option<String>,
    store: Option<Arc<dyn PersistedGrantStore>>,
    serializer: Option<Arc<dyn GrantSerializer>>,
    handles: Option<Arc<dyn HandleGenerator>>,
    metrics: Option<Arc<dyn GrantStoreMetrics>>,
    options: GrantStoreOptions,
    _payload: PhantomData<fn() -> T>,
}

impl<T> Default for GrantStoreBuilder<T> {
    fn default() -> Self {
        Self {
            grant_type: None,
            store: None,
            serializer: None,
            handles: None,
            metrics: None,
            options: GrantStoreOptions::default(),
            _payload: PhantomData,
        }
    }
}

impl<T> GrantStoreBuilder<T>
where
    T: Serialize + DeserializeOwned + Send + Sync,
{
    /// Create new grant store builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set grant type tag.
    pub fn grant_type(mut self, grant_type: impl Into<String>) -> Self {
        self.grant_type = Some(grant_type.into());
        self
    }

    /// Set persisted grant store.
    pub fn persisted_store(mut self, store: Arc<dyn PersistedGrantStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Set serializer (default: JSON).
    pub fn serializer(mut self, serializer: Arc<dyn GrantSerializer>) -> Self {
        self.serializer = Some(serializer);
        self
    }

    /// Set handle generator (default: 256-bit OS random).
    pub fn handle_generator(mut self, handles: Arc<dyn HandleGenerator>) -> Self {
        self.handles = Some(handles);
        self
    }

    /// Set metrics sink (default: no-op).
    pub fn metrics(mut self, metrics: Arc<dyn GrantStoreMetrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Set options.
    pub fn options(mut self, options: GrantStoreOptions) -> Self {
        self.options = options;
        self
    }

    /// Build the grant store.
    pub fn build(self) -> Result<DefaultGrantStore<T>, GrantStoreError> {
        let grant_type = self.grant_type.ok_or_else(|| ConfigurationError::MissingField {
            field: "grant_type".to_string(),
        })?;

        if grant_type.trim().is_empty() {
            return Err(ConfigurationError::InvalidValue {
                field: "grant_type".to_string(),
                message: "must not be empty".to_string(),
            }
            .into());
        }

        let store = self.store.ok_or_else(|| ConfigurationError::MissingField {
            field: "persisted_store".to_string(),
        })?;

        let serializer = self
            .serializer
            .unwrap_or_else(|| Arc::new(JsonGrantSerializer::new()));
        let handles = self
            .handles
            .unwrap_or_else(|| Arc::new(DefaultHandleGenerator::new()));
        let metrics = self.metrics.unwrap_or_else(|| Arc::new(NoOpMetrics));

        Ok(DefaultGrantStore::new(grant_type, store, serializer, handles)
            .with_options(self.options)
            .with_metrics(metrics))
    }
}

/// Create a new grant store builder.
pub fn grant_store<T>() -> GrantStoreBuilder<T>
where
    T: Serialize + DeserializeOwned + Send + Sync,
{
    GrantStoreBuilder::new()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builders::grant_store_options;
    use crate::core::InMemoryPersistedGrantStore;
    use crate::types::{persisted_grant_types, KeyStrategy, Token};

    #[test]
    fn test_builder_success() {
        let store = grant_store::<Token>()
            .grant_type(persisted_grant_types::REFERENCE_TOKEN)
            .persisted_store(Arc::new(InMemoryPersistedGrantStore::new()))
            .options(grant_store_options().plain_keys().build())
            .build()
            .unwrap();

        assert_eq!(store.grant_type(), "reference_token");
        assert_eq!(store.options().key_strategy, KeyStrategy::Plain);
    }

    #[test]
    fn test_builder_missing_grant_type() {
        let result = grant_store::<Token>()
            .persisted_store(Arc::new(InMemoryPersistedGrantStore::new()))
            .build();

        assert!(matches!(
            result,
            Err(GrantStoreError::Configuration(ConfigurationError::MissingField { .. }))
        ));
    }

    #[test]
    fn test_builder_empty_grant_type() {
        let result = grant_store::<Token>()
            .grant_type("  ")
            .persisted_store(Arc::new(InMemoryPersistedGrantStore::new()))
            .build();

        assert!(matches!(
            result,
            Err(GrantStoreError::Configuration(ConfigurationError::InvalidValue { .. }))
        ));
    }

    #[test]
    fn test_builder_missing_persisted_store() {
        let result = grant_store::<Token>().grant_type("custom").build();
        assert!(result.is_err());
    }
}
