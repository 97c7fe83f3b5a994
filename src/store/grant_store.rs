//! Grant Store Core
//!
//! Typed create/read/update/delete over a persisted grant store for a single grant type.

use base64::Engine;
use chrono::{DateTime, Duration, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::marker::PhantomData;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::core::{from_payload, to_payload, GrantSerializer, HandleGenerator, PersistedGrantStore};
use crate::error::{GrantError, GrantStoreError};
use crate::telemetry::{GrantStoreMetrics, NoOpMetrics};
use crate::types::{
    DeserializationFailurePolicy, GrantMetadata, GrantStoreOptions, KeyStrategy, PersistedGrant,
    PersistedGrantFilter,
};

const REDACTED_KEY: &str = "[REDACTED]";

/// Compute the expiration of a grant created at `created` with `lifetime` seconds.
///
/// A lifetime of zero or less means the grant does not expire.
pub fn compute_expiration(
    created: DateTime<Utc>,
    lifetime: i32,
) -> Result<Option<DateTime<Utc>>, GrantStoreError> {
    if lifetime <= 0 {
        return Ok(None);
    }

    created
        .checked_add_signed(Duration::seconds(i64::from(lifetime)))
        .map(Some)
        .ok_or_else(|| GrantError::ExpirationOutOfRange { lifetime }.into())
}

/// Generic grant store bound to one grant type.
pub struct DefaultGrantStore<T> {
    grant_type: String,
    store: Arc<dyn PersistedGrantStore>,
    serializer: Arc<dyn GrantSerializer>,
    handles: Arc<dyn HandleGenerator>,
    options: GrantStoreOptions,
    metrics: Arc<dyn GrantStoreMetrics>,
    _payload: PhantomData<fn() -> T>,
}

impl<T> Clone for DefaultGrantStore<T> {
    fn clone(&self) -> Self {
        Self {
            grant_type: self.grant_type.clone(),
            store: Arc::clone(&self.store),
            serializer: Arc::clone(&self.serializer),
            handles: Arc::clone(&self.handles),
            options: self.options,
            metrics: Arc::clone(&self.metrics),
            _payload: PhantomData,
        }
    }
}

impl<T> DefaultGrantStore<T>
where
    T: Serialize + DeserializeOwned + Send + Sync,
{
    /// Create new grant store for `grant_type`.
    pub fn new(
        grant_type: impl Into<String>,
        store: Arc<dyn PersistedGrantStore>,
        serializer: Arc<dyn GrantSerializer>,
        handles: Arc<dyn HandleGenerator>,
    ) -> Self {
        Self {
            grant_type: grant_type.into(),
            store,
            serializer,
            handles,
            options: GrantStoreOptions::default(),
            metrics: Arc::new(NoOpMetrics),
            _payload: PhantomData,
        }
    }

    /// Set options.
    pub fn with_options(mut self, options: GrantStoreOptions) -> Self {
        self.options = options;
        self
    }

    /// Set metrics sink.
    pub fn with_metrics(mut self, metrics: Arc<dyn GrantStoreMetrics>) -> Self {
        self.metrics = metrics;
        self
    }

    /// Grant type this store reads and writes.
    pub fn grant_type(&self) -> &str {
        &self.grant_type
    }

    /// Options in effect.
    pub fn options(&self) -> &GrantStoreOptions {
        &self.options
    }

    /// Metrics sink in effect.
    pub fn metrics(&self) -> &dyn GrantStoreMetrics {
        self.metrics.as_ref()
    }

    /// Key a handle is persisted under.
    pub fn storage_key(&self, handle: &str) -> String {
        match self.options.key_strategy {
            KeyStrategy::Plain => handle.to_string(),
            KeyStrategy::Hashed => {
                let digest = Sha256::digest(format!("{}:{}", handle, self.grant_type).as_bytes());
                base64::engine::general_purpose::STANDARD.encode(digest)
            }
        }
    }

    fn key_for_log<'a>(&self, key: &'a str) -> &'a str {
        match self.options.key_strategy {
            KeyStrategy::Hashed => key,
            KeyStrategy::Plain => REDACTED_KEY,
        }
    }

    fn build_grant(
        &self,
        key: String,
        item: &T,
        metadata: GrantMetadata,
        created: DateTime<Utc>,
        expiration: Option<DateTime<Utc>>,
        consumed: Option<DateTime<Utc>>,
    ) -> Result<PersistedGrant, GrantStoreError> {
        let data = to_payload(self.serializer.as_ref(), &self.grant_type, item)?;

        Ok(PersistedGrant {
            key,
            grant_type: self.grant_type.clone(),
            subject_id: metadata.subject_id,
            client_id: metadata.client_id,
            session_id: metadata.session_id,
            description: metadata.description,
            creation_time: created,
            expiration,
            consumed_time: consumed,
            data,
        })
    }

    /// Decode a persisted grant, collapsing foreign or unreadable records to `None`
    /// unless `policy` asks for deserialization errors.
    fn decode(
        &self,
        grant: &PersistedGrant,
        policy: DeserializationFailurePolicy,
    ) -> Result<Option<T>, GrantStoreError> {
        if grant.grant_type != self.grant_type {
            self.metrics
                .record_type_mismatch(&self.grant_type, &grant.grant_type);
            warn!(
                expected = %self.grant_type,
                actual = %grant.grant_type,
                key = %self.key_for_log(&grant.key),
                "Grant type mismatch, treating as not found"
            );
            return Ok(None);
        }

        match from_payload::<T>(self.serializer.as_ref(), &self.grant_type, &grant.data) {
            Ok(item) => Ok(Some(item)),
            Err(error) => {
                self.metrics.record_deserialization_failure(&self.grant_type);
                warn!(
                    grant_type = %self.grant_type,
                    key = %self.key_for_log(&grant.key),
                    error = %error,
                    "Failed to deserialize grant payload"
                );
                match policy {
                    DeserializationFailurePolicy::NotFound => Ok(None),
                    DeserializationFailurePolicy::Error => Err(error),
                }
            }
        }
    }

    /// Persist a new grant under a freshly minted handle and return the handle.
    pub async fn create_item(
        &self,
        item: &T,
        metadata: GrantMetadata,
        created: DateTime<Utc>,
        lifetime: i32,
    ) -> Result<String, GrantStoreError> {
        let handle = self.handles.generate()?;
        let expiration = compute_expiration(created, lifetime)?;
        let key = self.storage_key(&handle);
        let grant = self.build_grant(key, item, metadata, created, expiration, None)?;

        debug!(
            grant_type = %self.grant_type,
            client_id = %grant.client_id,
            key = %self.key_for_log(&grant.key),
            "Creating grant"
        );
        self.store.store(grant).await?;
        self.metrics.record_grant_created(&self.grant_type);

        Ok(handle)
    }

    /// Insert or replace a grant under a caller-supplied handle.
    pub async fn store_item(
        &self,
        handle: &str,
        item: &T,
        metadata: GrantMetadata,
        created: DateTime<Utc>,
        expiration: Option<DateTime<Utc>>,
        consumed: Option<DateTime<Utc>>,
    ) -> Result<(), GrantStoreError> {
        if expiration.map(|exp| exp < created).unwrap_or(false) {
            return Err(GrantError::InvalidExpiration.into());
        }

        let key = self.storage_key(handle);

        // Plain keys are shared across grant types; never clobber a foreign record.
        if self.options.key_strategy == KeyStrategy::Plain {
            if let Some(existing) = self.store.get(&key).await? {
                if existing.grant_type != self.grant_type {
                    self.metrics
                        .record_type_mismatch(&self.grant_type, &existing.grant_type);
                    return Err(GrantError::TypeMismatch {
                        expected: self.grant_type.clone(),
                        actual: existing.grant_type,
                    }
                    .into());
                }
            }
        }

        let grant = self.build_grant(key, item, metadata, created, expiration, consumed)?;

        debug!(
            grant_type = %self.grant_type,
            client_id = %grant.client_id,
            key = %self.key_for_log(&grant.key),
            consumed = grant.consumed_time.is_some(),
            "Storing grant"
        );
        self.store.store(grant).await?;
        self.metrics.record_grant_stored(&self.grant_type);

        Ok(())
    }

    /// Get a grant by handle.
    ///
    /// Missing records, records of another grant type and unreadable payloads all
    /// come back as `None` (the latter unless configured otherwise).
    pub async fn get_item(&self, handle: &str) -> Result<Option<T>, GrantStoreError> {
        let key = self.storage_key(handle);

        let item = match self.store.get(&key).await? {
            Some(grant) => self.decode(&grant, self.options.deserialization_failure)?,
            None => None,
        };

        self.metrics.record_lookup(&self.grant_type, item.is_some());
        if item.is_none() {
            debug!(
                grant_type = %self.grant_type,
                key = %self.key_for_log(&key),
                "Grant not found"
            );
        }

        Ok(item)
    }

    /// Get every readable grant of this type for a subject and client.
    ///
    /// Unreadable records are skipped so a single bad record cannot break enumeration.
    pub async fn get_all_items(
        &self,
        subject_id: &str,
        client_id: &str,
        session_id: Option<&str>,
    ) -> Result<Vec<T>, GrantStoreError> {
        let filter = self.filter(subject_id, client_id, session_id);
        let grants = self.store.get_all(&filter).await?;

        let mut items = Vec::with_capacity(grants.len());
        for grant in &grants {
            if let Some(item) = self.decode(grant, DeserializationFailurePolicy::NotFound)? {
                items.push(item);
            }
        }

        Ok(items)
    }

    /// Remove a grant by handle. Removing a missing grant is not an error.
    pub async fn remove_item(&self, handle: &str) -> Result<(), GrantStoreError> {
        let key = self.storage_key(handle);

        if self.options.key_strategy == KeyStrategy::Plain {
            match self.store.get(&key).await? {
                None => return Ok(()),
                Some(existing) if existing.grant_type != self.grant_type => {
                    self.metrics
                        .record_type_mismatch(&self.grant_type, &existing.grant_type);
                    warn!(
                        expected = %self.grant_type,
                        actual = %existing.grant_type,
                        "Refusing to remove grant of another type"
                    );
                    return Ok(());
                }
                Some(_) => {}
            }
        }

        debug!(
            grant_type = %self.grant_type,
            key = %self.key_for_log(&key),
            "Removing grant"
        );
        self.store.remove(&key).await
    }

    /// Remove every grant of this type for a subject and client (and session, if given).
    pub async fn remove_all(
        &self,
        subject_id: &str,
        client_id: &str,
        session_id: Option<&str>,
    ) -> Result<u64, GrantStoreError> {
        let filter = self.filter(subject_id, client_id, session_id);
        let removed = self.store.remove_all(&filter).await?;

        self.metrics.record_grants_removed(&self.grant_type, removed);
        debug!(
            grant_type = %self.grant_type,
            client_id = %client_id,
            removed,
            "Removed grants"
        );

        Ok(removed)
    }

    fn filter(
        &self,
        subject_id: &str,
        client_id: &str,
        session_id: Option<&str>,
    ) -> PersistedGrantFilter {
        let filter = PersistedGrantFilter::new()
            .subject_id(subject_id)
            .client_id(client_id)
            .grant_type(self.grant_type.as_str());

        match session_id {
            Some(session_id) => filter.session_id(session_id),
            None => filter,
        }
    }
}
