//! Persisted Grant Types
//!
//! Backend-agnostic shape of a persisted grant record and the filter used for bulk queries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{GrantError, GrantStoreError};

/// Well-known grant type tags.
pub mod persisted_grant_types {
    /// Refresh token grant.
    pub const REFRESH_TOKEN: &str = "refresh_token";
    /// Reference (opaque) access token grant.
    pub const REFERENCE_TOKEN: &str = "reference_token";
    /// Authorization code grant.
    pub const AUTHORIZATION_CODE: &str = "authorization_code";
    /// Device code grant.
    pub const DEVICE_CODE: &str = "device_code";
    /// User consent record.
    pub const USER_CONSENT: &str = "user_consent";
}

/// A persisted grant record.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedGrant {
    /// Storage key (the handle, or a digest of it depending on the key strategy).
    pub key: String,
    /// Grant type tag.
    #[serde(rename = "type")]
    pub grant_type: String,
    /// Subject identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject_id: Option<String>,
    /// Client identifier.
    pub client_id: String,
    /// Session identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    /// Free-form description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Creation time.
    pub creation_time: DateTime<Utc>,
    /// Expiration time, `None` for non-expiring grants.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiration: Option<DateTime<Utc>>,
    /// Time the grant was consumed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub consumed_time: Option<DateTime<Utc>>,
    /// Serialized payload.
    pub data: Vec<u8>,
}

impl PersistedGrant {
    /// Check if the grant has expired at `now`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expiration.map(|exp| exp <= now).unwrap_or(false)
    }

    /// Check if the grant has been consumed.
    pub fn is_consumed(&self) -> bool {
        self.consumed_time.is_some()
    }
}

/// Filter for bulk grant queries and removals.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PersistedGrantFilter {
    pub subject_id: Option<String>,
    pub client_id: Option<String>,
    pub session_id: Option<String>,
    pub grant_type: Option<String>,
}

impl PersistedGrantFilter {
    /// Create an empty filter.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set subject ID.
    pub fn subject_id(mut self, subject_id: impl Into<String>) -> Self {
        self.subject_id = Some(subject_id.into());
        self
    }

    /// Set client ID.
    pub fn client_id(mut self, client_id: impl Into<String>) -> Self {
        self.client_id = Some(client_id.into());
        self
    }

    /// Set session ID.
    pub fn session_id(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }

    /// Set grant type.
    pub fn grant_type(mut self, grant_type: impl Into<String>) -> Self {
        self.grant_type = Some(grant_type.into());
        self
    }

    /// Reject filters that would match every grant in the store.
    pub fn validate(&self) -> Result<(), GrantStoreError> {
        let is_empty = |v: &Option<String>| v.as_deref().map(str::is_empty).unwrap_or(true);

        if is_empty(&self.subject_id)
            && is_empty(&self.client_id)
            && is_empty(&self.session_id)
            && is_empty(&self.grant_type)
        {
            return Err(GrantError::InvalidFilter.into());
        }

        Ok(())
    }

    /// Check if a grant matches every field set on this filter.
    pub fn matches(&self, grant: &PersistedGrant) -> bool {
        fn field_matches(expected: &Option<String>, actual: Option<&str>) -> bool {
            match expected.as_deref() {
                Some(expected) => actual == Some(expected),
                None => true,
            }
        }

        field_matches(&self.subject_id, grant.subject_id.as_deref())
            && field_matches(&self.client_id, Some(grant.client_id.as_str()))
            && field_matches(&self.session_id, grant.session_id.as_deref())
            && field_matches(&self.grant_type, Some(grant.grant_type.as_str()))
    }
}

/// Per-record metadata columns carried alongside a payload.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GrantMetadata {
    pub client_id: String,
    pub subject_id: Option<String>,
    pub session_id: Option<String>,
    pub description: Option<String>,
}

impl GrantMetadata {
    /// Create metadata for a client.
    pub fn new(client_id: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            ..Default::default()
        }
    }

    /// Set subject ID.
    pub fn subject_id(mut self, subject_id: Option<String>) -> Self {
        self.subject_id = subject_id;
        self
    }

    /// Set session ID.
    pub fn session_id(mut self, session_id: Option<String>) -> Self {
        self.session_id = session_id;
        self
    }

    /// Set description.
    pub fn description(mut self, description: Option<String>) -> Self {
        self.description = description;
        self
    }
}
