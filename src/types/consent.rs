//! Consent Types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Scopes a user has consented to for a client.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Consent {
    pub subject_id: String,
    pub client_id: String,
    #[serde(default)]
    pub scopes: BTreeSet<String>,
    pub creation_time: DateTime<Utc>,
    /// `None` for consent that is remembered indefinitely.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiration: Option<DateTime<Utc>>,
}

impl Consent {
    /// Handle a consent is stored under.
    ///
    /// The client ID is length-prefixed so no two (subject, client) pairs share a handle.
    pub fn handle(subject_id: &str, client_id: &str) -> String {
        format!("{}:{}|{}", client_id.len(), client_id, subject_id)
    }

    /// Check if the consent belongs to a subject and client.
    pub fn is_for(&self, subject_id: &str, client_id: &str) -> bool {
        self.subject_id == subject_id && self.client_id == client_id
    }

    /// Check if the consent has expired at `now`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expiration.map(|exp| exp <= now).unwrap_or(false)
    }
}
