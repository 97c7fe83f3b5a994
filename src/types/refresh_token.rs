//! Refresh Token Types

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use super::token::{Principal, Token};

/// Current schema version of [`RefreshToken`].
///
/// Records below this version embed a full access token snapshot instead of
/// carrying their own subject, client and scopes.
pub const REFRESH_TOKEN_VERSION: u32 = 5;

/// Refresh token payload.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshToken {
    /// Subject the token was issued for.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<Principal>,
    /// Client the token was issued to.
    #[serde(default)]
    pub client_id: String,
    /// Session identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    /// Description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Creation time.
    pub creation_time: DateTime<Utc>,
    /// Lifetime in seconds.
    pub lifetime: i32,
    /// Time the token was consumed (rotated or exchanged).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub consumed_time: Option<DateTime<Utc>>,
    /// Scopes authorized for this token.
    #[serde(default)]
    pub authorized_scopes: BTreeSet<String>,
    /// Access token snapshots keyed by resource indicator (`""` for none).
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub access_tokens: BTreeMap<String, Token>,
    /// Embedded access token of legacy (pre-v5) records.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<Token>,
    /// Schema version.
    pub version: u32,
}

impl RefreshToken {
    /// Create new current-version refresh token.
    pub fn new(client_id: impl Into<String>, creation_time: DateTime<Utc>, lifetime: i32) -> Self {
        Self {
            subject: None,
            client_id: client_id.into(),
            session_id: None,
            description: None,
            creation_time,
            lifetime,
            consumed_time: None,
            authorized_scopes: BTreeSet::new(),
            access_tokens: BTreeMap::new(),
            access_token: None,
            version: REFRESH_TOKEN_VERSION,
        }
    }

    /// Set the subject.
    pub fn with_subject(mut self, subject: Principal) -> Self {
        self.subject = Some(subject);
        self
    }

    /// Add authorized scopes.
    pub fn with_scopes<I, S>(mut self, scopes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.authorized_scopes
            .extend(scopes.into_iter().map(Into::into));
        self
    }

    /// Subject identifier.
    pub fn subject_id(&self) -> Option<&str> {
        self.subject.as_ref().map(|s| s.subject_id.as_str())
    }

    /// Expiration derived from creation time and lifetime.
    ///
    /// `None` when the lifetime is not positive or the result is out of range.
    pub fn expiration(&self) -> Option<DateTime<Utc>> {
        if self.lifetime <= 0 {
            return None;
        }
        self.creation_time
            .checked_add_signed(Duration::seconds(i64::from(self.lifetime)))
    }

    /// Check if the record still uses a pre-v5 layout.
    pub fn is_legacy(&self) -> bool {
        self.version < REFRESH_TOKEN_VERSION
    }

    /// Access token snapshot for a resource indicator.
    pub fn access_token_for(&self, resource_indicator: Option<&str>) -> Option<&Token> {
        self.access_tokens.get(resource_indicator.unwrap_or_default())
    }

    /// Store an access token snapshot for a resource indicator.
    pub fn set_access_token(&mut self, token: Token, resource_indicator: Option<&str>) {
        self.access_tokens
            .insert(resource_indicator.unwrap_or_default().to_string(), token);
    }
}
