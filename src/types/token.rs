//! Token Types
//!
//! Principal, claims and access token payloads.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Well-known claim types.
pub mod claim_types {
    pub const SUBJECT: &str = "sub";
    pub const SESSION_ID: &str = "sid";
    pub const SCOPE: &str = "scope";
}

/// A single claim.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claim {
    #[serde(rename = "type")]
    pub claim_type: String,
    pub value: String,
}

impl Claim {
    /// Create new claim.
    pub fn new(claim_type: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            claim_type: claim_type.into(),
            value: value.into(),
        }
    }
}

/// Authenticated subject with its additional claims.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    /// Subject identifier.
    pub subject_id: String,
    /// Claims beyond the subject identifier.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub claims: Vec<Claim>,
}

impl Principal {
    /// Create principal for a subject.
    pub fn new(subject_id: impl Into<String>) -> Self {
        Self {
            subject_id: subject_id.into(),
            claims: Vec::new(),
        }
    }

    /// Add a claim.
    pub fn with_claim(mut self, claim: Claim) -> Self {
        self.claims.push(claim);
        self
    }

    /// Find the first claim value of a type.
    pub fn find_claim(&self, claim_type: &str) -> Option<&str> {
        self.claims
            .iter()
            .find(|c| c.claim_type == claim_type)
            .map(|c| c.value.as_str())
    }

    /// Session identifier, taken from the `sid` claim.
    pub fn session_id(&self) -> Option<&str> {
        self.find_claim(claim_types::SESSION_ID)
    }
}

/// Current schema version of [`Token`].
pub const TOKEN_VERSION: u32 = 4;

/// Access token payload, persisted as a reference token or embedded in legacy refresh tokens.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    /// Client the token was issued to.
    pub client_id: String,
    /// Subject identifier (absent for client credential tokens).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject_id: Option<String>,
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
    /// Granted scopes.
    #[serde(default)]
    pub scopes: BTreeSet<String>,
    /// Additional claims.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub claims: Vec<Claim>,
    /// Issuer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issuer: Option<String>,
    /// Audiences.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub audiences: Vec<String>,
    /// Schema version.
    #[serde(default = "default_token_version")]
    pub version: u32,
}

fn default_token_version() -> u32 {
    TOKEN_VERSION
}

impl Token {
    /// Create new token for a client.
    pub fn new(client_id: impl Into<String>, creation_time: DateTime<Utc>, lifetime: i32) -> Self {
        Self {
            client_id: client_id.into(),
            subject_id: None,
            session_id: None,
            description: None,
            creation_time,
            lifetime,
            scopes: BTreeSet::new(),
            claims: Vec::new(),
            issuer: None,
            audiences: Vec::new(),
            version: TOKEN_VERSION,
        }
    }

    /// Session identifier from the field or, failing that, the `sid` claim.
    pub fn resolved_session_id(&self) -> Option<&str> {
        self.session_id.as_deref().or_else(|| {
            self.claims
                .iter()
                .find(|c| c.claim_type == claim_types::SESSION_ID)
                .map(|c| c.value.as_str())
        })
    }

    /// Expiration time, `None` when the lifetime is not positive or the result is out of range.
    pub fn expiration(&self) -> Option<DateTime<Utc>> {
        if self.lifetime <= 0 {
            return None;
        }
        self.creation_time
            .checked_add_signed(Duration::seconds(i64::from(self.lifetime)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_principal_session_id() {
        let principal = Principal::new("alice")
            .with_claim(Claim::new("name", "Alice"))
            .with_claim(Claim::new(claim_types::SESSION_ID, "s-1"));

        assert_eq!(principal.session_id(), Some("s-1"));
        assert_eq!(principal.find_claim("name"), Some("Alice"));
        assert_eq!(principal.find_claim("email"), None);
    }

    #[test]
    fn test_token_session_from_claims() {
        let now = Utc::now();
        let mut token = Token::new("app1", now, 3600);
        assert_eq!(token.resolved_session_id(), None);

        token.claims.push(Claim::new(claim_types::SESSION_ID, "s-2"));
        assert_eq!(token.resolved_session_id(), Some("s-2"));

        token.session_id = Some("s-3".to_string());
        assert_eq!(token.resolved_session_id(), Some("s-3"));
    }

    #[test]
    fn test_token_expiration() {
        let now = Utc::now();
        assert_eq!(
            Token::new("app1", now, 60).expiration(),
            Some(now + Duration::seconds(60))
        );
        assert_eq!(Token::new("app1", now, 0).expiration(), None);
    }

    #[test]
    fn test_token_expiration_out_of_range() {
        let token = Token::new("app1", DateTime::<Utc>::MAX_UTC, 10);
        assert_eq!(token.expiration(), None);
    }
}
