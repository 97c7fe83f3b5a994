//! Authorization Code Types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::token::Principal;

/// Authorization code payload.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorizationCode {
    pub client_id: String,
    pub subject: Principal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub creation_time: DateTime<Utc>,
    /// Lifetime in seconds.
    pub lifetime: i32,
    pub redirect_uri: String,
    #[serde(default)]
    pub requested_scopes: BTreeSet<String>,
    /// PKCE code challenge.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code_challenge: Option<String>,
    /// PKCE code challenge method (`plain` or `S256`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code_challenge_method: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nonce: Option<String>,
}

impl AuthorizationCode {
    /// Session identifier from the field or the subject's `sid` claim.
    pub fn resolved_session_id(&self) -> Option<&str> {
        self.session_id
            .as_deref()
            .or_else(|| self.subject.session_id())
    }

    /// Check if the code was issued with PKCE.
    pub fn has_pkce(&self) -> bool {
        self.code_challenge.is_some()
    }
}
