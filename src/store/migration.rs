//! Refresh Token Migration
//!
//! Upgrades pre-v5 refresh tokens, which embed a full access token, to the
//! current layout where the refresh token carries its own subject, client and scopes.

use crate::types::{Principal, RefreshToken, REFRESH_TOKEN_VERSION};

/// Check if a refresh token needs migrating.
pub fn needs_migration(token: &RefreshToken) -> bool {
    token.version < REFRESH_TOKEN_VERSION
}

/// Upgrade a refresh token to the current schema version.
///
/// Current-version tokens are returned unchanged. A legacy token without an
/// embedded access token has nothing to copy and only gets its version bumped.
pub fn migrate_refresh_token(mut token: RefreshToken) -> RefreshToken {
    if !needs_migration(&token) {
        return token;
    }

    if let Some(snapshot) = token.access_token.take() {
        token.subject = snapshot.subject_id.as_ref().map(|subject_id| Principal {
            subject_id: subject_id.clone(),
            claims: snapshot.claims.clone(),
        });
        token.client_id = snapshot.client_id.clone();
        token.description = snapshot.description.clone();
        token.authorized_scopes = snapshot.scopes.clone();
        if token.session_id.is_none() {
            token.session_id = snapshot.resolved_session_id().map(String::from);
        }
        token.set_access_token(snapshot, None);
    }

    token.version = REFRESH_TOKEN_VERSION;
    token
}
