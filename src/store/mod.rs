//! Grant Stores
//!
//! The generic grant store core and its per-grant-type specializations.
//!
//! This module provides:
//!
//! - **Grant Store Core**: typed CRUD over a persisted grant store for one grant type
//! - **Refresh Tokens**: refresh token store with legacy record migration
//! - **Reference Tokens**: opaque access token store
//! - **Authorization Codes**: short-lived authorization code store
//! - **User Consent**: consent keyed by subject and client

pub mod authorization_code;
pub mod grant_store;
pub mod migration;
pub mod reference_token;
pub mod refresh_token;
pub mod user_consent;

pub use authorization_code::{AuthorizationCodeStore, DefaultAuthorizationCodeStore};
pub use grant_store::{compute_expiration, DefaultGrantStore};
pub use migration::{migrate_refresh_token, needs_migration};
pub use reference_token::{DefaultReferenceTokenStore, ReferenceTokenStore};
pub use refresh_token::{DefaultRefreshTokenStore, RefreshTokenStore};
pub use user_consent::{DefaultUserConsentStore, UserConsentStore};
