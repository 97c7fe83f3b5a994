//! OAuth2 Grant Store
//!
//! Typed persistence of OAuth2/OIDC server grants (refresh tokens, reference tokens,
//! authorization codes, user consent) over a pluggable persisted grant store.
//!
//! # Features
//!
//! - Unguessable 256-bit handles minted from the OS random source
//! - Type-scoped, hashed storage keys (plain keys optional)
//! - Pluggable payload serialization (JSON by default)
//! - Bulk revocation by subject, client and session
//! - Transparent upgrade of legacy refresh token records on read
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use chrono::Utc;
//! use oauth2_grant_store::{
//!     DefaultRefreshTokenStore, InMemoryPersistedGrantStore, JsonGrantSerializer,
//!     DefaultHandleGenerator, RefreshToken, RefreshTokenStore,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = DefaultRefreshTokenStore::new(
//!         Arc::new(InMemoryPersistedGrantStore::new()),
//!         Arc::new(JsonGrantSerializer::new()),
//!         Arc::new(DefaultHandleGenerator::new()),
//!     );
//!
//!     let token = RefreshToken::new("app1", Utc::now(), 3600);
//!     let handle = store.store_refresh_token(&token).await?;
//!
//!     let fetched = store.get_refresh_token(&handle).await?;
//!     assert!(fetched.is_some());
//!
//!     Ok(())
//! }
//! ```
//!
//! # Architecture
//!
//! - `types`: persisted record shape, payload types and options
//! - `error`: error hierarchy
//! - `core`: collaborators (handle generation, serialization, persisted store)
//! - `store`: generic grant store core and per-grant-type stores
//! - `builders`: fluent builders for options and grant stores
//! - `telemetry`: metrics

pub mod builders;
pub mod core;
pub mod error;
pub mod store;
pub mod telemetry;
pub mod types;

// Re-export builders
pub use builders::{grant_store, grant_store_options, GrantStoreBuilder, GrantStoreOptionsBuilder};

// Re-export errors
pub use error::{
    ConfigurationError, GrantError, GrantStoreError, GrantStoreResult, HandleGenerationError,
    SerializationError, StorageError,
};

// Re-export types
pub use types::{
    // Records
    persisted_grant_types, GrantMetadata, PersistedGrant, PersistedGrantFilter,
    // Payloads
    claim_types, AuthorizationCode, Claim, Consent, Principal, RefreshToken, Token,
    REFRESH_TOKEN_VERSION, TOKEN_VERSION,
    // Options
    DeserializationFailurePolicy, GrantStoreOptions, KeyStrategy, MigrationPolicy,
};

// Re-export core components
pub use core::{
    // Handles
    create_handle_generator, create_mock_handle_generator, DefaultHandleGenerator, HandleFormat,
    HandleGenerator, MockHandleGenerator,
    // Serialization
    create_json_serializer, from_payload, to_payload, GrantSerializer, JsonGrantSerializer,
    // Persistence
    create_in_memory_grant_store, create_mock_grant_store, InMemoryPersistedGrantStore,
    MockPersistedGrantStore, PersistedGrantStore,
};

// Re-export stores
pub use store::{
    compute_expiration, migrate_refresh_token, needs_migration, AuthorizationCodeStore,
    DefaultAuthorizationCodeStore, DefaultGrantStore, DefaultReferenceTokenStore,
    DefaultRefreshTokenStore, DefaultUserConsentStore, ReferenceTokenStore, RefreshTokenStore,
    UserConsentStore,
};

// Re-export telemetry
pub use telemetry::{
    create_in_memory_metrics, no_op_metrics, GrantStoreMetrics, InMemoryMetrics, MetricEntry,
    MetricLabels, NoOpMetrics,
};
