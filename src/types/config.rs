//! Configuration Types
//!
//! Grant store behavior options.

/// How a handle is turned into the key a grant is persisted under.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum KeyStrategy {
    /// Base64 SHA-256 digest of `"{handle}:{grant_type}"`. Keys are type-scoped
    /// and a dump of the backing store exposes no usable handles.
    #[default]
    Hashed,
    /// The raw handle.
    Plain,
}

/// What a read does when a payload cannot be deserialized.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DeserializationFailurePolicy {
    /// Log, count, and report the grant as not found.
    #[default]
    NotFound,
    /// Surface the deserialization error to the caller.
    Error,
}

/// What a refresh token read does with a legacy record.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum MigrationPolicy {
    /// Migrate the returned value only; the stored record keeps its old shape.
    #[default]
    OnReadOnly,
    /// Migrate and write the migrated record back under the same handle.
    MigrateAndPersist,
}

/// Grant store options.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GrantStoreOptions {
    pub key_strategy: KeyStrategy,
    pub deserialization_failure: DeserializationFailurePolicy,
    pub migration: MigrationPolicy,
}
