//! Options Builder
//!
//! Fluent builder for grant store options.

use crate::types::{DeserializationFailurePolicy, GrantStoreOptions, KeyStrategy, MigrationPolicy};

/// Grant store options builder.
#[derive(Default)]
pub struct GrantStoreOptionsBuilder {
    key_strategy: Option<KeyStrategy>,
    deserialization_failure: Option<DeserializationFailurePolicy>,
    migration: Option<MigrationPolicy>,
}

impl GrantStoreOptionsBuilder {
    /// Create new options builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set key strategy.
    pub fn key_strategy(mut self, strategy: KeyStrategy) -> Self {
        self.key_strategy = Some(strategy);
        self
    }

    /// Persist grants under their raw handle.
    pub fn plain_keys(self) -> Self {
        self.key_strategy(KeyStrategy::Plain)
    }

    /// Set deserialization failure policy.
    pub fn deserialization_failure(mut self, policy: DeserializationFailurePolicy) -> Self {
        self.deserialization_failure = Some(policy);
        self
    }

    /// Surface deserialization failures instead of reporting "not found".
    pub fn strict_deserialization(self) -> Self {
        self.deserialization_failure(DeserializationFailurePolicy::Error)
    }

    /// Set migration policy.
    pub fn migration(mut self, policy: MigrationPolicy) -> Self {
        self.migration = Some(policy);
        self
    }

    /// Write migrated legacy records back on read.
    pub fn persist_migrations(self) -> Self {
        self.migration(MigrationPolicy::MigrateAndPersist)
    }

    /// Build the options.
    pub fn build(self) -> GrantStoreOptions {
        GrantStoreOptions {
            key_strategy: self.key_strategy.unwrap_or_default(),
            deserialization_failure: self.deserialization_failure.unwrap_or_default(),
            migration: self.migration.unwrap_or_default(),
        }
    }
}

/// Create a new grant store options builder.
pub fn grant_store_options() -> GrantStoreOptionsBuilder {
    GrantStoreOptionsBuilder::new()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = grant_store_options().build();
        assert_eq!(options, GrantStoreOptions::default());
        assert_eq!(options.key_strategy, KeyStrategy::Hashed);
        assert_eq!(
            options.deserialization_failure,
            DeserializationFailurePolicy::NotFound
        );
        assert_eq!(options.migration, MigrationPolicy::OnReadOnly);
    }

    #[test]
    fn test_overrides() {
        let options = grant_store_options()
            .plain_keys()
            .strict_deserialization()
            .persist_migrations()
            .build();

        assert_eq!(options.key_strategy, KeyStrategy::Plain);
        assert_eq!(
            options.deserialization_failure,
            DeserializationFailurePolicy::Error
        );
        assert_eq!(options.migration, MigrationPolicy::MigrateAndPersist);
    }
}
