//! Grant Store Error Types
//!
//! Error hierarchy for grant persistence, serialization and handle generation.

use thiserror::Error;

/// Root error type for grant store operations.
#[derive(Error, Debug)]
pub enum GrantStoreError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] SerializationError),

    #[error("Handle generation error: {0}")]
    HandleGeneration(#[from] HandleGenerationError),

    #[error("Grant error: {0}")]
    Grant(#[from] GrantError),

    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),
}

impl GrantStoreError {
    /// Get error code for telemetry.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Storage(_) => "GRANT_STORAGE",
            Self::Serialization(_) => "GRANT_SERIALIZATION",
            Self::HandleGeneration(_) => "GRANT_HANDLE",
            Self::Grant(_) => "GRANT_INVALID",
            Self::Configuration(_) => "GRANT_CONFIG",
        }
    }

    /// Check if the caller may reasonably retry the operation.
    ///
    /// The grant store itself never retries.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Storage(StorageError::Unavailable { .. }))
    }

    /// Check if error is a lookup-path error that collapses to "not found".
    pub fn is_not_found_equivalent(&self) -> bool {
        matches!(
            self,
            Self::Serialization(SerializationError::DeserializeFailed { .. })
                | Self::Grant(GrantError::TypeMismatch { .. })
        )
    }
}

/// Persisted grant store failure.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Read failed: {message}")]
    ReadFailed { message: String },

    #[error("Write failed: {message}")]
    WriteFailed { message: String },

    #[error("Delete failed: {message}")]
    DeleteFailed { message: String },

    #[error("Store unavailable: {message}")]
    Unavailable { message: String },
}

/// Payload serialization error.
#[derive(Error, Debug)]
pub enum SerializationError {
    #[error("Failed to serialize {grant_type} payload: {message}")]
    SerializeFailed { grant_type: String, message: String },

    #[error("Failed to deserialize {grant_type} payload: {message}")]
    DeserializeFailed { grant_type: String, message: String },
}

/// Handle generation error.
#[derive(Error, Debug)]
pub enum HandleGenerationError {
    #[error("Randomness source unavailable: {message}")]
    EntropyUnavailable { message: String },
}

/// Grant record error.
#[derive(Error, Debug)]
pub enum GrantError {
    #[error("Grant type mismatch: expected {expected}, found {actual}")]
    TypeMismatch { expected: String, actual: String },

    #[error("Expiration precedes creation time")]
    InvalidExpiration,

    #[error("Expiration out of range: {lifetime}s after creation time")]
    ExpirationOutOfRange { lifetime: i32 },

    #[error("Grant filter must specify at least one field")]
    InvalidFilter,
}

/// Configuration error.
#[derive(Error, Debug)]
pub enum ConfigurationError {
    #[error("Missing required field: {field}")]
    MissingField { field: String },

    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },
}

/// Result type for grant store operations.
pub type GrantStoreResult<T> = Result<T, GrantStoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        let error = GrantStoreError::Storage(StorageError::WriteFailed {
            message: "disk full".to_string(),
        });
        assert_eq!(error.error_code(), "GRANT_STORAGE");

        let error = GrantStoreError::HandleGeneration(HandleGenerationError::EntropyUnavailable {
            message: "no rng".to_string(),
        });
        assert_eq!(error.error_code(), "GRANT_HANDLE");
    }

    #[test]
    fn test_is_retryable() {
        assert!(GrantStoreError::Storage(StorageError::Unavailable {
            message: "connection reset".to_string()
        })
        .is_retryable());
        assert!(!GrantStoreError::Grant(GrantError::InvalidFilter).is_retryable());
    }

    #[test]
    fn test_not_found_equivalent() {
        let error = GrantStoreError::Grant(GrantError::TypeMismatch {
            expected: "refresh_token".to_string(),
            actual: "user_consent".to_string(),
        });
        assert!(error.is_not_found_equivalent());
        assert!(!GrantStoreError::Grant(GrantError::InvalidExpiration).is_not_found_equivalent());
    }

    #[test]
    fn test_out_of_range_expiration_message() {
        let error = GrantStoreError::from(GrantError::ExpirationOutOfRange { lifetime: 10 });
        assert_eq!(error.error_code(), "GRANT_INVALID");
        assert_eq!(
            error.to_string(),
            "Grant error: Expiration out of range: 10s after creation time"
        );
    }

    #[test]
    fn test_display() {
        let error = GrantStoreError::from(GrantError::TypeMismatch {
            expected: "refresh_token".to_string(),
            actual: "reference_token".to_string(),
        });
        assert_eq!(
            error.to_string(),
            "Grant error: Grant type mismatch: expected refresh_token, found reference_token"
        );
    }
}
