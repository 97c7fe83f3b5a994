//! Grant Serializer
//!
//! Converts grant payloads to and from the opaque bytes kept by the persisted store.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::error::{GrantStoreError, SerializationError};

/// Grant payload serializer interface.
///
/// Works on JSON values so implementations stay object safe; typed payloads
/// are converted with [`to_payload`] and [`from_payload`].
pub trait GrantSerializer: Send + Sync {
    /// Encode a payload.
    fn serialize(&self, grant_type: &str, value: &Value) -> Result<Vec<u8>, GrantStoreError>;

    /// Decode a payload.
    fn deserialize(&self, grant_type: &str, data: &[u8]) -> Result<Value, GrantStoreError>;
}

/// JSON serializer.
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonGrantSerializer;

impl JsonGrantSerializer {
    /// Create new JSON serializer.
    pub fn new() -> Self {
        Self
    }
}

impl GrantSerializer for JsonGrantSerializer {
    fn serialize(&self, grant_type: &str, value: &Value) -> Result<Vec<u8>, GrantStoreError> {
        serde_json::to_vec(value).map_err(|e| {
            SerializationError::SerializeFailed {
                grant_type: grant_type.to_string(),
                message: e.to_string(),
            }
            .into()
        })
    }

    fn deserialize(&self, grant_type: &str, data: &[u8]) -> Result<Value, GrantStoreError> {
        serde_json::from_slice(data).map_err(|e| {
            SerializationError::DeserializeFailed {
                grant_type: grant_type.to_string(),
                message: e.to_string(),
            }
            .into()
        })
    }
}

/// Serialize a typed payload through a grant serializer.
pub fn to_payload<T: Serialize>(
    serializer: &dyn GrantSerializer,
    grant_type: &str,
    item: &T,
) -> Result<Vec<u8>, GrantStoreError> {
    let value = serde_json::to_value(item).map_err(|e| SerializationError::SerializeFailed {
        grant_type: grant_type.to_string(),
        message: e.to_string(),
    })?;
    serializer.serialize(grant_type, &value)
}

/// Deserialize a typed payload through a grant serializer.
pub fn from_payload<T: DeserializeOwned>(
    serializer: &dyn GrantSerializer,
    grant_type: &str,
    data: &[u8],
) -> Result<T, GrantStoreError> {
    let value = serializer.deserialize(grant_type, data)?;
    serde_json::from_value(value).map_err(|e| {
        SerializationError::DeserializeFailed {
            grant_type: grant_type.to_string(),
            message: e.to_string(),
        }
        .into()
    })
}

/// Create JSON grant serializer.
pub fn create_json_serializer() -> JsonGrantSerializer {
    JsonGrantSerializer::new()
}
