//! Handle Generator
//!
//! Opaque, unguessable handles used as the external identifier of a grant.

use base64::Engine;
use rand::rngs::OsRng;
use rand::RngCore;
use std::collections::VecDeque;
use std::sync::Mutex;

use crate::error::{GrantStoreError, HandleGenerationError};

/// Handle encoding.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum HandleFormat {
    /// Uppercase hexadecimal.
    #[default]
    Hex,
    /// Base64url without padding.
    Base64Url,
}

/// Handle generator interface (for dependency injection).
pub trait HandleGenerator: Send + Sync {
    /// Generate a new handle.
    fn generate(&self) -> Result<String, GrantStoreError>;
}

/// Default handle generator backed by the operating system RNG.
pub struct DefaultHandleGenerator {
    byte_length: usize,
    format: HandleFormat,
}

impl DefaultHandleGenerator {
    /// Create generator producing 32-byte (256-bit) hex handles.
    pub fn new() -> Self {
        Self::with_length(32)
    }

    /// Create generator with a custom number of random bytes.
    ///
    /// # Panics
    /// Panics if length is not between 16 and 128.
    pub fn with_length(byte_length: usize) -> Self {
        assert!(
            (16..=128).contains(&byte_length),
            "Handle length must be between 16 and 128 bytes"
        );
        Self {
            byte_length,
            format: HandleFormat::default(),
        }
    }

    /// Set output encoding.
    pub fn with_format(mut self, format: HandleFormat) -> Self {
        self.format = format;
        self
    }

    fn encode(&self, bytes: &[u8]) -> String {
        match self.format {
            HandleFormat::Hex => hex::encode_upper(bytes),
            HandleFormat::Base64Url => {
                base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes)
            }
        }
    }
}

impl Default for DefaultHandleGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl HandleGenerator for DefaultHandleGenerator {
    fn generate(&self) -> Result<String, GrantStoreError> {
        let mut bytes = vec![0u8; self.byte_length];
        OsRng.try_fill_bytes(&mut bytes).map_err(|e| {
            HandleGenerationError::EntropyUnavailable {
                message: e.to_string(),
            }
        })?;

        Ok(self.encode(&bytes))
    }
}

/// Mock handle generator for testing.
#[derive(Default)]
pub struct MockHandleGenerator {
    queued: Mutex<VecDeque<String>>,
    generate_history: Mutex<Vec<String>>,
    should_fail: Mutex<bool>,
    counter: Mutex<u64>,
}

impl MockHandleGenerator {
    /// Create new mock handle generator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a handle to be returned by the next call.
    pub fn push_handle(&self, handle: impl Into<String>) -> &Self {
        self.queued.lock().unwrap().push_back(handle.into());
        self
    }

    /// Make every generation fail with `EntropyUnavailable`.
    pub fn set_should_fail(&self, should_fail: bool) -> &Self {
        *self.should_fail.lock().unwrap() = should_fail;
        self
    }

    /// Get generate history.
    pub fn get_generate_history(&self) -> Vec<String> {
        self.generate_history.lock().unwrap().clone()
    }
}

impl HandleGenerator for MockHandleGenerator {
    fn generate(&self) -> Result<String, GrantStoreError> {
        if *self.should_fail.lock().unwrap() {
            return Err(HandleGenerationError::EntropyUnavailable {
                message: "Mock entropy failure".to_string(),
            }
            .into());
        }

        let handle = match self.queued.lock().unwrap().pop_front() {
            Some(handle) => handle,
            None => {
                let mut counter = self.counter.lock().unwrap();
                *counter += 1;
                format!("mock-handle-{}", *counter)
            }
        };

        self.generate_history.lock().unwrap().push(handle.clone());
        Ok(handle)
    }
}

/// Create production handle generator.
pub fn create_handle_generator() -> impl HandleGenerator {
    DefaultHandleGenerator::new()
}

/// Create mock handle generator for testing.
pub fn create_mock_handle_generator() -> MockHandleGenerator {
    MockHandleGenerator::new()
}
