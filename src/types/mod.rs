//! Grant Types
//!
//! Persisted record shape, payload types and configuration.

pub mod authorization_code;
pub mod config;
pub mod consent;
pub mod grant;
pub mod refresh_token;
pub mod token;

pub use authorization_code::*;
pub use config::*;
pub use consent::*;
pub use grant::*;
pub use refresh_token::*;
pub use token::*;
