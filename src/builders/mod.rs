//! Builders
//!
//! Fluent builders for grant store options and grant stores.

pub mod options;
pub mod store;

pub use options::{grant_store_options, GrantStoreOptionsBuilder};
pub use store::{grant_store, GrantStoreBuilder};
