//! Grant Store Collaborators
//!
//! Handle generation, payload serialization and the persisted grant store contract.

pub mod handle;
pub mod persisted;
pub mod serializer;

pub use handle::*;
pub use persisted::*;
pub use serializer::*;
