//! Data models
//!
//! Shared between the declarative catalog input and the reconciliation
//! engine. Remote-assigned IDs are opaque `String`s; the stable keys the
//! engine upserts by are the user-supplied `slug` (entities) and `sku`
//! (variants).

pub mod attribute;
pub mod channel;
pub mod entity;
pub mod media;
pub mod variant;

// Re-exports
pub use attribute::*;
pub use channel::*;
pub use entity::*;
pub use media::*;
pub use variant::*;
