//! Shoal Sync - Catalog reconciliation engine
//!
//! Converges a declarative catalog description against the live state of a
//! remote catalog service, computing and applying only the necessary
//! create/update operations. Repeated runs over unchanged input perform no
//! writes. The wire-level transport lives behind [`CatalogRepository`] and
//! is out of scope here.

pub mod attributes;
pub mod bulk;
pub mod cache;
pub mod channels;
pub mod entity;
pub mod error;
pub mod media;
pub mod repository;
pub mod variants;

pub use attributes::{AttributeValueResolver, PageResolver};
pub use bulk::{BulkConfig, BulkOrchestrator, BulkReport};
pub use cache::{ReferenceCache, ReferenceResolver};
pub use channels::ChannelListingResolver;
pub use entity::{EntityReconciler, ReconciledEntity};
pub use error::{BatchFailure, RefKind, SyncError, SyncResult};
pub use media::{extract_fingerprint, media_equivalent, MediaReconciler};
pub use repository::{
    BulkItemResult, BulkResult, CatalogRepository, ErrorPolicy, RepoError, RepoResult,
};
pub use variants::VariantReconciler;
