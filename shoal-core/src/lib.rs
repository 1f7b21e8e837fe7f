//! Shoal Core - Catalog data model
//!
//! Serde data model shared between the declarative catalog input side and
//! the reconciliation engine: entities, variants, media, channel listings,
//! attribute definitions and value payloads.

pub mod models;
pub mod rich_text;

pub use models::attribute::{
    AttributeChoice, AttributeDefinition, AttributeInputType, AttributeValueAssignment,
    AttributeValueInput, AttributeValuePayload, ReferenceEntityType, ResolvedChoice, ScalarValue,
};
pub use models::channel::{
    Channel, EntityChannelListing, EntityChannelListingInput, EntityChannelListingUpdate,
    EntityChannelListingsUpdate, VariantChannelListing, VariantChannelListingInput,
    VariantChannelListingUpdate, VariantChannelListingsUpdate,
};
pub use models::entity::{
    CatalogEntity, EntityBulkCreate, EntityCreate, EntityInput, EntityRef, EntityUpdate,
};
pub use models::media::{MediaCreate, MediaInput, MediaItem, SOURCE_URL_KEY};
pub use models::variant::{Variant, VariantBulkCreate, VariantCreate, VariantInput, VariantUpdate};
