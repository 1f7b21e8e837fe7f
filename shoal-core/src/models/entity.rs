//! Catalog Entity Model

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::attribute::{AttributeValueAssignment, AttributeValueInput};
use super::channel::{EntityChannelListing, EntityChannelListingInput, EntityChannelListingUpdate};
use super::media::{MediaCreate, MediaInput};
use super::variant::{VariantBulkCreate, VariantInput};

/// Lightweight reference to a remote object (entity type, category)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityRef {
    pub id: String,
    pub name: String,
}

/// Catalog entity as stored by the remote service
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogEntity {
    pub id: String,
    pub name: String,
    /// Stable idempotency key, user-supplied and unique
    pub slug: String,
    pub description: Option<String>,
    pub entity_type: Option<EntityRef>,
    pub category: Option<EntityRef>,
    #[serde(default)]
    pub attributes: Vec<AttributeValueAssignment>,
    /// Per-channel publication state
    #[serde(default)]
    pub channel_listings: Vec<EntityChannelListing>,
}

/// Authored catalog entity (the declarative side)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityInput {
    pub name: String,
    pub slug: String,
    /// Entity type name
    pub entity_type: String,
    /// Category path; nested paths are `/`-separated (e.g. "Food/Snacks")
    pub category: Option<String>,
    pub description: Option<String>,
    /// Attribute name -> authored value
    #[serde(default)]
    pub attributes: BTreeMap<String, AttributeValueInput>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel_listings: Option<Vec<EntityChannelListingInput>>,
    /// Media sync only runs when this is explicitly specified
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media: Option<Vec<MediaInput>>,
    #[serde(default)]
    pub variants: Vec<VariantInput>,
}

/// Create payload (carries the type reference; updates cannot change it)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityCreate {
    pub name: String,
    pub slug: String,
    pub type_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_id: Option<String>,
    pub attributes: Vec<AttributeValueAssignment>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Update payload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityUpdate {
    pub name: String,
    pub slug: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_id: Option<String>,
    pub attributes: Vec<AttributeValueAssignment>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// One entity in a nested bulk create (attributes, listings, variants and
/// media inline in a single call)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityBulkCreate {
    pub name: String,
    pub slug: String,
    pub type_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_id: Option<String>,
    pub attributes: Vec<AttributeValueAssignment>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub channel_listings: Vec<EntityChannelListingUpdate>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub variants: Vec<VariantBulkCreate>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub media: Vec<MediaCreate>,
}
