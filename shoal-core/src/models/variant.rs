//! Variant Model
//!
//! Variants are owned by their parent catalog entity and upserted
//! independently by SKU. SKU and parent association are immutable after
//! creation.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::attribute::{AttributeValueAssignment, AttributeValueInput};
use super::channel::{VariantChannelListing, VariantChannelListingInput};

/// Variant as stored by the remote service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Variant {
    pub id: String,
    pub sku: String,
    pub name: String,
    pub weight: Option<f64>,
    #[serde(default)]
    pub attributes: Vec<AttributeValueAssignment>,
    /// Per-channel pricing state
    #[serde(default)]
    pub channel_listings: Vec<VariantChannelListing>,
}

/// Authored variant
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariantInput {
    pub sku: String,
    pub name: String,
    pub weight: Option<f64>,
    /// Attribute name -> authored value
    #[serde(default)]
    pub attributes: BTreeMap<String, AttributeValueInput>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel_listings: Option<Vec<VariantChannelListingInput>>,
}

/// Create payload (parent association fixed at creation)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariantCreate {
    pub entity_id: String,
    pub sku: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
    pub attributes: Vec<AttributeValueAssignment>,
}

/// Update payload (SKU and parent are immutable, so neither appears here)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariantUpdate {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
    pub attributes: Vec<AttributeValueAssignment>,
}

/// Variant as nested inside a bulk entity create
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariantBulkCreate {
    pub sku: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
    pub attributes: Vec<AttributeValueAssignment>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub channel_listings: Vec<super::channel::VariantChannelListingUpdate>,
}
