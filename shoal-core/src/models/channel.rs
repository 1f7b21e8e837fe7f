//! Channel Model
//!
//! Channel listings control per-channel publication and pricing. The input
//! side references channels by slug; the update payloads carry resolved
//! channel IDs.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Sales channel as exposed by the remote service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Channel {
    pub id: String,
    pub slug: String,
    pub name: String,
}

/// Authored entity-level channel listing (publish flags)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityChannelListingInput {
    /// Channel slug
    pub channel: String,
    pub is_published: Option<bool>,
    pub visible_in_listings: Option<bool>,
    pub is_available_for_purchase: Option<bool>,
    pub published_at: Option<DateTime<Utc>>,
    pub available_for_purchase_at: Option<DateTime<Utc>>,
}

/// Authored variant-level channel listing (pricing)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariantChannelListingInput {
    /// Channel slug
    pub channel: String,
    pub price: Decimal,
    pub cost_price: Option<Decimal>,
}

/// Entity listing state as stored for one channel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityChannelListing {
    pub channel_id: String,
    pub is_published: Option<bool>,
    pub visible_in_listings: Option<bool>,
    pub is_available_for_purchase: Option<bool>,
    pub published_at: Option<DateTime<Utc>>,
    pub available_for_purchase_at: Option<DateTime<Utc>>,
}

/// Variant listing state as stored for one channel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariantChannelListing {
    pub channel_id: String,
    pub price: Decimal,
    pub cost_price: Option<Decimal>,
}

/// Entity listing update for one resolved channel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityChannelListingUpdate {
    pub channel_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_published: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visible_in_listings: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_available_for_purchase: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub published_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub available_for_purchase_at: Option<DateTime<Utc>>,
}

/// Variant listing update for one resolved channel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariantChannelListingUpdate {
    pub channel_id: String,
    pub price: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cost_price: Option<Decimal>,
}

/// Full entity channel listing update payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityChannelListingsUpdate {
    pub updates: Vec<EntityChannelListingUpdate>,
}

/// Full variant channel listing update payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariantChannelListingsUpdate {
    pub updates: Vec<VariantChannelListingUpdate>,
}
