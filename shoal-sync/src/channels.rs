//! Channel listing resolution
//!
//! Turns authored, slug-addressed channel listings into ID-addressed update
//! payloads for entities (publish/visibility flags) and variants (pricing).

use std::sync::Arc;

use shoal_core::{
    EntityChannelListing, EntityChannelListingInput, EntityChannelListingUpdate,
    EntityChannelListingsUpdate, VariantChannelListing, VariantChannelListingInput,
    VariantChannelListingUpdate, VariantChannelListingsUpdate,
};

use crate::cache::ReferenceResolver;
use crate::error::SyncResult;

pub struct ChannelListingResolver {
    refs: Arc<ReferenceResolver>,
}

impl ChannelListingResolver {
    pub fn new(refs: Arc<ReferenceResolver>) -> Self {
        Self { refs }
    }

    pub async fn build_entity_update(
        &self,
        listings: &[EntityChannelListingInput],
    ) -> SyncResult<EntityChannelListingsUpdate> {
        let mut updates = Vec::with_capacity(listings.len());
        for listing in listings {
            let channel_id = self.refs.resolve_channel(&listing.channel).await?;
            updates.push(EntityChannelListingUpdate {
                channel_id,
                is_published: listing.is_published,
                visible_in_listings: listing.visible_in_listings,
                is_available_for_purchase: listing.is_available_for_purchase,
                published_at: listing.published_at,
                available_for_purchase_at: listing.available_for_purchase_at,
            });
        }
        Ok(EntityChannelListingsUpdate { updates })
    }

    pub async fn build_variant_update(
        &self,
        listings: &[VariantChannelListingInput],
    ) -> SyncResult<VariantChannelListingsUpdate> {
        let mut updates = Vec::with_capacity(listings.len());
        for listing in listings {
            let channel_id = self.refs.resolve_channel(&listing.channel).await?;
            updates.push(VariantChannelListingUpdate {
                channel_id,
                price: listing.price,
                cost_price: listing.cost_price,
            });
        }
        Ok(VariantChannelListingsUpdate { updates })
    }
}

fn field_converged<T: PartialEq>(wanted: &Option<T>, current: &Option<T>) -> bool {
    match wanted {
        // Unspecified fields leave the current value untouched
        None => true,
        Some(_) => wanted == current,
    }
}

/// Whether the stored entity listings already reflect every desired update.
/// Channels the update does not address are ignored.
pub(crate) fn entity_listings_converged(
    current: &[EntityChannelListing],
    desired: &[EntityChannelListingUpdate],
) -> bool {
    desired.iter().all(|want| {
        current.iter().any(|have| {
            have.channel_id == want.channel_id
                && field_converged(&want.is_published, &have.is_published)
                && field_converged(&want.visible_in_listings, &have.visible_in_listings)
                && field_converged(
                    &want.is_available_for_purchase,
                    &have.is_available_for_purchase,
                )
                && field_converged(&want.published_at, &have.published_at)
                && field_converged(
                    &want.available_for_purchase_at,
                    &have.available_for_purchase_at,
                )
        })
    })
}

/// Whether the stored variant listings already carry every desired price
pub(crate) fn variant_listings_converged(
    current: &[VariantChannelListing],
    desired: &[VariantChannelListingUpdate],
) -> bool {
    desired.iter().all(|want| {
        current.iter().any(|have| {
            have.channel_id == want.channel_id
                && have.price == want.price
                && field_converged(&want.cost_price, &have.cost_price)
        })
    })
}
