//! Repository seam to the remote catalog service
//!
//! The transport (query construction, authentication, HTTP) lives behind
//! this trait and is out of scope here. Implementations surface remote
//! errors verbatim through [`RepoError`]; business-context wrapping is the
//! engine's job.

use async_trait::async_trait;
use thiserror::Error;

use shoal_core::{
    AttributeDefinition, CatalogEntity, Channel, EntityBulkCreate, EntityChannelListingsUpdate,
    EntityCreate, EntityRef, EntityUpdate, MediaCreate, MediaItem, Variant, VariantBulkCreate,
    VariantChannelListingsUpdate, VariantCreate, VariantUpdate,
};

/// Remote error, surfaced verbatim (transport or business)
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct RepoError {
    pub message: String,
}

impl RepoError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

pub type RepoResult<T> = Result<T, RepoError>;

/// Error policy for bulk operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorPolicy {
    /// Any per-item failure rejects the whole call
    RejectEverything,
    /// Per-item failures are reported individually; siblings proceed
    IgnoreFailed,
}

/// One item's outcome within a bulk call
#[derive(Debug, Clone)]
pub struct BulkItemResult<T> {
    pub item: Option<T>,
    pub errors: Vec<String>,
}

/// Outcome of a bulk call
#[derive(Debug, Clone)]
pub struct BulkResult<T> {
    /// Number of items the remote service accepted
    pub count: usize,
    /// Per-item results, in submission order
    pub results: Vec<BulkItemResult<T>>,
    /// Call-level errors not tied to a single item
    pub errors: Vec<String>,
}

/// Typed read/write surface of the remote catalog service
#[async_trait]
pub trait CatalogRepository: Send + Sync {
    // ── Entities ──
    async fn create_entity(&self, input: EntityCreate) -> RepoResult<CatalogEntity>;
    async fn update_entity(&self, id: &str, input: EntityUpdate) -> RepoResult<CatalogEntity>;
    async fn get_entity_by_slug(&self, slug: &str) -> RepoResult<Option<CatalogEntity>>;
    async fn get_entity_by_name(&self, name: &str) -> RepoResult<Option<CatalogEntity>>;
    async fn get_entities_by_slugs(&self, slugs: &[String]) -> RepoResult<Vec<CatalogEntity>>;

    // ── Variants ──
    async fn get_variant_by_sku(&self, sku: &str) -> RepoResult<Option<Variant>>;
    async fn create_variant(&self, input: VariantCreate) -> RepoResult<Variant>;
    async fn update_variant(&self, id: &str, input: VariantUpdate) -> RepoResult<Variant>;

    // ── Reference lookups ──
    async fn get_type_by_name(&self, name: &str) -> RepoResult<Option<EntityRef>>;
    async fn get_category_by_path(&self, path: &str) -> RepoResult<Option<EntityRef>>;
    async fn get_attribute_by_name(&self, name: &str) -> RepoResult<Option<AttributeDefinition>>;
    async fn get_channel_by_slug(&self, slug: &str) -> RepoResult<Option<Channel>>;

    // ── Channel listings ──
    async fn update_entity_channel_listings(
        &self,
        id: &str,
        input: EntityChannelListingsUpdate,
    ) -> RepoResult<Option<CatalogEntity>>;
    async fn update_variant_channel_listings(
        &self,
        id: &str,
        input: VariantChannelListingsUpdate,
    ) -> RepoResult<Option<Variant>>;

    // ── Media ──
    async fn list_media(&self, entity_id: &str) -> RepoResult<Vec<MediaItem>>;
    async fn create_media(&self, entity_id: &str, input: MediaCreate) -> RepoResult<MediaItem>;
    async fn delete_media(&self, media_id: &str) -> RepoResult<()>;

    /// Replace all media on an entity in one shot.
    ///
    /// Default implementation for services without a replace primitive:
    /// delete everything, then recreate sequentially.
    async fn replace_all_media(
        &self,
        entity_id: &str,
        inputs: Vec<MediaCreate>,
    ) -> RepoResult<Vec<MediaItem>> {
        for item in self.list_media(entity_id).await? {
            self.delete_media(&item.id).await?;
        }
        let mut created = Vec::with_capacity(inputs.len());
        for input in inputs {
            created.push(self.create_media(entity_id, input).await?);
        }
        Ok(created)
    }

    // ── Bulk ──
    async fn bulk_create_entities(
        &self,
        inputs: Vec<EntityBulkCreate>,
        policy: ErrorPolicy,
    ) -> RepoResult<BulkResult<CatalogEntity>>;

    /// Bulk-create variants under one parent entity.
    ///
    /// Default implementation for services without a bulk primitive:
    /// sequential creates, honoring the error policy.
    async fn bulk_create_variants(
        &self,
        entity_id: &str,
        inputs: Vec<VariantBulkCreate>,
        policy: ErrorPolicy,
    ) -> RepoResult<BulkResult<Variant>> {
        let mut results = Vec::with_capacity(inputs.len());
        let mut count = 0;
        for input in inputs {
            let create = VariantCreate {
                entity_id: entity_id.to_string(),
                sku: input.sku,
                name: input.name,
                weight: input.weight,
                attributes: input.attributes,
            };
            match self.create_variant(create).await {
                Ok(variant) => {
                    count += 1;
                    results.push(BulkItemResult {
                        item: Some(variant),
                        errors: Vec::new(),
                    });
                }
                Err(e) => match policy {
                    ErrorPolicy::RejectEverything => return Err(e),
                    ErrorPolicy::IgnoreFailed => results.push(BulkItemResult {
                        item: None,
                        errors: vec![e.message],
                    }),
                },
            }
        }
        Ok(BulkResult {
            count,
            results,
            errors: Vec::new(),
        })
    }
}
