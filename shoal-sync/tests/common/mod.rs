//! In-memory mock of the remote catalog service, recording every call so
//! tests can assert on write traffic.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

use shoal_core::{
    AttributeDefinition, CatalogEntity, Channel, EntityBulkCreate, EntityChannelListing,
    EntityChannelListingUpdate, EntityChannelListingsUpdate, EntityCreate, EntityRef, EntityUpdate,
    MediaCreate, MediaItem, Variant, VariantChannelListing, VariantChannelListingUpdate,
    VariantChannelListingsUpdate, VariantCreate, VariantUpdate,
};
use shoal_sync::{
    BulkItemResult, BulkResult, CatalogRepository, ErrorPolicy, RepoError, RepoResult,
};

#[derive(Default)]
pub struct MockState {
    pub types: Vec<EntityRef>,
    /// Category path -> reference
    pub categories: HashMap<String, EntityRef>,
    pub channels: Vec<Channel>,
    pub attributes: Vec<AttributeDefinition>,
    pub entities: Vec<CatalogEntity>,
    /// (parent entity id, variant)
    pub variants: Vec<(String, Variant)>,
    /// Entity id -> media items
    pub media: HashMap<String, Vec<MediaItem>>,
    next_id: u64,
}

impl MockState {
    fn next_id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{prefix}{}", self.next_id)
    }
}

#[derive(Default)]
pub struct MockRepository {
    pub state: Mutex<MockState>,
    pub calls: Mutex<Vec<String>>,
    /// When set, the next entity update that carries a description fails
    /// once with this message.
    pub fail_update_once: Mutex<Option<String>>,
}

impl MockRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seed_type(&self, id: &str, name: &str) {
        self.state.lock().unwrap().types.push(EntityRef {
            id: id.into(),
            name: name.into(),
        });
    }

    pub fn seed_category(&self, path: &str, id: &str) {
        let name = path.rsplit('/').next().unwrap_or(path).to_string();
        self.state.lock().unwrap().categories.insert(
            path.to_string(),
            EntityRef {
                id: id.into(),
                name,
            },
        );
    }

    pub fn seed_channel(&self, id: &str, slug: &str) {
        self.state.lock().unwrap().channels.push(Channel {
            id: id.into(),
            slug: slug.into(),
            name: slug.into(),
        });
    }

    pub fn seed_attribute(&self, definition: AttributeDefinition) {
        self.state.lock().unwrap().attributes.push(definition);
    }

    fn record(&self, call: impl Into<String>) {
        self.calls.lock().unwrap().push(call.into());
    }

    /// Number of recorded calls whose name starts with `prefix`
    pub fn count(&self, prefix: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.starts_with(prefix))
            .count()
    }

    /// All mutating calls recorded so far
    pub fn write_calls(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| {
                ["create_", "update_", "delete_", "replace_", "bulk_"]
                    .iter()
                    .any(|p| c.starts_with(p))
            })
            .cloned()
            .collect()
    }

    pub fn entity_by_slug(&self, slug: &str) -> Option<CatalogEntity> {
        self.state
            .lock()
            .unwrap()
            .entities
            .iter()
            .find(|e| e.slug == slug)
            .cloned()
    }

    pub fn variant_by_sku(&self, sku: &str) -> Option<Variant> {
        self.state
            .lock()
            .unwrap()
            .variants
            .iter()
            .find(|(_, v)| v.sku == sku)
            .map(|(_, v)| v.clone())
    }

    pub fn media_for(&self, entity_id: &str) -> Vec<MediaItem> {
        self.state
            .lock()
            .unwrap()
            .media
            .get(entity_id)
            .cloned()
            .unwrap_or_default()
    }

    fn make_entity(state: &mut MockState, input: &EntityCreate) -> CatalogEntity {
        let id = state.next_id("E");
        let entity_type = state.types.iter().find(|t| t.id == input.type_id).cloned();
        let category = input.category_id.as_ref().and_then(|cid| {
            state
                .categories
                .values()
                .find(|c| &c.id == cid)
                .cloned()
                .or_else(|| {
                    Some(EntityRef {
                        id: cid.clone(),
                        name: cid.clone(),
                    })
                })
        });
        CatalogEntity {
            id,
            name: input.name.clone(),
            slug: input.slug.clone(),
            description: input.description.clone(),
            entity_type,
            category,
            attributes: input.attributes.clone(),
            channel_listings: Vec::new(),
        }
    }

    fn make_variant(state: &mut MockState, input: &VariantCreate) -> Variant {
        let id = state.next_id("V");
        Variant {
            id,
            sku: input.sku.clone(),
            name: input.name.clone(),
            weight: input.weight,
            attributes: input.attributes.clone(),
            channel_listings: Vec::new(),
        }
    }

    fn apply_entity_listing(
        listings: &mut Vec<EntityChannelListing>,
        update: &EntityChannelListingUpdate,
    ) {
        let pos = listings
            .iter()
            .position(|l| l.channel_id == update.channel_id);
        let pos = match pos {
            Some(pos) => pos,
            None => {
                listings.push(EntityChannelListing {
                    channel_id: update.channel_id.clone(),
                    is_published: None,
                    visible_in_listings: None,
                    is_available_for_purchase: None,
                    published_at: None,
                    available_for_purchase_at: None,
                });
                listings.len() - 1
            }
        };
        let listing = &mut listings[pos];
        if update.is_published.is_some() {
            listing.is_published = update.is_published;
        }
        if update.visible_in_listings.is_some() {
            listing.visible_in_listings = update.visible_in_listings;
        }
        if update.is_available_for_purchase.is_some() {
            listing.is_available_for_purchase = update.is_available_for_purchase;
        }
        if update.published_at.is_some() {
            listing.published_at = update.published_at;
        }
        if update.available_for_purchase_at.is_some() {
            listing.available_for_purchase_at = update.available_for_purchase_at;
        }
    }

    fn apply_variant_listing(
        listings: &mut Vec<VariantChannelListing>,
        update: &VariantChannelListingUpdate,
    ) {
        let pos = listings
            .iter()
            .position(|l| l.channel_id == update.channel_id);
        match pos {
            Some(pos) => {
                listings[pos].price = update.price;
                if update.cost_price.is_some() {
                    listings[pos].cost_price = update.cost_price;
                }
            }
            None => listings.push(VariantChannelListing {
                channel_id: update.channel_id.clone(),
                price: update.price,
                cost_price: update.cost_price,
            }),
        }
    }
}

#[async_trait]
impl CatalogRepository for MockRepository {
    async fn create_entity(&self, input: EntityCreate) -> RepoResult<CatalogEntity> {
        self.record(format!("create_entity:{}", input.slug));
        let mut state = self.state.lock().unwrap();
        if state.entities.iter().any(|e| e.slug == input.slug) {
            return Err(RepoError::new(format!(
                "entity with slug \"{}\" already exists",
                input.slug
            )));
        }
        let entity = Self::make_entity(&mut state, &input);
        state.entities.push(entity.clone());
        Ok(entity)
    }

    async fn update_entity(&self, id: &str, input: EntityUpdate) -> RepoResult<CatalogEntity> {
        self.record(format!("update_entity:{id}"));
        if input.description.is_some() {
            if let Some(message) = self.fail_update_once.lock().unwrap().take() {
                return Err(RepoError::new(message));
            }
        }
        let mut state = self.state.lock().unwrap();
        let category = input.category_id.as_ref().map(|cid| {
            state
                .categories
                .values()
                .find(|c| &c.id == cid)
                .cloned()
                .unwrap_or_else(|| EntityRef {
                    id: cid.clone(),
                    name: cid.clone(),
                })
        });
        let entity = state
            .entities
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or_else(|| RepoError::new(format!("no entity with id {id}")))?;
        entity.name = input.name;
        entity.slug = input.slug;
        entity.category = category;
        entity.attributes = input.attributes;
        if let Some(description) = input.description {
            entity.description = Some(description);
        }
        Ok(entity.clone())
    }

    async fn get_entity_by_slug(&self, slug: &str) -> RepoResult<Option<CatalogEntity>> {
        self.record(format!("get_entity_by_slug:{slug}"));
        Ok(self.entity_by_slug(slug))
    }

    async fn get_entity_by_name(&self, name: &str) -> RepoResult<Option<CatalogEntity>> {
        self.record(format!("get_entity_by_name:{name}"));
        Ok(self
            .state
            .lock()
            .unwrap()
            .entities
            .iter()
            .find(|e| e.name == name)
            .cloned())
    }

    async fn get_entities_by_slugs(&self, slugs: &[String]) -> RepoResult<Vec<CatalogEntity>> {
        self.record("get_entities_by_slugs");
        Ok(self
            .state
            .lock()
            .unwrap()
            .entities
            .iter()
            .filter(|e| slugs.contains(&e.slug))
            .cloned()
            .collect())
    }

    async fn get_variant_by_sku(&self, sku: &str) -> RepoResult<Option<Variant>> {
        self.record(format!("get_variant_by_sku:{sku}"));
        Ok(self.variant_by_sku(sku))
    }

    async fn create_variant(&self, input: VariantCreate) -> RepoResult<Variant> {
        self.record(format!("create_variant:{}", input.sku));
        let mut state = self.state.lock().unwrap();
        if state.variants.iter().any(|(_, v)| v.sku == input.sku) {
            return Err(RepoError::new(format!(
                "variant with SKU \"{}\" already exists",
                input.sku
            )));
        }
        let variant = Self::make_variant(&mut state, &input);
        state
            .variants
            .push((input.entity_id.clone(), variant.clone()));
        Ok(variant)
    }

    async fn update_variant(&self, id: &str, input: VariantUpdate) -> RepoResult<Variant> {
        self.record(format!("update_variant:{id}"));
        let mut state = self.state.lock().unwrap();
        let (_, variant) = state
            .variants
            .iter_mut()
            .find(|(_, v)| v.id == id)
            .ok_or_else(|| RepoError::new(format!("no variant with id {id}")))?;
        variant.name = input.name;
        variant.weight = input.weight;
        variant.attributes = input.attributes;
        Ok(variant.clone())
    }

    async fn get_type_by_name(&self, name: &str) -> RepoResult<Option<EntityRef>> {
        self.record(format!("get_type_by_name:{name}"));
        Ok(self
            .state
            .lock()
            .unwrap()
            .types
            .iter()
            .find(|t| t.name.eq_ignore_ascii_case(name))
            .cloned())
    }

    async fn get_category_by_path(&self, path: &str) -> RepoResult<Option<EntityRef>> {
        self.record(format!("get_category_by_path:{path}"));
        Ok(self.state.lock().unwrap().categories.get(path).cloned())
    }

    async fn get_attribute_by_name(&self, name: &str) -> RepoResult<Option<AttributeDefinition>> {
        self.record(format!("get_attribute_by_name:{name}"));
        Ok(self
            .state
            .lock()
            .unwrap()
            .attributes
            .iter()
            .find(|a| a.name.eq_ignore_ascii_case(name))
            .cloned())
    }

    async fn get_channel_by_slug(&self, slug: &str) -> RepoResult<Option<Channel>> {
        self.record(format!("get_channel_by_slug:{slug}"));
        Ok(self
            .state
            .lock()
            .unwrap()
            .channels
            .iter()
            .find(|c| c.slug == slug)
            .cloned())
    }

    async fn update_entity_channel_listings(
        &self,
        id: &str,
        input: EntityChannelListingsUpdate,
    ) -> RepoResult<Option<CatalogEntity>> {
        self.record(format!(
            "update_entity_channel_listings:{id}:{}",
            input.updates.len()
        ));
        let mut state = self.state.lock().unwrap();
        Ok(state.entities.iter_mut().find(|e| e.id == id).map(|entity| {
            for update in &input.updates {
                Self::apply_entity_listing(&mut entity.channel_listings, update);
            }
            entity.clone()
        }))
    }

    async fn update_variant_channel_listings(
        &self,
        id: &str,
        input: VariantChannelListingsUpdate,
    ) -> RepoResult<Option<Variant>> {
        self.record(format!(
            "update_variant_channel_listings:{id}:{}",
            input.updates.len()
        ));
        let mut state = self.state.lock().unwrap();
        Ok(state
            .variants
            .iter_mut()
            .find(|(_, v)| v.id == id)
            .map(|(_, variant)| {
                for update in &input.updates {
                    Self::apply_variant_listing(&mut variant.channel_listings, update);
                }
                variant.clone()
            }))
    }

    async fn list_media(&self, entity_id: &str) -> RepoResult<Vec<MediaItem>> {
        self.record(format!("list_media:{entity_id}"));
        Ok(self.media_for(entity_id))
    }

    async fn create_media(&self, entity_id: &str, input: MediaCreate) -> RepoResult<MediaItem> {
        self.record(format!("create_media:{entity_id}"));
        let mut state = self.state.lock().unwrap();
        let id = state.next_id("M");
        // The remote service rewrites storage URLs; metadata survives
        let item = MediaItem {
            url: format!("https://cdn.remote/thumbnail/{id}/4096/"),
            id,
            alt: input.alt,
            metadata: input.metadata,
        };
        state
            .media
            .entry(entity_id.to_string())
            .or_default()
            .push(item.clone());
        Ok(item)
    }

    async fn delete_media(&self, media_id: &str) -> RepoResult<()> {
        self.record(format!("delete_media:{media_id}"));
        let mut state = self.state.lock().unwrap();
        for items in state.media.values_mut() {
            items.retain(|m| m.id != media_id);
        }
        Ok(())
    }

    async fn bulk_create_entities(
        &self,
        inputs: Vec<EntityBulkCreate>,
        policy: ErrorPolicy,
    ) -> RepoResult<BulkResult<CatalogEntity>> {
        self.record(format!("bulk_create_entities:{}", inputs.len()));
        let mut results = Vec::with_capacity(inputs.len());
        let mut count = 0;
        for input in inputs {
            let outcome = self.bulk_create_one(&input);
            match outcome {
                Ok(entity) => {
                    count += 1;
                    results.push(BulkItemResult {
                        item: Some(entity),
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

impl MockRepository {
    fn bulk_create_one(&self, input: &EntityBulkCreate) -> RepoResult<CatalogEntity> {
        let mut state = self.state.lock().unwrap();
        if state.entities.iter().any(|e| e.slug == input.slug) {
            return Err(RepoError::new(format!(
                "entity with slug \"{}\" already exists",
                input.slug
            )));
        }
        let create = EntityCreate {
            name: input.name.clone(),
            slug: input.slug.clone(),
            type_id: input.type_id.clone(),
            category_id: input.category_id.clone(),
            attributes: input.attributes.clone(),
            description: input.description.clone(),
        };
        let mut entity = Self::make_entity(&mut state, &create);
        for update in &input.channel_listings {
            Self::apply_entity_listing(&mut entity.channel_listings, update);
        }
        state.entities.push(entity.clone());
        for nested in &input.variants {
            if state.variants.iter().any(|(_, v)| v.sku == nested.sku) {
                return Err(RepoError::new(format!(
                    "variant with SKU \"{}\" already exists",
                    nested.sku
                )));
            }
            let create = VariantCreate {
                entity_id: entity.id.clone(),
                sku: nested.sku.clone(),
                name: nested.name.clone(),
                weight: nested.weight,
                attributes: nested.attributes.clone(),
            };
            let mut variant = Self::make_variant(&mut state, &create);
            for update in &nested.channel_listings {
                Self::apply_variant_listing(&mut variant.channel_listings, update);
            }
            state.variants.push((entity.id.clone(), variant));
        }
        for media in &input.media {
            let id = state.next_id("M");
            let item = MediaItem {
                url: format!("https://cdn.remote/thumbnail/{id}/4096/"),
                id,
                alt: media.alt.clone(),
                metadata: media.metadata.clone(),
            };
            state
                .media
                .entry(entity.id.clone())
                .or_default()
                .push(item);
        }
        Ok(entity)
    }
}
