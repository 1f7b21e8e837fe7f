//! Run-scoped reference cache and resolver
//!
//! Name/slug -> remote-ID lookups are memoized for the lifetime of one
//! reconciliation run (one cache instance). Keys are lowercased; entries
//! are never invalidated within a run. The cache is shared read/write
//! across concurrently-processing entities; duplicate population under
//! concurrency is a benign, last-write-wins race since all resolutions of
//! the same key return an equivalent ID.
//!
//! Construct one cache per run and pass it by reference into every
//! component that needs resolution; never make it global.

use dashmap::DashMap;
use std::sync::Arc;

use shoal_core::AttributeDefinition;

use crate::error::{RefKind, SyncError, SyncResult};
use crate::repository::CatalogRepository;

/// Run-scoped memoization of resolved references
#[derive(Debug, Default)]
pub struct ReferenceCache {
    ids: DashMap<(RefKind, String), String>,
    /// Attribute definitions are cached whole: value resolution needs the
    /// input type and choice set, not just the ID
    attributes: DashMap<String, AttributeDefinition>,
}

impl ReferenceCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_id(&self, kind: RefKind, key: &str) -> Option<String> {
        self.ids
            .get(&(kind, key.to_lowercase()))
            .map(|entry| entry.clone())
    }

    pub fn put_id(&self, kind: RefKind, key: &str, id: impl Into<String>) {
        self.ids.insert((kind, key.to_lowercase()), id.into());
    }

    pub fn get_attribute(&self, name: &str) -> Option<AttributeDefinition> {
        self.attributes
            .get(&name.to_lowercase())
            .map(|entry| entry.clone())
    }

    pub fn put_attribute(&self, definition: AttributeDefinition) {
        self.attributes
            .insert(definition.name.to_lowercase(), definition);
    }
}

/// Cache-backed resolver for the reference kinds the engine needs
pub struct ReferenceResolver {
    repo: Arc<dyn CatalogRepository>,
    cache: Arc<ReferenceCache>,
}

impl ReferenceResolver {
    pub fn new(repo: Arc<dyn CatalogRepository>, cache: Arc<ReferenceCache>) -> Self {
        Self { repo, cache }
    }

    /// Resolve an entity type name to its remote ID
    pub async fn resolve_entity_type(&self, name: &str) -> SyncResult<String> {
        if let Some(id) = self.cache.get_id(RefKind::EntityType, name) {
            return Ok(id);
        }
        let found = self
            .repo
            .get_type_by_name(name)
            .await
            .map_err(|e| SyncError::operation("look up entity type", RefKind::EntityType, name, e))?;
        match found {
            Some(r) => {
                self.cache.put_id(RefKind::EntityType, name, r.id.clone());
                Ok(r.id)
            }
            None => Err(SyncError::not_found_with(
                RefKind::EntityType,
                name,
                vec![format!(
                    "entity type \"{name}\" must exist on the remote service before entities can reference it"
                )],
            )),
        }
    }

    /// Resolve a category path (`/`-separated for nested) to its remote ID
    pub async fn resolve_category(&self, path: &str) -> SyncResult<String> {
        if let Some(id) = self.cache.get_id(RefKind::Category, path) {
            return Ok(id);
        }
        let found = self
            .repo
            .get_category_by_path(path)
            .await
            .map_err(|e| SyncError::operation("look up category", RefKind::Category, path, e))?;
        match found {
            Some(r) => {
                self.cache.put_id(RefKind::Category, path, r.id.clone());
                Ok(r.id)
            }
            None => {
                let suggestion = if path.contains('/') {
                    format!(
                        "\"{path}\" is a nested path; every segment from root to leaf must exist"
                    )
                } else {
                    format!(
                        "\"{path}\" is a single-level category and must exist at the root; nested categories are written as \"Parent/Child\""
                    )
                };
                Err(SyncError::not_found_with(
                    RefKind::Category,
                    path,
                    vec![suggestion],
                ))
            }
        }
    }

    /// Resolve a channel slug to its remote ID
    pub async fn resolve_channel(&self, slug: &str) -> SyncResult<String> {
        if let Some(id) = self.cache.get_id(RefKind::Channel, slug) {
            return Ok(id);
        }
        let found = self
            .repo
            .get_channel_by_slug(slug)
            .await
            .map_err(|e| SyncError::operation("look up channel", RefKind::Channel, slug, e))?;
        match found {
            Some(c) => {
                self.cache.put_id(RefKind::Channel, slug, c.id.clone());
                Ok(c.id)
            }
            None => Err(SyncError::not_found_with(
                RefKind::Channel,
                slug,
                vec![format!("channel \"{slug}\" must be created before listings can target it")],
            )),
        }
    }

    /// Resolve an attribute definition by name. Returns `None` when the
    /// attribute does not exist remotely; callers decide whether that is
    /// fatal (it is not, for value resolution).
    pub async fn resolve_attribute(&self, name: &str) -> SyncResult<Option<AttributeDefinition>> {
        if let Some(definition) = self.cache.get_attribute(name) {
            return Ok(Some(definition));
        }
        let found = self
            .repo
            .get_attribute_by_name(name)
            .await
            .map_err(|e| SyncError::operation("look up attribute", RefKind::Attribute, name, e))?;
        if let Some(definition) = &found {
            self.cache.put_attribute(definition.clone());
        }
        Ok(found)
    }
}
