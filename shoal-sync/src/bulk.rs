//! Bulk-batch orchestration
//!
//! Partitions a batch into create and update buckets from one bulk slug
//! lookup, pre-warms the reference cache, issues a single nested bulk
//! create with an ignore-failed policy, and drives updates through the
//! single-entity path under bounded concurrency. Failures never abort
//! sibling entities; they are aggregated into one batch error after every
//! entity has been attempted.

use futures::future::join_all;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use shoal_core::rich_text::wrap_rich_text;
use shoal_core::{EntityBulkCreate, EntityInput, MediaCreate, VariantBulkCreate};

use crate::attributes::AttributeValueResolver;
use crate::cache::{ReferenceCache, ReferenceResolver};
use crate::channels::ChannelListingResolver;
use crate::entity::EntityReconciler;
use crate::error::{BatchFailure, RefKind, SyncError, SyncResult};
use crate::media::dedup_media;
use crate::repository::{CatalogRepository, ErrorPolicy};

/// Batch tuning knobs. The concurrency bound and inter-chunk delay exist to
/// stay under the remote service's rate limits.
#[derive(Debug, Clone)]
pub struct BulkConfig {
    /// Entities processed in parallel on the update path
    pub concurrency: usize,
    /// Fixed pause between chunks, when set
    pub chunk_delay: Option<Duration>,
}

impl Default for BulkConfig {
    fn default() -> Self {
        Self {
            concurrency: 5,
            chunk_delay: None,
        }
    }
}

/// Summary of a completed batch run
#[derive(Debug, Clone, Default)]
pub struct BulkReport {
    pub created: usize,
    pub updated: usize,
}

impl std::fmt::Display for BulkReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} created, {} updated", self.created, self.updated)
    }
}

pub struct BulkOrchestrator {
    repo: Arc<dyn CatalogRepository>,
    refs: Arc<ReferenceResolver>,
    attributes: Arc<AttributeValueResolver>,
    channels: ChannelListingResolver,
    reconciler: EntityReconciler,
    config: BulkConfig,
}

impl BulkOrchestrator {
    pub fn new(repo: Arc<dyn CatalogRepository>) -> Self {
        Self::with_config(repo, BulkConfig::default())
    }

    pub fn with_config(repo: Arc<dyn CatalogRepository>, config: BulkConfig) -> Self {
        // One cache per orchestrator: its lifetime is the run
        let cache = Arc::new(ReferenceCache::new());
        let refs = Arc::new(ReferenceResolver::new(repo.clone(), cache.clone()));
        let attributes = Arc::new(AttributeValueResolver::new(repo.clone(), refs.clone()));
        Self {
            channels: ChannelListingResolver::new(refs.clone()),
            reconciler: EntityReconciler::new(repo.clone(), cache),
            repo,
            refs,
            attributes,
            config,
        }
    }

    /// Reconcile a whole batch. Returns a summary on full success, or an
    /// aggregate error naming every failed entity once all have been
    /// attempted. Successes stay committed either way.
    pub async fn bootstrap_many(&self, inputs: &[EntityInput]) -> SyncResult<BulkReport> {
        if inputs.is_empty() {
            return Ok(BulkReport::default());
        }

        // 1. One bulk lookup by slug, then partition
        let slugs: Vec<String> = inputs.iter().map(|i| i.slug.clone()).collect();
        let existing = self
            .repo
            .get_entities_by_slugs(&slugs)
            .await
            .map_err(|e| SyncError::operation("look up entities", RefKind::Entity, "batch", e))?;
        let existing_slugs: HashSet<&str> = existing.iter().map(|e| e.slug.as_str()).collect();
        let (to_update, to_create): (Vec<&EntityInput>, Vec<&EntityInput>) = inputs
            .iter()
            .partition(|i| existing_slugs.contains(i.slug.as_str()));
        tracing::info!(
            total = inputs.len(),
            create = to_create.len(),
            update = to_update.len(),
            "Partitioned batch"
        );

        // 2. Pre-warm the reference cache (failures are non-fatal: a cold
        //    entry falls back to per-item resolution later)
        self.prewarm(inputs).await;

        let mut failures: Vec<BatchFailure> = Vec::new();

        // 3. Bulk create with nested attributes, listings, variants, media
        let created = self.bulk_create(&to_create, &mut failures).await;

        // 4. Updates through the single-entity path, bounded concurrency
        let updated = self.run_updates(&to_update, &mut failures).await;

        // 5. Aggregate
        if !failures.is_empty() {
            tracing::error!(
                failed = failures.len(),
                total = inputs.len(),
                "Batch finished with failures"
            );
            return Err(SyncError::Batch {
                failures,
                total: inputs.len(),
            });
        }
        Ok(BulkReport { created, updated })
    }

    async fn prewarm(&self, inputs: &[EntityInput]) {
        let mut types: HashSet<&str> = HashSet::new();
        let mut categories: HashSet<&str> = HashSet::new();
        let mut channels: HashSet<&str> = HashSet::new();
        for input in inputs {
            types.insert(&input.entity_type);
            if let Some(path) = &input.category {
                categories.insert(path);
            }
            if let Some(listings) = &input.channel_listings {
                channels.extend(listings.iter().map(|l| l.channel.as_str()));
            }
            for variant in &input.variants {
                if let Some(listings) = &variant.channel_listings {
                    channels.extend(listings.iter().map(|l| l.channel.as_str()));
                }
            }
        }

        let type_jobs = join_all(types.into_iter().map(|name| async move {
            if let Err(e) = self.refs.resolve_entity_type(name).await {
                tracing::warn!(kind = "entity type", key = %name, error = %e, "Cache pre-warm failed");
            }
        }));
        let category_jobs = join_all(categories.into_iter().map(|path| async move {
            if let Err(e) = self.refs.resolve_category(path).await {
                tracing::warn!(kind = "category", key = %path, error = %e, "Cache pre-warm failed");
            }
        }));
        let channel_jobs = join_all(channels.into_iter().map(|slug| async move {
            if let Err(e) = self.refs.resolve_channel(slug).await {
                tracing::warn!(kind = "channel", key = %slug, error = %e, "Cache pre-warm failed");
            }
        }));
        futures::join!(type_jobs, category_jobs, channel_jobs);
    }

    async fn bulk_create(
        &self,
        to_create: &[&EntityInput],
        failures: &mut Vec<BatchFailure>,
    ) -> usize {
        if to_create.is_empty() {
            return 0;
        }

        let mut payloads = Vec::new();
        let mut labels = Vec::new();
        for input in to_create {
            match self.build_bulk_create(input).await {
                Ok(payload) => {
                    payloads.push(payload);
                    labels.push(input.slug.clone());
                }
                Err(e) => failures.push(BatchFailure {
                    label: input.slug.clone(),
                    message: e.to_string(),
                }),
            }
        }
        if payloads.is_empty() {
            return 0;
        }

        match self
            .repo
            .bulk_create_entities(payloads, ErrorPolicy::IgnoreFailed)
            .await
        {
            Ok(result) => {
                let mut created = 0;
                for (i, item) in result.results.iter().enumerate() {
                    let label = labels
                        .get(i)
                        .cloned()
                        .unwrap_or_else(|| format!("item {i}"));
                    if item.item.is_some() && item.errors.is_empty() {
                        created += 1;
                    } else {
                        let message = if item.errors.is_empty() {
                            "rejected by bulk create".to_string()
                        } else {
                            item.errors.join("; ")
                        };
                        failures.push(BatchFailure { label, message });
                    }
                }
                for message in result.errors {
                    failures.push(BatchFailure {
                        label: "batch".to_string(),
                        message,
                    });
                }
                created
            }
            Err(e) => {
                // Whole-call failure: every submitted entity failed
                for label in labels {
                    failures.push(BatchFailure {
                        label,
                        message: e.to_string(),
                    });
                }
                0
            }
        }
    }

    /// Resolve everything one bulk-create item needs up front; any
    /// resolution failure fails only this item.
    async fn build_bulk_create(&self, input: &EntityInput) -> SyncResult<EntityBulkCreate> {
        let type_id = self.refs.resolve_entity_type(&input.entity_type).await?;
        let category_id = match &input.category {
            Some(path) => Some(self.refs.resolve_category(path).await?),
            None => None,
        };
        let attributes = self.attributes.resolve_assignments(&input.attributes).await;
        let description = input.description.as_deref().map(wrap_rich_text);

        let channel_listings = match &input.channel_listings {
            Some(listings) => self.channels.build_entity_update(listings).await?.updates,
            None => Vec::new(),
        };

        let mut variants = Vec::with_capacity(input.variants.len());
        for variant in &input.variants {
            let variant_attributes =
                self.attributes.resolve_assignments(&variant.attributes).await;
            let variant_listings = match &variant.channel_listings {
                Some(listings) => self.channels.build_variant_update(listings).await?.updates,
                None => Vec::new(),
            };
            variants.push(VariantBulkCreate {
                sku: variant.sku.clone(),
                name: variant.name.clone(),
                weight: variant.weight,
                attributes: variant_attributes,
                channel_listings: variant_listings,
            });
        }

        let media = match &input.media {
            Some(items) => dedup_media(items)
                .iter()
                .map(|m| MediaCreate::with_source(&m.url, m.alt.clone()))
                .collect(),
            None => Vec::new(),
        };

        Ok(EntityBulkCreate {
            name: input.name.clone(),
            slug: input.slug.clone(),
            type_id,
            category_id,
            attributes,
            description,
            channel_listings,
            variants,
            media,
        })
    }

    async fn run_updates(
        &self,
        to_update: &[&EntityInput],
        failures: &mut Vec<BatchFailure>,
    ) -> usize {
        let mut updated = 0;
        let concurrency = self.config.concurrency.max(1);
        let chunk_count = to_update.len().div_ceil(concurrency);

        for (chunk_index, chunk) in to_update.chunks(concurrency).enumerate() {
            let results: Vec<(String, SyncResult<_>)> =
                join_all(chunk.iter().map(|input| async move {
                    (input.slug.clone(), self.reconciler.bootstrap(input).await)
                }))
                .await;
            for (slug, result) in results {
                match result {
                    Ok(_) => updated += 1,
                    Err(e) => failures.push(BatchFailure {
                        label: slug,
                        message: e.to_string(),
                    }),
                }
            }
            if let Some(delay) = self.config.chunk_delay {
                if chunk_index + 1 < chunk_count {
                    tokio::time::sleep(delay).await;
                }
            }
        }
        updated
    }
}
