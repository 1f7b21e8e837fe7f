//! Variant reconciliation
//!
//! Variants reconcile in input order, sequentially: later variants do not
//! depend on earlier ones, but deterministic reporting order matters for
//! batch output. SKU is the idempotency key; SKU and parent association
//! are immutable after creation.

use std::sync::Arc;

use shoal_core::{CatalogEntity, Variant, VariantCreate, VariantInput, VariantUpdate};

use crate::attributes::{same_assignments, AttributeValueResolver};
use crate::error::{RefKind, SyncError, SyncResult};
use crate::repository::CatalogRepository;

pub struct VariantReconciler {
    repo: Arc<dyn CatalogRepository>,
    attributes: Arc<AttributeValueResolver>,
}

impl VariantReconciler {
    pub fn new(repo: Arc<dyn CatalogRepository>, attributes: Arc<AttributeValueResolver>) -> Self {
        Self { repo, attributes }
    }

    /// Upsert every variant under the entity, in input order. A broken
    /// variant aborts the owning entity's reconciliation.
    pub async fn reconcile(
        &self,
        entity: &CatalogEntity,
        inputs: &[VariantInput],
    ) -> SyncResult<Vec<Variant>> {
        let mut variants = Vec::with_capacity(inputs.len());
        for input in inputs {
            let variant = self.reconcile_one(entity, input).await.map_err(|e| {
                tracing::error!(
                    entity_id = %entity.id,
                    sku = %input.sku,
                    error = %e,
                    "Variant reconciliation failed"
                );
                e
            })?;
            variants.push(variant);
        }
        Ok(variants)
    }

    async fn reconcile_one(
        &self,
        entity: &CatalogEntity,
        input: &VariantInput,
    ) -> SyncResult<Variant> {
        let attributes = self.attributes.resolve_assignments(&input.attributes).await;

        let existing = self
            .repo
            .get_variant_by_sku(&input.sku)
            .await
            .map_err(|e| SyncError::operation("look up variant", RefKind::Variant, &input.sku, e))?;

        match existing {
            Some(current) => {
                let update = VariantUpdate {
                    name: input.name.clone(),
                    weight: input.weight,
                    attributes,
                };
                if !variant_needs_update(&current, &update) {
                    tracing::debug!(sku = %input.sku, "Variant already up to date, skipping");
                    return Ok(current);
                }
                self.repo
                    .update_variant(&current.id, update)
                    .await
                    .map_err(|e| {
                        SyncError::operation("update variant", RefKind::Variant, &input.sku, e)
                    })
            }
            None => {
                let create = VariantCreate {
                    entity_id: entity.id.clone(),
                    sku: input.sku.clone(),
                    name: input.name.clone(),
                    weight: input.weight,
                    attributes,
                };
                self.repo.create_variant(create).await.map_err(|e| {
                    SyncError::operation("create variant", RefKind::Variant, &input.sku, e)
                })
            }
        }
    }
}

fn variant_needs_update(existing: &Variant, update: &VariantUpdate) -> bool {
    existing.name != update.name
        || existing.weight != update.weight
        || !same_assignments(&existing.attributes, &update.attributes)
}
