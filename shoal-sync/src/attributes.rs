//! Attribute value resolution
//!
//! Maps loosely-typed authored values onto the remote service's polymorphic
//! value model, dispatching on the attribute's declared input type. A single
//! attribute failing to resolve is never fatal: it is logged and omitted so
//! sibling attributes still reconcile.

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;

use shoal_core::rich_text::wrap_rich_text;
use shoal_core::{
    AttributeDefinition, AttributeInputType, AttributeValueAssignment, AttributeValueInput,
    AttributeValuePayload, ReferenceEntityType, ResolvedChoice, ScalarValue,
};

use crate::cache::ReferenceResolver;
use crate::error::SyncResult;
use crate::repository::CatalogRepository;

/// Injected resolver for page-slug references; the engine does not own
/// page lookups.
#[async_trait]
pub trait PageResolver: Send + Sync {
    async fn resolve_page_slug(&self, slug: &str) -> SyncResult<Option<String>>;
}

pub struct AttributeValueResolver {
    repo: Arc<dyn CatalogRepository>,
    refs: Arc<ReferenceResolver>,
    pages: Option<Arc<dyn PageResolver>>,
}

impl AttributeValueResolver {
    pub fn new(repo: Arc<dyn CatalogRepository>, refs: Arc<ReferenceResolver>) -> Self {
        Self {
            repo,
            refs,
            pages: None,
        }
    }

    pub fn with_page_resolver(mut self, pages: Arc<dyn PageResolver>) -> Self {
        self.pages = Some(pages);
        self
    }

    /// Resolve every attribute in an authored map, omitting the ones that
    /// fail. Never errors: per-attribute failures are logged and dropped.
    pub async fn resolve_assignments(
        &self,
        attributes: &BTreeMap<String, AttributeValueInput>,
    ) -> Vec<AttributeValueAssignment> {
        let mut assignments = Vec::with_capacity(attributes.len());
        for (name, value) in attributes {
            if let Some(assignment) = self.resolve(name, value).await {
                assignments.push(assignment);
            }
        }
        assignments
    }

    /// Resolve one named value. Returns `None` when the attribute is
    /// unknown, unsupported, or its resolution failed.
    pub async fn resolve(
        &self,
        name: &str,
        value: &AttributeValueInput,
    ) -> Option<AttributeValueAssignment> {
        match self.try_resolve(name, value).await {
            Ok(assignment) => assignment,
            Err(e) => {
                tracing::warn!(
                    attribute = %name,
                    value = ?value,
                    error = %e,
                    "Attribute resolution failed, omitting"
                );
                None
            }
        }
    }

    async fn try_resolve(
        &self,
        name: &str,
        value: &AttributeValueInput,
    ) -> SyncResult<Option<AttributeValueAssignment>> {
        let Some(definition) = self.refs.resolve_attribute(name).await? else {
            tracing::warn!(attribute = %name, "Unknown attribute, omitting");
            return Ok(None);
        };

        let sequence = value.as_sequence();
        let Some(first) = sequence.first() else {
            tracing::warn!(attribute = %name, "Empty attribute value, omitting");
            return Ok(None);
        };

        let Some(input_type) = definition.input_type else {
            tracing::warn!(attribute = %name, "Attribute has no input type, omitting");
            return Ok(None);
        };

        let payload = match input_type {
            AttributeInputType::PlainText => AttributeValuePayload::PlainText(first.as_text()),
            AttributeInputType::Numeric => AttributeValuePayload::Numeric(first.as_text()),
            AttributeInputType::Date => AttributeValuePayload::Date(first.as_text()),
            AttributeInputType::DateTime => AttributeValuePayload::DateTime(first.as_text()),
            AttributeInputType::File => AttributeValuePayload::File(first.as_text()),
            AttributeInputType::Boolean => AttributeValuePayload::Boolean(coerce_bool(first)),
            AttributeInputType::RichText => {
                AttributeValuePayload::RichText(wrap_rich_text(&first.as_text()))
            }
            AttributeInputType::Dropdown | AttributeInputType::Swatch => {
                // Single-valued: keep only the first resolved element
                AttributeValuePayload::Choice(resolve_choice(&definition, &first.as_text()))
            }
            AttributeInputType::Multiselect => {
                let choices = sequence
                    .iter()
                    .map(|v| resolve_choice(&definition, &v.as_text()))
                    .collect();
                AttributeValuePayload::Choices(choices)
            }
            AttributeInputType::Reference => {
                let mut ids = Vec::new();
                for element in &sequence {
                    let raw = element.as_text();
                    match self.resolve_reference(&definition, &raw).await? {
                        Some(id) => ids.push(id),
                        None => tracing::warn!(
                            attribute = %name,
                            value = %raw,
                            "Unresolvable reference, dropping element"
                        ),
                    }
                }
                if ids.is_empty() {
                    // Never emit an empty reference list
                    return Ok(None);
                }
                AttributeValuePayload::References(ids)
            }
        };

        Ok(Some(AttributeValueAssignment {
            attribute_id: definition.id.clone(),
            payload,
        }))
    }

    async fn resolve_reference(
        &self,
        definition: &AttributeDefinition,
        raw: &str,
    ) -> SyncResult<Option<String>> {
        // No declared entity type defaults to entity-name lookup
        let kind = definition
            .entity_type
            .unwrap_or(ReferenceEntityType::Entity);
        match kind {
            ReferenceEntityType::Entity => Ok(self
                .repo
                .get_entity_by_name(raw)
                .await
                .map_err(|e| {
                    crate::error::SyncError::operation(
                        "look up referenced entity",
                        crate::error::RefKind::Entity,
                        raw,
                        e,
                    )
                })?
                .map(|e| e.id)),
            ReferenceEntityType::Variant => Ok(self
                .repo
                .get_variant_by_sku(raw)
                .await
                .map_err(|e| {
                    crate::error::SyncError::operation(
                        "look up referenced variant",
                        crate::error::RefKind::Variant,
                        raw,
                        e,
                    )
                })?
                .map(|v| v.id)),
            ReferenceEntityType::Page => match &self.pages {
                Some(pages) => pages.resolve_page_slug(raw).await,
                None => {
                    tracing::warn!(
                        attribute = %definition.name,
                        value = %raw,
                        "No page resolver injected, dropping page reference"
                    );
                    Ok(None)
                }
            },
        }
    }
}

/// Boolean coercion: `{true,1,yes,y}` / `{false,0,no,n}` case-insensitive,
/// otherwise true iff the value is non-empty.
fn coerce_bool(value: &ScalarValue) -> bool {
    if let ScalarValue::Bool(b) = value {
        return *b;
    }
    let text = value.as_text();
    match text.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "y" => true,
        "false" | "0" | "no" | "n" => false,
        other => !other.is_empty(),
    }
}

/// Resolve one element against the attribute's choice set by exact name or
/// value match (case-sensitive). Unmatched elements fall back to a
/// value-only payload rather than failing.
fn resolve_choice(definition: &AttributeDefinition, raw: &str) -> ResolvedChoice {
    for choice in &definition.choices {
        if choice.name == raw || choice.value.as_deref() == Some(raw) {
            return ResolvedChoice::Id(choice.id.clone());
        }
    }
    tracing::warn!(
        attribute = %definition.name,
        value = %raw,
        "No matching choice, falling back to raw value"
    );
    ResolvedChoice::Value(raw.to_string())
}

/// Order-insensitive comparison of two assignment lists, used to skip
/// redundant writes.
pub(crate) fn same_assignments(
    left: &[AttributeValueAssignment],
    right: &[AttributeValueAssignment],
) -> bool {
    if left.len() != right.len() {
        return false;
    }
    let mut left_sorted: Vec<&AttributeValueAssignment> = left.iter().collect();
    let mut right_sorted: Vec<&AttributeValueAssignment> = right.iter().collect();
    left_sorted.sort_by(|a, b| a.attribute_id.cmp(&b.attribute_id));
    right_sorted.sort_by(|a, b| a.attribute_id.cmp(&b.attribute_id));
    left_sorted == right_sorted
}
