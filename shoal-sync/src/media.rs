//! Media reconciliation
//!
//! The remote service rewrites storage URLs on upload, so literal URL
//! comparison is useless for idempotence. A rewrite-resistant fingerprint
//! restores a stable identity: remote-rewritten URLs compare by the
//! embedded media ID, external URLs by host plus filename. Media is only
//! rewritten remotely when the fingerprinted content actually differs.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use url::Url;

use shoal_core::{CatalogEntity, MediaCreate, MediaInput, MediaItem};

use crate::error::{RefKind, SyncError, SyncResult};
use crate::repository::CatalogRepository;

/// Derive a rewrite-resistant identity string from a media URL.
///
/// - remote-rewritten URLs (`.../thumbnail/<id>/...`): `remote:<id>`
/// - parseable external URLs: `external:<lowercased host>:<filename>`
///   (filename case preserved)
/// - unparseable input: `raw:<lowercased url>`
pub fn extract_fingerprint(url: &str) -> String {
    if let Some(id) = remote_media_id(url) {
        return format!("remote:{id}");
    }
    match Url::parse(url) {
        Ok(parsed) => {
            let host = parsed.host_str().unwrap_or_default().to_lowercase();
            let filename = parsed
                .path_segments()
                .and_then(|segments| segments.filter(|s| !s.is_empty()).next_back())
                .unwrap_or_default();
            format!("external:{host}:{filename}")
        }
        Err(_) => format!("raw:{}", url.to_lowercase()),
    }
}

/// Media ID embedded in the remote service's rewritten URL pattern
fn remote_media_id(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    let segments: Vec<&str> = parsed.path_segments()?.filter(|s| !s.is_empty()).collect();
    let idx = segments.iter().position(|s| *s == "thumbnail")?;
    segments.get(idx + 1).map(|s| (*s).to_string())
}

fn normalize_alt(alt: Option<&str>) -> Option<String> {
    alt.map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Whether the desired media list is content-equivalent to the existing
/// remote media. Existing items compare by their recovered source URL when
/// the remote service recorded one, else by the stored URL.
pub fn media_equivalent(desired: &[MediaInput], existing: &[MediaItem]) -> bool {
    if desired.len() != existing.len() {
        return false;
    }
    if desired.is_empty() {
        return true;
    }
    let wanted: HashMap<String, Option<String>> = desired
        .iter()
        .map(|m| {
            (
                extract_fingerprint(m.url.trim()),
                normalize_alt(m.alt.as_deref()),
            )
        })
        .collect();
    for item in existing {
        let compare_url = item.source_url().unwrap_or(&item.url);
        let fingerprint = extract_fingerprint(compare_url);
        match wanted.get(&fingerprint) {
            Some(alt) if *alt == normalize_alt(item.alt.as_deref()) => {}
            _ => return false,
        }
    }
    true
}

/// Drop empty URLs, trim, and deduplicate by trimmed URL keeping the first
/// occurrence's alt text.
pub(crate) fn dedup_media(desired: &[MediaInput]) -> Vec<MediaInput> {
    let mut seen = HashSet::new();
    let mut wanted = Vec::new();
    for item in desired {
        let url = item.url.trim();
        if url.is_empty() {
            continue;
        }
        if seen.insert(url.to_string()) {
            wanted.push(MediaInput {
                url: url.to_string(),
                alt: item.alt.clone(),
            });
        }
    }
    wanted
}

pub struct MediaReconciler {
    repo: Arc<dyn CatalogRepository>,
}

impl MediaReconciler {
    pub fn new(repo: Arc<dyn CatalogRepository>) -> Self {
        Self { repo }
    }

    /// Converge the entity's remote media to the desired list. No write is
    /// issued when the current media is already content-equivalent.
    pub async fn sync(
        &self,
        entity: &CatalogEntity,
        desired: &[MediaInput],
    ) -> SyncResult<Vec<MediaItem>> {
        let wanted = dedup_media(desired);

        let current = self
            .repo
            .list_media(&entity.id)
            .await
            .map_err(|e| SyncError::operation("list media", RefKind::Media, &entity.slug, e))?;

        if media_equivalent(&wanted, &current) {
            tracing::debug!(entity = %entity.slug, "Media already up to date, skipping");
            return Ok(current);
        }

        let creates: Vec<MediaCreate> = wanted
            .iter()
            .map(|m| MediaCreate::with_source(&m.url, m.alt.clone()))
            .collect();
        let replaced = self
            .repo
            .replace_all_media(&entity.id, creates)
            .await
            .map_err(|e| SyncError::operation("replace media", RefKind::Media, &entity.slug, e))?;

        tracing::info!(
            entity = %entity.slug,
            previous = current.len(),
            current = replaced.len(),
            "Replaced entity media"
        );
        Ok(replaced)
    }
}
