//! Media Model
//!
//! The remote service rewrites storage URLs on upload, so the originally
//! authored URL is persisted as recoverable metadata under
//! [`SOURCE_URL_KEY`] and used for content comparison on later runs.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Metadata key under which the authored source URL is stored on created media
pub const SOURCE_URL_KEY: &str = "source_url";

/// Media item as stored by the remote service (always has an `id`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaItem {
    pub id: String,
    /// Stored URL, possibly rewritten by the remote service
    pub url: String,
    pub alt: Option<String>,
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
}

impl MediaItem {
    /// Original authored URL, when the remote service recorded it
    pub fn source_url(&self) -> Option<&str> {
        self.metadata.get(SOURCE_URL_KEY).map(String::as_str)
    }
}

/// Authored media item (no `id` yet)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaInput {
    pub url: String,
    pub alt: Option<String>,
}

/// Create payload for one media item
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaCreate {
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alt: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: BTreeMap<String, String>,
}

impl MediaCreate {
    /// Build a create payload that records `url` as the recoverable source
    pub fn with_source(url: impl Into<String>, alt: Option<String>) -> Self {
        let url = url.into();
        let mut metadata = BTreeMap::new();
        metadata.insert(SOURCE_URL_KEY.to_string(), url.clone());
        Self {
            url,
            alt,
            metadata,
        }
    }
}
