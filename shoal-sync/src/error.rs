//! Reconciliation error types
//!
//! The repository surfaces remote errors verbatim; wrapping them with
//! business context (operation, kind, identifier) happens here and only
//! here.

use thiserror::Error;

use crate::repository::RepoError;

/// Kind of remote reference being resolved or operated on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RefKind {
    EntityType,
    Category,
    Channel,
    Attribute,
    Entity,
    Variant,
    Media,
    Page,
}

impl RefKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RefKind::EntityType => "entity type",
            RefKind::Category => "category",
            RefKind::Channel => "channel",
            RefKind::Attribute => "attribute",
            RefKind::Entity => "entity",
            RefKind::Variant => "variant",
            RefKind::Media => "media",
            RefKind::Page => "page",
        }
    }
}

impl std::fmt::Display for RefKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One captured per-entity failure in a batch run
#[derive(Debug, Clone)]
pub struct BatchFailure {
    /// Entity label (slug)
    pub label: String,
    pub message: String,
}

/// Reconciliation error
#[derive(Debug, Error)]
pub enum SyncError {
    /// A named reference could not be resolved
    #[error("{}", not_found_message(kind, key, suggestions))]
    NotFound {
        kind: RefKind,
        key: String,
        /// Human-readable remediation hints
        suggestions: Vec<String>,
    },

    /// A repository operation failed; the verbatim remote error is the source
    #[error("failed to {op} for {kind} \"{label}\": {source}")]
    Operation {
        op: String,
        kind: RefKind,
        label: String,
        #[source]
        source: RepoError,
    },

    /// Aggregate batch failure; successes in the same batch stay committed
    #[error("{}", batch_message(failures, *total))]
    Batch {
        failures: Vec<BatchFailure>,
        total: usize,
    },
}

impl SyncError {
    pub fn not_found(kind: RefKind, key: impl Into<String>) -> Self {
        SyncError::NotFound {
            kind,
            key: key.into(),
            suggestions: Vec::new(),
        }
    }

    pub fn not_found_with(
        kind: RefKind,
        key: impl Into<String>,
        suggestions: Vec<String>,
    ) -> Self {
        SyncError::NotFound {
            kind,
            key: key.into(),
            suggestions,
        }
    }

    pub fn operation(
        op: impl Into<String>,
        kind: RefKind,
        label: impl Into<String>,
        source: RepoError,
    ) -> Self {
        SyncError::Operation {
            op: op.into(),
            kind,
            label: label.into(),
            source,
        }
    }

    /// Machine-readable error code
    pub fn code(&self) -> &'static str {
        match self {
            SyncError::NotFound { .. } => "NOT_FOUND",
            SyncError::Operation { .. } => "OPERATION_FAILED",
            SyncError::Batch { .. } => "BATCH_FAILED",
        }
    }

    /// Remediation suggestions, when the error carries any
    pub fn suggestions(&self) -> &[String] {
        match self {
            SyncError::NotFound { suggestions, .. } => suggestions,
            _ => &[],
        }
    }
}

fn not_found_message(kind: &RefKind, key: &str, suggestions: &[String]) -> String {
    let mut msg = format!("{kind} \"{key}\" not found");
    if !suggestions.is_empty() {
        msg.push_str(" (");
        msg.push_str(&suggestions.join("; "));
        msg.push(')');
    }
    msg
}

fn batch_message(failures: &[BatchFailure], total: usize) -> String {
    let lines: Vec<String> = failures
        .iter()
        .map(|f| format!("{}: {}", f.label, f.message))
        .collect();
    format!(
        "bootstrap failed for {} of {} entities: {}",
        failures.len(),
        total,
        lines.join("; ")
    )
}

/// Result type for reconciliation operations
pub type SyncResult<T> = Result<T, SyncError>;
