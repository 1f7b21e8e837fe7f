//! Attribute Model
//!
//! The remote service exposes a strongly-typed, polymorphic attribute value
//! model; the declarative catalog side is loosely typed (scalars or lists of
//! scalars). `AttributeValuePayload` is the resolved, remote-shaped side;
//! `AttributeValueInput` is the authored side.

use serde::{Deserialize, Serialize};

/// Attribute definition as exposed by the remote service (read-only here)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttributeDefinition {
    pub id: String,
    pub name: String,
    pub input_type: Option<AttributeInputType>,
    /// For `Reference` attributes: which entity kind is referenced
    pub entity_type: Option<ReferenceEntityType>,
    /// Known choices (dropdown / multiselect / swatch)
    #[serde(default)]
    pub choices: Vec<AttributeChoice>,
}

/// Remote attribute input kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AttributeInputType {
    PlainText,
    Numeric,
    Boolean,
    Date,
    DateTime,
    RichText,
    File,
    Dropdown,
    Multiselect,
    Swatch,
    Reference,
}

impl AttributeInputType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AttributeInputType::PlainText => "PLAIN_TEXT",
            AttributeInputType::Numeric => "NUMERIC",
            AttributeInputType::Boolean => "BOOLEAN",
            AttributeInputType::Date => "DATE",
            AttributeInputType::DateTime => "DATE_TIME",
            AttributeInputType::RichText => "RICH_TEXT",
            AttributeInputType::File => "FILE",
            AttributeInputType::Dropdown => "DROPDOWN",
            AttributeInputType::Multiselect => "MULTISELECT",
            AttributeInputType::Swatch => "SWATCH",
            AttributeInputType::Reference => "REFERENCE",
        }
    }
}

impl std::fmt::Display for AttributeInputType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Entity kind referenced by a `Reference` attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReferenceEntityType {
    /// Referenced by entity name
    Entity,
    /// Referenced by variant SKU
    Variant,
    /// Referenced by page slug (resolved through an injected resolver)
    Page,
}

/// A single selectable choice on a choice-based attribute
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttributeChoice {
    pub id: String,
    pub name: String,
    pub value: Option<String>,
}

/// Authored scalar value (string, number or boolean)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ScalarValue {
    Bool(bool),
    Number(f64),
    Text(String),
}

impl ScalarValue {
    /// String representation of the scalar (numbers keep their shortest
    /// form, so `42.0` renders as `"42"`)
    pub fn as_text(&self) -> String {
        match self {
            ScalarValue::Bool(b) => b.to_string(),
            ScalarValue::Number(n) => format!("{n}"),
            ScalarValue::Text(s) => s.clone(),
        }
    }
}

/// Authored attribute value: a scalar or a list of scalars
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValueInput {
    Scalar(ScalarValue),
    Many(Vec<ScalarValue>),
}

impl AttributeValueInput {
    /// Normalize to a sequence: scalars become a one-element list
    pub fn as_sequence(&self) -> Vec<&ScalarValue> {
        match self {
            AttributeValueInput::Scalar(v) => vec![v],
            AttributeValueInput::Many(vs) => vs.iter().collect(),
        }
    }
}

/// A choice element after resolution against the attribute's choice set:
/// either a known choice ID or the raw value fallback
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ResolvedChoice {
    Id(String),
    Value(String),
}

/// Resolved attribute value payload, shaped per input type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "kind", content = "value")]
pub enum AttributeValuePayload {
    PlainText(String),
    /// Numeric values travel as strings on the wire
    Numeric(String),
    Boolean(bool),
    /// ISO date (YYYY-MM-DD)
    Date(String),
    /// ISO date-time
    DateTime(String),
    /// Structured rich-text envelope, serialized JSON
    RichText(String),
    /// File URL
    File(String),
    /// Single choice (dropdown / swatch)
    Choice(ResolvedChoice),
    /// Multiple choices (multiselect)
    Choices(Vec<ResolvedChoice>),
    /// Remote IDs of referenced entities
    References(Vec<String>),
}

/// An attribute ID paired with exactly one typed payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttributeValueAssignment {
    pub attribute_id: String,
    pub payload: AttributeValuePayload,
}
