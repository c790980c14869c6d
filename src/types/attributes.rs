use std::fmt;
use std::str::FromStr;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ShapeError;

/// Decoded template attributes.
///
/// SD-JWT templates hold a flat map of claim definitions; mdoc templates
/// group their claim definitions by namespace.
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum TemplateAttributes {
    /// Claim definitions keyed by claim name.
    Flat(IndexMap<String, AttributeDefinition>),

    /// Claim definitions grouped by namespace, in template order.
    Namespaced(Vec<Namespace>),
}

impl TemplateAttributes {
    /// Returns `true` for namespaced (mdoc) attributes.
    #[must_use]
    pub const fn is_namespaced(&self) -> bool {
        matches!(self, Self::Namespaced(_))
    }

    /// Find the definition of a top-level claim. For namespaced attributes
    /// every namespace is searched in order.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&AttributeDefinition> {
        match self {
            Self::Flat(attrs) => attrs.get(key),
            Self::Namespaced(namespaces) => {
                namespaces.iter().find_map(|ns| ns.attributes.get(key))
            }
        }
    }

    /// Find a namespace by name.
    #[must_use]
    pub fn namespace(&self, name: &str) -> Option<&Namespace> {
        match self {
            Self::Flat(_) => None,
            Self::Namespaced(namespaces) => namespaces.iter().find(|ns| ns.name == name),
        }
    }
}

impl TryFrom<&Value> for TemplateAttributes {
    type Error = ShapeError;

    fn try_from(value: &Value) -> Result<Self, Self::Error> {
        crate::validate::validate(value)
    }
}

/// A group of mdoc claim definitions.
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct Namespace {
    /// Namespace identifier, e.g. `org.iso.18013.5.1`.
    #[serde(rename = "namespace")]
    pub name: String,

    /// Claim definitions keyed by claim name.
    pub attributes: IndexMap<String, AttributeDefinition>,
}

/// Definition of a single claim.
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct AttributeDefinition {
    /// Whether the claim must be supplied when issuing.
    pub mandatory: bool,

    /// Type of the claim value.
    pub value_type: ValueType,

    /// Localized claim names.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub display: Vec<ClaimDisplay>,

    /// Nested claim definitions for object-valued claims.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub children: Option<IndexMap<String, AttributeDefinition>>,
}

/// Supported claim value types.
#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    /// Text.
    String,

    /// Calendar date.
    Date,

    /// Any number.
    Number,

    /// `true` or `false`.
    Boolean,

    /// Whole number.
    Integer,
}

impl ValueType {
    /// Every supported value type, in the order used in diagnostics.
    pub const ALL: [Self; 5] =
        [Self::String, Self::Date, Self::Number, Self::Boolean, Self::Integer];

    /// The type's name as stored in templates.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Date => "date",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::Integer => "integer",
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ValueType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|vt| vt.as_str() == s)
            .ok_or_else(|| format!("unsupported value type `{s}`"))
    }
}

/// Localized claim name.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct ClaimDisplay {
    /// Claim name for the locale.
    pub name: String,

    /// BCP47 language tag.
    pub locale: String,
}
