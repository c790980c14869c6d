//! # Attribute Schema Validator
//!
//! Decodes the untyped attribute JSON stored with a credential template into
//! [`TemplateAttributes`].
//!
//! Decoding never stops at the first problem. Every problem in the tree is
//! collected, each with a minimal corrective example, so a template author
//! can fix the whole template from one error.
//!
//! Two shapes are accepted:
//!
//! ```json
//! {
//!     "given_name": { "mandatory": true, "value_type": "string" },
//!     "address": {
//!         "mandatory": false,
//!         "value_type": "string",
//!         "display": [{ "name": "Address", "locale": "en" }],
//!         "children": {
//!             "street": { "mandatory": true, "value_type": "string" }
//!         }
//!     }
//! }
//! ```
//!
//! for SD-JWT templates, and a list of namespaces for mdoc templates:
//!
//! ```json
//! [{
//!     "namespace": "org.iso.18013.5.1",
//!     "attributes": {
//!         "family_name": { "mandatory": true, "value_type": "string" }
//!     }
//! }]
//! ```
//!
//! A namespace's `attributes` may also be an array of definitions, each
//! naming its claim with a `key` (or `name`) field.

use indexmap::IndexMap;
use serde_json::{Map, Value};
use tracing::instrument;

use crate::error::{Problem, ShapeError};
use crate::types::{AttributeDefinition, ClaimDisplay, Namespace, TemplateAttributes, ValueType};

const DEFINITION_EXAMPLE: &str = r#"{"mandatory": false, "value_type": "string"}"#;
const ATTRIBUTES_EXAMPLE: &str = r#"{"given_name": {"mandatory": true, "value_type": "string"}}"#;
const NAMESPACE_EXAMPLE: &str = r#"{"namespace": "org.iso.18013.5.1", "attributes": {"family_name": {"mandatory": true, "value_type": "string"}}}"#;
const MANDATORY_EXAMPLE: &str = r#""mandatory": true"#;
const VALUE_TYPE_EXAMPLE: &str = r#""value_type": "string""#;
const DISPLAY_EXAMPLE: &str = r#""display": [{"name": "Given Name", "locale": "en"}]"#;
const DISPLAY_ENTRY_EXAMPLE: &str = r#"{"name": "Given Name", "locale": "en"}"#;

// Keys a child claim cannot use: they would collide with the parent's own
// `display`/`mandatory` in the compiled claims object.
const RESERVED_CHILD_KEYS: [&str; 2] = ["display", "mandatory"];

/// Decode and validate raw template attributes.
///
/// # Errors
///
/// Returns a [`ShapeError`] listing every problem found when the value is not
/// a non-empty object of attribute definitions or a non-empty array of
/// namespaces.
#[instrument(level = "debug", skip_all)]
pub fn validate(raw: &Value) -> Result<TemplateAttributes, ShapeError> {
    tracing::debug!("validate::validate");

    let mut decoder = Decoder::default();
    let attributes = match raw {
        Value::Object(map) => {
            if map.is_empty() {
                decoder.problem("$", "attribute map is empty", ATTRIBUTES_EXAMPLE);
            }
            TemplateAttributes::Flat(decoder.definitions("$", map))
        }
        Value::Array(items) => {
            if items.is_empty() {
                decoder.problem("$", "namespace list is empty", NAMESPACE_EXAMPLE);
            }
            let namespaces = items
                .iter()
                .enumerate()
                .filter_map(|(i, item)| decoder.namespace(&format!("$[{i}]"), item))
                .collect();
            TemplateAttributes::Namespaced(namespaces)
        }
        other => {
            decoder.problem(
                "$",
                &format!(
                    "expected an object of attribute definitions or an array of namespaces, found {}",
                    kind(other)
                ),
                ATTRIBUTES_EXAMPLE,
            );
            TemplateAttributes::Flat(IndexMap::new())
        }
    };

    if decoder.problems.is_empty() {
        Ok(attributes)
    } else {
        Err(ShapeError {
            problems: decoder.problems,
        })
    }
}

#[derive(Default)]
struct Decoder {
    problems: Vec<Problem>,
    namespaces: Vec<String>,
}

impl Decoder {
    fn problem(&mut self, path: &str, message: &str, example: &str) {
        self.problems.push(Problem {
            path: path.to_string(),
            message: message.to_string(),
            example: example.to_string(),
        });
    }

    fn namespace(&mut self, path: &str, value: &Value) -> Option<Namespace> {
        let Value::Object(map) = value else {
            self.problem(
                path,
                &format!("namespace must be an object, found {}", kind(value)),
                NAMESPACE_EXAMPLE,
            );
            return None;
        };

        let name = match map.get("namespace") {
            Some(Value::String(name)) if !name.trim().is_empty() => {
                if self.namespaces.contains(name) {
                    self.problem(
                        &format!("{path}.namespace"),
                        &format!("duplicate namespace `{name}`"),
                        NAMESPACE_EXAMPLE,
                    );
                } else {
                    self.namespaces.push(name.clone());
                }
                name.clone()
            }
            Some(Value::String(_)) => {
                self.problem(&format!("{path}.namespace"), "namespace is empty", NAMESPACE_EXAMPLE);
                String::new()
            }
            Some(other) => {
                self.problem(
                    &format!("{path}.namespace"),
                    &format!("`namespace` must be a string, found {}", kind(other)),
                    NAMESPACE_EXAMPLE,
                );
                String::new()
            }
            None => {
                self.problem(path, "missing `namespace`", NAMESPACE_EXAMPLE);
                String::new()
            }
        };

        let attr_path = format!("{path}.attributes");
        let attributes = match map.get("attributes") {
            Some(Value::Object(attrs)) if !attrs.is_empty() => self.definitions(&attr_path, attrs),
            Some(Value::Array(items)) if !items.is_empty() => {
                self.keyed_definitions(&attr_path, items)
            }
            Some(Value::Object(_) | Value::Array(_)) => {
                self.problem(&attr_path, "namespace has no attributes", NAMESPACE_EXAMPLE);
                IndexMap::new()
            }
            Some(other) => {
                self.problem(
                    &attr_path,
                    &format!("`attributes` must be an object or an array, found {}", kind(other)),
                    NAMESPACE_EXAMPLE,
                );
                IndexMap::new()
            }
            None => {
                self.problem(path, "missing `attributes`", NAMESPACE_EXAMPLE);
                IndexMap::new()
            }
        };

        Some(Namespace { name, attributes })
    }

    fn definitions(
        &mut self, path: &str, map: &Map<String, Value>,
    ) -> IndexMap<String, AttributeDefinition> {
        map.iter()
            .filter_map(|(key, value)| {
                let def = self.definition(&format!("{path}.{key}"), value)?;
                Some((key.clone(), def))
            })
            .collect()
    }

    // Array form of namespace attributes: each entry names its own claim.
    fn keyed_definitions(
        &mut self, path: &str, items: &[Value],
    ) -> IndexMap<String, AttributeDefinition> {
        let mut defs = IndexMap::new();

        for (i, item) in items.iter().enumerate() {
            let item_path = format!("{path}[{i}]");
            let key = item
                .get("key")
                .or_else(|| item.get("name"))
                .and_then(Value::as_str)
                .filter(|key| !key.trim().is_empty());

            let Some(key) = key else {
                self.problem(
                    &item_path,
                    "attribute entry needs a non-empty `key`",
                    r#"{"key": "family_name", "mandatory": true, "value_type": "string"}"#,
                );
                continue;
            };
            if defs.contains_key(key) {
                self.problem(
                    &item_path,
                    &format!("duplicate attribute `{key}`"),
                    DEFINITION_EXAMPLE,
                );
                continue;
            }
            if let Some(def) = self.definition(&item_path, item) {
                defs.insert(key.to_string(), def);
            }
        }

        defs
    }

    fn definition(&mut self, path: &str, value: &Value) -> Option<AttributeDefinition> {
        let Value::Object(map) = value else {
            self.problem(
                path,
                &format!("attribute definition must be an object, found {}", kind(value)),
                DEFINITION_EXAMPLE,
            );
            return None;
        };
        let before = self.problems.len();

        let mandatory = match map.get("mandatory") {
            Some(Value::Bool(b)) => *b,
            Some(other) => {
                self.problem(
                    &format!("{path}.mandatory"),
                    &format!("`mandatory` must be a boolean, found {}", kind(other)),
                    MANDATORY_EXAMPLE,
                );
                false
            }
            None => {
                self.problem(path, "missing `mandatory` (boolean)", MANDATORY_EXAMPLE);
                false
            }
        };

        let value_type = match map.get("value_type") {
            Some(Value::String(s)) => s.parse::<ValueType>().map_or_else(
                |_| {
                    let allowed =
                        ValueType::ALL.iter().map(|vt| vt.as_str()).collect::<Vec<_>>().join(", ");
                    self.problem(
                        &format!("{path}.value_type"),
                        &format!("unsupported `value_type` \"{s}\", expected one of: {allowed}"),
                        VALUE_TYPE_EXAMPLE,
                    );
                    None
                },
                Some,
            ),
            Some(other) => {
                self.problem(
                    &format!("{path}.value_type"),
                    &format!("`value_type` must be a string, found {}", kind(other)),
                    VALUE_TYPE_EXAMPLE,
                );
                None
            }
            None => {
                self.problem(path, "missing `value_type` (string)", VALUE_TYPE_EXAMPLE);
                None
            }
        };

        let display = match map.get("display") {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Array(entries)) => self.display(&format!("{path}.display"), entries),
            Some(other) => {
                self.problem(
                    &format!("{path}.display"),
                    &format!("`display` must be an array, found {}", kind(other)),
                    DISPLAY_EXAMPLE,
                );
                Vec::new()
            }
        };

        let children = match map.get("children") {
            None | Some(Value::Null) => None,
            Some(Value::Object(children)) if children.is_empty() => None,
            Some(Value::Object(children)) => {
                let children_path = format!("{path}.children");
                for key in children.keys() {
                    if RESERVED_CHILD_KEYS.contains(&key.as_str()) {
                        self.problem(
                            &format!("{children_path}.{key}"),
                            &format!("`{key}` is reserved and cannot name a child attribute"),
                            r#""children": {"street": {"mandatory": true, "value_type": "string"}}"#,
                        );
                    }
                }
                Some(self.definitions(&children_path, children))
            }
            Some(other) => {
                self.problem(
                    &format!("{path}.children"),
                    &format!("`children` must be an object, found {}", kind(other)),
                    r#""children": {"street": {"mandatory": true, "value_type": "string"}}"#,
                );
                None
            }
        };

        if self.problems.len() > before {
            return None;
        }
        Some(AttributeDefinition {
            mandatory,
            value_type: value_type?,
            display,
            children,
        })
    }

    fn display(&mut self, path: &str, entries: &[Value]) -> Vec<ClaimDisplay> {
        let mut display = Vec::with_capacity(entries.len());

        for (i, entry) in entries.iter().enumerate() {
            let name = entry.get("name").and_then(Value::as_str);
            let locale = entry.get("locale").and_then(Value::as_str);

            match (name, locale) {
                (Some(name), Some(locale)) => display.push(ClaimDisplay {
                    name: name.to_string(),
                    locale: locale.to_string(),
                }),
                _ => self.problem(
                    &format!("{path}[{i}]"),
                    "display entry must be an object with string `name` and `locale`",
                    DISPLAY_ENTRY_EXAMPLE,
                ),
            }
        }

        display
    }
}

const fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
