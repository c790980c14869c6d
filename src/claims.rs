//! # Claims Tree Builder
//!
//! Converts decoded template attributes into the `claims` object of a
//! credential configuration, and checks credential payloads against the same
//! attribute tree.
//!
//! SD-JWT attributes produce a flat claims object. mdoc attributes produce
//! one claims object per namespace, keyed by namespace name:
//!
//! ```json
//! {
//!     "org.iso.18013.5.1": {
//!         "family_name": {
//!             "display": [{ "name": "Family Name", "locale": "en" }],
//!             "mandatory": true
//!         }
//!     }
//! }
//! ```
//!
//! Child attributes are merged directly under their parent's key.

use indexmap::IndexMap;
use serde_json::{Map, Value};

use crate::types::{AttributeDefinition, ClaimNode, ClaimsTree, TemplateAttributes};

/// Build the claims tree for decoded template attributes.
///
/// Claim and namespace order follows the template.
#[must_use]
pub fn build(attributes: &TemplateAttributes) -> ClaimsTree {
    match attributes {
        TemplateAttributes::Flat(attrs) => ClaimsTree::Flat(nodes(attrs)),
        TemplateAttributes::Namespaced(namespaces) => ClaimsTree::Namespaced(
            namespaces.iter().map(|ns| (ns.name.clone(), nodes(&ns.attributes))).collect(),
        ),
    }
}

fn nodes(attrs: &IndexMap<String, AttributeDefinition>) -> IndexMap<String, ClaimNode> {
    attrs.iter().map(|(key, def)| (key.clone(), node(def))).collect()
}

fn node(def: &AttributeDefinition) -> ClaimNode {
    ClaimNode {
        display: def.display.clone(),
        mandatory: def.mandatory,
        children: def.children.as_ref().map(nodes).unwrap_or_default(),
    }
}

/// Mandatory claims that are absent, `null`, or blank strings in `payload`.
///
/// mdoc claims may be supplied at the top level of the payload or under
/// their namespace. When a present claim is an object and its attribute has
/// children, mandatory children are checked too and reported by dotted path.
#[must_use]
pub fn missing_mandatory(
    attributes: &TemplateAttributes, payload: &Map<String, Value>,
) -> Vec<String> {
    let mut missing = Vec::new();

    match attributes {
        TemplateAttributes::Flat(attrs) => {
            for (key, def) in attrs {
                check_mandatory(key, def, payload.get(key), &mut missing);
            }
        }
        TemplateAttributes::Namespaced(namespaces) => {
            for ns in namespaces {
                let scoped = payload.get(&ns.name).and_then(Value::as_object);
                for (key, def) in &ns.attributes {
                    let value = scoped.and_then(|obj| obj.get(key)).or_else(|| payload.get(key));
                    check_mandatory(key, def, value, &mut missing);
                }
            }
        }
    }

    missing
}

fn check_mandatory(
    path: &str, def: &AttributeDefinition, value: Option<&Value>, missing: &mut Vec<String>,
) {
    if def.mandatory && is_blank(value) {
        missing.push(path.to_string());
        return;
    }
    if let (Some(children), Some(Value::Object(obj))) = (&def.children, value) {
        for (key, child) in children {
            check_mandatory(&format!("{path}.{key}"), child, obj.get(key), missing);
        }
    }
}

fn is_blank(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.trim().is_empty(),
        Some(_) => false,
    }
}

/// Payload keys the template's attributes do not declare, as dotted paths.
///
/// Object values are only descended into when their attribute declares
/// children. For mdoc, a key naming a namespace is accepted when its value is
/// an object whose own keys belong to that namespace.
#[must_use]
pub fn undeclared_keys(
    attributes: &TemplateAttributes, payload: &Map<String, Value>,
) -> Vec<String> {
    let mut undeclared = Vec::new();

    for (key, value) in payload {
        if let (Some(ns), Some(obj)) = (attributes.namespace(key), value.as_object()) {
            for (claim, claim_value) in obj {
                let path = format!("{key}.{claim}");
                match ns.attributes.get(claim) {
                    Some(def) => check_declared(&path, def, claim_value, &mut undeclared),
                    None => undeclared.push(path),
                }
            }
            continue;
        }
        match attributes.get(key) {
            Some(def) => check_declared(key, def, value, &mut undeclared),
            None => undeclared.push(key.clone()),
        }
    }

    undeclared
}

fn check_declared(
    path: &str, def: &AttributeDefinition, value: &Value, undeclared: &mut Vec<String>,
) {
    let (Some(children), Value::Object(obj)) = (&def.children, value) else {
        return;
    };
    for (key, child_value) in obj {
        let child_path = format!("{path}.{key}");
        match children.get(key) {
            Some(child) => check_declared(&child_path, child, child_value, undeclared),
            None => undeclared.push(child_path),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::validate::validate;

    fn mdl() -> TemplateAttributes {
        validate(&json!([{
            "namespace": "org.iso.18013.5.1",
            "attributes": {
                "family_name": {
                    "mandatory": true,
                    "value_type": "string",
                    "display": [{"name": "Family Name", "locale": "en"}]
                },
                "given_name": {"mandatory": false, "value_type": "string"}
            }
        }]))
        .expect("should be valid")
    }

    fn employee() -> TemplateAttributes {
        validate(&json!({
            "name": {"mandatory": true, "value_type": "string"},
            "email": {"mandatory": false, "value_type": "string"},
            "address": {
                "mandatory": false,
                "value_type": "string",
                "children": {
                    "street": {"mandatory": true, "value_type": "string"},
                    "locality": {"mandatory": false, "value_type": "string"}
                }
            }
        }))
        .expect("should be valid")
    }

    #[test]
    fn namespaced_tree() {
        let tree = build(&mdl());
        assert_eq!(
            serde_json::to_value(&tree).expect("should serialize"),
            json!({
                "org.iso.18013.5.1": {
                    "family_name": {
                        "display": [{"name": "Family Name", "locale": "en"}],
                        "mandatory": true
                    },
                    "given_name": {}
                }
            })
        );
        assert!(tree.namespace("org.iso.18013.5.1").is_some_and(|ns| ns["family_name"].mandatory));
    }

    #[test]
    fn flat_tree_merges_children() {
        let tree = build(&employee());
        assert_eq!(
            serde_json::to_value(&tree).expect("should serialize"),
            json!({
                "name": {"mandatory": true},
                "email": {},
                "address": {
                    "street": {"mandatory": true},
                    "locality": {}
                }
            })
        );
        assert!(tree.get("address").is_some_and(|node| node.children["street"].mandatory));
    }

    #[test]
    fn deterministic() {
        let first = serde_json::to_string(&build(&employee())).expect("should serialize");
        let second = serde_json::to_string(&build(&employee())).expect("should serialize");
        assert_eq!(first, second);
    }

    #[test]
    fn mandatory_checks() {
        let attrs = employee();

        let payload = json!({"name": "  ", "address": {"locality": "Auckland"}});
        let missing = missing_mandatory(&attrs, payload.as_object().expect("object"));
        assert_eq!(missing, ["name", "address.street"]);

        // absent optional parent does not require its mandatory children
        let payload = json!({"name": "Alice"});
        assert!(missing_mandatory(&attrs, payload.as_object().expect("object")).is_empty());
    }

    #[test]
    fn mandatory_namespaced_payload() {
        let attrs = mdl();

        let flat = json!({"family_name": "Doe"});
        assert!(missing_mandatory(&attrs, flat.as_object().expect("object")).is_empty());

        let scoped = json!({"org.iso.18013.5.1": {"family_name": "Doe"}});
        assert!(missing_mandatory(&attrs, scoped.as_object().expect("object")).is_empty());

        let empty = json!({});
        assert_eq!(missing_mandatory(&attrs, empty.as_object().expect("object")), ["family_name"]);
    }

    #[test]
    fn undeclared() {
        let attrs = employee();
        let payload = json!({
            "name": "Alice",
            "nickname": "Al",
            "address": {"street": "1 Queen St", "postcode": "1010"}
        });
        assert_eq!(
            undeclared_keys(&attrs, payload.as_object().expect("object")),
            ["nickname", "address.postcode"]
        );

        let attrs = mdl();
        let payload = json!({
            "given_name": "Jane",
            "org.iso.18013.5.1": {"family_name": "Doe", "height": 170}
        });
        assert_eq!(
            undeclared_keys(&attrs, payload.as_object().expect("object")),
            ["org.iso.18013.5.1.height"]
        );
    }
}
