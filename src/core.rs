//! # Core Utilities
//!
//! Small helpers shared by the compiler modules.

use serde::{Deserialize, Serialize};

/// `Kind` allows serde to serialize/deserialize a string or an object.
///
/// Stored templates and issuer records are inconsistent about, for example,
/// logos: some store a bare URL, others an object.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum Kind<T> {
    /// Simple string value
    String(String),

    /// Complex object value
    Object(T),
}

impl<T> Kind<T> {
    /// Resolve to the object form, building it from the string form with `f`.
    pub fn into_object(self, f: impl FnOnce(String) -> T) -> T {
        match self {
            Self::String(s) => f(s),
            Self::Object(o) => o,
        }
    }
}

/// Human-readable label for a claim key, used when a claim has no display
/// entry for the requested locale.
///
/// `family_name` becomes `Family Name`.
#[must_use]
pub fn claim_label(key: &str) -> String {
    key.split(|c: char| c == '_' || c == '-' || c.is_whitespace())
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            chars.next().map_or_else(String::new, |first| {
                first.to_uppercase().collect::<String>() + chars.as_str()
            })
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels() {
        assert_eq!(claim_label("family_name"), "Family Name");
        assert_eq!(claim_label("birth-date"), "Birth Date");
        assert_eq!(claim_label("age_over__18"), "Age Over 18");
        assert_eq!(claim_label("email"), "Email");
    }

    #[test]
    fn kind_into_object() {
        let kind: Kind<(String, bool)> = serde_json::from_str(r#""https://logo""#).unwrap();
        assert_eq!(kind.into_object(|s| (s, false)), ("https://logo".to_string(), false));
    }
}
