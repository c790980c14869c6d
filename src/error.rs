//! # Compiler Errors
//!
//! This module defines the errors returned while compiling credential
//! templates into issuer metadata and credential offers.
//!
//! Every error is a local, deterministic validation failure. Errors render as
//! an `OpenID`-style object (`error` + `error_description`) so the service
//! layer can pass them on to clients unchanged.

use std::fmt::{self, Display};

use serde::{Serialize, Serializer};
use thiserror::Error;

/// Errors raised by the template and offer compiler.
#[derive(Error, Clone, Debug, PartialEq, Eq)]
pub enum Error {
    /// The template's attribute JSON does not have the expected shape.
    #[error("{0}")]
    Shape(#[from] ShapeError),

    /// The template's `format` is not one of the supported credential formats.
    #[error("template `{template}` has unsupported credential format `{format}`")]
    UnsupportedFormat {
        /// Name of the offending template.
        template: String,

        /// The format string as stored.
        format: String,
    },

    /// The template lacks the `vct` (SD-JWT) or `doctype` (mdoc) its format
    /// requires.
    #[error("template `{template}` has no `{field}` value")]
    MissingCredentialType {
        /// Name of the offending template.
        template: String,

        /// The missing field: `vct` or `doctype`.
        field: &'static str,
    },

    /// The request names no credentials.
    #[error("request must name at least one credential")]
    NoCredentials,

    /// One or more requested template ids were not found.
    #[error("unknown template id(s): {}", .0.join(", "))]
    UnknownTemplate(Vec<String>),

    /// One or more mandatory claims are absent or empty.
    #[error("missing mandatory claim(s): {}", join(.0))]
    MissingMandatoryClaim(Vec<MissingClaims>),

    /// An update payload contains keys not declared by its template.
    #[error("undeclared attribute key(s): {}", join(.0))]
    InvalidAttributeKey(Vec<InvalidKeys>),

    /// The request did not carry exactly one flow configuration.
    #[error("{0}")]
    FlowConfigXorViolation(XorViolation),

    /// The issuer record is unusable.
    #[error("invalid issuer: {0}")]
    InvalidIssuer(String),

    /// Two templates compile to the same credential configuration id.
    #[error("credential configuration `{0}` is produced by more than one template")]
    DuplicateConfigKey(String),
}

impl Error {
    /// The `error` code used in serialized error responses.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Shape(_) => "invalid_template_attributes",
            Self::UnsupportedFormat { .. } => "unsupported_credential_format",
            Self::MissingCredentialType { .. } => "invalid_template",
            Self::NoCredentials => "invalid_request",
            Self::UnknownTemplate(_) => "unknown_template",
            Self::MissingMandatoryClaim(_) => "missing_mandatory_claim",
            Self::InvalidAttributeKey(_) => "invalid_attribute_key",
            Self::FlowConfigXorViolation(_) => "invalid_flow_config",
            Self::InvalidIssuer(_) => "invalid_issuer",
            Self::DuplicateConfigKey(_) => "duplicate_credential_configuration",
        }
    }

    /// Transform the error into an `OpenID`-style JSON object.
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

/// Error response body.
#[derive(Serialize)]
struct ErrorResponse<'a> {
    error: &'a str,
    error_description: String,
}

impl Serialize for Error {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        ErrorResponse {
            error: self.code(),
            error_description: self.to_string(),
        }
        .serialize(serializer)
    }
}

/// Every problem found while decoding template attributes.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ShapeError {
    /// Problems in the order they were found.
    pub problems: Vec<Problem>,
}

impl Display for ShapeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "found {} problem(s) in template attributes", self.problems.len())?;
        for problem in &self.problems {
            write!(f, "; {problem}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ShapeError {}

/// A single attribute-shape problem and an example of how to fix it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Problem {
    /// JSON path of the offending value, e.g. `$.address.children.street`.
    pub path: String,

    /// What is wrong.
    pub message: String,

    /// A minimal, valid JSON fragment for the offending value.
    pub example: String,
}

impl Display for Problem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} (e.g. {})", self.path, self.message, self.example)
    }
}

/// Mandatory claims missing from one credential request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MissingClaims {
    /// Template the request refers to.
    pub template_id: String,

    /// Dotted claim paths, e.g. `family_name` or `address.street`.
    pub claims: Vec<String>,
}

impl Display for MissingClaims {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "template `{}` requires [{}]", self.template_id, self.claims.join(", "))
    }
}

/// Payload keys one credential request declares that its template does not.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InvalidKeys {
    /// Template the request refers to.
    pub template_id: String,

    /// Dotted key paths not present in the template's attributes.
    pub keys: Vec<String>,
}

impl Display for InvalidKeys {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "template `{}` does not declare [{}]", self.template_id, self.keys.join(", "))
    }
}

/// How a request violated the one-flow-configuration rule.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum XorViolation {
    /// Both flow configurations were supplied.
    Both,

    /// Neither flow configuration was supplied.
    Neither,
}

impl Display for XorViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let found = match self {
            Self::Both => "both",
            Self::Neither => "neither",
        };
        write!(
            f,
            "exactly one of `preAuthorizedCodeFlowConfig` or `authorizationCodeFlowConfig` \
             must be provided, found {found}"
        )
    }
}

fn join<T: Display>(items: &[T]) -> String {
    items.iter().map(ToString::to_string).collect::<Vec<_>>().join("; ")
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn err_json() {
        let err = Error::UnknownTemplate(vec!["t1".into(), "t2".into()]);
        assert_eq!(
            err.to_json(),
            json!({"error": "unknown_template", "error_description": "unknown template id(s): t1, t2"})
        );
    }

    // Shape errors list every problem with its example.
    #[test]
    fn shape_display() {
        let err = ShapeError {
            problems: vec![
                Problem {
                    path: "$.name.mandatory".into(),
                    message: "missing `mandatory`".into(),
                    example: r#""mandatory": true"#.into(),
                },
                Problem {
                    path: "$.name.value_type".into(),
                    message: "missing `value_type`".into(),
                    example: r#""value_type": "string""#.into(),
                },
            ],
        };

        let msg = Error::from(err).to_string();
        assert!(msg.starts_with("found 2 problem(s)"));
        assert!(msg.contains("$.name.mandatory: missing `mandatory`"));
        assert!(msg.contains(r#"(e.g. "value_type": "string")"#));
    }

    #[test]
    fn missing_claims_display() {
        let err = Error::MissingMandatoryClaim(vec![MissingClaims {
            template_id: "t1".into(),
            claims: vec!["family_name".into(), "address.street".into()],
        }]);
        assert_eq!(
            err.to_string(),
            "missing mandatory claim(s): template `t1` requires [family_name, address.street]"
        );
    }
}
