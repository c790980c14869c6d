use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::core::{Kind, claim_label};
use crate::types::{ClaimDisplay, Image};

/// The Credential Issuer metadata document handed to the issuing agent.
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct IssuerMetadata {
    /// Credential Issuer display properties for supported languages.
    pub display: Vec<IssuerDisplay>,

    /// JWS algorithms supported for DPoP proofs.
    pub dpop_signing_alg_values_supported: Vec<String>,

    /// Credential configurations keyed by credential configuration id
    /// (`<template name>-<format suffix>`). Credential Offers refer to these
    /// entries by the same id.
    pub credential_configurations_supported: IndexMap<String, CredentialConfiguration>,

    /// Information about the Issuer's support for batch issuance.
    pub batch_credential_issuance: BatchCredentialIssuance,
}

/// Contains information about the Credential Issuer's support for batch
/// issuance of Credentials on the Credential Endpoint.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct BatchCredentialIssuance {
    /// The maximum array size for the proofs parameter in a Credential
    /// Request. Zero when the issuer has not configured batch issuance.
    pub batch_size: u32,
}

/// Language-based display properties for the Issuer.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct IssuerDisplay {
    /// Issuer name for the locale.
    pub name: String,

    /// BCP47 language tag.
    pub locale: String,

    /// Issuer description for the locale.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Issuer logo, as a URL or an image object.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo: Option<Kind<Image>>,
}

/// Credential formats the compiler can produce configurations for.
#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq, Hash)]
pub enum CredentialFormat {
    /// IETF SD-JWT VC.
    #[serde(rename = "vc+sd-jwt")]
    SdJwtVc,

    /// ISO 18013-5 mdoc.
    #[serde(rename = "mdoc")]
    Mdoc,
}

impl CredentialFormat {
    /// Map a stored template format to a credential format. Case and `_`/`-`
    /// separators are normalized; unknown formats yield `None`.
    #[must_use]
    pub fn from_template_format(format: &str) -> Option<Self> {
        let normalized = format.trim().to_ascii_lowercase().replace('_', "-");
        match normalized.as_str() {
            "sd-jwt" | "vc+sd-jwt" | "sdjwt" | "sd+jwt-vc" => Some(Self::SdJwtVc),
            "mdoc" | "mso-mdoc" => Some(Self::Mdoc),
            _ => None,
        }
    }

    /// Suffix appended to template names and type identifiers.
    #[must_use]
    pub const fn suffix(self) -> &'static str {
        match self {
            Self::SdJwtVc => "sdjwt",
            Self::Mdoc => "mdoc",
        }
    }
}

impl fmt::Display for CredentialFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SdJwtVc => write!(f, "vc+sd-jwt"),
            Self::Mdoc => write!(f, "mdoc"),
        }
    }
}

/// Credential configuration.
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct CredentialConfiguration {
    /// Format and format-specific type identifier (`vct` or `doctype`).
    #[serde(flatten)]
    pub format: Format,

    /// The `scope` value the Wallet uses in an Authorization Request for this
    /// credential.
    pub scope: String,

    /// Claims description tree.
    pub claims: ClaimsTree,

    /// Algorithms the Issuer signs this credential with.
    pub credential_signing_alg_values_supported: Vec<String>,

    /// How the credential is bound to the End-User's key.
    pub cryptographic_binding_methods_supported: Vec<String>,

    /// Language-based display properties of the credential.
    pub display: Vec<CredentialDisplay>,
}

impl CredentialConfiguration {
    /// Human-readable labels of the configuration's claims for `locale`.
    ///
    /// Claims without a display entry for the locale fall back to a
    /// title-cased claim key. Nested claims are listed after their parent.
    #[must_use]
    pub fn claims_display(&self, locale: Option<&str>) -> Vec<String> {
        let mut labels = Vec::new();
        match &self.claims {
            ClaimsTree::Flat(claims) => collect_labels(claims, locale, &mut labels),
            ClaimsTree::Namespaced(namespaces) => {
                for claims in namespaces.values() {
                    collect_labels(claims, locale, &mut labels);
                }
            }
        }
        labels
    }
}

fn collect_labels(
    claims: &IndexMap<String, ClaimNode>, locale: Option<&str>, labels: &mut Vec<String>,
) {
    for (key, node) in claims {
        let display = locale
            .and_then(|locale| node.display.iter().find(|d| d.locale == locale))
            .or_else(|| node.display.first().filter(|_| locale.is_none()));
        labels.push(display.map_or_else(|| claim_label(key), |d| d.name.clone()));
        collect_labels(&node.children, locale, labels);
    }
}

/// Credential Format and its type identifier.
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
#[serde(tag = "format")]
pub enum Format {
    /// IETF SD-JWT VC.
    #[serde(rename = "vc+sd-jwt")]
    VcSdJwt(ProfileSdJwt),

    /// ISO 18013-5 mdoc.
    #[serde(rename = "mdoc")]
    Mdoc(ProfileMdoc),
}

impl Format {
    /// The credential format of this profile.
    #[must_use]
    pub const fn credential_format(&self) -> CredentialFormat {
        match self {
            Self::VcSdJwt(_) => CredentialFormat::SdJwtVc,
            Self::Mdoc(_) => CredentialFormat::Mdoc,
        }
    }
}

/// Credential Format Profile for SD-JWT VC credentials.
#[derive(Clone, Debug, Default, Serialize, PartialEq, Eq)]
pub struct ProfileSdJwt {
    /// The Verifiable Credential type.
    pub vct: String,
}

/// Credential Format Profile for mdoc credentials.
#[derive(Clone, Debug, Default, Serialize, PartialEq, Eq)]
pub struct ProfileMdoc {
    /// The document type, as defined in ISO 18013-5.
    pub doctype: String,
}

/// The `claims` object of a credential configuration.
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum ClaimsTree {
    /// SD-JWT: claim nodes keyed by claim name.
    Flat(IndexMap<String, ClaimNode>),

    /// mdoc: claim nodes keyed by namespace, then claim name.
    Namespaced(IndexMap<String, IndexMap<String, ClaimNode>>),
}

impl ClaimsTree {
    /// Find a top-level claim node (searching every namespace for mdoc).
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&ClaimNode> {
        match self {
            Self::Flat(claims) => claims.get(key),
            Self::Namespaced(namespaces) => namespaces.values().find_map(|ns| ns.get(key)),
        }
    }

    /// The claim nodes of one namespace (mdoc only).
    #[must_use]
    pub fn namespace(&self, name: &str) -> Option<&IndexMap<String, ClaimNode>> {
        match self {
            Self::Flat(_) => None,
            Self::Namespaced(namespaces) => namespaces.get(name),
        }
    }
}

/// A claim description. Child claims are serialized as siblings of
/// `display` and `mandatory`, keyed by child name.
#[derive(Clone, Debug, Default, Serialize, PartialEq, Eq)]
pub struct ClaimNode {
    /// Localized claim names.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub display: Vec<ClaimDisplay>,

    /// Only serialized when `true`.
    #[serde(skip_serializing_if = "is_false")]
    pub mandatory: bool,

    /// Nested claim nodes.
    #[serde(flatten)]
    pub children: IndexMap<String, ClaimNode>,
}

#[allow(clippy::trivially_copy_pass_by_ref)]
const fn is_false(b: &bool) -> bool {
    !*b
}

/// Language-based display properties of a credential.
#[derive(Clone, Debug, Default, Serialize, PartialEq, Eq)]
pub struct CredentialDisplay {
    /// Credential name for the locale.
    pub name: String,

    /// Credential description for the locale.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// BCP47 language tag.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub locale: Option<String>,

    /// Information about the logo of the credential.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo: Option<Image>,
}
