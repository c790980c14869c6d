//! # Credential Configuration Compiler
//!
//! Compiles one credential template into a `credential_configurations_supported`
//! entry and the id it is published under.
//!
//! The id is `<template name>-<suffix>`, where the suffix is `sdjwt` for
//! SD-JWT VC templates and `mdoc` for mdoc templates. Credential Offers refer
//! to configurations by the same id.
//!
//! Below is a non-normative example of a compiled mdoc configuration:
//!
//! ```json
//! "DrivingLicense-mdoc": {
//!     "format": "mdoc",
//!     "doctype": "org.iso.18013.5.1.mDL",
//!     "scope": "openid4vc:org.iso.18013.5.1.mDL-mdoc",
//!     "claims": {
//!         "org.iso.18013.5.1": {
//!             "family_name": { "mandatory": true }
//!         }
//!     },
//!     "credential_signing_alg_values_supported": ["ES256", "EdDSA"],
//!     "cryptographic_binding_methods_supported": ["did:key"],
//!     "display": [{ "name": "Driving Licence", "locale": "en" }]
//! }
//! ```

use tracing::instrument;

use crate::claims;
use crate::config::{CREDENTIAL_SIGNING_ALG_VALUES, CRYPTOGRAPHIC_BINDING_METHODS, SCOPE_PREFIX};
use crate::error::{Error, Problem, ShapeError};
use crate::types::{
    CredentialConfiguration, CredentialDisplay, CredentialFormat, CredentialTemplate, Format,
    Image, ProfileMdoc, ProfileSdJwt, TemplateAttributes,
};
use crate::validate::validate;
use crate::Result;

/// A template that passed format, attribute and type-identifier checks.
#[derive(Clone, Debug)]
pub struct PreparedTemplate<'a> {
    /// The source template.
    pub template: &'a CredentialTemplate,

    /// Resolved credential format.
    pub format: CredentialFormat,

    /// Decoded attributes, with a topology matching `format`.
    pub attributes: TemplateAttributes,

    /// `vct` (SD-JWT) or `doctype` (mdoc).
    pub type_id: String,
}

impl PreparedTemplate<'_> {
    /// The credential configuration id: `<template name>-<suffix>`.
    #[must_use]
    pub fn config_key(&self) -> String {
        config_key(&self.template.name, self.format)
    }

    /// The configuration scope: `openid4vc:<vct|doctype>-<suffix>`.
    ///
    /// The type identifier is used verbatim.
    #[must_use]
    pub fn scope(&self) -> String {
        format!("{SCOPE_PREFIX}:{}-{}", self.type_id, self.format.suffix())
    }
}

/// Resolve a template's credential format.
///
/// # Errors
///
/// Returns [`Error::UnsupportedFormat`] when the stored format is not a known
/// SD-JWT or mdoc format name.
pub fn credential_format(template: &CredentialTemplate) -> Result<CredentialFormat> {
    CredentialFormat::from_template_format(&template.format).ok_or_else(|| {
        Error::UnsupportedFormat {
            template: template.name.clone(),
            format: template.format.clone(),
        }
    })
}

/// The credential configuration id for a template name and format.
#[must_use]
pub fn config_key(name: &str, format: CredentialFormat) -> String {
    format!("{name}-{}", format.suffix())
}

/// Run every check a template must pass before it can be compiled or used to
/// build an offer.
///
/// # Errors
///
/// Returns an error when the format is unsupported, the attributes are
/// malformed or do not match the format's topology, or the template lacks
/// its `vct`/`doctype`.
pub fn prepare(template: &CredentialTemplate) -> Result<PreparedTemplate<'_>> {
    let format = credential_format(template)?;
    let attributes = validate(&template.attributes)?;

    match (format, attributes.is_namespaced()) {
        (CredentialFormat::Mdoc, false) => {
            return Err(topology_error(
                "mdoc attributes must be grouped by namespace",
                r#"[{"namespace": "org.iso.18013.5.1", "attributes": {"family_name": {"mandatory": true, "value_type": "string"}}}]"#,
            ));
        }
        (CredentialFormat::SdJwtVc, true) => {
            return Err(topology_error(
                "SD-JWT attributes must be a flat object of attribute definitions",
                r#"{"given_name": {"mandatory": true, "value_type": "string"}}"#,
            ));
        }
        _ => {}
    }

    let (type_id, field) = match format {
        CredentialFormat::SdJwtVc => (template.vct.as_deref(), "vct"),
        CredentialFormat::Mdoc => (template.doctype.as_deref(), "doctype"),
    };
    let Some(type_id) = type_id.map(str::trim).filter(|id| !id.is_empty()) else {
        return Err(Error::MissingCredentialType {
            template: template.name.clone(),
            field,
        });
    };

    Ok(PreparedTemplate {
        template,
        format,
        attributes,
        type_id: type_id.to_string(),
    })
}

fn topology_error(message: &str, example: &str) -> Error {
    Error::Shape(ShapeError {
        problems: vec![Problem {
            path: "$".into(),
            message: message.into(),
            example: example.into(),
        }],
    })
}

/// Compile a template into its credential configuration id and entry.
///
/// # Errors
///
/// Returns the errors of [`prepare`].
#[instrument(level = "debug", skip_all, fields(template = %template.name))]
pub fn compile(template: &CredentialTemplate) -> Result<(String, CredentialConfiguration)> {
    tracing::debug!("configuration::compile");

    let prepared = prepare(template)?;
    Ok((prepared.config_key(), configuration(&prepared)))
}

/// Assemble the configuration entry of a prepared template.
#[must_use]
pub fn configuration(prepared: &PreparedTemplate) -> CredentialConfiguration {
    let format = match prepared.format {
        CredentialFormat::SdJwtVc => Format::VcSdJwt(ProfileSdJwt {
            vct: prepared.type_id.clone(),
        }),
        CredentialFormat::Mdoc => Format::Mdoc(ProfileMdoc {
            doctype: prepared.type_id.clone(),
        }),
    };

    let display = prepared
        .template
        .appearance
        .iter()
        .flat_map(|appearance| &appearance.display)
        .map(|entry| CredentialDisplay {
            name: entry.name.clone(),
            description: entry.description.clone(),
            locale: entry.locale.clone(),
            logo: entry.logo.clone().map(|logo| {
                logo.into_object(|uri| Image {
                    uri: Some(uri),
                    alt_text: None,
                })
            }),
        })
        .collect();

    CredentialConfiguration {
        format,
        scope: prepared.scope(),
        claims: claims::build(&prepared.attributes),
        credential_signing_alg_values_supported: CREDENTIAL_SIGNING_ALG_VALUES
            .iter()
            .map(ToString::to_string)
            .collect(),
        cryptographic_binding_methods_supported: CRYPTOGRAPHIC_BINDING_METHODS
            .iter()
            .map(ToString::to_string)
            .collect(),
        display,
    }
}
