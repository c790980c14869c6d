//! # Issuer Metadata Assembler
//!
//! The Credential Issuer Metadata contains information on the Credential
//! Issuer's technical capabilities, supported Credentials, and
//! (internationalized) display information.
//!
//! This module assembles the metadata document the issuing agent publishes at
//! `/.well-known/openid-credential-issuer` from the issuer's stored record
//! and every one of its credential templates.
//!
//! Below is a non-normative example of assembled metadata:
//!
//! ```json
//! {
//!     "display": [{ "name": "Example Issuer", "locale": "en" }],
//!     "dpopSigningAlgValuesSupported": ["RS256", "ES256"],
//!     "credentialConfigurationsSupported": {
//!         "DrivingLicense-mdoc": { "format": "mdoc", ... }
//!     },
//!     "batchCredentialIssuance": { "batchSize": 0 }
//! }
//! ```

use indexmap::IndexMap;
use indexmap::map::Entry;
use serde_json::Value;
use tracing::instrument;

use crate::config::MetadataOptions;
use crate::configuration;
use crate::error::Error;
use crate::types::{
    BatchCredentialIssuance, CredentialTemplate, IssuerDisplay, IssuerMetadata, IssuerRecord,
};
use crate::Result;

/// Assemble issuer metadata from the issuer record and its templates.
///
/// # Errors
///
/// Returns [`Error::InvalidIssuer`] when the issuer has no public identifier,
/// [`Error::DuplicateConfigKey`] when two templates compile to the same
/// credential configuration id, and any error raised compiling a template.
#[instrument(level = "debug", skip_all, fields(templates = templates.len()))]
pub fn assemble(
    issuer: &IssuerRecord, templates: &[CredentialTemplate], options: &MetadataOptions,
) -> Result<IssuerMetadata> {
    tracing::debug!("metadata::assemble");

    if issuer.public_issuer_id.as_deref().is_none_or(|id| id.trim().is_empty()) {
        return Err(Error::InvalidIssuer("issuer has no public issuer id".into()));
    }

    let mut configurations = IndexMap::with_capacity(templates.len());
    for template in templates {
        let (key, config) = configuration::compile(template)?;
        match configurations.entry(key) {
            Entry::Occupied(entry) => return Err(Error::DuplicateConfigKey(entry.key().clone())),
            Entry::Vacant(entry) => {
                entry.insert(config);
            }
        }
    }

    Ok(IssuerMetadata {
        display: issuer_display(&issuer.metadata),
        dpop_signing_alg_values_supported: options.dpop_signing_alg_values_supported.clone(),
        credential_configurations_supported: configurations,
        batch_credential_issuance: BatchCredentialIssuance {
            batch_size: issuer.batch_credential_issuance_size.unwrap_or_default(),
        },
    })
}

/// Issuer display entries from the issuer's free-form metadata.
///
/// The metadata is used when it is an array of `{name, locale, description?,
/// logo?}` objects, or an object holding such an array under `display`.
/// Anything else yields no display entries.
#[must_use]
pub fn issuer_display(metadata: &Value) -> Vec<IssuerDisplay> {
    let candidate = match metadata {
        Value::Object(map) => map.get("display"),
        Value::Array(_) => Some(metadata),
        _ => None,
    };

    candidate
        .and_then(|value| serde_json::from_value::<Vec<IssuerDisplay>>(value.clone()).ok())
        .unwrap_or_else(|| {
            tracing::debug!("issuer metadata has no usable display");
            Vec::new()
        })
}
