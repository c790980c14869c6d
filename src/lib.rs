//! A compiler from credential templates to the
//! [OpenID for Verifiable Credential Issuance](https://openid.net/specs/openid-4-verifiable-credential-issuance-1_0.html)
//! documents an issuing agent publishes and acts on.
//!
//! Templates describe an issuable credential in either the SD-JWT VC or the
//! ISO 18013-5 mdoc format. From them the crate compiles:
//!
//! * issuer metadata, with one credential configuration per template
//!   ([`metadata::assemble`]), and
//! * Credential Offer and credential update payloads ([`offer::create_offer`],
//!   [`offer::update_offer`]).
//!
//! Every operation is a synchronous, pure function of its inputs. Failures are
//! reported as an [`Error`] that describes every problem found, never just the
//! first.
//!
//! ```rust
//! use serde_json::json;
//! use vercre_template::{CreateOfferRequest, CredentialTemplate, IssuerRecord, create_offer};
//!
//! let template: CredentialTemplate = serde_json::from_value(json!({
//!     "id": "mdl",
//!     "name": "DrivingLicense",
//!     "format": "mso_mdoc",
//!     "doctype": "org.iso.18013.5.1.mDL",
//!     "attributes": [{
//!         "namespace": "org.iso.18013.5.1",
//!         "attributes": {"family_name": {"mandatory": true, "value_type": "string"}}
//!     }]
//! }))?;
//! let request: CreateOfferRequest = serde_json::from_value(json!({
//!     "credentials": [{"templateId": "mdl", "payload": {"family_name": "Doe"}}],
//!     "authorizationCodeFlowConfig": {"authorizationServerUrl": "https://as.example"}
//! }))?;
//!
//! let offer = create_offer(&request, &vec![template], &IssuerRecord::default())?;
//! assert_eq!(offer.credential_configuration_ids(), ["DrivingLicense-mdoc"]);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod claims;
pub mod config;
pub mod configuration;
pub mod core;
pub mod error;
pub mod metadata;
pub mod offer;
pub mod types;
pub mod validate;

pub mod test_utils;

pub use crate::config::MetadataOptions;
pub use crate::core::Kind;
pub use crate::error::Error;
pub use crate::metadata::assemble;
pub use crate::offer::{TemplateLookup, create_offer, update_offer};
pub use crate::types::*;

/// Result type for the template compiler.
pub type Result<T, E = Error> = std::result::Result<T, E>;
