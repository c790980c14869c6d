//! # Credential Offer Compiler
//!
//! Compiles a caller's offer (or update) request into the payload handed to
//! the issuing agent. Every requested credential is checked against its
//! template before any output is built: unknown template ids, missing
//! mandatory claims and (for updates) undeclared payload keys are reported
//! together rather than one at a time.
//!
//! Below is a non-normative example of a compiled Credential Offer payload:
//!
//! ```json
//! {
//!     "credentials": [{
//!         "credentialSupportedId": "DrivingLicense-mdoc",
//!         "format": "mdoc",
//!         "payload": { "family_name": "Doe" },
//!         "signerOptions": { "method": "did", "did": "did:example:issuer" }
//!     }],
//!     "publicIssuerId": "example-issuer",
//!     "authorizationCodeFlowConfig": {
//!         "authorizationServerUrl": "https://as.example"
//!     }
//! }
//! ```
//!
//! Updates are compiled the same way, with two differences: every payload key
//! must be declared by the template, and the result carries no flow
//! configuration.

use std::collections::HashMap;
use std::hash::BuildHasher;

use indexmap::IndexMap;
use serde_json::{Map, Value};
use tracing::instrument;

use crate::claims;
use crate::configuration::{self, PreparedTemplate};
use crate::error::{Error, InvalidKeys, MissingClaims};
use crate::types::{
    BuiltCredential, CreateOfferRequest, CredentialOfferPayload, CredentialRequest,
    CredentialTemplate, CredentialUpdatePayload, IssuerRecord, SignerOption, SignerOptions,
    UpdateOfferRequest,
};
use crate::Result;

/// Payload key that is always derived from the template.
const VCT: &str = "vct";

/// Find credential templates by id.
///
/// Implemented for the collections templates are usually fetched into.
pub trait TemplateLookup {
    /// The template with the given id, if any.
    fn template(&self, id: &str) -> Option<&CredentialTemplate>;
}

impl TemplateLookup for [CredentialTemplate] {
    fn template(&self, id: &str) -> Option<&CredentialTemplate> {
        self.iter().find(|t| t.id == id)
    }
}

impl TemplateLookup for Vec<CredentialTemplate> {
    fn template(&self, id: &str) -> Option<&CredentialTemplate> {
        self.as_slice().template(id)
    }
}

impl<S: BuildHasher> TemplateLookup for HashMap<String, CredentialTemplate, S> {
    fn template(&self, id: &str) -> Option<&CredentialTemplate> {
        self.get(id)
    }
}

impl<S: BuildHasher> TemplateLookup for IndexMap<String, CredentialTemplate, S> {
    fn template(&self, id: &str) -> Option<&CredentialTemplate> {
        self.get(id)
    }
}

/// Compile a Credential Offer.
///
/// # Errors
///
/// Returns [`Error::FlowConfigXorViolation`] unless exactly one flow
/// configuration is set, [`Error::NoCredentials`] for an empty request,
/// [`Error::UnknownTemplate`] listing every unknown
/// template id, [`Error::MissingMandatoryClaim`] listing every missing claim,
/// and [`Error::InvalidIssuer`] when a template signs with a DID the issuer
/// does not have. Template errors from
/// [`configuration::prepare`] are returned as is.
#[instrument(level = "debug", skip_all, fields(credentials = request.credentials.len()))]
pub fn create_offer<T>(
    request: &CreateOfferRequest, templates: &T, issuer: &IssuerRecord,
) -> Result<CredentialOfferPayload>
where
    T: TemplateLookup + ?Sized,
{
    tracing::debug!("offer::create_offer");

    let flow = request.flow_config()?;
    let ctx = Context::verify(&request.credentials, templates, issuer, Mode::Create)?;

    Ok(CredentialOfferPayload {
        credentials: ctx.build(&request.credentials),
        public_issuer_id: public_issuer_id(request.public_issuer_id.as_deref(), issuer),
        signer_option: request.signer_option,
        flow,
    })
}

/// Compile a credential update.
///
/// # Errors
///
/// Returns the errors of [`create_offer`], except flow configuration errors,
/// plus [`Error::InvalidAttributeKey`] listing every payload key the
/// templates do not declare.
#[instrument(level = "debug", skip_all, fields(credentials = request.credentials.len()))]
pub fn update_offer<T>(
    request: &UpdateOfferRequest, templates: &T, issuer: &IssuerRecord,
) -> Result<CredentialUpdatePayload>
where
    T: TemplateLookup + ?Sized,
{
    tracing::debug!("offer::update_offer");

    let ctx = Context::verify(&request.credentials, templates, issuer, Mode::Update)?;

    Ok(CredentialUpdatePayload {
        credentials: ctx.build(&request.credentials),
        public_issuer_id: public_issuer_id(request.public_issuer_id.as_deref(), issuer),
    })
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Mode {
    Create,
    Update,
}

/// Verified templates, one per requested credential, and the resolved
/// signer DID.
#[derive(Debug)]
struct Context<'a> {
    prepared: Vec<PreparedTemplate<'a>>,
    did: Option<&'a str>,
}

impl<'a> Context<'a> {
    fn verify<T>(
        credentials: &[CredentialRequest], templates: &'a T, issuer: &'a IssuerRecord, mode: Mode,
    ) -> Result<Self>
    where
        T: TemplateLookup + ?Sized,
    {
        if credentials.is_empty() {
            return Err(Error::NoCredentials);
        }

        // resolve every template before reporting
        let mut resolved = Vec::with_capacity(credentials.len());
        let mut unknown: Vec<String> = Vec::new();
        for credential in credentials {
            match templates.template(&credential.template_id) {
                Some(template) => resolved.push(template),
                None if unknown.contains(&credential.template_id) => {}
                None => unknown.push(credential.template_id.clone()),
            }
        }
        if !unknown.is_empty() {
            return Err(Error::UnknownTemplate(unknown));
        }

        let prepared =
            resolved.into_iter().map(configuration::prepare).collect::<Result<Vec<_>>>()?;

        let mut missing = Vec::new();
        let mut invalid = Vec::new();
        for (credential, template) in credentials.iter().zip(&prepared) {
            let claims = claims::missing_mandatory(&template.attributes, &credential.payload);
            if !claims.is_empty() {
                missing.push(MissingClaims {
                    template_id: credential.template_id.clone(),
                    claims,
                });
            }

            if mode == Mode::Update {
                let payload = without_vct(&credential.payload);
                let keys = claims::undeclared_keys(&template.attributes, &payload);
                if !keys.is_empty() {
                    invalid.push(InvalidKeys {
                        template_id: credential.template_id.clone(),
                        keys,
                    });
                }
            }
        }
        if !missing.is_empty() {
            return Err(Error::MissingMandatoryClaim(missing));
        }
        if !invalid.is_empty() {
            return Err(Error::InvalidAttributeKey(invalid));
        }

        let signs_with_did =
            prepared.iter().any(|p| p.template.signer_option == Some(SignerOption::Did));
        let did = issuer.did.as_deref().map(str::trim).filter(|did| !did.is_empty());
        if signs_with_did && did.is_none() {
            return Err(Error::InvalidIssuer("issuer has no DID to sign with".into()));
        }

        Ok(Self { prepared, did })
    }

    // Infallible: everything was checked in `verify`.
    fn build(&self, credentials: &[CredentialRequest]) -> Vec<BuiltCredential> {
        credentials
            .iter()
            .zip(&self.prepared)
            .map(|(credential, template)| BuiltCredential {
                credential_supported_id: template.config_key(),
                format: template.format,
                payload: without_vct(&credential.payload),
                disclosure_frame: credential.disclosure_frame.clone(),
                signer_options: self.signer_options(template),
            })
            .collect()
    }

    fn signer_options(&self, template: &PreparedTemplate) -> Option<SignerOptions> {
        match template.template.signer_option? {
            SignerOption::Did => self.did.map(|did| SignerOptions {
                method: SignerOption::Did,
                did: did.to_string(),
            }),
            SignerOption::X5c => {
                tracing::debug!(
                    template = %template.template.id,
                    "x5c signer is resolved by the agent"
                );
                None
            }
        }
    }
}

fn without_vct(payload: &Map<String, Value>) -> Map<String, Value> {
    payload
        .iter()
        .filter(|(key, _)| key.as_str() != VCT)
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}

fn public_issuer_id(requested: Option<&str>, issuer: &IssuerRecord) -> Option<String> {
    [requested, issuer.public_issuer_id.as_deref()]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|id| !id.is_empty())
        .map(ToString::to_string)
}
