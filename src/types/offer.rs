use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{Error, XorViolation};
use crate::types::{CredentialFormat, SignerOption};

/// Request to compile a Credential Offer.
///
/// Both flow configurations are optional here because callers send them as
/// independent fields; [`CreateOfferRequest::flow_config`] resolves them into
/// exactly one [`FlowConfig`].
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CreateOfferRequest {
    /// Credentials to offer.
    pub credentials: Vec<CredentialRequest>,

    /// Externally visible issuer identifier. Falls back to the issuer
    /// record's value when not set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub public_issuer_id: Option<String>,

    /// Internal issuer identifier. Never copied into the offer.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issuer_id: Option<String>,

    /// Signer mechanism to advertise for the whole offer.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signer_option: Option<SignerOption>,

    /// Pre-Authorized Code Flow configuration.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pre_authorized_code_flow_config: Option<PreAuthorizedCodeFlowConfig>,

    /// Authorization Code Flow configuration.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub authorization_code_flow_config: Option<AuthorizationCodeFlowConfig>,
}

impl CreateOfferRequest {
    /// Resolve the request's flow configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::FlowConfigXorViolation`] unless exactly one flow
    /// configuration is set.
    pub fn flow_config(&self) -> Result<FlowConfig, Error> {
        match (&self.pre_authorized_code_flow_config, &self.authorization_code_flow_config) {
            (Some(pre_auth), None) => Ok(FlowConfig::PreAuthorized(pre_auth.clone())),
            (None, Some(auth)) => Ok(FlowConfig::AuthorizationCode(auth.clone())),
            (Some(_), Some(_)) => Err(Error::FlowConfigXorViolation(XorViolation::Both)),
            (None, None) => Err(Error::FlowConfigXorViolation(XorViolation::Neither)),
        }
    }
}

/// Request to compile a credential update. Updates never renegotiate the
/// authorization flow.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOfferRequest {
    /// Credentials to update.
    pub credentials: Vec<CredentialRequest>,

    /// Externally visible issuer identifier.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub public_issuer_id: Option<String>,

    /// Internal issuer identifier. Never copied into the output.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issuer_id: Option<String>,
}

/// One credential the caller wants issued from a template.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CredentialRequest {
    /// Template to issue from.
    pub template_id: String,

    /// Claim values.
    #[serde(default)]
    pub payload: Map<String, Value>,

    /// Selective disclosure frame (SD-JWT): claim name to `true` or a nested
    /// frame.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disclosure_frame: Option<Map<String, Value>>,
}

/// The authorization flow a Credential Offer advertises. Exactly one is
/// always present.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub enum FlowConfig {
    /// Pre-Authorized Code Flow.
    #[serde(rename = "preAuthorizedCodeFlowConfig")]
    PreAuthorized(PreAuthorizedCodeFlowConfig),

    /// Authorization Code Flow.
    #[serde(rename = "authorizationCodeFlowConfig")]
    AuthorizationCode(AuthorizationCodeFlowConfig),
}

impl FlowConfig {
    /// The Authorization Server the flow uses.
    #[must_use]
    pub fn authorization_server_url(&self) -> &str {
        match self {
            Self::PreAuthorized(cfg) => &cfg.authorization_server_url,
            Self::AuthorizationCode(cfg) => &cfg.authorization_server_url,
        }
    }
}

/// Pre-Authorized Code Flow configuration.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PreAuthorizedCodeFlowConfig {
    /// Transaction code the End-User must present at the Token Endpoint.
    pub tx_code: TxCode,

    /// URL of the Authorization Server.
    pub authorization_server_url: String,
}

/// Authorization Code Flow configuration.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AuthorizationCodeFlowConfig {
    /// URL of the Authorization Server.
    pub authorization_server_url: String,
}

/// Specifies whether the Authorization Server expects presentation of a
/// Transaction Code by the End-User along with the Token Request.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct TxCode {
    /// Guidance for the End-User on how to obtain the Transaction Code.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Length of the Transaction Code.
    pub length: u32,

    /// Input character set.
    #[serde(default)]
    pub input_mode: InputMode,
}

/// Transaction Code input character set.
#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum InputMode {
    /// Digits only.
    #[default]
    Numeric,

    /// Any characters.
    Text,
}

/// A credential compiled from a request and its template.
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct BuiltCredential {
    /// Key of the credential's entry in `credentialConfigurationsSupported`.
    pub credential_supported_id: String,

    /// Credential format.
    pub format: CredentialFormat,

    /// Claim values, without `vct`.
    pub payload: Map<String, Value>,

    /// Selective disclosure frame, when the caller supplied one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disclosure_frame: Option<Map<String, Value>>,

    /// Resolved signer, when the template signs with a DID.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signer_options: Option<SignerOptions>,
}

/// Signer resolved for a credential.
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct SignerOptions {
    /// Signing mechanism.
    pub method: SignerOption,

    /// The issuer DID to sign with.
    pub did: String,
}

/// Credential Offer payload handed to the issuing agent.
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CredentialOfferPayload {
    /// Offered credentials.
    pub credentials: Vec<BuiltCredential>,

    /// Externally visible issuer identifier.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub public_issuer_id: Option<String>,

    /// Signer mechanism advertised for the whole offer.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signer_option: Option<SignerOption>,

    /// The offer's authorization flow.
    #[serde(flatten)]
    pub flow: FlowConfig,
}

impl CredentialOfferPayload {
    /// Ids of the offered credentials, matching keys of the issuer's
    /// `credentialConfigurationsSupported`.
    #[must_use]
    pub fn credential_configuration_ids(&self) -> Vec<&str> {
        self.credentials.iter().map(|c| c.credential_supported_id.as_str()).collect()
    }
}

/// Credential update payload handed to the issuing agent.
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CredentialUpdatePayload {
    /// Updated credentials.
    pub credentials: Vec<BuiltCredential>,

    /// Externally visible issuer identifier.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub public_issuer_id: Option<String>,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn flow_config_xor() {
        let mut request: CreateOfferRequest = serde_json::from_value(json!({
            "credentials": [],
            "authorizationCodeFlowConfig": {"authorizationServerUrl": "https://as.example"}
        }))
        .expect("should deserialize");

        let flow = request.flow_config().expect("one flow config");
        assert_eq!(flow.authorization_server_url(), "https://as.example");

        request.pre_authorized_code_flow_config = Some(PreAuthorizedCodeFlowConfig::default());
        assert_eq!(
            request.flow_config(),
            Err(Error::FlowConfigXorViolation(XorViolation::Both))
        );

        request.pre_authorized_code_flow_config = None;
        request.authorization_code_flow_config = None;
        assert_eq!(
            request.flow_config(),
            Err(Error::FlowConfigXorViolation(XorViolation::Neither))
        );
    }

    #[test]
    fn tx_code_defaults_numeric() {
        let flow: PreAuthorizedCodeFlowConfig = serde_json::from_value(json!({
            "txCode": {"length": 6},
            "authorizationServerUrl": "https://as.example"
        }))
        .expect("should deserialize");

        assert_eq!(
            serde_json::to_value(&flow).expect("should serialize"),
            json!({
                "txCode": {"length": 6, "input_mode": "numeric"},
                "authorizationServerUrl": "https://as.example"
            })
        );
    }

    // OpenID4VCI also allows alphanumeric codes; the mode passes through.
    #[test]
    fn tx_code_text_input() {
        let tx_code: TxCode = serde_json::from_value(json!({"length": 8, "input_mode": "text"}))
            .expect("should deserialize");
        assert_eq!(tx_code.input_mode, InputMode::Text);
        assert_eq!(
            serde_json::to_value(&tx_code).expect("should serialize"),
            json!({"length": 8, "input_mode": "text"})
        );
        let unknown = json!({"length": 8, "input_mode": "emoji"});
        assert!(serde_json::from_value::<TxCode>(unknown).is_err());
    }
}
