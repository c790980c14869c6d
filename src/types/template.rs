use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::core::Kind;

/// A stored credential template, as returned by the template repository.
///
/// The compiler never trusts `attributes`: it is decoded (and rejected with a
/// full list of problems) before anything else reads it.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CredentialTemplate {
    /// Template identifier.
    pub id: String,

    /// Template name, unique per issuer. Used to build the credential
    /// configuration id.
    pub name: String,

    /// Credential format as stored, e.g. `sd-jwt`, `vc+sd-jwt` or `mso_mdoc`.
    pub format: String,

    /// Undecoded attribute tree. An object of attribute definitions for
    /// SD-JWT, an array of namespaces for mdoc.
    #[serde(default)]
    pub attributes: Value,

    /// Display information for the credential.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub appearance: Option<Appearance>,

    /// SD-JWT credential type.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vct: Option<String>,

    /// mdoc document type.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub doctype: Option<String>,

    /// How credentials issued from this template are signed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signer_option: Option<SignerOption>,
}

/// Credential appearance. Stored either as a bare list of display entries or
/// wrapped in a `display` object.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(from = "AppearanceRepr")]
pub struct Appearance {
    /// Display entries, one per locale.
    pub display: Vec<AppearanceDisplay>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum AppearanceRepr {
    List(Vec<AppearanceDisplay>),
    Wrapped {
        #[serde(default)]
        display: Vec<AppearanceDisplay>,
    },
}

impl From<AppearanceRepr> for Appearance {
    fn from(repr: AppearanceRepr) -> Self {
        match repr {
            AppearanceRepr::List(display) | AppearanceRepr::Wrapped { display } => {
                Self { display }
            }
        }
    }
}

/// One localized appearance entry of a template.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct AppearanceDisplay {
    /// Credential name for the locale.
    pub name: String,

    /// BCP47 language tag.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub locale: Option<String>,

    /// Credential description for the locale.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Logo, stored either as a URL or as an image object.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo: Option<Kind<Image>>,
}

/// Information about a logo image.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct Image {
    /// URL where the Wallet can obtain the logo.
    #[serde(alias = "url", skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,

    /// Alternative text of the logo image.
    #[serde(alias = "altText", skip_serializing_if = "Option::is_none")]
    pub alt_text: Option<String>,
}

/// Signing mechanism declared by a template.
#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum SignerOption {
    /// Sign with the issuer's DID key.
    #[serde(alias = "DID")]
    Did,

    /// Sign with an X.509 certificate chain. Resolved by a separate
    /// device-to-agent flow.
    #[serde(alias = "X5C", alias = "x509")]
    X5c,
}

/// A stored issuer, as returned by the issuer repository.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct IssuerRecord {
    /// Externally visible issuer identifier.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub public_issuer_id: Option<String>,

    /// Free-form front-end metadata. Only a display list is read from it.
    #[serde(default)]
    pub metadata: Value,

    /// Maximum number of proofs a Wallet may send in one Credential Request.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub batch_credential_issuance_size: Option<u32>,

    /// The issuer's DID, used for `did` signer options.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub did: Option<String>,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn appearance_shapes() {
        let entry = json!({"name": "Driving Licence", "locale": "en", "logo": "https://logo.png"});

        let list: Appearance = serde_json::from_value(json!([entry])).expect("should deserialize");
        let wrapped: Appearance =
            serde_json::from_value(json!({"display": [entry]})).expect("should deserialize");
        assert_eq!(list, wrapped);
        assert_eq!(list.display[0].logo, Some(Kind::String("https://logo.png".into())));
    }

    #[test]
    fn template_row() {
        let row = json!({
            "id": "t1",
            "name": "DrivingLicense",
            "format": "mso_mdoc",
            "doctype": "org.iso.18013.5.1.mDL",
            "signerOption": "DID",
            "attributes": []
        });
        let template: CredentialTemplate = serde_json::from_value(row).expect("should deserialize");
        assert_eq!(template.signer_option, Some(SignerOption::Did));
        assert!(template.appearance.is_none());
    }
}
