//! # Compiler Configuration
//!
//! Caller-supplied options and the platform-wide issuance policy.

use serde::{Deserialize, Serialize};

/// Algorithms every credential configuration advertises for credential
/// signing. Platform policy, not per-template configuration.
pub const CREDENTIAL_SIGNING_ALG_VALUES: [&str; 2] = ["ES256", "EdDSA"];

/// Holder binding methods every credential configuration advertises.
pub const CRYPTOGRAPHIC_BINDING_METHODS: [&str; 1] = ["did:key"];

/// Prefix of every credential configuration `scope`.
pub const SCOPE_PREFIX: &str = "openid4vc";

/// DPoP algorithms advertised when the caller does not override them.
pub const DEFAULT_DPOP_SIGNING_ALG_VALUES: [&str; 2] = ["RS256", "ES256"];

/// Options for assembling issuer metadata.
///
/// ```rust
/// use vercre_template::config::MetadataOptions;
///
/// let options: MetadataOptions = serde_json::from_str("{}").unwrap();
/// assert_eq!(options.dpop_signing_alg_values_supported, ["RS256", "ES256"]);
/// ```
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct MetadataOptions {
    /// JWS algorithms the issuer accepts for DPoP proofs.
    pub dpop_signing_alg_values_supported: Vec<String>,
}

impl Default for MetadataOptions {
    fn default() -> Self {
        Self {
            dpop_signing_alg_values_supported: DEFAULT_DPOP_SIGNING_ALG_VALUES
                .iter()
                .map(ToString::to_string)
                .collect(),
        }
    }
}

impl MetadataOptions {
    /// Override the advertised DPoP algorithms.
    #[must_use]
    pub fn with_dpop_algs(mut self, algs: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.dpop_signing_alg_values_supported = algs.into_iter().map(Into::into).collect();
        self
    }
}
