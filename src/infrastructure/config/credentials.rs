//! Where credential material is read from.

use serde::Deserialize;

/// `[credentials]` section: environment variable names per signing method.
///
/// Secrets themselves never live in the config file.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CredentialsConfig {
    pub hmac_api_key_env: String,
    pub hmac_secret_key_env: String,
    pub rsa_api_key_env: String,
    pub rsa_private_key_path_env: String,
    pub ed25519_api_key_env: String,
    pub ed25519_private_key_path_env: String,
}

impl Default for CredentialsConfig {
    fn default() -> Self {
        Self {
            hmac_api_key_env: "BINANCE_API_KEY".into(),
            hmac_secret_key_env: "BINANCE_SECRET_KEY".into(),
            rsa_api_key_env: "BINANCE_RSA_API_KEY".into(),
            rsa_private_key_path_env: "BINANCE_RSA_PRIVATE_KEY_PATH".into(),
            ed25519_api_key_env: "BINANCE_ED25519_API_KEY".into(),
            ed25519_private_key_path_env: "BINANCE_ED25519_PRIVATE_KEY_PATH".into(),
        }
    }
}
