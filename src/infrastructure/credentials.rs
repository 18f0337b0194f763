//! Environment-backed credential source.

use std::collections::HashMap;

use tracing::debug;

use crate::domain::{AuthMethod, Credential};
use crate::infrastructure::config::credentials::CredentialsConfig;
use crate::port::outbound::credentials::CredentialSource;

/// Credentials read once from environment variables.
///
/// A method is available only when both its key and its secret (or key
/// path) are set and non-empty.
#[derive(Debug, Clone, Default)]
pub struct EnvCredentialSource {
    credentials: HashMap<AuthMethod, Credential>,
}

impl EnvCredentialSource {
    /// Snapshot the process environment using the configured variable names.
    #[must_use]
    pub fn from_env(config: &CredentialsConfig) -> Self {
        Self::from_lookup(config, |name| std::env::var(name).ok())
    }

    /// Build from an arbitrary variable lookup.
    pub fn from_lookup<F>(config: &CredentialsConfig, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let mut credentials = HashMap::new();
        if let (Some(key), Some(secret)) = (
            read(&config.hmac_api_key_env),
            read(&config.hmac_secret_key_env),
        ) {
            credentials.insert(AuthMethod::Hmac, Credential::hmac(key, secret));
        }
        if let (Some(key), Some(path)) = (
            read(&config.rsa_api_key_env),
            read(&config.rsa_private_key_path_env),
        ) {
            credentials.insert(AuthMethod::Rsa, Credential::rsa(key, path));
        }
        if let (Some(key), Some(path)) = (
            read(&config.ed25519_api_key_env),
            read(&config.ed25519_private_key_path_env),
        ) {
            credentials.insert(AuthMethod::Ed25519, Credential::ed25519(key, path));
        }

        debug!(available = credentials.len(), "Credentials loaded from environment");
        Self { credentials }
    }

    #[must_use]
    pub fn available(&self) -> usize {
        self.credentials.len()
    }
}

impl CredentialSource for EnvCredentialSource {
    fn credential(&self, method: AuthMethod) -> Option<Credential> {
        self.credentials.get(&method).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn complete_pairs_only() {
        let source = EnvCredentialSource::from_lookup(
            &CredentialsConfig::default(),
            lookup(&[
                ("BINANCE_API_KEY", "hmac-key"),
                ("BINANCE_SECRET_KEY", "hmac-secret"),
                ("BINANCE_RSA_API_KEY", "rsa-key"),
                ("BINANCE_ED25519_API_KEY", "ed-key"),
                ("BINANCE_ED25519_PRIVATE_KEY_PATH", "  "),
            ]),
        );
        assert_eq!(source.available(), 1);
        let hmac = source.credential(AuthMethod::Hmac).unwrap();
        assert_eq!(hmac.api_key(), "hmac-key");
        assert!(source.credential(AuthMethod::Rsa).is_none());
        assert!(source.credential(AuthMethod::Ed25519).is_none());
    }

    #[test]
    fn custom_variable_names() {
        let config = CredentialsConfig {
            ed25519_api_key_env: "ED_KEY".into(),
            ed25519_private_key_path_env: "ED_PATH".into(),
            ..CredentialsConfig::default()
        };
        let source = EnvCredentialSource::from_lookup(
            &config,
            lookup(&[("ED_KEY", "k"), ("ED_PATH", "/keys/ed.pem")]),
        );
        let ed = source.credential(AuthMethod::Ed25519).unwrap();
        assert_eq!(ed.key_path().unwrap().to_str(), Some("/keys/ed.pem"));
    }
}
