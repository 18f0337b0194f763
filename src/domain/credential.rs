//! Authentication credentials.
//!
//! A [`Credential`] is built once at startup from the environment and never
//! mutated afterwards. Secret material is redacted from `Debug` output.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Supported request-signing schemes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthMethod {
    Hmac,
    Rsa,
    Ed25519,
}

impl AuthMethod {
    /// All methods in matrix evaluation order.
    pub const ALL: [Self; 3] = [Self::Hmac, Self::Rsa, Self::Ed25519];

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Hmac => "HMAC",
            Self::Rsa => "RSA",
            Self::Ed25519 => "Ed25519",
        }
    }

    /// Display name of the run configuration backed by this method.
    #[must_use]
    pub const fn configuration_name(self) -> &'static str {
        match self {
            Self::Hmac => "HMAC Authentication",
            Self::Rsa => "RSA Authentication",
            Self::Ed25519 => "Ed25519 Authentication",
        }
    }
}

impl fmt::Display for AuthMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Opaque signing material.
#[derive(Clone, PartialEq, Eq)]
pub enum SecretMaterial {
    /// Shared secret used for HMAC signatures.
    SharedSecret(String),
    /// Path to a private key file (RSA or Ed25519).
    PrivateKeyPath(PathBuf),
}

impl fmt::Debug for SecretMaterial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SharedSecret(_) => f.write_str("SharedSecret(<redacted>)"),
            Self::PrivateKeyPath(path) => f.debug_tuple("PrivateKeyPath").field(path).finish(),
        }
    }
}

/// API identity plus the material needed to sign requests.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    method: AuthMethod,
    api_key: String,
    secret: SecretMaterial,
}

impl Credential {
    #[must_use]
    pub fn hmac(api_key: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            method: AuthMethod::Hmac,
            api_key: api_key.into(),
            secret: SecretMaterial::SharedSecret(secret.into()),
        }
    }

    #[must_use]
    pub fn rsa(api_key: impl Into<String>, key_path: impl Into<PathBuf>) -> Self {
        Self {
            method: AuthMethod::Rsa,
            api_key: api_key.into(),
            secret: SecretMaterial::PrivateKeyPath(key_path.into()),
        }
    }

    #[must_use]
    pub fn ed25519(api_key: impl Into<String>, key_path: impl Into<PathBuf>) -> Self {
        Self {
            method: AuthMethod::Ed25519,
            api_key: api_key.into(),
            secret: SecretMaterial::PrivateKeyPath(key_path.into()),
        }
    }

    #[must_use]
    pub const fn method(&self) -> AuthMethod {
        self.method
    }

    #[must_use]
    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    #[must_use]
    pub const fn secret(&self) -> &SecretMaterial {
        &self.secret
    }

    /// Private key file, for the key-file based methods.
    #[must_use]
    pub fn key_path(&self) -> Option<&Path> {
        match &self.secret {
            SecretMaterial::PrivateKeyPath(path) => Some(path),
            SecretMaterial::SharedSecret(_) => None,
        }
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("method", &self.method)
            .field("api_key", &mask(&self.api_key))
            .field("secret", &self.secret)
            .finish()
    }
}

/// Keep the first and last four characters of a key visible.
fn mask(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() <= 8 {
        return "****".to_string();
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{head}...{tail}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_output_redacts_secret() {
        let credential = Credential::hmac("abcdefghijklmnop", "super-secret-value");
        let debug = format!("{credential:?}");
        assert!(!debug.contains("super-secret-value"));
        assert!(!debug.contains("abcdefghijklmnop"));
        assert!(debug.contains("abcd...mnop"));
    }

    #[test]
    fn short_keys_are_fully_masked() {
        assert_eq!(mask("short"), "****");
    }

    #[test]
    fn key_path_only_for_key_file_methods() {
        assert!(Credential::hmac("k", "s").key_path().is_none());
        let rsa = Credential::rsa("k", "/keys/rsa.pem");
        assert_eq!(rsa.key_path(), Some(Path::new("/keys/rsa.pem")));
        assert_eq!(rsa.method(), AuthMethod::Rsa);
    }

    #[test]
    fn configuration_names() {
        assert_eq!(AuthMethod::Hmac.configuration_name(), "HMAC Authentication");
        assert_eq!(AuthMethod::Rsa.configuration_name(), "RSA Authentication");
        assert_eq!(
            AuthMethod::Ed25519.configuration_name(),
            "Ed25519 Authentication"
        );
    }
}
