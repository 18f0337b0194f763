//! In-memory credential source.

use crate::domain::{AuthMethod, Credential};
use crate::port::outbound::credentials::CredentialSource;

/// Credential source with a fixed set of methods available.
#[derive(Debug, Clone, Default)]
pub struct StaticCredentials {
    hmac: Option<Credential>,
    rsa: Option<Credential>,
    ed25519: Option<Credential>,
}

impl StaticCredentials {
    /// No method configured.
    pub fn none() -> Self {
        Self::default()
    }

    /// Every method configured.
    pub fn all() -> Self {
        Self::none().with_hmac().with_rsa().with_ed25519()
    }

    pub fn with_hmac(mut self) -> Self {
        self.hmac = Some(Credential::hmac("hmac-test-api-key", "hmac-test-secret"));
        self
    }

    pub fn with_rsa(mut self) -> Self {
        self.rsa = Some(Credential::rsa("rsa-test-api-key", "keys/test-rsa.pem"));
        self
    }

    pub fn with_ed25519(mut self) -> Self {
        self.ed25519 = Some(Credential::ed25519(
            "ed25519-test-api-key",
            "keys/test-ed25519.pem",
        ));
        self
    }
}

impl CredentialSource for StaticCredentials {
    fn credential(&self, method: AuthMethod) -> Option<Credential> {
        match method {
            AuthMethod::Hmac => self.hmac.clone(),
            AuthMethod::Rsa => self.rsa.clone(),
            AuthMethod::Ed25519 => self.ed25519.clone(),
        }
    }
}
