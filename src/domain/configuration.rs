//! Runnable (credential, granted tier) combinations.

use super::credential::{AuthMethod, Credential};
use super::privilege::PrivilegeTier;

/// Display name of the unauthenticated configuration.
pub const PUBLIC_CONFIGURATION: &str = "Public Endpoints";

/// One runnable combination of credential method and granted tier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfiguration {
    name: String,
    credential: Option<Credential>,
    granted: PrivilegeTier,
}

impl RunConfiguration {
    /// The unauthenticated configuration used for public endpoints.
    #[must_use]
    pub fn public() -> Self {
        Self {
            name: PUBLIC_CONFIGURATION.to_string(),
            credential: None,
            granted: PrivilegeTier::None,
        }
    }

    /// A configuration backed by `credential`, granted the highest tier.
    #[must_use]
    pub fn authenticated(credential: Credential) -> Self {
        Self {
            name: credential.method().configuration_name().to_string(),
            credential: Some(credential),
            granted: PrivilegeTier::Trade,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub const fn credential(&self) -> Option<&Credential> {
        self.credential.as_ref()
    }

    #[must_use]
    pub const fn granted(&self) -> PrivilegeTier {
        self.granted
    }

    #[must_use]
    pub fn method(&self) -> Option<AuthMethod> {
        self.credential.as_ref().map(Credential::method)
    }

    #[must_use]
    pub const fn is_public(&self) -> bool {
        self.credential.is_none()
    }

    /// Whether this configuration may run a unit requiring `required`.
    #[must_use]
    pub fn can_run(&self, required: PrivilegeTier) -> bool {
        self.granted.satisfies(required)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn public_configuration_has_no_credential() {
        let config = RunConfiguration::public();
        assert_eq!(config.name(), "Public Endpoints");
        assert!(config.is_public());
        assert_eq!(config.granted(), PrivilegeTier::None);
        assert!(config.can_run(PrivilegeTier::None));
        assert!(!config.can_run(PrivilegeTier::UserData));
    }

    #[test]
    fn authenticated_configuration_grants_trade() {
        let config = RunConfiguration::authenticated(Credential::ed25519("key", "/k.pem"));
        assert_eq!(config.name(), "Ed25519 Authentication");
        assert_eq!(config.method(), Some(AuthMethod::Ed25519));
        assert!(config.can_run(PrivilegeTier::Trade));
    }
}
