//! Turns available credentials into the ordered list of run configurations.

use tracing::{debug, info};

use crate::domain::{AuthMethod, PrivilegeTier, RunConfiguration};
use crate::port::outbound::credentials::CredentialSource;

/// Builds the configuration matrix once at startup.
///
/// Rules, in order:
///
/// - With `test_all_methods`, every available method (HMAC, RSA, Ed25519)
///   gets a TRADE-tier configuration.
/// - Otherwise Ed25519 is used when available, falling back to HMAC, so a
///   single TRADE-tier configuration runs the authenticated units.
/// - The public NONE-tier configuration is always appended last.
pub struct CredentialMatrixBuilder<S> {
    source: S,
    test_all_methods: bool,
}

impl<S: CredentialSource> CredentialMatrixBuilder<S> {
    pub const fn new(source: S) -> Self {
        Self {
            source,
            test_all_methods: false,
        }
    }

    /// Run every available method instead of only the preferred one.
    #[must_use]
    pub const fn test_all_methods(mut self, enabled: bool) -> Self {
        self.test_all_methods = enabled;
        self
    }

    #[must_use]
    pub fn build_configurations(&self) -> Vec<RunConfiguration> {
        let methods: &[AuthMethod] = if self.test_all_methods {
            &AuthMethod::ALL
        } else {
            &[AuthMethod::Ed25519, AuthMethod::Hmac]
        };

        let mut configurations = Vec::with_capacity(methods.len() + 1);
        for &method in methods {
            match self.source.credential(method) {
                Some(credential) => {
                    debug!(method = %method, "Credential available");
                    configurations.push(RunConfiguration::authenticated(credential));
                    if !self.test_all_methods {
                        break;
                    }
                }
                None => debug!(method = %method, "Credential not configured"),
            }
        }

        configurations.push(RunConfiguration::public());

        info!(
            configurations = configurations.len(),
            test_all_methods = self.test_all_methods,
            "Configuration matrix built"
        );
        configurations
    }
}

/// Highest tier granted by any configuration.
#[must_use]
pub fn highest_tier(configurations: &[RunConfiguration]) -> PrivilegeTier {
    configurations
        .iter()
        .map(RunConfiguration::granted)
        .max()
        .unwrap_or_default()
}
