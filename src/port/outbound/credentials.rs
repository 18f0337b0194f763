//! Credential source port.

use crate::domain::{AuthMethod, Credential};

/// Read-only lookup of credential material per signing method.
///
/// Implementations read their backing store once; the matrix builder calls
/// [`CredentialSource::credential`] at most once per method.
pub trait CredentialSource: Send + Sync {
    /// Complete credential for `method`, or `None` when any part is missing.
    fn credential(&self, method: AuthMethod) -> Option<Credential>;
}

impl<T: CredentialSource + ?Sized> CredentialSource for &T {
    fn credential(&self, method: AuthMethod) -> Option<Credential> {
        (**self).credential(method)
    }
}
