//! Privilege tiers a test unit can require and a configuration can grant.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Level of authenticated access.
///
/// Tiers are totally ordered: `None < UserData < Trade`. A granted tier
/// satisfies a required tier when it is greater than or equal to it.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PrivilegeTier {
    /// Public, unauthenticated endpoints.
    #[default]
    None,
    /// Read-only account data.
    UserData,
    /// Trading and other write access.
    Trade,
}

impl PrivilegeTier {
    /// All tiers in ascending order.
    pub const ALL: [Self; 3] = [Self::None, Self::UserData, Self::Trade];

    /// Whether this (granted) tier is enough for `required`.
    #[must_use]
    pub fn satisfies(self, required: Self) -> bool {
        self >= required
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::None => "NONE",
            Self::UserData => "USER_DATA",
            Self::Trade => "TRADE",
        }
    }
}

impl fmt::Display for PrivilegeTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
