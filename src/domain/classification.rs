//! Three-way verdict produced by the error classifier.

use std::fmt;

/// What to do with an observed call outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    /// No error, or the classifier has no opinion.
    Continue,
    /// Environment limitation; the pair is recorded as skipped.
    Skip(String),
    /// Real defect; the pair is recorded as failed.
    Fail(String),
}

impl Classification {
    #[must_use]
    pub fn skip(reason: impl Into<String>) -> Self {
        Self::Skip(reason.into())
    }

    #[must_use]
    pub fn fail(reason: impl Into<String>) -> Self {
        Self::Fail(reason.into())
    }

    #[must_use]
    pub const fn is_continue(&self) -> bool {
        matches!(self, Self::Continue)
    }

    #[must_use]
    pub const fn is_skip(&self) -> bool {
        matches!(self, Self::Skip(_))
    }

    #[must_use]
    pub const fn is_fail(&self) -> bool {
        matches!(self, Self::Fail(_))
    }

    #[must_use]
    pub fn reason(&self) -> Option<&str> {
        match self {
            Self::Continue => None,
            Self::Skip(reason) | Self::Fail(reason) => Some(reason),
        }
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Continue => f.write_str("continue"),
            Self::Skip(reason) => write!(f, "skip: {reason}"),
            Self::Fail(reason) => write!(f, "fail: {reason}"),
        }
    }
}
