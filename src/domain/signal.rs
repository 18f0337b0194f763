//! Externally observed outcome of a failed call attempt.

use std::fmt;
use std::time::Duration;

use thiserror::Error;

/// Marker the generated clients put in errors for bodies they cannot decode.
pub const UNDECODABLE_MARKER: &str = "undefined response type";

/// Broad category of a failed call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SignalKind {
    /// The service answered with an error payload.
    Api,
    /// The client could not parse the response into the expected shape.
    Undecodable,
    /// Connection-level failure.
    Transport,
    /// The call exceeded its deadline.
    Timeout,
    /// The run was cancelled while the call was pending.
    Cancelled,
}

/// Error produced by the external client for one call attempt.
///
/// Only the classifier inspects these fields; test bodies just propagate
/// the signal with `?`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub struct ErrorSignal {
    kind: SignalKind,
    status: Option<u16>,
    code: Option<i64>,
    body: Option<String>,
    message: String,
}

impl ErrorSignal {
    #[must_use]
    pub fn new(kind: SignalKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            status: None,
            code: None,
            body: None,
            message: message.into(),
        }
    }

    /// Error response from the service with an HTTP status.
    #[must_use]
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::new(SignalKind::Api, message).with_status(status)
    }

    /// Response the client could not parse.
    #[must_use]
    pub fn undecodable(status: Option<u16>) -> Self {
        let signal = Self::new(SignalKind::Undecodable, UNDECODABLE_MARKER);
        match status {
            Some(status) => signal.with_status(status),
            None => signal,
        }
    }

    #[must_use]
    pub fn transport(message: impl Into<String>) -> Self {
        Self::new(SignalKind::Transport, message)
    }

    #[must_use]
    pub fn timeout(after: Duration) -> Self {
        Self::new(SignalKind::Timeout, format!("timed out after {after:?}"))
    }

    #[must_use]
    pub fn cancelled() -> Self {
        Self::new(SignalKind::Cancelled, "run cancelled")
    }

    #[must_use]
    pub const fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    #[must_use]
    pub const fn with_code(mut self, code: i64) -> Self {
        self.code = Some(code);
        self
    }

    #[must_use]
    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    #[must_use]
    pub const fn kind(&self) -> SignalKind {
        self.kind
    }

    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        self.status
    }

    #[must_use]
    pub const fn code(&self) -> Option<i64> {
        self.code
    }

    #[must_use]
    pub fn body(&self) -> Option<&str> {
        self.body.as_deref()
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Whether the client reported that the response shape could not be parsed.
    #[must_use]
    pub fn is_undecodable(&self) -> bool {
        self.kind == SignalKind::Undecodable || self.message.contains(UNDECODABLE_MARKER)
    }
}

impl fmt::Display for ErrorSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(status) = self.status {
            write!(f, "HTTP {status} ")?;
        }
        if let Some(code) = self.code {
            write!(f, "code {code} ")?;
        }
        f.write_str(&self.message)?;
        if let Some(body) = self.body.as_deref().filter(|b| !b.is_empty()) {
            write!(f, " (body: {})", truncate(body, 512))?;
        }
        Ok(())
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}
