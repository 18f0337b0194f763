//! Skip-versus-fail policy for failed calls.
//!
//! [`ErrorClassifier::classify`] is a pure, total function of the observed
//! [`ErrorSignal`]. Rules are evaluated in a fixed order and the first match
//! wins:
//!
//! 1. no error observed: `Continue`
//! 2. undecodable response with HTTP 400: `Fail` (checked ahead of every
//!    skip rule so a malformed request can never be absorbed)
//! 3. run cancelled: `Skip`
//! 4. HTTP 403 or 404: `Skip`
//! 5. HTML error page body: `Skip`
//! 6. any other undecodable response: `Skip`
//! 7. message matches a known environment-limitation phrase: `Skip`
//! 8. otherwise: `Continue` (no opinion; the caller treats it as a failure)
//!
//! Endpoint-specific structured codes are layered on top by
//! [`ErrorClassifier::classify_for`]; they only apply when the generic
//! policy has no opinion.

use std::collections::{BTreeSet, HashMap};

use tracing::debug;

use crate::domain::{Classification, ErrorSignal, SignalKind};

pub const REASON_MALFORMED_REQUEST: &str = "malformed request: must be fixed, never suppressed";
pub const REASON_CANCELLED: &str = "run cancelled";
pub const REASON_UNAVAILABLE: &str = "endpoint unavailable in this environment";
pub const REASON_HTML_PAGE: &str =
    "environment returned an HTML error page instead of the API contract";
pub const REASON_UNPARSABLE: &str = "response parsing limitation, treated as environment gap";

/// Bodies at or below this length are never treated as HTML pages.
pub const HTML_MIN_BODY_LEN: usize = 50;

/// Messages known to mean "this deployment does not offer the feature".
pub const DEFAULT_LIMITATION_PHRASES: &[&str] = &[
    "This service is not available",
    "Feature not supported",
    "not available in testnet",
    "testnet not supported",
];

/// Policy table mapping failed calls to [`Classification`]s.
#[derive(Debug, Clone)]
pub struct ErrorClassifier {
    /// Stored lowercased; matched case-insensitively.
    phrases: Vec<String>,
    endpoint_codes: HashMap<String, BTreeSet<i64>>,
}

impl Default for ErrorClassifier {
    fn default() -> Self {
        Self {
            phrases: DEFAULT_LIMITATION_PHRASES
                .iter()
                .map(|p| p.to_lowercase())
                .collect(),
            endpoint_codes: HashMap::new(),
        }
    }
}

impl ErrorClassifier {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an environment-limitation phrase to the allow-list.
    #[must_use]
    pub fn with_phrase(mut self, phrase: impl AsRef<str>) -> Self {
        let phrase = phrase.as_ref().trim().to_lowercase();
        if !phrase.is_empty() && !self.phrases.contains(&phrase) {
            self.phrases.push(phrase);
        }
        self
    }

    /// Allow-list structured error codes for one endpoint.
    #[must_use]
    pub fn with_endpoint_codes(
        mut self,
        endpoint: impl Into<String>,
        codes: impl IntoIterator<Item = i64>,
    ) -> Self {
        self.endpoint_codes
            .entry(endpoint.into())
            .or_default()
            .extend(codes);
        self
    }

    /// Allow-listed phrases, lowercased.
    #[must_use]
    pub fn phrases(&self) -> &[String] {
        &self.phrases
    }

    /// Whether `code` is an environment limitation for `endpoint`.
    #[must_use]
    pub fn is_allow_listed(&self, endpoint: &str, code: i64) -> bool {
        self.endpoint_codes
            .get(endpoint)
            .is_some_and(|codes| codes.contains(&code))
    }

    /// Apply the generic policy.
    #[must_use]
    pub fn classify(&self, signal: Option<&ErrorSignal>) -> Classification {
        let Some(signal) = signal else {
            return Classification::Continue;
        };

        let status = signal.status();
        let undecodable = signal.is_undecodable();

        if undecodable && status == Some(400) {
            return Classification::fail(REASON_MALFORMED_REQUEST);
        }

        if signal.kind() == SignalKind::Cancelled {
            return Classification::skip(REASON_CANCELLED);
        }

        if matches!(status, Some(403 | 404)) {
            return Classification::skip(REASON_UNAVAILABLE);
        }

        if signal.body().is_some_and(looks_like_html_page) {
            return Classification::skip(REASON_HTML_PAGE);
        }

        if undecodable {
            return Classification::skip(REASON_UNPARSABLE);
        }

        let message = signal.message().to_lowercase();
        if let Some(phrase) = self.phrases.iter().find(|p| message.contains(p.as_str())) {
            return Classification::skip(phrase.clone());
        }

        Classification::Continue
    }

    /// Apply the generic policy, then `endpoint`'s structured-code table.
    ///
    /// A generic `Fail` is final; the table can only turn `Continue` into
    /// `Skip`.
    #[must_use]
    pub fn classify_for(&self, endpoint: &str, signal: Option<&ErrorSignal>) -> Classification {
        let generic = self.classify(signal);
        if !generic.is_continue() {
            return generic;
        }

        match signal.and_then(ErrorSignal::code) {
            Some(code) if self.is_allow_listed(endpoint, code) => {
                debug!(endpoint, code, "Structured code allow-listed for endpoint");
                Classification::skip(format!(
                    "{endpoint}: error code {code} is not supported in this environment"
                ))
            }
            _ => Classification::Continue,
        }
    }
}

/// A non-trivial body that starts with an HTML document marker.
fn looks_like_html_page(body: &str) -> bool {
    if body.len() <= HTML_MIN_BODY_LEN {
        return false;
    }
    let head: String = body.trim_start().chars().take(15).collect();
    let head = head.to_ascii_lowercase();
    head.starts_with("<!doctype html") || head.starts_with("<html")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn html_page() -> String {
        format!(
            "<!DOCTYPE html><html><body>{}</body></html>",
            "Not Found ".repeat(10)
        )
    }

    #[test]
    fn no_error_continues() {
        assert_eq!(ErrorClassifier::new().classify(None), Classification::Continue);
    }

    #[test]
    fn forbidden_and_not_found_skip() {
        let classifier = ErrorClassifier::new();
        for status in [403, 404] {
            let signal = ErrorSignal::api(status, "nope");
            assert_eq!(
                classifier.classify(Some(&signal)),
                Classification::skip(REASON_UNAVAILABLE)
            );
        }
    }

    #[test]
    fn html_body_skips() {
        let signal = ErrorSignal::api(502, "bad gateway").with_body(html_page());
        assert_eq!(
            ErrorClassifier::new().classify(Some(&signal)),
            Classification::skip(REASON_HTML_PAGE)
        );
    }

    #[test]
    fn short_html_body_is_not_a_page() {
        let signal = ErrorSignal::api(500, "err").with_body("<html></html>");
        assert_eq!(
            ErrorClassifier::new().classify(Some(&signal)),
            Classification::Continue
        );
    }

    #[test]
    fn html_detection_ignores_case_and_leading_whitespace() {
        let body = format!("\n  <HTML>{}</HTML>", "x".repeat(80));
        assert!(looks_like_html_page(&body));
        assert!(!looks_like_html_page(&"{\"code\":-1}".repeat(10)));
    }

    #[test]
    fn undecodable_400_fails() {
        let signal = ErrorSignal::undecodable(Some(400));
        assert_eq!(
            ErrorClassifier::new().classify(Some(&signal)),
            Classification::fail(REASON_MALFORMED_REQUEST)
        );
    }

    #[test]
    fn undecodable_400_fails_even_with_html_body_and_known_phrase() {
        let signal = ErrorSignal::new(
            SignalKind::Undecodable,
            "undefined response type: This service is not available",
        )
        .with_status(400)
        .with_body(html_page());
        assert!(ErrorClassifier::new().classify(Some(&signal)).is_fail());
    }

    #[test]
    fn undecodable_other_status_skips() {
        let classifier = ErrorClassifier::new();
        for status in [Some(200), Some(500), None] {
            let signal = ErrorSignal::undecodable(status);
            assert_eq!(
                classifier.classify(Some(&signal)),
                Classification::skip(REASON_UNPARSABLE)
            );
        }
    }

    #[test]
    fn known_phrase_skips_case_insensitively() {
        let signal = ErrorSignal::api(500, "FEATURE NOT SUPPORTED for this account");
        assert_eq!(
            ErrorClassifier::new().classify(Some(&signal)),
            Classification::skip("feature not supported")
        );
    }

    #[test]
    fn extra_phrase_is_honoured() {
        let classifier = ErrorClassifier::new().with_phrase("Sandbox only");
        let signal = ErrorSignal::api(500, "endpoint is sandbox only");
        assert!(classifier.classify(Some(&signal)).is_skip());
    }

    #[test]
    fn plain_400_has_no_opinion() {
        let signal = ErrorSignal::api(400, "Mandatory parameter 'symbol' was not sent")
            .with_code(-1102);
        assert_eq!(
            ErrorClassifier::new().classify(Some(&signal)),
            Classification::Continue
        );
    }

    #[test]
    fn cancellation_skips_and_timeout_does_not() {
        let classifier = ErrorClassifier::new();
        assert_eq!(
            classifier.classify(Some(&ErrorSignal::cancelled())),
            Classification::skip(REASON_CANCELLED)
        );
        let timeout = ErrorSignal::timeout(std::time::Duration::from_secs(30));
        assert_eq!(classifier.classify(Some(&timeout)), Classification::Continue);
    }

    #[test]
    fn malformed_request_outranks_cancellation() {
        let classifier = ErrorClassifier::new();
        let cancelled_mid_parse =
            ErrorSignal::new(SignalKind::Cancelled, "undefined response type").with_status(400);
        assert_eq!(
            classifier.classify(Some(&cancelled_mid_parse)),
            Classification::fail(REASON_MALFORMED_REQUEST)
        );
        let cancelled_not_found = ErrorSignal::cancelled().with_status(404);
        assert_eq!(
            classifier.classify(Some(&cancelled_not_found)),
            Classification::skip(REASON_CANCELLED)
        );
    }

    #[test]
    fn classification_is_deterministic() {
        let classifier = ErrorClassifier::new().with_endpoint_codes("Margin Account", [-3003]);
        let signals = [
            ErrorSignal::api(404, "x"),
            ErrorSignal::undecodable(Some(400)),
            ErrorSignal::api(400, "bad").with_code(-3003),
            ErrorSignal::transport("connection reset"),
        ];
        for signal in &signals {
            let first = classifier.classify_for("Margin Account", Some(signal));
            for _ in 0..10 {
                assert_eq!(classifier.classify_for("Margin Account", Some(signal)), first);
            }
        }
    }

    #[test]
    fn endpoint_code_table_turns_continue_into_skip() {
        let classifier = ErrorClassifier::new().with_endpoint_codes("Margin Account", [-3003]);
        let signal = ErrorSignal::api(400, "Margin account does not exist").with_code(-3003);

        assert!(classifier.classify_for("Margin Account", Some(&signal)).is_skip());
        assert!(classifier.classify_for("Account Info", Some(&signal)).is_continue());
        assert!(classifier.classify(Some(&signal)).is_continue());
    }

    #[test]
    fn endpoint_code_table_never_overrides_malformed_request() {
        let classifier = ErrorClassifier::new().with_endpoint_codes("Create Order", [-1102]);
        let signal = ErrorSignal::undecodable(Some(400)).with_code(-1102);
        assert!(classifier.classify_for("Create Order", Some(&signal)).is_fail());
    }

    #[test]
    fn duplicate_and_blank_phrases_are_ignored() {
        let before = ErrorClassifier::new().phrases().len();
        let classifier = ErrorClassifier::new()
            .with_phrase("feature not supported")
            .with_phrase("   ");
        assert_eq!(classifier.phrases().len(), before);
    }
}
