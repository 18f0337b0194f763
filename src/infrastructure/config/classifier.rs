//! Classifier allow-list configuration.

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::application::classifier::ErrorClassifier;

/// `[classifier]` section.
///
/// ```toml
/// [classifier]
/// extra_phrases = ["sandbox only"]
///
/// [classifier.endpoint_codes]
/// "/sapi/v1/margin/account" = [-3003]
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Added to the built-in environment-limitation phrases.
    pub extra_phrases: Vec<String>,
    /// Endpoint name to structured error codes treated as environment gaps.
    pub endpoint_codes: BTreeMap<String, Vec<i64>>,
}

impl ClassifierConfig {
    /// Classifier with the built-in policy plus this section's additions.
    #[must_use]
    pub fn build(&self) -> ErrorClassifier {
        let classifier = self
            .extra_phrases
            .iter()
            .fold(ErrorClassifier::new(), |c, phrase| c.with_phrase(phrase));
        self.endpoint_codes
            .iter()
            .fold(classifier, |c, (endpoint, codes)| {
                c.with_endpoint_codes(endpoint.clone(), codes.iter().copied())
            })
    }
}
