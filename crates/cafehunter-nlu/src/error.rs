//! Error types for intent classification.

/// Errors from an intent classifier.
#[derive(Debug, thiserror::Error)]
pub enum ClassifierError {
    /// The classifier could not be reached or answered with something
    /// unusable. Network, status and decoding failures all end up here.
    #[error("classification unavailable: {0}")]
    Unavailable(String),
    #[error("classifier misconfigured: {0}")]
    Config(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classifier_error_display() {
        let err = ClassifierError::Unavailable("status 503".to_string());
        assert_eq!(err.to_string(), "classification unavailable: status 503");

        let err = ClassifierError::Config("missing app id".to_string());
        assert_eq!(err.to_string(), "classifier misconfigured: missing app id");
    }
}
