//! The classifier seam used by the dialogue engine.

use async_trait::async_trait;

use crate::error::ClassifierError;
use crate::types::IntentResult;

/// Classifies a free-text utterance.
#[async_trait]
pub trait IntentClassifier: Send + Sync {
    async fn classify(&self, utterance: &str) -> Result<IntentResult, ClassifierError>;
}
