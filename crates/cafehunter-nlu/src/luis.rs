//! LUIS v2 prediction client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};

use cafehunter_core::config::ClassifierConfig;

use crate::classifier::IntentClassifier;
use crate::error::ClassifierError;
use crate::types::{Entity, IntentResult};

/// Label reported when LUIS returns no top scoring intent.
const NONE_INTENT: &str = "None";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LuisResponse {
    top_scoring_intent: Option<LuisIntent>,
    #[serde(default)]
    entities: Vec<LuisEntity>,
}

#[derive(Debug, Deserialize)]
struct LuisIntent {
    intent: String,
    #[serde(default)]
    score: f64,
}

#[derive(Debug, Deserialize)]
struct LuisEntity {
    entity: String,
    #[serde(rename = "type")]
    kind: String,
}

impl From<LuisResponse> for IntentResult {
    fn from(response: LuisResponse) -> Self {
        let (intent, confidence) = match response.top_scoring_intent {
            Some(top) => (top.intent, top.score),
            None => (NONE_INTENT.to_string(), 0.0),
        };
        IntentResult {
            intent,
            confidence,
            entities: response
                .entities
                .into_iter()
                .map(|e| Entity::new(e.entity, e.kind))
                .collect(),
        }
    }
}

/// Classifier backed by a published LUIS application.
pub struct LuisClassifier {
    http: Client,
    url: String,
    app_key: String,
}

impl LuisClassifier {
    pub fn new(config: &ClassifierConfig) -> Result<Self, ClassifierError> {
        if config.app_id.trim().is_empty() {
            return Err(ClassifierError::Config(
                "classifier.app_id must be set".to_string(),
            ));
        }
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ClassifierError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http,
            url: format!("{}/{}", config.endpoint.trim_end_matches('/'), config.app_id),
            app_key: config.app_key.clone(),
        })
    }
}

#[async_trait]
impl IntentClassifier for LuisClassifier {
    async fn classify(&self, utterance: &str) -> Result<IntentResult, ClassifierError> {
        let response = self
            .http
            .get(&self.url)
            .query(&[
                ("subscription-key", self.app_key.as_str()),
                ("q", utterance),
                ("verbose", "true"),
            ])
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "LUIS request failed");
                ClassifierError::Unavailable(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            warn!(status = %status, "LUIS returned an error status");
            return Err(ClassifierError::Unavailable(format!("status {}", status)));
        }

        let body: LuisResponse = response.json().await.map_err(|e| {
            warn!(error = %e, "LUIS response could not be decoded");
            ClassifierError::Unavailable(e.to_string())
        })?;

        let result = IntentResult::from(body);
        debug!(
            intent = %result.intent,
            confidence = result.confidence,
            entities = result.entities.len(),
            "Utterance classified"
        );
        Ok(result)
    }
}
