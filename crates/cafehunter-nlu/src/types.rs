use serde::{Deserialize, Serialize};

/// A typed span extracted from an utterance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub text: String,
    pub kind: String,
}

impl Entity {
    pub fn new(text: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            kind: kind.into(),
        }
    }
}

/// Outcome of classifying one utterance. Never stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntentResult {
    pub intent: String,
    pub confidence: f64,
    /// Entities in the order the classifier reported them.
    pub entities: Vec<Entity>,
}

impl IntentResult {
    /// Whether the top intent is `label`, ignoring ASCII case.
    pub fn is_intent(&self, label: &str) -> bool {
        self.intent.eq_ignore_ascii_case(label)
    }

    /// Texts of the entities whose type is `entity_type` (case-insensitive),
    /// in classifier order. Blank texts are dropped.
    pub fn locations(&self, entity_type: &str) -> Vec<String> {
        self.entities
            .iter()
            .filter(|e| e.kind.eq_ignore_ascii_case(entity_type))
            .map(|e| e.text.trim())
            .filter(|text| !text.is_empty())
            .map(str::to_string)
            .collect()
    }
}
