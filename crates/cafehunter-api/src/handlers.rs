//! Route handlers for the webhook and health endpoints.

use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use crate::error::ApiError;
use crate::state::AppState;
use crate::webhook::{WebhookDelivery, PAGE_OBJECT};

/// Body returned once a delivery has been processed.
pub const EVENT_RECEIVED: &str = "EVENT_RECEIVED";

// =============================================================================
// Verification
// =============================================================================

/// Query string Messenger sends when subscribing the webhook.
#[derive(Debug, Deserialize)]
pub struct VerifyParams {
    #[serde(rename = "hub.mode")]
    pub mode: Option<String>,
    #[serde(rename = "hub.verify_token")]
    pub verify_token: Option<String>,
    #[serde(rename = "hub.challenge")]
    pub challenge: Option<String>,
}

/// GET /webhook - echo the challenge when the verify token matches.
pub async fn verify_webhook(
    State(state): State<AppState>,
    Query(params): Query<VerifyParams>,
) -> Result<String, ApiError> {
    let expected = &state.config.messenger.verify_token;
    let token_matches =
        !expected.is_empty() && params.verify_token.as_deref() == Some(expected.as_str());
    let mode_ok = params.mode.as_deref().map_or(true, |m| m == "subscribe");

    if token_matches && mode_ok {
        info!("Webhook verified");
        Ok(params.challenge.unwrap_or_default())
    } else {
        warn!(mode = ?params.mode, "Webhook verification failed");
        Err(ApiError::Forbidden("verification token mismatch".to_string()))
    }
}

// =============================================================================
// Delivery
// =============================================================================

/// POST /webhook - handle a delivered batch.
///
/// Messages are handled one at a time in delivery order. A failed send is
/// logged and does not stop the rest of the batch.
pub async fn receive_webhook(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<&'static str, ApiError> {
    let delivery: WebhookDelivery = serde_json::from_slice(&body).map_err(|e| {
        warn!(error = %e, "Rejected undecodable webhook delivery");
        ApiError::BadRequest(format!("invalid webhook payload: {}", e))
    })?;

    if delivery.object != PAGE_OBJECT {
        warn!(object = %delivery.object, "Rejected delivery for unsupported object");
        return Err(ApiError::BadRequest(format!(
            "unsupported object: {}",
            delivery.object
        )));
    }

    let messages = delivery.into_messages();
    debug!(count = messages.len(), "Processing webhook batch");

    for message in &messages {
        let replies = state.engine.handle(message).await;
        for reply in &replies {
            if let Err(e) = state.messenger.send(&message.sender_id, reply).await {
                error!(user_id = %message.sender_id, error = %e, "Failed to deliver reply");
            }
        }
    }

    Ok(EVENT_RECEIVED)
}

// =============================================================================
// Health
// =============================================================================

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_secs: u64,
    pub cafes: u64,
    pub sessions: usize,
}

/// GET /health - service status and basic counters.
pub async fn health(State(state): State<AppState>) -> Result<Json<HealthResponse>, ApiError> {
    let cafes = state.cafes.count()?;

    Ok(Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: state.start_time.elapsed().as_secs(),
        cafes,
        sessions: state.engine.sessions().len(),
    }))
}
