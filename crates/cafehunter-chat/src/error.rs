//! Error types for the dialogue engine.

use cafehunter_nlu::ClassifierError;
use cafehunter_places::ResolverError;
use cafehunter_spatial::SpatialError;

use crate::state_machine::{DialogueEvent, DialogueState};

/// Errors from parsing a command payload.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PayloadError {
    #[error("unknown command: {0}")]
    UnknownAction(String),
    #[error("malformed argument for {action}: {reason}")]
    MalformedArgument { action: String, reason: String },
}

/// Errors from the dialogue engine.
#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error("event {event} is not allowed in state {state}")]
    InvalidTransition {
        state: DialogueState,
        event: DialogueEvent,
    },
    #[error(transparent)]
    Classifier(#[from] ClassifierError),
    #[error(transparent)]
    Resolver(#[from] ResolverError),
    #[error("spatial query failed: {0}")]
    Spatial(#[from] SpatialError),
    #[error(transparent)]
    Payload(#[from] PayloadError),
    #[error("invalid outbound message: {0}")]
    InvalidOutbound(String),
}

impl ChatError {
    /// Whether the error came from a remote collaborator or the cafe store.
    pub fn is_adapter_failure(&self) -> bool {
        matches!(
            self,
            ChatError::Classifier(_) | ChatError::Resolver(_) | ChatError::Spatial(_)
        )
    }
}
