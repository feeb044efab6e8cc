use serde::{Deserialize, Serialize};

use cafehunter_core::types::Coordinate;

/// What a user sent, after the transport has normalized it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum InboundEvent {
    Text(String),
    /// Raw `ACTION:ARG` payload from a tapped choice or button.
    Command(String),
    Pin(Coordinate),
}

/// An inbound event tagged with its sender.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InboundMessage {
    pub sender_id: String,
    pub event: InboundEvent,
}

impl InboundMessage {
    pub fn text(sender_id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            sender_id: sender_id.into(),
            event: InboundEvent::Text(text.into()),
        }
    }

    pub fn command(sender_id: impl Into<String>, payload: impl Into<String>) -> Self {
        Self {
            sender_id: sender_id.into(),
            event: InboundEvent::Command(payload.into()),
        }
    }

    pub fn pin(sender_id: impl Into<String>, location: Coordinate) -> Self {
        Self {
            sender_id: sender_id.into(),
            event: InboundEvent::Pin(location),
        }
    }
}
