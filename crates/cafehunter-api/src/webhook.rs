//! Messenger webhook delivery format and its normalization.
//!
//! A delivery is a batch: one or more entries, each with one or more
//! messaging events. Quick replies and postbacks become commands, location
//! attachments become pins, plain messages become text. Echoes, delivery
//! and read receipts are dropped.

use serde::Deserialize;
use tracing::{debug, warn};

use cafehunter_chat::{InboundEvent, InboundMessage};
use cafehunter_core::types::Coordinate;

/// Object type Messenger uses for page subscriptions.
pub const PAGE_OBJECT: &str = "page";

#[derive(Debug, Deserialize)]
pub struct WebhookDelivery {
    pub object: String,
    #[serde(default)]
    pub entry: Vec<Entry>,
}

#[derive(Debug, Deserialize)]
pub struct Entry {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub messaging: Vec<MessagingEvent>,
}

#[derive(Debug, Deserialize)]
pub struct MessagingEvent {
    pub sender: Party,
    pub message: Option<MessageBody>,
    pub postback: Option<Postback>,
}

#[derive(Debug, Deserialize)]
pub struct Party {
    pub id: String,
}

#[derive(Debug, Deserialize)]
pub struct MessageBody {
    #[serde(default)]
    pub is_echo: bool,
    pub text: Option<String>,
    pub quick_reply: Option<QuickReply>,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
}

#[derive(Debug, Deserialize)]
pub struct QuickReply {
    pub payload: String,
}

#[derive(Debug, Deserialize)]
pub struct Postback {
    pub payload: String,
}

#[derive(Debug, Deserialize)]
pub struct Attachment {
    #[serde(rename = "type")]
    pub kind: String,
    pub payload: Option<AttachmentPayload>,
}

#[derive(Debug, Deserialize)]
pub struct AttachmentPayload {
    pub coordinates: Option<Coordinates>,
}

#[derive(Debug, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub long: f64,
}

impl WebhookDelivery {
    /// All messages in delivery order, normalized for the dialogue engine.
    pub fn into_messages(self) -> Vec<InboundMessage> {
        self.entry
            .into_iter()
            .flat_map(|entry| entry.messaging)
            .filter_map(normalize)
            .collect()
    }
}

/// Normalize one messaging event, or `None` when there is nothing for the
/// engine to act on.
pub fn normalize(event: MessagingEvent) -> Option<InboundMessage> {
    let sender_id = event.sender.id;

    if let Some(postback) = event.postback {
        return Some(InboundMessage {
            sender_id,
            event: InboundEvent::Command(postback.payload),
        });
    }

    let Some(message) = event.message else {
        debug!(sender_id = %sender_id, "Ignoring non-message event");
        return None;
    };
    if message.is_echo {
        return None;
    }

    if let Some(quick_reply) = message.quick_reply {
        return Some(InboundMessage {
            sender_id,
            event: InboundEvent::Command(quick_reply.payload),
        });
    }

    for attachment in &message.attachments {
        if attachment.kind != "location" {
            continue;
        }
        let coords = attachment.payload.as_ref().and_then(|p| p.coordinates.as_ref());
        match coords.map(|c| Coordinate::new(c.lat, c.long)) {
            Some(point) if point.is_valid() => {
                return Some(InboundMessage {
                    sender_id,
                    event: InboundEvent::Pin(point),
                });
            }
            _ => warn!(sender_id = %sender_id, "Location attachment without usable coordinates"),
        }
    }

    match message.text {
        Some(text) if !text.trim().is_empty() => Some(InboundMessage {
            sender_id,
            event: InboundEvent::Text(text),
        }),
        _ => {
            debug!(sender_id = %sender_id, "Ignoring message without text");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode(json: &str) -> Vec<InboundMessage> {
        serde_json::from_str::<WebhookDelivery>(json)
            .unwrap()
            .into_messages()
    }

    #[test]
    fn test_text_message() {
        let messages = decode(
            r#"{"object":"page","entry":[{"id":"p1","time":1,"messaging":[
                {"sender":{"id":"u1"},"recipient":{"id":"p1"},"timestamp":1,
                 "message":{"mid":"m1","text":"hello"}}
            ]}]}"#,
        );
        assert_eq!(messages, vec![InboundMessage::text("u1", "hello")]);
    }

    #[test]
    fn test_quick_reply_wins_over_text() {
        let messages = decode(
            r#"{"object":"page","entry":[{"messaging":[
                {"sender":{"id":"u1"},"message":{"text":"Yes",
                 "quick_reply":{"payload":"FIND_CAFE_GEOCODING:25.0421,121.5074"}}}
            ]}]}"#,
        );
        assert_eq!(
            messages,
            vec![InboundMessage::command(
                "u1",
                "FIND_CAFE_GEOCODING:25.0421,121.5074"
            )]
        );
    }

    #[test]
    fn test_postback_is_command() {
        let messages = decode(
            r#"{"object":"page","entry":[{"messaging":[
                {"sender":{"id":"u2"},"postback":{"title":"Get Started","payload":"GET_STARTED"}}
            ]}]}"#,
        );
        assert_eq!(messages, vec![InboundMessage::command("u2", "GET_STARTED")]);
    }

    #[test]
    fn test_location_attachment_is_pin() {
        let messages = decode(
            r#"{"object":"page","entry":[{"messaging":[
                {"sender":{"id":"u3"},"message":{"attachments":[
                    {"type":"location","title":"Pinned","payload":{"coordinates":{"lat":25.033,"long":121.5654}}}
                ]}}
            ]}]}"#,
        );
        assert_eq!(
            messages,
            vec![InboundMessage::pin("u3", Coordinate::new(25.033, 121.5654))]
        );
    }

    #[test]
    fn test_receipts_echoes_and_images_dropped() {
        let messages = decode(
            r#"{"object":"page","entry":[{"messaging":[
                {"sender":{"id":"u1"},"delivery":{"mids":["m1"],"watermark":1}},
                {"sender":{"id":"u1"},"read":{"watermark":1}},
                {"sender":{"id":"p1"},"message":{"is_echo":true,"text":"Hi!"}},
                {"sender":{"id":"u1"},"message":{"attachments":[{"type":"image","payload":{"url":"https://x"}}]}}
            ]}]}"#,
        );
        assert!(messages.is_empty());
    }

    #[test]
    fn test_batch_order_preserved_across_entries() {
        let messages = decode(
            r#"{"object":"page","entry":[
                {"messaging":[{"sender":{"id":"a"},"message":{"text":"one"}}]},
                {"messaging":[{"sender":{"id":"b"},"message":{"text":"two"}},
                              {"sender":{"id":"a"},"message":{"text":"three"}}]}
            ]}"#,
        );
        let texts: Vec<_> = messages
            .iter()
            .map(|m| (m.sender_id.as_str(), m.event.clone()))
            .collect();
        assert_eq!(
            texts,
            vec![
                ("a", InboundEvent::Text("one".to_string())),
                ("b", InboundEvent::Text("two".to_string())),
                ("a", InboundEvent::Text("three".to_string())),
            ]
        );
    }

    #[test]
    fn test_missing_sender_is_decode_error() {
        let result = serde_json::from_str::<WebhookDelivery>(
            r#"{"object":"page","entry":[{"messaging":[{"message":{"text":"hi"}}]}]}"#,
        );
        assert!(result.is_err());
    }
}
