//! Outbound transport: Graph Send API.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use tracing::debug;

use cafehunter_chat::{Card, Choice, Outbound};
use cafehunter_core::config::MessengerConfig;

#[derive(Debug, thiserror::Error)]
pub enum MessengerError {
    #[error("send failed: {0}")]
    Transport(String),
    #[error("send rejected with status {status}: {body}")]
    Rejected { status: u16, body: String },
    #[error("messenger misconfigured: {0}")]
    Config(String),
}

/// Delivers outbound instructions to a user.
#[async_trait]
pub trait Messenger: Send + Sync {
    async fn send(&self, recipient_id: &str, message: &Outbound) -> Result<(), MessengerError>;
}

// =============================================================================
// Send API wire format
// =============================================================================

#[derive(Debug, Serialize, PartialEq)]
pub struct SendRequest<'a> {
    pub recipient: Recipient<'a>,
    pub message: WireMessage<'a>,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct Recipient<'a> {
    pub id: &'a str,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct WireMessage<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<&'a str>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub quick_replies: Vec<WireQuickReply<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attachment: Option<WireAttachment<'a>>,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct WireQuickReply<'a> {
    pub content_type: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload: Option<&'a str>,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct WireAttachment<'a> {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub payload: WireTemplate<'a>,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct WireTemplate<'a> {
    pub template_type: &'static str,
    pub elements: Vec<WireElement<'a>>,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct WireElement<'a> {
    pub title: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub item_url: Option<&'a str>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub buttons: Vec<WireButton<'a>>,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct WireButton<'a> {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub url: &'a str,
    pub title: &'a str,
}

impl<'a> SendRequest<'a> {
    pub fn new(recipient_id: &'a str, message: &'a Outbound) -> Self {
        let message = match message {
            Outbound::Text { text } => WireMessage {
                text: Some(text.as_str()),
                quick_replies: Vec::new(),
                attachment: None,
            },
            Outbound::Ask(question) => WireMessage {
                text: Some(question.text.as_str()),
                quick_replies: question.choices.iter().map(quick_reply).collect(),
                attachment: None,
            },
            Outbound::Carousel { cards } => WireMessage {
                text: None,
                quick_replies: Vec::new(),
                attachment: Some(WireAttachment {
                    kind: "template",
                    payload: WireTemplate {
                        template_type: "generic",
                        elements: cards.iter().map(element).collect(),
                    },
                }),
            },
        };
        Self {
            recipient: Recipient { id: recipient_id },
            message,
        }
    }
}

fn quick_reply(choice: &Choice) -> WireQuickReply<'_> {
    match choice {
        Choice::Reply { title, payload } => WireQuickReply {
            content_type: "text",
            title: Some(title.as_str()),
            payload: Some(payload.as_str()),
        },
        Choice::RequestLocation => WireQuickReply {
            content_type: "location",
            title: None,
            payload: None,
        },
    }
}

fn element(card: &Card) -> WireElement<'_> {
    WireElement {
        title: &card.title,
        subtitle: card.subtitle.as_deref(),
        image_url: card.image_url.as_deref(),
        item_url: card.item_url.as_deref(),
        buttons: card
            .buttons
            .iter()
            .map(|b| WireButton {
                kind: "web_url",
                url: &b.url,
                title: &b.title,
            })
            .collect(),
    }
}

// =============================================================================
// GraphMessenger
// =============================================================================

/// Posts messages to the Graph Send API with the page access token.
pub struct GraphMessenger {
    http: Client,
    send_api_url: String,
    page_token: String,
}

impl GraphMessenger {
    pub fn new(config: &MessengerConfig) -> Result<Self, MessengerError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| MessengerError::Config(format!("Failed to create HTTP client: {}", e)))?;
        Ok(Self {
            http,
            send_api_url: config.send_api_url.clone(),
            page_token: config.page_token.clone(),
        })
    }
}

#[async_trait]
impl Messenger for GraphMessenger {
    async fn send(&self, recipient_id: &str, message: &Outbound) -> Result<(), MessengerError> {
        let request = SendRequest::new(recipient_id, message);
        let response = self
            .http
            .post(&self.send_api_url)
            .query(&[("access_token", self.page_token.as_str())])
            .json(&request)
            .send()
            .await
            .map_err(|e| MessengerError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(MessengerError::Rejected {
                status: status.as_u16(),
                body: body.chars().take(200).collect(),
            });
        }
        debug!(recipient_id = %recipient_id, "Message delivered");
        Ok(())
    }
}
