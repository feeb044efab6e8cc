//! Outbound instructions handed to the transport.
//!
//! Every instruction is built through a constructor that enforces the
//! display-surface limits, so the transport never has to reject one.

use serde::{Deserialize, Serialize};

use crate::error::ChatError;
use crate::payload::Command;

/// Most choices a single question may offer.
pub const MAX_CHOICES: usize = 11;
/// Choice titles longer than this are cut.
pub const MAX_CHOICE_TITLE_CHARS: usize = 20;
/// Most cards a single carousel may hold.
pub const MAX_CARDS: usize = 10;
pub const MAX_BUTTONS: usize = 3;
pub const MAX_CARD_TITLE_CHARS: usize = 80;
/// Subtitles longer than this are cut.
pub const MAX_CARD_SUBTITLE_CHARS: usize = 80;
pub const MAX_PAYLOAD_BYTES: usize = 1000;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Outbound {
    Text { text: String },
    Carousel { cards: Vec<Card> },
    Ask(Question),
}

impl Outbound {
    pub fn text(text: impl Into<String>) -> Result<Self, ChatError> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(ChatError::InvalidOutbound("text must not be empty".to_string()));
        }
        Ok(Outbound::Text { text })
    }

    pub fn carousel(cards: Vec<Card>) -> Result<Self, ChatError> {
        if cards.is_empty() || cards.len() > MAX_CARDS {
            return Err(ChatError::InvalidOutbound(format!(
                "carousel must hold 1 to {} cards, got {}",
                MAX_CARDS,
                cards.len()
            )));
        }
        for card in &cards {
            card.validate()?;
        }
        Ok(Outbound::Carousel { cards })
    }

    pub fn ask(text: impl Into<String>, choices: Vec<Choice>) -> Result<Self, ChatError> {
        Question::new(text, choices).map(Outbound::Ask)
    }
}

/// A prompt with tappable choices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    pub text: String,
    pub choices: Vec<Choice>,
}

impl Question {
    pub fn new(text: impl Into<String>, choices: Vec<Choice>) -> Result<Self, ChatError> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(ChatError::InvalidOutbound(
                "question text must not be empty".to_string(),
            ));
        }
        if choices.is_empty() || choices.len() > MAX_CHOICES {
            return Err(ChatError::InvalidOutbound(format!(
                "question must offer 1 to {} choices, got {}",
                MAX_CHOICES,
                choices.len()
            )));
        }
        for choice in &choices {
            if let Choice::Reply { title, payload } = choice {
                if title.trim().is_empty() || payload.is_empty() {
                    return Err(ChatError::InvalidOutbound(
                        "reply choice needs a title and a payload".to_string(),
                    ));
                }
                if payload.len() > MAX_PAYLOAD_BYTES {
                    return Err(ChatError::InvalidOutbound(format!(
                        "choice payload exceeds {} bytes",
                        MAX_PAYLOAD_BYTES
                    )));
                }
            }
        }
        Ok(Self { text, choices })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Choice {
    /// Echoes `title` as the user's reply and delivers `payload` to the bot.
    Reply { title: String, payload: String },
    /// Asks the client to share the user's location.
    RequestLocation,
}

impl Choice {
    pub fn reply(title: &str, command: &Command) -> Self {
        Choice::Reply {
            title: truncate_chars(title, MAX_CHOICE_TITLE_CHARS),
            payload: command.to_string(),
        }
    }
}

/// One element of a carousel.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Card {
    pub title: String,
    pub subtitle: Option<String>,
    pub image_url: Option<String>,
    pub item_url: Option<String>,
    pub buttons: Vec<Button>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Button {
    pub title: String,
    pub url: String,
}

impl Card {
    pub fn new(title: &str) -> Self {
        Self {
            title: truncate_chars(title, MAX_CARD_TITLE_CHARS),
            ..Self::default()
        }
    }

    pub fn subtitle(mut self, subtitle: &str) -> Self {
        self.subtitle = Some(truncate_chars(subtitle, MAX_CARD_SUBTITLE_CHARS));
        self
    }

    pub fn image_url(mut self, url: impl Into<String>) -> Self {
        self.image_url = Some(url.into());
        self
    }

    pub fn item_url(mut self, url: impl Into<String>) -> Self {
        self.item_url = Some(url.into());
        self
    }

    /// Add a link button. Blank urls are ignored.
    pub fn button(mut self, title: &str, url: &str) -> Self {
        if !url.trim().is_empty() {
            self.buttons.push(Button {
                title: title.to_string(),
                url: url.to_string(),
            });
        }
        self
    }

    fn validate(&self) -> Result<(), ChatError> {
        if self.title.trim().is_empty() {
            return Err(ChatError::InvalidOutbound(
                "card title must not be empty".to_string(),
            ));
        }
        if self.buttons.len() > MAX_BUTTONS {
            return Err(ChatError::InvalidOutbound(format!(
                "card {} has {} buttons, at most {} allowed",
                self.title,
                self.buttons.len(),
                MAX_BUTTONS
            )));
        }
        Ok(())
    }
}

fn truncate_chars(text: &str, max: usize) -> String {
    text.trim().chars().take(max).collect()
}
