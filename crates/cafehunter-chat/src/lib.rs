//! Dialogue engine for Cafe Hunter.
//!
//! Keeps one finite-state session per user, turns normalized inbound
//! messages into classifier, resolver and spatial calls, and answers with
//! validated outbound instructions for the transport layer.

pub mod engine;
pub mod error;
pub mod messages;
pub mod outbound;
pub mod payload;
pub mod response;
pub mod session;
pub mod state_machine;
pub mod types;

pub use engine::DialogueEngine;
pub use error::{ChatError, PayloadError};
pub use outbound::{Button, Card, Choice, Outbound, Question};
pub use payload::Command;
pub use response::{rating_glyphs, ResponseComposer};
pub use session::{Session, SessionStore};
pub use state_machine::{transition, DialogueEvent, DialogueState};
pub use types::{InboundEvent, InboundMessage};
