//! Cafe Hunter API crate: the Messenger webhook and its transport.
//!
//! Verifies the webhook subscription, decodes delivered batches into
//! normalized messages for the dialogue engine, and posts the engine's
//! replies back through the Graph Send API.

pub mod error;
pub mod handlers;
pub mod messenger;
pub mod routes;
pub mod state;
pub mod webhook;

pub use error::ApiError;
pub use messenger::{GraphMessenger, Messenger, MessengerError};
pub use routes::create_router;
pub use state::AppState;
