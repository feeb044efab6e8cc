//! Intent classification for Cafe Hunter.
//!
//! Turns a free-text utterance into a top intent, a confidence score and the
//! typed entities the classifier extracted. The dialogue engine only depends
//! on the [`IntentClassifier`] trait; [`LuisClassifier`] is the HTTP client
//! used in production.

pub mod classifier;
pub mod error;
pub mod luis;
pub mod types;

pub use classifier::IntentClassifier;
pub use error::ClassifierError;
pub use luis::LuisClassifier;
pub use types::{Entity, IntentResult};
