//! Place resolution for Cafe Hunter.
//!
//! Turns a free-text place phrase into an ordered list of candidate places.
//! The dialogue engine depends on [`PlaceResolver`]; [`GoogleGeocoder`] is
//! the production implementation.

pub mod error;
pub mod google;
pub mod resolver;

pub use error::ResolverError;
pub use google::GoogleGeocoder;
pub use resolver::{qualify_phrase, PlaceResolver};
