//! The resolver seam used by the dialogue engine.

use async_trait::async_trait;

use cafehunter_core::types::Place;

use crate::error::ResolverError;

/// Resolves a place phrase to candidate places, in upstream order.
#[async_trait]
pub trait PlaceResolver: Send + Sync {
    async fn resolve(&self, phrase: &str) -> Result<Vec<Place>, ResolverError>;
}

/// Append the default city to `phrase` unless it already mentions it.
///
/// The comparison ignores ASCII case so "taipei 101" is left alone.
pub fn qualify_phrase(phrase: &str, default_city: &str) -> String {
    let phrase = phrase.trim();
    let city = default_city.trim();
    if city.is_empty() || phrase.to_lowercase().contains(&city.to_lowercase()) {
        phrase.to_string()
    } else {
        format!("{} {}", phrase, city)
    }
}
