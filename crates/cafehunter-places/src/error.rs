//! Error types for place resolution.

/// Errors from a place resolver.
#[derive(Debug, thiserror::Error)]
pub enum ResolverError {
    /// The geocoder could not be reached, rejected the request or answered
    /// with an undecodable body.
    #[error("place resolution unavailable: {0}")]
    Unavailable(String),
    #[error("geocoder misconfigured: {0}")]
    Config(String),
}
