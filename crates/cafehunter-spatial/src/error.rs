//! Error types for the spatial index.

use cafehunter_core::error::CafeHunterError;

/// Errors from geohash computation and store lookups.
#[derive(Debug, thiserror::Error)]
pub enum SpatialError {
    #[error("invalid coordinate: {0}")]
    InvalidCoordinate(String),
    #[error("geohash precision must be between 1 and {max}, got {got}")]
    InvalidPrecision { got: usize, max: usize },
    #[error("invalid geohash character '{0}'")]
    InvalidGeohash(char),
    #[error("spatial store error: {0}")]
    Store(String),
}

impl From<CafeHunterError> for SpatialError {
    fn from(err: CafeHunterError) -> Self {
        SpatialError::Store(err.to_string())
    }
}
