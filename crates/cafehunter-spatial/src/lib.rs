//! Geohash spatial index for Cafe Hunter.
//!
//! Encodes coordinates into geohash cells, computes the 3x3 cell
//! neighbourhood around a point, and merges prefix range scans over a
//! [`SpatialStore`] into a deduplicated cafe set.

pub mod error;
pub mod geohash;
pub mod search;
pub mod store;

pub use error::SpatialError;
pub use geohash::{decode_bounds, encode, neighborhood, neighbors, Bounds};
pub use search::NeighborhoodSearch;
pub use store::{prefix_upper_bound, MemoryCafeStore, SpatialStore, PREFIX_SCAN_SENTINEL};
