//! Neighbourhood search over a [`SpatialStore`].

use std::collections::HashSet;
use std::sync::Arc;

use tracing::debug;

use cafehunter_core::types::{Cafe, Coordinate};

use crate::error::SpatialError;
use crate::geohash::neighborhood;
use crate::store::SpatialStore;

/// Finds cafes in the 3x3 geohash block around a point.
///
/// Scanning the neighbours as well as the containing cell catches cafes that
/// sit just across a cell boundary from the query point.
#[derive(Clone)]
pub struct NeighborhoodSearch {
    store: Arc<dyn SpatialStore>,
    precision: usize,
}

impl NeighborhoodSearch {
    pub fn new(store: Arc<dyn SpatialStore>, precision: usize) -> Self {
        Self { store, precision }
    }

    pub fn precision(&self) -> usize {
        self.precision
    }

    /// Cafes near `point`, deduplicated by id in first-seen order
    /// (center cell first, then neighbours clockwise from north).
    pub fn find_nearby(&self, point: Coordinate) -> Result<Vec<Cafe>, SpatialError> {
        let cells = neighborhood(point, self.precision)?;

        let mut seen = HashSet::new();
        let mut merged = Vec::new();
        for cell in &cells {
            for cafe in self.store.cafes_with_prefix(cell)? {
                if seen.insert(cafe.id.clone()) {
                    merged.push(cafe);
                } else {
                    debug!(cafe_id = %cafe.id, cell = %cell, "Dropped duplicate cafe");
                }
            }
        }

        debug!(
            point = %point,
            precision = self.precision,
            cells = cells.len(),
            found = merged.len(),
            "Neighbourhood search complete"
        );
        Ok(merged)
    }
}
