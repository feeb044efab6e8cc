//! Key-ordered cafe stores queried by geohash prefix.

use std::collections::BTreeMap;
use std::ops::Bound;

use cafehunter_core::types::Cafe;

use crate::error::SpatialError;

/// Character that sorts after every geohash character.
///
/// A prefix scan covers every key `k` with `prefix <= k <= prefix + SENTINEL`.
pub const PREFIX_SCAN_SENTINEL: char = '~';

/// Upper bound of the lexical range holding all keys that start with `prefix`.
pub fn prefix_upper_bound(prefix: &str) -> String {
    let mut upper = String::with_capacity(prefix.len() + 1);
    upper.push_str(prefix);
    upper.push(PREFIX_SCAN_SENTINEL);
    upper
}

/// A store of cafes ordered by geohash.
pub trait SpatialStore: Send + Sync {
    /// All cafes whose geohash starts with `prefix`.
    fn cafes_with_prefix(&self, prefix: &str) -> Result<Vec<Cafe>, SpatialError>;
}

/// In-memory [`SpatialStore`] backed by a `BTreeMap` keyed on (geohash, id).
#[derive(Debug, Default, Clone)]
pub struct MemoryCafeStore {
    cafes: BTreeMap<(String, String), Cafe>,
}

impl MemoryCafeStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_cafes(cafes: impl IntoIterator<Item = Cafe>) -> Self {
        let mut store = Self::new();
        for cafe in cafes {
            store.insert(cafe);
        }
        store
    }

    /// Insert or replace a cafe.
    pub fn insert(&mut self, cafe: Cafe) {
        self.cafes
            .insert((cafe.geohash.clone(), cafe.id.clone()), cafe);
    }

    pub fn len(&self) -> usize {
        self.cafes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cafes.is_empty()
    }
}

impl SpatialStore for MemoryCafeStore {
    fn cafes_with_prefix(&self, prefix: &str) -> Result<Vec<Cafe>, SpatialError> {
        let lower = (prefix.to_string(), String::new());
        let upper = (prefix_upper_bound(prefix), String::new());
        Ok(self
            .cafes
            .range((Bound::Included(lower), Bound::Excluded(upper)))
            .map(|(_, cafe)| cafe.clone())
            .collect())
    }
}
