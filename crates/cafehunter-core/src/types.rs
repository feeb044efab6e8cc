use serde::{Deserialize, Serialize};

// =============================================================================
// Geography
// =============================================================================

/// A WGS84 point.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Whether both components are finite and inside the WGS84 ranges.
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }
}

impl std::fmt::Display for Coordinate {
    /// Renders as `lat,long` using the shortest representation that parses
    /// back to the same value.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{},{}", self.latitude, self.longitude)
    }
}

// =============================================================================
// Cafe
// =============================================================================

/// Star-style ratings in the range 0 to 5. Fractions are allowed.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CafeRatings {
    pub tasty: f64,
    pub wifi: f64,
    pub quiet: f64,
    /// Price friendliness, higher is cheaper.
    pub cheap: f64,
    pub seat: f64,
    pub music: f64,
}

/// A cafe as stored in the spatial index.
///
/// Cafes are written by the importer and never mutated afterwards.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Cafe {
    pub id: String,
    pub name: String,
    pub city: String,
    pub address: String,
    pub url: String,
    pub location: Coordinate,
    /// Geohash of `location` at the index precision.
    pub geohash: String,
    pub ratings: CafeRatings,
    /// Free-text time limit policy, e.g. "yes", "no", "maybe".
    pub time_limited: String,
    /// Free-text power outlet availability.
    pub plug: String,
}

// =============================================================================
// Places
// =============================================================================

/// A geocoding candidate for a free-text place phrase.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Place {
    /// Human-readable label shown to the user.
    pub label: String,
    pub address: String,
    pub location: Coordinate,
    /// Identifier assigned by the upstream geocoder.
    pub source_id: String,
}
