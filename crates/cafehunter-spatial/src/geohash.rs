//! Geohash encoding and cell neighbourhoods.
//!
//! A geohash interleaves longitude and latitude bisection bits (longitude
//! first) and renders them five at a time in a 32-character alphabet. Each
//! extra character refines the previous cell, so points in the same cell
//! share a prefix.

use cafehunter_core::config::MAX_GEOHASH_PRECISION;
use cafehunter_core::types::Coordinate;

use crate::error::SpatialError;

const BASE32: &[u8; 32] = b"0123456789bcdefghjkmnpqrstuvwxyz";

/// Neighbour offsets as (latitude steps, longitude steps), clockwise from north.
const NEIGHBOR_OFFSETS: [(f64, f64); 8] = [
    (1.0, 0.0),
    (1.0, 1.0),
    (0.0, 1.0),
    (-1.0, 1.0),
    (-1.0, 0.0),
    (-1.0, -1.0),
    (0.0, -1.0),
    (1.0, -1.0),
];

/// Bounding box of a geohash cell.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
}

impl Bounds {
    pub fn center(&self) -> Coordinate {
        Coordinate::new(
            (self.min_lat + self.max_lat) / 2.0,
            (self.min_lon + self.max_lon) / 2.0,
        )
    }

    pub fn height(&self) -> f64 {
        self.max_lat - self.min_lat
    }

    pub fn width(&self) -> f64 {
        self.max_lon - self.min_lon
    }

    pub fn contains(&self, point: Coordinate) -> bool {
        (self.min_lat..=self.max_lat).contains(&point.latitude)
            && (self.min_lon..=self.max_lon).contains(&point.longitude)
    }
}

fn check_precision(precision: usize) -> Result<(), SpatialError> {
    if precision == 0 || precision > MAX_GEOHASH_PRECISION {
        return Err(SpatialError::InvalidPrecision {
            got: precision,
            max: MAX_GEOHASH_PRECISION,
        });
    }
    Ok(())
}

/// Encode a coordinate into a geohash of `precision` characters.
pub fn encode(point: Coordinate, precision: usize) -> Result<String, SpatialError> {
    check_precision(precision)?;
    if !point.is_valid() {
        return Err(SpatialError::InvalidCoordinate(point.to_string()));
    }

    let mut lat_range = (-90.0_f64, 90.0_f64);
    let mut lon_range = (-180.0_f64, 180.0_f64);
    let mut hash = String::with_capacity(precision);
    let mut bits = 0usize;
    let mut bit_count = 0;
    let mut even = true;

    while hash.len() < precision {
        let (range, value) = if even {
            (&mut lon_range, point.longitude)
        } else {
            (&mut lat_range, point.latitude)
        };
        let mid = (range.0 + range.1) / 2.0;
        if value >= mid {
            bits = (bits << 1) | 1;
            range.0 = mid;
        } else {
            bits <<= 1;
            range.1 = mid;
        }
        even = !even;
        bit_count += 1;

        if bit_count == 5 {
            hash.push(BASE32[bits] as char);
            bits = 0;
            bit_count = 0;
        }
    }

    Ok(hash)
}

/// Decode a geohash into the bounding box of its cell.
pub fn decode_bounds(hash: &str) -> Result<Bounds, SpatialError> {
    check_precision(hash.len())?;

    let mut lat_range = (-90.0_f64, 90.0_f64);
    let mut lon_range = (-180.0_f64, 180.0_f64);
    let mut even = true;

    for c in hash.chars() {
        let index = BASE32
            .iter()
            .position(|&b| b as char == c)
            .ok_or(SpatialError::InvalidGeohash(c))?;
        for shift in (0..5).rev() {
            let range = if even {
                &mut lon_range
            } else {
                &mut lat_range
            };
            let mid = (range.0 + range.1) / 2.0;
            if (index >> shift) & 1 == 1 {
                range.0 = mid;
            } else {
                range.1 = mid;
            }
            even = !even;
        }
    }

    Ok(Bounds {
        min_lat: lat_range.0,
        max_lat: lat_range.1,
        min_lon: lon_range.0,
        max_lon: lon_range.1,
    })
}

/// The eight cells adjacent to `hash`, clockwise from north.
///
/// Longitude wraps across the antimeridian. Latitude is clamped at the
/// poles, so cells in the top or bottom row repeat their own row instead of
/// having a neighbour beyond the pole.
pub fn neighbors(hash: &str) -> Result<Vec<String>, SpatialError> {
    let bounds = decode_bounds(hash)?;
    let center = bounds.center();
    let precision = hash.len();

    NEIGHBOR_OFFSETS
        .iter()
        .map(|(dlat, dlon)| {
            let latitude = (center.latitude + dlat * bounds.height()).clamp(-90.0, 90.0);
            let mut longitude = center.longitude + dlon * bounds.width();
            if longitude > 180.0 {
                longitude -= 360.0;
            } else if longitude < -180.0 {
                longitude += 360.0;
            }
            encode(Coordinate::new(latitude, longitude), precision)
        })
        .collect()
}

/// The 3x3 block of cells around `point`: the containing cell first, then its
/// neighbours. Repeated cells (only possible at the poles) are dropped.
pub fn neighborhood(point: Coordinate, precision: usize) -> Result<Vec<String>, SpatialError> {
    let center = encode(point, precision)?;
    let mut cells = Vec::with_capacity(9);
    for cell in neighbors(&center)? {
        if cell != center && !cells.contains(&cell) {
            cells.push(cell);
        }
    }
    cells.insert(0, center);
    Ok(cells)
}
