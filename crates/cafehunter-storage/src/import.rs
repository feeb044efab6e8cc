//! Import of the public cafe dataset.
//!
//! The dataset is a JSON array of cafes whose coordinates (and sometimes
//! ratings) are encoded as strings. Rows that cannot be placed on the map are
//! skipped with a warning rather than failing the whole import.

use std::path::Path;

use serde::{Deserialize, Deserializer};
use tracing::{info, warn};
use uuid::Uuid;

use cafehunter_core::error::CafeHunterError;
use cafehunter_core::types::{Cafe, CafeRatings, Coordinate};
use cafehunter_spatial::encode;

use crate::repository::CafeRepository;

/// One row of the dataset as published.
#[derive(Debug, Deserialize)]
struct CafeRecord {
    #[serde(default)]
    id: String,
    name: String,
    #[serde(default)]
    city: String,
    #[serde(default, deserialize_with = "lenient_rating")]
    wifi: f64,
    #[serde(default, deserialize_with = "lenient_rating")]
    seat: f64,
    #[serde(default, deserialize_with = "lenient_rating")]
    quiet: f64,
    #[serde(default, deserialize_with = "lenient_rating")]
    tasty: f64,
    #[serde(default, deserialize_with = "lenient_rating")]
    cheap: f64,
    #[serde(default, deserialize_with = "lenient_rating")]
    music: f64,
    #[serde(default, rename = "limited_time", alias = "timeLimited")]
    time_limited: String,
    #[serde(default, rename = "socket", alias = "plug")]
    plug: String,
    #[serde(default)]
    address: String,
    #[serde(default)]
    url: String,
    #[serde(deserialize_with = "lenient_f64")]
    latitude: f64,
    #[serde(deserialize_with = "lenient_f64")]
    longitude: f64,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrText {
    Number(f64),
    Text(String),
}

fn lenient_f64<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    match NumberOrText::deserialize(deserializer)? {
        NumberOrText::Number(n) => Ok(n),
        NumberOrText::Text(s) => s.trim().parse().map_err(serde::de::Error::custom),
    }
}

/// Ratings accept numbers or numeric strings; blanks count as 0 and values
/// are clamped into 0..=5.
fn lenient_rating<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = match NumberOrText::deserialize(deserializer)? {
        NumberOrText::Number(n) => n,
        NumberOrText::Text(s) if s.trim().is_empty() => 0.0,
        NumberOrText::Text(s) => s.trim().parse().map_err(serde::de::Error::custom)?,
    };
    if value.is_finite() {
        Ok(value.clamp(0.0, 5.0))
    } else {
        Ok(0.0)
    }
}

/// Outcome of an import run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ImportSummary {
    pub imported: usize,
    pub skipped: usize,
}

/// Converts dataset rows into indexed cafes.
pub struct CafeImporter {
    index_precision: usize,
}

impl CafeImporter {
    pub fn new(index_precision: usize) -> Self {
        Self { index_precision }
    }

    /// Parse a dataset document into cafes, skipping unusable rows.
    pub fn parse(&self, json: &str) -> Result<(Vec<Cafe>, usize), CafeHunterError> {
        let rows: Vec<serde_json::Value> = serde_json::from_str(json)?;
        let mut cafes = Vec::with_capacity(rows.len());
        let mut skipped = 0;

        for (index, row) in rows.into_iter().enumerate() {
            let record: CafeRecord = match serde_json::from_value(row) {
                Ok(record) => record,
                Err(e) => {
                    warn!(row = index, error = %e, "Skipping malformed cafe row");
                    skipped += 1;
                    continue;
                }
            };
            match self.to_cafe(record) {
                Ok(cafe) => cafes.push(cafe),
                Err(e) => {
                    warn!(row = index, error = %e, "Skipping cafe without a usable location");
                    skipped += 1;
                }
            }
        }

        Ok((cafes, skipped))
    }

    /// Read a dataset file and store every usable cafe.
    pub fn import_file(
        &self,
        repository: &CafeRepository,
        path: &Path,
    ) -> Result<ImportSummary, CafeHunterError> {
        let content = std::fs::read_to_string(path)?;
        let (cafes, skipped) = self.parse(&content)?;
        let imported = repository.save_all(&cafes)?;
        info!(
            imported,
            skipped,
            "Imported cafe dataset from {}",
            path.display()
        );
        Ok(ImportSummary { imported, skipped })
    }

    fn to_cafe(&self, record: CafeRecord) -> Result<Cafe, CafeHunterError> {
        let location = Coordinate::new(record.latitude, record.longitude);
        let geohash = encode(location, self.index_precision)
            .map_err(|e| CafeHunterError::Import(format!("{}: {}", record.name, e)))?;
        let id = if record.id.trim().is_empty() {
            Uuid::new_v4().to_string()
        } else {
            record.id
        };

        Ok(Cafe {
            id,
            name: record.name,
            city: record.city,
            address: record.address,
            url: record.url,
            location,
            geohash,
            ratings: CafeRatings {
                tasty: record.tasty,
                wifi: record.wifi,
                quiet: record.quiet,
                cheap: record.cheap,
                seat: record.seat,
                music: record.music,
            },
            time_limited: record.time_limited,
            plug: record.plug,
        })
    }
}
