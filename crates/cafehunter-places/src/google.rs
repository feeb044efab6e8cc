//! Google Geocoding API client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};

use cafehunter_core::config::GeocoderConfig;
use cafehunter_core::types::{Coordinate, Place};

use crate::error::ResolverError;
use crate::resolver::PlaceResolver;

const STATUS_OK: &str = "OK";
const STATUS_ZERO_RESULTS: &str = "ZERO_RESULTS";

#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    #[serde(default)]
    results: Vec<GeocodeResult>,
    status: String,
    #[serde(default)]
    error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeocodeResult {
    formatted_address: String,
    geometry: Geometry,
    #[serde(default)]
    place_id: String,
}

#[derive(Debug, Deserialize)]
struct Geometry {
    location: LatLng,
}

#[derive(Debug, Deserialize)]
struct LatLng {
    lat: f64,
    lng: f64,
}

impl From<GeocodeResult> for Place {
    fn from(result: GeocodeResult) -> Self {
        Place {
            label: result.formatted_address.clone(),
            address: result.formatted_address,
            location: Coordinate::new(result.geometry.location.lat, result.geometry.location.lng),
            source_id: result.place_id,
        }
    }
}

/// Resolver backed by the Google Geocoding API.
pub struct GoogleGeocoder {
    http: Client,
    endpoint: String,
    api_key: String,
    language: String,
    max_candidates: usize,
}

impl GoogleGeocoder {
    pub fn new(config: &GeocoderConfig) -> Result<Self, ResolverError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ResolverError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http,
            endpoint: config.endpoint.clone(),
            api_key: config.api_key.clone(),
            language: config.language.clone(),
            max_candidates: config.max_candidates,
        })
    }
}

#[async_trait]
impl PlaceResolver for GoogleGeocoder {
    async fn resolve(&self, phrase: &str) -> Result<Vec<Place>, ResolverError> {
        let mut params = vec![("address", phrase), ("key", self.api_key.as_str())];
        if !self.language.is_empty() {
            params.push(("language", self.language.as_str()));
        }

        let response = self
            .http
            .get(&self.endpoint)
            .query(&params)
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "Geocoding request failed");
                ResolverError::Unavailable(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            warn!(status = %status, "Geocoder returned an error status");
            return Err(ResolverError::Unavailable(format!("status {}", status)));
        }

        let body: GeocodeResponse = response.json().await.map_err(|e| {
            warn!(error = %e, "Geocoding response could not be decoded");
            ResolverError::Unavailable(e.to_string())
        })?;

        match body.status.as_str() {
            STATUS_OK => {}
            STATUS_ZERO_RESULTS => {
                debug!(phrase = %phrase, "Geocoder found no candidates");
                return Ok(Vec::new());
            }
            other => {
                let detail = body.error_message.unwrap_or_default();
                warn!(status = %other, detail = %detail, "Geocoder rejected the request");
                return Err(ResolverError::Unavailable(format!("{} {}", other, detail)));
            }
        }

        let places: Vec<Place> = body
            .results
            .into_iter()
            .take(self.max_candidates)
            .map(Place::from)
            .collect();
        debug!(phrase = %phrase, candidates = places.len(), "Phrase geocoded");
        Ok(places)
    }
}
