use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{CafeHunterError, Result};

/// Longest geohash the spatial index supports.
pub const MAX_GEOHASH_PRECISION: usize = 12;
/// Most geocoding candidates offered in one disambiguation question.
pub const MAX_GEOCODER_CANDIDATES: usize = 8;

/// Top-level configuration for the Cafe Hunter bot.
///
/// Loaded from `~/.cafehunter/config.toml` by default. Each section
/// corresponds to one collaborator of the dialogue engine.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CafeHunterConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub messenger: MessengerConfig,
    #[serde(default)]
    pub classifier: ClassifierConfig,
    #[serde(default)]
    pub geocoder: GeocoderConfig,
    #[serde(default)]
    pub spatial: SpatialConfig,
    #[serde(default)]
    pub response: ResponseConfig,
}

impl CafeHunterConfig {
    /// Load configuration from a TOML file.
    ///
    /// Returns an error if the file cannot be read, parsed, or validated.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: CafeHunterConfig = toml::from_str(&content)?;
        config.validate()?;
        info!("Configuration loaded from {}", path.display());
        Ok(config)
    }

    /// Load configuration from a TOML file, falling back to defaults if the
    /// file does not exist or cannot be parsed.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                warn!(
                    "Failed to load config from {}: {}. Using defaults.",
                    path.display(),
                    e
                );
                Self::default()
            }
        }
    }

    /// Save the current configuration to a TOML file.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        info!("Configuration saved to {}", path.display());
        Ok(())
    }

    /// Check cross-field constraints that serde cannot express.
    pub fn validate(&self) -> Result<()> {
        let spatial = &self.spatial;
        for (name, value) in [
            ("lookup_precision", spatial.lookup_precision),
            ("index_precision", spatial.index_precision),
        ] {
            if value == 0 || value > MAX_GEOHASH_PRECISION {
                return Err(CafeHunterError::Config(format!(
                    "spatial.{} must be between 1 and {}, got {}",
                    name, MAX_GEOHASH_PRECISION, value
                )));
            }
        }
        if spatial.index_precision < spatial.lookup_precision {
            return Err(CafeHunterError::Config(format!(
                "spatial.index_precision ({}) must not be shorter than spatial.lookup_precision ({})",
                spatial.index_precision, spatial.lookup_precision
            )));
        }
        if self.geocoder.max_candidates == 0
            || self.geocoder.max_candidates > MAX_GEOCODER_CANDIDATES
        {
            return Err(CafeHunterError::Config(format!(
                "geocoder.max_candidates must be between 1 and {}, got {}",
                MAX_GEOCODER_CANDIDATES, self.geocoder.max_candidates
            )));
        }
        if self.response.max_detail_cards == 0 || self.response.max_detail_cards > 10 {
            return Err(CafeHunterError::Config(format!(
                "response.max_detail_cards must be between 1 and 10, got {}",
                self.response.max_detail_cards
            )));
        }
        Ok(())
    }
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Directory holding the SQLite cafe database.
    pub data_dir: String,
    /// Database file name inside `data_dir`.
    pub database_file: String,
    /// Log level: trace, debug, info, warn, error.
    pub log_level: String,
    /// Address the webhook server binds to.
    pub bind_address: String,
    /// Webhook server port.
    pub port: u16,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            data_dir: "~/.cafehunter/data".to_string(),
            database_file: "cafes.db".to_string(),
            log_level: "info".to_string(),
            bind_address: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

impl GeneralConfig {
    /// Full path of the database file, with a leading `~` expanded from `HOME`.
    pub fn database_path(&self) -> PathBuf {
        let dir = match self.data_dir.strip_prefix("~/") {
            Some(rest) => match std::env::var("HOME") {
                Ok(home) => PathBuf::from(home).join(rest),
                Err(_) => PathBuf::from(rest),
            },
            None => PathBuf::from(&self.data_dir),
        };
        dir.join(&self.database_file)
    }
}

/// Chat platform (Messenger Send API) settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MessengerConfig {
    /// Token the platform echoes during webhook verification.
    pub verify_token: String,
    /// Page access token used for outbound messages.
    pub page_token: String,
    /// Send API endpoint.
    pub send_api_url: String,
    pub timeout_secs: u64,
}

impl Default for MessengerConfig {
    fn default() -> Self {
        Self {
            verify_token: String::new(),
            page_token: String::new(),
            send_api_url: "https://graph.facebook.com/v2.6/me/messages".to_string(),
            timeout_secs: 10,
        }
    }
}

/// Intent classifier (LUIS v2) settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Base URL; the app id is appended as a path segment.
    pub endpoint: String,
    pub app_id: String,
    pub app_key: String,
    /// Intent label meaning "the user wants a cafe".
    pub cafe_intent: String,
    /// Entity type tag of location phrases.
    pub location_entity_type: String,
    pub timeout_secs: u64,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.projectoxford.ai/luis/v2.0/apps".to_string(),
            app_id: String::new(),
            app_key: String::new(),
            cafe_intent: "FindCafe".to_string(),
            location_entity_type: "Location".to_string(),
            timeout_secs: 5,
        }
    }
}

/// Place resolver (Google geocoding) settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeocoderConfig {
    pub endpoint: String,
    pub api_key: String,
    /// City appended to bare place phrases to bias results.
    pub default_city: String,
    /// Upstream results beyond this are dropped.
    pub max_candidates: usize,
    /// Language hint passed to the geocoder.
    pub language: String,
    pub timeout_secs: u64,
}

impl Default for GeocoderConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://maps.googleapis.com/maps/api/geocode/json".to_string(),
            api_key: String::new(),
            default_city: "Taipei".to_string(),
            max_candidates: 8,
            language: "zh-TW".to_string(),
            timeout_secs: 5,
        }
    }
}

/// Geohash precisions for indexing and lookup.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SpatialConfig {
    /// Cell size class used by neighbourhood lookups (6 is about 1.2 km x 0.6 km).
    pub lookup_precision: usize,
    /// Precision of the geohash stored with each cafe.
    pub index_precision: usize,
}

impl Default for SpatialConfig {
    fn default() -> Self {
        Self {
            lookup_precision: 6,
            index_precision: 8,
        }
    }
}

/// Card rendering settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ResponseConfig {
    /// Upper bound of detail cards per reply (the carousel limit is 10).
    pub max_detail_cards: usize,
    pub static_map_url: String,
    /// Optional key appended to static map URLs.
    pub static_map_key: String,
    /// External map viewer used for the "open map" button.
    pub map_viewer_url: String,
    pub map_zoom: u8,
}

impl Default for ResponseConfig {
    fn default() -> Self {
        Self {
            max_detail_cards: 10,
            static_map_url: "https://maps.googleapis.com/maps/api/staticmap".to_string(),
            static_map_key: String::new(),
            map_viewer_url: "https://maps.google.com/".to_string(),
            map_zoom: 15,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_temp_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_default_config() {
        let config = CafeHunterConfig::default();
        assert_eq!(config.general.port, 8080);
        assert_eq!(config.general.log_level, "info");
        assert_eq!(config.classifier.cafe_intent, "FindCafe");
        assert_eq!(config.classifier.location_entity_type, "Location");
        assert_eq!(config.geocoder.default_city, "Taipei");
        assert_eq!(config.geocoder.max_candidates, 8);
        assert_eq!(config.spatial.lookup_precision, 6);
        assert_eq!(config.spatial.index_precision, 8);
        assert_eq!(config.response.max_detail_cards, 10);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_valid_config() {
        let file = create_temp_config(
            r#"
[general]
port = 9000
log_level = "debug"

[messenger]
verify_token = "hunter2"

[geocoder]
default_city = "New Taipei"
max_candidates = 5

[spatial]
lookup_precision = 5
"#,
        );
        let config = CafeHunterConfig::load(file.path()).unwrap();
        assert_eq!(config.general.port, 9000);
        assert_eq!(config.general.log_level, "debug");
        assert_eq!(config.messenger.verify_token, "hunter2");
        assert_eq!(config.geocoder.default_city, "New Taipei");
        assert_eq!(config.geocoder.max_candidates, 5);
        assert_eq!(config.spatial.lookup_precision, 5);
        // Untouched fields keep their defaults.
        assert_eq!(config.spatial.index_precision, 8);
        assert_eq!(config.classifier.cafe_intent, "FindCafe");
    }

    #[test]
    fn test_empty_toml_uses_all_defaults() {
        let file = create_temp_config("");
        let config = CafeHunterConfig::load(file.path()).unwrap();
        assert_eq!(config.general.database_file, "cafes.db");
        assert_eq!(config.response.map_zoom, 15);
    }

    #[test]
    fn test_load_invalid_toml() {
        let file = create_temp_config("general = [[[");
        let err = CafeHunterConfig::load(file.path()).unwrap_err();
        assert!(matches!(err, CafeHunterError::Config(_)));
    }

    #[test]
    fn test_load_rejects_index_shorter_than_lookup() {
        let file = create_temp_config(
            r#"
[spatial]
lookup_precision = 7
index_precision = 6
"#,
        );
        let err = CafeHunterConfig::load(file.path()).unwrap_err();
        assert!(err.to_string().contains("index_precision"));
    }

    #[test]
    fn test_validate_rejects_out_of_range_values() {
        let mut config = CafeHunterConfig::default();
        config.spatial.lookup_precision = 0;
        assert!(config.validate().is_err());

        let mut config = CafeHunterConfig::default();
        config.spatial.index_precision = 13;
        assert!(config.validate().is_err());

        let mut config = CafeHunterConfig::default();
        config.geocoder.max_candidates = 0;
        assert!(config.validate().is_err());

        let mut config = CafeHunterConfig::default();
        config.response.max_detail_cards = 11;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_caps_geocoder_candidates() {
        let mut config = CafeHunterConfig::default();
        config.geocoder.max_candidates = MAX_GEOCODER_CANDIDATES;
        assert!(config.validate().is_ok());

        config.geocoder.max_candidates = 9;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("geocoder.max_candidates"));
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let config = CafeHunterConfig::load_or_default(Path::new("/does/not/exist/config.toml"));
        assert_eq!(config.general.port, 8080);
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = CafeHunterConfig::default();
        config.messenger.page_token = "page-token".to_string();
        config.geocoder.api_key = "maps-key".to_string();
        config.save(&path).unwrap();

        let reloaded = CafeHunterConfig::load(&path).unwrap();
        assert_eq!(reloaded.messenger.page_token, "page-token");
        assert_eq!(reloaded.geocoder.api_key, "maps-key");
    }

    #[test]
    fn test_database_path_joins_file_name() {
        let general = GeneralConfig {
            data_dir: "/var/lib/cafehunter".to_string(),
            ..GeneralConfig::default()
        };
        assert_eq!(
            general.database_path(),
            PathBuf::from("/var/lib/cafehunter/cafes.db")
        );
    }
}
