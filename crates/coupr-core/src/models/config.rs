//! Configuration structures for coupon extraction.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main configuration for coupr.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CouprConfig {
    /// Field extraction configuration.
    pub extraction: ExtractionConfig,

    /// Geocoding service configuration.
    pub geocoder: GeocoderConfig,
}

/// Field extraction configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Validate address candidates through the geocoder.
    pub try_geocode: bool,

    /// Number of top-ranked address candidates sent to the geocoder.
    pub max_address_candidates: usize,

    /// Maximum length of the terms snippet, in characters.
    pub terms_max_chars: usize,

    /// Known merchant names used to bias store-name scoring.
    pub brands: Vec<String>,

    /// Fill an empty title with the raw-text headline.
    pub fallback_title: bool,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            try_geocode: true,
            max_address_candidates: 6,
            terms_max_chars: 400,
            brands: Vec::new(),
            fallback_title: false,
        }
    }
}

/// Geocoding service configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeocoderConfig {
    /// Base URL of a Nominatim-compatible search API.
    pub base_url: String,

    /// Per-lookup timeout in seconds.
    pub timeout_secs: u64,

    /// User agent sent with every lookup.
    pub user_agent: String,
}

impl Default for GeocoderConfig {
    fn default() -> Self {
        Self {
            base_url: "https://nominatim.openstreetmap.org".to_string(),
            timeout_secs: 4,
            user_agent: format!("coupr/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl CouprConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string()))
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &Path) -> Result<(), std::io::Error> {
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string()))?;
        std::fs::write(path, content)
    }
}
