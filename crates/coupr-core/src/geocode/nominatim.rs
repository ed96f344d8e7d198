//! HTTP geocoder for Nominatim-compatible search APIs.

use std::time::Duration;

use reqwest::{Client, Url};
use serde::Deserialize;
use tracing::debug;

use super::{GeoLocation, Geocoder};
use crate::error::GeocodeError;
use crate::models::config::GeocoderConfig;

/// Geocoder backed by the Nominatim `/search` endpoint.
pub struct NominatimGeocoder {
    client: Client,
    base_url: Url,
}

#[derive(Debug, Deserialize)]
struct NominatimPlace {
    lat: String,
    lon: String,
}

impl NominatimPlace {
    fn to_location(&self) -> Result<GeoLocation, GeocodeError> {
        let latitude = parse_coordinate("lat", &self.lat)?;
        let longitude = parse_coordinate("lon", &self.lon)?;
        Ok(GeoLocation { latitude, longitude })
    }
}

impl NominatimGeocoder {
    /// Create a geocoder from configuration.
    pub fn new(config: &GeocoderConfig) -> Result<Self, GeocodeError> {
        Self::with_base_url(&config.base_url, config.timeout_secs, &config.user_agent)
    }

    /// Create a geocoder pointed at a custom base URL.
    pub fn with_base_url(
        base_url: &str,
        timeout_secs: u64,
        user_agent: &str,
    ) -> Result<Self, GeocodeError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(timeout_secs))
            .user_agent(user_agent)
            .build()?;

        // Exactly one trailing slash so joining "search" appends a segment
        let normalized = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalized).map_err(|e| GeocodeError::InvalidBaseUrl {
            url: base_url.to_string(),
            reason: e.to_string(),
        })?;

        Ok(Self { client, base_url })
    }

    fn search_url(&self, address: &str) -> Result<Url, GeocodeError> {
        let mut url = self
            .base_url
            .join("search")
            .map_err(|e| GeocodeError::InvalidBaseUrl {
                url: self.base_url.to_string(),
                reason: e.to_string(),
            })?;
        url.query_pairs_mut()
            .append_pair("q", address)
            .append_pair("format", "jsonv2")
            .append_pair("limit", "1");
        Ok(url)
    }
}

impl Geocoder for NominatimGeocoder {
    async fn geocode(&self, address: &str) -> Result<Vec<GeoLocation>, GeocodeError> {
        let url = self.search_url(address)?;
        debug!("Geocoding '{}'", address);

        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(GeocodeError::Status(status.as_u16()));
        }

        let places: Vec<NominatimPlace> = response
            .json()
            .await
            .map_err(|e| GeocodeError::Decode(e.to_string()))?;

        places.iter().map(NominatimPlace::to_location).collect()
    }
}

fn parse_coordinate(name: &str, value: &str) -> Result<f64, GeocodeError> {
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| GeocodeError::Decode(format!("invalid {} '{}'", name, value)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_url() {
        let geocoder =
            NominatimGeocoder::with_base_url("http://localhost:8080/", 4, "coupr-test").unwrap();
        let url = geocoder.search_url("2055 28th St SE").unwrap();
        assert_eq!(url.path(), "/search");
        assert_eq!(
            url.query(),
            Some("q=2055+28th+St+SE&format=jsonv2&limit=1")
        );
    }

    #[test]
    fn test_invalid_base_url() {
        let result = NominatimGeocoder::with_base_url("not a url", 4, "coupr-test");
        assert!(matches!(result, Err(GeocodeError::InvalidBaseUrl { .. })));
    }

    #[test]
    fn test_parse_coordinate() {
        assert_eq!(parse_coordinate("lat", " 42.96 ").unwrap(), 42.96);
        assert!(parse_coordinate("lat", "north").is_err());
        assert!(parse_coordinate("lat", "NaN").is_err());
    }
}
