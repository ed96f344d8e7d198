//! Address geocoding.
//!
//! The extractor only needs a way to turn an address line into coordinates.
//! [`Geocoder`] is that seam; [`NominatimGeocoder`] is the HTTP
//! implementation used by the CLI, and the WASM bindings adapt a host
//! callback to the same trait.

#[cfg(feature = "native")]
mod nominatim;

#[cfg(feature = "native")]
pub use nominatim::NominatimGeocoder;

use std::future::Future;

use serde::{Deserialize, Serialize};

use crate::error::GeocodeError;
use crate::models::coupon::GeoPoint;

/// A single geocoding result.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoLocation {
    pub latitude: f64,
    pub longitude: f64,
}

impl From<GeoLocation> for GeoPoint {
    fn from(location: GeoLocation) -> Self {
        GeoPoint {
            lat: location.latitude,
            lng: location.longitude,
        }
    }
}

/// Resolves free-text addresses into coordinates.
///
/// An empty result means the address was not found. Implementations should
/// bound each lookup with a timeout; callers treat any error as "no result".
pub trait Geocoder {
    fn geocode(
        &self,
        address: &str,
    ) -> impl Future<Output = Result<Vec<GeoLocation>, GeocodeError>>;
}
