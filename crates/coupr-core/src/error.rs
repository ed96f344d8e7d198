//! Error types for the coupr-core library.
//!
//! Field extraction itself never fails: anything the heuristics cannot
//! determine is reported as an absent field. These errors cover the
//! boundaries around it (caller input, geocoding, persistence rows).

use thiserror::Error;

/// Main error type for the coupr library.
#[derive(Error, Debug)]
pub enum CouprError {
    /// Caller input violated the extraction contract.
    #[error("input error: {0}")]
    Input(#[from] InputError),

    /// Geocoding lookup failed.
    #[error("geocode error: {0}")]
    Geocode(#[from] GeocodeError),

    /// Persistence row could not be built or validated.
    #[error("record error: {0}")]
    Record(#[from] RecordError),

    /// JSON (de)serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors raised while validating extraction input.
#[derive(Error, Debug)]
pub enum InputError {
    /// Input document could not be decoded.
    #[error("malformed input: {0}")]
    Malformed(String),

    /// A bounding box has coordinates outside the normalized image space.
    #[error("bounding box out of range for block {index}: {reason}")]
    BoundingBox { index: usize, reason: String },

    /// A brand hint was empty after trimming.
    #[error("empty brand name at position {0}")]
    EmptyBrand(usize),
}

/// Errors produced by geocoder implementations.
#[derive(Error, Debug)]
pub enum GeocodeError {
    /// Transport-level failure (connect, timeout, TLS).
    #[cfg(feature = "native")]
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The service answered with a non-success status.
    #[error("geocoder returned status {0}")]
    Status(u16),

    /// Response body did not contain usable coordinates.
    #[error("failed to decode geocoder response: {0}")]
    Decode(String),

    /// Configured base URL is not a valid URL.
    #[error("invalid geocoder base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    /// Lookup failed for a reason reported by the host environment.
    #[error("geocoder lookup failed: {0}")]
    Lookup(String),
}

/// Errors related to coupon persistence rows.
#[derive(Error, Debug)]
pub enum RecordError {
    /// Required field is missing.
    #[error("missing required field: {0}")]
    MissingField(String),

    /// Field has the wrong type or an unparseable value.
    #[error("invalid value for {field}: {reason}")]
    InvalidField { field: String, reason: String },
}

/// Result type for the coupr library.
pub type Result<T> = std::result::Result<T, CouprError>;
