//! Core library for coupon capture.
//!
//! This crate provides:
//! - OCR input contract (text blob plus optional positioned blocks)
//! - Text normalization and a declarative pattern library
//! - Coupon field extraction (store, address, phone, discount title, expiry, mode)
//! - Address validation through a pluggable geocoder
//! - Persistence record models for the coupon backend

pub mod coupon;
pub mod error;
pub mod geocode;
pub mod models;
pub mod ocr;

pub use coupon::{CouponExtractor, CouponParser, ExtractionResult};
pub use error::{CouprError, Result};
pub use geocode::{GeoLocation, Geocoder};
#[cfg(feature = "native")]
pub use geocode::NominatimGeocoder;
pub use models::coupon::{CouponInput, GeoPoint, ParsedCoupon, RedemptionMode};
pub use models::record::{CouponRecord, CouponRow, PARSER_VERSION};
pub use ocr::{BBox, OcrBlock, OcrLine};
