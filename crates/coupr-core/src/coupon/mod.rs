//! Coupon field extraction module.

pub mod normalize;
mod parser;
pub mod ranking;
pub mod rules;
pub mod scoring;

pub use parser::{CouponParser, ExtractionResult};

use crate::models::coupon::{CouponInput, ParsedCoupon};

/// Trait for coupon field extractors.
///
/// Implementations are best effort: anything that cannot be determined is
/// left empty rather than reported as an error.
pub trait CouponExtractor {
    /// Extract coupon fields from text and optional layout blocks.
    fn extract(&self, input: &CouponInput) -> ParsedCoupon;

    /// Extract coupon fields from plain text.
    fn extract_from_text(&self, text: &str) -> ParsedCoupon;
}
