//! Rule-based field extractors for coupon text.

pub mod address;
pub mod brand;
pub mod dates;
pub mod discount;
pub mod mode;
pub mod notes;
pub mod patterns;
pub mod phone;

pub use address::{has_street_token, has_zip, is_address_like, is_offer_language};
pub use brand::{brand_from_url, split_brand_label};
pub use dates::{parse_expiry, ExpiryExtractor};
pub use discount::{derive_title, Discount, DiscountExtractor};
pub use mode::detect_mode;
pub use notes::{extract_headline, extract_location_note, extract_terms};
pub use phone::{extract_phone, PhoneExtractor};

/// Trait for field extractors.
pub trait FieldExtractor {
    /// The type of value this extractor produces.
    type Output;

    /// Extract the preferred occurrence of the field from text.
    fn extract(&self, text: &str) -> Option<Self::Output>;

    /// Extract all valid occurrences of the field, in text order.
    fn extract_all(&self, text: &str) -> Vec<Self::Output>;
}

/// A matched value together with where it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractionMatch<T> {
    /// Extracted value.
    pub value: T,
    /// Confidence score (0.0 - 1.0).
    pub confidence: f32,
    /// Byte span in source text.
    pub position: Option<(usize, usize)>,
    /// Source text that was matched.
    pub source: String,
}

impl<T> ExtractionMatch<T> {
    pub fn new(value: T, confidence: f32, source: impl Into<String>) -> Self {
        Self {
            value,
            confidence,
            position: None,
            source: source.into(),
        }
    }

    pub fn with_position(mut self, start: usize, end: usize) -> Self {
        self.position = Some((start, end));
        self
    }
}
