//! Phone number extraction.

use tracing::debug;

use super::patterns::PHONE;
use super::{ExtractionMatch, FieldExtractor};

/// Phone number extractor.
///
/// A match is accepted when it carries 7 to 10 digits, not counting a
/// leading `+1` country code. The preferred match is the fullest one.
pub struct PhoneExtractor;

impl PhoneExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for PhoneExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for PhoneExtractor {
    type Output = ExtractionMatch<String>;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        // max_by_key keeps the last maximum; iterate in reverse so ties
        // resolve to the first occurrence.
        self.extract_all(text)
            .into_iter()
            .rev()
            .max_by_key(|m| digit_count(&m.value))
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        PHONE
            .find_iter(text)
            .filter(|m| {
                let digits = national_digit_count(m.as_str());
                (7..=10).contains(&digits)
            })
            .map(|m| {
                let value = m.as_str().trim().to_string();
                let confidence = if digit_count(&value) >= 10 { 0.9 } else { 0.6 };
                ExtractionMatch::new(value, confidence, m.as_str())
                    .with_position(m.start(), m.end())
            })
            .collect()
    }
}

/// Extract the phone number with the most digits from text.
pub fn extract_phone(text: &str) -> Option<String> {
    PhoneExtractor::new().extract(text).map(|m| {
        debug!("Phone '{}' matched (confidence {:.2})", m.source, m.confidence);
        m.value
    })
}

/// Count ASCII digits in a string.
pub fn digit_count(s: &str) -> usize {
    s.chars().filter(|c| c.is_ascii_digit()).count()
}

fn national_digit_count(s: &str) -> usize {
    let digits = digit_count(s);
    if s.trim_start().starts_with("+1") {
        digits.saturating_sub(1)
    } else {
        digits
    }
}
