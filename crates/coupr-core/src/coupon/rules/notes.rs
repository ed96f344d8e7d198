//! Free-text coupon fields: terms, location note, and headline.

use super::patterns::{HEADLINE_OFFER, LOCATION_NOTE, TERMS_KEYWORD};

/// Maximum length of the raw-text headline.
pub const HEADLINE_MAX_CHARS: usize = 80;

/// Extract the terms snippet.
///
/// Starts at the first terms/conditions/validity keyword; without one, the
/// tail of the text is used. Either way the result holds at most
/// `max_chars` characters.
pub fn extract_terms(text: &str, max_chars: usize) -> Option<String> {
    let snippet: String = match TERMS_KEYWORD.find(text) {
        Some(m) => text[m.start()..].chars().take(max_chars).collect(),
        None => {
            let total = text.chars().count();
            text.chars().skip(total.saturating_sub(max_chars)).collect()
        }
    };

    let snippet = snippet.trim();
    (!snippet.is_empty()).then(|| snippet.to_string())
}

/// First line scoping where the coupon can be redeemed.
pub fn extract_location_note<S: AsRef<str>>(lines: &[S]) -> Option<String> {
    lines
        .iter()
        .map(|l| l.as_ref().trim())
        .find(|l| LOCATION_NOTE.is_match(l))
        .map(str::to_string)
}

/// First line carrying offer language, as printed.
///
/// This is the raw-text title of the lighter text-only extraction; it is
/// never used as the synthesized discount title.
pub fn extract_headline<S: AsRef<str>>(lines: &[S]) -> Option<String> {
    lines
        .iter()
        .map(|l| l.as_ref().trim())
        .find(|l| HEADLINE_OFFER.is_match(l))
        .map(|l| l.chars().take(HEADLINE_MAX_CHARS).collect::<String>().trim_end().to_string())
}
