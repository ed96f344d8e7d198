//! Street-address signals.

use super::patterns::{OFFER_LANGUAGE, STREET_TOKENS, ZIP};

/// Check whether a line contains a street-suffix or unit token as a whole word.
pub fn has_street_token(line: &str) -> bool {
    line.split_whitespace().any(|word| {
        if word.starts_with('#') {
            return true;
        }
        let token = word
            .trim_matches(|c: char| !c.is_alphanumeric())
            .to_uppercase();
        !token.is_empty() && STREET_TOKENS.contains(&token.as_str())
    })
}

/// Check whether a line contains a 5-digit ZIP code (optionally ZIP+4).
pub fn has_zip(line: &str) -> bool {
    ZIP.is_match(line)
}

/// A line is address-like when it has a street token or a ZIP code.
pub fn is_address_like(line: &str) -> bool {
    has_street_token(line) || has_zip(line)
}

/// Marketing copy that must never be taken for an address.
pub fn is_offer_language(line: &str) -> bool {
    OFFER_LANGUAGE.is_match(line)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_street_tokens() {
        assert!(has_street_token("123 Main St."));
        assert!(has_street_token("4400 28th Ave SW"));
        assert!(has_street_token("Suite 200"));
        assert!(has_street_token("Unit #4"));
        assert!(has_street_token("Cascade Rd, Grand Rapids"));
        assert!(!has_street_token("SUBWAY"));
        assert!(!has_street_token("Stand by for deals"));
    }

    #[test]
    fn test_zip() {
        assert!(has_zip("Grand Rapids, MI 49546"));
        assert!(!has_zip("Call 555-0198"));
    }

    #[test]
    fn test_address_like() {
        assert!(is_address_like("Kentwood MI 49512"));
        assert!(is_address_like("2055 28th St SE"));
        assert!(!is_address_like("CHIPOTLE MEXICAN GRILL"));
    }

    #[test]
    fn test_offer_language() {
        assert!(is_offer_language("Buy One Get One Free at checkout"));
        assert!(is_offer_language("Customer must present coupon"));
        assert!(!is_offer_language("2055 28th St SE"));
    }
}
