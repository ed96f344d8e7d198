//! Regex pattern table for coupon field extraction.
//!
//! Every heuristic matches against these definitions so each pattern can be
//! tested on its own.

use lazy_static::lazy_static;
use regex::Regex;

/// Street-suffix and unit tokens that mark a line as address-like.
///
/// Compared against whole words, upper-cased, with surrounding punctuation
/// stripped ("St." is "ST").
pub const STREET_TOKENS: &[&str] = &[
    "ST", "STREET", "AVE", "AV", "AVENUE", "BLVD", "BOULEVARD", "DR", "DRIVE", "RD", "ROAD",
    "LN", "LANE", "WAY", "CT", "COURT", "PL", "PLACE", "PKWY", "PARKWAY", "HWY", "HIGHWAY",
    "CIR", "CIRCLE", "TER", "TERRACE", "TRL", "TRAIL", "SQ", "PLZ", "PLAZA", "STE", "SUITE", "#",
];

lazy_static! {
    // Phone: optional +1, optional area code, 3 + 4 digit groups on one line
    pub static ref PHONE: Regex = Regex::new(
        r"(?:\+1[ \t.\-•·]*)?(?:\(\d{3}\)[ \t.\-•·]*|\b\d{3}[ \t.\-•·]+)?\b\d{3}[ \t.\-•·]{0,3}\d{4}\b"
    ).unwrap();

    // Discounts
    pub static ref PERCENT: Regex = Regex::new(
        r"\b(\d{1,3})\s*%"
    ).unwrap();

    pub static ref MONEY: Regex = Regex::new(
        r"(?i)(?:\$|\bUSD)\s*((?:\d{1,3}(?:,\d{3})+|\d+)(?:\.\d{2})?)\b(?:\s*(?:off|discount|save))?"
    ).unwrap();

    pub static ref BOGO: Regex = Regex::new(
        r"(?i)\b(?:bogo|buy\s*(?:1|one)\s*,?\s*get\s*(?:1|one))\b"
    ).unwrap();

    // Address signals
    pub static ref ZIP: Regex = Regex::new(
        r"\b\d{5}(?:-\d{4})?\b"
    ).unwrap();

    pub static ref OFFER_LANGUAGE: Regex = Regex::new(
        r"(?i)\b(?:buy|free|percent|off|save|coupon|offer|valid\s+only|customer\s+must)\b|%"
    ).unwrap();

    // Redemption mode
    pub static ref DINE_IN: Regex = Regex::new(
        r"(?i)\bdine[\s\-]?in\b"
    ).unwrap();

    pub static ref PICKUP: Regex = Regex::new(
        r"(?i)\bpick[\s\-]?up\b"
    ).unwrap();

    // Brand website, label captured without the TLD
    pub static ref BRAND_URL: Regex = Regex::new(
        r"(?i)\b(?:https?://)?(?:www\.)?([a-z0-9][a-z0-9\-]*[a-z0-9]{2})\.(?:com|net|org|co|us|biz|info|io|shop|store)\b"
    ).unwrap();

    // Expiry dates
    pub static ref EXPIRY_LABELED: Regex = Regex::new(
        r"(?i)\b(?:expires?|expiration(?:\s+date)?|exp|valid\s+(?:thru|through|until|till))\b\.?\s*(?:on\s+)?:?\s*(\d{1,2}[/.\-]\d{1,2}[/.\-](?:\d{4}|\d{2}))\b"
    ).unwrap();

    pub static ref DATE_NUMERIC: Regex = Regex::new(
        r"\b(\d{1,2})[/.\-](\d{1,2})[/.\-](\d{4}|\d{2})\b"
    ).unwrap();

    pub static ref DATE_MONTH_NAME: Regex = Regex::new(
        r"(?i)\b(jan(?:uary)?|feb(?:ruary)?|mar(?:ch)?|apr(?:il)?|may|june?|july?|aug(?:ust)?|sep(?:t(?:ember)?)?|oct(?:ober)?|nov(?:ember)?|dec(?:ember)?)\.?\s+(\d{1,2})(?:st|nd|rd|th)?,?\s+(\d{4})\b"
    ).unwrap();

    // Store-name candidates
    pub static ref STITCH_EXCLUDE: Regex = Regex::new(
        r"(?i)\b(?:valid|location|locations|only|expires?|exp|offer|coupon|code|off|free|save|buy|get|limit|participating|excludes?|with|purchase|not)\b"
    ).unwrap();

    // Free-text fields
    pub static ref TERMS_KEYWORD: Regex = Regex::new(
        r"(?i)\b(?:terms|conditions|restrictions|valid|validity|exclusions?|excludes|limit\s+one)\b"
    ).unwrap();

    pub static ref LOCATION_NOTE: Regex = Regex::new(
        r"(?i)\b(?:participating\s+locations?|(?:this|all|select)\s+locations?|locations?\s*:|valid\s+(?:only\s+)?at)\b"
    ).unwrap();

    pub static ref HEADLINE_OFFER: Regex = Regex::new(
        r"(?i)\b(?:off|free|save|deal|special|bogo)\b|%|\$\s*\d"
    ).unwrap();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phone_pattern() {
        assert!(PHONE.is_match("555-1234"));
        assert!(PHONE.is_match("(616) 555-0198"));
        assert!(PHONE.is_match("+1 616.555.0198"));
        assert!(PHONE.is_match("616 • 555 • 0198"));
        assert!(!PHONE.is_match("49503-1234"));
        assert!(!PHONE.is_match("12/31/2026"));
    }

    #[test]
    fn test_percent_pattern() {
        let caps = PERCENT.captures("Take 25 % off").unwrap();
        assert_eq!(&caps[1], "25");
        assert!(!PERCENT.is_match("1500%"));
    }

    #[test]
    fn test_money_pattern() {
        let caps = MONEY.captures("Save $4.99 off any order").unwrap();
        assert_eq!(&caps[1], "4.99");
        let caps = MONEY.captures("USD 10 discount").unwrap();
        assert_eq!(&caps[1], "10");
        let caps = MONEY.captures("$1,000 giveaway").unwrap();
        assert_eq!(&caps[1], "1,000");
    }

    #[test]
    fn test_bogo_pattern() {
        assert!(BOGO.is_match("BOGO entrees"));
        assert!(BOGO.is_match("Buy 1 Get 1 free"));
        assert!(BOGO.is_match("buy one, get one"));
        assert!(BOGO.is_match("buy1get1"));
        assert!(!BOGO.is_match("buy two get one"));
    }

    #[test]
    fn test_zip_pattern() {
        assert!(ZIP.is_match("Grand Rapids, MI 49503"));
        assert!(ZIP.is_match("MI 49503-1234"));
        assert!(!ZIP.is_match("Call 555-1234"));
    }

    #[test]
    fn test_mode_patterns() {
        assert!(DINE_IN.is_match("Valid for Dine-In only"));
        assert!(DINE_IN.is_match("dine in"));
        assert!(PICKUP.is_match("online pick-up orders"));
        assert!(PICKUP.is_match("PICKUP"));
        assert!(!PICKUP.is_match("pickled"));
    }

    #[test]
    fn test_brand_url_pattern() {
        let caps = BRAND_URL.captures("Order at www.meltingpot.com today").unwrap();
        assert_eq!(&caps[1], "meltingpot");
        let caps = BRAND_URL.captures("https://five-guys.com/menu").unwrap();
        assert_eq!(&caps[1], "five-guys");
        assert!(!BRAND_URL.is_match("Visit us at St.Info"));
    }

    #[test]
    fn test_expiry_labeled_pattern() {
        let caps = EXPIRY_LABELED.captures("Expires 12/31/26").unwrap();
        assert_eq!(&caps[1], "12/31/26");
        let caps = EXPIRY_LABELED.captures("Exp: 1-15-2027").unwrap();
        assert_eq!(&caps[1], "1-15-2027");
        let caps = EXPIRY_LABELED.captures("valid thru 03.01.2026").unwrap();
        assert_eq!(&caps[1], "03.01.2026");
    }

    #[test]
    fn test_month_name_pattern() {
        let caps = DATE_MONTH_NAME.captures("Valid until Jan 5, 2026").unwrap();
        assert_eq!(&caps[1], "Jan");
        assert_eq!(&caps[2], "5");
        assert_eq!(&caps[3], "2026");
        assert!(DATE_MONTH_NAME.is_match("September 30th 2026"));
    }

    #[test]
    fn test_offer_language_pattern() {
        assert!(OFFER_LANGUAGE.is_match("Buy One Get One Free at checkout"));
        assert!(OFFER_LANGUAGE.is_match("20% on your visit"));
        assert!(OFFER_LANGUAGE.is_match("Valid only at participating stores"));
        assert!(!OFFER_LANGUAGE.is_match("123 Offerman Rd"));
    }
}
