//! Expiry date extraction for coupons.

use chrono::NaiveDate;
use regex::Captures;
use tracing::debug;

use super::patterns::{DATE_MONTH_NAME, DATE_NUMERIC, EXPIRY_LABELED};
use super::{ExtractionMatch, FieldExtractor};

/// Expiry date extractor.
///
/// Tries a labeled date ("Expires 12/31/26"), then any numeric date, then a
/// month-name date, and stops at the first pattern that matches. A matched
/// but impossible calendar date yields nothing.
pub struct ExpiryExtractor;

impl ExpiryExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ExpiryExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for ExpiryExtractor {
    type Output = ExtractionMatch<NaiveDate>;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        if let Some(caps) = EXPIRY_LABELED.captures(text) {
            let date_text = caps.get(1)?;
            let date = DATE_NUMERIC
                .captures(date_text.as_str())
                .and_then(|c| numeric_date(&c))?;
            let full = caps.get(0)?;
            return Some(
                ExtractionMatch::new(date, 0.95, full.as_str())
                    .with_position(full.start(), full.end()),
            );
        }

        if let Some(caps) = DATE_NUMERIC.captures(text) {
            let date = numeric_date(&caps)?;
            let full = caps.get(0)?;
            return Some(
                ExtractionMatch::new(date, 0.8, full.as_str())
                    .with_position(full.start(), full.end()),
            );
        }

        let caps = DATE_MONTH_NAME.captures(text)?;
        let date = month_name_date(&caps)?;
        let full = caps.get(0)?;
        Some(
            ExtractionMatch::new(date, 0.85, full.as_str())
                .with_position(full.start(), full.end()),
        )
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        let mut results = Vec::new();

        for caps in DATE_NUMERIC.captures_iter(text) {
            if let (Some(date), Some(full)) = (numeric_date(&caps), caps.get(0)) {
                results.push(
                    ExtractionMatch::new(date, 0.8, full.as_str())
                        .with_position(full.start(), full.end()),
                );
            }
        }

        for caps in DATE_MONTH_NAME.captures_iter(text) {
            if let (Some(date), Some(full)) = (month_name_date(&caps), caps.get(0)) {
                results.push(
                    ExtractionMatch::new(date, 0.85, full.as_str())
                        .with_position(full.start(), full.end()),
                );
            }
        }

        results.sort_by_key(|m| m.position.map(|(start, _)| start).unwrap_or(usize::MAX));
        results
    }
}

/// Find the coupon expiry date in text.
pub fn parse_expiry(text: &str) -> Option<NaiveDate> {
    ExpiryExtractor::new().extract(text).map(|m| {
        debug!("Expiry '{}' matched (confidence {:.2})", m.source, m.confidence);
        m.value
    })
}

/// Build a date from `MM/DD/YY(YY)` captures, swapping month and day when
/// the first field cannot be a month or the second cannot be a day.
fn numeric_date(caps: &Captures<'_>) -> Option<NaiveDate> {
    let first: u32 = caps[1].parse().ok()?;
    let second: u32 = caps[2].parse().ok()?;
    let year = parse_year(&caps[3])?;

    let (month, day) = if (1..=12).contains(&first) && (1..=31).contains(&second) {
        (first, second)
    } else {
        (second, first)
    };

    NaiveDate::from_ymd_opt(year, month, day)
}

fn month_name_date(caps: &Captures<'_>) -> Option<NaiveDate> {
    let month = month_to_number(&caps[1])?;
    let day: u32 = caps[2].parse().ok()?;
    let year: i32 = caps[3].parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

fn parse_year(s: &str) -> Option<i32> {
    let year: i32 = s.parse().ok()?;
    // Two-digit years are always in the 2000s
    Some(if s.len() <= 2 { 2000 + year } else { year })
}

fn month_to_number(month: &str) -> Option<u32> {
    let prefix: String = month.chars().take(3).collect::<String>().to_lowercase();
    let number = match prefix.as_str() {
        "jan" => 1,
        "feb" => 2,
        "mar" => 3,
        "apr" => 4,
        "may" => 5,
        "jun" => 6,
        "jul" => 7,
        "aug" => 8,
        "sep" => 9,
        "oct" => 10,
        "nov" => 11,
        "dec" => 12,
        _ => return None,
    };
    Some(number)
}
