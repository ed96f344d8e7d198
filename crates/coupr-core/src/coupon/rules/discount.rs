//! Discount detection and coupon title synthesis.

use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use tracing::debug;

use super::patterns::{BOGO, MONEY, PERCENT};
use super::{ExtractionMatch, FieldExtractor};

/// Smallest percentage accepted as a real discount.
pub const MIN_PERCENT: u32 = 5;
/// Largest percentage accepted as a real discount.
pub const MAX_PERCENT: u32 = 100;

/// A discount found in coupon text.
#[derive(Debug, Clone, PartialEq)]
pub enum Discount {
    /// Percentage off, within [`MIN_PERCENT`, `MAX_PERCENT`].
    Percent(u32),
    /// Currency amount off; `text` keeps the number as printed.
    Amount { value: Decimal, text: String },
    /// Buy-one-get-one promotion.
    Bogo,
}

impl Discount {
    /// Human-readable coupon title for this discount.
    pub fn title(&self) -> String {
        self.to_string()
    }

    fn magnitude(&self) -> Decimal {
        match self {
            Discount::Percent(n) => Decimal::from(*n),
            Discount::Amount { value, .. } => *value,
            Discount::Bogo => Decimal::ZERO,
        }
    }
}

impl fmt::Display for Discount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Discount::Percent(n) => write!(f, "{}% off", n),
            Discount::Amount { text, .. } => write!(f, "${} off", text),
            Discount::Bogo => f.write_str("BOGO"),
        }
    }
}

/// Discount extractor.
///
/// The preferred discount is the largest valid percentage, else the largest
/// valid amount, else BOGO. Kinds are never combined.
pub struct DiscountExtractor;

impl DiscountExtractor {
    pub fn new() -> Self {
        Self
    }

    fn percents(&self, text: &str) -> Vec<ExtractionMatch<Discount>> {
        PERCENT
            .captures_iter(text)
            .filter_map(|caps| {
                let n: u32 = caps[1].parse().ok()?;
                if !(MIN_PERCENT..=MAX_PERCENT).contains(&n) {
                    return None;
                }
                let full = caps.get(0)?;
                Some(
                    ExtractionMatch::new(Discount::Percent(n), 0.9, full.as_str())
                        .with_position(full.start(), full.end()),
                )
            })
            .collect()
    }

    fn amounts(&self, text: &str) -> Vec<ExtractionMatch<Discount>> {
        MONEY
            .captures_iter(text)
            .filter_map(|caps| {
                let printed = caps.get(1)?.as_str();
                let value = Decimal::from_str(&printed.replace(',', "")).ok()?;
                if value <= Decimal::ZERO {
                    return None;
                }
                let full = caps.get(0)?;
                let discount = Discount::Amount {
                    value,
                    text: printed.to_string(),
                };
                Some(
                    ExtractionMatch::new(discount, 0.8, full.as_str())
                        .with_position(full.start(), full.end()),
                )
            })
            .collect()
    }

    fn bogo(&self, text: &str) -> Option<ExtractionMatch<Discount>> {
        BOGO.find(text).map(|m| {
            ExtractionMatch::new(Discount::Bogo, 0.7, m.as_str()).with_position(m.start(), m.end())
        })
    }
}

impl Default for DiscountExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for DiscountExtractor {
    type Output = ExtractionMatch<Discount>;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        largest(self.percents(text))
            .or_else(|| largest(self.amounts(text)))
            .or_else(|| self.bogo(text))
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        let mut results = self.percents(text);
        results.extend(self.amounts(text));
        results.extend(self.bogo(text));
        results.sort_by_key(|m| m.position.map(|(start, _)| start).unwrap_or(usize::MAX));
        results
    }
}

/// Largest discount of a single kind; ties keep the first occurrence.
fn largest(matches: Vec<ExtractionMatch<Discount>>) -> Option<ExtractionMatch<Discount>> {
    let mut best: Option<ExtractionMatch<Discount>> = None;
    for m in matches {
        let better = best
            .as_ref()
            .is_none_or(|b| m.value.magnitude() > b.value.magnitude());
        if better {
            best = Some(m);
        }
    }
    best
}

/// Synthesize a coupon title from the best discount in the text.
pub fn derive_title(text: &str) -> Option<String> {
    DiscountExtractor::new().extract(text).map(|m| {
        debug!("Discount '{}' matched (confidence {:.2})", m.source, m.confidence);
        m.value.title()
    })
}
