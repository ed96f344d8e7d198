//! Redemption mode detection.

use super::patterns::{DINE_IN, PICKUP};
use crate::models::coupon::RedemptionMode;

/// Detect whether a coupon is for dine-in or pickup orders.
///
/// Dine-in is checked first and wins when both appear.
pub fn detect_mode(text: &str) -> RedemptionMode {
    if DINE_IN.is_match(text) {
        RedemptionMode::DineIn
    } else if PICKUP.is_match(text) {
        RedemptionMode::Pickup
    } else {
        RedemptionMode::Unspecified
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_mode() {
        assert_eq!(detect_mode("Valid for DINE-IN only"), RedemptionMode::DineIn);
        assert_eq!(detect_mode("Online pick up orders"), RedemptionMode::Pickup);
        assert_eq!(detect_mode("Any order"), RedemptionMode::Unspecified);
    }

    #[test]
    fn test_dine_in_beats_pickup() {
        assert_eq!(
            detect_mode("Pickup or dine in at participating stores"),
            RedemptionMode::DineIn
        );
    }
}
