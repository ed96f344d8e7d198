//! Coupon extraction input and output contracts.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::InputError;
use crate::ocr::{validate_blocks, OcrBlock};

/// Structured coupon fields inferred from OCR text.
///
/// Every field is optional and extracted independently.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParsedCoupon {
    /// Merchant or brand name.
    pub store: Option<String>,

    /// Street address of the redeeming store.
    pub address: Option<String>,

    /// Store phone number, as printed.
    pub phone: Option<String>,

    /// Redemption mode.
    #[serde(default)]
    pub mode: RedemptionMode,

    /// Where the coupon may be redeemed ("participating locations only").
    pub location_note: Option<String>,

    /// Terms and conditions snippet.
    pub terms: Option<String>,

    /// Discount summary such as "20% off" or "$5 off".
    pub title: Option<String>,

    /// Expiry date (serialized as `YYYY-MM-DD`).
    pub expires_at: Option<NaiveDate>,

    /// Coordinates of the address, present only when geocoding succeeded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geo: Option<GeoPoint>,
}

impl ParsedCoupon {
    /// Check whether nothing at all was extracted.
    pub fn is_empty(&self) -> bool {
        self.store.is_none()
            && self.address.is_none()
            && self.phone.is_none()
            && self.mode == RedemptionMode::Unspecified
            && self.location_note.is_none()
            && self.terms.is_none()
            && self.title.is_none()
            && self.expires_at.is_none()
            && self.geo.is_none()
    }

    /// Use a raw-text headline as the title when no discount title was found.
    pub fn with_fallback_title(mut self, headline: Option<&str>) -> Self {
        if self.title.is_none() {
            self.title = headline.map(str::to_string);
        }
        self
    }
}

/// How the coupon is redeemed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RedemptionMode {
    /// No mode mentioned.
    #[default]
    #[serde(rename = "")]
    Unspecified,
    /// Dine-in orders.
    #[serde(rename = "dine-in")]
    DineIn,
    /// Pickup / carryout orders.
    #[serde(rename = "pickup")]
    Pickup,
}

impl RedemptionMode {
    /// Wire representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            RedemptionMode::Unspecified => "",
            RedemptionMode::DineIn => "dine-in",
            RedemptionMode::Pickup => "pickup",
        }
    }
}

/// Latitude/longitude pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

/// Extraction request as sent by the capture screen.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CouponInput {
    /// Full OCR text.
    #[serde(default)]
    pub text: String,

    /// Positioned OCR blocks, when the recognizer provides them.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub blocks: Vec<OcrBlock>,

    /// Known merchant names used to bias store-name scoring.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub brands: Vec<String>,

    /// Validate address candidates through the geocoder (default: on).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub try_geocode: Option<bool>,
}

impl CouponInput {
    /// Create a text-only input.
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    /// Decode and validate an input document.
    pub fn from_json(json: &str) -> Result<Self, InputError> {
        let input: Self =
            serde_json::from_str(json).map_err(|e| InputError::Malformed(e.to_string()))?;
        input.validate()?;
        Ok(input)
    }

    pub fn with_blocks(mut self, blocks: Vec<OcrBlock>) -> Self {
        self.blocks = blocks;
        self
    }

    pub fn with_brands<I, S>(mut self, brands: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.brands = brands.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_geocoding(mut self, enabled: bool) -> Self {
        self.try_geocode = Some(enabled);
        self
    }

    /// Check the input contract: block boxes inside the unit square and no
    /// blank brand names.
    pub fn validate(&self) -> Result<(), InputError> {
        validate_blocks(&self.blocks)?;
        if let Some(index) = self.brands.iter().position(|b| b.trim().is_empty()) {
            return Err(InputError::EmptyBrand(index));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_empty_coupon_serialization() {
        let json = serde_json::to_value(ParsedCoupon::default()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "store": null,
                "address": null,
                "phone": null,
                "mode": "",
                "location_note": null,
                "terms": null,
                "title": null,
                "expires_at": null
            })
        );
    }

    #[test]
    fn test_coupon_serialization_with_geo() {
        let coupon = ParsedCoupon {
            store: Some("SUBWAY".to_string()),
            mode: RedemptionMode::DineIn,
            expires_at: NaiveDate::from_ymd_opt(2026, 12, 31),
            geo: Some(GeoPoint { lat: 42.96, lng: -85.67 }),
            ..ParsedCoupon::default()
        };
        let json = serde_json::to_value(&coupon).unwrap();
        assert_eq!(json["mode"], "dine-in");
        assert_eq!(json["expires_at"], "2026-12-31");
        assert_eq!(json["geo"]["lat"], 42.96);

        let back: ParsedCoupon = serde_json::from_value(json).unwrap();
        assert_eq!(back, coupon);
    }

    #[test]
    fn test_input_from_json() {
        let input = CouponInput::from_json(
            r#"{
                "text": "SUBWAY\n$5 off",
                "blocks": [{"text": "SUBWAY", "bbox": {"x": 0.1, "y": 0.05, "w": 0.5, "h": 0.1}}],
                "brands": ["Subway"],
                "tryGeocode": false
            }"#,
        )
        .unwrap();
        assert_eq!(input.blocks.len(), 1);
        assert_eq!(input.brands, vec!["Subway".to_string()]);
        assert_eq!(input.try_geocode, Some(false));
    }

    #[test]
    fn test_input_text_only_json() {
        let input = CouponInput::from_json(r#"{"text": ""}"#).unwrap();
        assert_eq!(input, CouponInput::from_text(""));
    }

    #[test]
    fn test_input_contract_violations() {
        assert!(matches!(
            CouponInput::from_json(r#"{"text": 42}"#),
            Err(InputError::Malformed(_))
        ));
        assert!(matches!(
            CouponInput::from_json(r#"{"text": "x", "brands": ["Subway", "  "]}"#),
            Err(InputError::EmptyBrand(1))
        ));
        assert!(matches!(
            CouponInput::from_json(
                r#"{"text": "x", "blocks": [{"text": "a", "bbox": {"x": -0.1, "y": 0, "w": 0.1, "h": 0.1}}]}"#
            ),
            Err(InputError::BoundingBox { index: 0, .. })
        ));
    }

    #[test]
    fn test_fallback_title_only_when_missing() {
        let coupon = ParsedCoupon::default().with_fallback_title(Some("Free drink"));
        assert_eq!(coupon.title.as_deref(), Some("Free drink"));

        let coupon = ParsedCoupon {
            title: Some("20% off".to_string()),
            ..ParsedCoupon::default()
        }
        .with_fallback_title(Some("Free drink"));
        assert_eq!(coupon.title.as_deref(), Some("20% off"));
    }
}
