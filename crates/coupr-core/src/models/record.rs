//! Persistence contracts for the coupon backend.
//!
//! [`CouponRecord`] is the insert payload built from an extraction;
//! [`CouponRow`] is a typed view of rows read back from the backend,
//! validated once at the boundary.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::coupon::{GeoPoint, ParsedCoupon, RedemptionMode};
use crate::error::RecordError;

/// Version tag stored with every record so old parses can be re-run.
pub const PARSER_VERSION: &str = concat!("coupr-", env!("CARGO_PKG_VERSION"));

/// Record-insert payload for a captured coupon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CouponRecord {
    pub owner_id: String,
    pub store: Option<String>,
    pub title: Option<String>,
    pub terms: Option<String>,
    /// End of the expiry day, UTC.
    pub expires_at: Option<DateTime<Utc>>,
    pub attributes: CouponAttributes,
}

/// Free-form attributes stored alongside the record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CouponAttributes {
    pub raw_text: String,
    pub parser_version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default)]
    pub mode: RedemptionMode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location_note: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geo: Option<GeoPoint>,
}

impl CouponRecord {
    /// Build the insert payload for `owner_id` from an extraction.
    pub fn from_parsed(
        owner_id: impl Into<String>,
        coupon: &ParsedCoupon,
        raw_text: &str,
    ) -> Result<Self, RecordError> {
        let owner_id = owner_id.into();
        if owner_id.trim().is_empty() {
            return Err(RecordError::MissingField("owner_id".to_string()));
        }

        Ok(Self {
            owner_id,
            store: coupon.store.clone(),
            title: coupon.title.clone(),
            terms: coupon.terms.clone(),
            expires_at: coupon.expires_at.and_then(end_of_day),
            attributes: CouponAttributes {
                raw_text: raw_text.to_string(),
                parser_version: PARSER_VERSION.to_string(),
                address: coupon.address.clone(),
                phone: coupon.phone.clone(),
                mode: coupon.mode,
                location_note: coupon.location_note.clone(),
                geo: coupon.geo,
            },
        })
    }
}

fn end_of_day(date: NaiveDate) -> Option<DateTime<Utc>> {
    date.and_hms_opt(23, 59, 59).map(|dt| dt.and_utc())
}

/// A coupon row as returned by the backend feed.
#[derive(Debug, Clone, PartialEq)]
pub struct CouponRow {
    pub id: String,
    pub owner_id: String,
    pub store: Option<String>,
    pub title: Option<String>,
    pub terms: Option<String>,
    pub expires_at: Option<NaiveDate>,
    pub is_public: bool,
    pub attributes: Map<String, Value>,
}

impl CouponRow {
    /// Raw OCR text kept in the attributes bag, if any.
    pub fn raw_text(&self) -> Option<&str> {
        self.attributes.get("raw_text").and_then(Value::as_str)
    }
}

impl TryFrom<Value> for CouponRow {
    type Error = RecordError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        let Value::Object(mut obj) = value else {
            return Err(RecordError::InvalidField {
                field: "row".to_string(),
                reason: "expected a JSON object".to_string(),
            });
        };

        let id = match obj.remove("id") {
            Some(Value::String(s)) if !s.is_empty() => s,
            Some(Value::Number(n)) => n.to_string(),
            Some(Value::Null) | None => return Err(RecordError::MissingField("id".to_string())),
            Some(other) => return Err(invalid("id", &other)),
        };

        let owner_id = optional_string(&mut obj, "owner_id")?
            .filter(|s| !s.is_empty())
            .ok_or_else(|| RecordError::MissingField("owner_id".to_string()))?;

        let expires_at = optional_string(&mut obj, "expires_at")?
            .map(|s| parse_row_date(&s))
            .transpose()?;

        let is_public = match obj.remove("is_public") {
            Some(Value::Bool(b)) => b,
            Some(Value::Null) | None => false,
            Some(other) => return Err(invalid("is_public", &other)),
        };

        let attributes = match obj.remove("attributes") {
            Some(Value::Object(map)) => map,
            Some(Value::Null) | None => Map::new(),
            Some(other) => return Err(invalid("attributes", &other)),
        };

        Ok(Self {
            id,
            owner_id,
            store: optional_string(&mut obj, "store")?,
            title: optional_string(&mut obj, "title")?,
            terms: optional_string(&mut obj, "terms")?,
            expires_at,
            is_public,
            attributes,
        })
    }
}

fn optional_string(
    obj: &mut Map<String, Value>,
    field: &str,
) -> Result<Option<String>, RecordError> {
    match obj.remove(field) {
        Some(Value::String(s)) => Ok(Some(s)),
        Some(Value::Null) | None => Ok(None),
        Some(other) => Err(invalid(field, &other)),
    }
}

fn parse_row_date(s: &str) -> Result<NaiveDate, RecordError> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc).date_naive())
        .or_else(|_| NaiveDate::parse_from_str(s, "%Y-%m-%d"))
        .map_err(|e| RecordError::InvalidField {
            field: "expires_at".to_string(),
            reason: format!("'{}': {}", s, e),
        })
}

fn invalid(field: &str, value: &Value) -> RecordError {
    RecordError::InvalidField {
        field: field.to_string(),
        reason: format!("unexpected value {}", value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn sample_coupon() -> ParsedCoupon {
        ParsedCoupon {
            store: Some("SUBWAY".to_string()),
            address: Some("2055 28th St SE".to_string()),
            phone: Some("(616) 555-0198".to_string()),
            mode: RedemptionMode::Pickup,
            title: Some("$5 off".to_string()),
            expires_at: NaiveDate::from_ymd_opt(2026, 12, 31),
            ..ParsedCoupon::default()
        }
    }

    #[test]
    fn test_record_from_parsed() {
        let record =
            CouponRecord::from_parsed("user-1", &sample_coupon(), "SUBWAY\n$5 off").unwrap();

        assert_eq!(record.owner_id, "user-1");
        assert_eq!(record.title.as_deref(), Some("$5 off"));
        assert_eq!(
            record.expires_at.map(|d| d.to_rfc3339()),
            Some("2026-12-31T23:59:59+00:00".to_string())
        );
        assert_eq!(record.attributes.raw_text, "SUBWAY\n$5 off");
        assert_eq!(record.attributes.parser_version, PARSER_VERSION);
        assert_eq!(record.attributes.mode, RedemptionMode::Pickup);
    }

    #[test]
    fn test_record_requires_owner() {
        let err = CouponRecord::from_parsed("  ", &sample_coupon(), "").unwrap_err();
        assert!(matches!(err, RecordError::MissingField(f) if f == "owner_id"));
    }

    #[test]
    fn test_row_from_value() {
        let row = CouponRow::try_from(json!({
            "id": 17,
            "owner_id": "user-1",
            "store": "SUBWAY",
            "title": null,
            "expires_at": "2026-12-31T23:59:59Z",
            "is_public": true,
            "attributes": {"raw_text": "SUBWAY", "parser_version": "coupr-0.1.0"}
        }))
        .unwrap();

        assert_eq!(row.id, "17");
        assert_eq!(row.store.as_deref(), Some("SUBWAY"));
        assert_eq!(row.title, None);
        assert_eq!(row.expires_at, NaiveDate::from_ymd_opt(2026, 12, 31));
        assert!(row.is_public);
        assert_eq!(row.raw_text(), Some("SUBWAY"));
    }

    #[test]
    fn test_row_plain_date() {
        let row = CouponRow::try_from(json!({
            "id": "a1",
            "owner_id": "user-1",
            "expires_at": "2026-01-05"
        }))
        .unwrap();
        assert_eq!(row.expires_at, NaiveDate::from_ymd_opt(2026, 1, 5));
        assert!(!row.is_public);
        assert!(row.attributes.is_empty());
    }

    #[test]
    fn test_row_validation_errors() {
        assert!(matches!(
            CouponRow::try_from(json!({"owner_id": "u"})),
            Err(RecordError::MissingField(f)) if f == "id"
        ));
        assert!(matches!(
            CouponRow::try_from(json!({"id": "1"})),
            Err(RecordError::MissingField(f)) if f == "owner_id"
        ));
        assert!(matches!(
            CouponRow::try_from(json!({"id": "1", "owner_id": "u", "store": 5})),
            Err(RecordError::InvalidField { field, .. }) if field == "store"
        ));
        assert!(matches!(
            CouponRow::try_from(json!({"id": "1", "owner_id": "u", "expires_at": "soon"})),
            Err(RecordError::InvalidField { field, .. }) if field == "expires_at"
        ));
        assert!(CouponRow::try_from(json!([1, 2])).is_err());
    }
}
