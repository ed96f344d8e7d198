//! WASM bindings for coupon field extraction.
//!
//! This crate provides WebAssembly bindings for the capture screen. Address
//! geocoding is delegated to a host callback so the browser or React Native
//! runtime can use whatever service it already talks to.

use js_sys::{Array, Function, Object, Promise};
use serde::Serialize;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::{future_to_promise, JsFuture};

use coupr_core::error::GeocodeError;
use coupr_core::{CouponInput, CouponParser, GeoLocation, Geocoder};

/// Default time a host geocode callback may take per address.
pub const DEFAULT_GEOCODE_TIMEOUT_MS: u32 = 4_000;

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_name = setTimeout)]
    fn set_timeout(handler: &Function, timeout: i32, argument: &JsValue) -> JsValue;

    #[wasm_bindgen(js_name = clearTimeout)]
    fn clear_timeout(handle: &JsValue);
}

/// Initialize panic hook for better error messages in console.
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Version information.
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

/// Extract coupon fields without geocoding.
///
/// `input` is either the OCR text or an object
/// `{ text, blocks?, brands?, tryGeocode? }`.
#[wasm_bindgen]
pub fn extract_coupon_fields(input: JsValue) -> Result<JsValue, JsValue> {
    let input = input_from_js(input)?;
    let result = CouponParser::new().parse(&input);
    to_js(&result.coupon)
}

/// Extract coupon fields, validating address candidates with `geocode_fn`.
///
/// `geocode_fn(address)` must return (a promise of) an array of
/// `{ latitude, longitude }`. Rejections, malformed answers and calls that
/// take longer than 4 seconds count as "not found". Resolves to the coupon
/// object.
#[wasm_bindgen]
pub fn extract_with_geocoder(input: JsValue, geocode_fn: Function) -> Result<Promise, JsValue> {
    let input = input_from_js(input)?;
    let geocoder = JsGeocoder::new(geocode_fn, DEFAULT_GEOCODE_TIMEOUT_MS);

    Ok(future_to_promise(async move {
        let result = CouponParser::new()
            .parse_with_geocoder(&input, &geocoder)
            .await;
        for warning in &result.warnings {
            web_sys::console::warn_1(&JsValue::from_str(warning));
        }
        to_js(&result.coupon)
    }))
}

/// Coupon extractor class for repeated use with the same settings.
#[wasm_bindgen]
pub struct CouponExtractor {
    brands: Vec<String>,
    fallback_title: bool,
    geocode_timeout_ms: u32,
}

#[wasm_bindgen]
impl CouponExtractor {
    /// Create a new coupon extractor.
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self {
            brands: Vec::new(),
            fallback_title: false,
            geocode_timeout_ms: DEFAULT_GEOCODE_TIMEOUT_MS,
        }
    }

    /// Add a known brand name.
    #[wasm_bindgen]
    pub fn add_brand(&mut self, brand: &str) {
        let brand = brand.trim();
        if !brand.is_empty() {
            self.brands.push(brand.to_string());
        }
    }

    /// Use the offer headline as title when no discount is found.
    #[wasm_bindgen]
    pub fn set_fallback_title(&mut self, enabled: bool) {
        self.fallback_title = enabled;
    }

    /// Limit how long each geocode callback may take, in milliseconds.
    #[wasm_bindgen]
    pub fn set_geocode_timeout_ms(&mut self, timeout_ms: u32) {
        self.geocode_timeout_ms = timeout_ms;
    }

    /// Extract coupon fields.
    #[wasm_bindgen]
    pub fn extract(&self, input: JsValue) -> Result<JsValue, JsValue> {
        let input = input_from_js(input)?;
        to_js(&self.parser().parse(&input).coupon)
    }

    /// Extract coupon fields with raw text, headline, and warnings.
    #[wasm_bindgen]
    pub fn extract_with_metadata(&self, input: JsValue) -> Result<JsValue, JsValue> {
        let input = input_from_js(input)?;
        to_js(&self.parser().parse(&input))
    }

    /// Extract with geocoding through `geocode_fn`; resolves to the coupon.
    #[wasm_bindgen]
    pub fn extract_with_geocoder(
        &self,
        input: JsValue,
        geocode_fn: Function,
    ) -> Result<Promise, JsValue> {
        let input = input_from_js(input)?;
        let parser = self.parser();
        let geocoder = JsGeocoder::new(geocode_fn, self.geocode_timeout_ms);

        Ok(future_to_promise(async move {
            let result = parser.parse_with_geocoder(&input, &geocoder).await;
            to_js(&result.coupon)
        }))
    }

    fn parser(&self) -> CouponParser {
        CouponParser::new()
            .with_brands(self.brands.iter().cloned())
            .with_fallback_title(self.fallback_title)
    }
}

impl Default for CouponExtractor {
    fn default() -> Self {
        Self::new()
    }
}

/// Adapts a JS geocoding callback to [`Geocoder`].
struct JsGeocoder {
    callback: Function,
    timeout_ms: u32,
}

impl JsGeocoder {
    fn new(callback: Function, timeout_ms: u32) -> Self {
        Self {
            callback,
            timeout_ms,
        }
    }
}

impl Geocoder for JsGeocoder {
    async fn geocode(&self, address: &str) -> Result<Vec<GeoLocation>, GeocodeError> {
        let returned = self
            .callback
            .call1(&JsValue::NULL, &JsValue::from_str(address))
            .map_err(|e| js_error(&e))?;

        // Race the answer (plain value or promise) against a timer that
        // resolves to a marker object
        let marker: JsValue = Object::new().into();
        let timeout_ms = i32::try_from(self.timeout_ms).unwrap_or(i32::MAX);
        let mut handle = JsValue::UNDEFINED;
        let timer = Promise::new(&mut |resolve, _reject| {
            handle = set_timeout(&resolve, timeout_ms, &marker);
        });
        let race = Array::of2(&Promise::resolve(&returned), &timer);

        let settled = JsFuture::from(Promise::race(&race)).await;
        clear_timeout(&handle);
        let resolved = settled.map_err(|e| js_error(&e))?;

        if Object::is(&resolved, &marker) {
            return Err(GeocodeError::Lookup(format!(
                "timed out after {} ms",
                self.timeout_ms
            )));
        }

        if resolved.is_null() || resolved.is_undefined() {
            return Ok(Vec::new());
        }

        serde_wasm_bindgen::from_value(resolved).map_err(|e| GeocodeError::Decode(e.to_string()))
    }
}

fn js_error(value: &JsValue) -> GeocodeError {
    GeocodeError::Lookup(value.as_string().unwrap_or_else(|| format!("{:?}", value)))
}

fn input_from_js(value: JsValue) -> Result<CouponInput, JsValue> {
    if let Some(text) = value.as_string() {
        return Ok(CouponInput::from_text(text));
    }

    let input: CouponInput =
        serde_wasm_bindgen::from_value(value).map_err(|e| JsValue::from_str(&e.to_string()))?;
    input
        .validate()
        .map_err(|e| JsValue::from_str(&e.to_string()))?;
    Ok(input)
}

/// Serialize with `null` for absent fields and plain objects for maps.
fn to_js<T: Serialize>(value: &T) -> Result<JsValue, JsValue> {
    let serializer = serde_wasm_bindgen::Serializer::json_compatible();
    value
        .serialize(&serializer)
        .map_err(|e| JsValue::from_str(&e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use wasm_bindgen_test::*;

    #[wasm_bindgen_test]
    fn test_version() {
        assert!(!version().is_empty());
    }

    #[wasm_bindgen_test]
    fn test_extract_from_text() {
        let value =
            extract_coupon_fields(JsValue::from_str("SUBWAY\n$5 off any footlong")).unwrap();
        let coupon: coupr_core::ParsedCoupon = serde_wasm_bindgen::from_value(value).unwrap();
        assert_eq!(coupon.store.as_deref(), Some("SUBWAY"));
        assert_eq!(coupon.title.as_deref(), Some("$5 off"));
    }

    #[wasm_bindgen_test]
    async fn test_hanging_geocoder_times_out() {
        let mut extractor = CouponExtractor::new();
        extractor.set_geocode_timeout_ms(20);
        let never_settles =
            Function::new_with_args("address", "return new Promise(function () {});");

        let promise = extractor
            .extract_with_geocoder(
                JsValue::from_str("SUBWAY\n99 Ionia Ave SW\nGrand Rapids, MI 49503"),
                never_settles,
            )
            .unwrap();
        let value = JsFuture::from(promise).await.unwrap();
        let coupon: coupr_core::ParsedCoupon = serde_wasm_bindgen::from_value(value).unwrap();

        assert_eq!(
            coupon.address.as_deref(),
            Some("99 Ionia Ave SW, Grand Rapids, MI 49503")
        );
        assert_eq!(coupon.geo, None);
    }

    #[wasm_bindgen_test]
    async fn test_plain_value_geocoder_answer() {
        let answer = Function::new_with_args(
            "address",
            "return [{ latitude: 42.96, longitude: -85.67 }];",
        );

        let promise = extract_with_geocoder(
            JsValue::from_str("SUBWAY\n99 Ionia Ave SW\nGrand Rapids, MI 49503"),
            answer,
        )
        .unwrap();
        let value = JsFuture::from(promise).await.unwrap();
        let coupon: coupr_core::ParsedCoupon = serde_wasm_bindgen::from_value(value).unwrap();

        assert_eq!(coupon.geo, Some(coupr_core::GeoPoint { lat: 42.96, lng: -85.67 }));
    }

    #[wasm_bindgen_test]
    fn test_extractor_brand_hint() {
        let mut extractor = CouponExtractor::new();
        extractor.add_brand("Chipotle");

        let value = extractor
            .extract(JsValue::from_str(
                "FREE CHIPS & GUAC WITH ENTREE\nChipotle Mexican Grill",
            ))
            .unwrap();
        let coupon: coupr_core::ParsedCoupon = serde_wasm_bindgen::from_value(value).unwrap();
        assert_eq!(coupon.store.as_deref(), Some("Chipotle Mexican Grill"));
    }
}
