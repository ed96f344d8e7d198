//! Coupon parser combining line scoring, rule extraction, and optional
//! geocode validation.

use serde::Serialize;
use tracing::{debug, info};

use super::normalize::normalize_text;
use super::ranking::{
    rank_address, rank_addresses_geocoded, rank_store, AddressChoice,
    DEFAULT_MAX_ADDRESS_CANDIDATES,
};
use super::rules::{
    derive_title, detect_mode, extract_headline, extract_location_note, extract_phone,
    extract_terms, parse_expiry,
};
use super::scoring::{address_candidates, store_candidates};
use super::CouponExtractor;
use crate::geocode::Geocoder;
use crate::models::config::ExtractionConfig;
use crate::models::coupon::{CouponInput, ParsedCoupon};
use crate::ocr::{flatten_blocks, OcrLine};

/// Default length cap of the terms snippet.
pub const DEFAULT_TERMS_MAX_CHARS: usize = 400;

/// Result of coupon extraction.
#[derive(Debug, Clone, Serialize)]
pub struct ExtractionResult {
    /// Extracted coupon fields.
    pub coupon: ParsedCoupon,
    /// Normalized source text.
    pub raw_text: String,
    /// First line carrying offer language, as printed.
    pub headline: Option<String>,
    /// Extraction warnings.
    pub warnings: Vec<String>,
    /// Processing time in milliseconds.
    pub processing_time_ms: u64,
}

/// Processing timer. wasm32 has no std monotonic clock, so it reads 0 there.
#[derive(Debug, Clone, Copy)]
struct Timer {
    #[cfg(not(target_arch = "wasm32"))]
    start: std::time::Instant,
}

impl Timer {
    fn start() -> Self {
        Self {
            #[cfg(not(target_arch = "wasm32"))]
            start: std::time::Instant::now(),
        }
    }

    #[cfg(not(target_arch = "wasm32"))]
    fn elapsed_ms(&self) -> u64 {
        self.start.elapsed().as_millis() as u64
    }

    #[cfg(target_arch = "wasm32")]
    fn elapsed_ms(&self) -> u64 {
        0
    }
}

/// Text and lines prepared for extraction.
struct Prepared {
    lines: Vec<OcrLine>,
    text: String,
    brands: Vec<String>,
}

/// Heuristic coupon parser.
#[derive(Debug, Clone)]
pub struct CouponParser {
    brands: Vec<String>,
    try_geocode: bool,
    max_address_candidates: usize,
    terms_max_chars: usize,
    fallback_title: bool,
}

impl CouponParser {
    /// Create a parser with default settings.
    pub fn new() -> Self {
        Self {
            brands: Vec::new(),
            try_geocode: true,
            max_address_candidates: DEFAULT_MAX_ADDRESS_CANDIDATES,
            terms_max_chars: DEFAULT_TERMS_MAX_CHARS,
            fallback_title: false,
        }
    }

    /// Create a parser from configuration.
    pub fn from_config(config: &ExtractionConfig) -> Self {
        Self {
            brands: config.brands.clone(),
            try_geocode: config.try_geocode,
            max_address_candidates: config.max_address_candidates,
            terms_max_chars: config.terms_max_chars,
            fallback_title: config.fallback_title,
        }
    }

    /// Add known brand names used for store-name scoring.
    pub fn with_brands<I, S>(mut self, brands: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.brands.extend(brands.into_iter().map(Into::into));
        self
    }

    /// Enable or disable geocode validation of address candidates.
    pub fn with_geocoding(mut self, enabled: bool) -> Self {
        self.try_geocode = enabled;
        self
    }

    /// Set how many address candidates are sent to the geocoder.
    pub fn with_max_address_candidates(mut self, limit: usize) -> Self {
        self.max_address_candidates = limit;
        self
    }

    /// Set the length cap of the terms snippet.
    pub fn with_terms_max_chars(mut self, max_chars: usize) -> Self {
        self.terms_max_chars = max_chars;
        self
    }

    /// Use the headline as title when no discount is found.
    pub fn with_fallback_title(mut self, enabled: bool) -> Self {
        self.fallback_title = enabled;
        self
    }

    /// Whether geocoding applies to this input.
    pub fn geocoding_enabled(&self, input: &CouponInput) -> bool {
        input.try_geocode.unwrap_or(self.try_geocode)
    }

    /// Parse a coupon using heuristics only.
    pub fn parse(&self, input: &CouponInput) -> ExtractionResult {
        let timer = Timer::start();
        let prepared = self.prepare(input);

        let address = rank_address(address_candidates(&prepared.lines));

        self.assemble(prepared, address, Vec::new(), timer)
    }

    /// Parse a coupon, validating address candidates with `geocoder`.
    ///
    /// Falls back to heuristics alone when geocoding is disabled for this
    /// parser or input. Geocoder failures never fail the extraction.
    pub async fn parse_with_geocoder<G: Geocoder>(
        &self,
        input: &CouponInput,
        geocoder: &G,
    ) -> ExtractionResult {
        let timer = Timer::start();
        let prepared = self.prepare(input);
        let candidates = address_candidates(&prepared.lines);

        if !self.geocoding_enabled(input) || candidates.is_empty() {
            let address = rank_address(candidates);
            return self.assemble(prepared, address, Vec::new(), timer);
        }

        debug!(
            "Geocoding up to {} of {} address candidates",
            self.max_address_candidates,
            candidates.len()
        );
        let ranking =
            rank_addresses_geocoded(candidates, geocoder, self.max_address_candidates).await;

        let warnings = ranking
            .failures
            .into_iter()
            .map(|failure| format!("Geocoding failed for {}", failure))
            .collect();

        self.assemble(prepared, ranking.choice, warnings, timer)
    }

    fn prepare(&self, input: &CouponInput) -> Prepared {
        let block_lines = flatten_blocks(&input.blocks);

        let mut text = normalize_text(&input.text);
        if text.is_empty() {
            text = block_lines
                .iter()
                .map(|l| l.text.as_str())
                .collect::<Vec<_>>()
                .join("\n");
        }

        let lines = if block_lines.is_empty() {
            text.split('\n')
                .filter(|l| !l.is_empty())
                .map(|l| OcrLine::new(l, None))
                .collect()
        } else {
            block_lines
        };

        let mut brands: Vec<String> = Vec::new();
        for brand in self.brands.iter().chain(&input.brands) {
            let brand = brand.trim();
            if !brand.is_empty() && !brands.iter().any(|b| b.eq_ignore_ascii_case(brand)) {
                brands.push(brand.to_string());
            }
        }

        info!(
            "Parsing coupon: {} lines, {} chars, {} brands",
            lines.len(),
            text.len(),
            brands.len()
        );

        Prepared {
            lines,
            text,
            brands,
        }
    }

    fn assemble(
        &self,
        prepared: Prepared,
        address: Option<AddressChoice>,
        mut warnings: Vec<String>,
        timer: Timer,
    ) -> ExtractionResult {
        let Prepared {
            lines,
            text,
            brands,
        } = prepared;

        let store = rank_store(store_candidates(&lines, &text, &brands));
        debug!("Store: {:?}", store);

        let (address, geo) = match address {
            Some(choice) => {
                debug!("Address: '{}' (score {:.2})", choice.text, choice.score);
                (Some(choice.text), choice.geo)
            }
            None => (None, None),
        };

        let line_texts: Vec<&str> = lines.iter().map(|l| l.text.as_str()).collect();
        let headline = extract_headline(&line_texts);

        let mut coupon = ParsedCoupon {
            store,
            address,
            phone: extract_phone(&text),
            mode: detect_mode(&text),
            location_note: extract_location_note(&line_texts),
            terms: extract_terms(&text, self.terms_max_chars),
            title: derive_title(&text),
            expires_at: parse_expiry(&text),
            geo,
        };

        if self.fallback_title {
            coupon = coupon.with_fallback_title(headline.as_deref());
        }

        if !text.is_empty() {
            if coupon.store.is_none() {
                warnings.push("Could not determine store name".to_string());
            }
            if coupon.address.is_none() {
                warnings.push("No address found".to_string());
            }
            if coupon.phone.is_none() {
                warnings.push("No phone number found".to_string());
            }
            if coupon.title.is_none() {
                warnings.push("No discount found".to_string());
            }
            if coupon.expires_at.is_none() {
                warnings.push("No expiration date found".to_string());
            }
        }

        let processing_time_ms = timer.elapsed_ms();
        info!(
            "Coupon parsed in {}ms with {} warnings",
            processing_time_ms,
            warnings.len()
        );

        ExtractionResult {
            coupon,
            raw_text: text,
            headline,
            warnings,
            processing_time_ms,
        }
    }
}

impl Default for CouponParser {
    fn default() -> Self {
        Self::new()
    }
}

impl CouponExtractor for CouponParser {
    fn extract(&self, input: &CouponInput) -> ParsedCoupon {
        self.parse(input).coupon
    }

    fn extract_from_text(&self, text: &str) -> ParsedCoupon {
        self.parse(&CouponInput::from_text(text)).coupon
    }
}
