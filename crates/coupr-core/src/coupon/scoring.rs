//! Heuristic scoring of OCR lines as store-name and address candidates.
//!
//! Scores are hand-tuned and only meaningful relative to each other.

use std::collections::HashSet;

use super::rules::patterns::{PHONE, STITCH_EXCLUDE};
use super::rules::{brand_from_url, has_street_token, has_zip, is_address_like, is_offer_language};
use crate::ocr::{BBox, OcrLine};

/// Score of a line that must never be chosen.
pub const EXCLUDED: f64 = -999.0;

// Store-name weights
const CAPS_WEIGHT: f64 = 2.0;
const NO_DIGIT_BONUS: f64 = 0.5;
const NO_STREET_BONUS: f64 = 0.8;
const BRAND_MATCH_BONUS: f64 = 2.5;
const BRAND_STRONG_SIMILARITY_BONUS: f64 = 2.0;
const BRAND_WEAK_SIMILARITY_BONUS: f64 = 1.0;
const TOP_BONUS: f64 = 1.2;
const HEIGHT_BONUS: f64 = 1.0;
const CENTER_BONUS: f64 = 0.2;
const LONG_LINE_PENALTY: f64 = 0.5;
const LONG_LINE_CHARS: usize = 40;
const STITCHED_BONUS: f64 = 1.0;
const URL_BRAND_BONUS: f64 = 1.2;

/// Box height (normalized) that earns the full headline-size bonus.
const HEADLINE_HEIGHT: f32 = 0.08;
/// Max distance of the box center from the middle to count as centered.
const CENTER_TOLERANCE: f32 = 0.15;

// Stitched-title limits
const STITCH_WINDOW: usize = 6;
const STITCH_MAX_CHARS: usize = 14;
const STITCH_MAX_LINES: usize = 3;

// Address weights
const STREET_BONUS: f64 = 2.5;
const ZIP_BONUS: f64 = 1.5;
const PHONE_BONUS: f64 = 0.6;
const DIGIT_BONUS: f64 = 0.4;
const POSITION_BONUS: f64 = 0.8;
const POSITION_DECAY: f64 = 0.05;
const LENGTH_PENALTY: f64 = 0.5;
const ADDRESS_MIN_CHARS: usize = 8;
const ADDRESS_MAX_CHARS: usize = 90;

/// A line annotated with its heuristic score.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredCandidate {
    pub text: String,
    pub bbox: Option<BBox>,
    pub score: f64,
}

impl ScoredCandidate {
    pub fn new(text: impl Into<String>, bbox: Option<BBox>, score: f64) -> Self {
        Self {
            text: text.into(),
            bbox,
            score,
        }
    }
}

/// Score a line as the store name.
pub fn score_store_line(line: &str, bbox: Option<&BBox>, brands: &[String]) -> f64 {
    let line = line.trim();
    if line.is_empty() {
        return EXCLUDED;
    }

    let mut score = caps_ratio(line) * CAPS_WEIGHT;

    if !line.chars().any(|c| c.is_ascii_digit()) {
        score += NO_DIGIT_BONUS;
    }
    if !has_street_token(line) {
        score += NO_STREET_BONUS;
    }

    score += brand_bonus(line, brands);

    if let Some(bbox) = bbox {
        score += layout_bonus(bbox);
    }

    if line.chars().count() > LONG_LINE_CHARS {
        score -= LONG_LINE_PENALTY;
    }

    score
}

/// Share of letters that are upper case.
fn caps_ratio(line: &str) -> f64 {
    let (letters, upper) = line
        .chars()
        .filter(|c| c.is_alphabetic())
        .fold((0usize, 0usize), |(letters, upper), c| {
            (letters + 1, upper + usize::from(c.is_uppercase()))
        });

    if letters == 0 {
        0.0
    } else {
        upper as f64 / letters as f64
    }
}

/// Bonus for resembling a known brand.
///
/// A normalized exact or substring match earns a flat bonus; otherwise the
/// best word-overlap similarity across brands is used.
pub fn brand_bonus(line: &str, brands: &[String]) -> f64 {
    if brands.is_empty() {
        return 0.0;
    }

    let line_key = normalize_key(line);
    if line_key.is_empty() {
        return 0.0;
    }

    let substring_match = brands.iter().map(|b| normalize_key(b)).any(|brand_key| {
        !brand_key.is_empty()
            && (line_key == brand_key
                || line_key.contains(&brand_key)
                || (line_key.len() >= 3 && brand_key.contains(&line_key)))
    });
    if substring_match {
        return BRAND_MATCH_BONUS;
    }

    let similarity = brands
        .iter()
        .map(|b| token_similarity(line, b))
        .fold(0.0, f64::max);

    if similarity >= 0.8 {
        BRAND_STRONG_SIMILARITY_BONUS
    } else if similarity >= 0.6 {
        BRAND_WEAK_SIMILARITY_BONUS
    } else {
        0.0
    }
}

/// Lowercase alphanumerics only.
fn normalize_key(s: &str) -> String {
    s.chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Word-set overlap: shared words over the size of the larger set.
pub fn token_similarity(a: &str, b: &str) -> f64 {
    let words_a = word_set(a);
    let words_b = word_set(b);
    let larger = words_a.len().max(words_b.len());
    if larger == 0 {
        return 0.0;
    }
    words_a.intersection(&words_b).count() as f64 / larger as f64
}

fn word_set(s: &str) -> HashSet<String> {
    s.split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(str::to_lowercase)
        .collect()
}

/// Positional bonus: near the top, tall (large font), and centered.
pub fn layout_bonus(bbox: &BBox) -> f64 {
    let top = f64::from((1.0 - bbox.y).clamp(0.0, 1.0)) * TOP_BONUS;
    let height = f64::from((bbox.h / HEADLINE_HEIGHT).clamp(0.0, 1.0)) * HEIGHT_BONUS;
    let (center_x, _) = bbox.center();
    let centered = if (center_x - 0.5).abs() <= CENTER_TOLERANCE {
        CENTER_BONUS
    } else {
        0.0
    };
    top + height + centered
}

/// Join the topmost short lines into a single name candidate, for logos
/// that OCR splits across lines ("THE MELTING" / "POT").
pub fn stitched_title(lines: &[OcrLine]) -> Option<String> {
    let mut ordered: Vec<&OcrLine> = lines.iter().collect();
    if ordered.iter().any(|l| l.bbox.is_some()) {
        ordered.sort_by(|a, b| a.top().total_cmp(&b.top()));
    }

    let parts: Vec<&str> = ordered
        .into_iter()
        .take(STITCH_WINDOW)
        .map(|l| l.text.trim())
        .filter(|t| is_stitchable(t))
        .take(STITCH_MAX_LINES)
        .collect();

    (parts.len() >= 2).then(|| parts.join(" "))
}

fn is_stitchable(line: &str) -> bool {
    !line.is_empty()
        && line.chars().count() <= STITCH_MAX_CHARS
        && !line.chars().any(|c| c.is_ascii_digit())
        && !STITCH_EXCLUDE.is_match(line)
}

/// Build the full store-name candidate pool: every line, plus the stitched
/// title and the brand guessed from a website, each with its bonus.
pub fn store_candidates(lines: &[OcrLine], text: &str, brands: &[String]) -> Vec<ScoredCandidate> {
    let mut candidates: Vec<ScoredCandidate> = lines
        .iter()
        .map(|l| {
            let score = score_store_line(&l.text, l.bbox.as_ref(), brands);
            ScoredCandidate::new(l.text.clone(), l.bbox, score)
        })
        .filter(|c| c.score > EXCLUDED)
        .collect();

    if let Some(stitched) = stitched_title(lines) {
        let score = score_store_line(&stitched, None, brands) + STITCHED_BONUS;
        candidates.push(ScoredCandidate::new(stitched, None, score));
    }

    if let Some(brand) = brand_from_url(text) {
        let score = score_store_line(&brand, None, brands) + URL_BRAND_BONUS;
        candidates.push(ScoredCandidate::new(brand, None, score));
    }

    candidates
}

/// Score a line as the store address; `index` is its position from the top.
pub fn score_address_line(line: &str, index: usize) -> f64 {
    let line = line.trim();
    if line.is_empty() || is_offer_language(line) {
        return EXCLUDED;
    }

    let mut score = 0.0;
    if has_street_token(line) {
        score += STREET_BONUS;
    }
    if has_zip(line) {
        score += ZIP_BONUS;
    }
    if PHONE.is_match(line) {
        score += PHONE_BONUS;
    }
    if line.chars().any(|c| c.is_ascii_digit()) {
        score += DIGIT_BONUS;
    }

    score += (POSITION_BONUS - POSITION_DECAY * index as f64).max(0.0);

    let len = line.chars().count();
    if !(ADDRESS_MIN_CHARS..=ADDRESS_MAX_CHARS).contains(&len) {
        score -= LENGTH_PENALTY;
    }

    score
}

/// Build address candidates from address-like lines.
///
/// A street line directly followed by a ZIP line ("2055 28th St SE" /
/// "Grand Rapids, MI 49512") also yields the joined address.
pub fn address_candidates(lines: &[OcrLine]) -> Vec<ScoredCandidate> {
    let mut candidates = Vec::new();

    for (index, line) in lines.iter().enumerate() {
        let text = line.text.trim();
        let score = score_address_line(text, index);
        if score <= EXCLUDED || !is_address_like(text) {
            continue;
        }
        candidates.push(ScoredCandidate::new(text, line.bbox, score));

        if let Some(next) = lines.get(index + 1) {
            let next_text = next.text.trim();
            if has_street_token(text)
                && !has_zip(text)
                && has_zip(next_text)
                && score_address_line(next_text, index + 1) > EXCLUDED
            {
                let joined = format!("{}, {}", text, next_text);
                let joined_score = score_address_line(&joined, index);
                candidates.push(ScoredCandidate::new(joined, line.bbox, joined_score));
            }
        }
    }

    candidates
}
