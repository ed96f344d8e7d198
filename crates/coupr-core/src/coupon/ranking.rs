//! Candidate ranking, including geocode-validated address selection.

use tracing::{debug, warn};

use super::rules::{has_street_token, has_zip};
use super::scoring::ScoredCandidate;
use crate::geocode::Geocoder;
use crate::models::coupon::GeoPoint;

/// Bonus for a candidate the geocoder resolved.
const GEOCODED_BONUS: f64 = 2.0;
const GEOCODED_ZIP_BONUS: f64 = 0.3;
const GEOCODED_STREET_BONUS: f64 = 0.2;

/// Default number of top address candidates sent to the geocoder.
pub const DEFAULT_MAX_ADDRESS_CANDIDATES: usize = 6;

/// Sort candidates by descending score. Ties keep input order.
pub fn sort_candidates(candidates: &mut [ScoredCandidate]) {
    candidates.sort_by(|a, b| b.score.total_cmp(&a.score));
}

/// Pick the best-scoring store name.
pub fn rank_store(mut candidates: Vec<ScoredCandidate>) -> Option<String> {
    sort_candidates(&mut candidates);
    candidates.into_iter().next().map(|c| c.text)
}

/// The chosen address and, when it was geocoded, its coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct AddressChoice {
    pub text: String,
    pub geo: Option<GeoPoint>,
    pub score: f64,
}

/// Outcome of address ranking.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AddressRanking {
    pub choice: Option<AddressChoice>,
    /// Lookups that failed, as "candidate: error" messages.
    pub failures: Vec<String>,
}

/// Pick the best heuristic address without geocoding.
pub fn rank_address(mut candidates: Vec<ScoredCandidate>) -> Option<AddressChoice> {
    sort_candidates(&mut candidates);
    candidates.into_iter().next().map(|c| AddressChoice {
        text: c.text,
        geo: None,
        score: c.score,
    })
}

/// Combined score of a candidate the geocoder resolved.
pub fn geocoded_score(candidate: &ScoredCandidate) -> f64 {
    let mut score = candidate.score + GEOCODED_BONUS;
    if has_zip(&candidate.text) {
        score += GEOCODED_ZIP_BONUS;
    }
    if has_street_token(&candidate.text) {
        score += GEOCODED_STREET_BONUS;
    }
    score
}

/// Re-rank the top `limit` address candidates by geocoding them in order.
///
/// The highest combined score among resolved candidates wins; if none
/// resolves (or `limit` is zero), the best heuristic candidate is returned
/// without coordinates. Lookup errors are recorded and otherwise treated as "not found".
pub async fn rank_addresses_geocoded<G: Geocoder>(
    mut candidates: Vec<ScoredCandidate>,
    geocoder: &G,
    limit: usize,
) -> AddressRanking {
    sort_candidates(&mut candidates);

    let mut ranking = AddressRanking::default();
    let mut best: Option<AddressChoice> = None;

    for candidate in candidates.iter().take(limit) {
        match geocoder.geocode(&candidate.text).await {
            Ok(results) => {
                let Some(location) = results.first() else {
                    debug!("No geocode results for '{}'", candidate.text);
                    continue;
                };
                let score = geocoded_score(candidate);
                debug!("Geocoded '{}' with combined score {:.2}", candidate.text, score);
                if best.as_ref().is_none_or(|b| score > b.score) {
                    best = Some(AddressChoice {
                        text: candidate.text.clone(),
                        geo: Some(GeoPoint::from(*location)),
                        score,
                    });
                }
            }
            Err(e) => {
                warn!("Geocoding '{}' failed: {}", candidate.text, e);
                ranking.failures.push(format!("{}: {}", candidate.text, e));
            }
        }
    }

    ranking.choice = best.or_else(|| {
        candidates.into_iter().next().map(|c| AddressChoice {
            text: c.text,
            geo: None,
            score: c.score,
        })
    });
    ranking
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::collections::HashMap;

    use super::*;
    use crate::error::GeocodeError;
    use crate::geocode::GeoLocation;

    /// Answers from a fixed table and records every lookup.
    struct TableGeocoder {
        known: HashMap<String, GeoLocation>,
        failing: Vec<String>,
        calls: RefCell<Vec<String>>,
    }

    impl TableGeocoder {
        fn new(known: &[(&str, f64, f64)]) -> Self {
            Self {
                known: known
                    .iter()
                    .map(|(a, lat, lng)| {
                        (a.to_string(), GeoLocation { latitude: *lat, longitude: *lng })
                    })
                    .collect(),
                failing: Vec::new(),
                calls: RefCell::new(Vec::new()),
            }
        }

        fn failing_on(mut self, address: &str) -> Self {
            self.failing.push(address.to_string());
            self
        }
    }

    impl Geocoder for TableGeocoder {
        async fn geocode(&self, address: &str) -> Result<Vec<GeoLocation>, GeocodeError> {
            self.calls.borrow_mut().push(address.to_string());
            if self.failing.iter().any(|a| a == address) {
                return Err(GeocodeError::Lookup("network unreachable".to_string()));
            }
            Ok(self.known.get(address).copied().into_iter().collect())
        }
    }

    fn candidate(text: &str, score: f64) -> ScoredCandidate {
        ScoredCandidate::new(text, None, score)
    }

    #[test]
    fn test_rank_store_picks_highest() {
        let candidates = vec![candidate("20% OFF", 2.8), candidate("SUBWAY", 3.3)];
        assert_eq!(rank_store(candidates), Some("SUBWAY".to_string()));
    }

    #[test]
    fn test_rank_store_tie_keeps_first() {
        let candidates = vec![candidate("FIRST", 3.0), candidate("SECOND", 3.0)];
        assert_eq!(rank_store(candidates), Some("FIRST".to_string()));
    }

    #[test]
    fn test_rank_store_empty() {
        assert_eq!(rank_store(Vec::new()), None);
    }

    #[test]
    fn test_geocoded_score_bonuses() {
        let both = candidate("2055 28th St SE, Grand Rapids, MI 49512", 5.0);
        assert!((geocoded_score(&both) - 7.5).abs() < 1e-9);

        let street_only = candidate("2055 28th St SE", 3.7);
        assert!((geocoded_score(&street_only) - 5.9).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_geocoded_candidate_beats_higher_heuristic() {
        let geocoder = TableGeocoder::new(&[("Grand Rapids, MI 49512", 42.91, -85.58)]);
        let candidates = vec![
            candidate("2055 28th St SE", 3.7),
            candidate("Grand Rapids, MI 49512", 2.5),
        ];

        let ranking = rank_addresses_geocoded(candidates, &geocoder, 6).await;
        let choice = ranking.choice.unwrap();

        assert_eq!(choice.text, "Grand Rapids, MI 49512");
        assert_eq!(choice.geo, Some(GeoPoint { lat: 42.91, lng: -85.58 }));
        assert!(ranking.failures.is_empty());
    }

    #[tokio::test]
    async fn test_no_geocode_hit_falls_back_to_heuristic() {
        let geocoder = TableGeocoder::new(&[]);
        let candidates = vec![candidate("Ste 4", 2.4), candidate("2055 28th St SE", 3.7)];

        let ranking = rank_addresses_geocoded(candidates, &geocoder, 6).await;
        let choice = ranking.choice.unwrap();

        assert_eq!(choice.text, "2055 28th St SE");
        assert_eq!(choice.geo, None);
    }

    #[tokio::test]
    async fn test_geocode_failure_is_recorded_and_skipped() {
        let geocoder = TableGeocoder::new(&[("Grand Rapids, MI 49512", 42.91, -85.58)])
            .failing_on("2055 28th St SE");
        let candidates = vec![
            candidate("2055 28th St SE", 3.7),
            candidate("Grand Rapids, MI 49512", 2.5),
        ];

        let ranking = rank_addresses_geocoded(candidates, &geocoder, 6).await;

        assert_eq!(ranking.choice.unwrap().text, "Grand Rapids, MI 49512");
        assert_eq!(ranking.failures.len(), 1);
        assert!(ranking.failures[0].starts_with("2055 28th St SE: "));
    }

    #[tokio::test]
    async fn test_zero_limit_still_returns_heuristic_best() {
        let geocoder = TableGeocoder::new(&[("99 Ionia Ave SW", 42.96, -85.67)]);
        let candidates = vec![candidate("Ste 4", 2.4), candidate("99 Ionia Ave SW", 3.7)];

        let ranking = rank_addresses_geocoded(candidates, &geocoder, 0).await;
        let choice = ranking.choice.unwrap();

        assert_eq!(choice.text, "99 Ionia Ave SW");
        assert_eq!(choice.geo, None);
        assert!(geocoder.calls.borrow().is_empty());
    }

    #[tokio::test]
    async fn test_only_top_candidates_are_geocoded() {
        let geocoder = TableGeocoder::new(&[]);
        let candidates = (0..10)
            .map(|i| candidate(&format!("{} Main St", i), 10.0 - i as f64))
            .collect();

        rank_addresses_geocoded(candidates, &geocoder, 3).await;

        assert_eq!(
            *geocoder.calls.borrow(),
            vec!["0 Main St".to_string(), "1 Main St".to_string(), "2 Main St".to_string()]
        );
    }
}
