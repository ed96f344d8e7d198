//! Brand-name guesses from website domains printed on coupons.

use super::patterns::BRAND_URL;

/// Words that commonly close a run-together brand domain ("meltingpot").
const TAIL_WORDS: &[&str] = &[
    "bar", "bell", "bistro", "bowl", "box", "bread", "burger", "burgers", "cafe", "castle",
    "chicken", "coffee", "deli", "depot", "diner", "donuts", "express", "garden", "grill",
    "house", "hut", "jack", "king", "kitchen", "market", "mart", "noodles", "palace", "pizza",
    "pot", "queen", "shack", "shop", "steak", "store", "subs", "sushi", "taco", "tacos",
    "wings", "works",
];

/// Words that commonly open a run-together brand domain ("bigboy").
const HEAD_WORDS: &[&str] = &[
    "big", "blue", "burger", "golden", "green", "happy", "little", "pizza", "red", "taco", "the",
];

/// Domains printed on coupons that never name the merchant.
const IGNORED_LABELS: &[&str] = &[
    "facebook", "instagram", "twitter", "tiktok", "youtube", "google", "apple", "yelp",
    "doordash", "ubereats", "grubhub",
];

/// Guess a brand name from the first merchant website found in text,
/// e.g. "www.meltingpot.com" becomes "Melting Pot".
pub fn brand_from_url(text: &str) -> Option<String> {
    BRAND_URL
        .captures_iter(text)
        .filter_map(|caps| caps.get(1).map(|m| m.as_str().to_lowercase()))
        .filter(|label| label != "www" && !IGNORED_LABELS.contains(&label.as_str()))
        .map(|label| split_brand_label(&label))
        .find(|brand| !brand.is_empty())
}

/// Turn a domain label into title-cased words: hyphens become spaces and a
/// run-together lowercase word is split once into two pseudo-words.
pub fn split_brand_label(label: &str) -> String {
    label
        .split('-')
        .filter(|part| !part.is_empty())
        .flat_map(|part| split_run(&part.to_lowercase()))
        .map(|word| title_case(&word))
        .collect::<Vec<_>>()
        .join(" ")
}

fn split_run(run: &str) -> Vec<String> {
    if run.len() < 6 || !run.chars().all(|c| c.is_ascii_lowercase()) {
        return vec![run.to_string()];
    }

    // Split points leave at least three letters on each side
    let points = 3..=run.len() - 3;

    let split_at = points
        .clone()
        .find(|&i| TAIL_WORDS.contains(&&run[i..]))
        .or_else(|| points.clone().rev().find(|&i| HEAD_WORDS.contains(&&run[..i])))
        .or_else(|| {
            run.find("ing")
                .map(|p| p + 3)
                .filter(|&i| points.contains(&i))
        });

    match split_at {
        Some(i) => vec![run[..i].to_string(), run[i..].to_string()],
        None => vec![run.to_string()],
    }
}

fn title_case(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}
