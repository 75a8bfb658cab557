use std::collections::HashSet;
use std::sync::LazyLock;

use percent_encoding::percent_decode_str;
use regex::Regex;

/// Capitalized phrase that ends with a venue word ("Old Harbor Brewery Bar").
static PLACE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\b[A-Z][a-zA-Z\s&]+(?:Restaurant|Bar|Cafe|Museum|Park|Beach|Market|Street|Avenue|Plaza|Center|House|Building|Tower|Mall|Store)\b",
    )
    .expect("place pattern")
});

static QUOTED_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""([^"]*)""#).expect("quoted pattern"));

pub const RECOMMENDATION_KEYWORDS: [&str; 20] = [
    "recommend", "must visit", "check out", "go to", "try",
    "best", "favorite", "love", "amazing", "great",
    "restaurant", "food", "eat", "bar", "drink",
    "attraction", "museum", "park", "beach", "hiking",
];

pub const MAX_PLACES_PER_TEXT: usize = 5;

/// 文字列を先頭 n 文字に丸める（UTF-8セーフ）
pub fn truncate_chars(s: &str, n: usize) -> String {
    s.chars().take(n).collect()
}

/// Candidate place names from free text: venue-like capitalized phrases plus
/// quoted phrases. Trimmed, longer than 3 chars, first occurrence wins, at most 5.
pub fn extract_place_names(text: &str) -> Vec<String> {
    let venues = PLACE_PATTERN.find_iter(text).map(|m| m.as_str());
    let quoted = QUOTED_PATTERN
        .captures_iter(text)
        .filter_map(|c| c.get(1))
        .map(|m| m.as_str());

    let mut seen = HashSet::new();
    venues
        .chain(quoted)
        .map(str::trim)
        .filter(|p| p.chars().count() > 3)
        .filter(|p| seen.insert(p.to_string()))
        .take(MAX_PLACES_PER_TEXT)
        .map(str::to_string)
        .collect()
}

pub fn contains_recommendation(text: &str) -> bool {
    let lower = text.to_lowercase();
    RECOMMENDATION_KEYWORDS.iter().any(|k| lower.contains(k))
}

/// True when any location word longer than two chars appears in title or body.
pub fn mentions_location(title: &str, body: &str, location: &str) -> bool {
    let title = title.to_lowercase();
    let body = body.to_lowercase();
    location
        .to_lowercase()
        .split_whitespace()
        .filter(|k| k.chars().count() > 2)
        .any(|k| title.contains(k) || body.contains(k))
}

/// Lower-cased, every char outside `[a-zA-Z0-9_-]` replaced by `_`.
pub fn location_slug(location: &str) -> String {
    location
        .to_lowercase()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

pub fn capitalize_words(s: &str) -> String {
    s.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first
                    .to_uppercase()
                    .chain(chars.flat_map(char::to_lowercase))
                    .collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Best-effort display name from a TripAdvisor review URL.
///
/// `/Restaurant_Review-g1-d2-Reviews-Jose_Enrique-San_Juan.html` → `Jose Enrique`.
/// Tour pages (`AttractionProductReview`) carry the name in the fourth dash segment.
pub fn name_from_url(url: &str, kind: &str) -> String {
    let segment = if let Some((_, rest)) = url.split_once("Reviews-") {
        rest.split('-').next()
    } else if url.contains("AttractionProductReview") {
        url.split('-').nth(3)
    } else {
        None
    };

    let name = segment
        .map(|s| percent_decode_str(s).decode_utf8_lossy().replace('_', " "))
        .map(|s| capitalize_words(&s))
        .unwrap_or_default();

    if name.is_empty() {
        format!("Unknown {}", capitalize_words(kind))
    } else {
        name
    }
}
