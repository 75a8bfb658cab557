//! Ranks web-search hits by how useful they look for trip planning.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::index::dedupe_by;
use crate::knowledge::{HIGH_VALUE_KEYWORDS, LOCATION_KEYWORDS, PRACTICAL_KEYWORDS, SPECIALIZED_SUBREDDIT};
use crate::web_search::{PostType, SearchHit, SearchResults};

pub const TOP_POSTS: usize = 20;
pub const FILTER_CRITERIA: &str = "Usefulness score based on content quality, recency, and practical value";

const RECENT_YEARS: [&str; 2] = ["2024", "2025"];
const LONG_SNIPPET: usize = 200;

const INSIGHTS: [(&str, &str); 6] = [
    ("santurce", "Santurce location info"),
    ("condado", "Condado area details"),
    ("restaurant", "Restaurant recommendations"),
    ("beach", "Beach information"),
    ("safe", "Safety insights"),
    ("first time", "First-timer advice"),
];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CuratedPost {
    #[serde(flatten)]
    pub hit: SearchHit,
    pub source_query: String,
    pub usefulness_score: u32,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub insights: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurateMeta {
    pub filtered_date: DateTime<Utc>,
    pub total_posts_analyzed: usize,
    pub unique_posts: usize,
    pub top_posts_selected: usize,
    pub filter_criteria: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CuratedReport {
    pub meta: CurateMeta,
    pub top_posts: Vec<CuratedPost>,
}

pub fn usefulness_score(hit: &SearchHit) -> u32 {
    let title = hit.title.to_lowercase();
    let snippet = hit.snippet.to_lowercase();
    let in_either = |k: &str| title.contains(k) || snippet.contains(k);

    let mut score = 0;
    score += 10 * HIGH_VALUE_KEYWORDS.iter().filter(|k| title.contains(**k)).count() as u32;
    score += 5 * LOCATION_KEYWORDS.iter().filter(|k| in_either(k)).count() as u32;
    score += 3 * PRACTICAL_KEYWORDS.iter().filter(|k| in_either(k)).count() as u32;

    if RECENT_YEARS.iter().any(|y| hit.snippet.contains(y)) {
        score += 15;
    }
    if hit.snippet.chars().count() > LONG_SNIPPET {
        score += 5;
    }
    score += match hit.post_type {
        PostType::GuideReview => 10,
        PostType::Discussion => 7,
        _ if title.contains("advice") || title.contains("recommendations") => 8,
        _ => 0,
    };
    if hit.subreddit == SPECIALIZED_SUBREDDIT {
        score += 5;
    }
    score
}

pub fn insights(snippet: &str) -> Vec<String> {
    let snippet = snippet.to_lowercase();
    INSIGHTS
        .iter()
        .filter(|(needle, _)| snippet.contains(needle))
        .map(|(_, label)| label.to_string())
        .collect()
}

/// Score every hit, drop repeated URLs (first wins) and keep the best `top`.
pub fn curate(results: &SearchResults, top: usize) -> CuratedReport {
    let scored: Vec<CuratedPost> = results
        .iter()
        .flat_map(|(key, query)| {
            query.posts.iter().map(move |hit| CuratedPost {
                hit: hit.clone(),
                source_query: key.clone(),
                usefulness_score: usefulness_score(hit),
                insights: insights(&hit.snippet),
            })
        })
        .collect();
    let total = scored.len();

    let mut unique = dedupe_by(scored, |p| p.hit.url.clone());
    let unique_count = unique.len();
    // 安定ソート: 同点は元の順
    unique.sort_by(|a, b| b.usefulness_score.cmp(&a.usefulness_score));
    unique.truncate(top);

    CuratedReport {
        meta: CurateMeta {
            filtered_date: Utc::now(),
            total_posts_analyzed: total,
            unique_posts: unique_count,
            top_posts_selected: unique.len(),
            filter_criteria: FILTER_CRITERIA.to_string(),
        },
        top_posts: unique,
    }
}
