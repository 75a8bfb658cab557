use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::config::WebSearchCredentials;
use crate::context::ScoutContext;
use crate::error::Result;
use crate::http_client::check_status;

pub const RESULTS_PER_QUERY: u32 = 10;
pub const RECENT_AFTER: &str = "2024-01-01";

const SITE_PREFIX: &str = "site:reddit.com ";

/// Rough intent of a post, judged from its title.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PostType {
    Question,
    #[serde(rename = "Guide/Review")]
    GuideReview,
    Itinerary,
    Discussion,
}

impl PostType {
    pub fn from_title(title: &str) -> Self {
        let title = title.to_lowercase();
        let has = |words: &[&str]| words.iter().any(|w| title.contains(w));
        if has(&["?", "help", "advice", "recommend"]) {
            PostType::Question
        } else if has(&["guide", "trip report", "review"]) {
            PostType::GuideReview
        } else if has(&["itinerary", "planning"]) {
            PostType::Itinerary
        } else {
            PostType::Discussion
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    pub title: String,
    pub url: String,
    pub snippet: String,
    pub subreddit: String,
    pub post_type: PostType,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryResults {
    pub query: String,
    pub total_results: String,
    pub search_time: f64,
    pub posts: Vec<SearchHit>,
}

/// Query key → results, in the order the queries were issued.
pub type SearchResults = IndexMap<String, QueryResults>;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ApiResponse {
    items: Vec<ApiItem>,
    #[serde(rename = "searchInformation")]
    search_information: SearchInformation,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ApiItem {
    title: String,
    link: String,
    snippet: String,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct SearchInformation {
    #[serde(rename = "totalResults")]
    total_results: String,
    #[serde(rename = "searchTime")]
    search_time: f64,
}

impl Default for SearchInformation {
    fn default() -> Self {
        Self {
            total_results: "0".to_string(),
            search_time: 0.0,
        }
    }
}

pub fn default_queries(location: &str) -> Vec<String> {
    let location = location.to_lowercase();
    ["travel", "must visit", "things to do"]
        .iter()
        .map(|topic| format!("{}{} {} after:{}", SITE_PREFIX, location, topic, RECENT_AFTER))
        .collect()
}

/// `site:reddit.com puerto rico travel` → `puerto_rico_travel`
pub fn query_key(query: &str) -> String {
    query.replace(SITE_PREFIX, "").replace(' ', "_")
}

/// Name after `/r/`, else `unknown`.
pub fn extract_subreddit(url: &str) -> String {
    url.split_once("/r/")
        .and_then(|(_, rest)| rest.split('/').next())
        .filter(|s| !s.is_empty())
        .unwrap_or("unknown")
        .to_string()
}

fn to_hit(item: ApiItem) -> SearchHit {
    SearchHit {
        title: item.title.replace(" - Reddit", ""),
        subreddit: extract_subreddit(&item.link),
        post_type: PostType::from_title(&item.title),
        url: item.link,
        snippet: item.snippet,
    }
}

pub async fn search(ctx: &ScoutContext, creds: &WebSearchCredentials, query: &str) -> Result<QueryResults> {
    let num = RESULTS_PER_QUERY.to_string();
    let resp = ctx
        .http
        .inner()
        .get(&ctx.config.endpoints.web_search)
        .query(&[
            ("key", creds.api_key.as_str()),
            ("cx", creds.engine_id.as_str()),
            ("q", query),
            ("num", num.as_str()),
        ])
        .send()
        .await?;
    let body: ApiResponse = check_status(resp)?.json().await?;
    Ok(QueryResults {
        query: query.to_string(),
        total_results: body.search_information.total_results,
        search_time: body.search_information.search_time,
        posts: body.items.into_iter().map(to_hit).collect(),
    })
}

/// Run every query; failed queries are logged and left out.
pub async fn search_all(ctx: &ScoutContext, creds: &WebSearchCredentials, queries: &[String]) -> SearchResults {
    let mut results = SearchResults::new();
    for query in queries {
        info!("Searching: {}", query);
        match search(ctx, creds, query).await {
            Ok(found) => {
                info!("Found {} posts in {}s", found.posts.len(), found.search_time);
                results.insert(query_key(query), found);
            }
            Err(e) => warn!("Search failed for {}: {}", query, e),
        }
    }
    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::testing::context_for;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn creds() -> WebSearchCredentials {
        WebSearchCredentials {
            api_key: "key".to_string(),
            engine_id: "cx".to_string(),
        }
    }

    #[test]
    fn post_types() {
        assert_eq!(PostType::from_title("First time in PR?"), PostType::Question);
        assert_eq!(PostType::from_title("Trip report: 10 days"), PostType::GuideReview);
        assert_eq!(PostType::from_title("My itinerary"), PostType::Itinerary);
        assert_eq!(PostType::from_title("Photos from Culebra"), PostType::Discussion);
        assert_eq!(serde_json::to_value(PostType::GuideReview).unwrap(), "Guide/Review");
    }

    #[test]
    fn subreddit_and_keys() {
        assert_eq!(
            extract_subreddit("https://www.reddit.com/r/PuertoRicoTravel/comments/abc/x/"),
            "PuertoRicoTravel"
        );
        assert_eq!(extract_subreddit("https://example.com/post"), "unknown");
        let queries = default_queries("Puerto Rico");
        assert_eq!(queries[0], "site:reddit.com puerto rico travel after:2024-01-01");
        assert_eq!(query_key(&queries[1]), "puerto_rico_must_visit_after:2024-01-01");
    }

    #[tokio::test]
    async fn search_maps_items() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/customsearch/v1"))
            .and(query_param("key", "key"))
            .and(query_param("cx", "cx"))
            .and(query_param("num", "10"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "searchInformation": {"totalResults": "1234", "searchTime": 0.31},
                "items": [{
                    "title": "Honest review of Old San Juan - Reddit",
                    "link": "https://www.reddit.com/r/PuertoRicoTravel/comments/abc123/honest_review/",
                    "snippet": "We stayed in Condado in 2024..."
                }]
            })))
            .mount(&server)
            .await;

        let ctx = context_for(&server.uri());
        let results = search_all(&ctx, &creds(), &default_queries("Puerto Rico")).await;
        assert_eq!(results.len(), 3);
        let keys: Vec<&str> = results.keys().map(String::as_str).collect();
        assert_eq!(keys[0], "puerto_rico_travel_after:2024-01-01");
        assert_eq!(keys[2], "puerto_rico_things_to_do_after:2024-01-01");
        let travel = &results["puerto_rico_travel_after:2024-01-01"];
        assert_eq!(travel.total_results, "1234");
        assert_eq!(travel.posts[0].title, "Honest review of Old San Juan");
        assert_eq!(travel.posts[0].subreddit, "PuertoRicoTravel");
        assert_eq!(travel.posts[0].post_type, PostType::GuideReview);
    }

    #[tokio::test]
    async fn failed_queries_are_skipped() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(403))
            .mount(&server)
            .await;
        let ctx = context_for(&server.uri());
        let results = search_all(&ctx, &creds(), &default_queries("Puerto Rico")).await;
        assert!(results.is_empty());
    }
}
