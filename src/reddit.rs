//! Reddit travel threads through the OAuth API: subreddit search, comment
//! mining for place names, and full-content extraction for curated posts.

use std::collections::{BTreeSet, HashMap};

use chrono::{DateTime, Local, Utc};
use reqwest::header::USER_AGENT;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::config::RedditCredentials;
use crate::context::ScoutContext;
use crate::curate::{CuratedPost, CuratedReport};
use crate::error::{Result, ScoutError};
use crate::http_client::check_status;
use crate::index::{count_mentions, dedupe_by};
use crate::tokenize::{contains_recommendation, extract_place_names, mentions_location, truncate_chars};

pub const BASE_SUBREDDITS: [&str; 7] = [
    "travel", "solotravel", "backpacking", "digitalnomad",
    "earthporn", "traveltips", "TravelNoPics",
];

const STATE_ABBREVIATIONS: [(&str, &str); 9] = [
    ("texas", "TX"),
    ("california", "CA"),
    ("florida", "FL"),
    ("new york", "NY"),
    ("illinois", "IL"),
    ("pennsylvania", "PA"),
    ("puerto rico", "PR"),
    ("hawaii", "HI"),
    ("alaska", "AK"),
];

pub const DEFAULT_POST_LIMIT: usize = 25;
pub const COMMENTS_SCANNED: usize = 10;
pub const MIN_COMMENT_SCORE: i64 = 2;
pub const COMMENT_TEXT_CHARS: usize = 300;
pub const SELFTEXT_CHARS: usize = 500;
pub const TOP_PLACES: usize = 10;
pub const TOP_COMMENTS: usize = 5;

const DELETED: &str = "[deleted]";

pub fn state_abbreviation(state: &str) -> Option<&'static str> {
    let state = state.to_lowercase();
    STATE_ABBREVIATIONS
        .iter()
        .find(|(name, _)| *name == state)
        .map(|(_, abbr)| *abbr)
}

/// Travel subreddits plus names guessed from the location ("San Juan, Puerto Rico"
/// → `sanjuan`, `sanjuanpuertorico`, `sanjuantravel`, `visitsanjuan`, `pr`, `sanjuanpr`).
pub fn find_relevant_subreddits(location: &str) -> Vec<String> {
    let location_clean = location.to_lowercase().replace([' ', ','], "");
    let city = location
        .split(',')
        .next()
        .unwrap_or("")
        .trim()
        .to_lowercase()
        .replace(' ', "");

    let mut subreddits: Vec<String> = BASE_SUBREDDITS.iter().map(|s| s.to_string()).collect();
    subreddits.push(city.clone());
    subreddits.push(location_clean);
    subreddits.push(format!("{}travel", city));
    subreddits.push(format!("visit{}", city));

    let parts: Vec<&str> = location.split(',').map(str::trim).collect();
    if let [_, state] = parts.as_slice() {
        if let Some(abbr) = state_abbreviation(state) {
            let abbr = abbr.to_lowercase();
            subreddits.push(abbr.clone());
            subreddits.push(format!("{}{}", city, abbr));
        }
    }

    // 空の名前と重複は検索しない
    dedupe_by(subreddits.into_iter().filter(|s| !s.is_empty()), |s| s.clone())
}

pub fn search_terms(location: &str) -> Vec<String> {
    let city = location.split(',').next().unwrap_or(location).trim();
    vec![
        format!("\"{}\"", location),
        format!("\"{}\"", city),
        format!("{} recommendations", city),
        format!("{} things to do", city),
        format!("{} travel guide", city),
        format!("visiting {}", city),
        format!("{} itinerary", city),
        format!("best of {}", city),
        format!("{} food", city),
        format!("{} attractions", city),
    ]
}

/// Post id from a permalink: the segment after `comments`.
pub fn post_id_from_url(url: &str) -> Option<String> {
    let mut parts = url.split('/');
    parts.find(|p| *p == "comments")?;
    parts.next().filter(|id| !id.is_empty()).map(str::to_string)
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// `t3` payload.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Submission {
    pub id: String,
    pub title: String,
    pub author: Option<String>,
    pub subreddit: String,
    pub score: i64,
    pub upvote_ratio: f64,
    pub num_comments: u64,
    pub created_utc: f64,
    pub selftext: String,
    pub url: String,
    pub permalink: String,
    pub is_self: bool,
}

/// `t1` payload with its reply tree.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Comment {
    pub id: String,
    pub author: Option<String>,
    pub body: String,
    pub score: i64,
    pub permalink: String,
    pub created_utc: f64,
    #[serde(skip)]
    pub replies: Vec<Comment>,
}

fn author_or_deleted(author: &Option<String>) -> String {
    author.clone().unwrap_or_else(|| DELETED.to_string())
}

fn listing_children(listing: &Value) -> &[Value] {
    listing["data"]["children"]
        .as_array()
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

fn things_of<T: DeserializeOwned>(listing: &Value, kind: &str) -> Vec<T> {
    listing_children(listing)
        .iter()
        .filter(|child| child["kind"] == kind)
        .filter_map(|child| serde_json::from_value(child["data"].clone()).ok())
        .collect()
}

/// Comment tree of a listing. `more` stubs are dropped.
fn parse_comments(listing: &Value) -> Vec<Comment> {
    listing_children(listing)
        .iter()
        .filter(|child| child["kind"] == "t1")
        .filter_map(|child| {
            let data = &child["data"];
            let mut comment: Comment = serde_json::from_value(data.clone()).ok()?;
            comment.replies = parse_comments(&data["replies"]);
            Some(comment)
        })
        .collect()
}

/// Breadth-first flattening: all top-level comments, then their replies.
pub fn flatten_comments(top_level: &[Comment]) -> Vec<&Comment> {
    let mut flat: Vec<&Comment> = top_level.iter().collect();
    let mut i = 0;
    while i < flat.len() {
        let current: &Comment = flat[i];
        flat.extend(current.replies.iter());
        i += 1;
    }
    flat
}

/// Application-only session: one bearer token for the whole run.
pub struct RedditClient<'a> {
    ctx: &'a ScoutContext,
    token: String,
    user_agent: String,
}

impl<'a> RedditClient<'a> {
    pub async fn connect(ctx: &'a ScoutContext, creds: &RedditCredentials) -> Result<Self> {
        let resp = ctx
            .http
            .inner()
            .post(&ctx.config.endpoints.reddit_auth)
            .basic_auth(&creds.client_id, Some(&creds.client_secret))
            .header(USER_AGENT, &creds.user_agent)
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await?;
        let token: TokenResponse = check_status(resp)?.json().await?;
        info!("Connected to Reddit API (read-only)");
        Ok(Self {
            ctx,
            token: token.access_token,
            user_agent: creds.user_agent.clone(),
        })
    }

    fn api_url(&self, path: &str) -> String {
        format!("{}{}", self.ctx.config.endpoints.reddit_api.trim_end_matches('/'), path)
    }

    /// Public link for a permalink.
    pub fn web_url(&self, permalink: &str) -> String {
        format!("{}{}", self.ctx.config.endpoints.reddit_web.trim_end_matches('/'), permalink)
    }

    async fn get_json(&self, path: &str, query: &[(&str, &str)]) -> Result<Value> {
        let url = self.api_url(path);
        debug!("GET {}", url);
        let resp = self
            .ctx
            .http
            .inner()
            .get(&url)
            .bearer_auth(&self.token)
            .header(USER_AGENT, &self.user_agent)
            .query(query)
            .query(&[("raw_json", "1")])
            .send()
            .await?;
        Ok(check_status(resp)?.json().await?)
    }

    pub async fn search(&self, subreddit: &str, term: &str, limit: usize) -> Result<Vec<Submission>> {
        let limit = limit.to_string();
        let listing = self
            .get_json(
                &format!("/r/{}/search", subreddit),
                &[
                    ("q", term),
                    ("restrict_sr", "1"),
                    ("sort", "relevance"),
                    ("t", "year"),
                    ("limit", limit.as_str()),
                ],
            )
            .await?;
        Ok(things_of(&listing, "t3"))
    }

    /// Submission and its top-level comments (with reply trees).
    pub async fn submission(&self, id: &str) -> Result<(Submission, Vec<Comment>)> {
        let body = self
            .get_json(&format!("/comments/{}", id), &[("sort", "top")])
            .await?;
        let parts = body
            .as_array()
            .ok_or_else(|| ScoutError::Unexpected(format!("comments payload for {} is not an array", id)))?;
        let submission = parts
            .first()
            .and_then(|listing| things_of::<Submission>(listing, "t3").into_iter().next())
            .ok_or_else(|| ScoutError::Unexpected(format!("no submission for {}", id)))?;
        let comments = parts.get(1).map(parse_comments).unwrap_or_default();
        Ok((submission, comments))
    }

    pub async fn comments(&self, id: &str) -> Result<Vec<Comment>> {
        Ok(self.submission(id).await?.1)
    }

    /// Many submissions in one `/api/info` call.
    pub async fn info(&self, ids: &[String]) -> Result<Vec<Submission>> {
        let fullnames = ids
            .iter()
            .map(|id| format!("t3_{}", id))
            .collect::<Vec<_>>()
            .join(",");
        let listing = self.get_json("/api/info", &[("id", fullnames.as_str())]).await?;
        Ok(things_of(&listing, "t3"))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub comment_id: String,
    pub author: String,
    pub score: i64,
    pub text: String,
    pub places: Vec<String>,
    pub url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedditPost {
    pub id: String,
    pub title: String,
    pub author: String,
    pub score: i64,
    pub upvote_ratio: f64,
    pub num_comments: u64,
    pub created_utc: f64,
    pub url: String,
    pub selftext: Option<String>,
    pub subreddit: String,
    pub location: String,
    pub recommendations: Vec<Recommendation>,
    pub scraped_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RedditSummary {
    pub total_posts: usize,
    pub total_recommendations: usize,
    pub subreddits_found: Vec<String>,
    pub top_mentioned_places: Vec<(String, usize)>,
    pub avg_post_score: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct RedditReport {
    pub location: String,
    pub total_posts: usize,
    pub scraped_at: DateTime<Utc>,
    pub posts: Vec<RedditPost>,
    pub summary: RedditSummary,
}

impl RedditReport {
    pub fn new(location: &str, posts: Vec<RedditPost>) -> Self {
        Self {
            location: location.to_string(),
            total_posts: posts.len(),
            scraped_at: Utc::now(),
            summary: summarize(&posts),
            posts,
        }
    }
}

/// Comments among the first ten that recommend something by name.
pub fn recommendations_from(comments: &[&Comment], web_url: impl Fn(&str) -> String) -> Vec<Recommendation> {
    comments
        .iter()
        .take(COMMENTS_SCANNED)
        .filter(|c| c.score >= MIN_COMMENT_SCORE && contains_recommendation(&c.body))
        .filter_map(|c| {
            let places = extract_place_names(&c.body);
            (!places.is_empty()).then(|| Recommendation {
                comment_id: c.id.clone(),
                author: author_or_deleted(&c.author),
                score: c.score,
                text: truncate_chars(&c.body, COMMENT_TEXT_CHARS),
                places,
                url: web_url(&c.permalink),
            })
        })
        .collect()
}

pub fn summarize(posts: &[RedditPost]) -> RedditSummary {
    let subreddits: BTreeSet<String> = posts.iter().map(|p| p.subreddit.clone()).collect();
    let total_recommendations = posts.iter().map(|p| p.recommendations.len()).sum();
    let places = posts
        .iter()
        .flat_map(|p| &p.recommendations)
        .flat_map(|r| &r.places)
        .map(String::as_str);
    let avg_post_score = if posts.is_empty() {
        0.0
    } else {
        posts.iter().map(|p| p.score as f64).sum::<f64>() / posts.len() as f64
    };

    RedditSummary {
        total_posts: posts.len(),
        total_recommendations,
        subreddits_found: subreddits.into_iter().collect(),
        top_mentioned_places: count_mentions(places, TOP_PLACES),
        avg_post_score,
    }
}

async fn post_with_recommendations(client: &RedditClient<'_>, post: Submission, location: &str) -> Result<RedditPost> {
    let comments = client.comments(&post.id).await?;
    let flat = flatten_comments(&comments);
    let recommendations = recommendations_from(&flat, |permalink| client.web_url(permalink));
    Ok(RedditPost {
        url: client.web_url(&post.permalink),
        author: author_or_deleted(&post.author),
        selftext: (!post.selftext.is_empty()).then(|| truncate_chars(&post.selftext, SELFTEXT_CHARS)),
        id: post.id,
        title: post.title,
        score: post.score,
        upvote_ratio: post.upvote_ratio,
        num_comments: post.num_comments,
        created_utc: post.created_utc,
        subreddit: post.subreddit,
        location: location.to_string(),
        recommendations,
        scraped_at: Utc::now(),
    })
}

/// Search every subreddit with every term and keep the relevant posts.
/// Unique by id, highest score first, at most `limit`.
pub async fn search_travel_posts(
    client: &RedditClient<'_>,
    location: &str,
    subreddits: &[String],
    limit: usize,
) -> Vec<RedditPost> {
    let terms = search_terms(location);
    let per_term = (limit / terms.len()).max(1);
    info!("Searching for '{}' recommendations in {} subreddits", location, subreddits.len());

    let mut posts = Vec::new();
    for subreddit in subreddits {
        for term in &terms {
            match client.search(subreddit, term, per_term).await {
                Ok(found) => {
                    for post in found {
                        if !mentions_location(&post.title, &post.selftext, location) {
                            continue;
                        }
                        let title = truncate_chars(&post.title, 50);
                        match post_with_recommendations(client, post, location).await {
                            Ok(post) => {
                                info!("Found: '{}' ({} upvotes)", title, post.score);
                                posts.push(post);
                            }
                            Err(e) => warn!("Error extracting post data: {}", e),
                        }
                    }
                }
                Err(e) => warn!("Search error in r/{}: {}", subreddit, e),
            }
            client.ctx.pause(client.ctx.config.delays.reddit_search).await;
        }
    }

    let mut unique = dedupe_by(posts, |p| p.id.clone());
    unique.sort_by(|a, b| b.score.cmp(&a.score));
    unique.truncate(limit);
    unique
}

#[derive(Debug, Clone, Serialize)]
pub struct RedditContent {
    pub id: String,
    pub title: String,
    pub author: String,
    pub subreddit: String,
    pub created_utc: f64,
    pub score: i64,
    pub upvote_ratio: f64,
    pub num_comments: u64,
    pub selftext: String,
    pub url: String,
    pub permalink: String,
    pub is_self: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct TopComment {
    pub author: String,
    pub body: String,
    pub score: i64,
    pub created_utc: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct FullPost {
    pub original_data: CuratedPost,
    pub reddit_content: RedditContent,
    pub top_comments: Vec<TopComment>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExtractMeta {
    pub extracted_date: String,
    pub total_posts_extracted: usize,
    pub reddit_api_used: bool,
    pub batch_optimized: bool,
    pub extraction_method: &'static str,
    pub content_includes: [&'static str; 4],
}

#[derive(Debug, Clone, Serialize)]
pub struct ExtractReport {
    pub meta: ExtractMeta,
    pub posts_with_full_content: Vec<FullPost>,
}

pub fn top_comments(comments: &[Comment]) -> Vec<TopComment> {
    comments
        .iter()
        .take(TOP_COMMENTS)
        .filter(|c| c.body != DELETED)
        .map(|c| TopComment {
            author: author_or_deleted(&c.author),
            body: c.body.clone(),
            score: c.score,
            created_utc: c.created_utc,
        })
        .collect()
}

fn full_post(client: &RedditClient<'_>, original: CuratedPost, sub: Submission, comments: &[Comment]) -> FullPost {
    FullPost {
        original_data: original,
        top_comments: top_comments(comments),
        reddit_content: RedditContent {
            author: author_or_deleted(&sub.author),
            permalink: client.web_url(&sub.permalink),
            id: sub.id,
            title: sub.title,
            subreddit: sub.subreddit,
            created_utc: sub.created_utc,
            score: sub.score,
            upvote_ratio: sub.upvote_ratio,
            num_comments: sub.num_comments,
            selftext: sub.selftext,
            url: sub.url,
            is_self: sub.is_self,
        },
    }
}

/// Full text and top comments for every curated post. One `/api/info` call for
/// the submissions, falling back to one request per post when it fails.
pub async fn extract_full_posts(client: &RedditClient<'_>, curated: &CuratedReport) -> ExtractReport {
    let mut ids = Vec::new();
    let mut originals: HashMap<String, CuratedPost> = HashMap::new();
    for post in &curated.top_posts {
        if let Some(id) = post_id_from_url(&post.hit.url) {
            if originals.insert(id.clone(), post.clone()).is_none() {
                ids.push(id);
            }
        }
    }
    info!("Batch extracting content from {} posts", ids.len());

    let mut fetched: Vec<(Submission, Vec<Comment>)> = Vec::new();
    let batch_optimized = match client.info(&ids).await {
        Ok(submissions) => {
            info!("Batch request successful: {} submissions retrieved", submissions.len());
            for sub in submissions {
                let comments = client.comments(&sub.id).await.unwrap_or_else(|e| {
                    warn!("Failed to get comments for {}: {}", sub.id, e);
                    Vec::new()
                });
                fetched.push((sub, comments));
            }
            true
        }
        Err(e) => {
            warn!("Batch request failed: {}; falling back to individual requests", e);
            for id in &ids {
                match client.submission(id).await {
                    Ok(found) => fetched.push(found),
                    Err(e) => warn!("Failed to get {}: {}", id, e),
                }
            }
            false
        }
    };

    let posts: Vec<FullPost> = fetched
        .into_iter()
        .filter_map(|(sub, comments)| {
            let original = originals.remove(&sub.id)?;
            Some(full_post(client, original, sub, &comments))
        })
        .collect();

    ExtractReport {
        meta: ExtractMeta {
            extracted_date: Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
            total_posts_extracted: posts.len(),
            reddit_api_used: true,
            batch_optimized,
            extraction_method: if batch_optimized { "batch info() call" } else { "individual submission requests" },
            content_includes: ["full_post_text", "top_comments", "scores", "metadata"],
        },
        posts_with_full_content: posts,
    }
}
