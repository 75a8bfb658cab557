use std::time::Duration;

use crate::error::{Result, ScoutError};

pub const TRIPADVISOR_BASE_URL: &str = "https://www.tripadvisor.com";
pub const GRAPHQL_PATH: &str = "/data/graphql/ids";
/// Pre-registered typeahead query on the TripAdvisor side.
pub const QUERY_ID: &str = "c2e5695e939386e4";

pub const REDDIT_AUTH_URL: &str = "https://www.reddit.com/api/v1/access_token";
pub const REDDIT_API_URL: &str = "https://oauth.reddit.com";
pub const REDDIT_WEB_URL: &str = "https://reddit.com";
pub const DEFAULT_REDDIT_USER_AGENT: &str = "RouteWise:v1.0 (by u/routewise)";

pub const WEB_SEARCH_URL: &str = "https://www.googleapis.com/customsearch/v1";

/// Third-party hosts. Overridable so tests can aim them at a mock server.
#[derive(Debug, Clone)]
pub struct Endpoints {
    pub tripadvisor: String,
    pub reddit_auth: String,
    pub reddit_api: String,
    pub reddit_web: String,
    pub web_search: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            tripadvisor: TRIPADVISOR_BASE_URL.to_string(),
            reddit_auth: REDDIT_AUTH_URL.to_string(),
            reddit_api: REDDIT_API_URL.to_string(),
            reddit_web: REDDIT_WEB_URL.to_string(),
            web_search: WEB_SEARCH_URL.to_string(),
        }
    }
}

impl Endpoints {
    pub fn graphql_url(&self) -> String {
        format!("{}{}", self.tripadvisor.trim_end_matches('/'), GRAPHQL_PATH)
    }

    /// Prefix a site-relative TripAdvisor path with the configured host.
    pub fn tripadvisor_url(&self, path: &str) -> String {
        format!("{}{}", self.tripadvisor.trim_end_matches('/'), path)
    }
}

/// Fixed sleeps between logical units of work.
#[derive(Debug, Clone)]
pub struct Delays {
    /// Between two GraphQL searches of the city scraper.
    pub city_search: Duration,
    /// Between two GraphQL searches of the guide builders.
    pub guide_search: Duration,
    /// Between restaurants and attractions in a full city run.
    pub between_kinds: Duration,
    /// Between two detail pages in a `scrape_by_type` run.
    pub per_item: Duration,
    /// Between two Reddit search requests.
    pub reddit_search: Duration,
}

impl Default for Delays {
    fn default() -> Self {
        Self {
            city_search: Duration::from_millis(2500),
            guide_search: Duration::from_secs(2),
            between_kinds: Duration::from_secs(5),
            per_item: Duration::from_secs(1),
            reddit_search: Duration::from_secs(1),
        }
    }
}

impl Delays {
    pub fn none() -> Self {
        Self {
            city_search: Duration::ZERO,
            guide_search: Duration::ZERO,
            between_kinds: Duration::ZERO,
            per_item: Duration::ZERO,
            reddit_search: Duration::ZERO,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RedditCredentials {
    pub client_id: String,
    pub client_secret: String,
    pub user_agent: String,
}

#[derive(Debug, Clone)]
pub struct WebSearchCredentials {
    pub api_key: String,
    pub engine_id: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub endpoints: Endpoints,
    pub delays: Delays,
    pub graphql_timeout: Duration,
    pub page_timeout: Duration,
    pub max_connections: usize,
    pub reddit: Option<RedditCredentials>,
    pub web_search: Option<WebSearchCredentials>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            endpoints: Endpoints::default(),
            delays: Delays::default(),
            graphql_timeout: Duration::from_secs(30),
            page_timeout: Duration::from_secs(150),
            max_connections: 5,
            reddit: None,
            web_search: None,
        }
    }
}

impl Config {
    /// Load `.env` (if any) and read credentials from the process environment.
    pub fn from_env() -> Self {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary variable lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let reddit = match (get("REDDIT_CLIENT_ID"), get("REDDIT_CLIENT_SECRET")) {
            (Some(client_id), Some(client_secret)) => Some(RedditCredentials {
                client_id,
                client_secret,
                user_agent: get("REDDIT_USER_AGENT")
                    .unwrap_or_else(|| DEFAULT_REDDIT_USER_AGENT.to_string()),
            }),
            _ => None,
        };

        let web_search = match (get("GOOGLE_SEARCH_API_KEY"), get("GOOGLE_SEARCH_ENGINE_ID")) {
            (Some(api_key), Some(engine_id)) => Some(WebSearchCredentials { api_key, engine_id }),
            _ => None,
        };

        Self {
            reddit,
            web_search,
            ..Self::default()
        }
    }

    pub fn reddit_credentials(&self) -> Result<&RedditCredentials> {
        self.reddit.as_ref().ok_or(ScoutError::MissingEnv("REDDIT_CLIENT_ID"))
    }

    pub fn web_search_credentials(&self) -> Result<&WebSearchCredentials> {
        self.web_search
            .as_ref()
            .ok_or(ScoutError::MissingEnv("GOOGLE_SEARCH_API_KEY"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn reddit_credentials_need_id_and_secret() {
        let config = Config::from_lookup(lookup(&[("REDDIT_CLIENT_ID", "abc")]));
        assert!(config.reddit.is_none());
        assert!(matches!(
            config.reddit_credentials(),
            Err(ScoutError::MissingEnv("REDDIT_CLIENT_ID"))
        ));
    }

    #[test]
    fn reddit_user_agent_falls_back_to_default() {
        let config = Config::from_lookup(lookup(&[
            ("REDDIT_CLIENT_ID", "abc"),
            ("REDDIT_CLIENT_SECRET", "shh"),
            ("REDDIT_USER_AGENT", "  "),
        ]));
        let creds = config.reddit_credentials().expect("credentials");
        assert_eq!(creds.user_agent, DEFAULT_REDDIT_USER_AGENT);
    }

    #[test]
    fn web_search_credentials_are_read() {
        let config = Config::from_lookup(lookup(&[
            ("GOOGLE_SEARCH_API_KEY", "key"),
            ("GOOGLE_SEARCH_ENGINE_ID", "cx"),
        ]));
        let creds = config.web_search_credentials().expect("credentials");
        assert_eq!(creds.api_key, "key");
        assert_eq!(creds.engine_id, "cx");
    }

    #[test]
    fn graphql_url_joins_without_double_slash() {
        let endpoints = Endpoints {
            tripadvisor: "http://127.0.0.1:9000/".to_string(),
            ..Endpoints::default()
        };
        assert_eq!(endpoints.graphql_url(), "http://127.0.0.1:9000/data/graphql/ids");
        assert_eq!(
            endpoints.tripadvisor_url("/Hotels-g1"),
            "http://127.0.0.1:9000/Hotels-g1"
        );
    }
}
