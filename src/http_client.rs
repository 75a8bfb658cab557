use std::time::Duration;

use rand::Rng;
use rand::seq::SliceRandom;
use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, HeaderMap, HeaderValue};
use reqwest::{Client, Response};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::{Result, ScoutError};

/// Desktop Chrome on Windows, used for plain page fetches.
pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/96.0.4664.110 Safari/537.36";

/// Rotated per GraphQL request.
pub const USER_AGENTS: [&str; 3] = [
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.1 Safari/605.1.15",
];

pub const REQUEST_ID_LEN: usize = 180;

const REQUEST_ID_CHARSET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

/// Random `[a-z0-9]` token for the `X-Requested-By` header.
pub fn generate_request_id(len: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..len)
        .map(|_| REQUEST_ID_CHARSET[rng.gen_range(0..REQUEST_ID_CHARSET.len())] as char)
        .collect()
}

/// Headers the typeahead endpoint expects from its own frontend.
pub fn graphql_headers(origin: &str) -> Vec<(&'static str, String)> {
    let user_agent = USER_AGENTS
        .choose(&mut rand::thread_rng())
        .copied()
        .unwrap_or(BROWSER_USER_AGENT);
    let origin = origin.trim_end_matches('/');
    vec![
        ("User-Agent", user_agent.to_string()),
        ("Accept", "*/*".to_string()),
        ("Accept-Language", "en-US,en;q=0.9".to_string()),
        ("Content-Type", "application/json".to_string()),
        ("X-Requested-By", generate_request_id(REQUEST_ID_LEN)),
        ("Referer", format!("{}/", origin)),
        ("Origin", origin.to_string()),
        ("Sec-Fetch-Dest", "empty".to_string()),
        ("Sec-Fetch-Mode", "cors".to_string()),
        ("Sec-Fetch-Site", "same-origin".to_string()),
    ]
}

/// Shared reqwest client with the browser-like defaults every command uses.
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    graphql_timeout: Duration,
}

impl HttpClient {
    pub fn new(page_timeout: Duration, graphql_timeout: Duration, max_connections: usize) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static(
                "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,image/apng,*/*;q=0.8",
            ),
        );
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));

        let client = Client::builder()
            .default_headers(headers)
            .user_agent(BROWSER_USER_AGENT)
            .timeout(page_timeout)
            .pool_max_idle_per_host(max_connections)
            .build()?;
        Ok(Self { client, graphql_timeout })
    }

    pub fn inner(&self) -> &Client {
        &self.client
    }

    /// GET a page and return its body. Non-2xx statuses become [`ScoutError::Status`].
    pub async fn get_text(&self, url: &str) -> Result<String> {
        debug!("GET {}", url);
        let resp = self.client.get(url).send().await?;
        let resp = check_status(resp)?;
        Ok(resp.text().await?)
    }

    /// POST a GraphQL payload with freshly generated headers.
    pub async fn post_graphql<B, R>(&self, url: &str, origin: &str, body: &B) -> Result<R>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        debug!("POST {}", url);
        let mut req = self.client.post(url).timeout(self.graphql_timeout).json(body);
        for (name, value) in graphql_headers(origin) {
            req = req.header(name, value);
        }
        let resp = check_status(req.send().await?)?;
        Ok(resp.json::<R>().await?)
    }
}

pub fn check_status(resp: Response) -> Result<Response> {
    let status = resp.status();
    if status.is_success() {
        Ok(resp)
    } else {
        Err(ScoutError::Status {
            url: resp.url().to_string(),
            status: status.as_u16(),
        })
    }
}
