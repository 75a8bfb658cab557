use std::sync::Arc;
use std::time::Duration;

use crate::config::Config;
use crate::error::Result;
use crate::http_client::HttpClient;

/// Everything a command needs for one run: config and the shared client.
#[derive(Clone)]
pub struct ScoutContext {
    pub config: Arc<Config>,
    pub http: HttpClient,
}

impl ScoutContext {
    pub fn new(config: Config) -> Result<Self> {
        let http = HttpClient::new(
            config.page_timeout,
            config.graphql_timeout,
            config.max_connections,
        )?;
        Ok(Self {
            config: Arc::new(config),
            http,
        })
    }

    /// 固定ディレイ（0 のときは何もしない）
    pub async fn pause(&self, delay: Duration) {
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }

    pub fn max_connections(&self) -> usize {
        self.config.max_connections.max(1)
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use crate::config::{Delays, Endpoints};

    /// Context with every endpoint aimed at `base` and no sleeps.
    pub fn context_for(base: &str) -> ScoutContext {
        let config = Config {
            endpoints: Endpoints {
                tripadvisor: base.to_string(),
                reddit_auth: format!("{}/api/v1/access_token", base),
                reddit_api: base.to_string(),
                reddit_web: "https://reddit.com".to_string(),
                web_search: format!("{}/customsearch/v1", base),
            },
            delays: Delays::none(),
            page_timeout: Duration::from_secs(5),
            graphql_timeout: Duration::from_secs(5),
            ..Config::default()
        };
        ScoutContext::new(config).expect("client")
    }
}
