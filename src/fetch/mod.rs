//! The only suspension point of the pipeline: URL in, document text out.

use reqwest::Client;
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::{Result, ScrapeError};

/// Fetches upstream documents over one shared, pooled HTTP client.
#[derive(Clone)]
pub struct Fetcher {
    client: Client,
    proxy_base: Option<String>,
}

impl Fetcher {
    /// Creates a Fetcher with a pre-configured HTTP client.
    pub fn new(config: &Config) -> Result<Self> {
        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(config.http_timeout)
            .build()?;

        Ok(Self {
            client,
            proxy_base: config.gsmarena_proxy_url.clone(),
        })
    }

    /// GETs `url` and returns the body. A non-success status is a
    /// [`ScrapeError::Fetch`] carrying that status.
    pub async fn fetch(&self, url: &str) -> Result<String> {
        debug!(url = %url, "Fetching document");
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            warn!(url = %url, status = %status, "Upstream returned an error status");
            return Err(ScrapeError::Fetch {
                url: url.to_string(),
                status,
            });
        }

        Ok(response.text().await?)
    }

    /// Same as [`Fetcher::fetch`], routed through the configured web proxy
    /// when there is one.
    pub async fn fetch_proxied(&self, url: &str) -> Result<String> {
        match &self.proxy_base {
            Some(base) => self.fetch(&format!("{base}{url}")).await,
            None => self.fetch(url).await,
        }
    }
}
