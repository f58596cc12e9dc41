use std::env;
use std::time::Duration;

use anyhow::{Context, Result};
use dotenvy::dotenv;

const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// Process configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub log_level: String,
    pub http_timeout: Duration,
    pub user_agent: String,
    pub gsmarena_proxy_url: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            log_level: "info".to_string(),
            http_timeout: Duration::from_secs(10),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            gsmarena_proxy_url: None,
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();
        let defaults = Self::default();

        let timeout_secs: u64 = match env::var("HTTP_TIMEOUT_SECS") {
            Ok(raw) => raw
                .parse()
                .context("HTTP_TIMEOUT_SECS must be a whole number of seconds")?,
            Err(_) => defaults.http_timeout.as_secs(),
        };

        Ok(Self {
            host: env::var("HOST").unwrap_or(defaults.host),
            port: match env::var("PORT") {
                Ok(raw) => raw.parse().context("PORT must be a valid number")?,
                Err(_) => defaults.port,
            },
            log_level: env::var("LOG_LEVEL").unwrap_or(defaults.log_level),
            http_timeout: Duration::from_secs(timeout_secs),
            user_agent: env::var("USER_AGENT").unwrap_or(defaults.user_agent),
            gsmarena_proxy_url: env::var("GSMARENA_PROXY_URL")
                .ok()
                .filter(|v| !v.trim().is_empty()),
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Base URL of every upstream site.
///
/// Only tests build this with anything other than [`SourceUrls::default`].
#[derive(Debug, Clone)]
pub struct SourceUrls {
    pub myanimelist: String,
    pub wunderground: String,
    pub timeanddate: String,
    pub libgen: String,
    pub library_lol: String,
    pub libgen_li: String,
    pub gsmarena: String,
    pub hero_wiki: String,
}

impl Default for SourceUrls {
    fn default() -> Self {
        Self {
            myanimelist: "https://myanimelist.net".to_string(),
            wunderground: "https://www.wunderground.com".to_string(),
            timeanddate: "https://www.timeanddate.com".to_string(),
            libgen: "https://libgen.is".to_string(),
            library_lol: "http://library.lol".to_string(),
            libgen_li: "http://libgen.li".to_string(),
            gsmarena: "https://www.gsmarena.com".to_string(),
            hero_wiki: "https://hero.fandom.com".to_string(),
        }
    }
}

impl SourceUrls {
    /// Points every source at the same host.
    pub fn all(base: &str) -> Self {
        let base = base.trim_end_matches('/').to_string();
        Self {
            myanimelist: base.clone(),
            wunderground: base.clone(),
            timeanddate: base.clone(),
            libgen: base.clone(),
            library_lol: base.clone(),
            libgen_li: base.clone(),
            gsmarena: base.clone(),
            hero_wiki: base,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_bind_addr() {
        assert_eq!(Config::default().bind_addr(), "0.0.0.0:8000");
    }

    #[test]
    fn test_all_trims_trailing_slash() {
        let urls = SourceUrls::all("http://127.0.0.1:9000/");
        assert_eq!(urls.myanimelist, "http://127.0.0.1:9000");
        assert_eq!(urls.hero_wiki, "http://127.0.0.1:9000");
    }
}
