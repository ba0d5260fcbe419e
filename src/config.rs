//! Configuration module for the opensearch-twitter service.
//!
//! This module contains configuration structures and environment variable handling
//! for the Twitter/X API credentials and the OpenSearch collection being served.

use log::{debug, error, info, warn};
use std::env;
use std::time::Duration;

use crate::twitter::Account;

/// Default Twitter API base URL.
pub const DEFAULT_API_URL: &str = "https://api.twitter.com";

/// Default timeout applied to every outbound request.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Default collection identifier used in search and description routes.
pub const DEFAULT_COLLECTION_ID: &str = "twitter";

/// Configuration struct for Twitter/X API credentials.
///
/// Holds the application credentials used for the OAuth 2.0 client credentials
/// exchange, plus the API location and request timeout.
#[derive(Debug, Clone)]
pub struct TwitterConfig {
    /// The application consumer key
    pub consumer_key: String,
    /// The application consumer secret
    pub consumer_secret: String,
    /// Base URL of the Twitter API, without trailing slash
    pub api_url: String,
    /// Timeout applied to each outbound HTTP request
    pub timeout: Duration,
}

impl TwitterConfig {
    /// Builds a configuration with the default API URL and timeout.
    pub fn new(consumer_key: impl Into<String>, consumer_secret: impl Into<String>) -> Self {
        Self {
            consumer_key: consumer_key.into(),
            consumer_secret: consumer_secret.into(),
            api_url: DEFAULT_API_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Points the client at another API host (used for tests and proxies).
    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Creates a new `TwitterConfig` instance from environment variables.
    ///
    /// # Required Environment Variables
    ///
    /// - `xapi_consumer_key`: Twitter application consumer key
    /// - `xapi_consumer_secret`: Twitter application consumer secret
    ///
    /// # Optional Environment Variables
    ///
    /// - `TWITTER_API_URL`: API base URL (defaults to `https://api.twitter.com`)
    /// - `HTTP_TIMEOUT_SECS`: Outbound request timeout in seconds (defaults to 30)
    ///
    /// # Returns
    ///
    /// - `Ok(TwitterConfig)`: If both credentials are present and non-empty
    /// - `Err(Box<dyn std::error::Error + Send + Sync>)`: If a credential is missing
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        info!("Loading Twitter configuration from environment variables");

        let consumer_key = load_secret("xapi_consumer_key")?;
        let consumer_secret = load_secret("xapi_consumer_secret")?;

        let api_url = match env::var("TWITTER_API_URL") {
            Ok(url) if !url.trim().is_empty() => {
                info!("Using Twitter API URL from environment: {}", url);
                url
            }
            _ => DEFAULT_API_URL.to_string(),
        };

        let timeout = match env::var("HTTP_TIMEOUT_SECS") {
            Ok(raw) => match raw.parse::<u64>() {
                Ok(secs) if secs > 0 => Duration::from_secs(secs),
                _ => {
                    warn!(
                        "Ignoring invalid HTTP_TIMEOUT_SECS '{}', using {} seconds",
                        raw, DEFAULT_TIMEOUT_SECS
                    );
                    Duration::from_secs(DEFAULT_TIMEOUT_SECS)
                }
            },
            Err(_) => Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        };

        info!("Twitter configuration loaded successfully");
        Ok(Self::new(consumer_key, consumer_secret)
            .with_api_url(api_url)
            .with_timeout(timeout))
    }

    /// Overrides the outbound request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Configuration of the OpenSearch collection exposed by the service.
#[derive(Debug, Clone)]
pub struct CollectionConfig {
    /// Identifier used in the `/{identifier}/search` route
    pub identifier: String,
    /// Public base URL advertised in the OpenSearch description
    pub base_url: String,
    /// Accounts folded into each search query
    pub accounts: Vec<Account>,
}

impl CollectionConfig {
    /// Loads the collection settings from environment variables.
    ///
    /// - `TWITTER_ACCOUNTS`: comma-separated `author[:tag+tag]` entries
    /// - `OPENSEARCH_COLLECTION_ID`: route identifier (defaults to `twitter`)
    /// - `OPENSEARCH_BASE_URL`: advertised base URL (defaults to `http://localhost:<port>`)
    pub fn from_env(port: u16) -> Self {
        let accounts = match env::var("TWITTER_ACCOUNTS") {
            Ok(raw) => parse_accounts(&raw),
            Err(_) => {
                warn!("TWITTER_ACCOUNTS is not set - searches will return empty feeds");
                Vec::new()
            }
        };
        info!("Configured {} Twitter account(s)", accounts.len());

        let identifier = env::var("OPENSEARCH_COLLECTION_ID")
            .ok()
            .filter(|id| !id.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_COLLECTION_ID.to_string());

        let base_url = env::var("OPENSEARCH_BASE_URL")
            .ok()
            .filter(|url| !url.trim().is_empty())
            .unwrap_or_else(|| format!("http://localhost:{}", port));

        Self {
            identifier,
            base_url: base_url.trim_end_matches('/').to_string(),
            accounts,
        }
    }
}

/// Parses an account list of the form `ESA_EO:EGU17+EGU18,terradue`.
///
/// Each comma-separated entry is an author (a leading `@` is dropped),
/// optionally followed by `:` and a `+`-separated tag list (leading `#`
/// dropped). Empty entries are skipped.
pub fn parse_accounts(raw: &str) -> Vec<Account> {
    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .filter_map(|entry| {
            let (author, tags) = match entry.split_once(':') {
                Some((author, tags)) => (author.trim(), tags),
                None => (entry, ""),
            };
            let author = author.trim_start_matches('@');
            if author.is_empty() {
                warn!("Skipping account entry without author: '{}'", entry);
                return None;
            }
            let tags = tags
                .split('+')
                .map(|tag| tag.trim().trim_start_matches('#'))
                .filter(|tag| !tag.is_empty())
                .map(str::to_string)
                .collect();
            Some(Account::new(author).with_tags(tags))
        })
        .collect()
}

/// Gets the server port from environment variables or returns the default.
///
/// Reads `PORT` and parses it as a u16. If the variable is not set or cannot
/// be parsed, the default port 3000 is used.
pub fn get_server_port() -> u16 {
    match env::var("PORT") {
        Ok(raw) => raw.parse().unwrap_or_else(|_| {
            error!("PORT '{}' is not a valid port number, using 3000", raw);
            3000
        }),
        Err(_) => 3000,
    }
}

fn load_secret(name: &str) -> Result<String, Box<dyn std::error::Error + Send + Sync>> {
    match env::var(name) {
        Ok(value) if !value.is_empty() => {
            info!(
                "Found {} environment variable with length: {}",
                name,
                value.len()
            );
            debug!("{} (masked): {}", name, mask_secret(&value));
            Ok(value)
        }
        Ok(_) => {
            error!("{} is empty", name);
            Err(format!("{} cannot be empty", name).into())
        }
        Err(e) => {
            error!("Failed to load {} from environment: {}", name, e);
            Err(format!("Missing {} environment variable: {}", name, e).into())
        }
    }
}

/// Masks a secret for logging, keeping at most the first and last 8 characters.
pub(crate) fn mask_secret(secret: &str) -> String {
    let chars: Vec<char> = secret.chars().collect();
    let len = chars.len();
    let prefix: String = chars.iter().take(8.min(len)).collect();
    if len > 16 {
        let suffix: String = chars[len - 8..].iter().collect();
        format!("{}...{}", prefix, suffix)
    } else {
        format!("{}...", prefix)
    }
}
