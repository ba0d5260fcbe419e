//! Core Twitter API client.
//!
//! This module contains the HTTP client used for the two read-only calls the
//! collection needs (tweet search and user timeline), including application-only
//! bearer token acquisition and a single token re-acquisition on 401 errors.

use log::{debug, error, info, warn};
use reqwest::{Client, Response, StatusCode};
use tokio::sync::Mutex;

use crate::config::TwitterConfig;
use crate::error::{TwitterError, TwitterResult};
use crate::oauth::{build_bearer_auth_header, request_bearer_token};

use super::types::{RawTweet, SearchResponse};

/// Sanitizes text for safe logging by truncating and escaping control characters.
///
/// This function:
/// - Truncates long text to prevent log flooding
/// - Replaces control characters that could manipulate log output
/// - Escapes newlines to prevent log injection
pub(crate) fn sanitize_for_logging(text: &str, max_len: usize) -> String {
    let sanitized: String = text
        .chars()
        .map(|c| match c {
            '\n' | '\r' | '\t' => ' ',
            c if c.is_control() => '?',
            c => c,
        })
        .collect();

    if sanitized.chars().count() > max_len {
        let truncated: String = sanitized.chars().take(max_len).collect();
        format!(
            "{}... [truncated, {} total bytes]",
            truncated,
            text.len()
        )
    } else {
        sanitized
    }
}

/// Application-only client for the Twitter v1.1 REST API.
///
/// The bearer token is fetched lazily on first use and cached for the lifetime
/// of the client. The cache sits behind an async mutex, so concurrent first
/// callers trigger a single token exchange.
pub struct TwitterClient {
    http: Client,
    api_url: String,
    consumer_key: String,
    consumer_secret: String,
    bearer: Mutex<Option<String>>,
}

impl std::fmt::Debug for TwitterClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TwitterClient")
            .field("api_url", &self.api_url)
            .field("consumer_key", &crate::config::mask_secret(&self.consumer_key))
            .finish_non_exhaustive()
    }
}

impl TwitterClient {
    /// Builds a client from configuration.
    ///
    /// # Returns
    ///
    /// - `Ok(TwitterClient)`: Ready to use; no request has been made yet
    /// - `Err(TwitterError::Config)`: Missing credentials
    /// - `Err(TwitterError::Http)`: The HTTP client could not be built
    pub fn new(config: &TwitterConfig) -> TwitterResult<Self> {
        if config.consumer_key.is_empty() || config.consumer_secret.is_empty() {
            return Err(TwitterError::Config(
                "consumer key and secret are required".to_string(),
            ));
        }

        let http = Client::builder()
            .timeout(config.timeout)
            .user_agent(format!("opensearch-twitter/{}", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            api_url: config.api_url.trim_end_matches('/').to_string(),
            consumer_key: config.consumer_key.clone(),
            consumer_secret: config.consumer_secret.clone(),
            bearer: Mutex::new(None),
        })
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    /// Returns the cached bearer token, exchanging the credentials on first use.
    pub async fn bearer_token(&self) -> TwitterResult<String> {
        let mut cached = self.bearer.lock().await;
        if let Some(token) = cached.as_ref() {
            return Ok(token.clone());
        }

        let token = request_bearer_token(
            &self.http,
            &self.api_url,
            &self.consumer_key,
            &self.consumer_secret,
        )
        .await?;
        *cached = Some(token.clone());
        Ok(token)
    }

    /// Drops the cached token if it is still the one that was rejected.
    async fn invalidate_bearer_token(&self, rejected: &str) {
        let mut cached = self.bearer.lock().await;
        if cached.as_deref() == Some(rejected) {
            debug!("Discarding rejected bearer token");
            *cached = None;
        }
    }

    /// Searches recent tweets.
    ///
    /// # Parameters
    ///
    /// - `query`: The boolean search string, sent URL-encoded as `q`
    /// - `count`: Optional number of tweets to request
    pub async fn search(&self, query: &str, count: Option<u32>) -> TwitterResult<SearchResponse> {
        let mut url = format!(
            "{}/1.1/search/tweets.json?q={}",
            self.api_url,
            urlencoding::encode(query)
        );
        if let Some(count) = count {
            url.push_str(&format!("&count={}", count));
        }
        info!("Searching tweets with query: {}", sanitize_for_logging(query, 200));

        let body = self.get_authenticated(&url, "search").await?;
        let response: SearchResponse = serde_json::from_str(&body)?;
        match response.search_metadata.as_ref().and_then(|m| m.count) {
            Some(count) => info!(
                "Search returned {} tweets (count {})",
                response.statuses.len(),
                count
            ),
            None => info!("Search returned {} tweets", response.statuses.len()),
        }
        Ok(response)
    }

    /// Fetches the most recent tweets of one user.
    ///
    /// # Parameters
    ///
    /// - `screen_name`: The user whose timeline is read
    /// - `query`: Optional free text, forwarded as `q`
    /// - `count`: Optional number of tweets to request
    pub async fn user_timeline(
        &self,
        screen_name: &str,
        query: Option<&str>,
        count: Option<u32>,
    ) -> TwitterResult<Vec<RawTweet>> {
        let mut url = format!(
            "{}/1.1/statuses/user_timeline.json?screen_name={}",
            self.api_url,
            urlencoding::encode(screen_name)
        );
        if let Some(q) = query {
            url.push_str(&format!("&q={}", urlencoding::encode(q)));
        }
        if let Some(count) = count {
            url.push_str(&format!("&count={}", count));
        }
        info!("Fetching user timeline for @{}", screen_name);

        let body = self.get_authenticated(&url, "user_timeline").await?;
        let tweets: Vec<RawTweet> = serde_json::from_str(&body)?;
        info!("Timeline for @{} returned {} tweets", screen_name, tweets.len());
        Ok(tweets)
    }

    /// Makes a bearer-authenticated GET request.
    ///
    /// On a 401 the cached token is discarded, a new one is acquired and the
    /// request is retried once.
    async fn get_authenticated(&self, url: &str, operation_name: &str) -> TwitterResult<String> {
        info!(
            "Making authenticated request for operation: {}",
            operation_name
        );

        let token = self.bearer_token().await?;
        let response = self
            .http
            .get(url)
            .header("Authorization", build_bearer_auth_header(&token))
            .send()
            .await?;

        if response.status() != StatusCode::UNAUTHORIZED {
            return read_body(response, operation_name).await;
        }

        warn!(
            "Received 401 Unauthorized for operation '{}' - bearer token may be expired",
            operation_name
        );
        self.invalidate_bearer_token(&token).await;

        let token = self.bearer_token().await?;
        info!("Bearer token re-acquired, retrying operation '{}'", operation_name);
        let retry = self
            .http
            .get(url)
            .header("Authorization", build_bearer_auth_header(&token))
            .send()
            .await?;

        read_body(retry, operation_name).await
    }
}

async fn read_body(response: Response, operation_name: &str) -> TwitterResult<String> {
    let status = response.status();
    info!(
        "Received response with status: {} for operation: {}",
        status, operation_name
    );

    let text = response.text().await?;
    if status.is_success() {
        debug!(
            "Response summary for '{}': {} bytes received",
            operation_name,
            text.len()
        );
        return Ok(text);
    }

    error!("Operation '{}' failed - Status: {}", operation_name, status);
    debug!(
        "Error response for '{}': {}",
        operation_name,
        sanitize_for_logging(&text, 200)
    );
    Err(TwitterError::Api {
        status: status.as_u16(),
        message: sanitize_for_logging(&text, 200),
    })
}
