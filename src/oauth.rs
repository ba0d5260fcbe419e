//! OAuth authentication module for Twitter/X API integration.
//!
//! This module implements the OAuth 2.0 application-only flow: the consumer
//! key and secret are exchanged for a Bearer Token through the client
//! credentials grant, and the Bearer Token is then sent with every read-only
//! request (search, user timeline).

use base64::Engine;
use log::{debug, error, info};
use reqwest::Client;
use serde::Deserialize;

use crate::error::{TwitterError, TwitterResult};
use crate::twitter::sanitize_for_logging;

/// Body of a successful `POST /oauth2/token` response.
#[derive(Debug, Deserialize)]
pub struct BearerResponse {
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(default)]
    pub access_token: Option<String>,
}

/// Builds the Authorization header for the client credentials exchange.
///
/// The consumer key and secret are joined with `:` and Base64 encoded, as
/// required by `POST /oauth2/token`.
///
/// # Example
///
/// ```rust
/// use opensearch_twitter::build_basic_auth_header;
///
/// let header = build_basic_auth_header("key", "secret");
/// assert_eq!(header, "Basic a2V5OnNlY3JldA==");
/// ```
pub fn build_basic_auth_header(consumer_key: &str, consumer_secret: &str) -> String {
    let credentials = format!("{}:{}", consumer_key, consumer_secret);
    format!(
        "Basic {}",
        base64::engine::general_purpose::STANDARD.encode(credentials.as_bytes())
    )
}

/// Builds the Authorization header for OAuth 2.0 Bearer Token authentication.
///
/// # Example
///
/// ```rust
/// use opensearch_twitter::build_bearer_auth_header;
///
/// let header = build_bearer_auth_header("your_bearer_token");
/// assert_eq!(header, "Bearer your_bearer_token");
/// ```
pub fn build_bearer_auth_header(bearer_token: &str) -> String {
    format!("Bearer {}", bearer_token)
}

/// Exchanges the consumer credentials for an application-only Bearer Token.
///
/// # Parameters
///
/// - `client`: The shared HTTP client
/// - `api_url`: Base URL of the Twitter API, without trailing slash
/// - `consumer_key` / `consumer_secret`: The application credentials
///
/// # Returns
///
/// - `Ok(String)`: The access token
/// - `Err(TwitterError)`: Transport failure, non-success status, or a response
///   without `access_token`
pub async fn request_bearer_token(
    client: &Client,
    api_url: &str,
    consumer_key: &str,
    consumer_secret: &str,
) -> TwitterResult<String> {
    let url = format!("{}/oauth2/token", api_url);
    info!("Requesting application-only bearer token from {}", url);

    let response = client
        .post(&url)
        .header(
            "Authorization",
            build_basic_auth_header(consumer_key, consumer_secret),
        )
        .form(&[("grant_type", "client_credentials")])
        .send()
        .await?;

    let status = response.status();
    let body = response.text().await?;

    if !status.is_success() {
        error!("Bearer token request failed - Status: {}", status);
        debug!("Token error response: {}", sanitize_for_logging(&body, 200));
        return Err(TwitterError::Api {
            status: status.as_u16(),
            message: sanitize_for_logging(&body, 200),
        });
    }

    let parsed: BearerResponse = serde_json::from_str(&body)?;
    if let Some(token_type) = parsed.token_type.as_deref() {
        if !token_type.eq_ignore_ascii_case("bearer") {
            return Err(TwitterError::Auth(format!(
                "unexpected token_type '{}'",
                token_type
            )));
        }
    }

    match parsed.access_token {
        Some(token) if !token.is_empty() => {
            info!("Bearer token acquired ({} characters)", token.len());
            Ok(token)
        }
        _ => Err(TwitterError::Auth("no access_token in response".to_string())),
    }
}
