//! Error types for the Twitter client and the OpenSearch collection.
//!
//! Every upstream failure is returned as a [`TwitterError`] so that callers can
//! tell "the query matched nothing" apart from "the upstream fetch failed".

use thiserror::Error;

/// Errors produced while talking to the Twitter API or mapping its results.
#[derive(Error, Debug)]
pub enum TwitterError {
    /// Transport-level failure (connection, timeout, TLS, body read)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Response body could not be decoded
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Twitter answered with a non-success status
    #[error("Twitter API error {status}: {message}")]
    Api { status: u16, message: String },

    /// Bearer token exchange failed or returned no token
    #[error("Authentication error: {0}")]
    Auth(String),

    /// `created_at` did not match the Twitter timestamp format
    #[error("Invalid tweet timestamp '{value}': {source}")]
    Timestamp {
        value: String,
        #[source]
        source: chrono::ParseError,
    },

    /// A status object lacked a field the feed mapper cannot do without
    #[error("Tweet is missing required field: {0}")]
    MissingField(&'static str),

    /// Client could not be built from the supplied configuration
    #[error("Configuration error: {0}")]
    Config(String),
}

impl TwitterError {
    /// Returns the upstream HTTP status when one is known.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            Self::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// True when the error means the cached bearer token was rejected.
    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(401)
    }
}

/// Result type for Twitter operations.
pub type TwitterResult<T> = Result<T, TwitterError>;
