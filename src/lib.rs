//! # opensearch-twitter
//!
//! A library and web service that exposes a set of Twitter/X accounts as an
//! OpenSearch collection. Requests are turned into a single Twitter search (or
//! a user timeline lookup), the returned tweets are mapped into feed items, and
//! the page of items is served as Atom, JSON or HTML.
//!
//! ## Features
//!
//! - Boolean search query built from configured accounts and hashtags
//! - Application-only OAuth 2.0 bearer token authentication
//! - OpenSearch pagination (`count`, `startPage`, `startIndex`)
//! - OpenSearch description document with Atom, JSON and HTML templates
//! - Structured logging
//!
//! ## Configuration
//!
//! - `xapi_consumer_key`, `xapi_consumer_secret`: Twitter application credentials
//! - `TWITTER_ACCOUNTS`: accounts to search, e.g. `ESA_EO:EGU17,terradue`
//! - `OPENSEARCH_BASE_URL`, `OPENSEARCH_COLLECTION_ID`: how the collection is advertised
//! - `PORT`: Server port (defaults to 3000)
//!
//! ## API Endpoints
//!
//! - `GET /health`: Returns service health status
//! - `GET /{identifier}/search`: Runs an OpenSearch query
//! - `GET /{identifier}/description`: Returns the OpenSearch description

pub mod config;
pub mod error;
pub mod feed;
pub mod handlers;
pub mod oauth;
pub mod opensearch;
pub mod pagination;
pub mod twitter;

// Re-export commonly used types and functions
pub use config::{get_server_port, parse_accounts, CollectionConfig, TwitterConfig};
pub use error::{TwitterError, TwitterResult};
pub use feed::{FeedCollection, FeedItem};
pub use handlers::{build_router, AppState, SharedState};
pub use oauth::{build_basic_auth_header, build_bearer_auth_header};
pub use opensearch::{OpenSearchDescription, ResponseFormat, TwitterCollection};
pub use pagination::Pagination;
pub use twitter::{Account, TwitterClient};

#[cfg(test)]
mod tests;
