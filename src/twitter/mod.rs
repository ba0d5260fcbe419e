//! Twitter/X API integration module.
//!
//! This module contains the application-only API client, the wire types it
//! decodes, the search query builder and the tweet text renderer.

mod api;
mod parsing;
mod query;
mod types;

// Re-export public API
pub use api::TwitterClient;
pub use parsing::{decode_entities, escape_html, text_as_html, tweet_as_html};
pub use query::{
    build_request, build_search_query, Account, SearchQuery, SearchType, TwitterRequest,
    DEFAULT_TIMELINE_COUNT,
};
pub use types::{
    Entities, Hashtag, RawTweet, SearchMetadata, SearchResponse, TwitterUser, UrlEntity,
};

// Crate-internal re-exports (used by tests and other modules)
pub(crate) use api::sanitize_for_logging;
pub(crate) use query::param;
