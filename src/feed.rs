//! Feed items and the tweet-to-item mapper.
//!
//! A [`FeedItem`] is the syndication view of one tweet. A [`FeedCollection`] is
//! one page of items together with the number of tweets actually fetched.

use chrono::{DateTime, Utc};
use log::warn;
use serde::Serialize;

use crate::error::{TwitterError, TwitterResult};
use crate::pagination::Pagination;
use crate::twitter::{tweet_as_html, RawTweet};

/// Twitter's `created_at` layout, e.g. `Wed Oct 10 20:19:24 +0000 2018`.
pub const TWITTER_DATE_FORMAT: &str = "%a %b %d %H:%M:%S %z %Y";

/// Parses a Twitter `created_at` value into a UTC instant.
///
/// # Example
///
/// ```rust
/// use opensearch_twitter::feed::parse_twitter_timestamp;
///
/// let at = parse_twitter_timestamp("Wed Oct 10 20:19:24 +0000 2018").unwrap();
/// assert_eq!(at.to_rfc3339(), "2018-10-10T20:19:24+00:00");
/// ```
pub fn parse_twitter_timestamp(value: &str) -> TwitterResult<DateTime<Utc>> {
    DateTime::parse_from_str(value.trim(), TWITTER_DATE_FORMAT)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|source| TwitterError::Timestamp {
            value: value.to_string(),
            source,
        })
}

/// Permalink of a tweet.
pub fn status_url(screen_name: &str, id: &str) -> String {
    format!("http://twitter.com/{}/status/{}", screen_name, id)
}

/// One tweet, normalized for syndication.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedItem {
    /// The tweet's string id
    pub identifier: String,
    /// Screen name of the poster
    pub author: String,
    pub author_image_url: Option<String>,
    /// Display name of the poster
    pub title: String,
    /// Tweet text rendered as HTML
    pub content: String,
    pub url: String,
    pub published_at: DateTime<Utc>,
    pub hashtags: Vec<String>,
}

impl FeedItem {
    /// Maps one tweet, failing on a missing or malformed `created_at`.
    pub fn from_tweet(tweet: &RawTweet) -> TwitterResult<Self> {
        let created_at = tweet
            .created_at
            .as_deref()
            .ok_or(TwitterError::MissingField("created_at"))?;
        let published_at = parse_twitter_timestamp(created_at)?;
        Self::with_published(tweet, published_at)
    }

    /// Maps one tweet with an already resolved publication time.
    ///
    /// Fails only when the tweet carries no id at all.
    pub fn with_published(tweet: &RawTweet, published_at: DateTime<Utc>) -> TwitterResult<Self> {
        let identifier = tweet.identifier().ok_or(TwitterError::MissingField("id"))?;

        let user = tweet.user.as_ref();
        let author = tweet.screen_name().to_string();
        let title = user
            .and_then(|u| u.name.clone())
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| author.clone());

        let content = match tweet.retweeted_status.as_deref() {
            Some(original) if !original.body().is_empty() => tweet_as_html(
                &format!("RT @{}: {}", original.screen_name(), original.body()),
                original.urls(),
            ),
            _ => tweet_as_html(tweet.body(), tweet.urls()),
        };

        Ok(Self {
            url: status_url(&author, &identifier),
            identifier,
            author,
            author_image_url: user.and_then(|u| u.avatar_url()),
            title,
            content,
            published_at,
            hashtags: tweet.hashtags(),
        })
    }
}

/// Maps tweets into feed items, in order.
///
/// A missing or malformed timestamp is replaced by `now` (and logged) for
/// every call path. Tweets without an id are dropped.
pub fn map_tweets(tweets: &[RawTweet], now: DateTime<Utc>) -> Vec<FeedItem> {
    tweets
        .iter()
        .filter_map(|tweet| {
            let item = match FeedItem::from_tweet(tweet) {
                Err(
                    e @ (TwitterError::Timestamp { .. }
                    | TwitterError::MissingField("created_at")),
                ) => {
                    warn!("{}; using current time", e);
                    FeedItem::with_published(tweet, now)
                }
                other => other,
            };
            match item {
                Ok(item) => Some(item),
                Err(e) => {
                    warn!("Skipping tweet: {}", e);
                    None
                }
            }
        })
        .collect()
}

/// One page of feed items.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedCollection {
    pub items: Vec<FeedItem>,
    /// Number of tweets fetched before pagination, not the upstream total
    pub total_count: usize,
    /// 1-based position of the first item of this page
    pub start_index: usize,
    pub items_per_page: usize,
}

impl FeedCollection {
    /// An empty result for a query that had nothing to search for.
    pub fn empty(pagination: &Pagination) -> Self {
        Self {
            items: Vec::new(),
            total_count: 0,
            start_index: pagination.start_index,
            items_per_page: pagination.count,
        }
    }

    /// Windows the fetched items according to the pagination parameters.
    pub fn paginate(items: Vec<FeedItem>, pagination: &Pagination) -> Self {
        let total_count = items.len();
        Self {
            items: pagination.window(items),
            total_count,
            start_index: pagination.start_index,
            items_per_page: pagination.count,
        }
    }

    /// The most recent publication time, used as the feed's `updated` value.
    pub fn updated(&self) -> Option<DateTime<Utc>> {
        self.items.iter().map(|item| item.published_at).max()
    }
}
