//! Twitter API v1.1 wire types.
//!
//! Only the fields the feed mapper reads are modelled. Everything is optional
//! or defaulted, explicit `null`s are accepted, and unknown fields are ignored,
//! so the many shapes a status object takes (retweets, quotes, extended
//! tweets) all decode into the same record.

use serde::{Deserialize, Deserializer};

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// A status object as returned by search and user timeline endpoints.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawTweet {
    /// e.g. `Wed Oct 10 20:19:24 +0000 2018`
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub id_str: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
    /// Present instead of `text` when `tweet_mode=extended` is used
    #[serde(default)]
    pub full_text: Option<String>,
    #[serde(default)]
    pub user: Option<TwitterUser>,
    #[serde(default)]
    pub entities: Option<Entities>,
    #[serde(default)]
    pub retweeted_status: Option<Box<RawTweet>>,
}

impl RawTweet {
    /// The tweet's string id, falling back to the numeric id.
    pub fn identifier(&self) -> Option<String> {
        self.id_str
            .as_deref()
            .filter(|id| !id.is_empty())
            .map(str::to_string)
            .or_else(|| self.id.map(|id| id.to_string()))
    }

    /// The tweet body, preferring `full_text` over `text`.
    pub fn body(&self) -> &str {
        self.full_text
            .as_deref()
            .or(self.text.as_deref())
            .unwrap_or_default()
    }

    /// Screen name of the posting user, empty when the user object is missing.
    pub fn screen_name(&self) -> &str {
        self.user
            .as_ref()
            .and_then(|u| u.screen_name.as_deref())
            .unwrap_or_default()
    }

    /// Link entities of the tweet, used to expand t.co links.
    pub fn urls(&self) -> &[UrlEntity] {
        self.entities
            .as_ref()
            .map(|e| e.urls.as_slice())
            .unwrap_or_default()
    }

    /// Hashtags listed in the tweet entities, in order.
    pub fn hashtags(&self) -> Vec<String> {
        self.entities
            .as_ref()
            .map(|e| {
                e.hashtags
                    .iter()
                    .filter_map(|h| h.text.clone())
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// The `user` sub-object of a status.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TwitterUser {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub screen_name: Option<String>,
    #[serde(default)]
    pub profile_image_url: Option<String>,
    #[serde(default)]
    pub profile_image_url_https: Option<String>,
}

impl TwitterUser {
    pub fn avatar_url(&self) -> Option<String> {
        self.profile_image_url_https
            .clone()
            .or_else(|| self.profile_image_url.clone())
            .filter(|url| !url.is_empty())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Entities {
    #[serde(default, deserialize_with = "null_as_default")]
    pub hashtags: Vec<Hashtag>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub urls: Vec<UrlEntity>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Hashtag {
    #[serde(default)]
    pub text: Option<String>,
}

/// A shortened link in the tweet text and what it points to.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UrlEntity {
    /// The t.co link as it appears in the text
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub expanded_url: Option<String>,
    #[serde(default)]
    pub display_url: Option<String>,
}

/// Body of `GET /1.1/search/tweets.json`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchResponse {
    #[serde(default, deserialize_with = "null_as_default")]
    pub statuses: Vec<RawTweet>,
    #[serde(default)]
    pub search_metadata: Option<SearchMetadata>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchMetadata {
    /// The `count` Twitter applied to the search
    #[serde(default)]
    pub count: Option<u32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_status_with_nulls_and_unknown_fields() {
        let json = r#"{
            "created_at": "Wed Oct 10 20:19:24 +0000 2018",
            "id": 1050118621198921728,
            "id_str": "1050118621198921728",
            "text": "To make room for more expression #EGU18",
            "truncated": null,
            "in_reply_to_status_id": null,
            "geo": null,
            "coordinates": {"type": "Point"},
            "user": {
                "name": "ESA EarthObservation",
                "screen_name": "ESA_EO",
                "profile_image_url_https": "https://pbs.twimg.com/a.png",
                "entities": {"description": {"urls": []}}
            },
            "entities": {"hashtags": [{"text": "EGU18", "indices": [33, 39]}], "urls": null},
            "metadata": {"result_type": "recent"}
        }"#;

        let tweet: RawTweet = serde_json::from_str(json).unwrap();
        assert_eq!(tweet.identifier().as_deref(), Some("1050118621198921728"));
        assert_eq!(tweet.screen_name(), "ESA_EO");
        assert_eq!(tweet.hashtags(), vec!["EGU18"]);
        assert!(tweet.retweeted_status.is_none());
        assert!(tweet.urls().is_empty());
        assert_eq!(
            tweet.user.unwrap().avatar_url().as_deref(),
            Some("https://pbs.twimg.com/a.png")
        );
    }

    #[test]
    fn decodes_url_entities() {
        let tweet: RawTweet = serde_json::from_str(
            r#"{"entities": {"urls": [{"url": "https://t.co/x", "expanded_url": "https://www.esa.int/eo", "display_url": "esa.int/eo", "indices": [0, 14]}]}}"#,
        )
        .unwrap();
        let urls = tweet.urls();
        assert_eq!(urls.len(), 1);
        assert_eq!(urls[0].url.as_deref(), Some("https://t.co/x"));
        assert_eq!(urls[0].expanded_url.as_deref(), Some("https://www.esa.int/eo"));
        assert_eq!(urls[0].display_url.as_deref(), Some("esa.int/eo"));
    }

    #[test]
    fn identifier_falls_back_to_numeric_id() {
        let tweet: RawTweet = serde_json::from_str(r#"{"id": 42, "id_str": ""}"#).unwrap();
        assert_eq!(tweet.identifier().as_deref(), Some("42"));
    }

    #[test]
    fn full_text_wins_over_text() {
        let tweet: RawTweet =
            serde_json::from_str(r#"{"text": "short…", "full_text": "the whole thing"}"#).unwrap();
        assert_eq!(tweet.body(), "the whole thing");
    }

    #[test]
    fn search_response_accepts_null_statuses() {
        let response: SearchResponse =
            serde_json::from_str(r#"{"statuses": null, "search_metadata": {"count": 15}}"#)
                .unwrap();
        assert!(response.statuses.is_empty());
        assert_eq!(response.search_metadata.unwrap().count, Some(15));
    }
}
