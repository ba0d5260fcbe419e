//! The OpenSearch-queryable Twitter collection.

use chrono::Utc;
use log::{debug, info};
use std::collections::{BTreeMap, HashMap};

use crate::error::TwitterResult;
use crate::feed::{map_tweets, FeedCollection};
use crate::pagination::Pagination;
use crate::twitter::{build_request, Account, SearchQuery, TwitterClient, TwitterRequest};

use super::description::OpenSearchDescription;
use super::format::ATOM_MIME_TYPE;
use super::render::FeedMeta;

/// A set of Twitter accounts exposed as one OpenSearch collection.
#[derive(Debug)]
pub struct TwitterCollection {
    pub identifier: String,
    /// Public base URL of the service, without trailing slash
    pub base_url: String,
    pub accounts: Vec<Account>,
    client: TwitterClient,
}

impl TwitterCollection {
    pub fn new(
        identifier: impl Into<String>,
        base_url: impl Into<String>,
        accounts: Vec<Account>,
        client: TwitterClient,
    ) -> Self {
        Self {
            identifier: identifier.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            accounts,
            client,
        }
    }

    pub fn default_mime_type(&self) -> &'static str {
        ATOM_MIME_TYPE
    }

    /// Runs one OpenSearch query.
    ///
    /// Builds the Twitter request from the configured accounts and the request
    /// parameters, fetches the tweets, maps them and windows the result.
    ///
    /// # Returns
    ///
    /// - `Ok(FeedCollection)`: The page of items. An empty collection with a
    ///   zero total means there was nothing to search for or nothing matched.
    /// - `Err(TwitterError)`: The upstream fetch failed
    pub async fn query(&self, params: &HashMap<String, String>) -> TwitterResult<FeedCollection> {
        let pagination = Pagination::from_params(params);
        let search = SearchQuery::from_params(params);

        let Some(request) = build_request(&self.accounts, &search) else {
            info!(
                "Nothing to query for collection '{}' ({:?})",
                self.identifier, search.search_type
            );
            return Ok(FeedCollection::empty(&pagination));
        };
        debug!("Resolved Twitter request: {:?}", request);

        let tweets = match request {
            TwitterRequest::Search { query, count } => {
                self.client.search(&query, count).await?.statuses
            }
            TwitterRequest::Timeline {
                screen_name,
                query,
                count,
            } => {
                self.client
                    .user_timeline(&screen_name, query.as_deref(), Some(count))
                    .await?
            }
        };

        let items = map_tweets(&tweets, Utc::now());
        let collection = FeedCollection::paginate(items, &pagination);
        info!(
            "Collection '{}' fetched {} item(s), returning {}",
            self.identifier,
            collection.total_count,
            collection.items.len()
        );
        Ok(collection)
    }

    /// Base URL of the search endpoint.
    pub fn search_base_url(&self) -> String {
        format!("{}/{}/search", self.base_url, self.identifier)
    }

    /// Canonical URL of a query, with the parameters in a stable order.
    pub fn request_url(&self, params: &HashMap<String, String>) -> String {
        let ordered: BTreeMap<&str, &str> = params
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();
        match serde_urlencoded::to_string(&ordered) {
            Ok(query) if !query.is_empty() => format!("{}?{}", self.search_base_url(), query),
            _ => self.search_base_url(),
        }
    }

    pub fn description(&self) -> TwitterResult<OpenSearchDescription> {
        OpenSearchDescription::for_collection(&self.identifier, &self.base_url)
    }

    /// Feed metadata for the response to `params`.
    pub fn feed_meta(&self, params: &HashMap<String, String>) -> FeedMeta {
        FeedMeta {
            id: self.request_url(params),
            title: format!("Twitter {}", self.identifier),
            generated_at: Utc::now(),
        }
    }
}
