//! Search query construction.
//!
//! Turns the configured accounts and the OpenSearch request parameters into
//! the single request that is sent to Twitter: either one boolean search over
//! every account, or one user timeline.

use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Number of tweets requested from a user timeline when `count` is absent.
pub const DEFAULT_TIMELINE_COUNT: u32 = 10;

/// A Twitter handle of interest, optionally narrowed to hashtags.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub author: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub title: Option<String>,
}

impl Account {
    pub fn new(author: impl Into<String>) -> Self {
        Self {
            author: Some(author.into()),
            tags: Vec::new(),
            title: None,
        }
    }

    pub fn with_tags(mut self, tags: Vec<String>) -> Self {
        self.tags = tags;
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// The `from:<author>[ AND #<tag>]*` clause for this account.
    ///
    /// Returns `None` when the account has no author.
    pub fn clause(&self) -> Option<String> {
        let author = self.author.as_deref().filter(|a| !a.is_empty())?;
        let mut parts = vec![format!("from:{}", author)];
        parts.extend(self.tags.iter().map(|tag| format!("#{}", tag)));
        Some(parts.join(" AND "))
    }
}

/// Which Twitter endpoint a request targets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchType {
    #[default]
    Search,
    Timeline,
}

impl SearchType {
    /// Parses the `searchtype` parameter; unknown values fall back to search.
    pub fn from_param(value: Option<&str>) -> Self {
        match value.map(|v| v.trim().to_ascii_lowercase()).as_deref() {
            None | Some("") | Some("search") => Self::Search,
            Some("timeline") => Self::Timeline,
            Some(other) => {
                warn!("Unknown searchtype '{}', falling back to search", other);
                Self::Search
            }
        }
    }
}

/// The search-related parameters of one OpenSearch request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchQuery {
    pub search_type: SearchType,
    /// `q`: free text
    pub free_text: Option<String>,
    /// `author`: comma-separated allow-list, or the timeline screen name
    pub authors: Option<Vec<String>>,
    /// `count`: forwarded to Twitter
    pub count: Option<u32>,
}

/// Looks up a request parameter, treating blank values as absent.
pub(crate) fn param<'a>(params: &'a HashMap<String, String>, name: &str) -> Option<&'a str> {
    params
        .get(name)
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
}

impl SearchQuery {
    /// Reads `searchtype`, `q`, `author` (or its alias `scn`) and `count`.
    pub fn from_params(params: &HashMap<String, String>) -> Self {
        let authors = param(params, "author")
            .or_else(|| param(params, "scn"))
            .map(|raw| {
                raw.split(',')
                    .map(|a| a.trim().trim_start_matches('@').to_string())
                    .filter(|a| !a.is_empty())
                    .collect::<Vec<_>>()
            })
            .filter(|list| !list.is_empty());

        let count = param(params, "count").and_then(|raw| match raw.parse::<u32>() {
            Ok(count) => Some(count),
            Err(_) => {
                warn!("Ignoring non-numeric count '{}'", raw);
                None
            }
        });

        Self {
            search_type: SearchType::from_param(param(params, "searchtype")),
            free_text: param(params, "q").map(str::to_string),
            authors,
            count,
        }
    }
}

/// A fully resolved call against the Twitter API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TwitterRequest {
    Search {
        query: String,
        count: Option<u32>,
    },
    Timeline {
        screen_name: String,
        query: Option<String>,
        count: u32,
    },
}

/// Builds the boolean search string for a set of accounts.
///
/// Clauses are emitted in account order and joined with ` OR `. When `authors`
/// is given, only accounts whose author appears in it contribute a clause.
/// Free text is quoted and prepended with ` AND `. Returns `None` when there
/// is nothing to search for.
///
/// # Example
///
/// ```rust
/// use opensearch_twitter::twitter::{build_search_query, Account};
///
/// let accounts = vec![
///     Account::new("ESA_EO").with_tags(vec!["EGU17".to_string()]),
///     Account::new("terradue"),
/// ];
/// assert_eq!(
///     build_search_query(&accounts, None, None).as_deref(),
///     Some("from:ESA_EO AND #EGU17 OR from:terradue")
/// );
/// ```
pub fn build_search_query(
    accounts: &[Account],
    free_text: Option<&str>,
    authors: Option<&[String]>,
) -> Option<String> {
    let clauses: Vec<String> = accounts
        .iter()
        .filter(|account| match (authors, account.author.as_deref()) {
            (_, None) => false,
            (None, Some(_)) => true,
            (Some(allowed), Some(author)) => allowed.iter().any(|a| a == author),
        })
        .filter_map(Account::clause)
        .collect();

    let free_text = free_text.filter(|q| !q.is_empty());
    match (free_text, clauses.is_empty()) {
        (None, true) => None,
        (Some(q), true) => Some(format!("\"{}\"", q)),
        (None, false) => Some(clauses.join(" OR ")),
        (Some(q), false) => Some(format!("\"{}\" AND {}", q, clauses.join(" OR "))),
    }
}

/// Resolves the request to send for the given accounts and parameters.
///
/// Returns `None` when nothing should be queried: no accounts (or no
/// surviving clause and no free text) in search mode, or no author in
/// timeline mode.
pub fn build_request(accounts: &[Account], query: &SearchQuery) -> Option<TwitterRequest> {
    match query.search_type {
        SearchType::Search => {
            if accounts.is_empty() {
                debug!("No accounts configured, skipping search");
                return None;
            }
            let q = build_search_query(
                accounts,
                query.free_text.as_deref(),
                query.authors.as_deref(),
            )?;
            Some(TwitterRequest::Search {
                query: q,
                count: query.count,
            })
        }
        SearchType::Timeline => {
            let screen_name = query.authors.as_ref()?.first()?.clone();
            Some(TwitterRequest::Timeline {
                screen_name,
                query: query.free_text.clone(),
                count: query.count.unwrap_or(DEFAULT_TIMELINE_COUNT),
            })
        }
    }
}
