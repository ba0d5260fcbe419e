//! OpenSearch pagination (`count`, `startPage`, `startIndex`).

use log::warn;
use std::collections::HashMap;

use crate::twitter::param;

pub const DEFAULT_COUNT: usize = 20;

/// The windowing parameters of one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub count: usize,
    /// 1-based
    pub start_page: usize,
    /// 1-based
    pub start_index: usize,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            count: DEFAULT_COUNT,
            start_page: 1,
            start_index: 1,
        }
    }
}

impl Pagination {
    pub fn new(count: usize, start_page: usize, start_index: usize) -> Self {
        Self {
            count,
            start_page: start_page.max(1),
            start_index: start_index.max(1),
        }
    }

    /// Reads the pagination parameters; missing or invalid values use the defaults.
    pub fn from_params(params: &HashMap<String, String>) -> Self {
        let defaults = Self::default();
        Self::new(
            parse_or(params, "count", defaults.count),
            parse_or(params, "startPage", defaults.start_page),
            parse_or(params, "startIndex", defaults.start_index),
        )
    }

    /// Number of items skipped before the window starts.
    pub fn skip(&self) -> usize {
        (self.start_index - 1).saturating_add((self.start_page - 1).saturating_mul(self.count))
    }

    /// Returns `items[skip .. skip + count]`, clamped to the available items.
    pub fn window<T>(&self, items: Vec<T>) -> Vec<T> {
        items.into_iter().skip(self.skip()).take(self.count).collect()
    }
}

fn parse_or(params: &HashMap<String, String>, name: &str, default: usize) -> usize {
    match param(params, name) {
        Some(raw) => raw.parse().unwrap_or_else(|_| {
            warn!("Ignoring invalid {} '{}', using {}", name, raw, default);
            default
        }),
        None => default,
    }
}
