//! Exchange rate tables and the abstraction over remote rate sources

use crate::core::currency::{PIVOT_CURRENCY, normalize_code};
use async_trait::async_trait;
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::debug;

/// Failure of a single rate source.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Request error: {source} for URL: {url}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("HTTP error: {status} for URL: {url}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },
    #[error("Malformed response from {url}: {reason}")]
    Malformed { url: String, reason: String },
    #[error("Timed out after {after:?} for URL: {url}")]
    Timeout {
        url: String,
        after: std::time::Duration,
    },
}

/// Rates keyed by currency code, each expressed as units of that currency
/// per 1 USD.
///
/// Codes are stored uppercase and only finite, strictly positive rates are
/// ever admitted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RateTable {
    rates: BTreeMap<String, f64>,
}

impl RateTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// A table holding only the pivot entry.
    pub fn pivot_only() -> Self {
        Self::new().with_pivot()
    }

    /// Inserts a rate, returning `false` when the value is rejected.
    pub fn insert(&mut self, code: &str, rate: f64) -> bool {
        let code = normalize_code(code);
        if code.is_empty() || !rate.is_finite() || rate <= 0.0 {
            debug!("Dropping invalid rate {} for '{}'", rate, code);
            return false;
        }
        self.rates.insert(code, rate);
        true
    }

    pub fn get(&self, code: &str) -> Option<f64> {
        self.rates.get(&normalize_code(code)).copied()
    }

    pub fn contains(&self, code: &str) -> bool {
        self.get(code).is_some()
    }

    pub fn len(&self) -> usize {
        self.rates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.rates.iter().map(|(code, rate)| (code.as_str(), *rate))
    }

    /// Writes every entry of `other` over this table.
    pub fn overlay(&mut self, other: RateTable) {
        self.rates.extend(other.rates);
    }

    /// Forces the pivot entry to exactly 1.0.
    pub fn with_pivot(mut self) -> Self {
        self.rates.insert(PIVOT_CURRENCY.to_string(), 1.0);
        self
    }

    /// True when nothing beyond the pivot entry is known.
    pub fn is_degenerate(&self) -> bool {
        self.rates.keys().all(|code| code == PIVOT_CURRENCY)
    }
}

impl<S: AsRef<str>> FromIterator<(S, f64)> for RateTable {
    fn from_iter<T: IntoIterator<Item = (S, f64)>>(iter: T) -> Self {
        let mut table = RateTable::new();
        for (code, rate) in iter {
            table.insert(code.as_ref(), rate);
        }
        table
    }
}

/// A remote source of exchange rates quoted against USD.
#[async_trait]
pub trait RateSource: Send + Sync {
    fn name(&self) -> &str;

    async fn fetch_rates(&self) -> Result<RateTable, FetchError>;
}
