//! Process-wide holder of the most recent rate table.
use crate::core::aggregator::RateAggregator;
use crate::core::conversion::{self, BalanceItem, ConversionError};
use crate::core::rates::RateTable;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::watch;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateStatus {
    /// No refresh has completed and none is running.
    NotLoaded,
    /// A refresh is running and there is no earlier table to fall back on.
    Loading,
    /// A table is available, possibly stale while a refresh runs.
    Ready,
}

#[derive(Debug, Clone, Default)]
pub struct RateSnapshot {
    pub table: Arc<RateTable>,
    pub is_loading: bool,
    pub updated_at: Option<DateTime<Utc>>,
}

impl RateSnapshot {
    pub fn status(&self) -> RateStatus {
        match (self.updated_at, self.is_loading) {
            (Some(_), _) => RateStatus::Ready,
            (None, true) => RateStatus::Loading,
            (None, false) => RateStatus::NotLoaded,
        }
    }
}

/// Single-slot cache of the merged rate table.
///
/// Refreshes never overlap, and each completed refresh replaces the table in a
/// single step, so readers see either the old or the new table.
pub struct RateCache {
    aggregator: RateAggregator,
    state: watch::Sender<RateSnapshot>,
    refreshing: AtomicBool,
}

/// Clears the in-flight flag, also when a refresh future is dropped early.
struct RefreshGuard<'a> {
    cache: &'a RateCache,
}

impl Drop for RefreshGuard<'_> {
    fn drop(&mut self) {
        self.cache
            .state
            .send_if_modified(|s| std::mem::replace(&mut s.is_loading, false));
        self.cache.refreshing.store(false, Ordering::Release);
    }
}

impl RateCache {
    pub fn new(aggregator: RateAggregator) -> Self {
        let (state, _) = watch::channel(RateSnapshot::default());
        Self {
            aggregator,
            state,
            refreshing: AtomicBool::new(false),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<RateSnapshot> {
        self.state.subscribe()
    }

    pub fn snapshot(&self) -> RateSnapshot {
        self.state.borrow().clone()
    }

    pub fn table(&self) -> Arc<RateTable> {
        Arc::clone(&self.state.borrow().table)
    }

    pub fn is_loading(&self) -> bool {
        self.state.borrow().is_loading
    }

    /// Fetches and installs a fresh table.
    ///
    /// Returns `false` without doing anything if a refresh is already running.
    pub async fn refresh(&self) -> bool {
        if self
            .refreshing
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            debug!("Refresh already in flight, ignoring request");
            return false;
        }
        let _guard = RefreshGuard { cache: self };

        self.state.send_modify(|s| s.is_loading = true);
        let table = Arc::new(self.aggregator.aggregate().await);
        self.state.send_modify(|s| {
            s.table = table;
            s.is_loading = false;
            s.updated_at = Some(Utc::now());
        });
        debug!("Rate table replaced");
        true
    }

    /// Converts against whatever table is current.
    pub fn convert(&self, amount: f64, from: &str, to: &str) -> Result<f64, ConversionError> {
        conversion::convert(amount, from, to, &self.table())
    }

    /// Totals balances in `target` against whatever table is current.
    pub fn total_balance(&self, items: &[BalanceItem], target: &str) -> f64 {
        conversion::aggregate(items, target, &self.table())
    }
}
