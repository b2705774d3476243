//! Merges a broad base rate source with a narrow supplemental one.
use crate::core::rates::{FetchError, RateSource, RateTable};
use futures::future::join;
use std::sync::Arc;
use tracing::{info, instrument, warn};

pub struct RateAggregator {
    base: Arc<dyn RateSource>,
    supplemental: Arc<dyn RateSource>,
}

impl RateAggregator {
    pub fn new(base: Arc<dyn RateSource>, supplemental: Arc<dyn RateSource>) -> Self {
        Self { base, supplemental }
    }

    /// Fetches both sources concurrently and merges their tables.
    ///
    /// Never fails: a failing source contributes nothing, and with both down
    /// the result holds only the pivot entry.
    #[instrument(name = "RateAggregation", skip(self))]
    pub async fn aggregate(&self) -> RateTable {
        let (base, supplemental) =
            join(self.base.fetch_rates(), self.supplemental.fetch_rates()).await;

        let merged = merge_rate_tables(
            settle(self.base.name(), base),
            settle(self.supplemental.name(), supplemental),
        );
        info!("Aggregated {} exchange rates", merged.len());
        merged
    }
}

fn settle(name: &str, result: Result<RateTable, FetchError>) -> RateTable {
    match result {
        Ok(table) => {
            info!(source = name, count = table.len(), "Fetched rates");
            table
        }
        Err(e) => {
            warn!(source = name, error = %e, "Rate source failed");
            RateTable::new()
        }
    }
}

/// Supplemental entries win over base entries; the pivot is always 1.0.
pub fn merge_rate_tables(base: RateTable, supplemental: RateTable) -> RateTable {
    let mut merged = base;
    merged.overlay(supplemental);
    merged.with_pivot()
}
