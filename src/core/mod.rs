//! Core business logic abstractions

pub mod aggregator;
pub mod cache;
pub mod config;
pub mod conversion;
pub mod currency;
pub mod ledger;
pub mod log;
pub mod rates;

// Re-export main types for cleaner imports
pub use aggregator::RateAggregator;
pub use cache::{RateCache, RateSnapshot, RateStatus};
pub use conversion::{BalanceItem, ConversionError};
pub use currency::{Currency, PIVOT_CURRENCY};
pub use rates::{FetchError, RateSource, RateTable};
