//! Application root: builds and owns the long-lived services.
use crate::core::config::AppConfig;
use crate::core::ledger::balance_items;
use crate::core::{RateAggregator, RateCache, RateSource};
use crate::providers::{CbrProvider, FrankfurterProvider, HttpFetcher};
use crate::store::Ledger;
use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::debug;

pub struct AppContext {
    pub config: AppConfig,
    pub rates: Arc<RateCache>,
    pub ledger: Arc<Ledger>,
}

impl AppContext {
    /// Wires the configured rate providers and opens the on-disk ledger.
    pub fn from_config(config: AppConfig) -> Result<Self> {
        let data_path = config.default_data_path()?;
        debug!("Opening ledger at {}", data_path.display());
        let ledger = Ledger::open(&data_path)?;
        let rates = rate_cache_for(&config)?;
        Ok(Self::new(config, rates, ledger))
    }

    pub fn new(config: AppConfig, rates: RateCache, ledger: Ledger) -> Self {
        Self {
            config,
            rates: Arc::new(rates),
            ledger: Arc::new(ledger),
        }
    }

    /// Total of all non-archived account balances in `target`, using the
    /// currently cached rates.
    pub fn total_balance(&self, target: &str) -> f64 {
        let items = balance_items(&self.ledger.accounts.all());
        self.rates.total_balance(&items, target)
    }
}

/// Builds a rate cache over the providers named in `config`.
pub fn rate_cache_for(config: &AppConfig) -> Result<RateCache> {
    let http = HttpFetcher::new(&config.network).context("Failed to build HTTP client")?;
    let base: Arc<dyn RateSource> = Arc::new(FrankfurterProvider::new(
        config.providers.frankfurter_url(),
        http.clone(),
    ));
    let supplemental: Arc<dyn RateSource> = Arc::new(CbrProvider::new(
        config.providers.cbr_url(),
        &config.providers.cbr_currencies(),
        http,
    ));
    Ok(RateCache::new(RateAggregator::new(base, supplemental)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::{CbrProviderConfig, FrankfurterProviderConfig, ProvidersConfig};
    use crate::core::ledger::{Account, Bank};
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_total_balance_over_ledger() -> Result<()> {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/latest"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(r#"{"base": "USD", "rates": {"EUR": 0.92, "RUB": 100.0}}"#),
            )
            .mount(&mock_server)
            .await;
        Mock::given(method("GET"))
            .and(path("/daily_json.js"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"{"Valute": {"USD": {"Nominal": 1, "Value": 95.0}}}"#,
            ))
            .mount(&mock_server)
            .await;

        let config = AppConfig {
            providers: ProvidersConfig {
                frankfurter: Some(FrankfurterProviderConfig {
                    base_url: mock_server.uri(),
                }),
                cbr: Some(CbrProviderConfig {
                    base_url: mock_server.uri(),
                    currencies: vec![],
                }),
            },
            ..AppConfig::default()
        };
        let ctx = AppContext::new(config.clone(), rate_cache_for(&config)?, Ledger::in_memory());

        let bank = Bank::new("Rust Bank");
        for (currency, balance) in [("USD", 100.0), ("EUR", 50.0), ("RUB", 1000.0)] {
            ctx.ledger
                .accounts
                .upsert(Account::new(currency, bank.id, currency, balance))
                .await?;
        }

        assert_eq!(ctx.total_balance("USD"), 0.0);
        assert!(ctx.rates.refresh().await);

        let total = ctx.total_balance("USD");
        assert!((total - (100.0 + 50.0 / 0.92 + 1000.0 / 95.0)).abs() < 1e-9);
        Ok(())
    }
}
