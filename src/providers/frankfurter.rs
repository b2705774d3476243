//! Broad USD-based rates from the Frankfurter API.
use super::util::{HttpFetcher, parse_entries, parse_number};
use crate::core::rates::{FetchError, RateSource, RateTable};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::value::RawValue;
use std::collections::BTreeMap;
use tracing::{debug, instrument};

pub struct FrankfurterProvider {
    base_url: String,
    http: HttpFetcher,
}

impl FrankfurterProvider {
    pub fn new(base_url: &str, http: HttpFetcher) -> Self {
        FrankfurterProvider {
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
        }
    }
}

/// `{"base": "USD", "rates": {"EUR": 0.92, ...}}`
#[derive(Debug, Deserialize)]
struct LatestResponse {
    rates: Option<BTreeMap<String, Box<RawValue>>>,
}

/// Extracts the rates, skipping entries that are not usable numbers.
fn parse_rates(url: &str, response: LatestResponse) -> Result<RateTable, FetchError> {
    let rates = response.rates.ok_or_else(|| FetchError::Malformed {
        url: url.to_string(),
        reason: "missing 'rates' object".to_string(),
    })?;

    let mut table = RateTable::new();
    for (code, value) in parse_entries(rates) {
        match parse_number(&value) {
            Some(rate) => {
                table.insert(&code, rate);
            }
            None => debug!("Skipping unparsable rate for {}: {}", code, value),
        }
    }
    Ok(table)
}

#[async_trait]
impl RateSource for FrankfurterProvider {
    fn name(&self) -> &str {
        "frankfurter"
    }

    #[instrument(name = "FrankfurterFetch", skip(self))]
    async fn fetch_rates(&self) -> Result<RateTable, FetchError> {
        let url = format!("{}/latest?from=USD", self.base_url);
        let response = self.http.get_json::<LatestResponse>(&url).await?;
        parse_rates(&url, response)
    }
}
