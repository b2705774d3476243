//! Supplemental rates derived from the Central Bank of Russia daily quotes.
//!
//! Quotes are rubles per `Nominal` units of each currency. The USD quote gives
//! rubles per dollar directly; every other requested code is re-pivoted through
//! the ruble into units per dollar.
use super::util::{HttpFetcher, parse_entries, parse_number};
use crate::core::currency::{PIVOT_CURRENCY, normalize_code};
use crate::core::rates::{FetchError, RateSource, RateTable};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::value::RawValue;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use tracing::{debug, instrument};

const BASE_CURRENCY: &str = "RUB";

pub struct CbrProvider {
    base_url: String,
    currencies: Vec<String>,
    http: HttpFetcher,
}

impl CbrProvider {
    pub fn new(base_url: &str, currencies: &[String], http: HttpFetcher) -> Self {
        CbrProvider {
            base_url: base_url.trim_end_matches('/').to_string(),
            currencies: currencies.iter().map(|c| normalize_code(c)).collect(),
            http,
        }
    }
}

/// Rubles per single unit of `code`, if quoted sensibly.
fn rubles_per_unit(quotes: &Map<String, Value>, code: &str) -> Option<f64> {
    let quote = quotes.get(code)?;
    let value = quote.get("Value").and_then(parse_number)?;
    let nominal = quote.get("Nominal").and_then(parse_number)?;
    if nominal <= 0.0 {
        return None;
    }
    Some(value / nominal)
}

#[derive(Debug, Deserialize)]
struct DailyResponse {
    #[serde(rename = "Valute")]
    valute: Option<BTreeMap<String, Box<RawValue>>>,
}

fn derive_rates(
    url: &str,
    response: DailyResponse,
    currencies: &[String],
) -> Result<RateTable, FetchError> {
    let raw_quotes = response.valute.ok_or_else(|| FetchError::Malformed {
        url: url.to_string(),
        reason: "missing 'Valute' object".to_string(),
    })?;
    let quotes = parse_entries(raw_quotes);

    let mut table = RateTable::new();
    let Some(rub_per_usd) = rubles_per_unit(&quotes, PIVOT_CURRENCY) else {
        debug!("No usable USD quote, nothing can be derived");
        return Ok(table);
    };
    table.insert(BASE_CURRENCY, rub_per_usd);

    for code in currencies {
        if code == BASE_CURRENCY || code == PIVOT_CURRENCY {
            continue;
        }
        match rubles_per_unit(&quotes, code) {
            Some(rub_per_unit) => {
                table.insert(code, rub_per_usd / rub_per_unit);
            }
            None => debug!("No usable quote for {}", code),
        }
    }
    Ok(table)
}

#[async_trait]
impl RateSource for CbrProvider {
    fn name(&self) -> &str {
        "cbr"
    }

    #[instrument(name = "CbrFetch", skip(self))]
    async fn fetch_rates(&self) -> Result<RateTable, FetchError> {
        let url = format!("{}/daily_json.js", self.base_url);
        let response = self.http.get_json::<DailyResponse>(&url).await?;
        derive_rates(&url, response, &self.currencies)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::NetworkConfig;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const MOCK_JSON: &str = r#"{
        "Date": "2025-09-13T11:30:00+03:00",
        "Valute": {
            "USD": {"CharCode": "USD", "Nominal": 1, "Value": 95.0},
            "BYN": {"CharCode": "BYN", "Nominal": 1, "Value": 28.5},
            "KZT": {"CharCode": "KZT", "Nominal": 100, "Value": 19.0},
            "EUR": {"CharCode": "EUR", "Nominal": 1, "Value": 103.0}
        }
    }"#;

    fn currencies() -> Vec<String> {
        vec!["BYN".to_string(), "KZT".to_string()]
    }

    fn derive(body: &str) -> Result<RateTable, FetchError> {
        let response: DailyResponse = serde_json::from_str(body).unwrap();
        derive_rates("mock", response, &currencies())
    }

    fn assert_close(actual: Option<f64>, expected: f64) {
        let actual = actual.expect("rate should be present");
        assert!(
            (actual - expected).abs() < 1e-9,
            "expected {expected}, got {actual}"
        );
    }

    #[tokio::test]
    async fn test_successful_fetch_repivots_through_ruble() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/daily_json.js"))
            .respond_with(ResponseTemplate::new(200).set_body_string(MOCK_JSON))
            .mount(&mock_server)
            .await;

        let http = HttpFetcher::new(&NetworkConfig::default()).unwrap();
        let provider = CbrProvider::new(&mock_server.uri(), &currencies(), http);
        let table = provider.fetch_rates().await.unwrap();

        assert_eq!(table.len(), 3);
        assert_close(table.get("RUB"), 95.0);
        assert_close(table.get("BYN"), 95.0 / 28.5);
        // 100 KZT cost 19 RUB, so 1 USD buys 95 / 0.19 KZT.
        assert_close(table.get("KZT"), 500.0);
        assert!(!table.contains("EUR"));
    }

    #[test]
    fn test_missing_usd_quote_yields_nothing() {
        let table = derive(r#"{"Valute": {"BYN": {"Nominal": 1, "Value": 28.5}}}"#).unwrap();
        assert!(table.is_empty());
    }

    #[test]
    fn test_partial_quotes() {
        let table = derive(
            r#"{"Valute": {
                "USD": {"Nominal": 1, "Value": 90.0},
                "KZT": {"Nominal": 0, "Value": 19.0}
            }}"#,
        )
        .unwrap();
        assert_eq!(table.len(), 1);
        assert_close(table.get("RUB"), 90.0);
    }

    #[test]
    fn test_unparsable_value_dropped() {
        let table = derive(
            r#"{"Valute": {
                "USD": {"Nominal": 1, "Value": 90.0},
                "BYN": {"Nominal": 1, "Value": "n/a"},
                "KZT": {"Nominal": 100, "Value": 18.0}
            }}"#,
        )
        .unwrap();
        assert!(!table.contains("BYN"));
        assert_close(table.get("KZT"), 500.0);
    }

    #[test]
    fn test_out_of_range_quote_dropped_alone() {
        let table = derive(
            r#"{"Valute": {
                "USD": {"Nominal": 1, "Value": 90.0},
                "BYN": {"Nominal": 1, "Value": 1e400},
                "KZT": {"Nominal": 100, "Value": 18.0}
            }}"#,
        )
        .unwrap();
        assert!(!table.contains("BYN"));
        assert_close(table.get("RUB"), 90.0);
        assert_close(table.get("KZT"), 500.0);
    }

    #[test]
    fn test_missing_valute_is_malformed() {
        let err = derive(r#"{"Date": "today"}"#).unwrap_err();
        assert!(matches!(err, FetchError::Malformed { .. }));
    }

    #[tokio::test]
    async fn test_http_failure() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/daily_json.js"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&mock_server)
            .await;

        let http = HttpFetcher::new(&NetworkConfig::default()).unwrap();
        let provider = CbrProvider::new(&mock_server.uri(), &currencies(), http);
        let err = provider.fetch_rates().await.unwrap_err();
        assert!(err.to_string().starts_with("HTTP error: 404"));
    }
}
