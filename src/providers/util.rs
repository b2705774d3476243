use crate::core::config::NetworkConfig;
use crate::core::rates::FetchError;
use serde::de::DeserializeOwned;
use serde_json::value::RawValue;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt::Display;
use std::future::Future;
use std::time::Duration;
use tracing::debug;

const USER_AGENT: &str = concat!("allbanks/", env!("CARGO_PKG_VERSION"));

/// Retries an async operation with configurable attempts and delays
///
/// # Parameters
/// - `operation`: Closure returning a future
/// - `retries`: Number of retry attempts (total runs = 1 initial + retries)
/// - `delay_ms`: Milliseconds between retry attempts
///
/// # Returns
/// Either the successful result or the error after all attempts
pub async fn with_retry<F, Fut, T, E>(
    mut operation: F,
    retries: usize,
    delay_ms: u64,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Display,
{
    let mut attempt = 1;
    loop {
        match operation().await {
            Ok(val) => return Ok(val),
            Err(err) => {
                if attempt > retries {
                    return Err(err);
                }
                debug!(
                    "Attempt {}/{} failed: {}. Retrying...",
                    attempt, retries, err
                );
                attempt += 1;
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            }
        }
    }
}

/// HTTP access shared by the rate providers: retries on transport errors,
/// status checking, and one timeout bounding all attempts together.
#[derive(Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
    timeout: Duration,
    retries: usize,
    retry_delay_ms: u64,
}

impl HttpFetcher {
    pub fn new(network: &NetworkConfig) -> reqwest::Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(network.timeout())
            .build()?;
        Ok(Self {
            client,
            timeout: network.timeout(),
            retries: network.retries,
            retry_delay_ms: network.retry_delay_ms,
        })
    }

    /// GETs `url` and deserializes the body as JSON.
    ///
    /// The configured timeout covers every attempt including retry delays.
    pub async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, FetchError> {
        debug!("Requesting {}", url);
        tokio::time::timeout(self.timeout, self.fetch(url))
            .await
            .map_err(|_| FetchError::Timeout {
                url: url.to_string(),
                after: self.timeout,
            })?
    }

    async fn fetch<T: DeserializeOwned>(&self, url: &str) -> Result<T, FetchError> {
        let response = with_retry(
            || async { self.client.get(url).send().await },
            self.retries,
            self.retry_delay_ms,
        )
        .await
        .map_err(|source| FetchError::Request {
            url: url.to_string(),
            source,
        })?;

        if !response.status().is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: response.status(),
            });
        }

        let text = response.text().await.map_err(|source| FetchError::Request {
            url: url.to_string(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|e| FetchError::Malformed {
            url: url.to_string(),
            reason: e.to_string(),
        })
    }
}

/// Parses each raw entry on its own, dropping the ones that are not valid
/// JSON values (e.g. numbers outside the `f64` range).
pub(crate) fn parse_entries(entries: BTreeMap<String, Box<RawValue>>) -> Map<String, Value> {
    entries
        .into_iter()
        .filter_map(|(key, raw)| match serde_json::from_str::<Value>(raw.get()) {
            Ok(value) => Some((key, value)),
            Err(e) => {
                debug!("Skipping unreadable entry {}: {}", key, e);
                None
            }
        })
        .collect()
}

/// Reads a rate that may arrive as a JSON number or a numeric string.
pub(crate) fn parse_number(value: &serde_json::Value) -> Option<f64> {
    let number = match value {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    number.is_finite().then_some(number)
}
