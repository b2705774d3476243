//! Conversion of amounts between currencies through the USD pivot.
//!
//! Both operations are pure: they read a [`RateTable`] and never block. No
//! rounding is applied here; presentation decides how many decimals to show.
use crate::core::currency::{PIVOT_CURRENCY, normalize_code};
use crate::core::rates::RateTable;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConversionError {
    #[error("No exchange rate available for {0}")]
    RateUnavailable(String),
}

/// An amount denominated in a currency, e.g. an account balance.
#[derive(Debug, Clone, PartialEq)]
pub struct BalanceItem {
    pub currency: String,
    pub amount: f64,
}

impl BalanceItem {
    pub fn new(currency: &str, amount: f64) -> Self {
        Self {
            currency: normalize_code(currency),
            amount,
        }
    }
}

/// Converts `amount` from one currency to another.
///
/// Identical codes return the amount untouched, even when the table does not
/// know the currency.
pub fn convert(
    amount: f64,
    from: &str,
    to: &str,
    table: &RateTable,
) -> Result<f64, ConversionError> {
    let from = normalize_code(from);
    let to = normalize_code(to);
    if from == to {
        return Ok(amount);
    }

    let rate_from = table
        .get(&from)
        .ok_or_else(|| ConversionError::RateUnavailable(from.clone()))?;
    let rate_to = table
        .get(&to)
        .ok_or_else(|| ConversionError::RateUnavailable(to.clone()))?;

    let converted = if from == PIVOT_CURRENCY {
        amount * rate_to
    } else if to == PIVOT_CURRENCY {
        amount / rate_from
    } else {
        (amount / rate_from) * rate_to
    };
    debug!("Converted {amount} {from} -> {converted} {to}");
    Ok(converted)
}

/// Sums `items` in the `target` currency.
///
/// Items whose currency has no rate are skipped. Without a rate for the target
/// itself the total is 0.0.
pub fn aggregate<'a, I>(items: I, target: &str, table: &RateTable) -> f64
where
    I: IntoIterator<Item = &'a BalanceItem>,
{
    let target = normalize_code(target);
    if table.is_empty() || !table.contains(&target) {
        debug!("No rate for target currency {target}, total is zero");
        return 0.0;
    }

    items
        .into_iter()
        .filter_map(
            |item| match convert(item.amount, &item.currency, &target, table) {
                Ok(value) => Some(value),
                Err(e) => {
                    debug!("Skipping {} {}: {}", item.amount, item.currency, e);
                    None
                }
            },
        )
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn sample_table() -> RateTable {
        [("USD", 1.0), ("EUR", 0.92), ("RUB", 95.0)]
            .into_iter()
            .collect()
    }

    fn assert_close(actual: f64, expected: f64) {
        let tolerance = 1e-9 * expected.abs().max(1.0);
        assert!(
            (actual - expected).abs() <= tolerance,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn test_convert_pivot_paths() {
        let table = sample_table();
        assert_close(convert(10.0, "USD", "EUR", &table).unwrap(), 9.2);
        assert_close(convert(95.0, "RUB", "USD", &table).unwrap(), 1.0);
        assert_close(convert(950.0, "rub", "eur", &table).unwrap(), 9.2);
    }

    #[test]
    fn test_convert_identity_without_rate() {
        let table = RateTable::new();
        assert_eq!(convert(12.34, "ZZZ", "zzz", &table), Ok(12.34));
    }

    #[test]
    fn test_convert_is_sign_agnostic() {
        let table = sample_table();
        let positive = convert(50.0, "EUR", "RUB", &table).unwrap();
        let negative = convert(-50.0, "EUR", "RUB", &table).unwrap();
        assert_eq!(positive, -negative);
    }

    #[test]
    fn test_convert_reports_missing_rate() {
        let table = sample_table();
        assert_eq!(
            convert(1.0, "ZZZ", "USD", &table),
            Err(ConversionError::RateUnavailable("ZZZ".to_string()))
        );
        assert_eq!(
            convert(1.0, "EUR", "kzt", &table),
            Err(ConversionError::RateUnavailable("KZT".to_string()))
        );
    }

    #[test]
    fn test_degenerate_table() {
        let table = RateTable::pivot_only();
        assert_eq!(convert(50.0, "USD", "USD", &table), Ok(50.0));
        assert_eq!(
            convert(50.0, "USD", "EUR", &table),
            Err(ConversionError::RateUnavailable("EUR".to_string()))
        );
    }

    #[test]
    fn test_aggregate_skips_missing_rates() {
        let table = sample_table();
        let items = vec![BalanceItem::new("USD", 10.0), BalanceItem::new("ZZZ", 5.0)];
        assert_eq!(aggregate(&items, "USD", &table), 10.0);
    }

    #[test]
    fn test_aggregate_empty_table() {
        let table = RateTable::new();
        assert_eq!(aggregate(&[], "USD", &table), 0.0);
        let items = vec![BalanceItem::new("USD", 10.0)];
        assert_eq!(aggregate(&items, "USD", &table), 0.0);
    }

    #[test]
    fn test_aggregate_missing_target() {
        let table = sample_table();
        let items = vec![BalanceItem::new("USD", 10.0)];
        assert_eq!(aggregate(&items, "KZT", &table), 0.0);
    }

    #[test]
    fn test_aggregate_accounts_in_usd() {
        let table = sample_table();
        let items = vec![
            BalanceItem::new("USD", 100.0),
            BalanceItem::new("EUR", 50.0),
            BalanceItem::new("RUB", 1000.0),
        ];
        let total = aggregate(&items, "USD", &table);
        assert_close(total, 100.0 + 50.0 / 0.92 + 1000.0 / 95.0);
        assert!((total - 164.874).abs() < 1e-3);
    }

    #[test]
    fn test_aggregate_mixed_signs() {
        let table = sample_table();
        let items = vec![BalanceItem::new("EUR", 92.0), BalanceItem::new("EUR", -46.0)];
        assert_close(aggregate(&items, "USD", &table), 50.0);
    }

    fn rate() -> impl Strategy<Value = f64> {
        0.0001f64..100_000.0
    }

    proptest! {
        #[test]
        fn prop_identity(code in "[A-Z]{3}", amount in -1e12f64..1e12) {
            prop_assert_eq!(convert(amount, &code, &code, &sample_table()), Ok(amount));
            prop_assert_eq!(convert(amount, &code, &code, &RateTable::new()), Ok(amount));
        }

        #[test]
        fn prop_pivot_consistency(r in rate()) {
            let table: RateTable = [("USD", 1.0), ("XXX", r)].into_iter().collect();
            let forward = convert(1.0, "USD", "XXX", &table).unwrap();
            let back = convert(r, "XXX", "USD", &table).unwrap();
            prop_assert!((forward - r).abs() <= 1e-9 * r);
            prop_assert!((back - 1.0).abs() <= 1e-9);
        }

        #[test]
        fn prop_round_trip(rx in rate(), ry in rate(), amount in -1e9f64..1e9) {
            let table: RateTable = [("USD", 1.0), ("XXX", rx), ("YYY", ry)].into_iter().collect();
            for (a, b) in [("XXX", "YYY"), ("USD", "XXX"), ("YYY", "USD")] {
                let there = convert(amount, a, b, &table).unwrap();
                let back = convert(there, b, a, &table).unwrap();
                prop_assert!((back - amount).abs() <= 1e-9 * amount.abs().max(1.0));
            }
        }
    }
}
