//! Supported currencies and currency code handling

use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::str::FromStr;

/// Pivot currency of every rate table.
pub const PIVOT_CURRENCY: &str = "USD";

/// Normalizes a currency code as it enters the system.
pub fn normalize_code(code: &str) -> String {
    code.trim().to_uppercase()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub enum Currency {
    Usd,
    Eur,
    Gbp,
    Rub,
    Byn,
    Kzt,
    Cny,
    Jpy,
    Chf,
    Sek,
    Krw,
    Nok,
    Mxn,
    Try,
}

impl Currency {
    pub fn all() -> &'static [Currency] {
        &[
            Currency::Usd,
            Currency::Eur,
            Currency::Gbp,
            Currency::Rub,
            Currency::Byn,
            Currency::Kzt,
            Currency::Cny,
            Currency::Jpy,
            Currency::Chf,
            Currency::Sek,
            Currency::Krw,
            Currency::Nok,
            Currency::Mxn,
            Currency::Try,
        ]
    }

    pub fn code(&self) -> &'static str {
        match self {
            Currency::Usd => "USD",
            Currency::Eur => "EUR",
            Currency::Gbp => "GBP",
            Currency::Rub => "RUB",
            Currency::Byn => "BYN",
            Currency::Kzt => "KZT",
            Currency::Cny => "CNY",
            Currency::Jpy => "JPY",
            Currency::Chf => "CHF",
            Currency::Sek => "SEK",
            Currency::Krw => "KRW",
            Currency::Nok => "NOK",
            Currency::Mxn => "MXN",
            Currency::Try => "TRY",
        }
    }

    /// Returns display name and symbol for the currency
    pub fn display_info(&self) -> (&'static str, &'static str) {
        match self {
            Currency::Usd => ("US Dollar", "$"),
            Currency::Eur => ("Euro", "€"),
            Currency::Gbp => ("British Pound", "£"),
            Currency::Rub => ("Russian Ruble", "₽"),
            Currency::Byn => ("Belarusian Ruble", "Br"),
            Currency::Kzt => ("Tenge", "₸"),
            Currency::Cny => ("Chinese Yuan", "¥"),
            Currency::Jpy => ("Japanese Yen", "¥"),
            Currency::Chf => ("Swiss Franc", "CHF"),
            Currency::Sek => ("Swedish Krona", "kr"),
            Currency::Krw => ("South Korean Won", "₩"),
            Currency::Nok => ("Norwegian Krone", "kr"),
            Currency::Mxn => ("Mexican Peso", "Mex$"),
            Currency::Try => ("Turkish Lira", "₺"),
        }
    }

    pub fn from_code(code: &str) -> Option<Currency> {
        let code = normalize_code(code);
        Currency::all().iter().copied().find(|c| c.code() == code)
    }
}

impl Display for Currency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl FromStr for Currency {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Currency::from_code(s).ok_or_else(|| anyhow::anyhow!("Unsupported currency: {}", s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_code() {
        assert_eq!(normalize_code(" eur "), "EUR");
        assert_eq!(normalize_code("Rub"), "RUB");
    }

    #[test]
    fn test_from_code_is_case_insensitive() {
        assert_eq!(Currency::from_code("kzt"), Some(Currency::Kzt));
        assert_eq!(Currency::from_code("TRY"), Some(Currency::Try));
        assert_eq!(Currency::from_code("ZZZ"), None);
        assert!("zzz".parse::<Currency>().is_err());
    }

    #[test]
    fn test_catalog_codes_are_unique_and_uppercase() {
        let mut codes: Vec<_> = Currency::all().iter().map(|c| c.code()).collect();
        assert!(codes.iter().all(|c| *c == c.to_uppercase()));
        codes.sort();
        codes.dedup();
        assert_eq!(codes.len(), Currency::all().len());
        assert!(codes.contains(&PIVOT_CURRENCY));
    }
}
