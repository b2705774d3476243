use super::ui;
use crate::core::currency::normalize_code;
use crate::core::{ConversionError, RateCache};
use anyhow::Result;
use tracing::warn;

/// Formats the outcome of a single conversion.
pub fn format_conversion(
    amount: f64,
    from: &str,
    to: &str,
    result: Result<f64, ConversionError>,
) -> String {
    let from = normalize_code(from);
    let to = normalize_code(to);
    match result {
        Ok(value) => format!(
            "{} {} = {} {}",
            ui::format_amount(amount),
            from,
            ui::style_text(&ui::format_amount(value), ui::StyleType::TotalValue),
            ui::style_text(&to, ui::StyleType::TotalLabel)
        ),
        Err(e) => ui::style_text(
            &format!("Cannot convert {from} to {to}: {e}"),
            ui::StyleType::Error,
        ),
    }
}

/// Missing rates are reported on stdout, not returned as an error.
pub async fn run(cache: &RateCache, amount: f64, from: &str, to: &str) -> Result<()> {
    super::rates::refresh_with_spinner(cache).await;
    let result = cache.convert(amount, from, to);
    if let Err(e) = &result {
        warn!("{e}");
    }
    println!("{}", format_conversion(amount, from, to, result));
    Ok(())
}
