use super::ui;
use crate::core::{Currency, RateCache, RateSnapshot, RateStatus, RateTable};
use comfy_table::{Cell, CellAlignment};

/// Refreshes the cache behind a spinner.
pub async fn refresh_with_spinner(cache: &RateCache) {
    let pb = ui::new_spinner("Fetching exchange rates...");
    cache.refresh().await;
    pb.finish_and_clear();
}

fn currency_name(code: &str) -> String {
    Currency::from_code(code).map_or_else(String::new, |c| c.display_info().0.to_string())
}

pub fn display_rate_table(snapshot: &RateSnapshot) -> String {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Code"),
        ui::header_cell("Currency"),
        ui::header_cell("Units per USD"),
    ]);
    for (code, rate) in snapshot.table.iter() {
        table.add_row(vec![
            Cell::new(code),
            Cell::new(currency_name(code)),
            Cell::new(format!("{rate:.4}")).set_alignment(CellAlignment::Right),
        ]);
    }

    let mut output = format!(
        "{}\n\n",
        ui::style_text("Exchange rates", ui::StyleType::Title)
    );
    output.push_str(&table.to_string());
    output.push('\n');
    output.push_str(&status_line(snapshot));
    output
}

/// Describes how usable the snapshot is.
pub fn status_line(snapshot: &RateSnapshot) -> String {
    match snapshot.status() {
        RateStatus::NotLoaded => ui::style_text("Rates not loaded", ui::StyleType::Error),
        RateStatus::Loading => ui::style_text("Rates are loading...", ui::StyleType::Subtle),
        RateStatus::Ready if snapshot.table.is_degenerate() => ui::style_text(
            "No rate source responded; only USD is available",
            ui::StyleType::Error,
        ),
        RateStatus::Ready => {
            let when = snapshot
                .updated_at
                .map(|t| t.format("%Y-%m-%d %H:%M:%S UTC").to_string())
                .unwrap_or_default();
            ui::style_text(
                &format!("{} rates, updated {}", snapshot.table.len(), when),
                ui::StyleType::Subtle,
            )
        }
    }
}

/// Lists the supported currencies and whether each can be converted now.
pub fn display_currencies(rates: &RateTable) -> String {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Code"),
        ui::header_cell("Currency"),
        ui::header_cell("Symbol"),
        ui::header_cell("Rate available"),
    ]);
    for currency in Currency::all() {
        let (name, symbol) = currency.display_info();
        let available = if rates.contains(currency.code()) {
            Cell::new("yes").fg(comfy_table::Color::Green)
        } else {
            Cell::new("no").fg(comfy_table::Color::Red)
        };
        table.add_row(vec![
            Cell::new(currency.code()),
            Cell::new(name),
            Cell::new(symbol),
            available,
        ]);
    }
    table.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use std::sync::Arc;

    fn ready(table: RateTable) -> RateSnapshot {
        RateSnapshot {
            table: Arc::new(table),
            is_loading: false,
            updated_at: Some(Utc::now()),
        }
    }

    #[test]
    fn test_rate_table_lists_codes() {
        let table: RateTable = [("USD", 1.0), ("EUR", 0.92), ("KZT", 520.0)]
            .into_iter()
            .collect();
        let output = display_rate_table(&ready(table));
        assert!(output.contains("EUR"));
        assert!(output.contains("Euro"));
        assert!(output.contains("520.0000"));
        assert!(output.contains("3 rates"));
    }

    #[test]
    fn test_status_lines() {
        assert!(status_line(&RateSnapshot::default()).contains("not loaded"));

        let loading = RateSnapshot {
            is_loading: true,
            ..RateSnapshot::default()
        };
        assert!(status_line(&loading).contains("loading"));

        let degenerate = ready(RateTable::pivot_only());
        assert!(status_line(&degenerate).contains("only USD"));
    }

    #[test]
    fn test_currencies_availability() {
        let table: RateTable = [("USD", 1.0)].into_iter().collect();
        let output = display_currencies(&table);
        assert!(output.contains("Tenge"));
        assert!(output.contains("yes"));
        assert!(output.contains("no"));
    }
}
