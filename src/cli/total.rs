use super::ui;
use crate::context::AppContext;
use crate::core::RateTable;
use crate::core::conversion::{aggregate, convert};
use crate::core::ledger::{Account, Bank, balance_items};
use anyhow::Result;
use comfy_table::Cell;

/// Renders every active account with its value in `target` and the total.
pub fn display_total(
    accounts: &[Account],
    banks: &[Bank],
    target: &str,
    rates: &RateTable,
) -> String {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Account"),
        ui::header_cell("Bank"),
        ui::header_cell("Balance"),
        ui::header_cell(&format!("Value ({target})")),
    ]);

    for account in accounts.iter().filter(|a| !a.is_archived) {
        let bank_name = banks
            .iter()
            .find(|b| b.id == account.bank_id)
            .map_or("N/A", |b| b.name.as_str());
        let converted = convert(account.balance, &account.currency, target, rates).ok();
        table.add_row(vec![
            Cell::new(&account.name),
            Cell::new(bank_name),
            Cell::new(format!(
                "{} {}",
                ui::format_amount(account.balance),
                account.currency
            ))
            .set_alignment(comfy_table::CellAlignment::Right),
            ui::format_optional_cell(converted, ui::format_amount),
        ]);
    }

    let total = aggregate(&balance_items(accounts), target, rates);
    let mut output = format!("{}\n\n", ui::style_text("Accounts", ui::StyleType::Title));
    output.push_str(&table.to_string());
    output.push_str(&format!(
        "\n\nTotal ({}): {}",
        ui::style_text(target, ui::StyleType::TotalLabel),
        ui::style_text(&ui::format_amount(total), ui::StyleType::TotalValue)
    ));
    output
}

pub async fn run(ctx: &AppContext, target: &str) -> Result<()> {
    super::rates::refresh_with_spinner(&ctx.rates).await;
    let rates = ctx.rates.table();
    if !rates.contains(target) {
        println!(
            "{}",
            ui::style_text(
                &format!("No exchange rate available for {target}; total shown as 0"),
                ui::StyleType::Error
            )
        );
    }
    println!(
        "{}",
        display_total(
            &ctx.ledger.accounts.all(),
            &ctx.ledger.banks.all(),
            target,
            &rates
        )
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_total_marks_unconvertible_accounts() {
        let bank = Bank::new("Rust Bank");
        let accounts = vec![
            Account::new("Checking", bank.id, "USD", 100.0),
            Account::new("Euro", bank.id, "EUR", 92.0),
            Account::new("Mystery", bank.id, "XYZ", 5.0),
        ];
        let rates: RateTable = [("USD", 1.0), ("EUR", 0.92)].into_iter().collect();

        let output = display_total(&accounts, &[bank], "USD", &rates);
        assert!(output.contains("Rust Bank"));
        assert!(output.contains("N/A"));
        assert!(output.contains("200.00"));
    }

    #[test]
    fn test_archived_accounts_hidden() {
        let bank = Bank::new("Rust Bank");
        let mut old = Account::new("Closed", bank.id, "USD", 1000.0);
        old.is_archived = true;
        let rates = RateTable::pivot_only();

        let output = display_total(&[old], &[bank], "USD", &rates);
        assert!(!output.contains("Closed"));
        assert!(output.contains("0.00"));
    }
}
