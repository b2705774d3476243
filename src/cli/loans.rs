use super::accounts::{resolve_bank, resolve_by_id_prefix, short_id};
use super::ui;
use crate::core::RateTable;
use crate::core::conversion::{aggregate, convert};
use crate::core::currency::normalize_code;
use crate::core::ledger::{Bank, Loan};
use crate::store::Ledger;
use anyhow::{Result, bail};
use comfy_table::Cell;
use tracing::info;

pub struct NewLoan<'a> {
    pub name: &'a str,
    pub amount: f64,
    pub currency: &'a str,
    pub bank: Option<&'a str>,
    pub payment: f64,
    pub duration_days: Option<u32>,
}

pub async fn add_loan(ledger: &Ledger, new: NewLoan<'_>) -> Result<Loan> {
    if new.name.trim().is_empty() {
        bail!("Loan name cannot be empty");
    }
    if normalize_code(new.currency).is_empty() {
        bail!("Loan currency cannot be empty");
    }
    let mut loan = Loan::new(new.name, new.amount, new.currency);
    if let Some(bank) = new.bank {
        loan.bank_id = Some(resolve_bank(&ledger.banks.all(), bank)?.id);
    }
    loan.payment = new.payment;
    loan.duration_days = new.duration_days;
    loan.is_instalments = new.payment > 0.0;
    ledger.loans.upsert(loan.clone()).await?;
    info!("Added loan {} ({})", loan.name, loan.id);
    Ok(loan)
}

pub async fn delete_loan(ledger: &Ledger, id: &str) -> Result<Loan> {
    let loan = resolve_by_id_prefix(&ledger.loans.all(), id)?;
    if !ledger.loans.delete(loan.id).await? {
        bail!("Loan {} was already removed", loan.id);
    }
    info!("Deleted loan {} ({})", loan.name, loan.id);
    Ok(loan)
}

/// Loan amounts and payments converted into `target`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoanTotals {
    pub amount: f64,
    pub payment: f64,
}

pub fn loan_totals(loans: &[Loan], target: &str, rates: &RateTable) -> LoanTotals {
    let amounts: Vec<_> = loans.iter().map(Loan::amount_item).collect();
    let payments: Vec<_> = loans.iter().map(Loan::payment_item).collect();
    LoanTotals {
        amount: aggregate(&amounts, target, rates),
        payment: aggregate(&payments, target, rates),
    }
}

pub fn display_loans(loans: &[Loan], banks: &[Bank], target: &str, rates: &RateTable) -> String {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Id"),
        ui::header_cell("Loan"),
        ui::header_cell("Bank"),
        ui::header_cell("Amount"),
        ui::header_cell(&format!("Amount ({target})")),
        ui::header_cell(&format!("Payment ({target})")),
    ]);
    for loan in loans {
        let bank_name = loan
            .bank_id
            .and_then(|id| banks.iter().find(|b| b.id == id))
            .map_or("N/A", |b| b.name.as_str());
        let amount = convert(loan.amount, &loan.currency, target, rates).ok();
        let payment = convert(loan.payment, &loan.currency, target, rates).ok();
        table.add_row(vec![
            Cell::new(short_id(&loan.id)),
            Cell::new(&loan.name),
            Cell::new(bank_name),
            Cell::new(format!("{} {}", ui::format_amount(loan.amount), loan.currency))
                .set_alignment(comfy_table::CellAlignment::Right),
            ui::format_optional_cell(amount, ui::format_amount),
            ui::format_optional_cell(payment, ui::format_amount),
        ]);
    }

    let totals = loan_totals(loans, target, rates);
    let mut output = format!("{}\n\n", ui::style_text("Loans", ui::StyleType::Title));
    output.push_str(&table.to_string());
    output.push_str(&format!(
        "\n\nTotal loans: {}\nMonthly payment ({}): {}\nTotal amount ({}): {}",
        loans.len(),
        ui::style_text(target, ui::StyleType::TotalLabel),
        ui::style_text(&ui::format_amount(totals.payment), ui::StyleType::TotalValue),
        ui::style_text(target, ui::StyleType::TotalLabel),
        ui::style_text(&ui::format_amount(totals.amount), ui::StyleType::TotalValue)
    ));
    output
}
