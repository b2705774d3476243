use super::accounts::{resolve_by_id_prefix, short_id};
use super::ui;
use crate::core::RateTable;
use crate::core::ledger::{Account, Category, Transaction};
use crate::store::Ledger;
use anyhow::{Result, bail};
use comfy_table::Cell;
use tracing::info;

pub async fn add_category(ledger: &Ledger, name: &str, icon: &str) -> Result<Category> {
    if name.trim().is_empty() {
        bail!("Category name cannot be empty");
    }
    let category = Category::new(name, icon);
    ledger.categories.upsert(category.clone()).await?;
    info!("Added category {} ({})", category.name, category.id);
    Ok(category)
}

/// Finds a category by case-insensitive name, falling back to an id prefix.
pub fn resolve_category(categories: &[Category], name_or_id: &str) -> Result<Category> {
    let wanted = name_or_id.trim();
    if let Some(category) = categories.iter().find(|c| c.name.eq_ignore_ascii_case(wanted)) {
        return Ok(category.clone());
    }
    resolve_by_id_prefix(categories, wanted)
}

pub fn display_categories(categories: &[Category]) -> String {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Id"),
        ui::header_cell("Icon"),
        ui::header_cell("Category"),
    ]);
    for category in categories {
        table.add_row(vec![
            Cell::new(short_id(&category.id)),
            Cell::new(&category.icon),
            Cell::new(&category.name),
        ]);
    }
    table.to_string()
}

pub struct NewTransaction<'a> {
    pub account: &'a str,
    pub amount: f64,
    /// Defaults to the account currency.
    pub currency: Option<&'a str>,
    pub name: Option<&'a str>,
    pub note: Option<&'a str>,
    pub category: Option<&'a str>,
}

/// Resolves the account a new transaction is booked on.
pub fn transaction_account(ledger: &Ledger, account: &str) -> Result<Account> {
    resolve_by_id_prefix(&ledger.accounts.all(), account)
}

/// Records a transaction as given. When its currency differs from the
/// account's, the rate from `rates` is stored alongside it.
pub async fn add_transaction(
    ledger: &Ledger,
    rates: &RateTable,
    new: NewTransaction<'_>,
) -> Result<Transaction> {
    let account = transaction_account(ledger, new.account)?;
    let currency = new.currency.unwrap_or(&account.currency);
    let mut tx = Transaction::new(&account, new.amount, currency);
    if tx.currency.is_empty() {
        bail!("Transaction currency cannot be empty");
    }
    tx.name = new.name.map(str::to_string);
    tx.note = new.note.map(str::to_string);
    if let Some(category) = new.category {
        tx.category_id = Some(resolve_category(&ledger.categories.all(), category)?.id);
    }
    tx.fill_conversion_rate(&account, rates);

    ledger.transactions.upsert(tx.clone()).await?;
    info!(
        "Added transaction {} on {} ({:?})",
        tx.id, account.name, tx.conversion_rate
    );
    Ok(tx)
}

pub fn display_transactions(
    transactions: &[Transaction],
    accounts: &[Account],
    categories: &[Category],
) -> String {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Date"),
        ui::header_cell("Account"),
        ui::header_cell("Name"),
        ui::header_cell("Category"),
        ui::header_cell("Amount"),
        ui::header_cell("Currency"),
        ui::header_cell("Rate"),
    ]);
    for tx in transactions {
        let account = accounts
            .iter()
            .find(|a| a.id == tx.account_id)
            .map_or("N/A", |a| a.name.as_str());
        let category = tx
            .category_id
            .and_then(|id| categories.iter().find(|c| c.id == id))
            .map_or("", |c| c.name.as_str());
        table.add_row(vec![
            Cell::new(tx.date.format("%Y-%m-%d")),
            Cell::new(account),
            Cell::new(tx.name.as_deref().unwrap_or("")),
            Cell::new(category),
            ui::amount_cell(tx.amount),
            Cell::new(&tx.currency),
            ui::format_optional_cell(tx.conversion_rate, |r| format!("{r:.4}")),
        ]);
    }
    table.to_string()
}
