use super::ui;
use crate::core::currency::normalize_code;
use crate::core::ledger::{Account, Bank, Entity};
use crate::store::Ledger;
use anyhow::{Result, bail};
use comfy_table::Cell;
use tracing::info;

/// Finds a single entity whose id starts with `prefix`.
pub fn resolve_by_id_prefix<T: Entity>(items: &[T], prefix: &str) -> Result<T> {
    let prefix = prefix.trim().to_lowercase();
    if prefix.is_empty() {
        bail!("An id is required");
    }
    let mut matches = items
        .iter()
        .filter(|item| item.id().to_string().starts_with(&prefix));
    match (matches.next(), matches.next()) {
        (Some(item), None) => Ok(item.clone()),
        (None, _) => bail!("No {} entry matches id {}", T::COLLECTION, prefix),
        (Some(_), Some(_)) => bail!("Id {} is ambiguous in {}", prefix, T::COLLECTION),
    }
}

/// Finds a bank by exact (case-insensitive) name, falling back to an id prefix.
pub fn resolve_bank(banks: &[Bank], name_or_id: &str) -> Result<Bank> {
    let wanted = name_or_id.trim();
    if let Some(bank) = banks.iter().find(|b| b.name.eq_ignore_ascii_case(wanted)) {
        return Ok(bank.clone());
    }
    resolve_by_id_prefix(banks, wanted)
}

pub(crate) fn short_id(id: &uuid::Uuid) -> String {
    id.to_string().chars().take(8).collect()
}

pub async fn add_bank(ledger: &Ledger, name: &str) -> Result<Bank> {
    if name.trim().is_empty() {
        bail!("Bank name cannot be empty");
    }
    let bank = Bank::new(name);
    ledger.banks.upsert(bank.clone()).await?;
    info!("Added bank {} ({})", bank.name, bank.id);
    Ok(bank)
}

pub fn display_banks(banks: &[Bank], accounts: &[Account]) -> String {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Id"),
        ui::header_cell("Bank"),
        ui::header_cell("Accounts"),
    ]);
    for bank in banks {
        let count = accounts.iter().filter(|a| a.bank_id == bank.id).count();
        table.add_row(vec![
            Cell::new(short_id(&bank.id)),
            Cell::new(&bank.name),
            Cell::new(count),
        ]);
    }
    table.to_string()
}

pub async fn add_account(
    ledger: &Ledger,
    name: &str,
    bank: &str,
    currency: &str,
    balance: f64,
) -> Result<Account> {
    if name.trim().is_empty() {
        bail!("Account name cannot be empty");
    }
    let currency = normalize_code(currency);
    if currency.is_empty() {
        bail!("Account currency cannot be empty");
    }
    let bank = resolve_bank(&ledger.banks.all(), bank)?;
    let account = Account::new(name, bank.id, &currency, balance);
    ledger.accounts.upsert(account.clone()).await?;
    info!("Added account {} at {} ({})", account.name, bank.name, account.id);
    Ok(account)
}

pub fn display_accounts(accounts: &[Account], banks: &[Bank], include_archived: bool) -> String {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Id"),
        ui::header_cell("Account"),
        ui::header_cell("Bank"),
        ui::header_cell("Currency"),
        ui::header_cell("Balance"),
    ]);
    for account in accounts
        .iter()
        .filter(|a| include_archived || !a.is_archived)
    {
        let bank_name = banks
            .iter()
            .find(|b| b.id == account.bank_id)
            .map_or("N/A", |b| b.name.as_str());
        let name = if account.is_archived {
            ui::style_text(&format!("{} (archived)", account.name), ui::StyleType::Subtle)
        } else {
            account.name.clone()
        };
        table.add_row(vec![
            Cell::new(short_id(&account.id)),
            Cell::new(name),
            Cell::new(bank_name),
            Cell::new(&account.currency),
            ui::amount_cell(account.balance),
        ]);
    }
    table.to_string()
}

pub async fn archive_account(ledger: &Ledger, id: &str) -> Result<Account> {
    let mut account = resolve_by_id_prefix(&ledger.accounts.all(), id)?;
    account.is_archived = true;
    ledger.accounts.upsert(account.clone()).await?;
    info!("Archived account {} ({})", account.name, account.id);
    Ok(account)
}

pub async fn delete_account(ledger: &Ledger, id: &str) -> Result<Account> {
    let account = resolve_by_id_prefix(&ledger.accounts.all(), id)?;
    if !ledger.accounts.delete(account.id).await? {
        bail!("Account {} was already removed", account.id);
    }
    info!("Deleted account {} ({})", account.name, account.id);
    Ok(account)
}
