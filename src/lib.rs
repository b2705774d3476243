pub mod cli;
pub mod context;
pub mod core;
pub mod providers;
pub mod store;

use crate::context::AppContext;
use crate::core::config::AppConfig;
use crate::core::currency::normalize_code;
use anyhow::Result;
use tracing::{debug, info};

pub enum BankCommand {
    Add { name: String },
    List,
}

pub enum AccountCommand {
    Add {
        name: String,
        bank: String,
        currency: String,
        balance: f64,
    },
    List { all: bool },
    Archive { id: String },
    Delete { id: String },
}

pub enum LoanCommand {
    Add {
        name: String,
        amount: f64,
        currency: String,
        bank: Option<String>,
        payment: f64,
        duration_days: Option<u32>,
    },
    List { currency: Option<String> },
    Delete { id: String },
}

pub enum CategoryCommand {
    Add { name: String, icon: String },
    List,
}

pub enum TransactionCommand {
    Add {
        account: String,
        amount: f64,
        currency: Option<String>,
        name: Option<String>,
        note: Option<String>,
        category: Option<String>,
    },
    List,
}

pub enum AppCommand {
    Rates,
    Convert { amount: f64, from: String, to: String },
    Total { currency: Option<String> },
    Currencies,
    Bank(BankCommand),
    Account(AccountCommand),
    Loan(LoanCommand),
    Category(CategoryCommand),
    Transaction(TransactionCommand),
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    info!("AllBanks starting...");

    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");

    let ctx = AppContext::from_config(config)?;
    match command {
        AppCommand::Rates => {
            cli::rates::refresh_with_spinner(&ctx.rates).await;
            println!("{}", cli::rates::display_rate_table(&ctx.rates.snapshot()));
        }
        AppCommand::Convert { amount, from, to } => {
            cli::convert::run(&ctx.rates, amount, &from, &to).await?;
        }
        AppCommand::Total { currency } => {
            let target = normalize_code(currency.as_deref().unwrap_or(&ctx.config.currency));
            cli::total::run(&ctx, &target).await?;
        }
        AppCommand::Currencies => {
            cli::rates::refresh_with_spinner(&ctx.rates).await;
            println!("{}", cli::rates::display_currencies(&ctx.rates.table()));
        }
        AppCommand::Bank(BankCommand::Add { name }) => {
            let bank = cli::accounts::add_bank(&ctx.ledger, &name).await?;
            println!("Added bank {} ({})", bank.name, bank.id);
        }
        AppCommand::Bank(BankCommand::List) => {
            println!(
                "{}",
                cli::accounts::display_banks(&ctx.ledger.banks.all(), &ctx.ledger.accounts.all())
            );
        }
        AppCommand::Account(AccountCommand::Add {
            name,
            bank,
            currency,
            balance,
        }) => {
            let account =
                cli::accounts::add_account(&ctx.ledger, &name, &bank, &currency, balance).await?;
            println!("Added account {} ({})", account.name, account.id);
        }
        AppCommand::Account(AccountCommand::List { all }) => {
            println!(
                "{}",
                cli::accounts::display_accounts(
                    &ctx.ledger.accounts.all(),
                    &ctx.ledger.banks.all(),
                    all
                )
            );
        }
        AppCommand::Account(AccountCommand::Archive { id }) => {
            let account = cli::accounts::archive_account(&ctx.ledger, &id).await?;
            println!("Archived account {}", account.name);
        }
        AppCommand::Account(AccountCommand::Delete { id }) => {
            let account = cli::accounts::delete_account(&ctx.ledger, &id).await?;
            println!("Deleted account {}", account.name);
        }
        AppCommand::Loan(LoanCommand::Add {
            name,
            amount,
            currency,
            bank,
            payment,
            duration_days,
        }) => {
            let new = cli::loans::NewLoan {
                name: &name,
                amount,
                currency: &currency,
                bank: bank.as_deref(),
                payment,
                duration_days,
            };
            let loan = cli::loans::add_loan(&ctx.ledger, new).await?;
            println!("Added loan {} ({})", loan.name, loan.id);
        }
        AppCommand::Loan(LoanCommand::List { currency }) => {
            let target = normalize_code(currency.as_deref().unwrap_or(&ctx.config.currency));
            cli::rates::refresh_with_spinner(&ctx.rates).await;
            println!(
                "{}",
                cli::loans::display_loans(
                    &ctx.ledger.loans.all(),
                    &ctx.ledger.banks.all(),
                    &target,
                    &ctx.rates.table()
                )
            );
        }
        AppCommand::Loan(LoanCommand::Delete { id }) => {
            let loan = cli::loans::delete_loan(&ctx.ledger, &id).await?;
            println!("Deleted loan {}", loan.name);
        }
        AppCommand::Category(CategoryCommand::Add { name, icon }) => {
            let category = cli::transactions::add_category(&ctx.ledger, &name, &icon).await?;
            println!("Added category {} ({})", category.name, category.id);
        }
        AppCommand::Category(CategoryCommand::List) => {
            println!(
                "{}",
                cli::transactions::display_categories(&ctx.ledger.categories.all())
            );
        }
        AppCommand::Transaction(TransactionCommand::Add {
            account,
            amount,
            currency,
            name,
            note,
            category,
        }) => {
            let booked_on = cli::transactions::transaction_account(&ctx.ledger, &account)?;
            if currency
                .as_deref()
                .is_some_and(|c| normalize_code(c) != booked_on.currency)
            {
                cli::rates::refresh_with_spinner(&ctx.rates).await;
            }
            let new = cli::transactions::NewTransaction {
                account: &account,
                amount,
                currency: currency.as_deref(),
                name: name.as_deref(),
                note: note.as_deref(),
                category: category.as_deref(),
            };
            let tx =
                cli::transactions::add_transaction(&ctx.ledger, &ctx.rates.table(), new).await?;
            match tx.conversion_rate {
                Some(rate) => println!(
                    "Added transaction {} ({} {} per {})",
                    tx.id, rate, booked_on.currency, tx.currency
                ),
                None => println!("Added transaction {}", tx.id),
            }
        }
        AppCommand::Transaction(TransactionCommand::List) => {
            println!(
                "{}",
                cli::transactions::display_transactions(
                    &ctx.ledger.transactions.all(),
                    &ctx.ledger.accounts.all(),
                    &ctx.ledger.categories.all()
                )
            );
        }
    }
    Ok(())
}
